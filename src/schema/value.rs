//! Typed values flowing through compiled predicates

use chrono::{DateTime, NaiveDate, NaiveDateTime, Utc};
use std::cmp::Ordering;
use std::fmt;
use uuid::Uuid;

/// Width and signedness of an integer member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum IntKind {
    I8,
    I16,
    I32,
    I64,
    U8,
    U16,
    U32,
    U64,
}

impl IntKind {
    pub fn name(self) -> &'static str {
        match self {
            IntKind::I8 => "i8",
            IntKind::I16 => "i16",
            IntKind::I32 => "i32",
            IntKind::I64 => "i64",
            IntKind::U8 => "u8",
            IntKind::U16 => "u16",
            IntKind::U32 => "u32",
            IntKind::U64 => "u64",
        }
    }
}

/// Precision of a floating point member
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FloatKind {
    F32,
    F64,
}

/// Declared type of a filterable member, with any `Option` wrapper removed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValueType {
    Int(IntKind),
    Float(FloatKind),
    Bool,
    String,
    DateTime,
    Date,
    Uuid,
    Enum {
        name: &'static str,
        variants: &'static [&'static str],
    },
    /// A nested value object; only null tests apply
    Object { name: &'static str },
}

impl ValueType {
    /// Whether `<`, `<=`, `>`, `>=` are meaningful for this type
    pub fn is_ordered(&self) -> bool {
        matches!(
            self,
            ValueType::Int(_)
                | ValueType::Float(_)
                | ValueType::DateTime
                | ValueType::Date
                | ValueType::Enum { .. }
        )
    }

    #[inline]
    pub fn is_string(&self) -> bool {
        matches!(self, ValueType::String)
    }
}

impl fmt::Display for ValueType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ValueType::Int(kind) => f.write_str(kind.name()),
            ValueType::Float(FloatKind::F32) => f.write_str("f32"),
            ValueType::Float(FloatKind::F64) => f.write_str("f64"),
            ValueType::Bool => f.write_str("bool"),
            ValueType::String => f.write_str("String"),
            ValueType::DateTime => f.write_str("DateTime"),
            ValueType::Date => f.write_str("Date"),
            ValueType::Uuid => f.write_str("Uuid"),
            ValueType::Enum { name, .. } => write!(f, "enum {}", name),
            ValueType::Object { name } => write!(f, "object {}", name),
        }
    }
}

/// A typed constant, or the current value of a member read from an entity
#[derive(Debug, Clone, PartialEq)]
pub enum Value {
    Null,
    Bool(bool),
    Int(i64),
    UInt(u64),
    Float(f64),
    String(String),
    DateTime(NaiveDateTime),
    Date(NaiveDate),
    Uuid(Uuid),
    /// Index into the declaring enum's variant list
    Enum(usize),
    /// A nested value object that is present
    Object,
}

impl Value {
    #[inline]
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }
}

impl PartialOrd for Value {
    /// Only values of the same kind are ordered; `Null` is never ordered.
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        match (self, other) {
            (Value::Bool(a), Value::Bool(b)) => a.partial_cmp(b),
            (Value::Int(a), Value::Int(b)) => a.partial_cmp(b),
            (Value::UInt(a), Value::UInt(b)) => a.partial_cmp(b),
            (Value::Float(a), Value::Float(b)) => a.partial_cmp(b),
            (Value::String(a), Value::String(b)) => a.partial_cmp(b),
            (Value::DateTime(a), Value::DateTime(b)) => a.partial_cmp(b),
            (Value::Date(a), Value::Date(b)) => a.partial_cmp(b),
            (Value::Uuid(a), Value::Uuid(b)) => a.partial_cmp(b),
            (Value::Enum(a), Value::Enum(b)) => a.partial_cmp(b),
            _ => None,
        }
    }
}

impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => f.write_str("null"),
            Value::Bool(v) => write!(f, "{}", v),
            Value::Int(v) => write!(f, "{}", v),
            Value::UInt(v) => write!(f, "{}", v),
            Value::Float(v) => write!(f, "{}", v),
            Value::String(v) => write!(f, "{:?}", v),
            Value::DateTime(v) => write!(f, "{}", v.format("%Y-%m-%dT%H:%M:%S%.f")),
            Value::Date(v) => write!(f, "{}", v.format("%Y-%m-%d")),
            Value::Uuid(v) => write!(f, "{}", v),
            Value::Enum(idx) => write!(f, "#{}", idx),
            Value::Object => f.write_str("{..}"),
        }
    }
}

// ============================================================================
// Rust type -> value model mapping
// ============================================================================

/// A Rust type that can back a filterable member
pub trait FieldValue {
    const TYPE: ValueType;
    const NULLABLE: bool = false;

    fn into_value(self) -> Value;
}

/// A fieldless enum that can be filtered by variant name
///
/// `VARIANTS` lists the variant names in declaration order and
/// `variant_index` returns a position in that list.
pub trait FilterEnum: Copy {
    const NAME: &'static str;
    const VARIANTS: &'static [&'static str];

    fn variant_index(self) -> usize;

    #[inline]
    fn value_type() -> ValueType {
        ValueType::Enum {
            name: Self::NAME,
            variants: Self::VARIANTS,
        }
    }
}

macro_rules! signed_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const TYPE: ValueType = ValueType::Int(IntKind::$kind);

                #[inline]
                fn into_value(self) -> Value {
                    Value::Int(i64::from(self))
                }
            }
        )*
    };
}

macro_rules! unsigned_field_value {
    ($($ty:ty => $kind:ident),* $(,)?) => {
        $(
            impl FieldValue for $ty {
                const TYPE: ValueType = ValueType::Int(IntKind::$kind);

                #[inline]
                fn into_value(self) -> Value {
                    Value::UInt(u64::from(self))
                }
            }
        )*
    };
}

signed_field_value!(i8 => I8, i16 => I16, i32 => I32, i64 => I64);
unsigned_field_value!(u8 => U8, u16 => U16, u32 => U32, u64 => U64);

impl FieldValue for f32 {
    const TYPE: ValueType = ValueType::Float(FloatKind::F32);

    #[inline]
    fn into_value(self) -> Value {
        Value::Float(f64::from(self))
    }
}

impl FieldValue for f64 {
    const TYPE: ValueType = ValueType::Float(FloatKind::F64);

    #[inline]
    fn into_value(self) -> Value {
        Value::Float(self)
    }
}

impl FieldValue for bool {
    const TYPE: ValueType = ValueType::Bool;

    #[inline]
    fn into_value(self) -> Value {
        Value::Bool(self)
    }
}

impl FieldValue for String {
    const TYPE: ValueType = ValueType::String;

    #[inline]
    fn into_value(self) -> Value {
        Value::String(self)
    }
}

impl FieldValue for &str {
    const TYPE: ValueType = ValueType::String;

    #[inline]
    fn into_value(self) -> Value {
        Value::String(self.to_string())
    }
}

impl FieldValue for NaiveDateTime {
    const TYPE: ValueType = ValueType::DateTime;

    #[inline]
    fn into_value(self) -> Value {
        Value::DateTime(self)
    }
}

impl FieldValue for DateTime<Utc> {
    const TYPE: ValueType = ValueType::DateTime;

    #[inline]
    fn into_value(self) -> Value {
        Value::DateTime(self.naive_utc())
    }
}

impl FieldValue for NaiveDate {
    const TYPE: ValueType = ValueType::Date;

    #[inline]
    fn into_value(self) -> Value {
        Value::Date(self)
    }
}

impl FieldValue for Uuid {
    const TYPE: ValueType = ValueType::Uuid;

    #[inline]
    fn into_value(self) -> Value {
        Value::Uuid(self)
    }
}

impl<V: FieldValue> FieldValue for Option<V> {
    const TYPE: ValueType = V::TYPE;
    const NULLABLE: bool = true;

    #[inline]
    fn into_value(self) -> Value {
        match self {
            Some(v) => v.into_value(),
            None => Value::Null,
        }
    }
}
