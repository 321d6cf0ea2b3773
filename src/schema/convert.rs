//! Literal-to-typed-constant conversion
//!
//! Parsing is culture invariant: `.` is the only decimal separator, dates are
//! ISO-8601 or `MM/DD/YYYY`, booleans are `true`/`false` in any case.

use crate::error::{FilterError, LiteralError, Result};
use crate::schema::value::{FloatKind, IntKind, Value, ValueType};
use chrono::{DateTime, NaiveDate, NaiveDateTime};
use uuid::Uuid;

/// Date-time layouts tried in order after RFC 3339
const DATE_TIME_FORMATS: [&str; 6] = [
    "%Y-%m-%dT%H:%M:%S%.f",
    "%Y-%m-%d %H:%M:%S%.f",
    "%Y-%m-%dT%H:%M",
    "%Y-%m-%d %H:%M",
    "%m/%d/%Y %H:%M:%S",
    "%m/%d/%Y %H:%M",
];

/// Date layouts; a date-only literal is also accepted for date-time members
const DATE_FORMATS: [&str; 2] = ["%Y-%m-%d", "%m/%d/%Y"];

/// Convert a literal to a constant of the given declared type
pub fn parse_literal(literal: &str, target: ValueType) -> Result<Value> {
    convert(literal, target).map_err(|source| FilterError::InvalidValue {
        literal: literal.to_string(),
        target,
        source,
    })
}

fn convert(literal: &str, target: ValueType) -> std::result::Result<Value, LiteralError> {
    let trimmed = literal.trim();
    if trimmed.is_empty() {
        return Err(LiteralError::Empty);
    }

    match target {
        ValueType::String => Ok(Value::String(literal.to_string())),
        ValueType::Int(kind) => parse_int(trimmed, kind),
        ValueType::Float(FloatKind::F32) => Ok(Value::Float(f64::from(trimmed.parse::<f32>()?))),
        ValueType::Float(FloatKind::F64) => Ok(Value::Float(trimmed.parse::<f64>()?)),
        ValueType::Bool => parse_bool(trimmed),
        ValueType::DateTime => parse_date_time(trimmed).map(Value::DateTime),
        ValueType::Date => parse_date(trimmed).map(Value::Date),
        ValueType::Uuid => Ok(Value::Uuid(Uuid::parse_str(trimmed)?)),
        ValueType::Enum { name, variants } => {
            let wanted = trimmed.to_lowercase();
            variants
                .iter()
                .position(|v| v.to_lowercase() == wanted)
                .map(Value::Enum)
                .ok_or(LiteralError::UnknownVariant { name, variants })
        }
        ValueType::Object { .. } => Err(LiteralError::UnsupportedType { target }),
    }
}

fn parse_int(s: &str, kind: IntKind) -> std::result::Result<Value, LiteralError> {
    let value = match kind {
        IntKind::I8 => Value::Int(i64::from(s.parse::<i8>()?)),
        IntKind::I16 => Value::Int(i64::from(s.parse::<i16>()?)),
        IntKind::I32 => Value::Int(i64::from(s.parse::<i32>()?)),
        IntKind::I64 => Value::Int(s.parse::<i64>()?),
        IntKind::U8 => Value::UInt(u64::from(s.parse::<u8>()?)),
        IntKind::U16 => Value::UInt(u64::from(s.parse::<u16>()?)),
        IntKind::U32 => Value::UInt(u64::from(s.parse::<u32>()?)),
        IntKind::U64 => Value::UInt(s.parse::<u64>()?),
    };
    Ok(value)
}

fn parse_bool(s: &str) -> std::result::Result<Value, LiteralError> {
    match s.to_lowercase().as_str() {
        "true" => Ok(Value::Bool(true)),
        "false" => Ok(Value::Bool(false)),
        _ => Err(LiteralError::Bool),
    }
}

fn parse_date_time(s: &str) -> std::result::Result<NaiveDateTime, LiteralError> {
    if let Ok(dt) = DateTime::parse_from_rfc3339(s) {
        return Ok(dt.naive_utc());
    }

    let mut last_err = None;
    for format in DATE_TIME_FORMATS {
        match NaiveDateTime::parse_from_str(s, format) {
            Ok(dt) => return Ok(dt),
            Err(e) => last_err = Some(e),
        }
    }

    match parse_date(s) {
        Ok(date) => Ok(date.and_time(chrono::NaiveTime::MIN)),
        Err(e) => Err(last_err.map(LiteralError::DateTime).unwrap_or(e)),
    }
}

fn parse_date(s: &str) -> std::result::Result<NaiveDate, LiteralError> {
    let mut last_err = None;
    for format in DATE_FORMATS {
        match NaiveDate::parse_from_str(s, format) {
            Ok(date) => return Ok(date),
            Err(e) => last_err = Some(e),
        }
    }
    // DATE_FORMATS is non-empty, so an error was recorded
    match last_err {
        Some(e) => Err(LiteralError::DateTime(e)),
        None => Err(LiteralError::Empty),
    }
}
