//! Per-entity field registry
//!
//! A `Schema<T>` is built once per entity type and maps dotted, case-insensitive
//! property paths to typed accessors. Nested value objects are flattened at
//! registration, so `Address.City` resolves with a single lookup. The object
//! itself is registered too, as `Address`, for null tests.

use crate::error::{FilterError, Result, SchemaError};
use crate::schema::value::{FieldValue, FilterEnum, Value, ValueType};
use ahash::{AHashMap, AHashSet};
use std::fmt;
use std::sync::Arc;

type Accessor<T> = Arc<dyn Fn(&T) -> Value + Send + Sync>;

/// An entity type that can be filtered
///
/// Implementors keep their schema in a static initialised on first use.
pub trait Filterable: Sized + 'static {
    fn schema() -> &'static Schema<Self>;
}

/// A registered member of an entity
pub struct Field<T> {
    path: String,
    value_type: ValueType,
    nullable: bool,
    accessor: Accessor<T>,
}

impl<T> Field<T> {
    /// Canonical path as registered, e.g. `Address.City`
    #[inline]
    pub fn path(&self) -> &str {
        &self.path
    }

    #[inline]
    pub fn value_type(&self) -> ValueType {
        self.value_type
    }

    #[inline]
    pub fn nullable(&self) -> bool {
        self.nullable
    }

    /// Read the member's current value from an entity
    #[inline]
    pub fn read(&self, entity: &T) -> Value {
        (self.accessor)(entity)
    }
}

impl<T> Clone for Field<T> {
    fn clone(&self) -> Self {
        Self {
            path: self.path.clone(),
            value_type: self.value_type,
            nullable: self.nullable,
            accessor: Arc::clone(&self.accessor),
        }
    }
}

impl<T> fmt::Debug for Field<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Field")
            .field("path", &self.path)
            .field("value_type", &self.value_type)
            .field("nullable", &self.nullable)
            .finish()
    }
}

/// Field registry for one entity type
pub struct Schema<T> {
    entity: &'static str,
    fields: Vec<Field<T>>,
    /// Lower-cased path -> index into `fields`
    index: AHashMap<String, usize>,
    /// Lower-cased paths registered more than once
    ambiguous: AHashSet<String>,
}

impl<T> Schema<T> {
    #[inline]
    pub fn entity(&self) -> &'static str {
        self.entity
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.fields.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    /// Canonical paths of every registered member, in registration order
    pub fn paths(&self) -> impl Iterator<Item = &str> + '_ {
        self.fields.iter().map(|f| f.path.as_str())
    }

    #[inline]
    pub fn field_at(&self, index: usize) -> Option<&Field<T>> {
        self.fields.get(index)
    }

    /// Resolve a dotted path, matching each segment case-insensitively.
    ///
    /// Returns the field index together with the field itself.
    pub fn resolve(&self, path: &str) -> Result<(usize, &Field<T>)> {
        let key = normalize_path(path);

        if self.ambiguous.contains(&key) {
            return Err(FilterError::Schema(SchemaError::AmbiguousPath {
                path: path.to_string(),
                entity: self.entity,
            }));
        }

        self.index
            .get(&key)
            .map(|&idx| (idx, &self.fields[idx]))
            .ok_or_else(|| FilterError::PropertyNotFound {
                path: path.to_string(),
                entity: self.entity,
            })
    }
}

impl<T> fmt::Debug for Schema<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Schema")
            .field("entity", &self.entity)
            .field("fields", &self.fields)
            .finish()
    }
}

/// Lower-case every segment and drop whitespace around the dots
pub(crate) fn normalize_path(path: &str) -> String {
    path.split('.')
        .map(|segment| segment.trim().to_lowercase())
        .collect::<Vec<_>>()
        .join(".")
}

// ============================================================================
// Builder
// ============================================================================

/// Builder for [`Schema`]
pub struct SchemaBuilder<T> {
    entity: &'static str,
    fields: Vec<Field<T>>,
}

impl<T: 'static> SchemaBuilder<T> {
    pub fn new(entity: &'static str) -> Self {
        Self {
            entity,
            fields: Vec::new(),
        }
    }

    /// Register a scalar member; `Option<V>` members are nullable
    pub fn field<V, F>(mut self, name: &str, accessor: F) -> Self
    where
        V: FieldValue,
        F: Fn(&T) -> V + Send + Sync + 'static,
    {
        self.fields.push(Field {
            path: name.to_string(),
            value_type: V::TYPE,
            nullable: V::NULLABLE,
            accessor: Arc::new(move |entity: &T| accessor(entity).into_value()),
        });
        self
    }

    /// Register an enum member matched by variant name
    pub fn enum_field<E, F>(mut self, name: &str, accessor: F) -> Self
    where
        E: FilterEnum,
        F: Fn(&T) -> E + Send + Sync + 'static,
    {
        self.fields.push(Field {
            path: name.to_string(),
            value_type: E::value_type(),
            nullable: false,
            accessor: Arc::new(move |entity: &T| Value::Enum(accessor(entity).variant_index())),
        });
        self
    }

    /// Register an optional enum member
    pub fn optional_enum_field<E, F>(mut self, name: &str, accessor: F) -> Self
    where
        E: FilterEnum,
        F: Fn(&T) -> Option<E> + Send + Sync + 'static,
    {
        self.fields.push(Field {
            path: name.to_string(),
            value_type: E::value_type(),
            nullable: true,
            accessor: Arc::new(move |entity: &T| match accessor(entity) {
                Some(e) => Value::Enum(e.variant_index()),
                None => Value::Null,
            }),
        });
        self
    }

    /// Register a nested value object as `name` and every member of it under `name.`
    pub fn nested<U, F>(mut self, name: &str, accessor: F, schema: &Schema<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> &U + Send + Sync + 'static,
    {
        self.fields.push(Field {
            path: name.to_string(),
            value_type: ValueType::Object { name: schema.entity },
            nullable: false,
            accessor: Arc::new(|_: &T| Value::Object),
        });

        let outer = Arc::new(accessor);
        for inner in &schema.fields {
            let outer = Arc::clone(&outer);
            let read = Arc::clone(&inner.accessor);
            self.fields.push(Field {
                path: format!("{}.{}", name, inner.path),
                value_type: inner.value_type,
                nullable: inner.nullable,
                accessor: Arc::new(move |entity: &T| read(outer(entity))),
            });
        }
        self
    }

    /// Register an optional nested value object; all its members become nullable
    pub fn optional_nested<U, F>(mut self, name: &str, accessor: F, schema: &Schema<U>) -> Self
    where
        U: 'static,
        F: Fn(&T) -> Option<&U> + Send + Sync + 'static,
    {
        let outer = Arc::new(accessor);
        let present = Arc::clone(&outer);
        self.fields.push(Field {
            path: name.to_string(),
            value_type: ValueType::Object { name: schema.entity },
            nullable: true,
            accessor: Arc::new(move |entity: &T| match present(entity) {
                Some(_) => Value::Object,
                None => Value::Null,
            }),
        });

        for inner in &schema.fields {
            let outer = Arc::clone(&outer);
            let read = Arc::clone(&inner.accessor);
            self.fields.push(Field {
                path: format!("{}.{}", name, inner.path),
                value_type: inner.value_type,
                nullable: true,
                accessor: Arc::new(move |entity: &T| match outer(entity) {
                    Some(value) => read(value),
                    None => Value::Null,
                }),
            });
        }
        self
    }

    pub fn build(self) -> Schema<T> {
        let mut index = AHashMap::with_capacity(self.fields.len());
        let mut ambiguous = AHashSet::new();

        for (idx, field) in self.fields.iter().enumerate() {
            let key = normalize_path(&field.path);
            if index.insert(key.clone(), idx).is_some() {
                ambiguous.insert(key);
            }
        }

        Schema {
            entity: self.entity,
            fields: self.fields,
            index,
            ambiguous,
        }
    }
}
