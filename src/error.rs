//! Error types for the filter expression compiler

use crate::filter::FilterOperator;
use crate::schema::ValueType;
use thiserror::Error;

/// Main error type for filter parsing and compilation
#[derive(Error, Debug)]
pub enum FilterError {
    #[error("Malformed filter clause '{segment}': expected 'property|operator[|values]'")]
    MalformedClause { segment: String },

    #[error("Unsupported filter operator '{token}' in clause '{segment}'")]
    UnknownOperator { token: String, segment: String },

    #[error("Filtering on property '{property}' is not allowed")]
    PropertyNotAllowed { property: String },

    #[error("Property '{path}' not found on {entity}")]
    PropertyNotFound { path: String, entity: &'static str },

    #[error("A value is required for operator '{operator}' on property '{property}'")]
    ValueRequired {
        property: String,
        operator: FilterOperator,
    },

    #[error("Operator '{operator}' on property '{property}' expects {expected} value(s), got {actual}")]
    InvalidArity {
        property: String,
        operator: FilterOperator,
        expected: &'static str,
        actual: usize,
    },

    #[error("Cannot convert '{literal}' to {target}: {source}")]
    InvalidValue {
        literal: String,
        target: ValueType,
        #[source]
        source: LiteralError,
    },

    #[error("Operator '{operator}' cannot be applied to property '{property}' of type {value_type}")]
    OperatorTypeMismatch {
        property: String,
        operator: FilterOperator,
        value_type: ValueType,
    },

    #[error("Filter has {count} clauses, more than the allowed {limit}")]
    TooManyClauses { count: usize, limit: usize },

    /// Defect in an entity's field registry; not caused by the filter text
    #[error(transparent)]
    Schema(#[from] SchemaError),

    #[error("Unexpected failure while processing filter '{filter}': {source}")]
    Unexpected {
        filter: String,
        #[source]
        source: SchemaError,
    },
}

impl FilterError {
    /// Whether this error belongs to the filter parsing taxonomy, i.e. it is
    /// caused by the filter text rather than by a registry defect
    pub fn is_taxonomy(&self) -> bool {
        !matches!(self, FilterError::Schema(_) | FilterError::Unexpected { .. })
    }

    /// The offending raw substring, when the error can point at one
    pub fn raw(&self) -> Option<&str> {
        match self {
            FilterError::MalformedClause { segment } => Some(segment),
            FilterError::UnknownOperator { segment, .. } => Some(segment),
            FilterError::PropertyNotAllowed { property } => Some(property),
            FilterError::PropertyNotFound { path, .. } => Some(path),
            FilterError::ValueRequired { property, .. } => Some(property),
            FilterError::InvalidArity { property, .. } => Some(property),
            FilterError::InvalidValue { literal, .. } => Some(literal),
            FilterError::OperatorTypeMismatch { property, .. } => Some(property),
            FilterError::Unexpected { filter, .. } => Some(filter),
            FilterError::TooManyClauses { .. } | FilterError::Schema(_) => None,
        }
    }

    /// Attach the whole filter string to a non-taxonomy failure.
    /// Taxonomy errors pass through untouched.
    pub(crate) fn in_filter(self, filter: &str) -> Self {
        match self {
            FilterError::Schema(source) => FilterError::Unexpected {
                filter: filter.to_string(),
                source,
            },
            other => other,
        }
    }
}

/// Why a literal could not be converted to a member's declared type
#[derive(Error, Debug)]
pub enum LiteralError {
    #[error("literal is empty")]
    Empty,

    #[error(transparent)]
    Int(#[from] std::num::ParseIntError),

    #[error(transparent)]
    Float(#[from] std::num::ParseFloatError),

    #[error("expected 'true' or 'false'")]
    Bool,

    #[error("unrecognised date/time format ({0})")]
    DateTime(#[from] chrono::ParseError),

    #[error(transparent)]
    Uuid(#[from] uuid::Error),

    #[error("no variant of {name} matches (expected one of: {})", .variants.join(", "))]
    UnknownVariant {
        name: &'static str,
        variants: &'static [&'static str],
    },

    #[error("{target} members cannot be compared with a literal")]
    UnsupportedType { target: ValueType },
}

/// Field registry defects
#[derive(Error, Debug)]
pub enum SchemaError {
    #[error("Property path '{path}' on {entity} matches more than one member")]
    AmbiguousPath { path: String, entity: &'static str },
}

/// Result type alias for the filter expression compiler
pub type Result<T> = std::result::Result<T, FilterError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_schema_errors_are_wrapped_with_filter() {
        let err = FilterError::Schema(SchemaError::AmbiguousPath {
            path: "name".to_string(),
            entity: "Student",
        });
        assert!(!err.is_taxonomy());

        let wrapped = err.in_filter("Name|eq|x");
        assert!(matches!(wrapped, FilterError::Unexpected { ref filter, .. } if filter == "Name|eq|x"));
        assert_eq!(wrapped.raw(), Some("Name|eq|x"));
    }

    #[test]
    fn test_taxonomy_errors_pass_through() {
        let err = FilterError::MalformedClause {
            segment: "OnlyProperty".to_string(),
        };
        assert!(err.is_taxonomy());

        let same = err.in_filter("OnlyProperty");
        assert!(matches!(same, FilterError::MalformedClause { .. }));
        assert_eq!(same.raw(), Some("OnlyProperty"));
    }

    #[test]
    fn test_invalid_value_message_names_literal_and_type() {
        let err = FilterError::InvalidValue {
            literal: "abc".to_string(),
            target: ValueType::Bool,
            source: LiteralError::Bool,
        };
        let msg = err.to_string();
        assert!(msg.contains("'abc'"));
        assert!(msg.contains("bool"));
    }
}
