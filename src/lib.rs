//! Filter Expression Core - compiles compact filter strings into predicates
//!
//! A filter string such as `CGPA|gte|3.0;Status|eq|Active;Department|in|CS,EE`
//! is split into clauses, checked against an optional property whitelist,
//! resolved against the entity's field registry and compiled into a single
//! [`Predicate`] that can be evaluated, composed, or walked as a tree.
//!
//! ```text
//! filter    := clause (";" clause)*
//! clause    := property "|" operator ["|" value ("," value)*]
//! operator  := eq | neq | gt | gte | lt | lte | contains | startswith
//!            | endswith | between | in | isnull | notnull
//! ```

pub mod config;
pub mod error;
pub mod filter;
pub mod predicate;
pub mod schema;

#[cfg(test)]
mod fixtures;

pub use crate::config::{ConfigError, FilterConfig};
pub use crate::error::{FilterError, LiteralError, Result, SchemaError};
pub use crate::filter::{
    FilterExpression, FilterExpressionBuilder, FilterOperator, FilterParser, PropertyWhitelist,
    Whitelist,
};
pub use crate::predicate::{Expr, Predicate};
pub use crate::schema::{FieldValue, FilterEnum, Filterable, Schema, SchemaBuilder, Value, ValueType};
