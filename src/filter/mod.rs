//! Filter string parsing and compilation
//!
//! This module turns filter strings like "Status|eq|Active;Age|gte|18"
//! into predicates over a `Filterable` entity.

mod builder;
mod expression;
pub mod parser;
mod whitelist;


pub use builder::*;
pub use expression::*;
pub use parser::*;
pub use whitelist::*;
