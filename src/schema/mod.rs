//! Entity schemas and the typed value model
//!
//! This module replaces runtime member lookup with a field registry built once
//! per entity type, and converts filter literals into typed constants.

pub mod convert;
mod registry;
mod value;

pub use convert::parse_literal;
pub use registry::*;
pub use value::*;

pub(crate) use registry::normalize_path;
