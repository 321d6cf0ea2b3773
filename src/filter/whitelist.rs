//! Property whitelisting

use crate::schema::{normalize_path, Filterable};
use ahash::AHashMap;
use std::collections::BTreeSet;

/// Answers whether a property path may be filtered on
pub trait Whitelist: Send + Sync {
    fn is_allowed(&self, property: &str) -> bool;

    fn allowed_properties(&self) -> BTreeSet<String>;
}

/// Set-backed whitelist; membership is case-insensitive, like property resolution
#[derive(Debug, Clone, Default)]
pub struct PropertyWhitelist {
    /// Lower-cased path -> path as given
    allowed: AHashMap<String, String>,
}

impl PropertyWhitelist {
    pub fn new<I, S>(properties: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        properties.into_iter().collect()
    }

    /// Allow every member registered in `T`'s schema
    pub fn from_schema<T: Filterable>() -> Self {
        T::schema().paths().collect()
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.allowed.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.allowed.is_empty()
    }
}

impl<S: Into<String>> FromIterator<S> for PropertyWhitelist {
    fn from_iter<I: IntoIterator<Item = S>>(iter: I) -> Self {
        let allowed = iter
            .into_iter()
            .map(Into::into)
            .map(|p: String| (normalize_path(&p), p.trim().to_string()))
            .collect();
        Self { allowed }
    }
}

impl Whitelist for PropertyWhitelist {
    fn is_allowed(&self, property: &str) -> bool {
        self.allowed.contains_key(&normalize_path(property))
    }

    fn allowed_properties(&self) -> BTreeSet<String> {
        self.allowed.values().cloned().collect()
    }
}
