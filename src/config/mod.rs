//! Parser configuration
//!
//! Settings are usually loaded from the host application's JSON config, e.g.
//!
//! ```json
//! { "allowed_properties": ["Status", "Age", "Address.City"], "max_clauses": 10 }
//! ```

use crate::filter::PropertyWhitelist;
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Configuration for a `FilterParser`
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FilterConfig {
    /// Queryable property paths; `None` allows every registered member
    pub allowed_properties: Option<Vec<String>>,
    /// Upper bound on clauses per filter string
    pub max_clauses: Option<usize>,
}

impl FilterConfig {
    /// Deserialize and validate a JSON document
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let config: FilterConfig = serde_json::from_str(json)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.max_clauses == Some(0) {
            return Err(ConfigError::Invalid(
                "max_clauses must be at least 1".to_string(),
            ));
        }
        if let Some(props) = &self.allowed_properties {
            if let Some(blank) = props.iter().find(|p| p.trim().is_empty()) {
                return Err(ConfigError::Invalid(format!(
                    "allowed_properties contains a blank entry: {:?}",
                    blank
                )));
            }
        }
        Ok(())
    }

    /// Whitelist built from `allowed_properties`
    pub fn whitelist(&self) -> Option<PropertyWhitelist> {
        self.allowed_properties
            .as_ref()
            .map(|props| props.iter().map(String::as_str).collect())
    }
}

/// Configuration loading errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Deserialization error: {0}")]
    Deserialization(#[from] serde_json::Error),

    #[error("Invalid config: {0}")]
    Invalid(String),
}
