//! Filter string parser
//!
//! ```text
//! filter  := clause (";" clause)*
//! clause  := property "|" operator ["|" value ("," value)*]
//! ```
//!
//! Example: `CGPA|gte|3.0;Status|eq|Active;Department|in|CS,EE,ME`

use crate::config::FilterConfig;
use crate::error::{FilterError, Result};
use crate::filter::builder::FilterExpressionBuilder;
use crate::filter::expression::{FilterExpression, FilterOperator, FilterValues};
use crate::filter::whitelist::Whitelist;
use crate::predicate::Predicate;
use crate::schema::Filterable;
use std::sync::Arc;

const CLAUSE_SEPARATOR: char = ';';
const PART_SEPARATOR: char = '|';
const VALUE_SEPARATOR: char = ',';

/// Parses filter strings into predicates over `T`.
///
/// Holds only immutable configuration, so one parser can serve concurrent
/// requests.
pub struct FilterParser<T> {
    builder: FilterExpressionBuilder<T>,
    whitelist: Option<Arc<dyn Whitelist>>,
    max_clauses: Option<usize>,
}

impl<T: Filterable> FilterParser<T> {
    /// Parser without a whitelist; every registered member is filterable
    pub fn new() -> Self {
        Self {
            builder: FilterExpressionBuilder::new(),
            whitelist: None,
            max_clauses: None,
        }
    }

    pub fn with_whitelist(whitelist: impl Whitelist + 'static) -> Self {
        Self::new().whitelist(Arc::new(whitelist))
    }

    pub fn from_config(config: &FilterConfig) -> Self {
        let mut parser = Self::new();
        if let Some(whitelist) = config.whitelist() {
            parser = parser.whitelist(Arc::new(whitelist));
        }
        parser.max_clauses = config.max_clauses;
        parser
    }

    /// Replace the whitelist
    pub fn whitelist(mut self, whitelist: Arc<dyn Whitelist>) -> Self {
        self.whitelist = Some(whitelist);
        self
    }

    /// Reject filters with more than `limit` clauses
    pub fn max_clauses(mut self, limit: usize) -> Self {
        self.max_clauses = Some(limit);
        self
    }

    /// Parse and compile a filter string into one predicate.
    ///
    /// A blank filter yields the always-true predicate.
    pub fn parse(&self, filter: &str) -> Result<Predicate<T>> {
        if filter.trim().is_empty() {
            return Ok(Predicate::always());
        }

        self.compile(filter).map_err(|e| e.in_filter(filter))
    }

    /// Split, validate and whitelist a filter string without compiling it
    pub fn parse_expressions(&self, filter: &str) -> Result<Vec<FilterExpression>> {
        let segments: Vec<&str> = split_clauses(filter).collect();

        if let Some(limit) = self.max_clauses {
            if segments.len() > limit {
                return Err(FilterError::TooManyClauses {
                    count: segments.len(),
                    limit,
                });
            }
        }

        segments
            .into_iter()
            .map(|segment| {
                let expression = parse_clause(segment)?;
                self.check_allowed(&expression)?;
                Ok(expression)
            })
            .collect()
    }

    fn compile(&self, filter: &str) -> Result<Predicate<T>> {
        let expressions = self.parse_expressions(filter)?;

        let mut predicate = Predicate::always();
        for expression in &expressions {
            tracing::trace!(clause = %expression, "Compiling filter clause");
            predicate = predicate.and(self.builder.build(expression)?);
        }

        tracing::debug!(
            clauses = expressions.len(),
            leaves = predicate.expr().leaf_count(),
            "Compiled filter"
        );
        Ok(predicate)
    }

    fn check_allowed(&self, expression: &FilterExpression) -> Result<()> {
        match &self.whitelist {
            Some(whitelist) if !whitelist.is_allowed(expression.property()) => {
                tracing::debug!(
                    property = %expression.property(),
                    "Rejected filter on property outside whitelist"
                );
                Err(FilterError::PropertyNotAllowed {
                    property: expression.property().to_string(),
                })
            }
            _ => Ok(()),
        }
    }
}

impl<T: Filterable> Default for FilterParser<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FilterParser<T> {
    fn clone(&self) -> Self {
        Self {
            builder: self.builder.clone(),
            whitelist: self.whitelist.clone(),
            max_clauses: self.max_clauses,
        }
    }
}

impl<T> std::fmt::Debug for FilterParser<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FilterParser")
            .field("whitelist", &self.whitelist.as_ref().map(|w| w.allowed_properties()))
            .field("max_clauses", &self.max_clauses)
            .finish()
    }
}

/// Split a filter string into trimmed, non-empty clause segments
pub fn split_clauses(filter: &str) -> impl Iterator<Item = &str> {
    filter
        .split(CLAUSE_SEPARATOR)
        .map(str::trim)
        .filter(|segment| !segment.is_empty())
}

/// Parse one clause segment into a `FilterExpression`
pub fn parse_clause(segment: &str) -> Result<FilterExpression> {
    let parts: Vec<&str> = segment.split(PART_SEPARATOR).collect();
    if parts.len() < 2 {
        return Err(malformed(segment));
    }

    let property = parts[0].trim();
    let token = parts[1].trim().to_lowercase();
    if property.is_empty() || token.is_empty() {
        return Err(malformed(segment));
    }

    let operator =
        FilterOperator::from_token(&token).ok_or_else(|| FilterError::UnknownOperator {
            token,
            segment: segment.to_string(),
        })?;

    if !operator.requires_values() {
        return FilterExpression::new(property, operator, std::iter::empty::<String>());
    }

    if parts.len() < 3 {
        return Err(FilterError::ValueRequired {
            property: property.to_string(),
            operator,
        });
    }

    // Literal values may themselves contain '|'
    let raw_values = parts[2..].join("|");
    let values: FilterValues = raw_values
        .split(VALUE_SEPARATOR)
        .map(str::trim)
        .filter(|v| !v.is_empty())
        .map(str::to_string)
        .collect();

    if values.is_empty() {
        return Err(FilterError::ValueRequired {
            property: property.to_string(),
            operator,
        });
    }

    FilterExpression::new(property, operator, values)
}

#[inline]
fn malformed(segment: &str) -> FilterError {
    FilterError::MalformedClause {
        segment: segment.to_string(),
    }
}
