//! Structured representation of a single filter clause

use crate::error::{FilterError, Result};
use smallvec::SmallVec;
use std::fmt;
use std::str::FromStr;

/// Literal values of one clause; most clauses carry one or two
pub type FilterValues = SmallVec<[String; 2]>;

/// Filter operators
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FilterOperator {
    /// `eq`
    Equals,
    /// `neq`
    NotEquals,
    /// `gt`
    GreaterThan,
    /// `gte`
    GreaterOrEqual,
    /// `lt`
    LessThan,
    /// `lte`
    LessOrEqual,
    /// `contains`
    Contains,
    /// `startswith`
    StartsWith,
    /// `endswith`
    EndsWith,
    /// `between`
    Between,
    /// `in`
    In,
    /// `isnull`
    IsNull,
    /// `notnull`
    IsNotNull,
}

impl FilterOperator {
    pub const ALL: [FilterOperator; 13] = [
        FilterOperator::Equals,
        FilterOperator::NotEquals,
        FilterOperator::GreaterThan,
        FilterOperator::GreaterOrEqual,
        FilterOperator::LessThan,
        FilterOperator::LessOrEqual,
        FilterOperator::Contains,
        FilterOperator::StartsWith,
        FilterOperator::EndsWith,
        FilterOperator::Between,
        FilterOperator::In,
        FilterOperator::IsNull,
        FilterOperator::IsNotNull,
    ];

    /// The DSL token for this operator
    pub fn token(self) -> &'static str {
        match self {
            FilterOperator::Equals => "eq",
            FilterOperator::NotEquals => "neq",
            FilterOperator::GreaterThan => "gt",
            FilterOperator::GreaterOrEqual => "gte",
            FilterOperator::LessThan => "lt",
            FilterOperator::LessOrEqual => "lte",
            FilterOperator::Contains => "contains",
            FilterOperator::StartsWith => "startswith",
            FilterOperator::EndsWith => "endswith",
            FilterOperator::Between => "between",
            FilterOperator::In => "in",
            FilterOperator::IsNull => "isnull",
            FilterOperator::IsNotNull => "notnull",
        }
    }

    /// Look up an already lower-cased, trimmed token
    pub fn from_token(token: &str) -> Option<Self> {
        let op = match token {
            "eq" => FilterOperator::Equals,
            "neq" => FilterOperator::NotEquals,
            "gt" => FilterOperator::GreaterThan,
            "gte" => FilterOperator::GreaterOrEqual,
            "lt" => FilterOperator::LessThan,
            "lte" => FilterOperator::LessOrEqual,
            "contains" => FilterOperator::Contains,
            "startswith" => FilterOperator::StartsWith,
            "endswith" => FilterOperator::EndsWith,
            "between" => FilterOperator::Between,
            "in" => FilterOperator::In,
            "isnull" => FilterOperator::IsNull,
            "notnull" => FilterOperator::IsNotNull,
            _ => return None,
        };
        Some(op)
    }

    /// Every operator except the null tests needs at least one literal
    #[inline]
    pub fn requires_values(self) -> bool {
        !matches!(self, FilterOperator::IsNull | FilterOperator::IsNotNull)
    }
}

impl fmt::Display for FilterOperator {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.token())
    }
}

impl FromStr for FilterOperator {
    type Err = FilterError;

    /// Case-insensitive; surrounding whitespace is ignored
    fn from_str(s: &str) -> Result<Self> {
        let token = s.trim().to_lowercase();
        FilterOperator::from_token(&token).ok_or_else(|| FilterError::UnknownOperator {
            token,
            segment: s.to_string(),
        })
    }
}

/// One parsed clause: `property|operator|values`
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FilterExpression {
    property: String,
    operator: FilterOperator,
    values: FilterValues,
}

impl FilterExpression {
    /// Create a clause, enforcing that value-taking operators have values.
    /// Null tests drop any values they are given.
    pub fn new<I, S>(property: impl Into<String>, operator: FilterOperator, values: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let property = property.into();
        if property.trim().is_empty() {
            return Err(FilterError::MalformedClause {
                segment: format!("{}|{}", property, operator),
            });
        }

        let values: FilterValues = if operator.requires_values() {
            values.into_iter().map(Into::into).collect()
        } else {
            FilterValues::new()
        };

        if operator.requires_values() && values.is_empty() {
            return Err(FilterError::ValueRequired { property, operator });
        }

        Ok(Self {
            property,
            operator,
            values,
        })
    }

    /// Clause for a null test
    pub fn null_test(property: impl Into<String>, negated: bool) -> Result<Self> {
        let operator = if negated {
            FilterOperator::IsNotNull
        } else {
            FilterOperator::IsNull
        };
        Self::new(property, operator, std::iter::empty::<String>())
    }

    #[inline]
    pub fn property(&self) -> &str {
        &self.property
    }

    #[inline]
    pub fn operator(&self) -> FilterOperator {
        self.operator
    }

    #[inline]
    pub fn values(&self) -> &[String] {
        &self.values
    }
}

impl fmt::Display for FilterExpression {
    /// Renders the clause back into DSL form
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}|{}", self.property, self.operator)?;
        if !self.values.is_empty() {
            write!(f, "|{}", self.values.join(","))?;
        }
        Ok(())
    }
}
