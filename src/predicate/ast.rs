//! Abstract Syntax Tree for compiled predicates

use crate::schema::{Value, ValueType};
use std::fmt;

/// AST node for a compiled predicate
#[derive(Debug, Clone, PartialEq)]
pub enum Expr {
    /// Always true; the empty filter
    True,
    /// `property <op> constant`
    Compare {
        property: PropertyRef,
        op: CompareOp,
        value: Value,
    },
    /// Case-insensitive substring test on a string member.
    /// `pattern` is stored lower-cased.
    Text {
        property: PropertyRef,
        op: TextOp,
        pattern: String,
    },
    /// `property IS NULL`, or `IS NOT NULL` when negated
    Null { property: PropertyRef, negated: bool },
    /// AND over every child; empty is true
    All(Vec<Expr>),
    /// OR over the children; empty is false
    Any(Vec<Expr>),
}

impl Expr {
    /// Conjunction of two nodes. Nested conjunctions are flattened, so
    /// folding n clauses yields one `All` of n children.
    pub fn and(left: Expr, right: Expr) -> Expr {
        let mut terms = match left {
            Expr::All(terms) => terms,
            other => vec![other],
        };
        match right {
            Expr::All(more) => terms.extend(more),
            other => terms.push(other),
        }
        Expr::All(terms)
    }

    /// Disjunction of two nodes, flattened like [`Expr::and`]
    pub fn or(left: Expr, right: Expr) -> Expr {
        let mut terms = match left {
            Expr::Any(terms) => terms,
            other => vec![other],
        };
        match right {
            Expr::Any(more) => terms.extend(more),
            other => terms.push(other),
        }
        Expr::Any(terms)
    }

    /// Disjunction of a list; a single node is returned as is
    pub fn any(mut terms: Vec<Expr>) -> Expr {
        if terms.len() == 1 {
            terms.remove(0)
        } else {
            Expr::Any(terms)
        }
    }

    /// Count of leaf nodes (comparisons, text and null tests)
    pub fn leaf_count(&self) -> usize {
        match self {
            Expr::True => 0,
            Expr::Compare { .. } | Expr::Text { .. } | Expr::Null { .. } => 1,
            Expr::All(terms) | Expr::Any(terms) => terms.iter().map(Expr::leaf_count).sum(),
        }
    }

    /// Every property referenced by the tree, in order of appearance
    pub fn properties(&self) -> Vec<&PropertyRef> {
        let mut found = Vec::new();
        self.collect_properties(&mut found);
        found
    }

    fn collect_properties<'a>(&'a self, found: &mut Vec<&'a PropertyRef>) {
        match self {
            Expr::True => {}
            Expr::Compare { property, .. }
            | Expr::Text { property, .. }
            | Expr::Null { property, .. } => found.push(property),
            Expr::All(terms) | Expr::Any(terms) => {
                for term in terms {
                    term.collect_properties(found);
                }
            }
        }
    }
}

/// Reference to a resolved member of the entity being filtered
#[derive(Debug, Clone, PartialEq)]
pub struct PropertyRef {
    /// Canonical path as registered
    pub path: String,
    /// Index into the entity schema
    pub index: usize,
    pub value_type: ValueType,
    pub nullable: bool,
}

/// Comparison operators
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CompareOp {
    /// Equal (==)
    Eq,
    /// Not equal (!=)
    Ne,
    /// Greater than (>)
    Gt,
    /// Greater than or equal (>=)
    Ge,
    /// Less than (<)
    Lt,
    /// Less than or equal (<=)
    Le,
}

impl CompareOp {
    pub fn symbol(self) -> &'static str {
        match self {
            CompareOp::Eq => "==",
            CompareOp::Ne => "!=",
            CompareOp::Gt => ">",
            CompareOp::Ge => ">=",
            CompareOp::Lt => "<",
            CompareOp::Le => "<=",
        }
    }
}

/// Substring tests
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TextOp {
    Contains,
    StartsWith,
    EndsWith,
}

impl TextOp {
    pub fn name(self) -> &'static str {
        match self {
            TextOp::Contains => "contains",
            TextOp::StartsWith => "starts_with",
            TextOp::EndsWith => "ends_with",
        }
    }
}

impl fmt::Display for Expr {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Expr::True => f.write_str("true"),
            Expr::Compare {
                property,
                op,
                value,
            } => {
                // Render enum constants by name rather than by index
                match (value, property.value_type) {
                    (Value::Enum(idx), ValueType::Enum { variants, .. }) if *idx < variants.len() => {
                        write!(f, "{} {} {}", property.path, op.symbol(), variants[*idx])
                    }
                    _ => write!(f, "{} {} {}", property.path, op.symbol(), value),
                }
            }
            Expr::Text {
                property,
                op,
                pattern,
            } => write!(f, "lower({}).{}({:?})", property.path, op.name(), pattern),
            Expr::Null { property, negated } => {
                if *negated {
                    write!(f, "{} != null", property.path)
                } else {
                    write!(f, "{} == null", property.path)
                }
            }
            Expr::All(terms) => write_joined(f, terms, " && ", "true"),
            Expr::Any(terms) => write_joined(f, terms, " || ", "false"),
        }
    }
}

fn write_joined(f: &mut fmt::Formatter<'_>, terms: &[Expr], sep: &str, empty: &str) -> fmt::Result {
    if terms.is_empty() {
        return f.write_str(empty);
    }
    f.write_str("(")?;
    for (i, term) in terms.iter().enumerate() {
        if i > 0 {
            f.write_str(sep)?;
        }
        write!(f, "{}", term)?;
    }
    f.write_str(")")
}
