//! Predicate evaluator

use crate::predicate::ast::{CompareOp, Expr, TextOp};
use crate::schema::{Schema, Value};
use std::cmp::Ordering;

/// Evaluate an AST against an entity
pub(crate) fn check<T>(expr: &Expr, schema: &Schema<T>, entity: &T) -> bool {
    match expr {
        Expr::True => true,
        Expr::Compare {
            property,
            op,
            value,
        } => match schema.field_at(property.index) {
            Some(field) => compare(&field.read(entity), *op, value),
            None => false,
        },
        Expr::Text {
            property,
            op,
            pattern,
        } => match schema.field_at(property.index).map(|f| f.read(entity)) {
            Some(Value::String(s)) => match_text(&s.to_lowercase(), *op, pattern),
            _ => false,
        },
        Expr::Null { property, negated } => match schema.field_at(property.index) {
            Some(field) => field.read(entity).is_null() != *negated,
            None => false,
        },
        Expr::All(terms) => terms.iter().all(|term| check(term, schema, entity)),
        Expr::Any(terms) => terms.iter().any(|term| check(term, schema, entity)),
    }
}

/// Lifted comparison: a null member equals nothing and is ordered against nothing
fn compare(actual: &Value, op: CompareOp, expected: &Value) -> bool {
    if actual.is_null() {
        return op == CompareOp::Ne;
    }

    match op {
        CompareOp::Eq => actual == expected,
        CompareOp::Ne => actual != expected,
        CompareOp::Gt => actual.partial_cmp(expected) == Some(Ordering::Greater),
        CompareOp::Ge => matches!(
            actual.partial_cmp(expected),
            Some(Ordering::Greater | Ordering::Equal)
        ),
        CompareOp::Lt => actual.partial_cmp(expected) == Some(Ordering::Less),
        CompareOp::Le => matches!(
            actual.partial_cmp(expected),
            Some(Ordering::Less | Ordering::Equal)
        ),
    }
}

#[inline]
fn match_text(haystack: &str, op: TextOp, pattern: &str) -> bool {
    match op {
        TextOp::Contains => haystack.contains(pattern),
        TextOp::StartsWith => haystack.starts_with(pattern),
        TextOp::EndsWith => haystack.ends_with(pattern),
    }
}
