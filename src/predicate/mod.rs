//! Compiled predicates
//!
//! A [`Predicate<T>`] is a small AST over one entity binding. It can be
//! evaluated directly, composed with other predicates, compiled once into a
//! closure, or walked through [`Predicate::expr`] by a consumer that wants to
//! translate it into another query representation.

mod ast;
mod evaluator;

pub use ast::*;
pub(crate) use evaluator::check;

use crate::error::{FilterError, Result};
use crate::schema::Filterable;
use std::fmt;
use std::marker::PhantomData;

/// Boolean predicate over entities of type `T`
pub struct Predicate<T> {
    expr: Expr,
    _entity: PhantomData<fn(&T) -> bool>,
}

impl<T: Filterable> Predicate<T> {
    /// The predicate that accepts every entity
    pub fn always() -> Self {
        Self::from_expr(Expr::True)
    }

    pub(crate) fn from_expr(expr: Expr) -> Self {
        Self {
            expr,
            _entity: PhantomData,
        }
    }

    /// Wrap a tree taken from another predicate over `T`.
    ///
    /// Every property reference must resolve against `T`'s schema to the
    /// same member and type it was built with.
    pub fn try_from_expr(expr: Expr) -> Result<Self> {
        let schema = T::schema();
        for property in expr.properties() {
            let matches = match schema.resolve(&property.path) {
                Ok((index, field)) => index == property.index && field.value_type() == property.value_type,
                Err(_) => false,
            };
            if !matches {
                return Err(FilterError::PropertyNotFound {
                    path: property.path.clone(),
                    entity: schema.entity(),
                });
            }
        }
        Ok(Self::from_expr(expr))
    }

    #[inline]
    pub fn expr(&self) -> &Expr {
        &self.expr
    }

    pub fn into_expr(self) -> Expr {
        self.expr
    }

    #[inline]
    pub fn is_always(&self) -> bool {
        self.expr == Expr::True
    }

    /// Evaluate against one entity
    #[inline]
    pub fn evaluate(&self, entity: &T) -> bool {
        check(&self.expr, T::schema(), entity)
    }

    /// Logical AND; an always-true side is absorbed
    pub fn and(self, other: Predicate<T>) -> Self {
        match (self.expr, other.expr) {
            (Expr::True, rhs) => Self::from_expr(rhs),
            (lhs, Expr::True) => Self::from_expr(lhs),
            (lhs, rhs) => Self::from_expr(Expr::and(lhs, rhs)),
        }
    }

    /// Logical OR; an always-true side makes the result always true
    pub fn or(self, other: Predicate<T>) -> Self {
        match (self.expr, other.expr) {
            (Expr::True, _) | (_, Expr::True) => Self::always(),
            (lhs, rhs) => Self::from_expr(Expr::or(lhs, rhs)),
        }
    }

    /// Iterate over the entities that satisfy the predicate
    pub fn filter<'a, I>(&'a self, items: I) -> impl Iterator<Item = &'a T> + 'a
    where
        I: IntoIterator<Item = &'a T>,
        I::IntoIter: 'a,
    {
        items.into_iter().filter(move |item| self.evaluate(item))
    }

    /// Compile into a standalone closure
    pub fn compile(self) -> Box<dyn Fn(&T) -> bool + Send + Sync> {
        let expr = self.expr;
        let schema = T::schema();
        Box::new(move |entity: &T| check(&expr, schema, entity))
    }
}

impl<T> Clone for Predicate<T> {
    fn clone(&self) -> Self {
        Self {
            expr: self.expr.clone(),
            _entity: PhantomData,
        }
    }
}

impl<T> fmt::Debug for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Predicate").field(&self.expr).finish()
    }
}

impl<T> fmt::Display for Predicate<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Display::fmt(&self.expr, f)
    }
}
