//! Compiles a single `FilterExpression` into a predicate

use crate::error::{FilterError, Result};
use crate::filter::expression::{FilterExpression, FilterOperator};
use crate::predicate::{CompareOp, Expr, Predicate, PropertyRef, TextOp};
use crate::schema::{parse_literal, Filterable};
use std::marker::PhantomData;

/// Builds predicates over `T` from individual clauses.
///
/// Stateless; one instance can be shared freely between threads.
pub struct FilterExpressionBuilder<T> {
    _entity: PhantomData<fn() -> T>,
}

impl<T: Filterable> FilterExpressionBuilder<T> {
    pub fn new() -> Self {
        Self {
            _entity: PhantomData,
        }
    }

    /// Compile one clause
    pub fn build(&self, expression: &FilterExpression) -> Result<Predicate<T>> {
        let property = self.resolve(expression.property())?;
        let expr = build_expr(expression, property)?;
        Ok(Predicate::from_expr(expr))
    }

    /// Resolve a dotted property path against `T`'s schema
    pub fn resolve(&self, path: &str) -> Result<PropertyRef> {
        let (index, field) = T::schema().resolve(path)?;
        Ok(PropertyRef {
            path: field.path().to_string(),
            index,
            value_type: field.value_type(),
            nullable: field.nullable(),
        })
    }
}

impl<T: Filterable> Default for FilterExpressionBuilder<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> Clone for FilterExpressionBuilder<T> {
    fn clone(&self) -> Self {
        Self {
            _entity: PhantomData,
        }
    }
}

impl<T> std::fmt::Debug for FilterExpressionBuilder<T> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FilterExpressionBuilder")
    }
}

fn build_expr(expression: &FilterExpression, property: PropertyRef) -> Result<Expr> {
    let operator = expression.operator();
    let values = expression.values();

    match operator {
        FilterOperator::Equals => compare(property, CompareOp::Eq, first(expression)?),
        FilterOperator::NotEquals => compare(property, CompareOp::Ne, first(expression)?),
        FilterOperator::GreaterThan
        | FilterOperator::GreaterOrEqual
        | FilterOperator::LessThan
        | FilterOperator::LessOrEqual => {
            require_ordered(expression, &property)?;
            let op = match operator {
                FilterOperator::GreaterThan => CompareOp::Gt,
                FilterOperator::GreaterOrEqual => CompareOp::Ge,
                FilterOperator::LessThan => CompareOp::Lt,
                _ => CompareOp::Le,
            };
            compare(property, op, first(expression)?)
        }
        FilterOperator::Contains | FilterOperator::StartsWith | FilterOperator::EndsWith => {
            if !property.value_type.is_string() {
                return Err(mismatch(expression, &property));
            }
            let pattern = first(expression)?;
            // Rejects blank patterns; strings otherwise pass through
            parse_literal(pattern, property.value_type)?;
            let op = match operator {
                FilterOperator::Contains => TextOp::Contains,
                FilterOperator::StartsWith => TextOp::StartsWith,
                _ => TextOp::EndsWith,
            };
            Ok(Expr::Text {
                property,
                op,
                pattern: pattern.to_lowercase(),
            })
        }
        FilterOperator::Between => {
            if values.len() != 2 {
                return Err(FilterError::InvalidArity {
                    property: expression.property().to_string(),
                    operator,
                    expected: "exactly 2",
                    actual: values.len(),
                });
            }
            require_ordered(expression, &property)?;
            let lower = compare(property.clone(), CompareOp::Ge, &values[0])?;
            let upper = compare(property, CompareOp::Le, &values[1])?;
            Ok(Expr::and(lower, upper))
        }
        FilterOperator::In => {
            if values.is_empty() {
                return Err(FilterError::InvalidArity {
                    property: expression.property().to_string(),
                    operator,
                    expected: "at least 1",
                    actual: 0,
                });
            }
            let terms = values
                .iter()
                .map(|literal| compare(property.clone(), CompareOp::Eq, literal))
                .collect::<Result<Vec<_>>>()?;
            Ok(Expr::any(terms))
        }
        FilterOperator::IsNull => Ok(Expr::Null {
            property,
            negated: false,
        }),
        FilterOperator::IsNotNull => Ok(Expr::Null {
            property,
            negated: true,
        }),
    }
}

fn compare(property: PropertyRef, op: CompareOp, literal: &str) -> Result<Expr> {
    let value = parse_literal(literal, property.value_type)?;
    Ok(Expr::Compare {
        property,
        op,
        value,
    })
}

/// The single literal used by the comparison and text operators
fn first(expression: &FilterExpression) -> Result<&str> {
    expression
        .values()
        .first()
        .map(String::as_str)
        .ok_or_else(|| FilterError::InvalidArity {
            property: expression.property().to_string(),
            operator: expression.operator(),
            expected: "at least 1",
            actual: 0,
        })
}

fn require_ordered(expression: &FilterExpression, property: &PropertyRef) -> Result<()> {
    if property.value_type.is_ordered() {
        Ok(())
    } else {
        Err(mismatch(expression, property))
    }
}

fn mismatch(expression: &FilterExpression, property: &PropertyRef) -> FilterError {
    FilterError::OperatorTypeMismatch {
        property: expression.property().to_string(),
        operator: expression.operator(),
        value_type: property.value_type,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::LiteralError;
    use crate::fixtures::{date, Status, Student};
    use crate::schema::Value;

    fn build(property: &str, operator: FilterOperator, values: &[&str]) -> Result<Predicate<Student>> {
        let expr = FilterExpression::new(property, operator, values.iter().copied())?;
        FilterExpressionBuilder::<Student>::new().build(&expr)
    }

    #[test]
    fn test_equals_converts_to_declared_type() {
        let pred = build("cgpa", FilterOperator::Equals, &["3.5"]).unwrap();
        match pred.expr() {
            Expr::Compare {
                property, value, ..
            } => {
                assert_eq!(property.path, "CGPA");
                assert_eq!(*value, Value::Float(3.5));
            }
            other => panic!("Expected comparison, got {:?}", other),
        }

        let student = Student::sample();
        assert!(pred.evaluate(&student));
        assert!(!build("CGPA", FilterOperator::Equals, &["3.6"]).unwrap().evaluate(&student));
    }

    #[test]
    fn test_not_equals() {
        let student = Student::sample();
        assert!(build("Age", FilterOperator::NotEquals, &["30"]).unwrap().evaluate(&student));
        assert!(!build("Age", FilterOperator::NotEquals, &["21"]).unwrap().evaluate(&student));
    }

    #[test]
    fn test_equality_on_each_member_type() {
        let mut student = Student::sample();
        student.last_login = Some(date(2024, 1, 15).and_hms_opt(10, 30, 0).unwrap());
        let id = "67e55044-10b1-426f-9247-bb680e5fe0c8";

        let cases = [
            ("Active", "true", true),
            ("Active", "FALSE", false),
            ("Id", id, true),
            ("Id", "00000000-0000-0000-0000-000000000002", false),
            ("Credits", "90", true),
            ("Credits", "91", false),
            ("EnrolledOn", "2022-09-01", true),
            ("LastLogin", "2024-01-15T10:30:00", true),
            ("LastLogin", "2024-01-15", false),
            ("Address.PostCode", "49007", true),
        ];
        for (property, literal, expected) in cases {
            let eq = build(property, FilterOperator::Equals, &[literal]).unwrap();
            let neq = build(property, FilterOperator::NotEquals, &[literal]).unwrap();
            assert_eq!(eq.evaluate(&student), expected, "{}|eq|{}", property, literal);
            assert_eq!(neq.evaluate(&student), !expected, "{}|neq|{}", property, literal);
        }
    }

    #[test]
    fn test_unsigned_member_rejects_negative_literal() {
        let err = build("Credits", FilterOperator::GreaterThan, &["-1"]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidValue {
                source: LiteralError::Int(_),
                ..
            }
        ));
    }

    #[test]
    fn test_null_date_time_member() {
        let mut student = Student::sample();
        assert!(student.last_login.is_none());

        for op in [
            FilterOperator::GreaterThan,
            FilterOperator::GreaterOrEqual,
            FilterOperator::LessThan,
            FilterOperator::LessOrEqual,
            FilterOperator::Equals,
        ] {
            let pred = build("LastLogin", op, &["2024-01-15"]).unwrap();
            assert!(!pred.evaluate(&student), "LastLogin {} on null", op);
        }
        assert!(!build("LastLogin", FilterOperator::Between, &["2000-01-01", "2100-01-01"])
            .unwrap()
            .evaluate(&student));
        assert!(build("LastLogin", FilterOperator::NotEquals, &["2024-01-15"])
            .unwrap()
            .evaluate(&student));

        student.last_login = Some(date(2024, 3, 1).and_hms_opt(8, 0, 0).unwrap());
        assert!(build("LastLogin", FilterOperator::GreaterThan, &["2024-01-15"])
            .unwrap()
            .evaluate(&student));
    }

    #[test]
    fn test_enum_equality() {
        let mut student = Student::sample();
        let pred = build("Status", FilterOperator::Equals, &["active"]).unwrap();
        assert!(pred.evaluate(&student));

        student.status = Status::Graduated;
        assert!(!pred.evaluate(&student));
    }

    #[test]
    fn test_ordered_comparisons() {
        let student = Student::sample(); // age 21
        let cases = [
            (FilterOperator::GreaterThan, "21", false),
            (FilterOperator::GreaterThan, "20", true),
            (FilterOperator::GreaterOrEqual, "21", true),
            (FilterOperator::LessThan, "21", false),
            (FilterOperator::LessThan, "22", true),
            (FilterOperator::LessOrEqual, "21", true),
        ];
        for (op, literal, expected) in cases {
            let pred = build("Age", op, &[literal]).unwrap();
            assert_eq!(pred.evaluate(&student), expected, "Age {} {}", op, literal);
        }
    }

    #[test]
    fn test_ordered_comparison_on_dates() {
        let student = Student::sample(); // enrolled 2022-09-01
        assert!(build("EnrolledOn", FilterOperator::GreaterOrEqual, &["2022-01-01"])
            .unwrap()
            .evaluate(&student));
        assert!(!build("EnrolledOn", FilterOperator::LessThan, &["09/01/2022"])
            .unwrap()
            .evaluate(&student));
    }

    #[test]
    fn test_ordered_comparison_on_string_is_mismatch() {
        let err = build("Name", FilterOperator::GreaterThan, &["M"]).unwrap_err();
        assert!(matches!(err, FilterError::OperatorTypeMismatch { .. }));
    }

    #[test]
    fn test_text_operators_are_case_insensitive() {
        let student = Student::sample(); // "John Smith"
        for needle in ["mi", "MI", "Mi"] {
            assert!(build("Name", FilterOperator::Contains, &[needle])
                .unwrap()
                .evaluate(&student));
        }
        assert!(build("Name", FilterOperator::StartsWith, &["JOHN"]).unwrap().evaluate(&student));
        assert!(build("Name", FilterOperator::EndsWith, &["smith"]).unwrap().evaluate(&student));
        assert!(!build("Name", FilterOperator::EndsWith, &["john"]).unwrap().evaluate(&student));
    }

    #[test]
    fn test_text_operator_requires_string_member() {
        for property in ["Age", "Status", "Active"] {
            let err = build(property, FilterOperator::Contains, &["1"]).unwrap_err();
            assert!(
                matches!(err, FilterError::OperatorTypeMismatch { .. }),
                "property: {}",
                property
            );
        }
    }

    #[test]
    fn test_text_operator_on_optional_string() {
        let mut student = Student::sample();
        let pred = build("Department", FilterOperator::StartsWith, &["c"]).unwrap();
        assert!(pred.evaluate(&student));

        student.department = None;
        assert!(!pred.evaluate(&student));
    }

    #[test]
    fn test_between_is_inclusive() {
        let pred = build("Age", FilterOperator::Between, &["18", "30"]).unwrap();
        let mut student = Student::sample();
        for (age, expected) in [(17, false), (18, true), (25, true), (30, true), (31, false)] {
            student.age = age;
            assert_eq!(pred.evaluate(&student), expected, "age {}", age);
        }
    }

    #[test]
    fn test_between_arity() {
        for values in [&["10"][..], &["1", "2", "3"][..]] {
            let err = build("Age", FilterOperator::Between, values).unwrap_err();
            match err {
                FilterError::InvalidArity { actual, expected, .. } => {
                    assert_eq!(actual, values.len());
                    assert_eq!(expected, "exactly 2");
                }
                other => panic!("Expected InvalidArity, got {:?}", other),
            }
        }
    }

    #[test]
    fn test_in_is_a_disjunction() {
        let pred = build("Department", FilterOperator::In, &["CS", "EE", "ME"]).unwrap();
        assert_eq!(pred.expr().leaf_count(), 3);
        assert!(matches!(pred.expr(), Expr::Any(terms) if terms.len() == 3));

        let mut student = Student::sample();
        for (dept, expected) in [(Some("CS"), true), (Some("ME"), true), (Some("BIO"), false), (None, false)] {
            student.department = dept.map(str::to_string);
            assert_eq!(pred.evaluate(&student), expected, "department {:?}", dept);
        }
    }

    #[test]
    fn test_in_with_single_value_is_equality() {
        let pred = build("Age", FilterOperator::In, &["21"]).unwrap();
        assert!(matches!(pred.expr(), Expr::Compare { op: CompareOp::Eq, .. }));
    }

    #[test]
    fn test_null_tests() {
        let mut student = Student::sample();
        let is_null = build("Department", FilterOperator::IsNull, &[]).unwrap();
        let not_null = build("Department", FilterOperator::IsNotNull, &[]).unwrap();
        assert!(!is_null.evaluate(&student));
        assert!(not_null.evaluate(&student));

        student.department = None;
        assert!(is_null.evaluate(&student));
        assert!(!not_null.evaluate(&student));
    }

    #[test]
    fn test_null_test_on_non_nullable_member_degrades() {
        let student = Student::sample();
        assert!(!build("Age", FilterOperator::IsNull, &[]).unwrap().evaluate(&student));
        assert!(build("Age", FilterOperator::IsNotNull, &[]).unwrap().evaluate(&student));
    }

    #[test]
    fn test_nested_and_optional_nested_paths() {
        let student = Student::sample();
        assert!(build("address.city", FilterOperator::Equals, &["Springfield"])
            .unwrap()
            .evaluate(&student));
        assert!(build("Mentor.City", FilterOperator::IsNull, &[]).unwrap().evaluate(&student));
        assert!(!build("Mentor.City", FilterOperator::Equals, &["Springfield"])
            .unwrap()
            .evaluate(&student));
    }

    #[test]
    fn test_unknown_property() {
        let err = build("Address.Country", FilterOperator::Equals, &["US"]).unwrap_err();
        match err {
            FilterError::PropertyNotFound { path, entity } => {
                assert_eq!(path, "Address.Country");
                assert_eq!(entity, "Student");
            }
            other => panic!("Expected PropertyNotFound, got {:?}", other),
        }
    }

    #[test]
    fn test_conversion_failure() {
        let err = build("Age", FilterOperator::Equals, &["twenty"]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidValue {
                source: LiteralError::Int(_),
                ..
            }
        ));

        let err = build("Status", FilterOperator::In, &["Active", "Expelled"]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { ref literal, .. } if literal == "Expelled"));
    }

    #[test]
    fn test_whitespace_literal_rejected() {
        let err = build("Name", FilterOperator::Equals, &["  "]).unwrap_err();
        assert!(matches!(
            err,
            FilterError::InvalidValue {
                source: LiteralError::Empty,
                ..
            }
        ));

        let err = build("Name", FilterOperator::Contains, &[" "]).unwrap_err();
        assert!(matches!(err, FilterError::InvalidValue { .. }));
    }

    #[test]
    fn test_building_twice_gives_same_tree() {
        let expr = FilterExpression::new("Age", FilterOperator::Between, vec!["18", "30"]).unwrap();
        let builder = FilterExpressionBuilder::<Student>::new();
        let a = builder.build(&expr).unwrap();
        let b = builder.build(&expr).unwrap();
        assert_eq!(a.expr(), b.expr());
    }
}
