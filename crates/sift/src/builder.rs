//! Fluent factory for expression trees.

use regex::Regex;

use crate::error::Result;
use crate::expr::{Comparison, CompositeExpression, CompositeKind, Expression, Operator};
use crate::value::Value;

/// Stateless factory producing [`Expression`] nodes.
///
/// Each method returns a new, immutable node; nothing is evaluated. The
/// builder is a zero-sized value, so construct one wherever it is needed or
/// get one from [`Criteria::expr`](crate::Criteria::expr).
///
/// # Example
///
/// ```
/// use sift::ExpressionBuilder;
///
/// let eb = ExpressionBuilder;
/// let expr = eb
///     .and_x([
///         eb.gte("priority", 3),
///         eb.or_x([eb.contains("name", "urgent"), eb.is_null("owner")]).unwrap(),
///     ])
///     .unwrap();
/// assert_eq!(
///     expr.to_string(),
///     r#"(priority >= 3 AND (name CONTAINS "urgent" OR owner = null))"#
/// );
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ExpressionBuilder;

impl ExpressionBuilder {
    /// Creates a builder.
    pub fn new() -> Self {
        ExpressionBuilder
    }

    /// Conjunction of all given expressions.
    pub fn and_x(&self, children: impl IntoIterator<Item = Expression>) -> Result<Expression> {
        self.composite(CompositeKind::And, children)
    }

    /// Disjunction of all given expressions.
    pub fn or_x(&self, children: impl IntoIterator<Item = Expression>) -> Result<Expression> {
        self.composite(CompositeKind::Or, children)
    }

    /// Negation of a single expression.
    pub fn not(&self, child: Expression) -> Result<Expression> {
        self.composite(CompositeKind::Not, [child])
    }

    fn composite(
        &self,
        kind: CompositeKind,
        children: impl IntoIterator<Item = Expression>,
    ) -> Result<Expression> {
        CompositeExpression::new(kind, children.into_iter().collect()).map(Expression::Composite)
    }

    /// Generic comparison.
    pub fn comparison(&self, field: &str, op: Operator, value: impl Into<Value>) -> Expression {
        Expression::Comparison(Comparison::new(field, op, value))
    }

    /// `field = value`.
    pub fn eq(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Eq, value)
    }

    /// `field <> value`.
    pub fn neq(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Neq, value)
    }

    /// `field < value`.
    pub fn lt(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Lt, value)
    }

    /// `field <= value`.
    pub fn lte(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Lte, value)
    }

    /// `field > value`.
    pub fn gt(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Gt, value)
    }

    /// `field >= value`.
    pub fn gte(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Gte, value)
    }

    /// `field = null`.
    pub fn is_null(&self, field: &str) -> Expression {
        self.comparison(field, Operator::Eq, Value::Null)
    }

    /// `field <> null`.
    pub fn is_not_null(&self, field: &str) -> Expression {
        self.comparison(field, Operator::Neq, Value::Null)
    }

    /// `field IN (values...)`.
    pub fn in_<I, V>(&self, field: &str, values: I) -> Expression
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.comparison(field, Operator::In, values.into_iter().collect::<Value>())
    }

    /// `field NIN (values...)`.
    pub fn not_in<I, V>(&self, field: &str, values: I) -> Expression
    where
        I: IntoIterator<Item = V>,
        V: Into<Value>,
    {
        self.comparison(field, Operator::Nin, values.into_iter().collect::<Value>())
    }

    /// Field text contains `value`.
    pub fn contains(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::Contains, value)
    }

    /// `value` occurs in the field's list or map.
    pub fn member_of(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::MemberOf, value)
    }

    /// Field text starts with `value`.
    pub fn starts_with(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::StartsWith, value)
    }

    /// Field text ends with `value`.
    pub fn ends_with(&self, field: &str, value: impl Into<Value>) -> Expression {
        self.comparison(field, Operator::EndsWith, value)
    }

    /// Field text matches a regular expression.
    ///
    /// Returns an error if the pattern is invalid.
    pub fn matches(&self, field: &str, pattern: &str) -> Result<Expression> {
        Regex::new(pattern)?;
        Ok(self.comparison(field, Operator::Matches, pattern))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::SiftError;

    #[test]
    fn comparisons_map_to_operators() {
        let eb = ExpressionBuilder::new();
        let cases = [
            (eb.eq("f", 1), Operator::Eq),
            (eb.neq("f", 1), Operator::Neq),
            (eb.lt("f", 1), Operator::Lt),
            (eb.lte("f", 1), Operator::Lte),
            (eb.gt("f", 1), Operator::Gt),
            (eb.gte("f", 1), Operator::Gte),
            (eb.in_("f", [1, 2]), Operator::In),
            (eb.not_in("f", [1, 2]), Operator::Nin),
            (eb.contains("f", "x"), Operator::Contains),
            (eb.member_of("f", "x"), Operator::MemberOf),
            (eb.starts_with("f", "x"), Operator::StartsWith),
            (eb.ends_with("f", "x"), Operator::EndsWith),
        ];
        for (expr, op) in cases {
            match expr {
                Expression::Comparison(cmp) => {
                    assert_eq!(cmp.operator(), op);
                    assert_eq!(cmp.field(), "f");
                }
                other => panic!("expected comparison, got {:?}", other),
            }
        }
    }

    #[test]
    fn in_collects_a_list() {
        let expr = ExpressionBuilder.in_("status", ["open", "closed"]);
        let Expression::Comparison(cmp) = expr else {
            panic!("expected comparison");
        };
        assert_eq!(cmp.value(), &Value::from(vec!["open", "closed"]));
    }

    #[test]
    fn null_helpers() {
        let eb = ExpressionBuilder;
        assert_eq!(
            eb.is_null("x"),
            Expression::Comparison(Comparison::new("x", Operator::Eq, Value::Null))
        );
        assert_eq!(
            eb.is_not_null("x"),
            Expression::Comparison(Comparison::new("x", Operator::Neq, Value::Null))
        );
    }

    #[test]
    fn composites() {
        let eb = ExpressionBuilder;
        let and = eb.and_x([eb.eq("a", 1), eb.eq("b", 2)]).unwrap();
        let Expression::Composite(composite) = &and else {
            panic!("expected composite");
        };
        assert_eq!(composite.kind(), CompositeKind::And);
        assert_eq!(composite.children().len(), 2);

        assert!(eb.not(and).is_ok());
        assert!(eb.not(Expression::Value(Value::Null)).is_err());
    }

    #[test]
    fn invalid_regex_rejected() {
        let err = ExpressionBuilder.matches("name", "(unclosed").unwrap_err();
        assert!(matches!(err, SiftError::InvalidPattern(_)));
        assert!(ExpressionBuilder.matches("name", r"^\d+$").is_ok());
    }
}
