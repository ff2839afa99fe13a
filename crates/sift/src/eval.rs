//! Compilation of expression trees into predicates and comparators.
//!
//! [`ExpressionEvaluator::compile`] walks an [`Expression`] once, validates
//! it, and returns a [`Predicate`]: a closure tree that reads fields through
//! the evaluator's [`FieldAccessor`]. Regular expressions are compiled here,
//! not per record.
//!
//! # Operator Semantics
//!
//! | Operator | Holds when |
//! |----------|------------|
//! | `Eq` / `Neq` | strict equality (same kind, same value) / its negation |
//! | `Lt` `Lte` `Gt` `Gte` | same-kind natural order; mixed kinds never hold |
//! | `In` / `Nin` | field strictly equals a list element / none |
//! | `Contains` `StartsWith` `EndsWith` | substring test on the text forms |
//! | `MemberOf` | literal strictly equals an element of the field's list or map |
//! | `Matches` | regex matches the field text |

use std::cmp::Ordering;
use std::fmt;

use regex::Regex;

use crate::accessor::FieldAccessor;
use crate::criteria::Direction;
use crate::error::{Result, SiftError};
use crate::expr::{Comparison, CompositeExpression, CompositeKind, Expression, Operator};
use crate::record::Record;
use crate::value::Value;

type PredicateFn = dyn Fn(&dyn Record) -> Result<bool> + Send + Sync;

/// A compiled, executable predicate over records.
pub struct Predicate {
    test: Box<PredicateFn>,
}

impl Predicate {
    fn new(test: impl Fn(&dyn Record) -> Result<bool> + Send + Sync + 'static) -> Self {
        Predicate {
            test: Box::new(test),
        }
    }

    /// Evaluates the predicate against a record.
    ///
    /// Field resolution failures propagate as errors.
    pub fn test(&self, record: &dyn Record) -> Result<bool> {
        (self.test)(record)
    }
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("Predicate(..)")
    }
}

/// Compiles expressions and orderings against a [`FieldAccessor`].
///
/// The evaluator holds no state besides its accessor configuration.
///
/// # Example
///
/// ```
/// use sift::{ExpressionBuilder, ExpressionEvaluator, Value};
/// use indexmap::IndexMap;
///
/// let eb = ExpressionBuilder;
/// let predicate = ExpressionEvaluator::default()
///     .compile(&eb.and_x([eb.eq("a", 1), eb.gt("b", 1)]).unwrap())
///     .unwrap();
///
/// let mut record = IndexMap::new();
/// record.insert("a".to_string(), Value::from(1));
/// record.insert("b".to_string(), Value::from(2));
/// assert!(predicate.test(&record).unwrap());
/// ```
#[derive(Debug, Clone, Default)]
pub struct ExpressionEvaluator {
    accessor: FieldAccessor,
}

impl ExpressionEvaluator {
    /// Creates an evaluator with a custom accessor.
    pub fn new(accessor: FieldAccessor) -> Self {
        ExpressionEvaluator { accessor }
    }

    /// Returns the accessor used to read fields.
    pub fn accessor(&self) -> &FieldAccessor {
        &self.accessor
    }

    /// Compiles an expression into a predicate.
    ///
    /// Fails fast with [`SiftError::InvalidExpression`] for a bare value, an
    /// `In`/`Nin` whose literal is not a list, or a non-string `Matches`
    /// pattern; with [`SiftError::InvalidPattern`] for a bad regex.
    pub fn compile(&self, expr: &Expression) -> Result<Predicate> {
        log::trace!("compiling expression {}", expr);
        match expr {
            Expression::Value(value) => Err(SiftError::invalid_expression(format!(
                "bare value {} cannot be used as a predicate",
                Expression::Value(value.clone())
            ))),
            Expression::Comparison(cmp) => self.compile_comparison(cmp),
            Expression::Composite(composite) => self.compile_composite(composite),
        }
    }

    fn compile_composite(&self, composite: &CompositeExpression) -> Result<Predicate> {
        let children = composite
            .children()
            .iter()
            .map(|child| self.compile(child))
            .collect::<Result<Vec<_>>>()?;

        let predicate = match composite.kind() {
            CompositeKind::And => Predicate::new(move |record| {
                for child in &children {
                    if !child.test(record)? {
                        return Ok(false);
                    }
                }
                Ok(true)
            }),
            CompositeKind::Or => Predicate::new(move |record| {
                for child in &children {
                    if child.test(record)? {
                        return Ok(true);
                    }
                }
                Ok(false)
            }),
            CompositeKind::Not => {
                let mut children = children;
                let child = children.pop().ok_or_else(|| {
                    SiftError::invalid_expression("NOT takes exactly one child, got 0")
                })?;
                Predicate::new(move |record| Ok(!child.test(record)?))
            }
        };
        Ok(predicate)
    }

    fn compile_comparison(&self, cmp: &Comparison) -> Result<Predicate> {
        let accessor = self.accessor.clone();
        let field = cmp.field().to_string();
        let literal = cmp.value().clone();
        let op = cmp.operator();

        let check: Box<dyn Fn(&Value) -> bool + Send + Sync> = match op {
            Operator::Eq => Box::new(move |value: &Value| *value == literal),
            Operator::Neq => Box::new(move |value: &Value| *value != literal),
            Operator::Lt | Operator::Lte | Operator::Gt | Operator::Gte => {
                Box::new(move |value: &Value| match value.compare(&literal) {
                    Some(ordering) => op.eval_ordering(ordering),
                    None => false,
                })
            }
            Operator::In | Operator::Nin => {
                let items = match literal {
                    Value::List(items) => items,
                    other => {
                        return Err(SiftError::invalid_expression(format!(
                            "{} on '{}' needs a list, got {}",
                            op,
                            field,
                            other.kind()
                        )))
                    }
                };
                let negate = op == Operator::Nin;
                Box::new(move |value: &Value| items.contains(value) != negate)
            }
            Operator::Contains => {
                let needle = literal.to_string();
                Box::new(move |value: &Value| value.to_string().contains(&needle))
            }
            Operator::StartsWith => {
                let prefix = literal.to_string();
                Box::new(move |value: &Value| value.to_string().starts_with(&prefix))
            }
            Operator::EndsWith => {
                let suffix = literal.to_string();
                Box::new(move |value: &Value| value.to_string().ends_with(&suffix))
            }
            Operator::MemberOf => Box::new(move |value: &Value| match value {
                Value::List(items) => items.contains(&literal),
                Value::Map(map) => map.values().any(|item| *item == literal),
                _ => false,
            }),
            Operator::Matches => {
                let Some(pattern) = literal.as_str() else {
                    return Err(SiftError::invalid_expression(format!(
                        "MATCHES on '{}' needs a string pattern, got {}",
                        field,
                        literal.kind()
                    )));
                };
                let regex = Regex::new(pattern)?;
                Box::new(move |value: &Value| regex.is_match(&value.to_string()))
            }
        };

        Ok(Predicate::new(move |record| {
            let value = accessor.get(record, &field)?;
            Ok(check(&value))
        }))
    }

    /// Builds a single-field comparator that defers ties to `next`.
    pub fn compare_by(
        &self,
        field: impl Into<String>,
        direction: Direction,
        next: Option<FieldComparator>,
    ) -> FieldComparator {
        FieldComparator {
            field: field.into(),
            direction,
            next: next.map(Box::new),
            accessor: self.accessor.clone(),
        }
    }

    /// Builds the comparator chain for a list of orderings.
    ///
    /// Orderings are folded right to left, so the first one is the primary
    /// key and each later one only breaks ties left by the ones before it.
    /// Returns `None` when there are no orderings.
    pub fn comparator<'a, I>(&self, orderings: I) -> Option<FieldComparator>
    where
        I: IntoIterator<Item = (&'a str, Direction)>,
        I::IntoIter: DoubleEndedIterator,
    {
        orderings.into_iter().rev().fold(None, |next, (field, direction)| {
            log::trace!("ordering by {} {}", field, direction);
            Some(self.compare_by(field, direction, next))
        })
    }
}

/// Compares two records by one field, then by the rest of its chain.
#[derive(Debug, Clone)]
pub struct FieldComparator {
    field: String,
    direction: Direction,
    next: Option<Box<FieldComparator>>,
    accessor: FieldAccessor,
}

impl FieldComparator {
    /// The field this link of the chain compares.
    pub fn field(&self) -> &str {
        &self.field
    }

    /// The direction applied to this link's comparison.
    pub fn direction(&self) -> Direction {
        self.direction
    }

    /// The tie-breaking comparator, if any.
    pub fn next(&self) -> Option<&FieldComparator> {
        self.next.as_deref()
    }

    /// Compares two records.
    ///
    /// Values are ordered by [`Value::sort_cmp`]; the direction applies only
    /// to this link, the tie-breaker keeps its own direction.
    pub fn compare(&self, a: &dyn Record, b: &dyn Record) -> Result<Ordering> {
        let left = self.accessor.get(a, &self.field)?;
        let right = self.accessor.get(b, &self.field)?;
        match left.sort_cmp(&right) {
            Ordering::Equal => match &self.next {
                Some(next) => next.compare(a, b),
                None => Ok(Ordering::Equal),
            },
            ordering => Ok(self.direction.apply(ordering)),
        }
    }
}

/// Stable sort with a fallible comparison.
///
/// The first error stops further comparisons from mattering and is returned
/// once the sort completes; the slice order is then unspecified.
pub(crate) fn sort_fallibly<T, F>(items: &mut [T], mut compare: F) -> Result<()>
where
    F: FnMut(&T, &T) -> Result<Ordering>,
{
    let mut failure = None;
    items.sort_by(|a, b| {
        if failure.is_some() {
            return Ordering::Equal;
        }
        compare(a, b).unwrap_or_else(|err| {
            failure = Some(err);
            Ordering::Equal
        })
    });
    match failure {
        Some(err) => Err(err),
        None => Ok(()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::builder::ExpressionBuilder;
    use crate::value::Timestamp;
    use indexmap::IndexMap;

    fn record(pairs: &[(&str, Value)]) -> IndexMap<String, Value> {
        pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.clone()))
            .collect()
    }

    fn holds(expr: Expression, record: &IndexMap<String, Value>) -> bool {
        ExpressionEvaluator::default()
            .compile(&expr)
            .unwrap()
            .test(record)
            .unwrap()
    }

    #[test]
    fn eq_is_strict() {
        let eb = ExpressionBuilder;
        let r = record(&[("n", Value::from(1)), ("s", Value::from("1"))]);
        assert!(holds(eb.eq("n", 1u8), &r));
        assert!(!holds(eb.eq("n", 1.0), &r));
        assert!(!holds(eb.eq("s", 1), &r));
        assert!(holds(eb.neq("s", 1), &r));
    }

    #[test]
    fn ordering_operators() {
        let eb = ExpressionBuilder;
        let r = record(&[("n", Value::from(5))]);
        assert!(holds(eb.gt("n", 4), &r));
        assert!(holds(eb.gte("n", 5), &r));
        assert!(!holds(eb.lt("n", 5), &r));
        assert!(holds(eb.lte("n", 5.5), &r));
    }

    #[test]
    fn ordering_across_kinds_never_holds() {
        let eb = ExpressionBuilder;
        let r = record(&[("n", Value::from(5))]);
        for expr in [
            eb.lt("n", "z"),
            eb.lte("n", "z"),
            eb.gt("n", "z"),
            eb.gte("n", "z"),
        ] {
            assert!(!holds(expr, &r));
        }
    }

    #[test]
    fn in_and_not_in() {
        let eb = ExpressionBuilder;
        let r = record(&[("status", Value::from("open"))]);
        assert!(holds(eb.in_("status", ["open", "new"]), &r));
        assert!(!holds(eb.in_("status", ["closed"]), &r));
        assert!(holds(eb.not_in("status", ["closed"]), &r));
        assert!(!holds(eb.in_("status", Vec::<i32>::new()), &r));
    }

    #[test]
    fn in_requires_a_list_literal() {
        let expr = Expression::Comparison(Comparison::new("a", Operator::In, 3));
        let err = ExpressionEvaluator::default().compile(&expr).unwrap_err();
        assert!(matches!(err, SiftError::InvalidExpression(_)));
    }

    #[test]
    fn timestamps_order_naturally() {
        let eb = ExpressionBuilder;
        let r = record(&[("at", Value::from(Timestamp::from_secs(100)))]);
        assert!(holds(eb.lt("at", Timestamp::from_secs(101)), &r));
        assert!(!holds(eb.lt("at", Timestamp::from_secs(100)), &r));
        assert!(holds(eb.lte("at", Timestamp::from_secs(100)), &r));
        assert!(holds(eb.gt("at", Timestamp::from_millis(99_999)), &r));
        assert!(!holds(eb.gt("at", Timestamp::from_secs(100)), &r));
        assert!(holds(eb.gte("at", Timestamp::from_secs(100)), &r));
        // A raw number is a different kind.
        assert!(!holds(eb.gt("at", 0), &r));
        assert!(!holds(eb.lt("at", i64::MAX), &r));
    }

    #[test]
    fn matches_requires_a_string_pattern() {
        let expr = Expression::Comparison(Comparison::new("f", Operator::Matches, 3));
        let err = ExpressionEvaluator::default().compile(&expr).unwrap_err();
        assert!(matches!(err, SiftError::InvalidExpression(ref msg) if msg.contains("MATCHES")));
    }

    #[test]
    fn invalid_pattern_fails_at_compile() {
        let expr = Expression::Comparison(Comparison::new("f", Operator::Matches, "(unclosed"));
        let err = ExpressionEvaluator::default().compile(&expr).unwrap_err();
        assert!(matches!(err, SiftError::InvalidPattern(_)));
    }

    #[test]
    fn text_operators() {
        let eb = ExpressionBuilder;
        let r = record(&[("name", Value::from("hello world")), ("n", Value::from(1234))]);
        assert!(holds(eb.contains("name", "lo wo"), &r));
        assert!(holds(eb.starts_with("name", "hell"), &r));
        assert!(holds(eb.ends_with("name", "world"), &r));
        assert!(!holds(eb.ends_with("name", "World"), &r));
        assert!(holds(eb.contains("n", 23), &r));
        assert!(holds(eb.matches("name", r"^h\w+ w").unwrap(), &r));
    }

    #[test]
    fn member_of_looks_inside_the_field() {
        let eb = ExpressionBuilder;
        let tags = Value::from(vec!["a", "b"]);
        let mut nested = IndexMap::new();
        nested.insert("k".to_string(), Value::from(7));
        let r = record(&[
            ("tags", tags),
            ("props", Value::Map(nested)),
            ("n", Value::from(7)),
        ]);
        assert!(holds(eb.member_of("tags", "a"), &r));
        assert!(!holds(eb.member_of("tags", "c"), &r));
        assert!(holds(eb.member_of("props", 7), &r));
        assert!(!holds(eb.member_of("n", 7), &r));
    }

    #[test]
    fn composite_semantics() {
        let eb = ExpressionBuilder;
        let both = record(&[("a", Value::from(1)), ("b", Value::from(1))]);
        let one = record(&[("a", Value::from(1)), ("b", Value::from(2))]);

        let and = eb.and_x([eb.eq("a", 1), eb.eq("b", 1)]).unwrap();
        assert!(holds(and.clone(), &both));
        assert!(!holds(and, &one));

        let or = eb.or_x([eb.eq("a", 2), eb.eq("b", 1)]).unwrap();
        assert!(holds(or.clone(), &both));
        assert!(!holds(or, &one));

        let not = eb.not(eb.eq("b", 1)).unwrap();
        assert!(!holds(not.clone(), &both));
        assert!(holds(not, &one));
    }

    #[test]
    fn empty_composites() {
        let eb = ExpressionBuilder;
        let r = record(&[]);
        assert!(holds(eb.and_x([]).unwrap(), &r));
        assert!(!holds(eb.or_x([]).unwrap(), &r));
    }

    #[test]
    fn short_circuit_skips_missing_fields() {
        let eb = ExpressionBuilder;
        let r = record(&[("a", Value::from(1))]);
        assert!(!holds(eb.and_x([eb.eq("a", 2), eb.eq("missing", 1)]).unwrap(), &r));
        assert!(holds(eb.or_x([eb.eq("a", 1), eb.eq("missing", 1)]).unwrap(), &r));
    }

    #[test]
    fn missing_field_propagates() {
        let eb = ExpressionBuilder;
        let predicate = ExpressionEvaluator::default()
            .compile(&eb.eq("missing", 1))
            .unwrap();
        let err = predicate.test(&record(&[])).unwrap_err();
        assert!(matches!(err, SiftError::FieldNotFound { .. }));
    }

    #[test]
    fn bare_value_cannot_compile() {
        let err = ExpressionEvaluator::default()
            .compile(&Expression::Value(Value::from(true)))
            .unwrap_err();
        assert!(matches!(err, SiftError::InvalidExpression(_)));
    }

    #[test]
    fn comparator_chain_primary_key_first() {
        let evaluator = ExpressionEvaluator::default();
        let cmp = evaluator
            .comparator([("foo", Direction::Desc), ("bar", Direction::Asc)])
            .unwrap();
        assert_eq!(cmp.field(), "foo");
        assert_eq!(cmp.next().map(|n| n.field()), Some("bar"));

        let a = record(&[("foo", Value::from(2)), ("bar", Value::from(1))]);
        let b = record(&[("foo", Value::from(2)), ("bar", Value::from(3))]);
        let c = record(&[("foo", Value::from(1)), ("bar", Value::from(0))]);
        assert_eq!(cmp.compare(&a, &b).unwrap(), Ordering::Less);
        assert_eq!(cmp.compare(&a, &c).unwrap(), Ordering::Less);
        assert_eq!(cmp.compare(&a, &a).unwrap(), Ordering::Equal);
    }

    #[test]
    fn no_orderings_no_comparator() {
        let evaluator = ExpressionEvaluator::default();
        assert!(evaluator
            .comparator(Vec::<(&str, Direction)>::new())
            .is_none());
    }
}
