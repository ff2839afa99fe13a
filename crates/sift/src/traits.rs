//! Applying [`Criteria`] to containers.
//!
//! This module provides the [`Selectable`] trait, implemented by
//! [`Collection`](crate::Collection) and by `Vec<T>` for any record type.

use crate::criteria::Criteria;
use crate::error::Result;
use crate::eval::{sort_fallibly, ExpressionEvaluator};
use crate::record::Record;

/// Containers that can be narrowed by [`Criteria`].
///
/// Selection filters by the criteria's predicate, stably sorts by its
/// orderings, then skips `first_result` entries and keeps at most
/// `max_results`. The container itself is left untouched; the selected
/// elements are cloned into a new container of the same type.
///
/// # Example
///
/// ```
/// use sift::{Criteria, Direction, Selectable, Value};
/// use indexmap::IndexMap;
///
/// fn task(name: &str, priority: i64) -> IndexMap<String, Value> {
///     let mut m = IndexMap::new();
///     m.insert("name".to_string(), Value::from(name));
///     m.insert("priority".to_string(), Value::from(priority));
///     m
/// }
///
/// let tasks = vec![task("docs", 3), task("bug", 5), task("old", 1)];
/// let eb = Criteria::expr();
/// let criteria = Criteria::create()
///     .where_(eb.gte("priority", 3))
///     .order_by([("priority", "DESC")]);
///
/// let found = tasks.matching(&criteria).unwrap();
/// assert_eq!(found.len(), 2);
/// assert_eq!(found[0]["name"], Value::from("bug"));
/// ```
pub trait Selectable: Sized {
    /// Selects with the default [`ExpressionEvaluator`].
    fn matching(&self, criteria: &Criteria) -> Result<Self> {
        self.matching_with(criteria, &ExpressionEvaluator::default())
    }

    /// Selects with a caller-supplied evaluator, e.g. one whose accessor
    /// uses a different path separator or strategy order.
    fn matching_with(&self, criteria: &Criteria, evaluator: &ExpressionEvaluator)
        -> Result<Self>;
}

impl<T: Record + Clone> Selectable for Vec<T> {
    fn matching_with(&self, criteria: &Criteria, evaluator: &ExpressionEvaluator) -> Result<Self> {
        let mut selected: Vec<&T> = match criteria.where_expression() {
            Some(expr) => {
                let predicate = evaluator.compile(expr)?;
                let mut kept = Vec::with_capacity(self.len());
                for item in self {
                    if predicate.test(item)? {
                        kept.push(item);
                    }
                }
                kept
            }
            None => self.iter().collect(),
        };

        let orderings = criteria
            .orderings()
            .iter()
            .map(|(field, dir)| (field.as_str(), *dir));
        if let Some(comparator) = evaluator.comparator(orderings) {
            sort_fallibly(&mut selected, |a, b| comparator.compare(*a, *b))?;
        }

        let result: Vec<T> = selected
            .into_iter()
            .skip(criteria.first_result().unwrap_or(0))
            .take(criteria.max_results().unwrap_or(usize::MAX))
            .cloned()
            .collect();
        log::debug!("{} selected {} of {} items", criteria, result.len(), self.len());
        Ok(result)
    }
}
