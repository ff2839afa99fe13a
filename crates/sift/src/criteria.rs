//! Criteria: a predicate, orderings and a result window bundled together.
//!
//! A [`Criteria`] is a plain value object. It knows nothing about the
//! collection it will be applied to; hand it to
//! [`Selectable::matching`](crate::Selectable::matching) to run it.

use std::cmp::Ordering;
use std::fmt;

use indexmap::IndexMap;

use crate::builder::ExpressionBuilder;
use crate::error::{Result, SiftError};
use crate::expr::{CompositeExpression, CompositeKind, Expression};

/// Sort direction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Direction {
    /// Ascending order (smallest first).
    #[default]
    Asc,
    /// Descending order (largest first).
    Desc,
}

impl Direction {
    /// Returns `true` if this is ascending order.
    pub fn is_asc(self) -> bool {
        matches!(self, Direction::Asc)
    }

    /// Returns `true` if this is descending order.
    pub fn is_desc(self) -> bool {
        matches!(self, Direction::Desc)
    }

    /// Applies this direction to an ordering.
    ///
    /// For `Asc`, returns the ordering unchanged.
    /// For `Desc`, reverses the ordering.
    pub fn apply(self, ordering: Ordering) -> Ordering {
        match self {
            Direction::Asc => ordering,
            Direction::Desc => ordering.reverse(),
        }
    }

    /// Parses a direction leniently.
    ///
    /// `"ASC"` in any letter case is ascending; every other string,
    /// including typos and the empty string, is descending.
    pub fn from_text(text: &str) -> Direction {
        if text.trim().eq_ignore_ascii_case("asc") {
            Direction::Asc
        } else {
            Direction::Desc
        }
    }

    /// Returns the keyword of this direction.
    pub fn as_str(self) -> &'static str {
        match self {
            Direction::Asc => "ASC",
            Direction::Desc => "DESC",
        }
    }
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl From<&str> for Direction {
    fn from(text: &str) -> Self {
        Direction::from_text(text)
    }
}

impl From<String> for Direction {
    fn from(text: String) -> Self {
        Direction::from_text(&text)
    }
}

/// Predicate, orderings and pagination applied to a collection.
///
/// Builder methods consume and return the criteria so they chain.
///
/// # Example
///
/// ```
/// use sift::{Criteria, Direction};
///
/// let eb = Criteria::expr();
/// let criteria = Criteria::create()
///     .where_(eb.gte("priority", 3))
///     .and_where(eb.neq("archived", true))
///     .order_by([("priority", Direction::Desc), ("name", Direction::Asc)])
///     .set_first_result(Some(10))
///     .set_max_results(Some(5));
///
/// assert_eq!(criteria.orderings().len(), 2);
/// assert_eq!(criteria.first_result(), Some(10));
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Criteria {
    predicate: Option<Expression>,
    orderings: IndexMap<String, Direction>,
    first_result: Option<usize>,
    max_results: Option<usize>,
}

impl Criteria {
    /// Creates empty criteria, which match everything.
    pub fn create() -> Self {
        Criteria::default()
    }

    /// Returns an expression builder.
    pub fn expr() -> ExpressionBuilder {
        ExpressionBuilder
    }

    // ========================================================================
    // Predicate
    // ========================================================================

    /// Replaces the predicate.
    pub fn where_(mut self, expr: Expression) -> Self {
        self.predicate = Some(expr);
        self
    }

    /// Combines the predicate with `expr` using AND.
    ///
    /// Without a predicate this behaves like [`Criteria::where_`].
    pub fn and_where(self, expr: Expression) -> Self {
        self.combine(CompositeKind::And, expr)
    }

    /// Combines the predicate with `expr` using OR.
    ///
    /// Without a predicate this behaves like [`Criteria::where_`].
    pub fn or_where(self, expr: Expression) -> Self {
        self.combine(CompositeKind::Or, expr)
    }

    fn combine(mut self, kind: CompositeKind, expr: Expression) -> Self {
        self.predicate = Some(match self.predicate.take() {
            None => expr,
            Some(existing) => Expression::Composite(CompositeExpression::from_parts(
                kind,
                vec![existing, expr],
            )),
        });
        self
    }

    // ========================================================================
    // Ordering
    // ========================================================================

    /// Replaces all orderings.
    ///
    /// Directions may be given as [`Direction`] or as text; text is parsed
    /// with [`Direction::from_text`], so anything but `"ASC"` is descending.
    /// A field listed twice keeps its first position and its last direction.
    pub fn order_by<I, F, D>(mut self, orderings: I) -> Self
    where
        I: IntoIterator<Item = (F, D)>,
        F: Into<String>,
        D: Into<Direction>,
    {
        self.orderings = orderings
            .into_iter()
            .map(|(field, dir)| (field.into(), dir.into()))
            .collect();
        self
    }

    // ========================================================================
    // Limits
    // ========================================================================

    /// Sets the number of results to skip.
    pub fn set_first_result(mut self, first_result: Option<usize>) -> Self {
        self.first_result = first_result;
        self
    }

    /// Sets the maximum number of results to return.
    pub fn set_max_results(mut self, max_results: Option<usize>) -> Self {
        self.max_results = max_results;
        self
    }

    /// Sets offset and limit from signed input.
    ///
    /// Fails with [`SiftError::InvalidArgument`] when either is negative.
    pub fn paginate(self, offset: i64, limit: i64) -> Result<Self> {
        let offset = usize::try_from(offset).map_err(|_| {
            SiftError::invalid_argument(format!("offset must be non-negative, got {}", offset))
        })?;
        let limit = usize::try_from(limit).map_err(|_| {
            SiftError::invalid_argument(format!("limit must be non-negative, got {}", limit))
        })?;
        Ok(self.set_first_result(Some(offset)).set_max_results(Some(limit)))
    }

    // ========================================================================
    // Introspection
    // ========================================================================

    /// Returns the predicate, if any.
    pub fn where_expression(&self) -> Option<&Expression> {
        self.predicate.as_ref()
    }

    /// Returns the orderings in declaration order.
    pub fn orderings(&self) -> &IndexMap<String, Direction> {
        &self.orderings
    }

    /// Returns the number of results to skip, if set.
    pub fn first_result(&self) -> Option<usize> {
        self.first_result
    }

    /// Returns the maximum number of results, if set.
    pub fn max_results(&self) -> Option<usize> {
        self.max_results
    }

    /// Returns `true` if these criteria neither filter, sort nor slice.
    pub fn is_empty(&self) -> bool {
        self.predicate.is_none()
            && self.orderings.is_empty()
            && self.first_result.is_none()
            && self.max_results.is_none()
    }
}

impl fmt::Display for Criteria {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.predicate {
            Some(expr) => write!(f, "WHERE {}", expr)?,
            None => f.write_str("ALL")?,
        }
        if !self.orderings.is_empty() {
            f.write_str(" ORDER BY ")?;
            for (i, (field, dir)) in self.orderings.iter().enumerate() {
                if i > 0 {
                    f.write_str(", ")?;
                }
                write!(f, "{} {}", field, dir)?;
            }
        }
        if let Some(limit) = self.max_results {
            write!(f, " LIMIT {}", limit)?;
        }
        if let Some(offset) = self.first_result {
            write!(f, " OFFSET {}", offset)?;
        }
        Ok(())
    }
}
