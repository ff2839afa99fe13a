//! Sift - Ordered in-memory collections with composable criteria.
//!
//! Sift provides an insertion-ordered [`Collection`] and a small criteria
//! language for selecting from it. It supports:
//!
//! - Map-style access plus automatic integer keys and an internal cursor
//! - Expression trees: comparisons combined with AND, OR and NOT
//! - Dotted field paths into nested records (`address.street`)
//! - Multi-field stable ordering with ascending/descending
//! - Pagination with first result and max results
//!
//! # Quick Start
//!
//! ```rust
//! use sift::{Collection, Criteria, Direction, Field, Record, Selectable};
//!
//! #[derive(Clone)]
//! struct Task {
//!     name: String,
//!     priority: i64,
//!     archived: bool,
//! }
//!
//! impl Record for Task {
//!     fn member(&self, name: &str) -> Option<Field<'_>> {
//!         match name {
//!             "name" => Some(Field::owned(self.name.as_str())),
//!             "priority" => Some(Field::owned(self.priority)),
//!             "archived" => Some(Field::owned(self.archived)),
//!             _ => None,
//!         }
//!     }
//! }
//!
//! let tasks: Collection<usize, Task> = Collection::from_values([
//!     Task { name: "Write docs".into(), priority: 3, archived: false },
//!     Task { name: "Fix bug".into(), priority: 5, archived: false },
//!     Task { name: "Old task".into(), priority: 1, archived: true },
//! ])
//! .unwrap();
//!
//! let eb = Criteria::expr();
//! let criteria = Criteria::create()
//!     .where_(eb.gte("priority", 3))
//!     .and_where(eb.neq("archived", true))
//!     .order_by([("priority", Direction::Desc)]);
//!
//! let results = tasks.matching(&criteria).unwrap();
//! assert_eq!(results.len(), 2);
//! assert_eq!(results.first().map(|t| t.name.as_str()), Some("Fix bug"));
//! // Keys survive selection.
//! assert_eq!(results.key(), Some(&1));
//! ```
//!
//! With the `derive` feature (on by default) the `Record` impl above is
//! generated by `#[derive(Record)]`.
//!
//! # Value Semantics
//!
//! Fields are read into a dynamic [`Value`]. Comparisons are strict:
//!
//! | Operation | Rule |
//! |-----------|------|
//! | `=` / `<>` | same kind and same value; `1` never equals `1.0` or `"1"` |
//! | `<` `<=` `>` `>=` | numbers, strings, booleans, timestamps in natural order; any other pairing is false |
//! | ordering | total: bool < number < timestamp < string < list < map < null |
//!
//! Ordering puts nulls last in ascending order and first in descending order.
//!
//! # Field Resolution
//!
//! A [`FieldAccessor`] splits a path on `.` and resolves every segment by
//! trying, in order, a `get_` accessor, an `is_` accessor, a same-named
//! member, the dynamic hook and finally container indexing. See the
//! [`accessor`] module docs for the table.
//!
//! # Logging
//!
//! Sift logs through the [`log`] facade: rejected expressions at `warn`,
//! selection summaries at `debug`, compilation steps at `trace`. Install any
//! logger (e.g. `env_logger`) to see them.

extern crate self as sift;

pub mod accessor;
mod builder;
mod collection;
mod criteria;
mod error;
mod eval;
mod expr;
#[cfg(feature = "json")]
mod json;
mod record;
mod traits;
mod value;

// Re-export public API
pub use accessor::{FieldAccessor, FieldAccessorBuilder, Strategy};
pub use builder::ExpressionBuilder;
pub use collection::{AutoKey, Collection, CollectionKey, Key};
pub use criteria::{Criteria, Direction};
pub use error::{Result, SiftError};
pub use eval::{ExpressionEvaluator, FieldComparator, Predicate};
pub use expr::{Comparison, CompositeExpression, CompositeKind, Expression, Operator};
pub use record::{Field, Record};
pub use traits::Selectable;
pub use value::{Number, Timestamp, ToValue, Value};

#[cfg(feature = "derive")]
pub use sift_macros::Record;
