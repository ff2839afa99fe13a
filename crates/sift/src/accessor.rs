//! Field path resolution against arbitrary records.
//!
//! A [`FieldAccessor`] reads a field path such as `"address.street"` off any
//! [`Record`]. The path is split on a separator and each segment is resolved
//! against the record produced by the previous one.
//!
//! # Resolution Order
//!
//! For every segment the accessor tries its [`Strategy`] list in order and
//! stops at the first hit. The default order is:
//!
//! | Strategy | Looks up | Example for `fullName` |
//! |----------|----------|------------------------|
//! | `Getter` | member `get_<snake>` | `get_full_name` |
//! | `Predicate` | member `is_<snake>` | `is_full_name` |
//! | `Member` | member `<snake>`, then the raw segment | `full_name`, `fullName` |
//! | `Dynamic` | [`Record::dynamic`] | `fullName` |
//! | `Index` | [`Record::index`] | `fullName` |

use crate::error::{Result, SiftError};
use crate::record::{Field, Record};
use crate::value::Value;

/// One way of resolving a path segment on a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Strategy {
    /// `get_<field>` accessor.
    Getter,
    /// `is_<field>` accessor.
    Predicate,
    /// Same-named member: method or public field.
    Member,
    /// Catch-all dynamic hook.
    Dynamic,
    /// Container-style access by key.
    Index,
}

impl Strategy {
    /// The default resolution order.
    pub const DEFAULT_ORDER: [Strategy; 5] = [
        Strategy::Getter,
        Strategy::Predicate,
        Strategy::Member,
        Strategy::Dynamic,
        Strategy::Index,
    ];
}

/// Resolves named, possibly nested, fields on records.
///
/// # Example
///
/// ```
/// use sift::{FieldAccessor, Value};
/// use indexmap::IndexMap;
///
/// let mut address = IndexMap::new();
/// address.insert("street".to_string(), Value::from("Main St"));
/// let mut person = IndexMap::new();
/// person.insert("address".to_string(), Value::Map(address));
///
/// let accessor = FieldAccessor::default();
/// let street = accessor.get(&person, "address.street").unwrap();
/// assert_eq!(street, Value::from("Main St"));
/// ```
#[derive(Debug, Clone)]
pub struct FieldAccessor {
    separator: char,
    strategies: Vec<Strategy>,
    null_on_missing: bool,
}

impl Default for FieldAccessor {
    fn default() -> Self {
        FieldAccessor {
            separator: '.',
            strategies: Strategy::DEFAULT_ORDER.to_vec(),
            null_on_missing: false,
        }
    }
}

impl FieldAccessor {
    /// Starts configuring a custom accessor.
    pub fn builder() -> FieldAccessorBuilder {
        FieldAccessorBuilder::default()
    }

    /// Returns the path separator.
    pub fn separator(&self) -> char {
        self.separator
    }

    /// Returns the strategies in resolution order.
    pub fn strategies(&self) -> &[Strategy] {
        &self.strategies
    }

    /// Reads the value at `path` from `record`.
    ///
    /// Fails with [`SiftError::FieldNotFound`] when a segment cannot be
    /// resolved (unless configured with `null_on_missing`), and with
    /// [`SiftError::NotARecord`] when a path descends into a scalar. A path
    /// that ends on a nested record without a snapshot fails with
    /// [`SiftError::NoSnapshot`].
    pub fn get(&self, record: &dyn Record, path: &str) -> Result<Value> {
        let segments: Vec<&str> = path.split(self.separator).collect();
        if segments.iter().any(|segment| segment.is_empty()) {
            return Err(SiftError::invalid_argument(format!(
                "field path '{}' contains an empty segment",
                path
            )));
        }
        self.resolve_path(record, &segments, path)
    }

    fn resolve_path(&self, record: &dyn Record, segments: &[&str], path: &str) -> Result<Value> {
        let Some((head, rest)) = segments.split_first() else {
            return Err(SiftError::field_not_found(path));
        };

        let field = match self.resolve_segment(record, head) {
            Some(field) => field,
            None if self.null_on_missing => return Ok(Value::Null),
            None => return Err(SiftError::field_not_found(path)),
        };

        if rest.is_empty() {
            return match field {
                Field::Value(value) => Ok(value.into_owned()),
                Field::Record(nested) => nested.snapshot().ok_or_else(|| SiftError::NoSnapshot {
                    field: path.to_string(),
                }),
            };
        }

        match field {
            Field::Record(nested) => self.resolve_path(nested, rest, path),
            Field::Value(value) => {
                let value: &Value = &value;
                match value {
                    Value::Map(_) | Value::List(_) => self.resolve_path(value, rest, path),
                    Value::Null if self.null_on_missing => Ok(Value::Null),
                    _ => Err(SiftError::NotARecord {
                        field: path.to_string(),
                    }),
                }
            }
        }
    }

    fn resolve_segment<'a>(&self, record: &'a dyn Record, segment: &str) -> Option<Field<'a>> {
        let snake = to_snake_case(segment);
        self.strategies.iter().find_map(|strategy| match strategy {
            Strategy::Getter => record.member(&format!("get_{}", snake)),
            Strategy::Predicate => record.member(&format!("is_{}", snake)),
            Strategy::Member => record.member(&snake).or_else(|| {
                if snake != segment {
                    record.member(segment)
                } else {
                    None
                }
            }),
            Strategy::Dynamic => record.dynamic(segment),
            Strategy::Index => record.index(segment),
        })
    }
}

/// Builder for a [`FieldAccessor`] with non-default settings.
#[derive(Debug, Clone, Default)]
pub struct FieldAccessorBuilder {
    separator: Option<char>,
    strategies: Option<Vec<Strategy>>,
    null_on_missing: bool,
}

impl FieldAccessorBuilder {
    /// Sets the nested path separator (default `.`).
    pub fn separator(mut self, separator: char) -> Self {
        self.separator = Some(separator);
        self
    }

    /// Replaces the resolution order.
    pub fn strategies(mut self, strategies: impl IntoIterator<Item = Strategy>) -> Self {
        self.strategies = Some(strategies.into_iter().collect());
        self
    }

    /// Treats unresolved fields as `Null` instead of failing.
    pub fn null_on_missing(mut self, enabled: bool) -> Self {
        self.null_on_missing = enabled;
        self
    }

    /// Finalizes the accessor.
    ///
    /// Fails when the strategy list is empty.
    pub fn build(self) -> Result<FieldAccessor> {
        let strategies = self
            .strategies
            .unwrap_or_else(|| Strategy::DEFAULT_ORDER.to_vec());
        if strategies.is_empty() {
            return Err(SiftError::invalid_argument(
                "field accessor needs at least one resolution strategy",
            ));
        }
        Ok(FieldAccessor {
            separator: self.separator.unwrap_or('.'),
            strategies,
            null_on_missing: self.null_on_missing,
        })
    }
}

/// Convert a field name to snake_case (`fooBar` and `FooBar` become `foo_bar`).
pub(crate) fn to_snake_case(s: &str) -> String {
    let chars: Vec<char> = s.chars().collect();
    let mut result = String::with_capacity(s.len() + 4);

    for (i, &c) in chars.iter().enumerate() {
        if c.is_uppercase() {
            let prev = i.checked_sub(1).map(|p| chars[p]);
            let next = chars.get(i + 1).copied();
            let boundary = match prev {
                Some(p) if p.is_lowercase() || p.is_ascii_digit() => true,
                Some(p) if p.is_uppercase() => next.is_some_and(|n| n.is_lowercase()),
                _ => false,
            };
            if boundary && !result.ends_with('_') {
                result.push('_');
            }
            result.extend(c.to_lowercase());
        } else if c == '-' {
            result.push('_');
        } else {
            result.push(c);
        }
    }

    result
}
