//! The [`Record`] trait: how criteria read fields off application types.
//!
//! A record exposes its fields through up to three hooks, which the
//! [`FieldAccessor`](crate::FieldAccessor) probes in a fixed order:
//!
//! - [`Record::member`]: named accessors (getter methods, `is_` methods,
//!   public fields). This is what `#[derive(Record)]` generates.
//! - [`Record::dynamic`]: a catch-all for records that compute fields on
//!   demand.
//! - [`Record::index`]: container-style access by key, used by maps and
//!   lists.
//!
//! Returning `None` means "not resolved here"; a stored null is returned as
//! `Some(Field::Value(Value::Null))`.

use std::borrow::Cow;
use std::collections::{BTreeMap, HashMap};
use std::rc::Rc;
use std::sync::Arc;

use indexmap::IndexMap;

use crate::value::{ToValue, Value};

/// A resolved field: either a value or a nested record to descend into.
pub enum Field<'a> {
    /// A literal value, borrowed from the record or computed on access.
    Value(Cow<'a, Value>),
    /// A nested record reachable through dotted paths (`address.street`).
    Record(&'a dyn Record),
}

impl<'a> Field<'a> {
    /// Wraps a computed value.
    pub fn owned(value: impl Into<Value>) -> Self {
        Field::Value(Cow::Owned(value.into()))
    }

    /// Wraps a value borrowed from the record.
    pub fn borrowed(value: &'a Value) -> Self {
        Field::Value(Cow::Borrowed(value))
    }

    /// Wraps a nested record.
    pub fn record(record: &'a dyn Record) -> Self {
        Field::Record(record)
    }
}

impl std::fmt::Debug for Field<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Field::Value(value) => f.debug_tuple("Value").field(value).finish(),
            Field::Record(_) => f.write_str("Record(..)"),
        }
    }
}

impl From<Value> for Field<'_> {
    fn from(value: Value) -> Self {
        Field::Value(Cow::Owned(value))
    }
}

/// A type whose fields can be read by criteria.
///
/// Usually derived with `#[derive(Record)]`, but can also be implemented by
/// hand. Every hook has a default that resolves nothing.
///
/// # Manual Implementation
///
/// ```
/// use sift::{Field, Record, Value};
///
/// struct Task {
///     name: String,
///     priority: u8,
/// }
///
/// impl Task {
///     fn is_urgent(&self) -> bool {
///         self.priority > 3
///     }
/// }
///
/// impl Record for Task {
///     fn member(&self, name: &str) -> Option<Field<'_>> {
///         match name {
///             "name" => Some(Field::owned(self.name.as_str())),
///             "priority" => Some(Field::owned(self.priority)),
///             "is_urgent" => Some(Field::owned(self.is_urgent())),
///             _ => None,
///         }
///     }
/// }
/// ```
pub trait Record {
    /// Resolves a named member: a getter, an `is_` accessor, or a field.
    ///
    /// Names are in snake case (`get_full_name`, `is_active`, `name`).
    fn member(&self, name: &str) -> Option<Field<'_>> {
        let _ = name;
        None
    }

    /// Catch-all hook consulted after every named member candidate failed.
    fn dynamic(&self, name: &str) -> Option<Field<'_>> {
        let _ = name;
        None
    }

    /// Container-style lookup by key.
    fn index(&self, key: &str) -> Option<Field<'_>> {
        let _ = key;
        None
    }

    /// Snapshot of the whole record as a value.
    ///
    /// Needed when a path ends on a nested record, e.g. comparing
    /// `address` itself rather than `address.street`.
    fn snapshot(&self) -> Option<Value> {
        None
    }
}

impl Record for Value {
    fn index(&self, key: &str) -> Option<Field<'_>> {
        match self {
            Value::Map(map) => map.get(key).map(Field::borrowed),
            Value::List(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .map(Field::borrowed),
            _ => None,
        }
    }

    fn snapshot(&self) -> Option<Value> {
        Some(self.clone())
    }
}

impl<V: ToValue> Record for IndexMap<String, V> {
    fn index(&self, key: &str) -> Option<Field<'_>> {
        self.get(key).map(|value| Field::owned(value.to_value()))
    }

    fn snapshot(&self) -> Option<Value> {
        Some(self.to_value())
    }
}

impl<V: ToValue> Record for BTreeMap<String, V> {
    fn index(&self, key: &str) -> Option<Field<'_>> {
        self.get(key).map(|value| Field::owned(value.to_value()))
    }

    fn snapshot(&self) -> Option<Value> {
        Some(self.to_value())
    }
}

impl<V: ToValue> Record for HashMap<String, V> {
    fn index(&self, key: &str) -> Option<Field<'_>> {
        self.get(key).map(|value| Field::owned(value.to_value()))
    }

    fn snapshot(&self) -> Option<Value> {
        Some(self.to_value())
    }
}

macro_rules! forward_record {
    ($($wrapper:ty),*) => {
        $(
            impl<R: Record + ?Sized> Record for $wrapper {
                fn member(&self, name: &str) -> Option<Field<'_>> {
                    (**self).member(name)
                }

                fn dynamic(&self, name: &str) -> Option<Field<'_>> {
                    (**self).dynamic(name)
                }

                fn index(&self, key: &str) -> Option<Field<'_>> {
                    (**self).index(key)
                }

                fn snapshot(&self) -> Option<Value> {
                    (**self).snapshot()
                }
            }
        )*
    };
}

forward_record!(&R, Box<R>, Rc<R>, Arc<R>);

#[cfg(test)]
mod tests {
    use super::*;

    fn resolved(field: Option<Field<'_>>) -> Option<Value> {
        match field? {
            Field::Value(value) => Some(value.into_owned()),
            Field::Record(record) => record.snapshot(),
        }
    }

    #[test]
    fn value_map_index() {
        let mut map = IndexMap::new();
        map.insert("foo".to_string(), Value::from(1));
        map.insert("gone".to_string(), Value::Null);
        let record = Value::Map(map);

        assert_eq!(resolved(record.index("foo")), Some(Value::from(1)));
        assert_eq!(resolved(record.index("gone")), Some(Value::Null));
        assert_eq!(resolved(record.index("missing")), None);
        assert!(record.member("foo").is_none());
    }

    #[test]
    fn value_list_index() {
        let record = Value::from(vec!["a", "b"]);
        assert_eq!(resolved(record.index("1")), Some(Value::from("b")));
        assert_eq!(resolved(record.index("2")), None);
        assert_eq!(resolved(record.index("x")), None);
    }

    #[test]
    fn scalar_values_have_no_fields() {
        assert!(Value::from(3).index("0").is_none());
    }

    #[test]
    fn std_maps_are_records() {
        let mut hash = HashMap::new();
        hash.insert("n".to_string(), 5u32);
        assert_eq!(resolved(hash.index("n")), Some(Value::from(5)));

        let mut tree = BTreeMap::new();
        tree.insert("s".to_string(), "x".to_string());
        assert_eq!(resolved(tree.index("s")), Some(Value::from("x")));
        assert_eq!(
            tree.snapshot().and_then(|v| v.as_map().map(|m| m.len())),
            Some(1)
        );
    }

    #[test]
    fn smart_pointers_forward() {
        let record: Box<dyn Record> = Box::new(Value::from(vec![7]));
        assert_eq!(resolved(record.index("0")), Some(Value::from(7)));
    }
}
