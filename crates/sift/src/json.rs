//! `serde_json` interop (feature `json`).
//!
//! JSON documents are records: objects resolve keys, arrays resolve
//! positions, and nested containers are walked in place without converting
//! the whole document first.

use serde_json::Value as Json;

use crate::record::{Field, Record};
use crate::value::{Number, Value};

impl From<Json> for Value {
    fn from(json: Json) -> Self {
        match json {
            Json::Null => Value::Null,
            Json::Bool(b) => Value::Bool(b),
            Json::Number(n) => match (n.as_i64(), n.as_u64()) {
                (Some(i), _) => Value::Number(Number::I64(i)),
                (None, Some(u)) => Value::Number(Number::U64(u)),
                _ => n
                    .as_f64()
                    .map_or(Value::Null, |f| Value::Number(Number::F64(f))),
            },
            Json::String(s) => Value::String(s),
            Json::Array(items) => Value::List(items.into_iter().map(Value::from).collect()),
            Json::Object(map) => Value::Map(map.into_iter().map(|(k, v)| (k, v.into())).collect()),
        }
    }
}

impl From<&Json> for Value {
    fn from(json: &Json) -> Self {
        Value::from(json.clone())
    }
}

fn field(json: &Json) -> Field<'_> {
    match json {
        Json::Object(_) | Json::Array(_) => Field::record(json),
        scalar => Field::owned(scalar),
    }
}

impl Record for Json {
    fn index(&self, key: &str) -> Option<Field<'_>> {
        match self {
            Json::Object(map) => map.get(key).map(field),
            Json::Array(items) => key
                .parse::<usize>()
                .ok()
                .and_then(|i| items.get(i))
                .map(field),
            _ => None,
        }
    }

    fn snapshot(&self) -> Option<Value> {
        Some(Value::from(self))
    }
}
