//! Literal values used on both sides of a comparison.
//!
//! [`Value`] is what a [`FieldAccessor`](crate::FieldAccessor) produces when it
//! reads a field off a record, and what a [`Comparison`](crate::Comparison)
//! carries as its right-hand side. Values are owned so they can be stored in
//! criteria and reused across queries.

use std::cmp::Ordering;
use std::collections::{BTreeMap, HashMap};
use std::fmt;

use indexmap::IndexMap;

/// An owned literal: scalar, null, list, or nested map.
///
/// Equality is strict: two values are equal only when they are of the same
/// kind and hold the same value. Integers compare equal across signed and
/// unsigned representations, but an integer never equals a float.
///
/// # Example
///
/// ```
/// use sift::{Value, Number};
///
/// assert_eq!(Value::from(1i32), Value::from(1u64));
/// assert_ne!(Value::from(1i32), Value::from(1.0f64));
/// assert_ne!(Value::from("1"), Value::from(1i32));
/// ```
#[derive(Debug, Clone, Default)]
pub enum Value {
    /// Explicitly stored null.
    #[default]
    Null,
    /// Boolean value.
    Bool(bool),
    /// Numeric value.
    Number(Number),
    /// String value.
    String(String),
    /// Timestamp value (milliseconds since Unix epoch).
    Timestamp(Timestamp),
    /// Ordered list of values.
    List(Vec<Value>),
    /// Nested record represented as an ordered map.
    Map(IndexMap<String, Value>),
}

impl Value {
    /// Returns `true` if this is a `Null` value.
    pub fn is_null(&self) -> bool {
        matches!(self, Value::Null)
    }

    /// Returns `true` for null, bool, number, string and timestamp values.
    pub fn is_scalar(&self) -> bool {
        !matches!(self, Value::List(_) | Value::Map(_))
    }

    /// Extracts the string value, if present.
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Value::String(s) => Some(s),
            _ => None,
        }
    }

    /// Extracts the number value, if present.
    pub fn as_number(&self) -> Option<Number> {
        match self {
            Value::Number(n) => Some(*n),
            _ => None,
        }
    }

    /// Extracts the boolean value, if present.
    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }

    /// Extracts the list elements, if present.
    pub fn as_list(&self) -> Option<&[Value]> {
        match self {
            Value::List(items) => Some(items),
            _ => None,
        }
    }

    /// Extracts the map entries, if present.
    pub fn as_map(&self) -> Option<&IndexMap<String, Value>> {
        match self {
            Value::Map(map) => Some(map),
            _ => None,
        }
    }

    /// Short name of this value's kind, used in messages.
    pub fn kind(&self) -> &'static str {
        match self {
            Value::Null => "null",
            Value::Bool(_) => "bool",
            Value::Number(_) => "number",
            Value::String(_) => "string",
            Value::Timestamp(_) => "timestamp",
            Value::List(_) => "list",
            Value::Map(_) => "map",
        }
    }

    /// Compares two values of the same kind by their natural order.
    ///
    /// Returns `None` when the kinds differ, when a float is NaN, or for maps,
    /// which have no natural order. Predicates treat `None` as "does not
    /// satisfy" for every ordering operator.
    pub fn compare(&self, other: &Value) -> Option<Ordering> {
        match (self, other) {
            (Value::Null, Value::Null) => Some(Ordering::Equal),
            (Value::Bool(a), Value::Bool(b)) => Some(a.cmp(b)),
            (Value::Number(a), Value::Number(b)) => a.compare(*b),
            (Value::String(a), Value::String(b)) => Some(a.cmp(b)),
            (Value::Timestamp(a), Value::Timestamp(b)) => Some(a.cmp(b)),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.compare(y)? {
                        Ordering::Equal => continue,
                        ordering => return Some(ordering),
                    }
                }
                Some(a.len().cmp(&b.len()))
            }
            _ => None,
        }
    }

    /// Total order used for sorting.
    ///
    /// Values of different kinds are ranked bool < number < timestamp <
    /// string < list < map < null, so nulls always sort last in ascending
    /// order. Floats use IEEE total ordering.
    pub fn sort_cmp(&self, other: &Value) -> Ordering {
        match (self, other) {
            (Value::Number(a), Value::Number(b)) => a.total_cmp(*b),
            (Value::List(a), Value::List(b)) => {
                for (x, y) in a.iter().zip(b.iter()) {
                    match x.sort_cmp(y) {
                        Ordering::Equal => continue,
                        ordering => return ordering,
                    }
                }
                a.len().cmp(&b.len())
            }
            (Value::Map(a), Value::Map(b)) => {
                for ((ka, va), (kb, vb)) in a.iter().zip(b.iter()) {
                    let ordering = ka.cmp(kb).then_with(|| va.sort_cmp(vb));
                    if ordering != Ordering::Equal {
                        return ordering;
                    }
                }
                a.len().cmp(&b.len())
            }
            _ => match self.rank().cmp(&other.rank()) {
                Ordering::Equal => self.compare(other).unwrap_or(Ordering::Equal),
                ordering => ordering,
            },
        }
    }

    fn rank(&self) -> u8 {
        match self {
            Value::Bool(_) => 0,
            Value::Number(_) => 1,
            Value::Timestamp(_) => 2,
            Value::String(_) => 3,
            Value::List(_) => 4,
            Value::Map(_) => 5,
            Value::Null => 6,
        }
    }
}

impl PartialEq for Value {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Value::Null, Value::Null) => true,
            (Value::Bool(a), Value::Bool(b)) => a == b,
            (Value::Number(a), Value::Number(b)) => a.strict_eq(*b),
            (Value::String(a), Value::String(b)) => a == b,
            (Value::Timestamp(a), Value::Timestamp(b)) => a == b,
            (Value::List(a), Value::List(b)) => a == b,
            (Value::Map(a), Value::Map(b)) => a == b,
            _ => false,
        }
    }
}

/// Textual representation used by the substring and regex operators.
///
/// Strings render without quotes, null renders as the empty string.
impl fmt::Display for Value {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Value::Null => Ok(()),
            Value::Bool(b) => write!(f, "{}", b),
            Value::Number(n) => write!(f, "{}", n),
            Value::String(s) => f.write_str(s),
            Value::Timestamp(t) => write!(f, "{}", t.as_millis()),
            Value::List(items) => {
                f.write_str("[")?;
                for (i, item) in items.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}", item)?;
                }
                f.write_str("]")
            }
            Value::Map(map) => {
                f.write_str("{")?;
                for (i, (key, value)) in map.iter().enumerate() {
                    if i > 0 {
                        f.write_str(", ")?;
                    }
                    write!(f, "{}: {}", key, value)?;
                }
                f.write_str("}")
            }
        }
    }
}

/// Numeric value supporting all common numeric types.
///
/// Numbers are stored in one of three variants to preserve precision:
/// - `I64` for signed integers
/// - `U64` for unsigned integers
/// - `F64` for floating point
#[derive(Debug, Clone, Copy)]
pub enum Number {
    /// Signed 64-bit integer.
    I64(i64),
    /// Unsigned 64-bit integer.
    U64(u64),
    /// 64-bit floating point.
    F64(f64),
}

impl Number {
    /// Converts the number to f64.
    pub fn to_f64(self) -> f64 {
        match self {
            Number::I64(n) => n as f64,
            Number::U64(n) => n as f64,
            Number::F64(n) => n,
        }
    }

    /// Returns the value as `i64` if it is an integer that fits.
    pub fn as_i64(self) -> Option<i64> {
        match self {
            Number::I64(n) => Some(n),
            Number::U64(n) => i64::try_from(n).ok(),
            Number::F64(_) => None,
        }
    }

    /// Returns `true` for the integer variants.
    pub fn is_integer(self) -> bool {
        !matches!(self, Number::F64(_))
    }

    /// Returns `true` for a NaN float.
    pub fn is_nan(self) -> bool {
        matches!(self, Number::F64(n) if n.is_nan())
    }

    /// Compares two numbers, handling mixed types.
    ///
    /// Comparisons are exact, including an integer against a float. Only NaN
    /// is unordered.
    pub fn compare(self, other: Number) -> Option<Ordering> {
        match (self, other) {
            (Number::I64(a), Number::I64(b)) => Some(a.cmp(&b)),
            (Number::U64(a), Number::U64(b)) => Some(a.cmp(&b)),
            (Number::I64(a), Number::U64(b)) => Some(compare_signed_unsigned(a, b)),
            (Number::U64(a), Number::I64(b)) => Some(compare_signed_unsigned(b, a).reverse()),
            (Number::F64(a), Number::F64(b)) => a.partial_cmp(&b),
            (Number::I64(a), Number::F64(b)) => compare_integer_float(i128::from(a), b),
            (Number::U64(a), Number::F64(b)) => compare_integer_float(i128::from(a), b),
            (Number::F64(a), Number::I64(b)) => {
                compare_integer_float(i128::from(b), a).map(Ordering::reverse)
            }
            (Number::F64(a), Number::U64(b)) => {
                compare_integer_float(i128::from(b), a).map(Ordering::reverse)
            }
        }
    }

    /// Like [`Number::compare`] but total: NaN sorts after every other number.
    pub fn total_cmp(self, other: Number) -> Ordering {
        match self.compare(other) {
            Some(ordering) => ordering,
            None => self.is_nan().cmp(&other.is_nan()),
        }
    }

    /// Strict equality: integers across representations, floats only with floats.
    pub fn strict_eq(self, other: Number) -> bool {
        match (self, other) {
            (Number::F64(a), Number::F64(b)) => a == b,
            (Number::F64(_), _) | (_, Number::F64(_)) => false,
            _ => self.compare(other) == Some(Ordering::Equal),
        }
    }
}

fn compare_signed_unsigned(a: i64, b: u64) -> Ordering {
    if a < 0 {
        Ordering::Less
    } else {
        (a as u64).cmp(&b)
    }
}

/// 2^127, the first float above every `i128`.
const I128_LIMIT: f64 = 170_141_183_460_469_231_731_687_303_715_884_105_728.0;

fn compare_integer_float(int: i128, float: f64) -> Option<Ordering> {
    if float.is_nan() {
        return None;
    }
    if float >= I128_LIMIT {
        return Some(Ordering::Less);
    }
    if float < -I128_LIMIT {
        return Some(Ordering::Greater);
    }
    let whole = float.trunc();
    match int.cmp(&(whole as i128)) {
        Ordering::Equal => 0.0_f64.partial_cmp(&(float - whole)),
        ordering => Some(ordering),
    }
}

impl PartialEq for Number {
    fn eq(&self, other: &Self) -> bool {
        self.strict_eq(*other)
    }
}

impl PartialOrd for Number {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        self.compare(*other)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Number::I64(n) => write!(f, "{}", n),
            Number::U64(n) => write!(f, "{}", n),
            Number::F64(n) => write!(f, "{}", n),
        }
    }
}

/// Timestamp value represented as milliseconds since Unix epoch.
///
/// ```
/// use sift::Timestamp;
///
/// assert!(Timestamp(1000) < Timestamp(2000));
/// assert_eq!(Timestamp::from_secs(2).as_millis(), 2000);
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Timestamp(pub i64);

impl Timestamp {
    /// Creates a new timestamp from milliseconds since Unix epoch.
    pub fn from_millis(millis: i64) -> Self {
        Timestamp(millis)
    }

    /// Creates a new timestamp from seconds since Unix epoch.
    pub fn from_secs(secs: i64) -> Self {
        Timestamp(secs * 1000)
    }

    /// Returns the timestamp as milliseconds since Unix epoch.
    pub fn as_millis(self) -> i64 {
        self.0
    }

    /// Returns the timestamp as seconds since Unix epoch.
    pub fn as_secs(self) -> i64 {
        self.0 / 1000
    }
}

/// Conversion of borrowed data into a [`Value`].
///
/// Field accessors call this to expose struct fields and method results.
/// `#[derive(Record)]` relies on it for every exposed field.
pub trait ToValue {
    /// Produces an owned value snapshot.
    fn to_value(&self) -> Value;
}

macro_rules! number_conversions {
    ($($ty:ty => $variant:ident as $target:ty),* $(,)?) => {
        $(
            impl From<$ty> for Number {
                fn from(n: $ty) -> Self {
                    Number::$variant(n as $target)
                }
            }

            impl From<$ty> for Value {
                fn from(n: $ty) -> Self {
                    Value::Number(Number::from(n))
                }
            }

            impl ToValue for $ty {
                fn to_value(&self) -> Value {
                    Value::from(*self)
                }
            }
        )*
    };
}

number_conversions! {
    i8 => I64 as i64,
    i16 => I64 as i64,
    i32 => I64 as i64,
    i64 => I64 as i64,
    isize => I64 as i64,
    u8 => U64 as u64,
    u16 => U64 as u64,
    u32 => U64 as u64,
    u64 => U64 as u64,
    usize => U64 as u64,
    f32 => F64 as f64,
    f64 => F64 as f64,
}

impl From<Number> for Value {
    fn from(n: Number) -> Self {
        Value::Number(n)
    }
}

impl From<bool> for Value {
    fn from(b: bool) -> Self {
        Value::Bool(b)
    }
}

impl From<String> for Value {
    fn from(s: String) -> Self {
        Value::String(s)
    }
}

impl From<&str> for Value {
    fn from(s: &str) -> Self {
        Value::String(s.to_string())
    }
}

impl From<Timestamp> for Value {
    fn from(t: Timestamp) -> Self {
        Value::Timestamp(t)
    }
}

impl From<()> for Value {
    fn from(_: ()) -> Self {
        Value::Null
    }
}

impl<T: Into<Value>> From<Option<T>> for Value {
    fn from(value: Option<T>) -> Self {
        value.map_or(Value::Null, Into::into)
    }
}

impl<T: Into<Value>> From<Vec<T>> for Value {
    fn from(items: Vec<T>) -> Self {
        Value::List(items.into_iter().map(Into::into).collect())
    }
}

impl From<IndexMap<String, Value>> for Value {
    fn from(map: IndexMap<String, Value>) -> Self {
        Value::Map(map)
    }
}

impl<T: Into<Value>> FromIterator<T> for Value {
    fn from_iter<I: IntoIterator<Item = T>>(iter: I) -> Self {
        Value::List(iter.into_iter().map(Into::into).collect())
    }
}

impl ToValue for Value {
    fn to_value(&self) -> Value {
        self.clone()
    }
}

impl ToValue for Number {
    fn to_value(&self) -> Value {
        Value::Number(*self)
    }
}

impl ToValue for bool {
    fn to_value(&self) -> Value {
        Value::Bool(*self)
    }
}

impl ToValue for str {
    fn to_value(&self) -> Value {
        Value::String(self.to_string())
    }
}

impl ToValue for String {
    fn to_value(&self) -> Value {
        Value::String(self.clone())
    }
}

impl ToValue for Timestamp {
    fn to_value(&self) -> Value {
        Value::Timestamp(*self)
    }
}

impl<T: ToValue + ?Sized> ToValue for &T {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue + ?Sized> ToValue for Box<T> {
    fn to_value(&self) -> Value {
        (**self).to_value()
    }
}

impl<T: ToValue> ToValue for Option<T> {
    fn to_value(&self) -> Value {
        self.as_ref().map_or(Value::Null, ToValue::to_value)
    }
}

impl<T: ToValue> ToValue for [T] {
    fn to_value(&self) -> Value {
        Value::List(self.iter().map(ToValue::to_value).collect())
    }
}

impl<T: ToValue> ToValue for Vec<T> {
    fn to_value(&self) -> Value {
        self.as_slice().to_value()
    }
}

impl<T: ToValue> ToValue for IndexMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for BTreeMap<String, T> {
    fn to_value(&self) -> Value {
        Value::Map(
            self.iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

impl<T: ToValue> ToValue for HashMap<String, T> {
    fn to_value(&self) -> Value {
        // HashMap iteration order is unspecified; sort keys for a stable snapshot.
        let mut entries: Vec<_> = self.iter().collect();
        entries.sort_by(|a, b| a.0.cmp(b.0));
        Value::Map(
            entries
                .into_iter()
                .map(|(key, value)| (key.clone(), value.to_value()))
                .collect(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn strict_equality() {
        assert_eq!(Value::from(10i64), Value::from(10u8));
        assert_ne!(Value::from(10i64), Value::from(10.0f64));
        assert_ne!(Value::from("10"), Value::from(10i64));
        assert_ne!(Value::Null, Value::from(false));
        assert_eq!(Value::Null, Value::Null);
        assert_ne!(Value::from(-1i64), Value::from(u64::MAX));
    }

    #[test]
    fn list_equality_is_elementwise() {
        assert_eq!(Value::from(vec![1, 2]), Value::from(vec![1u8, 2]));
        assert_ne!(Value::from(vec![1, 2]), Value::from(vec![2, 1]));
    }

    #[test]
    fn number_comparisons_same_type() {
        assert_eq!(
            Number::I64(5).compare(Number::I64(10)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(10).compare(Number::U64(5)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(5.0).compare(Number::F64(10.0)),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn number_comparisons_mixed_types() {
        assert_eq!(
            Number::I64(-5).compare(Number::U64(0)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::I64(i64::MAX)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::I64(5).compare(Number::F64(5.0)),
            Some(Ordering::Equal)
        );
    }

    #[test]
    fn integer_against_float_is_exact() {
        let two_53 = 1_i64 << 53;
        assert_eq!(
            Number::I64(two_53 + 1).compare(Number::F64(two_53 as f64)),
            Some(Ordering::Greater)
        );
        assert_eq!(
            Number::F64(two_53 as f64).compare(Number::I64(two_53 + 1)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::U64(u64::MAX).compare(Number::F64(u64::MAX as f64)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(-3).compare(Number::F64(-2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(2).compare(Number::F64(2.5)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(0).compare(Number::F64(-0.0)),
            Some(Ordering::Equal)
        );
        assert_eq!(
            Number::I64(i64::MAX).compare(Number::F64(f64::INFINITY)),
            Some(Ordering::Less)
        );
        assert_eq!(
            Number::I64(i64::MIN).compare(Number::F64(f64::NEG_INFINITY)),
            Some(Ordering::Greater)
        );
    }

    #[test]
    fn number_nan_comparison() {
        assert_eq!(Number::F64(f64::NAN).compare(Number::F64(1.0)), None);
        assert_eq!(
            Number::F64(f64::NAN).total_cmp(Number::F64(1.0)),
            Ordering::Greater
        );
        assert_eq!(
            Number::F64(-f64::NAN).total_cmp(Number::I64(1)),
            Ordering::Greater
        );
        assert_eq!(
            Number::F64(f64::NAN).total_cmp(Number::F64(f64::NAN)),
            Ordering::Equal
        );
    }

    #[test]
    fn compare_mixed_kinds_is_undefined() {
        assert_eq!(Value::from("a").compare(&Value::from(1)), None);
        assert_eq!(Value::Null.compare(&Value::from(1)), None);
        assert_eq!(
            Value::from(vec![1, 2]).compare(&Value::from(vec![1, 3])),
            Some(Ordering::Less)
        );
    }

    #[test]
    fn sort_order_ranks_kinds_and_puts_null_last() {
        let mut values = vec![
            Value::Null,
            Value::from("b"),
            Value::from(2),
            Value::from(true),
            Value::from("a"),
            Value::from(1.5),
        ];
        values.sort_by(Value::sort_cmp);
        assert_eq!(
            values,
            vec![
                Value::from(true),
                Value::from(1.5),
                Value::from(2),
                Value::from("a"),
                Value::from("b"),
                Value::Null,
            ]
        );
    }

    #[test]
    fn display_text() {
        assert_eq!(Value::from("hello").to_string(), "hello");
        assert_eq!(Value::from(42).to_string(), "42");
        assert_eq!(Value::from(2.5).to_string(), "2.5");
        assert_eq!(Value::Null.to_string(), "");
        assert_eq!(Value::from(vec![1, 2]).to_string(), "[1, 2]");
    }

    #[test]
    fn option_and_vec_conversions() {
        assert_eq!(Value::from(None::<i32>), Value::Null);
        assert_eq!(Value::from(Some("x")), Value::from("x"));
        assert_eq!(Some(3u8).to_value(), Value::from(3));
        assert_eq!(
            vec!["a".to_string()].to_value(),
            Value::List(vec![Value::from("a")])
        );
    }

    #[test]
    fn hash_map_snapshot_is_key_ordered() {
        let mut map = HashMap::new();
        map.insert("b".to_string(), 2);
        map.insert("a".to_string(), 1);
        let keys: Vec<String> = map
            .to_value()
            .as_map()
            .map(|m| m.keys().cloned().collect())
            .unwrap_or_default();
        assert_eq!(keys, vec!["a", "b"]);
    }

    #[test]
    fn timestamp_conversions() {
        assert_eq!(Timestamp::from_secs(1).as_millis(), 1000);
        assert_eq!(Timestamp::from_millis(5000).as_secs(), 5);
        assert!(Timestamp(1000) < Timestamp(2000));
    }
}
