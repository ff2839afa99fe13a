//! Ordered key/value collection.
//!
//! [`Collection`] keeps entries in insertion order on top of an
//! [`IndexMap`]. Keys are either given explicitly ([`Collection::set`]) or
//! assigned automatically ([`Collection::add`]) as one past the highest
//! integral key the collection has held since it was created or cleared.
//! When the key type has no value past that key, `add` fails with
//! [`SiftError::KeysExhausted`] instead of reusing a key.
//!
//! Every operation that derives a new collection (`map`, `filter`,
//! `partition`, `slice`, `matching`) copies the selected entries into a fresh
//! store; the source is never modified.

use std::cell::Cell;
use std::fmt;
use std::hash::Hash;
use std::ops::Index;

use indexmap::{map, Equivalent, IndexMap};

use crate::criteria::Criteria;
use crate::error::{Result, SiftError};
use crate::eval::{sort_fallibly, ExpressionEvaluator};
use crate::record::Record;
use crate::traits::Selectable;

/// A type usable as a collection key.
///
/// `as_index` reports the integral position a key stands for, if any, so that
/// automatic keys never collide with explicit ones.
pub trait CollectionKey: Hash + Eq + Clone {
    /// The integral index this key represents.
    fn as_index(&self) -> Option<usize> {
        None
    }
}

/// A key type that can be generated from an insertion index.
pub trait AutoKey: CollectionKey {
    /// Creates the key for the given index, or `None` when the index is out
    /// of the key type's range.
    fn from_index(index: usize) -> Option<Self>;
}

impl CollectionKey for usize {
    fn as_index(&self) -> Option<usize> {
        Some(*self)
    }
}

impl AutoKey for usize {
    fn from_index(index: usize) -> Option<Self> {
        Some(index)
    }
}

impl CollectionKey for u32 {
    fn as_index(&self) -> Option<usize> {
        usize::try_from(*self).ok()
    }
}

impl AutoKey for u32 {
    fn from_index(index: usize) -> Option<Self> {
        u32::try_from(index).ok()
    }
}

impl CollectionKey for u64 {
    fn as_index(&self) -> Option<usize> {
        usize::try_from(*self).ok()
    }
}

impl AutoKey for u64 {
    fn from_index(index: usize) -> Option<Self> {
        u64::try_from(index).ok()
    }
}

impl CollectionKey for i64 {
    fn as_index(&self) -> Option<usize> {
        usize::try_from(*self).ok()
    }
}

impl AutoKey for i64 {
    fn from_index(index: usize) -> Option<Self> {
        i64::try_from(index).ok()
    }
}

impl CollectionKey for String {}
impl CollectionKey for &'static str {}
impl CollectionKey for char {}

/// Mixed integer/string key, as found in loosely-typed data.
///
/// ```
/// use sift::{Collection, Key};
///
/// let mut c: Collection<Key, &str> = Collection::new();
/// c.set("name".into(), "first");
/// c.set(Key::Index(3), "second");
/// assert_eq!(c.add("third")?, Key::Index(4));
/// # Ok::<(), sift::SiftError>(())
/// ```
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum Key {
    /// Integral key.
    Index(usize),
    /// String key.
    Name(String),
}

impl CollectionKey for Key {
    fn as_index(&self) -> Option<usize> {
        match self {
            Key::Index(index) => Some(*index),
            Key::Name(_) => None,
        }
    }
}

impl AutoKey for Key {
    fn from_index(index: usize) -> Option<Self> {
        Some(Key::Index(index))
    }
}

impl From<usize> for Key {
    fn from(index: usize) -> Self {
        Key::Index(index)
    }
}

impl From<&str> for Key {
    fn from(name: &str) -> Self {
        Key::Name(name.to_string())
    }
}

impl From<String> for Key {
    fn from(name: String) -> Self {
        Key::Name(name)
    }
}

impl fmt::Display for Key {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Key::Index(index) => write!(f, "{}", index),
            Key::Name(name) => f.write_str(name),
        }
    }
}

/// An ordered map from keys to values.
///
/// Besides map-style access, a collection carries an internal cursor
/// ([`first`](Collection::first), [`last`](Collection::last),
/// [`next_value`](Collection::next_value), [`current`](Collection::current),
/// [`key`](Collection::key)) that is independent of [`iter`](Collection::iter).
/// The cursor lives in a `Cell`, so a collection is `Send` but not `Sync`.
///
/// # Example
///
/// ```
/// use sift::Collection;
///
/// let mut c: Collection<usize, &str> = Collection::from_values(["one", "two", "three"])?;
/// assert_eq!(c.get(&1), Some(&"two"));
///
/// c.remove(&0);
/// let keys: Vec<usize> = c.keys().copied().collect();
/// assert_eq!(keys, vec![1, 2]);
///
/// assert_eq!(c.add("four")?, 3);
/// # Ok::<(), sift::SiftError>(())
/// ```
#[derive(Clone)]
pub struct Collection<K, V> {
    entries: IndexMap<K, V>,
    /// One past the highest integral key held; `None` once that overflows.
    next_index: Option<usize>,
    cursor: Cell<usize>,
}

impl<K: CollectionKey, V> Collection<K, V> {
    /// Creates an empty collection.
    pub fn new() -> Self {
        Collection {
            entries: IndexMap::new(),
            next_index: Some(0),
            cursor: Cell::new(0),
        }
    }

    /// Creates a collection whose values are keyed by position.
    ///
    /// Fails with [`SiftError::KeysExhausted`] when there are more values
    /// than the key type can number.
    pub fn from_values(values: impl IntoIterator<Item = V>) -> Result<Self>
    where
        K: AutoKey,
    {
        let mut collection = Collection::new();
        collection.extend_values(values)?;
        Ok(collection)
    }

    // ========================================================================
    // Mutation
    // ========================================================================

    /// Appends a value under the next automatic key and returns that key.
    ///
    /// Fails with [`SiftError::KeysExhausted`], leaving the collection
    /// unchanged, when the highest key held is the last one the key type can
    /// represent.
    pub fn add(&mut self, value: V) -> Result<K>
    where
        K: AutoKey,
    {
        let key = self
            .next_index
            .and_then(K::from_index)
            .ok_or_else(SiftError::keys_exhausted)?;
        self.set(key.clone(), value);
        Ok(key)
    }

    /// Appends every value under automatic keys, stopping at the first
    /// failure.
    pub fn extend_values(&mut self, values: impl IntoIterator<Item = V>) -> Result<()>
    where
        K: AutoKey,
    {
        for value in values {
            self.add(value)?;
        }
        Ok(())
    }

    /// Stores a value under `key`, returning the previous value.
    ///
    /// Replacing an existing key keeps its position.
    pub fn set(&mut self, key: K, value: V) -> Option<V> {
        if let Some(index) = key.as_index() {
            self.next_index = match (self.next_index, index.checked_add(1)) {
                (Some(next), Some(after)) => Some(next.max(after)),
                _ => None,
            };
        }
        self.entries.insert(key, value)
    }

    /// Removes the entry under `key`, returning its value.
    ///
    /// Removing an absent key is a no-op that returns `None`.
    pub fn remove<Q>(&mut self, key: &Q) -> Option<V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.shift_remove(key)
    }

    /// Removes the first entry holding `value`. Returns whether one was removed.
    pub fn remove_element(&mut self, value: &V) -> bool
    where
        V: PartialEq,
    {
        match self.entries.iter().position(|(_, v)| v == value) {
            Some(index) => {
                self.entries.shift_remove_index(index);
                true
            }
            None => false,
        }
    }

    /// Removes every entry and resets automatic keys and the cursor.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.next_index = Some(0);
        self.cursor.set(0);
    }

    // ========================================================================
    // Lookup
    // ========================================================================

    /// Returns the value under `key`.
    pub fn get<Q>(&self, key: &Q) -> Option<&V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get(key)
    }

    /// Returns a mutable reference to the value under `key`.
    pub fn get_mut<Q>(&mut self, key: &Q) -> Option<&mut V>
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.get_mut(key)
    }

    /// Returns `true` if `key` is present, even when its value is null-like.
    pub fn contains_key<Q>(&self, key: &Q) -> bool
    where
        Q: ?Sized + Hash + Equivalent<K>,
    {
        self.entries.contains_key(key)
    }

    /// Returns `true` if any entry holds `value`.
    pub fn contains(&self, value: &V) -> bool
    where
        V: PartialEq,
    {
        self.entries.values().any(|v| v == value)
    }

    /// Returns the key of the first entry holding `value`.
    pub fn index_of(&self, value: &V) -> Option<&K>
    where
        V: PartialEq,
    {
        self.entries
            .iter()
            .find_map(|(k, v)| (v == value).then_some(k))
    }

    /// Returns the first entry satisfying `predicate`.
    pub fn find_first<F>(&self, mut predicate: F) -> Option<(&K, &V)>
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.entries.iter().find(|(k, v)| predicate(k, v))
    }

    /// Returns `true` if any entry satisfies `predicate`.
    pub fn exists<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.entries.iter().any(|(k, v)| predicate(k, v))
    }

    /// Returns `true` if every entry satisfies `predicate`.
    pub fn for_all<F>(&self, mut predicate: F) -> bool
    where
        F: FnMut(&K, &V) -> bool,
    {
        self.entries.iter().all(|(k, v)| predicate(k, v))
    }

    /// Returns `true` if the collection holds no entries.
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Returns the number of entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Iterates keys in order.
    pub fn keys(&self) -> map::Keys<'_, K, V> {
        self.entries.keys()
    }

    /// Iterates values in order.
    pub fn values(&self) -> map::Values<'_, K, V> {
        self.entries.values()
    }

    /// Iterates entries in order.
    pub fn iter(&self) -> map::Iter<'_, K, V> {
        self.entries.iter()
    }

    /// Copies the entries into a plain ordered map.
    pub fn to_map(&self) -> IndexMap<K, V>
    where
        V: Clone,
    {
        self.entries.clone()
    }

    // ========================================================================
    // Cursor
    // ========================================================================

    /// Moves the cursor to the first entry and returns its value.
    pub fn first(&self) -> Option<&V> {
        self.cursor.set(0);
        self.current()
    }

    /// Moves the cursor to the last entry and returns its value.
    pub fn last(&self) -> Option<&V> {
        self.cursor.set(self.entries.len().saturating_sub(1));
        self.current()
    }

    /// Advances the cursor and returns the value it lands on.
    ///
    /// Returns `None` once the cursor moves past the end.
    pub fn next_value(&self) -> Option<&V> {
        let position = self.cursor.get().saturating_add(1).min(self.entries.len());
        self.cursor.set(position);
        self.current()
    }

    /// Returns the value under the cursor.
    pub fn current(&self) -> Option<&V> {
        self.entries.get_index(self.cursor.get()).map(|(_, v)| v)
    }

    /// Returns the key under the cursor.
    pub fn key(&self) -> Option<&K> {
        self.entries.get_index(self.cursor.get()).map(|(k, _)| k)
    }

    // ========================================================================
    // Derivation
    // ========================================================================

    /// Copies up to `length` entries starting at position `offset`.
    ///
    /// Keys are preserved. `None` takes everything after `offset`.
    pub fn slice(&self, offset: usize, length: Option<usize>) -> Self
    where
        V: Clone,
    {
        self.entries
            .iter()
            .skip(offset)
            .take(length.unwrap_or(usize::MAX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Applies `f` to every value, keeping keys and order.
    pub fn map<U, F>(&self, mut f: F) -> Collection<K, U>
    where
        F: FnMut(&V) -> U,
    {
        self.entries.iter().map(|(k, v)| (k.clone(), f(v))).collect()
    }

    /// Copies the entries satisfying `predicate`, keeping their keys.
    pub fn filter<F>(&self, mut predicate: F) -> Self
    where
        V: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        self.entries
            .iter()
            .filter(|(k, v)| predicate(k, v))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect()
    }

    /// Splits into entries that satisfy `predicate` and those that do not.
    pub fn partition<F>(&self, mut predicate: F) -> (Self, Self)
    where
        V: Clone,
        F: FnMut(&K, &V) -> bool,
    {
        let mut matched = Collection::new();
        let mut rest = Collection::new();
        for (k, v) in &self.entries {
            let target = if predicate(k, v) {
                &mut matched
            } else {
                &mut rest
            };
            target.set(k.clone(), v.clone());
        }
        (matched, rest)
    }

    /// Folds the values in order, starting from `initial`.
    pub fn reduce<A, F>(&self, f: F, initial: A) -> A
    where
        F: FnMut(A, &V) -> A,
    {
        self.entries.values().fold(initial, f)
    }
}

impl<K: CollectionKey, V: Record + Clone> Selectable for Collection<K, V> {
    fn matching_with(&self, criteria: &Criteria, evaluator: &ExpressionEvaluator) -> Result<Self> {
        let mut selected: Vec<(&K, &V)> = match criteria.where_expression() {
            Some(expr) => {
                let predicate = evaluator.compile(expr)?;
                let mut kept = Vec::with_capacity(self.entries.len());
                for (key, value) in &self.entries {
                    if predicate.test(value)? {
                        kept.push((key, value));
                    }
                }
                kept
            }
            None => self.entries.iter().collect(),
        };

        let orderings = criteria
            .orderings()
            .iter()
            .map(|(field, dir)| (field.as_str(), *dir));
        if let Some(comparator) = evaluator.comparator(orderings) {
            sort_fallibly(&mut selected, |a, b| comparator.compare(a.1, b.1))?;
        }

        let matched = selected.len();
        let result: Self = selected
            .into_iter()
            .skip(criteria.first_result().unwrap_or(0))
            .take(criteria.max_results().unwrap_or(usize::MAX))
            .map(|(k, v)| (k.clone(), v.clone()))
            .collect();
        log::debug!(
            "{} matched {} of {} entries, returning {}",
            criteria,
            matched,
            self.entries.len(),
            result.len()
        );
        Ok(result)
    }
}

impl<K: CollectionKey, V> Default for Collection<K, V> {
    fn default() -> Self {
        Collection::new()
    }
}

impl<K: fmt::Debug, V: fmt::Debug> fmt::Debug for Collection<K, V> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_map().entries(self.entries.iter()).finish()
    }
}

/// Equal when both hold the same entries in the same order.
impl<K: PartialEq, V: PartialEq> PartialEq for Collection<K, V> {
    fn eq(&self, other: &Self) -> bool {
        self.entries.len() == other.entries.len() && self.entries.iter().eq(other.entries.iter())
    }
}

impl<K: CollectionKey, V> FromIterator<(K, V)> for Collection<K, V> {
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut collection = Collection::new();
        collection.extend(iter);
        collection
    }
}

impl<K: CollectionKey, V> Extend<(K, V)> for Collection<K, V> {
    fn extend<I: IntoIterator<Item = (K, V)>>(&mut self, iter: I) {
        for (key, value) in iter {
            self.set(key, value);
        }
    }
}

impl<K, V> IntoIterator for Collection<K, V> {
    type Item = (K, V);
    type IntoIter = map::IntoIter<K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.into_iter()
    }
}

impl<'a, K, V> IntoIterator for &'a Collection<K, V> {
    type Item = (&'a K, &'a V);
    type IntoIter = map::Iter<'a, K, V>;

    fn into_iter(self) -> Self::IntoIter {
        self.entries.iter()
    }
}

impl<K: CollectionKey, V, Q> Index<&Q> for Collection<K, V>
where
    Q: ?Sized + Hash + Equivalent<K>,
{
    type Output = V;

    /// Panics if the key is absent; use [`Collection::get`] otherwise.
    fn index(&self, key: &Q) -> &V {
        &self.entries[key]
    }
}
