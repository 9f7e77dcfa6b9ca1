//! Concurrent sorted one-to-many map.
//!
//! [`OrderedMultiMap`] maps each key to a duplicate-free set of values and
//! keeps keys sorted, so that all values registered before a given key can be
//! collected with one seek plus a scan of the matching prefix.
//!
//! # Concurrency
//!
//! The map is a `SkipMap` of `SkipSet`s: readers may traverse it while writers
//! mutate it, and every method takes `&self`. The map adds no writer lock. A
//! `put` racing a `remove` on the same key may lose its value when the emptied
//! set is dropped, and two writers registering the same pair at once may both
//! count it, so writers of one key must be serialized by the caller.

use crossbeam_skiplist::{SkipMap, SkipSet};
use std::fmt;
use std::sync::atomic::{AtomicUsize, Ordering};

/// A concurrent sorted map from keys to duplicate-free value sets.
///
/// # Time Complexity
///
/// | Operation           | Complexity              |
/// |---------------------|-------------------------|
/// | `put`/`remove`      | O(log N + log M)        |
/// | `contains`          | O(log N + log M)        |
/// | `get_values_before` | O(log N + k)            |
/// | `len`               | O(1)                    |
/// | `key_count`         | O(1)                    |
///
/// N is the number of keys, M the size of one value set and k the number of
/// returned values.
///
/// # Examples
///
/// ```rust
/// use delta_cache::delta::OrderedMultiMap;
///
/// let map = OrderedMultiMap::new();
/// map.put(5, "a");
/// map.put(5, "b");
/// map.put(9, "c");
///
/// assert_eq!(map.len(), 3);
/// assert_eq!(map.get_values_before(&9), vec!["a", "b"]);
/// ```
pub struct OrderedMultiMap<K, V> {
    inner: SkipMap<K, SkipSet<V>>,
    pairs: AtomicUsize,
}

impl<K, V> OrderedMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    /// Creates an empty map.
    #[must_use]
    pub fn new() -> Self {
        Self {
            inner: SkipMap::new(),
            pairs: AtomicUsize::new(0),
        }
    }

    /// Returns the number of (key, value) pairs.
    pub fn len(&self) -> usize {
        self.pairs.load(Ordering::Acquire)
    }

    /// Returns `true` if the map holds no pair.
    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }

    /// Returns the number of distinct keys.
    pub fn key_count(&self) -> usize {
        self.inner.len()
    }

    /// Removes every pair.
    pub fn clear(&self) {
        self.inner.clear();
        self.pairs.store(0, Ordering::Release);
    }

    /// Returns `true` if at least one value is registered under `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.inner
            .get(key)
            .is_some_and(|entry| !entry.value().is_empty())
    }

    /// Returns `true` if `value` is registered under `key`.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        self.inner
            .get(key)
            .is_some_and(|entry| entry.value().contains(value))
    }

    /// Registers `value` under `key`.
    pub fn put(&self, key: K, value: V) {
        let entry = self.inner.get_or_insert_with(key, SkipSet::new);
        self.insert_counted(entry.value(), value);
    }

    /// Registers every value of `values` under `key`.
    pub fn put_set<I: IntoIterator<Item = V>>(&self, key: K, values: I) {
        let mut values = values.into_iter().peekable();
        if values.peek().is_none() {
            return;
        }

        let entry = self.inner.get_or_insert_with(key, SkipSet::new);
        for value in values {
            self.insert_counted(entry.value(), value);
        }
    }

    fn insert_counted(&self, set: &SkipSet<V>, value: V) {
        if !set.contains(&value) {
            set.insert(value);
            self.pairs.fetch_add(1, Ordering::AcqRel);
        }
    }

    /// Registers every pair of `other`.
    pub fn put_all(&self, other: &Self) {
        other.for_each(|key, value| self.put(key.clone(), value.clone()));
    }

    /// Unregisters `value` from `key`, dropping the key once its set is empty.
    ///
    /// Returns `true` if the pair was present.
    pub fn remove(&self, key: &K, value: &V) -> bool {
        let Some(entry) = self.inner.get(key) else {
            return false;
        };

        let removed = entry.value().remove(value).is_some();
        if removed {
            self.pairs.fetch_sub(1, Ordering::AcqRel);
        }
        if entry.value().is_empty() {
            entry.remove();
        }
        removed
    }

    /// Unregisters every pair of `other`.
    pub fn remove_all(&self, other: &Self) {
        other.for_each(|key, value| {
            self.remove(key, value);
        });
    }

    /// Returns the values registered under `key`, in ascending order.
    pub fn get(&self, key: &K) -> Vec<V> {
        self.inner
            .get(key)
            .map(|entry| {
                entry
                    .value()
                    .iter()
                    .map(|value| value.value().clone())
                    .collect()
            })
            .unwrap_or_default()
    }

    /// Returns every value registered under a key strictly before `key`.
    ///
    /// Values are ordered by key, then by value.
    pub fn get_values_before(&self, key: &K) -> Vec<V> {
        let mut values = Vec::new();
        self.for_each_before(key, |_, value| values.push(value.clone()));
        values
    }

    /// Visits every pair whose key orders strictly before `key`.
    pub fn for_each_before<F: FnMut(&K, &V)>(&self, key: &K, mut visitor: F) {
        for entry in self.inner.range::<K, _>(..key) {
            for value in entry.value().iter() {
                visitor(entry.key(), value.value());
            }
        }
    }

    /// Visits every pair in key order.
    pub fn for_each<F: FnMut(&K, &V)>(&self, mut visitor: F) {
        for entry in self.inner.iter() {
            for value in entry.value().iter() {
                visitor(entry.key(), value.value());
            }
        }
    }

    /// Returns every key with its values, sorted by key.
    pub fn entries(&self) -> Vec<(K, Vec<V>)> {
        self.inner
            .iter()
            .map(|entry| {
                let values = entry
                    .value()
                    .iter()
                    .map(|value| value.value().clone())
                    .collect();
                (entry.key().clone(), values)
            })
            .collect()
    }

    /// Returns an independent map holding the same pairs.
    #[must_use]
    pub fn duplicate(&self) -> Self {
        let copy = Self::new();
        copy.put_all(self);
        copy
    }

    /// Replaces every pair of this map with the pairs of `source`.
    pub fn replace_with(&self, source: &Self) {
        self.clear();
        self.put_all(source);
    }
}

impl<K, V> Default for OrderedMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for OrderedMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let map = Self::new();
        for (key, value) in iter {
            map.put(key, value);
        }
        map
    }
}

impl<K, V> fmt::Debug for OrderedMultiMap<K, V>
where
    K: Ord + fmt::Debug,
    V: Ord + fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut map = formatter.debug_map();
        for entry in self.inner.iter() {
            map.entry(entry.key(), &ValueList(entry.value()));
        }
        map.finish()
    }
}

struct ValueList<'a, V>(&'a SkipSet<V>);

impl<V: Ord + fmt::Debug> fmt::Debug for ValueList<'_, V> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        let mut list = formatter.debug_list();
        for value in self.0.iter() {
            list.entry(value.value());
        }
        list.finish()
    }
}

static_assertions::assert_impl_all!(OrderedMultiMap<u64, [u8; 32]>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
