//! Sorted one-to-many delta map.
//!
//! [`SortedDeltaMultiMap`] applies the delta-map lifecycle to
//! [`OrderedMultiMap`] pools. Visibility is decided per (key, value) pair:
//! a pair is visible iff it is not tombstoned in `removed` and it is
//! registered in `original` or `added`.
//!
//! # Examples
//!
//! ```rust
//! use delta_cache::delta::{SortedDeltaMultiMap, TransactionalOverlay};
//!
//! let mut map = SortedDeltaMultiMap::new();
//! map.put(5, "a");
//! map.put(5, "b");
//! map.put(9, "c");
//! assert_eq!(map.get_values_before(&9), vec!["a", "b"]);
//!
//! map.remove(&5, &"a");
//! assert_eq!(map.get_values_before(&9), vec!["b"]);
//!
//! map.commit().unwrap();
//! let overlay = map.rebase();
//! assert_eq!(overlay.get_values_before(&9), vec!["b"]);
//! ```

use super::{DeltaMapError, OrderedMultiMap, TransactionalOverlay};
use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::fmt;
use std::sync::Arc;

/// A sorted delta map from keys to sets of values.
///
/// Every instance is writable. The committed pool is shared by reference
/// between a base and every overlay rebased from it; `commit` is the only
/// operation that writes to it.
pub struct SortedDeltaMultiMap<K, V> {
    original: Arc<OrderedMultiMap<K, V>>,
    added: OrderedMultiMap<K, V>,
    removed: OrderedMultiMap<K, V>,
}

impl<K, V> SortedDeltaMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    /// Creates an empty base instance.
    #[must_use]
    pub fn new() -> Self {
        Self::from_original(Arc::new(OrderedMultiMap::new()))
    }

    fn from_original(original: Arc<OrderedMultiMap<K, V>>) -> Self {
        Self {
            original,
            added: OrderedMultiMap::new(),
            removed: OrderedMultiMap::new(),
        }
    }

    /// Returns the number of visible (key, value) pairs.
    pub fn len(&self) -> usize {
        (self.original.len() + self.added.len()).saturating_sub(self.removed.len())
    }

    /// Returns `true` if no pair is visible.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Registers `value` under `key`.
    ///
    /// A tombstoned committed pair becomes visible again; a pair that is
    /// already committed is not staged twice.
    pub fn put(&mut self, key: K, value: V) {
        if self.removed.remove(&key, &value) || self.original.contains(&key, &value) {
            return;
        }

        self.added.put(key, value);
    }

    /// Hides the pair (`key`, `value`).
    ///
    /// Committed pairs are tombstoned, pending pairs are dropped, and unknown
    /// or already tombstoned pairs are ignored.
    pub fn remove(&mut self, key: &K, value: &V) {
        if self.removed.contains(key, value) {
            return;
        }

        if self.original.contains(key, value) {
            self.removed.put(key.clone(), value.clone());
        } else {
            self.added.remove(key, value);
        }
    }

    /// Returns `true` if the pair (`key`, `value`) is visible.
    pub fn contains(&self, key: &K, value: &V) -> bool {
        !self.removed.contains(key, value)
            && (self.original.contains(key, value) || self.added.contains(key, value))
    }

    /// Returns `true` if at least one visible pair has `key`.
    pub fn contains_key(&self, key: &K) -> bool {
        self.added.contains_key(key)
            || self
                .original
                .get(key)
                .iter()
                .any(|value| !self.removed.contains(key, value))
    }

    /// Returns the visible values registered under `key`, in ascending order.
    pub fn get(&self, key: &K) -> Vec<V> {
        let mut values: BTreeSet<V> = self
            .original
            .get(key)
            .into_iter()
            .filter(|value| !self.removed.contains(key, value))
            .collect();
        values.extend(self.added.get(key));
        values.into_iter().collect()
    }

    /// Returns every visible value registered under a key strictly before `key`.
    ///
    /// Values are ordered by key, then by value, across committed and pending
    /// pairs alike.
    pub fn get_values_before(&self, key: &K) -> Vec<V> {
        let mut committed = Vec::new();
        self.original.for_each_before(key, |entry_key, value| {
            if !self.removed.contains(entry_key, value) {
                committed.push((entry_key.clone(), value.clone()));
            }
        });
        let mut pending = Vec::new();
        self.added.for_each_before(key, |entry_key, value| {
            pending.push((entry_key.clone(), value.clone()));
        });

        let mut values = Vec::with_capacity(committed.len() + pending.len());
        let mut committed = committed.into_iter().peekable();
        let mut pending = pending.into_iter().peekable();
        loop {
            let next = match (committed.peek(), pending.peek()) {
                (Some(left), Some(right)) => match left.cmp(right) {
                    Ordering::Less => committed.next(),
                    Ordering::Greater => pending.next(),
                    Ordering::Equal => {
                        pending.next();
                        committed.next()
                    }
                },
                (Some(_), None) => committed.next(),
                (None, _) => pending.next(),
            };
            let Some((_, value)) = next else {
                break;
            };
            values.push(value);
        }
        values
    }

    /// Returns every key with its visible values, sorted by key.
    pub fn entries(&self) -> Vec<(K, Vec<V>)> {
        let mut merged: BTreeMap<K, BTreeSet<V>> = BTreeMap::new();
        self.original.for_each(|key, value| {
            if !self.removed.contains(key, value) {
                merged.entry(key.clone()).or_default().insert(value.clone());
            }
        });
        self.added.for_each(|key, value| {
            merged.entry(key.clone()).or_default().insert(value.clone());
        });

        merged
            .into_iter()
            .map(|(key, values)| (key, values.into_iter().collect()))
            .collect()
    }

    /// Hides every committed pair and drops every pending pair.
    pub fn clear(&mut self) {
        self.removed.put_all(&self.original);
        self.added.clear();
    }
}

// =============================================================================
// TransactionalOverlay Implementation
// =============================================================================

impl<K, V> TransactionalOverlay for SortedDeltaMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    fn commit(&mut self) -> Result<(), DeltaMapError> {
        let (added, removed) = (self.added.len(), self.removed.len());
        self.original.put_all(&self.added);
        self.original.remove_all(&self.removed);
        self.added.clear();
        self.removed.clear();

        tracing::debug!(added, removed, "committed sorted delta multimap");
        Ok(())
    }

    fn shallow_copy_to(&self, other: &mut Self) {
        if !Arc::ptr_eq(&self.original, &other.original) {
            other.original.replace_with(&self.original);
        }

        other.added.replace_with(&self.added);
        other.removed.replace_with(&self.removed);
        tracing::debug!(pairs = other.len(), "shallow copied sorted delta multimap");
    }

    fn rebase(&self) -> Self {
        tracing::trace!(
            committed = self.original.key_count(),
            "rebased sorted delta multimap"
        );
        Self::from_original(Arc::clone(&self.original))
    }

    fn deep_copy(&self) -> Self {
        let copy = Self {
            original: Arc::new(self.original.duplicate()),
            added: self.added.duplicate(),
            removed: self.removed.duplicate(),
        };
        tracing::debug!(pairs = copy.len(), "deep copied sorted delta multimap");
        copy
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V> Default for SortedDeltaMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V> FromIterator<(K, V)> for SortedDeltaMultiMap<K, V>
where
    K: Ord + Clone + Send + Sync + 'static,
    V: Ord + Clone + Send + Sync + 'static,
{
    /// Creates a base instance whose original pool holds the given pairs.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        Self::from_original(Arc::new(iter.into_iter().collect()))
    }
}

impl<K, V> fmt::Debug for SortedDeltaMultiMap<K, V>
where
    K: Ord + fmt::Debug,
    V: Ord + fmt::Debug,
{
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("SortedDeltaMultiMap")
            .field("original", &self.original)
            .field("added", &self.added)
            .field("removed", &self.removed)
            .finish()
    }
}

static_assertions::assert_impl_all!(SortedDeltaMultiMap<u64, [u8; 32]>: Send, Sync);
