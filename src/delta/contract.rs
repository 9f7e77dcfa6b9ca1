//! Read/write and lifecycle contracts shared by the delta maps.

use super::DeltaMapError;

/// Operations exposed by every single-valued delta map.
///
/// Reads never fail: a missing or tombstoned key yields `None`. Writes return
/// [`DeltaMapError::ReadOnly`] when invoked on a read-only base instance.
pub trait DeltaMap<K, V> {
    /// Returns the number of visible entries.
    ///
    /// This is `|original| + |added| - |removed|`.
    fn len(&self) -> usize;

    /// Returns `true` if no entry is visible.
    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Hides every committed entry and drops every pending addition.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    fn clear(&mut self) -> Result<(), DeltaMapError>;

    /// Returns an owned value for `key`, or `None` if it is absent or tombstoned.
    fn get(&self, key: &K) -> Option<V>;

    /// Returns the value for `key`, or `default` if it is absent or tombstoned.
    fn get_or_default(&self, key: &K, default: V) -> V {
        self.get(key).unwrap_or(default)
    }

    /// Stores `value` under `key`, clearing any tombstone for it.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    fn put(&mut self, key: K, value: V) -> Result<(), DeltaMapError>;

    /// Hides `key`. Removing an absent or already removed key does nothing.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    fn remove(&mut self, key: &K) -> Result<(), DeltaMapError>;

    /// Returns `true` if `key` is visible.
    fn contains_key(&self, key: &K) -> bool;

    /// Collects every visible entry.
    ///
    /// Each call recomputes the view from the current pools. The receiver is
    /// `&mut` because a copy-on-access map first moves a copy of every
    /// committed value into its `copied` pool; maps that share values leave
    /// their pools untouched. Use `read_only_entries` for a side-effect-free
    /// snapshot through a shared reference.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance of a
    /// copy-on-access map.
    fn entries(&mut self) -> Result<Vec<(K, V)>, DeltaMapError>;

    /// Collects every visible value.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance of a
    /// copy-on-access map.
    fn values(&mut self) -> Result<Vec<V>, DeltaMapError> {
        Ok(self
            .entries()?
            .into_iter()
            .map(|(_, value)| value)
            .collect())
    }
}

/// Lifecycle of a map that stages changes against a shared committed base.
pub trait TransactionalOverlay: Sized {
    /// Folds the pending pools into the shared original pool and empties them.
    ///
    /// Calling it again without intervening writes is a no-op. Committing two
    /// overlays rebased from the same base without rebasing the second one in
    /// between may resurrect stale data; preventing that is the caller's job.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    fn commit(&mut self) -> Result<(), DeltaMapError>;

    /// Replaces every pool of `other` with a copy of this map's pools.
    ///
    /// The original pool of `other` is overwritten in place, so every instance
    /// sharing it observes the new committed state.
    fn shallow_copy_to(&self, other: &mut Self);

    /// Returns a writable overlay sharing this map's original pool, in O(1).
    #[must_use]
    fn rebase(&self) -> Self;

    /// Returns a fully independent copy of this map, in O(n).
    #[must_use]
    fn deep_copy(&self) -> Self;
}
