//! Single-valued copy-on-write delta maps.
//!
//! This module provides [`DeltaOverlay`], one pool-managing map type
//! parameterized over a [`ValuePolicy`], and its two named variants:
//!
//! - [`ImmutableObjectDeltaMap`]: values are shared by cloning and never
//!   mutated in place
//! - [`MutableObjectAwareDeltaMap`]: values are duplicated through
//!   [`Copyable`] before a caller may mutate them
//!
//! # Pools
//!
//! Every instance holds four pools over the same key type:
//!
//! - `original`: the committed state, shared by reference between a base and
//!   every overlay rebased from it
//! - `copied`: values of committed keys that this overlay replaced or
//!   duplicated for mutation
//! - `added`: keys that are not committed yet
//! - `removed`: tombstones hiding committed keys
//!
//! A key is visible iff it is not tombstoned and it is in `original` or `added`.
//! `copied` only ever holds keys that are also in `original`, so the number of
//! visible entries is `|original| + |added| - |removed|`.
//!
//! # Examples
//!
//! ```rust
//! use delta_cache::delta::{Copyable, DeltaMap, MutableObjectAwareDeltaMap, TransactionalOverlay};
//!
//! #[derive(Debug, PartialEq)]
//! struct Account {
//!     balance: u64,
//! }
//!
//! impl Copyable for Account {
//!     fn copy(&self) -> Self {
//!         Self { balance: self.balance }
//!     }
//! }
//!
//! let base: MutableObjectAwareDeltaMap<&str, Account> =
//!     [("alice", Account { balance: 10 })].into_iter().collect();
//!
//! let mut overlay = base.rebase();
//! if let Some(account) = overlay.get_mut(&"alice").unwrap() {
//!     account.balance += 5;
//! }
//!
//! // The committed state is untouched until the overlay commits.
//! assert_eq!(base.get(&"alice"), Some(Account { balance: 10 }));
//! assert_eq!(overlay.get(&"alice"), Some(Account { balance: 15 }));
//!
//! overlay.commit().unwrap();
//! assert_eq!(base.get(&"alice"), Some(Account { balance: 15 }));
//! ```

use super::{
    CopiedValues, Copyable, DeltaMap, DeltaMapError, PoolMap, PoolSet, SharedValues,
    TransactionalOverlay, ValuePolicy, pool_map, pool_set,
};
use parking_lot::RwLock;
use std::fmt;
use std::hash::Hash;
use std::marker::PhantomData;
use std::sync::Arc;

// =============================================================================
// DeltaOverlay Definition
// =============================================================================

/// A copy-on-write delta map over a shared committed pool.
///
/// Instances created with [`new`](Self::new), [`with_capacity`](Self::with_capacity)
/// or [`FromIterator`] are *base* instances. Whether a base accepts writes is
/// decided by the policy: [`ImmutableObjectDeltaMap`] bases are writable,
/// [`MutableObjectAwareDeltaMap`] bases are read-only. Instances returned by
/// [`rebase`](TransactionalOverlay::rebase) are always writable overlays.
///
/// # Time Complexity
///
/// | Operation       | Complexity          |
/// |-----------------|---------------------|
/// | `get`/`put`     | O(1)                |
/// | `remove`        | O(1)                |
/// | `len`           | O(1)                |
/// | `rebase`        | O(1)                |
/// | `commit`        | O(pending)          |
/// | `entries`       | O(N)                |
/// | `deep_copy`     | O(N)                |
pub struct DeltaOverlay<K, V, P> {
    original: Arc<RwLock<PoolMap<K, V>>>,
    copied: PoolMap<K, V>,
    added: PoolMap<K, V>,
    removed: PoolSet<K>,
    is_mutable: bool,
    policy: PhantomData<fn() -> P>,
}

/// A delta map for values that are never mutated in place once stored.
pub type ImmutableObjectDeltaMap<K, V> = DeltaOverlay<K, V, SharedValues>;

/// A delta map for mutable values.
///
/// Reads through an overlay never expose a committed value by reference:
/// [`get`](DeltaMap::get) returns an owned copy and
/// [`get_mut`](DeltaOverlay::get_mut) first moves a copy into the overlay's
/// `copied` pool.
pub type MutableObjectAwareDeltaMap<K, V> = DeltaOverlay<K, V, CopiedValues>;

impl<K, V, P> DeltaOverlay<K, V, P>
where
    K: Eq + Hash + Clone,
    P: ValuePolicy<V>,
{
    /// Creates an empty base instance.
    #[must_use]
    pub fn new() -> Self {
        Self::with_capacity(0)
    }

    /// Creates an empty base instance whose original pool can hold
    /// `capacity` entries without reallocating.
    #[must_use]
    pub fn with_capacity(capacity: usize) -> Self {
        Self::from_original(
            Arc::new(RwLock::new(pool_map(capacity))),
            !P::READ_ONLY_BASE,
        )
    }

    fn from_original(original: Arc<RwLock<PoolMap<K, V>>>, is_mutable: bool) -> Self {
        Self {
            original,
            copied: pool_map(0),
            added: pool_map(0),
            removed: pool_set(),
            is_mutable,
            policy: PhantomData,
        }
    }

    /// Returns `true` if this instance accepts writes.
    pub const fn is_mutable(&self) -> bool {
        self.is_mutable
    }

    /// Collects every visible entry without mutability checks and without
    /// populating the `copied` pool.
    ///
    /// Values are duplicated with the map's policy, so callers never obtain a
    /// reference into the shared original pool.
    pub fn read_only_entries(&self) -> Vec<(K, V)> {
        let mut entries = Vec::with_capacity(self.len());
        let original = self.original.read();
        entries.extend(
            self.copied
                .iter()
                .chain(self.added.iter())
                .map(|(key, value)| (key.clone(), P::duplicate(value))),
        );
        entries.extend(
            original
                .iter()
                .filter(|(key, _)| self.is_uncopied(key))
                .map(|(key, value)| (key.clone(), P::duplicate(value))),
        );
        entries
    }

    fn ensure_mutable(&self, operation: &'static str) -> Result<(), DeltaMapError> {
        if self.is_mutable {
            Ok(())
        } else {
            tracing::warn!(operation, "rejected write to a read-only delta map");
            Err(DeltaMapError::ReadOnly { operation })
        }
    }

    /// Returns `true` if the visible value for a committed `key` still lives
    /// only in the original pool.
    fn is_uncopied(&self, key: &K) -> bool {
        !self.copied.contains_key(key)
            && !self.added.contains_key(key)
            && !self.removed.contains(key)
    }

    /// Duplicates every visible committed value that has no copy yet.
    fn materialize_copies(&mut self) {
        let original = self.original.read();
        for (key, value) in original.iter() {
            if self.is_uncopied(key) {
                self.copied.insert(key.clone(), P::duplicate(value));
            }
        }
    }

    fn duplicate_pool(pool: &PoolMap<K, V>) -> PoolMap<K, V> {
        let mut copy = pool_map(pool.len());
        copy.extend(
            pool.iter()
                .map(|(key, value)| (key.clone(), P::duplicate(value))),
        );
        copy
    }
}

impl<K, V> DeltaOverlay<K, V, CopiedValues>
where
    K: Eq + Hash + Clone,
    V: Copyable,
{
    /// Returns a mutable reference to the visible value for `key`.
    ///
    /// A committed value is first duplicated into the `copied` pool; the
    /// reference always points into a pool owned by this overlay, and changes
    /// made through it are folded into the original pool on commit.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    pub fn get_mut(&mut self, key: &K) -> Result<Option<&mut V>, DeltaMapError> {
        self.ensure_mutable("get_mut")?;
        if self.removed.contains(key) {
            return Ok(None);
        }

        if !self.copied.contains_key(key)
            && let Some(value) = self.original.read().get(key)
        {
            self.copied.insert(key.clone(), value.copy());
        }

        if let Some(value) = self.copied.get_mut(key) {
            return Ok(Some(value));
        }

        Ok(self.added.get_mut(key))
    }

    /// Iterates mutably over every visible entry.
    ///
    /// Every committed value without a copy is duplicated into the `copied`
    /// pool first.
    ///
    /// # Errors
    ///
    /// Returns [`DeltaMapError::ReadOnly`] on a read-only base instance.
    pub fn iter_mut(
        &mut self,
    ) -> Result<impl Iterator<Item = (&K, &mut V)>, DeltaMapError> {
        self.ensure_mutable("iter_mut")?;
        self.materialize_copies();
        Ok(self.copied.iter_mut().chain(self.added.iter_mut()))
    }
}

// =============================================================================
// DeltaMap Implementation
// =============================================================================

impl<K, V, P> DeltaMap<K, V> for DeltaOverlay<K, V, P>
where
    K: Eq + Hash + Clone,
    P: ValuePolicy<V>,
{
    fn len(&self) -> usize {
        (self.original.read().len() + self.added.len()).saturating_sub(self.removed.len())
    }

    fn clear(&mut self) -> Result<(), DeltaMapError> {
        self.ensure_mutable("clear")?;
        self.removed.extend(self.original.read().keys().cloned());
        self.copied.clear();
        self.added.clear();
        Ok(())
    }

    fn get(&self, key: &K) -> Option<V> {
        if !self.is_mutable {
            return self.original.read().get(key).map(P::duplicate);
        }

        if self.removed.contains(key) {
            return None;
        }

        if let Some(value) = self.copied.get(key) {
            return Some(P::duplicate(value));
        }

        if let Some(value) = self.original.read().get(key) {
            return Some(P::duplicate(value));
        }

        self.added.get(key).map(P::duplicate)
    }

    fn put(&mut self, key: K, value: V) -> Result<(), DeltaMapError> {
        self.ensure_mutable("put")?;
        self.removed.remove(&key);

        if self.original.read().contains_key(&key) {
            self.copied.insert(key, value);
        } else {
            self.added.insert(key, value);
        }
        Ok(())
    }

    fn remove(&mut self, key: &K) -> Result<(), DeltaMapError> {
        self.ensure_mutable("remove")?;
        if self.removed.contains(key) {
            return Ok(());
        }

        if self.copied.remove(key).is_some() || self.original.read().contains_key(key) {
            self.removed.insert(key.clone());
        } else {
            self.added.remove(key);
        }
        Ok(())
    }

    fn contains_key(&self, key: &K) -> bool {
        !self.removed.contains(key)
            && (self.original.read().contains_key(key) || self.added.contains_key(key))
    }

    fn entries(&mut self) -> Result<Vec<(K, V)>, DeltaMapError> {
        self.ensure_mutable("entries")?;
        if !P::COPY_ON_ACCESS {
            return Ok(self.read_only_entries());
        }

        self.materialize_copies();
        Ok(self
            .copied
            .iter()
            .chain(self.added.iter())
            .map(|(key, value)| (key.clone(), P::duplicate(value)))
            .collect())
    }

    fn values(&mut self) -> Result<Vec<V>, DeltaMapError> {
        self.ensure_mutable("values")?;
        if !P::COPY_ON_ACCESS {
            return Ok(self
                .read_only_entries()
                .into_iter()
                .map(|(_, value)| value)
                .collect());
        }

        self.materialize_copies();
        Ok(self
            .copied
            .values()
            .chain(self.added.values())
            .map(P::duplicate)
            .collect())
    }
}

// =============================================================================
// TransactionalOverlay Implementation
// =============================================================================

impl<K, V, P> TransactionalOverlay for DeltaOverlay<K, V, P>
where
    K: Eq + Hash + Clone,
    P: ValuePolicy<V>,
{
    fn commit(&mut self) -> Result<(), DeltaMapError> {
        self.ensure_mutable("commit")?;
        let (added, copied, removed) = (self.added.len(), self.copied.len(), self.removed.len());

        let mut original = self.original.write();
        original.extend(self.added.drain());
        original.extend(self.copied.drain());
        for key in self.removed.drain() {
            original.remove(&key);
        }
        let committed = original.len();
        drop(original);

        tracing::debug!(added, copied, removed, committed, "committed delta map");
        Ok(())
    }

    fn shallow_copy_to(&self, other: &mut Self) {
        if !Arc::ptr_eq(&self.original, &other.original) {
            let snapshot = Self::duplicate_pool(&self.original.read());
            *other.original.write() = snapshot;
        }

        other.copied = Self::duplicate_pool(&self.copied);
        other.added = Self::duplicate_pool(&self.added);
        other.removed.clone_from(&self.removed);
        tracing::debug!(entries = other.len(), "shallow copied delta map");
    }

    fn rebase(&self) -> Self {
        tracing::trace!(committed = self.original.read().len(), "rebased delta map");
        Self::from_original(Arc::clone(&self.original), true)
    }

    fn deep_copy(&self) -> Self {
        let original = Self::duplicate_pool(&self.original.read());
        let copy = Self {
            original: Arc::new(RwLock::new(original)),
            copied: Self::duplicate_pool(&self.copied),
            added: Self::duplicate_pool(&self.added),
            removed: self.removed.clone(),
            is_mutable: self.is_mutable,
            policy: PhantomData,
        };
        tracing::debug!(entries = copy.len(), "deep copied delta map");
        copy
    }
}

// =============================================================================
// Standard Trait Implementations
// =============================================================================

impl<K, V, P> Default for DeltaOverlay<K, V, P>
where
    K: Eq + Hash + Clone,
    P: ValuePolicy<V>,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, P> FromIterator<(K, V)> for DeltaOverlay<K, V, P>
where
    K: Eq + Hash + Clone,
    P: ValuePolicy<V>,
{
    /// Creates a base instance whose original pool holds the given entries.
    fn from_iter<I: IntoIterator<Item = (K, V)>>(iter: I) -> Self {
        let mut original = pool_map(0);
        original.extend(iter);
        Self::from_original(Arc::new(RwLock::new(original)), !P::READ_ONLY_BASE)
    }
}

impl<K, V, P> fmt::Debug for DeltaOverlay<K, V, P> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("DeltaOverlay")
            .field("original", &self.original.read().len())
            .field("copied", &self.copied.len())
            .field("added", &self.added.len())
            .field("removed", &self.removed.len())
            .field("is_mutable", &self.is_mutable)
            .finish()
    }
}

static_assertions::assert_impl_all!(ImmutableObjectDeltaMap<u64, String>: Send, Sync);
static_assertions::assert_impl_all!(MutableObjectAwareDeltaMap<u64, Vec<u8>>: Send, Sync);

// =============================================================================
// Tests
// =============================================================================
