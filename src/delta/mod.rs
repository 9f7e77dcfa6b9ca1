//! Transactional delta maps.
//!
//! This module provides key-value containers that keep a committed state
//! (the *original* pool) apart from the pending mutations of a unit of
//! speculative work (an *overlay*):
//!
//! - [`ImmutableObjectDeltaMap`]: values are never mutated in place once stored
//! - [`MutableObjectAwareDeltaMap`]: values are mutable and duplicated through
//!   [`Copyable`] before a caller may touch them
//! - [`SortedDeltaMultiMap`]: a sorted one-to-many map with head range queries,
//!   built on [`OrderedMultiMap`]
//!
//! # Lifecycle
//!
//! A long-lived *base* instance holds the committed state. [`TransactionalOverlay::rebase`]
//! hands out a fresh overlay that shares the base's original pool by reference;
//! mutations land in the overlay's private pools. [`TransactionalOverlay::commit`]
//! folds them into the shared original pool, and [`TransactionalOverlay::deep_copy`]
//! produces a fully independent snapshot.
//!
//! # Examples
//!
//! ```rust
//! use delta_cache::delta::{DeltaMap, ImmutableObjectDeltaMap, TransactionalOverlay};
//!
//! let mut base: ImmutableObjectDeltaMap<u32, &str> = ImmutableObjectDeltaMap::new();
//! base.put(1, "one").unwrap();
//! base.commit().unwrap();
//!
//! let mut overlay = base.rebase();
//! overlay.put(2, "two").unwrap();
//! overlay.remove(&1).unwrap();
//!
//! // The base does not observe uncommitted overlay changes.
//! assert_eq!(base.get(&1), Some("one"));
//! assert!(!base.contains_key(&2));
//!
//! overlay.commit().unwrap();
//! assert_eq!(base.get(&1), None);
//! assert_eq!(base.get(&2), Some("two"));
//! ```
//!
//! # Concurrency
//!
//! Overlay pools are private to their owner. The shared original pool is read
//! concurrently by every instance rebased from the same base; only `commit`
//! writes to it. Concurrent commits are applied one after another, so for a
//! key touched by two overlays the last commit wins.

// =============================================================================
// Pool Hasher Type Alias
// =============================================================================

/// Hasher used by every hash pool.
///
/// When the `fxhash` feature is enabled, this is `rustc_hash::FxBuildHasher`.
/// When only the `ahash` feature is enabled, this is `ahash::RandomState`.
/// Otherwise it is the standard library's `RandomState`.
#[cfg(feature = "fxhash")]
pub(crate) type PoolHasher = rustc_hash::FxBuildHasher;

#[cfg(all(feature = "ahash", not(feature = "fxhash")))]
pub(crate) type PoolHasher = ahash::RandomState;

#[cfg(not(any(feature = "fxhash", feature = "ahash")))]
pub(crate) type PoolHasher = std::collections::hash_map::RandomState;

/// Hash map used for the value pools.
pub(crate) type PoolMap<K, V> = std::collections::HashMap<K, V, PoolHasher>;

/// Hash set used for the tombstone pool.
pub(crate) type PoolSet<K> = std::collections::HashSet<K, PoolHasher>;

pub(crate) fn pool_map<K, V>(capacity: usize) -> PoolMap<K, V> {
    PoolMap::with_capacity_and_hasher(capacity, PoolHasher::default())
}

pub(crate) fn pool_set<K>() -> PoolSet<K> {
    PoolSet::with_hasher(PoolHasher::default())
}

mod contract;
mod copyable;
mod error;
mod multimap;
mod overlay;
mod policy;
mod sorted;

pub use contract::DeltaMap;
pub use contract::TransactionalOverlay;
pub use copyable::Copyable;
pub use error::DeltaMapError;
pub use multimap::OrderedMultiMap;
pub use overlay::DeltaOverlay;
pub use overlay::ImmutableObjectDeltaMap;
pub use overlay::MutableObjectAwareDeltaMap;
pub use policy::CopiedValues;
pub use policy::SharedValues;
pub use policy::ValuePolicy;
pub use sorted::SortedDeltaMultiMap;

// =============================================================================
// Tests
// =============================================================================
