//! # delta-cache
//!
//! Transactional delta maps for ledger state caches.
//!
//! ## Overview
//!
//! A node keeps its committed state in long-lived *base* maps that many
//! callers read concurrently. Each unit of speculative work (validating a
//! candidate block, applying a transaction batch) rebases a cheap *overlay*
//! off the base, stages its mutations there, and either commits them back
//! or drops the overlay. This crate provides:
//!
//! - **`ImmutableObjectDeltaMap`**: delta map for values never mutated in place
//! - **`MutableObjectAwareDeltaMap`**: delta map for mutable values, copied on access
//! - **`SortedDeltaMultiMap`**: sorted one-to-many delta map with head range queries
//! - **`OrderedMultiMap`**: the concurrent sorted multimap under the sorted delta map
//!
//! ## Feature Flags
//!
//! - `fxhash`: hash the pools with `rustc-hash`
//! - `ahash`: hash the pools with `ahash`
//!
//! ## Example
//!
//! ```rust
//! use delta_cache::prelude::*;
//!
//! let mut base: ImmutableObjectDeltaMap<u64, u64> = ImmutableObjectDeltaMap::new();
//! base.put(7, 700).unwrap();
//! base.commit().unwrap();
//!
//! let mut first = base.rebase();
//! let mut second = base.rebase();
//! first.put(8, 800).unwrap();
//! second.remove(&7).unwrap();
//!
//! // Overlays rebased from the same base are isolated from each other.
//! assert!(!second.contains_key(&8));
//! assert!(first.contains_key(&7));
//! ```

#![forbid(unsafe_code)]
#![warn(missing_docs)]
#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![warn(clippy::nursery)]

/// Prelude module for convenient imports.
///
/// Re-exports every delta map type and contract.
///
/// # Usage
///
/// ```rust
/// use delta_cache::prelude::*;
/// ```
pub mod prelude {
    pub use crate::delta::*;
}

pub mod delta;
