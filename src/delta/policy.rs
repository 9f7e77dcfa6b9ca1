//! Value policies for [`DeltaOverlay`](super::DeltaOverlay).
//!
//! A policy decides how values stored in a delta map are duplicated and
//! whether reads through a writable overlay copy committed values on access.

use super::Copyable;

/// How a [`DeltaOverlay`](super::DeltaOverlay) treats its values.
pub trait ValuePolicy<V> {
    /// Whether instances created directly (not through `rebase`) reject writes.
    const READ_ONLY_BASE: bool;

    /// Whether reading a committed value through a writable overlay first
    /// duplicates it into the overlay's `copied` pool.
    const COPY_ON_ACCESS: bool;

    /// Returns an owned duplicate of `value`.
    fn duplicate(value: &V) -> V;
}

/// Policy for values that are never mutated in place once stored.
///
/// Values are duplicated with `Clone`; wrap large values in `Arc` to keep
/// duplication cheap.
#[derive(Debug)]
pub enum SharedValues {}

impl<V: Clone> ValuePolicy<V> for SharedValues {
    const READ_ONLY_BASE: bool = false;
    const COPY_ON_ACCESS: bool = false;

    fn duplicate(value: &V) -> V {
        value.clone()
    }
}

/// Policy for mutable values that must be duplicated before a caller may
/// mutate them.
#[derive(Debug)]
pub enum CopiedValues {}

impl<V: Copyable> ValuePolicy<V> for CopiedValues {
    const READ_ONLY_BASE: bool = true;
    const COPY_ON_ACCESS: bool = true;

    fn duplicate(value: &V) -> V {
        value.copy()
    }
}
