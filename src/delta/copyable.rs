//! Values that can produce an independent duplicate of themselves.

/// A value that can be duplicated into a fully independent instance.
///
/// `copy` must return a value that shares no mutable state with `self`:
/// mutating the copy never changes the source. For plain data this is
/// usually `Clone::clone`; values holding shared handles (`Arc`, pooled
/// buffers) duplicate the pointee instead.
///
/// [`MutableObjectAwareDeltaMap`](super::MutableObjectAwareDeltaMap) relies on
/// this contract to hand out values that can be mutated without corrupting
/// the committed state shared with other overlays.
///
/// # Examples
///
/// ```rust
/// use delta_cache::delta::Copyable;
///
/// #[derive(Debug, PartialEq)]
/// struct Balance(u64);
///
/// impl Copyable for Balance {
///     fn copy(&self) -> Self {
///         Self(self.0)
///     }
/// }
///
/// let original = Balance(10);
/// let mut copy = original.copy();
/// copy.0 += 5;
/// assert_eq!(original, Balance(10));
/// assert_eq!(copy, Balance(15));
/// ```
pub trait Copyable {
    /// Returns an independent duplicate of this value.
    #[must_use]
    fn copy(&self) -> Self;
}

impl<T: Copyable> Copyable for Box<T> {
    fn copy(&self) -> Self {
        Self::new(T::copy(self))
    }
}

impl<T: Copyable> Copyable for Option<T> {
    fn copy(&self) -> Self {
        self.as_ref().map(Copyable::copy)
    }
}

impl<T: Copyable> Copyable for Vec<T> {
    fn copy(&self) -> Self {
        self.iter().map(Copyable::copy).collect()
    }
}
