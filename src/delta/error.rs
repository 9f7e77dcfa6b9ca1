//! Error types for delta maps.

use thiserror::Error;

/// Errors raised by delta map operations.
///
/// The only failure a delta map knows is a write against a read-only base
/// instance. It signals a programming error in the caller: the operation is
/// rejected and nothing is changed.
///
/// # Examples
///
/// ```rust
/// use delta_cache::delta::DeltaMapError;
///
/// let error = DeltaMapError::ReadOnly { operation: "put" };
/// assert_eq!(
///     error.to_string(),
///     "put called on a read-only delta map; rebase it to obtain a writable overlay"
/// );
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum DeltaMapError {
    /// A mutating operation was invoked on a read-only base instance.
    #[error("{operation} called on a read-only delta map; rebase it to obtain a writable overlay")]
    ReadOnly {
        /// Name of the rejected operation.
        operation: &'static str,
    },
}
