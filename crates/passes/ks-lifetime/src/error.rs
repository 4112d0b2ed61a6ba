//! Escape error types.

use crate::safe_context::SafeContext;
use thiserror::Error;

/// Result type for escape checks.
pub type EscapeResult<T> = Result<T, EscapeError>;

/// A value would outlive the scope it is allowed to reach.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum EscapeError {
    /// The value's scope is narrower than the destination's.
    #[error("value of scope {actual} cannot escape into scope {required}")]
    EscapesScope {
        /// Scope of the value
        actual: SafeContext,
        /// Scope of the destination
        required: SafeContext,
    },

    /// A reference to a local of the current member is returned.
    #[error("cannot return a reference of scope {actual} from the current member")]
    NotReturnable {
        /// Scope of the value
        actual: SafeContext,
    },
}
