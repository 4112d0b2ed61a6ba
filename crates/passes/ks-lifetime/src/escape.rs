//! Escape checks over pairs of scopes.

use crate::error::{EscapeError, EscapeResult};
use crate::safe_context::SafeContext;

/// Check that a value of scope `value` may flow into a location of scope `target`.
///
/// # Errors
///
/// Returns [`EscapeError::NotReturnable`] when `target` is returnable and the
/// value is confined to the member, and [`EscapeError::EscapesScope`] for any
/// other narrowing flow.
pub fn check_escape(value: SafeContext, target: SafeContext) -> EscapeResult<()> {
    if value.is_convertible_to(target) {
        return Ok(());
    }
    if target.is_returnable() {
        return Err(EscapeError::NotReturnable { actual: value });
    }
    Err(EscapeError::EscapesScope {
        actual: value,
        required: target,
    })
}

/// The two escape scopes tracked for a ref-like expression.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct EscapeValues {
    /// How far a reference to the storage may escape
    pub ref_safe_to_escape: SafeContext,
    /// How far the value itself may escape
    pub safe_to_escape: SafeContext,
}

impl EscapeValues {
    #[must_use]
    pub const fn new(ref_safe_to_escape: SafeContext, safe_to_escape: SafeContext) -> Self {
        Self {
            ref_safe_to_escape,
            safe_to_escape,
        }
    }

    /// Values for a local declared at `scope`: its storage is confined to
    /// `scope`, its contents escape anywhere.
    #[must_use]
    pub const fn local(scope: SafeContext) -> Self {
        Self::new(scope, SafeContext::CALLING_METHOD)
    }

    /// Narrowest combination of two operands, as for a conditional expression.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        Self::new(
            self.ref_safe_to_escape.intersect(other.ref_safe_to_escape),
            self.safe_to_escape.intersect(other.safe_to_escape),
        )
    }

    /// Check a ref assignment into a location of scope `target`.
    ///
    /// # Errors
    ///
    /// Fails when either scope cannot escape into `target`.
    pub fn check_ref_assignment(self, target: SafeContext) -> EscapeResult<()> {
        check_escape(self.ref_safe_to_escape, target)?;
        check_escape(self.safe_to_escape, target)
    }
}
