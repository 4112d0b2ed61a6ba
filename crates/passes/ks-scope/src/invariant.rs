//! Fatal internal invariant violations

/// Abort on a state that correct callers can never produce.
#[cold]
#[track_caller]
#[allow(clippy::panic, reason = "broken scope invariants are compiler bugs, not user errors")]
pub(crate) fn invariant_violation(message: &str) -> ! {
    panic!("scope invariant violated: {message}")
}
