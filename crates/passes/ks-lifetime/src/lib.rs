//! Escape-scope lattice for ref-like values.
//!
//! A [`SafeContext`] records how far a reference (or a value containing
//! references) may travel. Smaller depths are wider scopes:
//!
//! - [`SafeContext::CALLING_METHOD`] may escape to any caller
//! - [`SafeContext::RETURN_ONLY`] may leave the current member only through
//!   its return value
//! - [`SafeContext::CURRENT_METHOD`] is confined to the current member body
//! - each nested local scope is one deeper
//!
//! # Examples
//!
//! ```rust
//! use ks_lifetime::SafeContext;
//!
//! let block = SafeContext::CURRENT_METHOD.narrower();
//! assert!(SafeContext::CURRENT_METHOD.is_convertible_to(block));
//! assert!(!block.is_convertible_to(SafeContext::CURRENT_METHOD));
//! ```

mod error;
mod escape;
mod safe_context;

pub use error::{EscapeError, EscapeResult};
pub use escape::{EscapeValues, check_escape};
pub use safe_context::{Lifetime, SafeContext};
