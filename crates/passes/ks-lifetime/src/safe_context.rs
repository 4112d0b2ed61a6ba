//! The `SafeContext` value type.

use std::fmt;

/// Escape scope of a value, as an unsigned depth.
///
/// Values are never mutated; [`narrower`](Self::narrower) and
/// [`wider`](Self::wider) produce new values.
#[derive(Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SafeContext(u32);

/// Alternative name used by callers that think in terms of lifetimes.
pub type Lifetime = SafeContext;

impl SafeContext {
    /// Escapes to any caller.
    pub const CALLING_METHOD: Self = Self(0);

    /// Escapes the current member only through its return value.
    pub const RETURN_ONLY: Self = Self(1);

    /// Confined to the current member body.
    pub const CURRENT_METHOD: Self = Self(2);

    /// Narrower than every other value. Never produced by `narrower` or `wider`.
    pub const EMPTY: Self = Self(u32::MAX);

    /// Build a value from a raw depth.
    ///
    /// # Panics
    ///
    /// Panics if `depth` is the reserved `EMPTY` depth.
    #[must_use]
    pub const fn from_depth(depth: u32) -> Self {
        assert!(depth != u32::MAX, "depth is reserved for SafeContext::EMPTY");
        Self(depth)
    }

    #[must_use]
    pub const fn depth(self) -> u32 {
        self.0
    }

    #[must_use]
    pub const fn is_empty(self) -> bool {
        self.0 == u32::MAX
    }

    /// Whether the value denotes a scope outside the current member.
    #[must_use]
    pub const fn is_returnable(self) -> bool {
        self.0 <= Self::RETURN_ONLY.0
    }

    /// One nested scope deeper.
    ///
    /// # Panics
    ///
    /// Panics when called on `EMPTY`, or when the result would collide with it.
    #[must_use]
    #[allow(clippy::panic, reason = "EMPTY has no narrower value")]
    pub const fn narrower(self) -> Self {
        if self.0 >= u32::MAX - 1 {
            panic!("SafeContext::EMPTY has no narrower value");
        }
        Self(self.0 + 1)
    }

    /// One nested scope shallower.
    ///
    /// # Panics
    ///
    /// Panics when called on `EMPTY` or `CALLING_METHOD`.
    #[must_use]
    #[allow(clippy::panic, reason = "CALLING_METHOD is the widest value")]
    pub const fn wider(self) -> Self {
        if self.0 == 0 || self.0 == u32::MAX {
            panic!("SafeContext has no wider value");
        }
        Self(self.0 - 1)
    }

    /// The narrower of two values.
    #[must_use]
    pub fn intersect(self, other: Self) -> Self {
        self.max(other)
    }

    /// The wider of two values.
    #[must_use]
    pub fn union(self, other: Self) -> Self {
        self.min(other)
    }

    /// A value of this scope may be stored into a location of scope `target`.
    #[must_use]
    pub const fn is_convertible_to(self, target: Self) -> bool {
        self.0 <= target.0
    }
}

impl Default for SafeContext {
    fn default() -> Self {
        Self::CALLING_METHOD
    }
}

impl fmt::Debug for SafeContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            Self::CALLING_METHOD => formatter.write_str("CallingMethod"),
            Self::RETURN_ONLY => formatter.write_str("ReturnOnly"),
            Self::CURRENT_METHOD => formatter.write_str("CurrentMethod"),
            Self::EMPTY => formatter.write_str("Empty"),
            Self(depth) => write!(formatter, "Local({depth})"),
        }
    }
}

impl fmt::Display for SafeContext {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, formatter)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_narrower_then_wider_round_trips() {
        for depth in [0, 1, 2, 7, 100] {
            let value = SafeContext::from_depth(depth);
            assert_eq!(value.narrower().wider(), value);
        }
    }

    #[test]
    fn test_calling_method_two_steps_is_current_method() {
        assert_eq!(
            SafeContext::CALLING_METHOD.narrower().narrower(),
            SafeContext::CURRENT_METHOD
        );
        assert_eq!(SafeContext::RETURN_ONLY.narrower(), SafeContext::CURRENT_METHOD);
    }

    #[test]
    fn test_convertibility_is_reflexive_and_transitive() {
        let values = [0, 1, 2, 3, 9].map(SafeContext::from_depth);
        for &first in &values {
            assert!(first.is_convertible_to(first));
            for &second in &values {
                for &third in &values {
                    if first.is_convertible_to(second) && second.is_convertible_to(third) {
                        assert!(first.is_convertible_to(third));
                    }
                }
            }
        }
    }

    #[test]
    fn test_calling_method_converts_to_everything() {
        for depth in [0, 1, 2, 40] {
            assert!(SafeContext::CALLING_METHOD.is_convertible_to(SafeContext::from_depth(depth)));
        }
        assert!(SafeContext::CALLING_METHOD.is_convertible_to(SafeContext::EMPTY));
    }

    #[test]
    fn test_intersect_and_union() {
        let outer = SafeContext::CURRENT_METHOD;
        let inner = outer.narrower();
        assert_eq!(outer.intersect(inner), inner);
        assert_eq!(outer.union(inner), outer);
        assert_eq!(inner.intersect(SafeContext::EMPTY), SafeContext::EMPTY);
        assert_eq!(inner.union(SafeContext::EMPTY), inner);
    }

    #[test]
    fn test_returnable() {
        assert!(SafeContext::CALLING_METHOD.is_returnable());
        assert!(SafeContext::RETURN_ONLY.is_returnable());
        assert!(!SafeContext::CURRENT_METHOD.is_returnable());
    }

    #[test]
    #[should_panic(expected = "no narrower value")]
    fn test_empty_has_no_narrower() {
        let _ = SafeContext::EMPTY.narrower();
    }

    #[test]
    #[should_panic(expected = "no wider value")]
    fn test_calling_method_has_no_wider() {
        let _ = SafeContext::CALLING_METHOD.wider();
    }
}
