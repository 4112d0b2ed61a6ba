//! String interning for identifiers

pub use lasso::Spur as Name;
use lasso::ThreadedRodeo;
use std::fmt;
use std::sync::Arc;

/// Thread-safe string interner shared by every crate that handles names.
///
/// The underlying rodeo is already safe for concurrent interning, so cloning
/// an `Interner` only bumps a reference count.
#[derive(Clone, Default)]
pub struct Interner {
    inner: Arc<ThreadedRodeo>,
}

impl Interner {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn intern(&self, text: &str) -> Name {
        self.inner.get_or_intern(text)
    }

    /// Look up a name without interning it
    pub fn get(&self, text: &str) -> Option<Name> {
        self.inner.get(text)
    }

    pub fn resolve(&self, name: &Name) -> &str {
        self.inner.resolve(name)
    }

    pub fn try_resolve(&self, name: &Name) -> Option<&str> {
        self.inner.try_resolve(name)
    }

    /// Number of distinct names interned so far
    pub fn len(&self) -> usize {
        self.inner.len()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.is_empty()
    }
}

impl fmt::Debug for Interner {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        formatter
            .debug_struct("Interner")
            .field("len", &self.len())
            .finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_intern_is_idempotent() {
        let interner = Interner::new();
        let first = interner.intern("value");
        let second = interner.clone().intern("value");
        assert_eq!(first, second);
        assert_eq!(interner.resolve(&first), "value");
        assert_eq!(interner.len(), 1);
    }

    #[test]
    fn test_get_does_not_intern() {
        let interner = Interner::new();
        assert!(interner.get("missing").is_none());
        assert!(interner.is_empty());
    }
}
