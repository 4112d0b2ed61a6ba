//! Write-once fields of scope nodes

use once_cell::race::OnceBox;
use std::fmt;

/// A value computed on first use and never changed afterwards.
///
/// Concurrent first uses may each run the initializer; exactly one result is
/// published and every reader observes that one. Readers never block.
pub struct ComputeOnce<T> {
    cell: OnceBox<T>,
}

impl<T> ComputeOnce<T> {
    pub const fn new() -> Self {
        Self {
            cell: OnceBox::new(),
        }
    }

    /// The value, computing it with `init` if no value is published yet
    pub fn get_or_compute(&self, init: impl FnOnce() -> T) -> &T {
        self.cell.get_or_init(|| Box::new(init()))
    }

    pub fn get(&self) -> Option<&T> {
        self.cell.get()
    }

    pub fn is_computed(&self) -> bool {
        self.cell.get().is_some()
    }
}

impl<T> Default for ComputeOnce<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T: fmt::Debug> fmt::Debug for ComputeOnce<T> {
    fn fmt(&self, formatter: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.get() {
            Some(value) => formatter.debug_tuple("ComputeOnce").field(value).finish(),
            None => formatter.write_str("ComputeOnce(<pending>)"),
        }
    }
}
