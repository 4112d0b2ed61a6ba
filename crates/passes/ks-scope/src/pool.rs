//! Reusable lookup accumulators

use crate::invariant::invariant_violation;
use crate::result::LookupResult;
use parking_lot::Mutex;
use std::ops::{Deref, DerefMut};

/// Free list of cleared [`LookupResult`]s.
///
/// The lock is only taken when a guard is acquired or released, never while
/// the accumulator is in use.
#[derive(Debug)]
pub struct LookupResultPool {
    free: Mutex<Vec<LookupResult>>,
    retained: usize,
}

impl LookupResultPool {
    /// A pool keeping at most `retained` cleared results
    pub fn new(retained: usize) -> Self {
        Self {
            free: Mutex::new(Vec::with_capacity(retained)),
            retained,
        }
    }

    /// An exclusively owned, clear accumulator
    pub fn acquire(&self) -> PooledLookupResult<'_> {
        let result = self.free.lock().pop().unwrap_or_default();
        PooledLookupResult {
            pool: self,
            result: Some(result),
        }
    }

    /// Number of accumulators waiting for reuse
    pub fn available(&self) -> usize {
        self.free.lock().len()
    }

    fn give_back(&self, mut result: LookupResult) {
        result.clear();
        let mut free = self.free.lock();
        if free.len() < self.retained {
            free.push(result);
        }
    }
}

impl Default for LookupResultPool {
    fn default() -> Self {
        Self::new(64)
    }
}

/// Accumulator on loan from a [`LookupResultPool`].
///
/// Dropping the guard clears the accumulator and returns it to the pool.
#[derive(Debug)]
pub struct PooledLookupResult<'pool> {
    pool: &'pool LookupResultPool,
    result: Option<LookupResult>,
}

impl PooledLookupResult<'_> {
    /// Return the accumulator to the pool now
    pub fn release(self) {
        drop(self);
    }

    /// Keep the accumulator instead of returning it
    pub fn into_inner(mut self) -> LookupResult {
        self.result
            .take()
            .unwrap_or_else(|| invariant_violation("lookup result used after release"))
    }
}

impl Deref for PooledLookupResult<'_> {
    type Target = LookupResult;

    fn deref(&self) -> &LookupResult {
        self.result
            .as_ref()
            .unwrap_or_else(|| invariant_violation("lookup result used after release"))
    }
}

impl DerefMut for PooledLookupResult<'_> {
    fn deref_mut(&mut self) -> &mut LookupResult {
        self.result
            .as_mut()
            .unwrap_or_else(|| invariant_violation("lookup result used after release"))
    }
}

impl Drop for PooledLookupResult<'_> {
    fn drop(&mut self) {
        if let Some(result) = self.result.take() {
            self.pool.give_back(result);
        }
    }
}
