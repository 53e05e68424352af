//! The shared counter and its lock.

use std::sync::Mutex;

use crate::error::TallyError;

/// A counter that may only be read or modified while its lock is held.
/// Lock poisoning surfaces as [`TallyError::LockPoisoned`] instead of a
/// panic, so the caller decides whether to abort.
#[derive(Debug, Default)]
pub struct SharedCounter {
    count: Mutex<u64>,
}

impl SharedCounter {
    pub fn new() -> Self {
        SharedCounter {
            count: Mutex::new(0),
        }
    }

    /// Run `f` with exclusive access to the count. The guard is held for
    /// the whole closure, so read-modify-write sequences stay atomic.
    pub fn with_lock<T>(&self, f: impl FnOnce(&mut u64) -> T) -> Result<T, TallyError> {
        let mut count = self.count.lock().map_err(|_| TallyError::LockPoisoned)?;
        Ok(f(&mut count))
    }

    /// Add one and return the new value.
    pub fn increment(&self) -> Result<u64, TallyError> {
        self.with_lock(|count| {
            *count += 1;
            *count
        })
    }

    pub fn value(&self) -> Result<u64, TallyError> {
        self.with_lock(|count| *count)
    }
}
