//! `parking_lot` mutex with a poison flag.
//!
//! `parking_lot` locks never poison, so a holder that panics leaves nothing
//! behind for later callers to see. This wrapper records the panic and makes
//! every later acquisition fail with `Error::Poisoned`, so a collection whose
//! user code blew up mid-operation reports it instead of carrying on.

use core::ops::{Deref, DerefMut};
use core::sync::atomic::{AtomicBool, Ordering};
use parking_lot::{Mutex, MutexGuard};
use tracing::warn;

use crate::error::{Error, Result};

#[derive(Debug)]
pub(crate) struct PoisonLock<T> {
    inner: Mutex<T>,
    poisoned: AtomicBool,
}

/// Held lock. Marks the lock poisoned if dropped by a panic that started
/// while it was held.
#[derive(Debug)]
pub(crate) struct PoisonGuard<'a, T> {
    guard: MutexGuard<'a, T>,
    poisoned: &'a AtomicBool,
    panicking_on_entry: bool,
}

impl<T> PoisonLock<T> {
    pub(crate) fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
            poisoned: AtomicBool::new(false),
        }
    }

    pub(crate) fn is_poisoned(&self) -> bool {
        self.poisoned.load(Ordering::Acquire)
    }

    /// Lock, or fail with `Error::Poisoned` if an earlier holder panicked.
    /// `what` and `shard` only label the warning.
    pub(crate) fn acquire(
        &self,
        what: &'static str,
        shard: Option<usize>,
    ) -> Result<PoisonGuard<'_, T>> {
        let guard = self.inner.lock();
        if self.is_poisoned() {
            drop(guard);
            warn!(container = what, shard = ?shard, "lock poisoned by a panicking holder");
            return Err(Error::Poisoned);
        }
        Ok(PoisonGuard {
            guard,
            poisoned: &self.poisoned,
            panicking_on_entry: std::thread::panicking(),
        })
    }
}

impl<'a, T> Drop for PoisonGuard<'a, T> {
    fn drop(&mut self) {
        if !self.panicking_on_entry && std::thread::panicking() {
            self.poisoned.store(true, Ordering::Release);
        }
    }
}

impl<'a, T> Deref for PoisonGuard<'a, T> {
    type Target = T;
    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<'a, T> DerefMut for PoisonGuard<'a, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
