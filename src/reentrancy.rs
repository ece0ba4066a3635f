//! Debug-only reentrancy guard for striped locks.
//!
//! Detects a thread trying to lock a shard it already holds, which with a
//! non-reentrant `parking_lot::Mutex` would deadlock.
//! The holder's thread tag is recorded right after the lock is acquired and
//! cleared right before it is released. In release builds, this compiles to a
//! zero-cost no-op.

#[cfg(debug_assertions)]
use core::sync::atomic::{AtomicU64, Ordering};

/// Process-unique, nonzero tag for the calling thread.
#[cfg(debug_assertions)]
fn thread_tag() -> u64 {
    static NEXT: AtomicU64 = AtomicU64::new(1);
    std::thread_local! {
        static TAG: u64 = NEXT.fetch_add(1, Ordering::Relaxed);
    }
    TAG.with(|t| *t)
}

/// Per-lock owner tracker. Embed next to a mutex and bracket its critical
/// section with `check()` before locking and `enter()` after.
#[derive(Debug)]
pub(crate) struct DebugReentrancy {
    // 0 = unowned. Only the owning thread ever stores its own tag, so a
    // relaxed load equal to our tag can only be our own earlier write.
    #[cfg(debug_assertions)]
    owner: AtomicU64,
}

impl DebugReentrancy {
    pub(crate) const fn new() -> Self {
        Self {
            #[cfg(debug_assertions)]
            owner: AtomicU64::new(0),
        }
    }

    /// Call before blocking on the guarded lock. In debug builds, panics if the
    /// calling thread already holds it.
    #[inline]
    pub(crate) fn check(&self) {
        #[cfg(debug_assertions)]
        {
            assert!(
                self.owner.load(Ordering::Relaxed) != thread_tag(),
                "reentrancy detected: thread already holds this shard lock"
            );
        }
    }

    /// Mark the calling thread as holder. Only call with the lock held.
    #[inline]
    pub(crate) fn enter(&self) -> ReentrancyGuard<'_> {
        #[cfg(debug_assertions)]
        {
            self.owner.store(thread_tag(), Ordering::Relaxed);
            ReentrancyGuard { owner: self }
        }

        #[cfg(not(debug_assertions))]
        {
            ReentrancyGuard {
                _z: core::marker::PhantomData,
            }
        }
    }
}

impl Default for DebugReentrancy {
    fn default() -> Self {
        Self::new()
    }
}

/// RAII guard returned by `DebugReentrancy::enter`. Must be dropped before the
/// lock guard it accompanies.
pub(crate) struct ReentrancyGuard<'a> {
    #[cfg(debug_assertions)]
    owner: &'a DebugReentrancy,
    #[cfg(not(debug_assertions))]
    _z: core::marker::PhantomData<&'a ()>,
}

impl<'a> Drop for ReentrancyGuard<'a> {
    fn drop(&mut self) {
        #[cfg(debug_assertions)]
        {
            self.owner.owner.store(0, Ordering::Relaxed);
        }
    }
}
