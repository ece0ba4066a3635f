//! SyncQueue: growable FIFO ring buffer behind a single mutex.

use std::collections::VecDeque;

use crate::error::Result;
use crate::lock::PoisonLock;
use crate::vector::capacity_for;

#[derive(Debug)]
pub struct SyncQueue<T> {
    inner: PoisonLock<VecDeque<T>>,
}

impl<T> Default for SyncQueue<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncQueue<T> {
    pub fn new() -> Self {
        Self {
            inner: PoisonLock::new(VecDeque::new()),
        }
    }

    /// An empty queue with room for at least `initial_capacity` elements,
    /// rounded up to a power of two.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        let mut q = VecDeque::new();
        q.try_reserve_exact(capacity_for(initial_capacity))?;
        Ok(Self {
            inner: PoisonLock::new(q),
        })
    }

    /// Append at the back. A full buffer doubles before the element is
    /// stored; if that fails the queue is unchanged.
    pub fn push(&self, value: T) -> Result<()> {
        let mut q = self.inner.acquire("queue", None)?;
        if q.len() == q.capacity() {
            let target = capacity_for(q.len().saturating_add(1));
            let extra = target - q.len();
            q.try_reserve_exact(extra)?;
        }
        q.push_back(value);
        Ok(())
    }

    /// Take the oldest element.
    pub fn pop(&self) -> Result<Option<T>> {
        Ok(self.inner.acquire("queue", None)?.pop_front())
    }

    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.acquire("queue", None)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.inner.acquire("queue", None)?.is_empty())
    }

    pub fn capacity(&self) -> Result<usize> {
        Ok(self.inner.acquire("queue", None)?.capacity())
    }
}

impl<T: Clone> SyncQueue<T> {
    pub fn front(&self) -> Result<Option<T>> {
        Ok(self.inner.acquire("queue", None)?.front().cloned())
    }

    pub fn back(&self) -> Result<Option<T>> {
        Ok(self.inner.acquire("queue", None)?.back().cloned())
    }
}
