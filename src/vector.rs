//! SyncVec: a growable array behind a single mutex.

use core::cmp::Ordering;

use crate::error::{Error, Result};
use crate::lock::PoisonLock;

/// Smallest power of two that holds `n` elements (at least 1). Falls back to
/// `n` itself when the next power of two would overflow.
pub(crate) fn capacity_for(n: usize) -> usize {
    n.max(1).checked_next_power_of_two().unwrap_or(n)
}

/// Make room for `additional` more elements, doubling capacity to the next
/// power of two when the buffer is full. Leaves `v` untouched on failure.
pub(crate) fn grow_for<T>(v: &mut Vec<T>, additional: usize) -> Result<()> {
    let needed = v.len().saturating_add(additional);
    if needed > v.capacity() {
        let target = capacity_for(needed);
        v.try_reserve_exact(target - v.len())?;
    }
    Ok(())
}

/// A dynamic array safe to share between threads.
///
/// Every method locks the array for its duration. Reads hand out clones,
/// never references.
#[derive(Debug)]
pub struct SyncVec<T> {
    inner: PoisonLock<Vec<T>>,
}

impl<T> Default for SyncVec<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncVec<T> {
    pub fn new() -> Self {
        Self {
            inner: PoisonLock::new(Vec::new()),
        }
    }

    /// An empty array with room for at least `initial_capacity` elements,
    /// rounded up to a power of two.
    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        let mut v = Vec::new();
        v.try_reserve_exact(capacity_for(initial_capacity))?;
        Ok(Self {
            inner: PoisonLock::new(v),
        })
    }

    /// Run `f` with the array locked.
    pub(crate) fn with_lock<R>(&self, f: impl FnOnce(&mut Vec<T>) -> R) -> Result<R> {
        let mut guard = self.inner.acquire("vector", None)?;
        Ok(f(&mut guard))
    }

    pub fn len(&self) -> Result<usize> {
        self.with_lock(|v| v.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.with_lock(|v| v.is_empty())
    }

    pub fn capacity(&self) -> Result<usize> {
        self.with_lock(|v| v.capacity())
    }

    pub fn push(&self, value: T) -> Result<()> {
        self.with_lock(|v| {
            grow_for(v, 1)?;
            v.push(value);
            Ok(())
        })?
    }

    pub fn pop(&self) -> Result<Option<T>> {
        self.with_lock(|v| v.pop())
    }

    /// Insert at `index`, shifting later elements right. `index == len` appends.
    pub fn insert(&self, index: usize, value: T) -> Result<()> {
        self.with_lock(|v| {
            if index > v.len() {
                return Err(Error::OutOfBounds {
                    index,
                    len: v.len(),
                });
            }
            grow_for(v, 1)?;
            v.insert(index, value);
            Ok(())
        })?
    }

    /// Remove and return the element at `index`, shifting later elements left.
    pub fn remove(&self, index: usize) -> Result<T> {
        self.with_lock(|v| {
            if index >= v.len() {
                return Err(Error::OutOfBounds {
                    index,
                    len: v.len(),
                });
            }
            Ok(v.remove(index))
        })?
    }

    /// Replace the element at `index`, returning the previous one.
    pub fn set(&self, index: usize, value: T) -> Result<T> {
        self.with_lock(|v| {
            let len = v.len();
            v.get_mut(index)
                .map(|slot| core::mem::replace(slot, value))
                .ok_or(Error::OutOfBounds { index, len })
        })?
    }

    pub fn clear(&self) -> Result<()> {
        self.with_lock(|v| v.clear())
    }

    pub fn for_each(&self, mut f: impl FnMut(usize, &T)) -> Result<()> {
        self.with_lock(|v| {
            for (i, x) in v.iter().enumerate() {
                f(i, x);
            }
        })
    }

    pub fn sort_by(&self, compare: impl FnMut(&T, &T) -> Ordering) -> Result<()> {
        self.with_lock(|v| v.sort_by(compare))
    }

    /// Release spare capacity down to the next power of two above `len`.
    pub fn shrink(&self) -> Result<()> {
        self.with_lock(|v| v.shrink_to(capacity_for(v.len())))
    }
}

impl<T: Clone> SyncVec<T> {
    pub fn get(&self, index: usize) -> Result<Option<T>> {
        self.with_lock(|v| v.get(index).cloned())
    }

    pub fn last(&self) -> Result<Option<T>> {
        self.with_lock(|v| v.last().cloned())
    }

    /// Copy of the whole array.
    pub fn to_vec(&self) -> Result<Vec<T>> {
        self.with_lock(|v| v.clone())
    }
}
