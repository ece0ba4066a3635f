//! SyncStack: LIFO stack on top of `SyncVec`.

use crate::error::Result;
use crate::vector::SyncVec;

#[derive(Debug)]
pub struct SyncStack<T> {
    items: SyncVec<T>,
}

impl<T> Default for SyncStack<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> SyncStack<T> {
    pub fn new() -> Self {
        Self {
            items: SyncVec::new(),
        }
    }

    pub fn with_capacity(initial_capacity: usize) -> Result<Self> {
        Ok(Self {
            items: SyncVec::with_capacity(initial_capacity)?,
        })
    }

    pub fn push(&self, value: T) -> Result<()> {
        self.items.push(value)
    }

    pub fn pop(&self) -> Result<Option<T>> {
        self.items.pop()
    }

    pub fn len(&self) -> Result<usize> {
        self.items.len()
    }

    pub fn is_empty(&self) -> Result<bool> {
        self.items.is_empty()
    }
}

impl<T: Clone> SyncStack<T> {
    /// Copy of the most recently pushed element.
    pub fn top(&self) -> Result<Option<T>> {
        self.items.last()
    }
}
