//! SyncString: an append-only text buffer behind a single mutex.

use core::fmt;

use crate::error::{Error, Result};
use crate::lock::PoisonLock;
use crate::vector::capacity_for;

#[derive(Debug)]
pub struct SyncString {
    inner: PoisonLock<String>,
}

impl Default for SyncString {
    fn default() -> Self {
        Self {
            inner: PoisonLock::new(String::new()),
        }
    }
}

impl SyncString {
    /// A buffer holding `text`, with capacity rounded to the next power of
    /// two strictly above its length.
    pub fn new(text: &str) -> Result<Self> {
        Self::build(text, capacity_for(text.len().saturating_add(1)))
    }

    /// A buffer holding `text` with an explicit capacity, which must exceed
    /// the text's length.
    pub fn with_capacity(text: &str, capacity: usize) -> Result<Self> {
        if capacity <= text.len() {
            return Err(Error::InvalidArgument(
                "capacity must exceed the initial text length",
            ));
        }
        Self::build(text, capacity)
    }

    fn build(text: &str, capacity: usize) -> Result<Self> {
        let mut s = String::new();
        s.try_reserve_exact(capacity)?;
        s.push_str(text);
        Ok(Self {
            inner: PoisonLock::new(s),
        })
    }

    /// Append `text`, doubling capacity when it would not fit.
    pub fn append(&self, text: &str) -> Result<()> {
        if text.is_empty() {
            return Ok(());
        }
        let mut s = self.inner.acquire("string", None)?;
        let needed = s.len().saturating_add(text.len());
        if needed > s.capacity() {
            let target = capacity_for(needed);
            let extra = target - s.len();
            s.try_reserve_exact(extra)?;
        }
        s.push_str(text);
        Ok(())
    }

    /// Length in bytes.
    pub fn len(&self) -> Result<usize> {
        Ok(self.inner.acquire("string", None)?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.inner.acquire("string", None)?.is_empty())
    }

    pub fn capacity(&self) -> Result<usize> {
        Ok(self.inner.acquire("string", None)?.capacity())
    }

    /// Owned copy of the current contents.
    pub fn snapshot(&self) -> Result<String> {
        Ok(self.inner.acquire("string", None)?.clone())
    }
}

impl fmt::Display for SyncString {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = self.inner.acquire("string", None).map_err(|_| fmt::Error)?;
        f.write_str(&s)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn new_reserves_above_length() {
        let s = SyncString::new("hello").unwrap();
        assert_eq!(s.len().unwrap(), 5);
        assert!(s.capacity().unwrap() >= 8);
        assert_eq!(s.to_string(), "hello");

        let empty = SyncString::new("").unwrap();
        assert!(empty.is_empty().unwrap());
        assert!(empty.capacity().unwrap() >= 1);
    }

    #[test]
    fn with_capacity_rejects_too_small() {
        assert!(matches!(
            SyncString::with_capacity("abc", 3),
            Err(Error::InvalidArgument(_))
        ));
        let s = SyncString::with_capacity("abc", 4).unwrap();
        assert_eq!(s.snapshot().unwrap(), "abc");
    }

    /// Invariant: appends grow the buffer and an empty append changes nothing.
    #[test]
    fn append_grows() {
        let s = SyncString::with_capacity("ab", 3).unwrap();
        s.append("").unwrap();
        assert_eq!(s.len().unwrap(), 2);
        s.append("cdefg").unwrap();
        assert_eq!(s.snapshot().unwrap(), "abcdefg");
        assert!(s.capacity().unwrap() >= 7);
    }

    /// Invariant: concurrent appends never interleave within one call.
    #[test]
    fn concurrent_appends_are_atomic() {
        let s = SyncString::new("").unwrap();
        std::thread::scope(|scope| {
            for c in ['x', 'y', 'z'] {
                let s = &s;
                scope.spawn(move || {
                    let chunk: String = std::iter::repeat(c).take(4).collect();
                    for _ in 0..50 {
                        s.append(&chunk).unwrap();
                    }
                });
            }
        });
        let text = s.snapshot().unwrap();
        assert_eq!(text.len(), 3 * 50 * 4);
        for chunk in text.as_bytes().chunks(4) {
            assert!(chunk.iter().all(|b| *b == chunk[0]));
        }
    }
}
