//! Crate-wide error type.

use std::collections::TryReserveError;

pub type Result<T, E = Error> = core::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// An argument or configuration value was rejected before any state changed.
    #[error("invalid argument: {0}")]
    InvalidArgument(&'static str),

    /// A fallible reservation failed; the collection is left as it was.
    #[error("allocation failed: {0}")]
    Alloc(#[from] TryReserveError),

    /// A lock could not be acquired because a previous holder panicked.
    #[error("lock poisoned by a panicking holder")]
    Poisoned,

    #[error("index {index} out of bounds for length {len}")]
    OutOfBounds { index: usize, len: usize },
}

impl Error {
    pub fn is_poisoned(&self) -> bool {
        matches!(self, Error::Poisoned)
    }
}
