//! striped-collections: thread-safe collections built around a lock-striped,
//! separately chained hash map.
//!
//! Internal Design:
//!
//! Summary
//! - Goal: a hash map many threads can use at once, with contention limited
//!   to keys that share a lock stripe, plus a few simple mutex-guarded
//!   containers for the same programs.
//! - Layers:
//!   - `chain::Shard<K, V>`: one shard's slot cells and the arena holding its
//!     overflow chain nodes. Pure data structure; knows nothing of locks.
//!   - `shard::StripedShards<K, V>`: the fixed array of cache-padded mutexes,
//!     one per shard, with a debug-only reentrancy guard and the
//!     lock-everything `TableFreeze`.
//!   - `ShardedHashMap<K, V, S>`: public API. Hashes the key, picks the
//!     shard, takes its lock, and delegates to the shard.
//!
//! Geometry
//! - `slot_count` and `shard_count` are fixed at construction and
//!   `slot_count` must be a multiple of `shard_count`. Slot `i` belongs to
//!   shard `i % shard_count` at local index `i / shard_count`, so every
//!   shard owns the same number of slots.
//! - The table never resizes.
//!
//! Chains
//! - A slot cell holds the chain head inline; further entries live in the
//!   shard's slotmap arena and are linked by generational keys.
//! - New keys are spliced in directly after the head. Removing a head with a
//!   successor moves the successor into the cell.
//!
//! Locking
//! - Per-key operations hold exactly one shard lock.
//! - `len`, `for_each` and `clear` lock every shard in ascending order and
//!   release in reverse, so concurrent table-wide operations cannot
//!   deadlock. `len` is therefore exact, at the cost of briefly stalling
//!   writers.
//! - User code (`Hash`, `Eq`, `Clone`) runs under a shard lock. `Drop` of
//!   replaced or removed entries runs after the lock is released.
//! - Calling back into the map from inside `for_each` (or from `Hash`/`Eq`
//!   while a lock is held) is a bug; debug builds panic instead of
//!   deadlocking.
//! - Locks are `parking_lot` mutexes wrapped in `lock::PoisonLock`, which
//!   records a panic while held. User code only panics during read-only
//!   chain walks, so a shard is never left half-linked, but later operations
//!   touching it still return `Error::Poisoned` rather than carry on.
//! - Growing a chain reserves arena space before linking, so a failed
//!   allocation returns `Error::Alloc` with the shard unchanged.
//!
//! Reads
//! - `get` returns an owned `Bucket` copy. No reference into the table ever
//!   escapes a lock.
//!
//! Containers
//! - `SyncVec`, `SyncStack`, `SyncQueue` and `SyncString` guard a single
//!   std collection with one `PoisonLock` each. Growth rounds capacity up to a
//!   power of two and reserves fallibly, so allocation failure surfaces as
//!   `Error::Alloc` with the container unchanged.

mod bucket;
mod chain;
pub mod config;
mod error;
mod lock;
mod queue;
mod reentrancy;
mod shard;
mod sharded_map;
mod sharded_map_proptest;
mod stack;
mod string;
mod vector;

// Public surface
pub use bucket::Bucket;
pub use config::MapConfig;
pub use error::{Error, Result};
pub use queue::SyncQueue;
pub use sharded_map::{SetOutcome, ShardedHashMap};
pub use stack::SyncStack;
pub use string::SyncString;
pub use vector::SyncVec;
