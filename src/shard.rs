//! Striped lock array guarding the shards of a `ShardedHashMap`.
//!
//! Locking protocol:
//! - Per-key operations take exactly one shard lock for their whole critical
//!   section.
//! - Table-wide operations (`freeze`) take every shard lock in ascending index
//!   order and release them in reverse. This fixed order is the only thing
//!   keeping two concurrent freezes from deadlocking; nothing else in the
//!   crate ever holds two shard locks at once.
//! - A shard whose holder panicked is poisoned; every later operation that
//!   needs it fails with `Error::Poisoned` and is never retried.

use core::ops::{Deref, DerefMut};
use crossbeam_utils::CachePadded;

use crate::chain::{Retired, Shard};
use crate::config::MapConfig;
use crate::error::Result;
use crate::lock::{PoisonGuard, PoisonLock};
use crate::reentrancy::{DebugReentrancy, ReentrancyGuard};

struct Stripe<K, V> {
    lock: PoisonLock<Shard<K, V>>,
    reentrancy: DebugReentrancy,
}

pub(crate) struct StripedShards<K, V> {
    stripes: Vec<CachePadded<Stripe<K, V>>>,
}

/// Exclusive access to one shard. Field order matters: the reentrancy marker
/// is cleared before the mutex is released.
pub(crate) struct ShardGuard<'a, K, V> {
    _reentrancy: ReentrancyGuard<'a>,
    guard: PoisonGuard<'a, Shard<K, V>>,
}

impl<'a, K, V> Deref for ShardGuard<'a, K, V> {
    type Target = Shard<K, V>;
    fn deref(&self) -> &Self::Target {
        &self.guard
    }
}

impl<'a, K, V> DerefMut for ShardGuard<'a, K, V> {
    fn deref_mut(&mut self) -> &mut Self::Target {
        &mut self.guard
    }
}

/// Every shard locked at once, acquired in ascending index order.
pub(crate) struct TableFreeze<'a, K, V> {
    guards: Vec<ShardGuard<'a, K, V>>,
}

impl<'a, K, V> TableFreeze<'a, K, V> {
    /// Exact live-entry count; nothing can change while the freeze is held.
    pub(crate) fn len(&self) -> usize {
        self.guards.iter().map(|g| g.len()).sum()
    }

    pub(crate) fn for_each(&self, f: &mut impl FnMut(&K, &V)) {
        for g in &self.guards {
            g.for_each(&mut *f);
        }
    }

    #[cfg(test)]
    pub(crate) fn shard(&self, index: usize) -> &Shard<K, V> {
        &self.guards[index]
    }

    /// Detach every entry from every shard.
    pub(crate) fn take_all(&mut self) -> Vec<Retired<K, V>> {
        self.guards.iter_mut().map(|g| g.take_all()).collect()
    }
}

impl<'a, K, V> Drop for TableFreeze<'a, K, V> {
    fn drop(&mut self) {
        // Release in reverse acquisition order.
        while let Some(g) = self.guards.pop() {
            drop(g);
        }
    }
}

impl<K, V> StripedShards<K, V> {
    /// Build `config.shard_count` shards, each owning its share of the slots.
    /// Either every shard is built or nothing is kept.
    pub(crate) fn new(config: &MapConfig) -> Result<Self> {
        let mut stripes = Vec::new();
        stripes.try_reserve_exact(config.shard_count)?;
        for _ in 0..config.shard_count {
            let shard = Shard::with_slots(config.slots_per_shard())?;
            stripes.push(CachePadded::new(Stripe {
                lock: PoisonLock::new(shard),
                reentrancy: DebugReentrancy::new(),
            }));
        }
        Ok(Self { stripes })
    }

    pub(crate) fn count(&self) -> usize {
        self.stripes.len()
    }

    pub(crate) fn lock(&self, index: usize) -> Result<ShardGuard<'_, K, V>> {
        let stripe = &self.stripes[index];
        stripe.reentrancy.check();
        let guard = stripe.lock.acquire("sharded map", Some(index))?;
        Ok(ShardGuard {
            _reentrancy: stripe.reentrancy.enter(),
            guard,
        })
    }

    /// Lock every shard, lowest index first. On failure the locks taken so far
    /// are released before the error is returned.
    pub(crate) fn freeze(&self) -> Result<TableFreeze<'_, K, V>> {
        let mut guards = Vec::new();
        guards.try_reserve_exact(self.stripes.len())?;
        for index in 0..self.stripes.len() {
            guards.push(self.lock(index)?);
        }
        Ok(TableFreeze { guards })
    }
}
