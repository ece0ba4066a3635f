//! ShardedHashMap: separately chained hash table behind a striped lock array.

use core::borrow::Borrow;
use core::hash::{BuildHasher, Hash};
use hashbrown::hash_map::DefaultHashBuilder;
use tracing::debug;

use crate::bucket::Bucket;
use crate::config::MapConfig;
use crate::error::Result;
use crate::shard::StripedShards;

/// What `set` did with the key.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum SetOutcome {
    /// The key was new; the live count grew by one.
    Inserted,
    /// The key existed; its value was replaced and the count is unchanged.
    Updated,
}

/// A concurrent hash map with a fixed bucket table and a fixed array of shard
/// locks.
///
/// Keys land in slot `hash % slot_count`; the slot belongs to shard
/// `slot % shard_count`, whose mutex serializes every operation on keys in
/// that shard. Colliding keys form a chain hanging off the slot.
///
/// All methods take `&self`; share the map between threads with `Arc`.
/// Reads copy out: `get` returns an owned [`Bucket`] and never a reference
/// into the table.
pub struct ShardedHashMap<K, V, S = DefaultHashBuilder> {
    hasher: S,
    config: MapConfig,
    shards: StripedShards<K, V>,
}

impl<K, V> ShardedHashMap<K, V>
where
    K: Eq + Hash,
{
    /// A map with the default geometry (1024 slots, 64 shards).
    ///
    /// # Panics
    /// If the slot table cannot be allocated; use
    /// [`ShardedHashMap::with_config`] to get `Error::Alloc` instead.
    pub fn new() -> Self {
        Self::with_hasher(Default::default())
    }
}

impl<K, V> Default for ShardedHashMap<K, V>
where
    K: Eq + Hash,
{
    fn default() -> Self {
        Self::new()
    }
}

impl<K, V, S> ShardedHashMap<K, V, S>
where
    K: Eq + Hash,
    S: BuildHasher,
{
    /// A map with the default geometry and a caller-supplied hasher.
    ///
    /// # Panics
    /// If the slot table cannot be allocated. [`ShardedHashMap::with_config`]
    /// is the fallible constructor and reports that as `Error::Alloc`.
    pub fn with_hasher(hasher: S) -> Self {
        Self::with_config(MapConfig::default(), hasher)
            .expect("default geometry is valid and allocation succeeded")
    }

    /// A map with explicit geometry. Fails without side effects if the
    /// geometry is invalid or the table cannot be allocated.
    pub fn with_config(config: MapConfig, hasher: S) -> Result<Self> {
        config.validate()?;
        let shards = StripedShards::new(&config)?;
        debug!(
            slots = config.slot_count,
            shards = config.shard_count,
            "sharded map created"
        );
        Ok(Self {
            hasher,
            config,
            shards,
        })
    }

    pub fn config(&self) -> &MapConfig {
        &self.config
    }

    pub fn hasher(&self) -> &S {
        &self.hasher
    }

    /// Returns (shard index, slot index local to that shard).
    fn locate<Q>(&self, q: &Q) -> (usize, usize)
    where
        Q: ?Sized + Hash,
    {
        let hash = self.hasher.hash_one(q);
        let slot = (hash % self.config.slot_count as u64) as usize;
        (
            slot % self.config.shard_count,
            slot / self.config.shard_count,
        )
    }

    /// Index of the shard lock that guards `q`.
    pub fn shard_of<Q>(&self, q: &Q) -> usize
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash,
    {
        self.locate(q).0
    }

    /// Insert `key` or replace its value.
    ///
    /// The replaced value is dropped after the shard lock is released. If a
    /// new chain node cannot be allocated, returns `Error::Alloc` and the map
    /// is unchanged.
    pub fn set(&self, key: K, value: V) -> Result<SetOutcome> {
        let (shard, slot) = self.locate(&key);
        let replaced = self.shards.lock(shard)?.set(slot, key, value)?;
        Ok(match replaced {
            Some(_) => SetOutcome::Updated,
            None => SetOutcome::Inserted,
        })
    }

    /// Copy out the entry for `q`, if present.
    pub fn get<Q>(&self, q: &Q) -> Result<Option<Bucket<K, V>>>
    where
        K: Borrow<Q> + Clone,
        V: Clone,
        Q: ?Sized + Hash + Eq,
    {
        let (shard, slot) = self.locate(q);
        let guard = self.shards.lock(shard)?;
        let copy = guard.get(slot, q).map(Bucket::copy_of);
        drop(guard);
        Ok(copy)
    }

    pub fn contains<Q>(&self, q: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (shard, slot) = self.locate(q);
        Ok(self.shards.lock(shard)?.get(slot, q).is_some())
    }

    /// Remove the entry for `q`. Returns whether one was found.
    ///
    /// The removed key and value are dropped after the shard lock is released.
    pub fn remove<Q>(&self, q: &Q) -> Result<bool>
    where
        K: Borrow<Q>,
        Q: ?Sized + Hash + Eq,
    {
        let (shard, slot) = self.locate(q);
        let removed = self.shards.lock(shard)?.remove(slot, q);
        Ok(removed.is_some())
    }

    /// Exact number of live entries, read with the whole table frozen.
    pub fn len(&self) -> Result<usize> {
        Ok(self.shards.freeze()?.len())
    }

    pub fn is_empty(&self) -> Result<bool> {
        Ok(self.len()? == 0)
    }

    /// Visit every entry with the whole table frozen.
    ///
    /// `f` must not call back into this map; debug builds panic if it does.
    pub fn for_each<F>(&self, mut f: F) -> Result<()>
    where
        F: FnMut(&K, &V),
    {
        self.shards.freeze()?.for_each(&mut f);
        Ok(())
    }

    /// Remove every entry. Keys and values are dropped after all shard locks
    /// are released.
    pub fn clear(&self) -> Result<()> {
        let retired = {
            let mut freeze = self.shards.freeze()?;
            freeze.take_all()
        };
        debug!(
            entries = retired.iter().map(|r| r.len()).sum::<usize>(),
            shards = self.shards.count(),
            "sharded map cleared"
        );
        drop(retired);
        Ok(())
    }

    /// Check structural invariants with the table frozen: every stored key
    /// hashes to the shard and slot holding it, and per-shard counters match
    /// the number of reachable entries.
    #[cfg(test)]
    pub(crate) fn assert_invariants(&self) {
        let freeze = self.shards.freeze().expect("no poisoned shards in tests");
        for shard_idx in 0..self.shards.count() {
            let shard = freeze.shard(shard_idx);
            let mut reachable = 0;
            for slot in 0..shard.slot_count() {
                for key in shard.keys_in(slot) {
                    assert_eq!(self.locate(key), (shard_idx, slot));
                    reachable += 1;
                }
            }
            assert_eq!(reachable, shard.len());
        }
    }
}
