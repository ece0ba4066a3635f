//! Table geometry for `ShardedHashMap`.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};

/// Number of slots in the bucket table unless configured otherwise.
pub const DEFAULT_SLOT_COUNT: usize = 1024;

/// Number of shard locks unless configured otherwise.
pub const DEFAULT_SHARD_COUNT: usize = 64;

/// Fixed geometry of a map: how many chained slots, and how many locks stripe them.
///
/// Both values are fixed for the lifetime of the map. `slot_count` must be a
/// multiple of `shard_count` so that every key in a slot maps to the same shard.
#[derive(Copy, Clone, Debug, Eq, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MapConfig {
    pub slot_count: usize,
    pub shard_count: usize,
}

impl Default for MapConfig {
    fn default() -> Self {
        Self {
            slot_count: DEFAULT_SLOT_COUNT,
            shard_count: DEFAULT_SHARD_COUNT,
        }
    }
}

impl MapConfig {
    pub fn with_slot_count(mut self, slot_count: usize) -> Self {
        self.slot_count = slot_count;
        self
    }

    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    pub fn validate(&self) -> Result<()> {
        if self.slot_count == 0 {
            return Err(Error::InvalidArgument("slot_count must be nonzero"));
        }
        if self.shard_count == 0 {
            return Err(Error::InvalidArgument("shard_count must be nonzero"));
        }
        if self.slot_count % self.shard_count != 0 {
            return Err(Error::InvalidArgument(
                "slot_count must be a multiple of shard_count",
            ));
        }
        Ok(())
    }

    /// Slots owned by each shard.
    pub(crate) fn slots_per_shard(&self) -> usize {
        self.slot_count / self.shard_count
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_is_valid() {
        let c = MapConfig::default();
        assert_eq!(c.slot_count, 1024);
        assert_eq!(c.shard_count, 64);
        assert!(c.validate().is_ok());
        assert_eq!(c.slots_per_shard(), 16);
    }

    /// Invariant: zero sizes and misaligned shard counts are rejected.
    #[test]
    fn rejects_bad_geometry() {
        let zero_slots = MapConfig::default().with_slot_count(0);
        assert!(matches!(zero_slots.validate(), Err(Error::InvalidArgument(_))));

        let zero_shards = MapConfig::default().with_shard_count(0);
        assert!(matches!(zero_shards.validate(), Err(Error::InvalidArgument(_))));

        let unaligned = MapConfig::default().with_slot_count(100).with_shard_count(64);
        assert!(matches!(unaligned.validate(), Err(Error::InvalidArgument(_))));

        let single = MapConfig::default().with_slot_count(1).with_shard_count(1);
        assert!(single.validate().is_ok());
    }

    /// Missing fields fall back to the defaults when loading from JSON.
    #[test]
    fn partial_json_uses_defaults() {
        let c: MapConfig = serde_json::from_str(r#"{ "shard_count": 8 }"#).unwrap();
        assert_eq!(c.slot_count, DEFAULT_SLOT_COUNT);
        assert_eq!(c.shard_count, 8);
        assert!(c.validate().is_ok());
    }
}
