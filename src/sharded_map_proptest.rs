#![cfg(test)]

// Property tests for ShardedHashMap kept inside the crate so they can check
// structural invariants that are not part of the public surface.

use crate::config::MapConfig;
use crate::sharded_map::{SetOutcome, ShardedHashMap};
use core::hash::BuildHasher;
use hashbrown::hash_map::DefaultHashBuilder;
use proptest::prelude::*;
use std::collections::{BTreeMap, HashMap};
use std::hash::Hasher;

// Pool-indexed operations to improve shrinking: indices shrink to earlier keys,
// pool length shrinks, and op lists shrink in length.
#[derive(Clone, Debug)]
enum OpI {
    Set(usize, i32),
    Remove(usize),
    Get(usize),
    Contains(String),
    MutateCopy(usize, i32),
    ForEach,
    Clear,
}

fn arb_scenario() -> impl Strategy<Value = (Vec<String>, Vec<OpI>)> {
    proptest::collection::vec("[a-z]{0,5}", 1..=8).prop_flat_map(|pool| {
        let idxs: Vec<usize> = (0..pool.len()).collect();
        let idx = proptest::sample::select(idxs);
        let contains_pool = proptest::sample::select(pool.clone());
        let op = prop_oneof![
            4 => (idx.clone(), any::<i32>()).prop_map(|(i, v)| OpI::Set(i, v)),
            2 => idx.clone().prop_map(OpI::Remove),
            2 => idx.clone().prop_map(OpI::Get),
            1 => prop_oneof![
                contains_pool.prop_map(|s: String| s),
                "[a-z]{0,5}".prop_map(|s| s)
            ]
            .prop_map(OpI::Contains),
            1 => (idx.clone(), any::<i32>()).prop_map(|(i, d)| OpI::MutateCopy(i, d)),
            1 => Just(OpI::ForEach),
            1 => Just(OpI::Clear),
        ];
        proptest::collection::vec(op, 1..80).prop_map(move |ops| (pool.clone(), ops))
    })
}

// State-machine equivalence against std::collections::HashMap.
// Invariants exercised across random operation sequences:
// - `set` reports Inserted exactly when the model lacked the key; updates
//   never change the count.
// - `get` copies equal the model; mutating a copy never reaches the map.
// - `remove` reports presence exactly as the model does.
// - `for_each` yields each live entry exactly once.
// - Every stored key sits in the slot it hashes to; counters match chains.
fn run_state_machine<S: BuildHasher>(
    sut: ShardedHashMap<String, i32, S>,
    pool: Vec<String>,
    ops: Vec<OpI>,
) -> Result<(), TestCaseError> {
    let mut model: HashMap<String, i32> = HashMap::new();

    for op in ops {
        match op {
            OpI::Set(i, v) => {
                let k = pool[i].clone();
                let already = model.insert(k.clone(), v).is_some();
                let outcome = sut.set(k, v).unwrap();
                let expected = if already {
                    SetOutcome::Updated
                } else {
                    SetOutcome::Inserted
                };
                prop_assert_eq!(outcome, expected);
            }
            OpI::Remove(i) => {
                let k = &pool[i];
                let removed = sut.remove(k.as_str()).unwrap();
                prop_assert_eq!(removed, model.remove(k).is_some());
                prop_assert!(sut.get(k.as_str()).unwrap().is_none());
            }
            OpI::Get(i) => {
                let k = &pool[i];
                let got = sut.get(k.as_str()).unwrap().map(|b| b.into_parts());
                prop_assert_eq!(got, model.get(k).map(|v| (k.clone(), *v)));
            }
            OpI::Contains(s) => {
                prop_assert_eq!(sut.contains(s.as_str()).unwrap(), model.contains_key(&s));
            }
            OpI::MutateCopy(i, d) => {
                let k = &pool[i];
                if let Some(mut copy) = sut.get(k.as_str()).unwrap() {
                    let bumped = copy.value().wrapping_add(d).wrapping_add(1);
                    *copy.value_mut() = bumped;
                    let again = sut.get(k.as_str()).unwrap().map(|b| b.into_value());
                    prop_assert_eq!(again, model.get(k).copied());
                }
            }
            OpI::ForEach => {
                let mut seen = BTreeMap::new();
                sut.for_each(|k, v| {
                    let prev = seen.insert(k.clone(), *v);
                    assert!(prev.is_none(), "entry visited twice");
                })
                .unwrap();
                let expected: BTreeMap<String, i32> =
                    model.iter().map(|(k, v)| (k.clone(), *v)).collect();
                prop_assert_eq!(seen, expected);
            }
            OpI::Clear => {
                sut.clear().unwrap();
                model.clear();
            }
        }

        prop_assert_eq!(sut.len().unwrap(), model.len());
        prop_assert_eq!(sut.is_empty().unwrap(), model.is_empty());
        sut.assert_invariants();
    }
    Ok(())
}

proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine((pool, ops) in arb_scenario()) {
        run_state_machine(ShardedHashMap::new(), pool, ops)?;
    }

    // A tiny table forces frequent collisions while keys still spread over
    // more than one shard.
    #[test]
    fn prop_state_machine_small_table((pool, ops) in arb_scenario()) {
        let config = MapConfig::default().with_slot_count(4).with_shard_count(2);
        let sut = ShardedHashMap::with_config(config, DefaultHashBuilder::default()).unwrap();
        run_state_machine(sut, pool, ops)?;
    }
}

// Collision variant using a constant hasher to stress equality resolution.
#[derive(Clone, Default)]
struct ConstBuildHasher;
struct ConstHasher;
impl BuildHasher for ConstBuildHasher {
    type Hasher = ConstHasher;
    fn build_hasher(&self) -> Self::Hasher {
        ConstHasher
    }
}
impl Hasher for ConstHasher {
    fn write(&mut self, _bytes: &[u8]) {}
    fn finish(&self) -> u64 {
        0
    }
}

// Same state-machine invariants under worst-case collision behavior: every
// key shares slot 0, so removal exercises head promotion and relinking.
proptest! {
    #![proptest_config(ProptestConfig { cases: 64, .. ProptestConfig::default() })]
    #[test]
    fn prop_state_machine_with_collisions((pool, ops) in arb_scenario()) {
        run_state_machine(ShardedHashMap::with_hasher(ConstBuildHasher), pool, ops)?;
    }
}
