// Allocation-failure tests.
//
// A global allocator that refuses every request made by the current thread
// while `without_memory` runs. Other threads (the test harness) allocate
// normally.
//
// Invariants exercised:
// - Growing a collision chain under OOM fails with Error::Alloc and leaves
//   the map exactly as it was; the process keeps running.
// - Updating an existing key needs no allocation and still succeeds.
// - Construction and container growth report Error::Alloc the same way.
use std::alloc::{GlobalAlloc, Layout, System};
use std::cell::Cell;
use std::hash::{BuildHasher, Hasher};

use striped_collections::{Error, MapConfig, SetOutcome, ShardedHashMap, SyncString, SyncVec};

thread_local! {
    static REFUSE: Cell<bool> = const { Cell::new(false) };
}

struct RefusingAlloc;

unsafe impl GlobalAlloc for RefusingAlloc {
    unsafe fn alloc(&self, layout: Layout) -> *mut u8 {
        if REFUSE.try_with(Cell::get).unwrap_or(false) {
            return std::ptr::null_mut();
        }
        System.alloc(layout)
    }

    unsafe fn dealloc(&self, ptr: *mut u8, layout: Layout) {
        System.dealloc(ptr, layout)
    }
}

#[global_allocator]
static GLOBAL: RefusingAlloc = RefusingAlloc;

struct Restore;
impl Drop for Restore {
    fn drop(&mut self) {
        REFUSE.with(|r| r.set(false));
    }
}

fn without_memory<R>(f: impl FnOnce() -> R) -> R {
    REFUSE.with(|r| r.set(true));
    let _restore = Restore;
    f()
}

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

// Test: a second key in an occupied slot needs a chain node; with no memory
// the insert is refused and nothing changes.
#[test]
fn chain_growth_failure_leaves_map_unchanged() {
    let config = MapConfig::default().with_slot_count(4).with_shard_count(2);
    let m: ShardedHashMap<&'static str, u32, ConstBuildHasher> =
        ShardedHashMap::with_config(config, ConstBuildHasher).unwrap();
    assert_eq!(m.set("a", 1).unwrap(), SetOutcome::Inserted);

    let refused = without_memory(|| m.set("b", 2));
    assert!(matches!(refused, Err(Error::Alloc(_))));
    assert_eq!(m.len().unwrap(), 1);
    assert!(!m.contains("b").unwrap());
    assert_eq!(m.get("a").unwrap().map(|b| *b.value()), Some(1));

    // Updates reuse the existing node.
    let updated = without_memory(|| m.set("a", 10));
    assert_eq!(updated.unwrap(), SetOutcome::Updated);

    // Once memory is back the same insert goes through.
    assert_eq!(m.set("b", 2).unwrap(), SetOutcome::Inserted);
    assert_eq!(m.len().unwrap(), 2);
    assert_eq!(m.get("a").unwrap().map(|b| *b.value()), Some(10));
}

#[test]
fn construction_reports_alloc_failure() {
    let res = without_memory(|| {
        ShardedHashMap::<u64, u64, _>::with_config(MapConfig::default(), ConstBuildHasher)
    });
    assert!(matches!(res, Err(Error::Alloc(_))));
}

#[test]
fn container_growth_reports_alloc_failure() {
    let v = SyncVec::with_capacity(1).unwrap();
    v.push(1u64).unwrap();
    let refused = without_memory(|| v.push(2));
    assert!(matches!(refused, Err(Error::Alloc(_))));
    assert_eq!(v.to_vec().unwrap(), vec![1]);

    let s = SyncString::with_capacity("ab", 3).unwrap();
    let refused = without_memory(|| s.append("cdef"));
    assert!(matches!(refused, Err(Error::Alloc(_))));
    assert_eq!(s.snapshot().unwrap(), "ab");
}
