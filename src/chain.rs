//! Shard storage: fixed head slots plus an arena of collision-chain nodes.
//!
//! Each shard owns the slots whose global index is congruent to the shard
//! index, addressed here by local index. A slot is either empty or holds the
//! head node of its chain; further nodes live in a generational arena and are
//! linked through `next`. Heads never move out of their slot cell: removing a
//! head that has a successor promotes the successor into the cell instead.

use core::borrow::Borrow;
use slotmap::{new_key_type, SlotMap};
use tracing::trace;

use crate::error::Result;

new_key_type! {
    /// Arena key linking collision-chain nodes.
    pub(crate) struct NodeKey;
}

#[derive(Debug)]
pub(crate) struct Node<K, V> {
    pub(crate) key: K,
    pub(crate) value: V,
    pub(crate) next: Option<NodeKey>,
}

/// Location of a key within one slot's chain.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
enum Position {
    Head,
    /// `prev == None` means the predecessor is the head in the slot cell.
    Linked { prev: Option<NodeKey>, at: NodeKey },
}

#[derive(Debug)]
pub(crate) struct Shard<K, V> {
    slots: Vec<Option<Node<K, V>>>,
    overflow: SlotMap<NodeKey, Node<K, V>>, // chain nodes past the head
    len: usize,
}

/// Entries detached from a shard by `take_all`, torn down when dropped.
pub(crate) struct Retired<K, V> {
    heads: Vec<Node<K, V>>,
    overflow: SlotMap<NodeKey, Node<K, V>>,
}

impl<K, V> Retired<K, V> {
    pub(crate) fn len(&self) -> usize {
        self.heads.len() + self.overflow.len()
    }
}

impl<K, V> Shard<K, V> {
    /// Build a shard with `slots` empty slot cells.
    pub(crate) fn with_slots(slots: usize) -> Result<Self> {
        let mut cells = Vec::new();
        cells.try_reserve_exact(slots)?;
        cells.resize_with(slots, || None);
        Ok(Self {
            slots: cells,
            overflow: SlotMap::with_key(),
            len: 0,
        })
    }

    pub(crate) fn len(&self) -> usize {
        self.len
    }

    /// Number of entries chained at `slot`, head included.
    #[cfg(test)]
    pub(crate) fn chain_len(&self, slot: usize) -> usize {
        let mut n = 0;
        self.walk(slot, |_| n += 1);
        n
    }

    #[cfg(test)]
    pub(crate) fn slot_count(&self) -> usize {
        self.slots.len()
    }

    #[cfg(test)]
    pub(crate) fn keys_in(&self, slot: usize) -> Vec<&K> {
        let mut keys = Vec::new();
        self.walk(slot, |n| keys.push(&n.key));
        keys
    }

    fn walk<'s>(&'s self, slot: usize, mut f: impl FnMut(&'s Node<K, V>)) {
        let Some(head) = self.slots[slot].as_ref() else {
            return;
        };
        f(head);
        let mut cur = head.next;
        while let Some(at) = cur {
            let node = &self.overflow[at];
            f(node);
            cur = node.next;
        }
    }

    fn locate<Q>(&self, slot: usize, q: &Q) -> Option<Position>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let head = self.slots[slot].as_ref()?;
        if head.key.borrow() == q {
            return Some(Position::Head);
        }
        let mut prev = None;
        let mut cur = head.next;
        while let Some(at) = cur {
            let node = &self.overflow[at];
            if node.key.borrow() == q {
                return Some(Position::Linked { prev, at });
            }
            prev = Some(at);
            cur = node.next;
        }
        None
    }

    pub(crate) fn get<Q>(&self, slot: usize, q: &Q) -> Option<&Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.locate(slot, q)? {
            Position::Head => self.slots[slot].as_ref(),
            Position::Linked { at, .. } => self.overflow.get(at),
        }
    }

    fn get_mut<Q>(&mut self, slot: usize, q: &Q) -> Option<&mut Node<K, V>>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        match self.locate(slot, q)? {
            Position::Head => self.slots[slot].as_mut(),
            Position::Linked { at, .. } => self.overflow.get_mut(at),
        }
    }

    /// Insert or update `key` in `slot`. Returns the replaced value on update so
    /// the caller can drop it outside the shard lock.
    ///
    /// New keys go into an empty head cell, or are spliced in directly after
    /// the head when the cell is occupied. The arena is grown fallibly before
    /// anything is linked, so an allocation failure leaves the shard as it was.
    pub(crate) fn set(&mut self, slot: usize, key: K, value: V) -> Result<Option<V>>
    where
        K: Eq,
    {
        if let Some(node) = self.get_mut(slot, &key) {
            return Ok(Some(core::mem::replace(&mut node.value, value)));
        }

        if let Some(head) = self.slots[slot].as_mut() {
            self.overflow.try_reserve(1)?;
            let at = self.overflow.insert(Node {
                key,
                value,
                next: head.next,
            });
            head.next = Some(at);
            trace!(slot, "spliced entry after chain head");
        } else {
            self.slots[slot] = Some(Node {
                key,
                value,
                next: None,
            });
        }
        self.len += 1;
        Ok(None)
    }

    /// Unlink the entry equal to `q` and hand back its key and value.
    pub(crate) fn remove<Q>(&mut self, slot: usize, q: &Q) -> Option<(K, V)>
    where
        K: Borrow<Q>,
        Q: ?Sized + Eq,
    {
        let removed = match self.locate(slot, q)? {
            Position::Head => {
                let head = self.slots[slot]
                    .take()
                    .expect("located head must occupy its slot");
                if let Some(succ) = head.next {
                    let promoted = self
                        .overflow
                        .remove(succ)
                        .expect("chain link must resolve to a live node");
                    self.slots[slot] = Some(promoted);
                    trace!(slot, "promoted chain successor into head slot");
                }
                (head.key, head.value)
            }
            Position::Linked { prev, at } => {
                let node = self
                    .overflow
                    .remove(at)
                    .expect("chain link must resolve to a live node");
                match prev {
                    None => {
                        self.slots[slot]
                            .as_mut()
                            .expect("linked node implies an occupied head")
                            .next = node.next;
                    }
                    Some(p) => self.overflow[p].next = node.next,
                }
                (node.key, node.value)
            }
        };
        self.len -= 1;
        Some(removed)
    }

    /// Visit every entry, slot by slot, each chain from head to tail.
    pub(crate) fn for_each(&self, f: &mut impl FnMut(&K, &V)) {
        for slot in 0..self.slots.len() {
            self.walk(slot, |n| f(&n.key, &n.value));
        }
    }

    /// Detach every entry, leaving all slots empty.
    pub(crate) fn take_all(&mut self) -> Retired<K, V> {
        let heads: Vec<Node<K, V>> = self.slots.iter_mut().filter_map(Option::take).collect();
        let overflow = core::mem::take(&mut self.overflow);
        self.len = 0;
        Retired { heads, overflow }
    }
}
