//! Owned copies of map entries handed out across the lock boundary.

use crate::chain::Node;

/// A detached copy of one map entry, as returned by `ShardedHashMap::get`.
///
/// The copy shares no storage with the map: reading or mutating it never
/// observes or disturbs the live entry, and it stays valid after the entry is
/// updated or removed. Dropping it releases the copied key and value.
#[derive(Clone, Debug, Eq, PartialEq, Hash)]
pub struct Bucket<K, V> {
    key: K,
    value: V,
}

impl<K, V> Bucket<K, V> {
    /// Deep-copy a stored node. Runs while the owning shard lock is held.
    pub(crate) fn copy_of(node: &Node<K, V>) -> Self
    where
        K: Clone,
        V: Clone,
    {
        Self {
            key: node.key.clone(),
            value: node.value.clone(),
        }
    }

    pub fn key(&self) -> &K {
        &self.key
    }

    pub fn value(&self) -> &V {
        &self.value
    }

    pub fn value_mut(&mut self) -> &mut V {
        &mut self.value
    }

    pub fn into_value(self) -> V {
        self.value
    }

    pub fn into_parts(self) -> (K, V) {
        (self.key, self.value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Invariant: the copy is independent of the node it was taken from.
    #[test]
    fn copy_is_detached() {
        let mut node = Node {
            key: "k".to_string(),
            value: vec![1, 2, 3],
            next: None,
        };
        let mut b = Bucket::copy_of(&node);
        b.value_mut().push(4);
        node.value.clear();

        assert_eq!(b.key(), "k");
        assert_eq!(b.value(), &vec![1, 2, 3, 4]);
        assert!(node.value.is_empty());
        assert_eq!(b.into_parts(), ("k".to_string(), vec![1, 2, 3, 4]));
    }
}
