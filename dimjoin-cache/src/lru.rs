//! Recency list backing [`BoundedCache`](crate::BoundedCache).
//!
//! Nodes live in a slab (`Vec<Option<Node>>` plus a free list) and are linked
//! by slot index, head = most recently used, tail = least recently used. The
//! hash index maps each key to its slot, so every operation except `retain`
//! is O(1).

use std::collections::HashMap;
use std::hash::Hash;
use tokio::time::Instant;

struct Node<K, V> {
    key: K,
    value: V,
    inserted_at: Instant,
    prev: Option<usize>,
    next: Option<usize>,
}

pub(crate) struct LruList<K, V> {
    index: HashMap<K, usize>,
    slots: Vec<Option<Node<K, V>>>,
    free: Vec<usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl<K, V> LruList<K, V>
where
    K: Hash + Eq + Clone,
{
    pub(crate) fn with_capacity(capacity: usize) -> Self {
        Self {
            index: HashMap::with_capacity(capacity),
            slots: Vec::with_capacity(capacity),
            free: Vec::new(),
            head: None,
            tail: None,
        }
    }

    pub(crate) fn len(&self) -> usize {
        self.index.len()
    }

    pub(crate) fn inserted_at(&self, key: &K) -> Option<Instant> {
        self.index.get(key).map(|&slot| self.node(slot).inserted_at)
    }

    /// Marks `key` as most recently used and returns its value.
    pub(crate) fn touch(&mut self, key: &K) -> Option<&V> {
        let slot = *self.index.get(key)?;
        self.unlink(slot);
        self.push_front(slot);
        Some(&self.node(slot).value)
    }

    /// Inserts or replaces `key` as the most recently used entry.
    pub(crate) fn insert(&mut self, key: K, value: V, now: Instant) {
        if let Some(&slot) = self.index.get(&key) {
            let node = self.node_mut(slot);
            node.value = value;
            node.inserted_at = now;
            self.unlink(slot);
            self.push_front(slot);
            return;
        }

        let slot = self.alloc(Node {
            key: key.clone(),
            value,
            inserted_at: now,
            prev: None,
            next: None,
        });
        self.index.insert(key, slot);
        self.push_front(slot);
    }

    pub(crate) fn remove(&mut self, key: &K) -> Option<V> {
        let slot = self.index.remove(key)?;
        self.unlink(slot);
        Some(self.release(slot).value)
    }

    /// Removes and returns the least recently used entry.
    pub(crate) fn pop_lru(&mut self) -> Option<(K, V)> {
        let slot = self.tail?;
        self.unlink(slot);
        let node = self.release(slot);
        self.index.remove(&node.key);
        Some((node.key, node.value))
    }

    /// Keeps only entries whose insertion time satisfies `keep`.
    /// Returns the number of entries removed.
    pub(crate) fn retain(&mut self, mut keep: impl FnMut(Instant) -> bool) -> usize {
        let mut removed = 0;
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            let node = self.node(slot);
            cursor = node.next;
            if !keep(node.inserted_at) {
                let key = node.key.clone();
                self.index.remove(&key);
                self.unlink(slot);
                self.release(slot);
                removed += 1;
            }
        }
        removed
    }

    pub(crate) fn clear(&mut self) {
        self.index.clear();
        self.slots.clear();
        self.free.clear();
        self.head = None;
        self.tail = None;
    }

    fn alloc(&mut self, node: Node<K, V>) -> usize {
        match self.free.pop() {
            Some(slot) => {
                self.slots[slot] = Some(node);
                slot
            }
            None => {
                self.slots.push(Some(node));
                self.slots.len() - 1
            }
        }
    }

    fn release(&mut self, slot: usize) -> Node<K, V> {
        let node = self.slots[slot].take().expect("released slot must be occupied");
        self.free.push(slot);
        node
    }

    fn node(&self, slot: usize) -> &Node<K, V> {
        self.slots[slot].as_ref().expect("linked slot must be occupied")
    }

    fn node_mut(&mut self, slot: usize) -> &mut Node<K, V> {
        self.slots[slot].as_mut().expect("linked slot must be occupied")
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = {
            let node = self.node_mut(slot);
            (node.prev.take(), node.next.take())
        };
        match prev {
            Some(p) => self.node_mut(p).next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.node_mut(n).prev = prev,
            None => self.tail = prev,
        }
    }

    fn push_front(&mut self, slot: usize) {
        let old_head = self.head;
        {
            let node = self.node_mut(slot);
            node.prev = None;
            node.next = old_head;
        }
        match old_head {
            Some(h) => self.node_mut(h).prev = Some(slot),
            None => self.tail = Some(slot),
        }
        self.head = Some(slot);
    }
}
