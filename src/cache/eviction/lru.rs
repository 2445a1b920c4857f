//! LRU Policy Module
//!
//! Least Recently Used tracking with O(1) touch, remove and victim lookup.

use std::collections::HashMap;

use super::{EvictionPolicy, EvictionStrategy};

/// Slot in the node arena.
#[derive(Debug)]
struct Node {
    key: String,
    prev: Option<usize>,
    next: Option<usize>,
}

// == LRU Policy ==
/// Tracks access order for LRU eviction.
///
/// Keys live in a doubly linked list threaded through a slot arena:
/// - `head` = least recently used
/// - `tail` = most recently used
///
/// `index` maps each key to its slot so every operation is O(1). Freed slots
/// are recycled through `free`.
#[derive(Debug, Default)]
pub struct LruPolicy {
    nodes: Vec<Node>,
    free: Vec<usize>,
    index: HashMap<String, usize>,
    head: Option<usize>,
    tail: Option<usize>,
}

impl LruPolicy {
    // == Constructor ==
    pub fn new() -> Self {
        Self::default()
    }

    /// Keys from least to most recently used.
    pub fn order(&self) -> Vec<String> {
        let mut keys = Vec::with_capacity(self.index.len());
        let mut cursor = self.head;
        while let Some(slot) = cursor {
            keys.push(self.nodes[slot].key.clone());
            cursor = self.nodes[slot].next;
        }
        keys
    }

    fn unlink(&mut self, slot: usize) {
        let (prev, next) = (self.nodes[slot].prev, self.nodes[slot].next);
        match prev {
            Some(p) => self.nodes[p].next = next,
            None => self.head = next,
        }
        match next {
            Some(n) => self.nodes[n].prev = prev,
            None => self.tail = prev,
        }
        self.nodes[slot].prev = None;
        self.nodes[slot].next = None;
    }

    fn push_back(&mut self, slot: usize) {
        self.nodes[slot].prev = self.tail;
        self.nodes[slot].next = None;
        match self.tail {
            Some(t) => self.nodes[t].next = Some(slot),
            None => self.head = Some(slot),
        }
        self.tail = Some(slot);
    }

    fn allocate(&mut self, key: &str) -> usize {
        let node = Node {
            key: key.to_string(),
            prev: None,
            next: None,
        };
        match self.free.pop() {
            Some(slot) => {
                self.nodes[slot] = node;
                slot
            }
            None => {
                self.nodes.push(node);
                self.nodes.len() - 1
            }
        }
    }
}

impl EvictionPolicy for LruPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Lru
    }

    fn on_insert(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.unlink(slot);
            self.push_back(slot);
            return;
        }
        let slot = self.allocate(key);
        self.index.insert(key.to_string(), slot);
        self.push_back(slot);
    }

    // == Touch ==
    fn on_access(&mut self, key: &str) {
        if let Some(&slot) = self.index.get(key) {
            self.unlink(slot);
            self.push_back(slot);
        }
    }

    fn on_remove(&mut self, key: &str) {
        if let Some(slot) = self.index.remove(key) {
            self.unlink(slot);
            self.nodes[slot].key.clear();
            self.free.push(slot);
        }
    }

    fn select_victim(&mut self) -> Option<String> {
        self.head.map(|slot| self.nodes[slot].key.clone())
    }

    fn len(&self) -> usize {
        self.index.len()
    }

    fn clear(&mut self) {
        self.nodes.clear();
        self.free.clear();
        self.index.clear();
        self.head = None;
        self.tail = None;
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;

    fn policy_with(keys: &[&str]) -> LruPolicy {
        let mut lru = LruPolicy::new();
        for key in keys {
            lru.on_insert(key);
        }
        lru
    }

    #[test]
    fn test_lru_new() {
        let mut lru = LruPolicy::new();
        assert!(lru.is_empty());
        assert_eq!(lru.select_victim(), None);
    }

    #[test]
    fn test_lru_insert_order() {
        let mut lru = policy_with(&["key1", "key2", "key3"]);

        assert_eq!(lru.len(), 3);
        assert_eq!(lru.select_victim(), Some("key1".to_string()));
        assert_eq!(lru.order(), vec!["key1", "key2", "key3"]);
    }

    #[test]
    fn test_lru_access_moves_to_back() {
        let mut lru = policy_with(&["a", "b", "c"]);

        lru.on_access("a");

        assert_eq!(lru.select_victim(), Some("b".to_string()));
        assert_eq!(lru.order(), vec!["b", "c", "a"]);
    }

    #[test]
    fn test_lru_order_after_multiple_touches() {
        let mut lru = policy_with(&["a", "b", "c"]);

        lru.on_access("a");
        lru.on_access("c");
        lru.on_access("b");

        assert_eq!(lru.order(), vec!["a", "c", "b"]);
    }

    #[test]
    fn test_lru_remove_head_middle_tail() {
        let mut lru = policy_with(&["a", "b", "c", "d"]);

        lru.on_remove("b");
        assert_eq!(lru.order(), vec!["a", "c", "d"]);

        lru.on_remove("a");
        assert_eq!(lru.order(), vec!["c", "d"]);
        assert_eq!(lru.select_victim(), Some("c".to_string()));

        lru.on_remove("d");
        assert_eq!(lru.order(), vec!["c"]);

        lru.on_remove("c");
        assert!(lru.is_empty());
        assert_eq!(lru.select_victim(), None);
    }

    #[test]
    fn test_lru_remove_nonexistent_key() {
        let mut lru = policy_with(&["key1", "key2"]);

        lru.on_remove("nonexistent");
        lru.on_access("nonexistent");

        assert_eq!(lru.order(), vec!["key1", "key2"]);
    }

    #[test]
    fn test_lru_reinsert_does_not_duplicate() {
        let mut lru = policy_with(&["key1", "key2"]);

        lru.on_insert("key1");

        assert_eq!(lru.len(), 2);
        assert_eq!(lru.order(), vec!["key2", "key1"]);
    }

    #[test]
    fn test_lru_slots_are_recycled() {
        let mut lru = policy_with(&["a", "b"]);

        lru.on_remove("a");
        lru.on_insert("c");

        assert_eq!(lru.nodes.len(), 2);
        assert_eq!(lru.order(), vec!["b", "c"]);
    }

    #[test]
    fn test_lru_clear() {
        let mut lru = policy_with(&["a", "b"]);
        lru.clear();

        assert!(lru.is_empty());
        assert!(lru.order().is_empty());
        lru.on_insert("z");
        assert_eq!(lru.select_victim(), Some("z".to_string()));
    }
}
