//! LFU Policy Module
//!
//! Least Frequently Used tracking. Ties on frequency go to the key inserted
//! first, so eviction order is deterministic.

use std::collections::{BTreeSet, HashMap};

use super::{EvictionPolicy, EvictionStrategy};

// == LFU Policy ==
/// Frequency counters ordered by `(count, insertion order)`.
#[derive(Debug, Default)]
pub struct LfuPolicy {
    counts: HashMap<String, (u64, u64)>,
    ordered: BTreeSet<(u64, u64, String)>,
    next_seq: u64,
}

impl LfuPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    /// Current access count for `key`, if tracked.
    pub fn frequency(&self, key: &str) -> Option<u64> {
        self.counts.get(key).map(|(count, _)| *count)
    }
}

impl EvictionPolicy for LfuPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Lfu
    }

    fn on_insert(&mut self, key: &str) {
        if self.counts.contains_key(key) {
            return;
        }
        let seq = self.next_seq;
        self.next_seq += 1;
        self.counts.insert(key.to_string(), (1, seq));
        self.ordered.insert((1, seq, key.to_string()));
    }

    fn on_access(&mut self, key: &str) {
        if let Some((count, seq)) = self.counts.get_mut(key) {
            let was_ordered = self.ordered.remove(&(*count, *seq, key.to_string()));
            debug_assert!(was_ordered, "lfu frequency index out of sync for {key}");
            *count = count.saturating_add(1);
            self.ordered.insert((*count, *seq, key.to_string()));
        }
    }

    fn on_remove(&mut self, key: &str) {
        if let Some((count, seq)) = self.counts.remove(key) {
            self.ordered.remove(&(count, seq, key.to_string()));
        }
    }

    fn select_victim(&mut self) -> Option<String> {
        self.ordered.first().map(|(_, _, key)| key.clone())
    }

    fn len(&self) -> usize {
        self.counts.len()
    }

    fn clear(&mut self) {
        self.counts.clear();
        self.ordered.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_lfu_insert_seeds_one() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("a");

        assert_eq!(lfu.frequency("a"), Some(1));
        assert_eq!(lfu.select_victim(), Some("a".to_string()));
    }

    #[test]
    fn test_lfu_victim_is_least_frequent() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("a");
        lfu.on_insert("b");
        lfu.on_access("a");
        lfu.on_access("a");

        assert_eq!(lfu.frequency("a"), Some(3));
        assert_eq!(lfu.select_victim(), Some("b".to_string()));
    }

    #[test]
    fn test_lfu_tie_breaks_on_oldest_insert() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("late");
        lfu.on_insert("later");
        lfu.on_access("late");
        lfu.on_access("later");

        assert_eq!(lfu.select_victim(), Some("late".to_string()));
    }

    #[test]
    fn test_lfu_remove_and_reinsert_resets_count() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("a");
        lfu.on_insert("b");
        lfu.on_access("a");
        lfu.on_access("b");
        lfu.on_remove("a");
        lfu.on_insert("a");

        assert_eq!(lfu.frequency("a"), Some(1));
        assert_eq!(lfu.len(), 2);
        assert_eq!(lfu.select_victim(), Some("a".to_string()));
    }

    #[test]
    fn test_lfu_unknown_keys_are_ignored() {
        let mut lfu = LfuPolicy::new();
        lfu.on_access("ghost");
        lfu.on_remove("ghost");

        assert!(lfu.is_empty());
        assert_eq!(lfu.select_victim(), None);
    }

    #[test]
    #[cfg(debug_assertions)]
    #[should_panic(expected = "out of sync")]
    fn test_lfu_access_detects_desynced_index() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("a");
        lfu.ordered.clear();

        lfu.on_access("a");
    }

    #[test]
    fn test_lfu_clear() {
        let mut lfu = LfuPolicy::new();
        lfu.on_insert("a");
        lfu.clear();

        assert!(lfu.is_empty());
        assert_eq!(lfu.frequency("a"), None);
    }
}
