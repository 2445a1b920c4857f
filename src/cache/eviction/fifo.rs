//! FIFO Policy Module
//!
//! Evicts in insertion order; reads do not change the order.

use std::collections::{HashMap, VecDeque};

use super::{EvictionPolicy, EvictionStrategy};

// == FIFO Policy ==
/// Insertion-ordered queue.
///
/// Removal only forgets the key's generation; the queue slot goes stale and
/// is discarded when it reaches the front. A key re-inserted after removal
/// gets a fresh generation, so its old slot can never be mistaken for it.
#[derive(Debug, Default)]
pub struct FifoPolicy {
    queue: VecDeque<(u64, String)>,
    live: HashMap<String, u64>,
    next_generation: u64,
}

impl FifoPolicy {
    pub fn new() -> Self {
        Self::default()
    }

    fn is_current(&self, generation: u64, key: &str) -> bool {
        self.live.get(key) == Some(&generation)
    }

    fn drop_stale_front(&mut self) {
        while let Some((generation, key)) = self.queue.front() {
            if self.is_current(*generation, key) {
                break;
            }
            self.queue.pop_front();
        }
    }
}

impl EvictionPolicy for FifoPolicy {
    fn strategy(&self) -> EvictionStrategy {
        EvictionStrategy::Fifo
    }

    fn on_insert(&mut self, key: &str) {
        if self.live.contains_key(key) {
            return;
        }
        let generation = self.next_generation;
        self.next_generation += 1;
        self.live.insert(key.to_string(), generation);
        self.queue.push_back((generation, key.to_string()));
    }

    fn on_access(&mut self, _key: &str) {}

    fn on_remove(&mut self, key: &str) {
        if self.live.remove(key).is_some() {
            self.drop_stale_front();
            // Bound the garbage left behind by removals deep in the queue
            if self.queue.len() > 2 * self.live.len() + 16 {
                let live = &self.live;
                self.queue
                    .retain(|(generation, key)| live.get(key) == Some(generation));
            }
        }
    }

    fn select_victim(&mut self) -> Option<String> {
        self.drop_stale_front();
        self.queue.front().map(|(_, key)| key.clone())
    }

    fn len(&self) -> usize {
        self.live.len()
    }

    fn clear(&mut self) {
        self.queue.clear();
        self.live.clear();
    }
}
