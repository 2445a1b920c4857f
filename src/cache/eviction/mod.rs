//! Eviction Policies
//!
//! Decide which key to drop when the store runs out of capacity. Each policy
//! owns its own tracking structure; switching strategy builds a fresh policy.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CacheError;

mod fifo;
mod lfu;
mod lru;

pub use fifo::FifoPolicy;
pub use lfu::LfuPolicy;
pub use lru::LruPolicy;

// == Eviction Policy Trait ==
/// Tracks key usage and nominates eviction victims.
///
/// The store calls `on_insert` once per stored key, `on_remove` once per
/// removed key, and `on_access` on every hit. `select_victim` must name a
/// tracked key whenever the policy is non-empty; it does not stop tracking it,
/// the store's removal path calls `on_remove`.
pub trait EvictionPolicy: Send + Sync + fmt::Debug {
    fn strategy(&self) -> EvictionStrategy;

    fn on_insert(&mut self, key: &str);

    fn on_access(&mut self, key: &str);

    fn on_remove(&mut self, key: &str);

    fn select_victim(&mut self) -> Option<String>;

    /// Number of tracked keys
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Forgets every tracked key.
    fn clear(&mut self);
}

// == Eviction Strategy ==
/// Names the available eviction policies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase", try_from = "String")]
pub enum EvictionStrategy {
    /// Least recently used
    #[default]
    Lru,
    /// First in, first out
    Fifo,
    /// Least frequently used
    Lfu,
}

impl EvictionStrategy {
    pub fn as_str(&self) -> &'static str {
        match self {
            EvictionStrategy::Lru => "lru",
            EvictionStrategy::Fifo => "fifo",
            EvictionStrategy::Lfu => "lfu",
        }
    }
}

impl FromStr for EvictionStrategy {
    type Err = CacheError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "lru" => Ok(EvictionStrategy::Lru),
            "fifo" => Ok(EvictionStrategy::Fifo),
            "lfu" => Ok(EvictionStrategy::Lfu),
            _ => Err(CacheError::UnknownStrategy(s.to_string())),
        }
    }
}

impl TryFrom<String> for EvictionStrategy {
    type Error = CacheError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl fmt::Display for EvictionStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// == Factory ==
/// Builds an empty policy for `strategy`.
pub fn create_policy(strategy: EvictionStrategy) -> Box<dyn EvictionPolicy> {
    match strategy {
        EvictionStrategy::Lru => Box::new(LruPolicy::new()),
        EvictionStrategy::Fifo => Box::new(FifoPolicy::new()),
        EvictionStrategy::Lfu => Box::new(LfuPolicy::new()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_strategy_parse_case_insensitive() {
        assert_eq!("lru".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Lru));
        assert_eq!("FIFO".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Fifo));
        assert_eq!(" Lfu ".parse::<EvictionStrategy>(), Ok(EvictionStrategy::Lfu));
    }

    #[test]
    fn test_strategy_parse_unknown() {
        assert_eq!(
            "arc".parse::<EvictionStrategy>(),
            Err(CacheError::UnknownStrategy("arc".to_string()))
        );
    }

    #[test]
    fn test_strategy_deserialize_matches_parse() {
        let parsed: EvictionStrategy = serde_json::from_str("\"FIFO\"").unwrap();
        assert_eq!(parsed, EvictionStrategy::Fifo);
        let parsed: EvictionStrategy = serde_json::from_str("\" lfu\"").unwrap();
        assert_eq!(parsed, EvictionStrategy::Lfu);

        let err = serde_json::from_str::<EvictionStrategy>("\"arc\"").unwrap_err();
        assert!(err.to_string().contains("arc"));
        assert_eq!(serde_json::to_string(&EvictionStrategy::Lru).unwrap(), "\"lru\"");
    }

    #[test]
    fn test_strategy_display_roundtrips() {
        for strategy in [EvictionStrategy::Lru, EvictionStrategy::Fifo, EvictionStrategy::Lfu] {
            assert_eq!(strategy.to_string().parse::<EvictionStrategy>(), Ok(strategy));
        }
    }

    #[test]
    fn test_factory_builds_requested_policy() {
        for strategy in [EvictionStrategy::Lru, EvictionStrategy::Fifo, EvictionStrategy::Lfu] {
            let policy = create_policy(strategy);
            assert_eq!(policy.strategy(), strategy);
            assert!(policy.is_empty());
        }
    }

    // Same key sequence, three different victims.
    #[test]
    fn test_strategies_pick_different_victims() {
        let victim = |strategy| {
            let mut policy = create_policy(strategy);
            policy.on_insert("a");
            policy.on_insert("b");
            policy.on_insert("c");
            policy.on_access("a");
            policy.on_access("b");
            policy.on_access("b");
            policy.on_access("c");
            policy.on_access("c");
            policy.on_access("c");
            policy.on_access("a");
            policy.select_victim()
        };

        assert_eq!(victim(EvictionStrategy::Lru), Some("b".to_string()));
        assert_eq!(victim(EvictionStrategy::Fifo), Some("a".to_string()));
        assert_eq!(victim(EvictionStrategy::Lfu), Some("a".to_string()));
    }
}
