//! Index configuration

use serde::{Deserialize, Serialize};

/// Rule used to pick a child while descending during insertion
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum InsertPolicy {
    /// Child whose surface area grows the least; ties go to the smaller child
    #[default]
    LeastGrowth,
    /// Child with the smaller surface area
    SmallerArea,
}

/// Spatial index configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct IndexConfig {
    /// Seed for the insertion-order shuffle. `None` seeds from entropy.
    pub shuffle_seed: Option<u64>,

    /// Shuffle staged elements before insertion.
    ///
    /// Turning this off makes the tree shape follow the caller's insertion
    /// order, which degrades to long chains for spatially sorted input.
    pub shuffle: bool,

    /// Descent rule for insertion
    pub insert_policy: InsertPolicy,
}

impl Default for IndexConfig {
    fn default() -> Self {
        Self {
            shuffle_seed: None,
            shuffle: true,
            insert_policy: InsertPolicy::LeastGrowth,
        }
    }
}

impl IndexConfig {
    /// Configuration with a pinned shuffle seed, for reproducible tree shapes
    pub fn deterministic(seed: u64) -> Self {
        Self {
            shuffle_seed: Some(seed),
            ..Default::default()
        }
    }

    /// Set the shuffle seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.shuffle_seed = Some(seed);
        self
    }

    /// Set the insertion policy
    pub fn with_policy(mut self, policy: InsertPolicy) -> Self {
        self.insert_policy = policy;
        self
    }

    /// Insert elements in staging order
    pub fn without_shuffle(mut self) -> Self {
        self.shuffle = false;
        self
    }
}
