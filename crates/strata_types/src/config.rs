//! Configuration for the type store.

#[cfg(feature = "serde")]
use serde::{Deserialize, Serialize};

/// Configuration for a [`TypeStore`](crate::TypeStore).
///
/// Controls how the canonical type table is partitioned.
#[derive(Clone, Debug, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct StoreConfig {
    /// Number of independently locked interner shards (clamped to at least 1).
    pub shard_count: usize,

    /// Initial capacity reserved in each shard.
    pub shard_capacity: usize,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            shard_count: 16,
            shard_capacity: 64,
        }
    }
}

impl StoreConfig {
    /// A single-shard configuration for small, mostly single-threaded stores.
    #[must_use]
    pub fn compact() -> Self {
        Self {
            shard_count: 1,
            shard_capacity: 16,
        }
    }

    /// Builder method to set the shard count.
    #[must_use]
    pub fn with_shard_count(mut self, shard_count: usize) -> Self {
        self.shard_count = shard_count;
        self
    }

    /// Builder method to set the per-shard capacity.
    #[must_use]
    pub fn with_shard_capacity(mut self, shard_capacity: usize) -> Self {
        self.shard_capacity = shard_capacity;
        self
    }
}
