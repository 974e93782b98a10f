use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Sharded map configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ShardedMapConfig {
    /// Number of buckets; fixed for the lifetime of the map
    pub num_buckets: usize,

    /// Artificial delay (microseconds) applied inside every locked operation
    /// while the bucket lock is held. Used to make map work dominate the
    /// ordering overhead in scaling benchmarks.
    pub op_padding_us: u64,
}

impl ShardedMapConfig {
    pub fn new(num_buckets: usize) -> Self {
        Self {
            num_buckets,
            op_padding_us: 0,
        }
    }

    /// Set the number of buckets
    pub fn num_buckets(mut self, num_buckets: usize) -> Self {
        self.num_buckets = num_buckets;
        self
    }

    /// Set per-operation padding
    pub fn op_padding(mut self, padding: Duration) -> Self {
        self.op_padding_us = padding.as_micros() as u64;
        self
    }

    pub fn padding(&self) -> Duration {
        Duration::from_micros(self.op_padding_us)
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), String> {
        if self.num_buckets == 0 {
            return Err("num_buckets must be > 0".to_string());
        }
        Ok(())
    }
}

impl Default for ShardedMapConfig {
    fn default() -> Self {
        Self::new(1000)
    }
}
