use super::bucket::Bucket;
use super::config::ShardedMapConfig;
use super::engine::StorageEngine;
use crate::core::{Key, KvError, Result};
use log::{debug, warn};
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::thread;
use std::time::Duration;

/// Hash map split into a fixed number of independently locked buckets.
///
/// Operations on different buckets never block each other. Every operation
/// takes exactly one bucket lock, so the map itself cannot deadlock.
pub struct ShardedMap {
    buckets: Box<[Mutex<Bucket>]>,
    op_padding: Duration,
}

impl ShardedMap {
    /// Create a map with `num_buckets` buckets and no padding
    pub fn new(num_buckets: usize) -> Result<Self> {
        Self::with_config(ShardedMapConfig::new(num_buckets))
    }

    pub fn with_config(config: ShardedMapConfig) -> Result<Self> {
        config.validate().map_err(KvError::ConfigError)?;

        let buckets = (0..config.num_buckets)
            .map(|_| Mutex::new(Bucket::new()))
            .collect::<Vec<_>>()
            .into_boxed_slice();

        debug!(
            "Created sharded map: buckets={} padding_us={}",
            config.num_buckets, config.op_padding_us
        );

        Ok(Self {
            buckets,
            op_padding: config.padding(),
        })
    }

    pub fn num_buckets(&self) -> usize {
        self.buckets.len()
    }

    /// Bucket index for `key`. Negative keys wrap into range.
    pub fn bucket_of(&self, key: Key) -> usize {
        key.rem_euclid(self.buckets.len() as Key) as usize
    }

    // A panic can only poison a bucket from inside a caller's `started`
    // callback, before the chain is touched, so the data is still sound.
    fn lock_bucket(&self, idx: usize) -> MutexGuard<'_, Bucket> {
        self.buckets[idx].lock().unwrap_or_else(|poisoned| {
            warn!("Recovering poisoned lock for bucket {}", idx);
            PoisonError::into_inner(poisoned)
        })
    }

    fn pad(&self) {
        if !self.op_padding.is_zero() {
            thread::sleep(self.op_padding);
        }
    }

    /// Insert `value` at `key`. Fails without touching the stored value if
    /// the key already exists.
    pub fn insert(&self, key: Key, value: &str) -> bool {
        self.locked_insert(key, value, || {})
    }

    /// Copy of the value stored at `key`
    pub fn lookup(&self, key: Key) -> Option<String> {
        self.locked_lookup(key, || {})
    }

    /// Remove `key`. Returns false if it was not present.
    pub fn delete(&self, key: Key) -> bool {
        self.locked_delete(key, || {})
    }

    /// Number of entries across all buckets.
    ///
    /// Buckets are locked one at a time, so under concurrent writes this is
    /// approximate.
    pub fn len(&self) -> usize {
        (0..self.buckets.len())
            .map(|idx| self.lock_bucket(idx).len())
            .sum()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Keys of one bucket from chain head to tail
    pub fn chain_keys(&self, bucket: usize) -> Vec<Key> {
        match self.buckets.get(bucket) {
            Some(_) => self.lock_bucket(bucket).keys().collect(),
            None => Vec::new(),
        }
    }
}

impl StorageEngine for ShardedMap {
    fn locked_insert<F: FnOnce()>(&self, key: Key, value: &str, started: F) -> bool {
        let mut bucket = self.lock_bucket(self.bucket_of(key));
        started();
        self.pad();
        bucket.insert(key, value)
    }

    fn locked_lookup<F: FnOnce()>(&self, key: Key, started: F) -> Option<String> {
        let bucket = self.lock_bucket(self.bucket_of(key));
        started();
        self.pad();
        bucket.lookup(key).map(str::to_string)
    }

    fn locked_delete<F: FnOnce()>(&self, key: Key, started: F) -> bool {
        let mut bucket = self.lock_bucket(self.bucket_of(key));
        started();
        self.pad();
        bucket.remove(key).is_some()
    }
}

impl Default for ShardedMap {
    fn default() -> Self {
        let config = ShardedMapConfig::default();
        Self {
            buckets: (0..config.num_buckets)
                .map(|_| Mutex::new(Bucket::new()))
                .collect(),
            op_padding: config.padding(),
        }
    }
}
