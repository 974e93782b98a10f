pub mod bucket;
pub mod config;
pub mod engine;
pub mod sharded_map;

pub use bucket::{Bucket, Entry};
pub use config::ShardedMapConfig;
pub use engine::StorageEngine;
pub use sharded_map::ShardedMap;
