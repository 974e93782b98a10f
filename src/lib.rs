// ============================================================================
// shardkv Library
// ============================================================================

//! Bucket-locked concurrent key-value map plus a pipeline that runs
//! operations on many threads while applying and reporting them in
//! submission order.
//!
//! # Examples
//!
//! ```
//! use shardkv::{Command, run_batch};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let lines = run_batch(
//!     vec![
//!         Command::insert(0, "a"),
//!         Command::insert(10, "b"),
//!         Command::insert(10, "c"),
//!         Command::lookup(0),
//!         Command::delete(7),
//!     ],
//!     3,
//! )?;
//!
//! assert_eq!(
//!     lines,
//!     vec![
//!         "[Success] inserted a at 0",
//!         "[Success] inserted b at 10",
//!         "[Error] failed to insert 10 at c",
//!         "[Success] Found \"a\" from key 0",
//!         "[Error] failed to remove 7: value not found",
//!     ]
//! );
//! # Ok(())
//! # }
//! ```
//!
//! Running against a map you own, for example to inspect it afterwards:
//!
//! ```
//! use shardkv::{Command, OrderedPipeline, Request, ShardedMap};
//!
//! # fn main() -> Result<(), Box<dyn std::error::Error>> {
//! let map = ShardedMap::new(16)?;
//! let pipeline = OrderedPipeline::with_workers(4)?;
//!
//! let requests: Vec<Request> = (0..100).map(|key| Command::insert(key, "v").into()).collect();
//! let report = pipeline.run(&map, requests)?;
//!
//! assert_eq!(report.operations, 100);
//! assert_eq!(map.len(), 100);
//! # Ok(())
//! # }
//! ```

pub mod core;
pub mod load_test;
pub mod oplog;
pub mod pipeline;
pub mod storage;
pub mod sync;

// Re-export main types for convenience
pub use crate::core::{Command, Key, KvError, OpStage, Operation, Outcome, Request, Result};
pub use pipeline::{BatchConfig, BatchReport, OrderedPipeline, PipelineConfig, run_batch};
pub use storage::{ShardedMap, ShardedMapConfig, StorageEngine};
