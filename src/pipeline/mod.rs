pub mod config;
pub mod context;
pub mod pipeline;
mod worker;

pub use config::{BatchConfig, PipelineConfig};
pub use context::BatchContext;
pub use pipeline::{BatchReport, OrderedPipeline};

use crate::core::{Command, Request, Result};
use crate::storage::ShardedMap;

/// Run `operations` on `worker_count` threads against a fresh default map
/// and return one result line per operation, in submission order.
pub fn run_batch<I>(operations: I, worker_count: usize) -> Result<Vec<String>>
where
    I: IntoIterator<Item = Command>,
    I::IntoIter: Send + 'static,
{
    let map = ShardedMap::default();
    let pipeline = OrderedPipeline::with_workers(worker_count)?;
    let report = pipeline.run(&map, operations.into_iter().map(Request::Command))?;
    Ok(report.lines)
}
