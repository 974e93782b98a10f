use super::parser::{OperationLog, parse_log};
use crate::core::Result;
use crate::pipeline::{BatchConfig, BatchReport, OrderedPipeline};
use crate::storage::ShardedMap;
use log::debug;

/// Header line that precedes the results of a batch.
pub fn header_line(workers: usize) -> String {
    format!("Using {} threads to consume", workers)
}

/// Render a batch as text: the header line, then one line per result.
pub fn render_output(workers: usize, lines: &[String]) -> String {
    let mut out = String::with_capacity(32 + lines.iter().map(|l| l.len() + 1).sum::<usize>());
    out.push_str(&header_line(workers));
    out.push('\n');
    for line in lines {
        out.push_str(line);
        out.push('\n');
    }
    out
}

/// Run a parsed log against a fresh map built from `config.map`.
///
/// The worker count comes from `workers_override` if set, otherwise from the
/// log's header. Other pipeline settings come from `config.pipeline`.
pub fn execute_log(
    log: OperationLog,
    config: &BatchConfig,
    workers_override: Option<usize>,
) -> Result<BatchReport> {
    let workers = workers_override.unwrap_or(log.workers);
    let pipeline_config = config.pipeline.clone().workers(workers);
    let pipeline = OrderedPipeline::new(pipeline_config)?;
    let map = ShardedMap::with_config(config.map.clone())?;

    debug!(
        "Executing log: operations={} workers={} buckets={}",
        log.requests.len(),
        workers,
        map.num_buckets()
    );
    pipeline.run(&map, log.requests)
}

/// Parse and execute a whole textual log, returning the textual result log.
pub fn execute_stream(input: &str, config: &BatchConfig) -> Result<String> {
    let log = parse_log(input)?;
    let report = execute_log(log, config, None)?;
    Ok(render_output(report.workers, &report.lines))
}
