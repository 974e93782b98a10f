use crate::core::{Command, Key, KvError, Request, Result};
use crate::pipeline::{OrderedPipeline, PipelineConfig};
use crate::storage::{ShardedMap, ShardedMapConfig};
use log::info;
use serde::Serialize;
use std::time::Duration;

/// Worker-count scaling benchmark settings.
#[derive(Debug, Clone)]
pub struct LoadTestConfig {
    pub operations: usize,
    /// Keys are drawn from `0..key_space`
    pub key_space: Key,
    /// Runs are made with 1..=max_workers workers
    pub max_workers: usize,
    pub buckets: usize,
    /// Per-operation delay inside the bucket lock
    pub padding: Duration,
    pub seed: u64,
}

impl Default for LoadTestConfig {
    fn default() -> Self {
        Self {
            operations: 10_000,
            key_space: 1000,
            max_workers: 4,
            buckets: 100,
            padding: Duration::ZERO,
            seed: 0x9e3779b97f4a7c15,
        }
    }
}

#[derive(Debug, Clone, Serialize)]
pub struct ScalingSample {
    pub workers: usize,
    pub elapsed_ms: f64,
    pub ops_per_sec: f64,
}

#[derive(Debug, Clone, Serialize)]
pub struct LoadTestReport {
    pub operations: usize,
    pub buckets: usize,
    pub padding_us: u64,
    pub samples: Vec<ScalingSample>,
    /// Every run produced the same result lines as the single-worker run
    pub outputs_match: bool,
}

/// Random mix of inserts, lookups and deletes, reproducible from `seed`.
pub fn generate_workload(operations: usize, key_space: Key, seed: u64) -> Vec<Command> {
    let mut rng = Lcg64::new(seed);
    let key_space = key_space.max(1) as u64;

    (0..operations)
        .map(|_| {
            let key = ((rng.next_u64() >> 16) % key_space) as Key;
            match (rng.next_u64() >> 33) % 3 {
                0 => Command::insert(key, "asdf"),
                1 => Command::lookup(key),
                _ => Command::delete(key),
            }
        })
        .collect()
}

pub fn run_load_test(config: &LoadTestConfig) -> Result<LoadTestReport> {
    if config.max_workers == 0 {
        return Err(KvError::ConfigError("max_workers must be > 0".to_string()));
    }

    let workload = generate_workload(config.operations, config.key_space, config.seed);
    let map_config = ShardedMapConfig::new(config.buckets).op_padding(config.padding);

    let mut baseline: Option<Vec<String>> = None;
    let mut outputs_match = true;
    let mut samples = Vec::with_capacity(config.max_workers);

    for workers in 1..=config.max_workers {
        let map = ShardedMap::with_config(map_config.clone())?;
        let pipeline = OrderedPipeline::new(PipelineConfig::new(workers).thread_name_prefix("bench"))?;
        let requests: Vec<Request> = workload.iter().cloned().map(Request::Command).collect();

        let report = pipeline.run(&map, requests)?;
        let elapsed = report.elapsed.as_secs_f64().max(0.000_001);
        info!(
            "Executed {} operations with {} worker(s) in {:.2}ms",
            report.operations,
            workers,
            elapsed * 1000.0
        );

        match &baseline {
            Some(expected) => outputs_match &= *expected == report.lines,
            None => baseline = Some(report.lines),
        }
        samples.push(ScalingSample {
            workers,
            elapsed_ms: elapsed * 1000.0,
            ops_per_sec: config.operations as f64 / elapsed,
        });
    }

    Ok(LoadTestReport {
        operations: config.operations,
        buckets: config.buckets,
        padding_us: map_config.op_padding_us,
        samples,
        outputs_match,
    })
}

struct Lcg64 {
    state: u64,
}

impl Lcg64 {
    fn new(seed: u64) -> Self {
        Self { state: seed }
    }

    fn next_u64(&mut self) -> u64 {
        self.state = self.state.wrapping_mul(6364136223846793005).wrapping_add(1);
        self.state
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_workload_is_reproducible() {
        let a = generate_workload(500, 50, 7);
        let b = generate_workload(500, 50, 7);
        assert_eq!(a, b);
        assert!(a.iter().all(|cmd| (0..50).contains(&cmd.key())));
        assert!(a.iter().any(|cmd| matches!(cmd, Command::Insert { .. })));
        assert!(a.iter().any(|cmd| matches!(cmd, Command::Lookup { .. })));
        assert!(a.iter().any(|cmd| matches!(cmd, Command::Delete { .. })));
    }

    #[test]
    fn test_small_load_test() {
        let config = LoadTestConfig {
            operations: 2_000,
            key_space: 100,
            max_workers: 3,
            buckets: 10,
            ..LoadTestConfig::default()
        };

        let report = run_load_test(&config).unwrap();
        assert_eq!(report.samples.len(), 3);
        assert!(report.outputs_match);
    }

    #[test]
    fn test_zero_workers_rejected() {
        let config = LoadTestConfig {
            max_workers: 0,
            ..LoadTestConfig::default()
        };
        assert!(run_load_test(&config).is_err());
    }
}
