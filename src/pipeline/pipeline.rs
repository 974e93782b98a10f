use super::config::PipelineConfig;
use super::context::BatchContext;
use super::worker::run_worker;
use crate::core::{KvError, Request, Result};
use crate::storage::StorageEngine;
use log::{error, info};
use std::any::Any;
use std::thread;
use std::time::{Duration, Instant};

/// Result of one batch run.
#[derive(Debug, Clone)]
pub struct BatchReport {
    /// Result lines in submission order
    pub lines: Vec<String>,
    pub workers: usize,
    pub operations: u64,
    /// Operations completed by each worker, indexed by worker id
    pub per_worker: Vec<usize>,
    pub elapsed: Duration,
}

/// Runs a batch of requests on a fixed pool of worker threads.
///
/// Operations start against the store in submission order and their results
/// are reported in submission order. Between those two points operations on
/// different buckets run concurrently.
pub struct OrderedPipeline {
    config: PipelineConfig,
}

impl OrderedPipeline {
    pub fn new(config: PipelineConfig) -> Result<Self> {
        config.validate().map_err(KvError::ConfigError)?;
        Ok(Self { config })
    }

    pub fn with_workers(workers: usize) -> Result<Self> {
        Self::new(PipelineConfig::new(workers))
    }

    /// Execute `requests` against `store`.
    ///
    /// Fails if a worker thread cannot be started, a worker panics, or a gate
    /// wait exceeds the configured timeout. In every failure case the
    /// remaining work is abandoned and the first cause is returned.
    pub fn run<S, I>(&self, store: &S, requests: I) -> Result<BatchReport>
    where
        S: StorageEngine,
        I: IntoIterator<Item = Request>,
        I::IntoIter: Send + 'static,
    {
        let started = Instant::now();
        let workers = self.config.workers;
        let ctx = BatchContext::new(requests, &self.config);

        let (spawn_error, waited, joined) = thread::scope(|scope| {
            let mut handles = Vec::with_capacity(workers);
            let mut spawn_error = None;

            for worker in 0..workers {
                let ctx = &ctx;
                let mut builder = thread::Builder::new()
                    .name(format!("{}-{}", self.config.thread_name_prefix, worker));
                if let Some(stack_size) = self.config.worker_stack_size {
                    builder = builder.stack_size(stack_size);
                }

                match builder.spawn_scoped(scope, move || run_worker(worker, ctx, store)) {
                    Ok(handle) => handles.push(handle),
                    Err(err) => {
                        error!("Failed to start worker {}: {}", worker, err);
                        spawn_error = Some(KvError::WorkerSpawn {
                            worker,
                            reason: err.to_string(),
                        });
                        ctx.abort();
                        ctx.completion.forfeit(workers - worker);
                        break;
                    }
                }
            }

            let waited = ctx.completion.wait();
            let joined: Vec<thread::Result<usize>> =
                handles.into_iter().map(|handle| handle.join()).collect();
            (spawn_error, waited, joined)
        });

        if let Some(err) = spawn_error {
            return Err(err);
        }

        let mut per_worker = Vec::with_capacity(joined.len());
        for (worker, result) in joined.into_iter().enumerate() {
            match result {
                Ok(processed) => per_worker.push(processed),
                Err(payload) => {
                    return Err(KvError::WorkerPanic(format!(
                        "worker {}: {}",
                        worker,
                        panic_message(payload.as_ref())
                    )));
                }
            }
        }
        waited?;

        if let Some(err) = ctx.take_failure() {
            return Err(err);
        }

        let operations = ctx.claimed()?;
        let lines = ctx.into_output()?;
        debug_assert_eq!(lines.len() as u64, operations);

        let elapsed = started.elapsed();
        info!(
            "Batch complete: operations={} workers={} elapsed_ms={}",
            operations,
            workers,
            elapsed.as_millis()
        );

        Ok(BatchReport {
            lines,
            workers,
            operations,
            per_worker,
            elapsed,
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(msg) = payload.downcast_ref::<&str>() {
        msg.to_string()
    } else if let Some(msg) = payload.downcast_ref::<String>() {
        msg.clone()
    } else {
        "unknown panic payload".to_string()
    }
}
