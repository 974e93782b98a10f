use crate::core::{KvError, Result};
use crate::storage::ShardedMapConfig;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Ordered pipeline configuration
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PipelineConfig {
    /// Number of worker threads
    pub workers: usize,

    /// Upper bound (milliseconds) on a single wait at the begin or output
    /// gate. `None` waits forever.
    pub gate_timeout_ms: Option<u64>,

    /// Worker threads are named `<prefix>-<index>`
    pub thread_name_prefix: String,

    /// Stack size for worker threads; platform default when unset
    pub worker_stack_size: Option<usize>,
}

impl PipelineConfig {
    pub fn new(workers: usize) -> Self {
        Self {
            workers,
            gate_timeout_ms: Some(30_000),
            thread_name_prefix: "shardkv-worker".to_string(),
            worker_stack_size: None,
        }
    }

    /// Set the number of worker threads
    pub fn workers(mut self, workers: usize) -> Self {
        self.workers = workers;
        self
    }

    /// Set the gate wait bound
    pub fn gate_timeout(mut self, timeout: Duration) -> Self {
        self.gate_timeout_ms = Some(timeout.as_millis() as u64);
        self
    }

    /// Wait at the gates without a bound
    pub fn no_gate_timeout(mut self) -> Self {
        self.gate_timeout_ms = None;
        self
    }

    /// Set the worker thread name prefix
    pub fn thread_name_prefix(mut self, prefix: &str) -> Self {
        self.thread_name_prefix = prefix.to_string();
        self
    }

    /// Set the worker thread stack size
    pub fn worker_stack_size(mut self, bytes: usize) -> Self {
        self.worker_stack_size = Some(bytes);
        self
    }

    pub fn timeout(&self) -> Option<Duration> {
        self.gate_timeout_ms.map(Duration::from_millis)
    }

    /// Validate configuration
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.workers == 0 {
            return Err("workers must be > 0".to_string());
        }

        if self.gate_timeout_ms == Some(0) {
            return Err("gate_timeout_ms must be > 0 when set".to_string());
        }

        Ok(())
    }
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self::new(1)
    }
}

/// Everything needed to run one batch, loadable from a JSON file.
///
/// ```json
/// { "map": { "num_buckets": 128 }, "pipeline": { "workers": 4 } }
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct BatchConfig {
    pub map: ShardedMapConfig,
    pub pipeline: PipelineConfig,
}

impl BatchConfig {
    pub fn from_json(json: &str) -> Result<Self> {
        let config: Self = serde_json::from_str(json)
            .map_err(|e| KvError::ConfigError(format!("invalid batch config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<()> {
        self.map.validate().map_err(KvError::ConfigError)?;
        self.pipeline.validate().map_err(KvError::ConfigError)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config() {
        let config = PipelineConfig::default();
        assert_eq!(config.workers, 1);
        assert_eq!(config.timeout(), Some(Duration::from_secs(30)));
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_builder_pattern() {
        let config = PipelineConfig::default()
            .workers(8)
            .gate_timeout(Duration::from_millis(250))
            .thread_name_prefix("bench");

        assert_eq!(config.workers, 8);
        assert_eq!(config.gate_timeout_ms, Some(250));
        assert_eq!(config.thread_name_prefix, "bench");
        assert_eq!(config.no_gate_timeout().timeout(), None);
    }

    #[test]
    fn test_validate() {
        assert!(PipelineConfig::new(0).validate().is_err());
        assert!(
            PipelineConfig::new(2)
                .gate_timeout(Duration::ZERO)
                .validate()
                .is_err()
        );
    }

    #[test]
    fn test_batch_config_from_json() {
        let config = BatchConfig::from_json(
            r#"{"map": {"num_buckets": 16, "op_padding_us": 5}, "pipeline": {"workers": 3, "gate_timeout_ms": null}}"#,
        )
        .unwrap();

        assert_eq!(config.map.num_buckets, 16);
        assert_eq!(config.map.op_padding_us, 5);
        assert_eq!(config.pipeline.workers, 3);
        assert_eq!(config.pipeline.gate_timeout_ms, None);
        assert_eq!(config.pipeline.thread_name_prefix, "shardkv-worker");
    }

    #[test]
    fn test_batch_config_rejects_invalid() {
        assert!(matches!(
            BatchConfig::from_json(r#"{"pipeline": {"workers": 0}}"#),
            Err(KvError::ConfigError(_))
        ));
        assert!(BatchConfig::from_json("not json").is_err());
    }
}
