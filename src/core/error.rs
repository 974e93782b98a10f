use thiserror::Error;

#[derive(Error, Debug)]
pub enum KvError {
    #[error("Parse error: {0}")]
    ParseError(String),

    #[error("Invalid configuration: {0}")]
    ConfigError(String),

    #[error("Failed to start worker {worker}: {reason}")]
    WorkerSpawn { worker: usize, reason: String },

    #[error("Worker panicked: {0}")]
    WorkerPanic(String),

    #[error("Timed out waiting for {gate} turn {seq} (gate is at turn {current})")]
    GateTimeout {
        gate: &'static str,
        seq: u64,
        current: u64,
    },

    #[error("The {gate} gate was abandoned before turn {seq}")]
    GateAbandoned { gate: &'static str, seq: u64 },

    #[error("Lock error: {0}")]
    LockError(String),

    #[error("I/O error: {0}")]
    IoError(String),
}

pub type Result<T> = std::result::Result<T, KvError>;

impl<T> From<std::sync::PoisonError<T>> for KvError {
    fn from(err: std::sync::PoisonError<T>) -> Self {
        Self::LockError(err.to_string())
    }
}

impl From<std::io::Error> for KvError {
    fn from(err: std::io::Error) -> Self {
        Self::IoError(err.to_string())
    }
}
