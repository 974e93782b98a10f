pub mod error;
pub mod types;

pub use error::{KvError, Result};
pub use types::{Command, Key, OpStage, Operation, Outcome, Request};
