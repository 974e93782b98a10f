use std::fmt;

pub type Key = i64;

/// A single typed operation against the map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Insert { key: Key, value: String },
    Lookup { key: Key },
    Delete { key: Key },
}

impl Command {
    pub fn insert(key: Key, value: impl Into<String>) -> Self {
        Self::Insert {
            key,
            value: value.into(),
        }
    }

    pub fn lookup(key: Key) -> Self {
        Self::Lookup { key }
    }

    pub fn delete(key: Key) -> Self {
        Self::Delete { key }
    }

    pub fn key(&self) -> Key {
        match self {
            Self::Insert { key, .. } | Self::Lookup { key } | Self::Delete { key } => *key,
        }
    }

    pub fn kind(&self) -> &'static str {
        match self {
            Self::Insert { .. } => "insert",
            Self::Lookup { .. } => "lookup",
            Self::Delete { .. } => "delete",
        }
    }
}

/// What the pipeline consumes.
///
/// A line that failed to parse still occupies a slot in the batch so its
/// error result is reported at the position it was submitted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Request {
    Command(Command),
    Malformed { line: String, reason: String },
}

impl From<Command> for Request {
    fn from(command: Command) -> Self {
        Self::Command(command)
    }
}

/// A request tagged with the sequence number it was claimed under.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Operation {
    pub seq: u64,
    pub request: Request,
}

/// Lifecycle of one operation inside the pipeline. Stages only move forward.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum OpStage {
    Claimed,
    AwaitingBegin,
    Began,
    Executing,
    AwaitingOutput,
    Output,
    Done,
}

impl fmt::Display for OpStage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Claimed => "claimed",
            Self::AwaitingBegin => "awaiting-begin",
            Self::Began => "began",
            Self::Executing => "executing",
            Self::AwaitingOutput => "awaiting-output",
            Self::Output => "output",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// Result of applying one request. Domain failures are outcomes, not errors.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Outcome {
    Inserted { key: Key, value: String },
    InsertFailed { key: Key, value: String },
    Found { key: Key, value: String },
    NotFound { key: Key },
    Removed { key: Key },
    RemoveFailed { key: Key },
    Malformed { line: String, reason: String },
}

impl Outcome {
    pub fn is_success(&self) -> bool {
        matches!(
            self,
            Self::Inserted { .. } | Self::Found { .. } | Self::Removed { .. }
        )
    }
}

impl fmt::Display for Outcome {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Inserted { key, value } => write!(f, "[Success] inserted {} at {}", value, key),
            // Key and value order is swapped relative to the success line.
            Self::InsertFailed { key, value } => {
                write!(f, "[Error] failed to insert {} at {}", key, value)
            }
            Self::Found { key, value } => {
                write!(f, "[Success] Found \"{}\" from key {}", value, key)
            }
            Self::NotFound { key } => write!(f, "[Error] failed to locate {}", key),
            Self::Removed { key } => write!(f, "[Success] removed {}", key),
            Self::RemoveFailed { key } => {
                write!(f, "[Error] failed to remove {}: value not found", key)
            }
            Self::Malformed { line, reason } => {
                write!(f, "[Error] malformed operation \"{}\": {}", line, reason)
            }
        }
    }
}
