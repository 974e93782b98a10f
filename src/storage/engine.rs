use crate::core::{Command, Key, Outcome};

/// Storage seam used by the ordered pipeline.
///
/// Each `locked_*` operation must acquire whatever lock serializes work on
/// `key`, then call `started` exactly once, then do the work and release the
/// lock. The pipeline relies on `started` firing while that lock is held.
pub trait StorageEngine: Send + Sync {
    fn locked_insert<F: FnOnce()>(&self, key: Key, value: &str, started: F) -> bool;

    fn locked_lookup<F: FnOnce()>(&self, key: Key, started: F) -> Option<String>;

    fn locked_delete<F: FnOnce()>(&self, key: Key, started: F) -> bool;

    /// Applies `command` through the matching locked operation.
    fn apply<F: FnOnce()>(&self, command: &Command, started: F) -> Outcome {
        match command {
            Command::Insert { key, value } => {
                if self.locked_insert(*key, value, started) {
                    Outcome::Inserted {
                        key: *key,
                        value: value.clone(),
                    }
                } else {
                    Outcome::InsertFailed {
                        key: *key,
                        value: value.clone(),
                    }
                }
            }
            Command::Lookup { key } => match self.locked_lookup(*key, started) {
                Some(value) => Outcome::Found { key: *key, value },
                None => Outcome::NotFound { key: *key },
            },
            Command::Delete { key } => {
                if self.locked_delete(*key, started) {
                    Outcome::Removed { key: *key }
                } else {
                    Outcome::RemoveFailed { key: *key }
                }
            }
        }
    }
}
