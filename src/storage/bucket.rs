use crate::core::Key;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Entry {
    pub key: Key,
    pub value: String,
}

/// One hash chain of the map.
///
/// Entries are kept in a `Vec` with the chain head at the *end*, so a
/// prepend is a push and iteration from head to tail walks the vector
/// backwards. Chain order carries no meaning beyond that; every lookup and
/// removal scans the whole chain.
#[derive(Debug, Default)]
pub struct Bucket {
    entries: Vec<Entry>,
}

impl Bucket {
    pub fn new() -> Self {
        Self::default()
    }

    fn position(&self, key: Key) -> Option<usize> {
        self.entries.iter().rposition(|entry| entry.key == key)
    }

    pub fn contains(&self, key: Key) -> bool {
        self.position(key).is_some()
    }

    /// Prepends a new entry. Returns false, leaving the chain untouched, if
    /// the key is already present.
    pub fn insert(&mut self, key: Key, value: &str) -> bool {
        if self.contains(key) {
            return false;
        }
        self.entries.push(Entry {
            key,
            value: value.to_string(),
        });
        true
    }

    pub fn lookup(&self, key: Key) -> Option<&str> {
        self.position(key)
            .map(|idx| self.entries[idx].value.as_str())
    }

    /// Unlinks the entry for `key`. Head, middle and tail removals all keep
    /// the relative order of the remaining entries.
    pub fn remove(&mut self, key: Key) -> Option<Entry> {
        self.position(key).map(|idx| self.entries.remove(idx))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Keys from chain head (newest) to tail (oldest).
    pub fn keys(&self) -> impl Iterator<Item = Key> + '_ {
        self.entries.iter().rev().map(|entry| entry.key)
    }
}
