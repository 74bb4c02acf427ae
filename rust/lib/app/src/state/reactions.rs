//! In-flight reactions, stored at `reactions/pending`.

use std::collections::BTreeSet;

/// Keys of reaction targets with a request outstanding.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PendingReactions(pub BTreeSet<String>);

impl PendingReactions {
    pub const PATH: &'static str = "reactions/pending";

    /// Mark `key` in flight. False if it already was.
    pub fn claim(&mut self, key: &str) -> bool {
        self.0.insert(key.to_string())
    }

    pub fn release(&mut self, key: &str) {
        self.0.remove(key);
    }

    pub fn contains(&self, key: &str) -> bool {
        self.0.contains(key)
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}
