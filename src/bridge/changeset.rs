use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// Pending property deltas of one observable object
///
/// Entries keep the position of their first write; a later write to the same
/// property replaces the value in place (last write wins within a flush window).
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ChangeSet {
    entries: Map<String, Value>,
}

impl ChangeSet {
    /// Create an empty change set
    pub fn new() -> Self {
        Self::default()
    }

    /// Record the newest value of a property
    pub fn insert(&mut self, name: &str, value: Value) {
        // IndexMap-backed map: replacing keeps the original position
        self.entries.insert(name.to_string(), value);
    }

    /// Get the pending value of a property
    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries.get(name)
    }

    /// Drop a pending delta, keeping the order of the others
    pub fn remove(&mut self, name: &str) -> Option<Value> {
        self.entries.shift_remove(name)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.entries.contains_key(name)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Property names in recording order
    pub fn names(&self) -> Vec<&str> {
        self.entries.keys().map(String::as_str).collect()
    }

    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.entries.iter()
    }

    /// Drain all pending deltas, leaving the change set empty
    pub fn take(&mut self) -> ChangeSet {
        std::mem::take(self)
    }

    pub fn clear(&mut self) {
        self.entries.clear();
    }

    /// The deltas as a JSON object, in recording order
    pub fn to_value(&self) -> Value {
        Value::Object(self.entries.clone())
    }
}
