//! Raw records as decoded from declaration files.

use serde::Deserialize;
use serde_yaml::Value;
use std::collections::BTreeMap;

/// Topic identity key: name.
pub const KEY_NAME: &str = "name";
/// Topic identity key: partition count.
pub const KEY_PARTITIONS: &str = "partitions";
/// Topic identity key: replication factor.
pub const KEY_REPLICATION: &str = "replication";

/// One YAML document from a declaration file.
///
/// ```yaml
/// topic:
///   name: orders
///   partitions: 3
///   replication: 2
/// config:
///   retention.ms: 60000
///   cleanup.policy: null   # reset to the cluster default
/// ```
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct ConfigRecord {
    /// Topic identity fields
    #[serde(default)]
    pub topic: BTreeMap<String, Value>,
    /// Configuration keys; `null` marks a key for reset
    #[serde(default)]
    pub config: BTreeMap<String, Value>,
    /// `<file>#<document index>`
    #[serde(skip)]
    pub origin: String,
}

impl ConfigRecord {
    /// Record with no topic identity fields.
    pub fn is_empty(&self) -> bool {
        self.topic.is_empty()
    }

    /// The `topic.name` field if it is a non-empty scalar.
    pub fn name(&self) -> Option<String> {
        self.topic
            .get(KEY_NAME)
            .and_then(scalar_text)
            .filter(|n| !n.is_empty())
    }
}

/// Text of a scalar YAML value; `None` for null, lists and mappings.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::String(s) => Some(s.clone()),
        Value::Number(n) => Some(n.to_string()),
        Value::Bool(b) => Some(b.to_string()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Null | Value::Sequence(_) | Value::Mapping(_) => None,
    }
}
