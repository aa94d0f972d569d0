//! Value types exchanged with a Kafka cluster.

use serde::{Serialize, Serializer};
use std::collections::BTreeMap;
use std::fmt;

/// A topic configuration value as submitted to an alter call.
///
/// Absence of a key in a [`ConfigMap`] means "leave alone". `Reset` is the
/// deletion marker: the key goes back to its cluster default. `Set("")`
/// sets the key to the empty string.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum ConfigValue {
    /// Set the key to this value
    Set(String),
    /// Reset the key to its cluster default
    Reset,
}

impl ConfigValue {
    /// The value to set, or `None` for the deletion marker.
    pub fn as_set(&self) -> Option<&str> {
        match self {
            Self::Set(value) => Some(value),
            Self::Reset => None,
        }
    }

    /// Check if this is the deletion marker
    pub fn is_reset(&self) -> bool {
        matches!(self, Self::Reset)
    }
}

impl From<&str> for ConfigValue {
    fn from(value: &str) -> Self {
        Self::Set(value.to_string())
    }
}

impl From<String> for ConfigValue {
    fn from(value: String) -> Self {
        Self::Set(value)
    }
}

impl From<Option<String>> for ConfigValue {
    fn from(value: Option<String>) -> Self {
        value.map_or(Self::Reset, Self::Set)
    }
}

impl fmt::Display for ConfigValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Set(value) => write!(f, "{value:?}"),
            Self::Reset => write!(f, "<default>"),
        }
    }
}

// Serialized the way the declaration files spell it: a string or null.
impl Serialize for ConfigValue {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Set(value) => serializer.serialize_some(value),
            Self::Reset => serializer.serialize_none(),
        }
    }
}

/// Configuration map submitted to an alter call, ordered by key.
pub type ConfigMap = BTreeMap<String, ConfigValue>;

/// One entry of a topic's live configuration description.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigEntry {
    /// Configuration key
    pub name: String,
    /// Current value (absent for sensitive or unset keys)
    pub value: Option<String>,
    /// The value is the cluster/broker default
    pub is_default: bool,
    /// The key cannot be altered
    pub is_read_only: bool,
    /// The value is hidden by the cluster
    pub is_sensitive: bool,
}

impl ConfigEntry {
    /// A dynamic (non-default, writable) topic override.
    pub fn dynamic(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            value: Some(value.into()),
            is_default: false,
            is_read_only: false,
            is_sensitive: false,
        }
    }

    /// A key still at its default value.
    pub fn default_value(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_default: true,
            ..Self::dynamic(name, value)
        }
    }

    /// A key that cannot be altered.
    pub fn read_only(name: impl Into<String>, value: impl Into<String>) -> Self {
        Self {
            is_read_only: true,
            ..Self::dynamic(name, value)
        }
    }

    /// Whether a full-overwrite alter has to mention this key to keep or
    /// reset it. Default and read-only keys never need to be resubmitted.
    pub fn is_override(&self) -> bool {
        !self.is_default && !self.is_read_only
    }
}

/// A topic as observed on the cluster.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicDetail {
    /// Number of partitions
    pub num_partitions: i32,
    /// Replicas per partition
    pub replication_factor: i16,
    /// Non-default configuration values
    pub config: BTreeMap<String, String>,
}

impl TopicDetail {
    /// A topic with no configuration overrides.
    pub fn new(num_partitions: i32, replication_factor: i16) -> Self {
        Self {
            num_partitions,
            replication_factor,
            config: BTreeMap::new(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_config_value_distinguishes_empty_from_reset() {
        let empty = ConfigValue::from("");
        assert_eq!(empty.as_set(), Some(""));
        assert!(!empty.is_reset());

        let reset = ConfigValue::from(None);
        assert!(reset.is_reset());
        assert_eq!(reset.as_set(), None);
    }

    #[test]
    fn test_config_value_serializes_reset_as_null() {
        let mut map = ConfigMap::new();
        map.insert("cleanup.policy".into(), ConfigValue::Reset);
        map.insert("retention.ms".into(), "60000".into());

        let json = serde_json::to_string(&map).unwrap();
        assert_eq!(json, r#"{"cleanup.policy":null,"retention.ms":"60000"}"#);
    }

    #[test]
    fn test_entry_is_override() {
        assert!(ConfigEntry::dynamic("retention.ms", "1000").is_override());
        assert!(!ConfigEntry::default_value("retention.ms", "604800000").is_override());
        assert!(!ConfigEntry::read_only("segment.bytes", "1073741824").is_override());
    }
}
