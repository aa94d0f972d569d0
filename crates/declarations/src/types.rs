//! Core types for topic declarations

use kafkakit::ConfigMap;
use serde::Serialize;
use std::collections::BTreeMap;
use std::fmt;

/// A topic as the user declared it.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TopicState {
    /// Topic name, never empty
    pub name: String,
    /// Desired partition count; `None` when unspecified
    pub num_partitions: Option<i32>,
    /// Desired replication factor; `None` when unspecified
    pub replication_factor: Option<i16>,
    /// Declared configuration keys
    pub config: ConfigMap,
}

impl TopicState {
    /// A topic with unspecified counts and no config
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            num_partitions: None,
            replication_factor: None,
            config: ConfigMap::new(),
        }
    }

    /// Set both counts
    pub fn with_counts(mut self, num_partitions: i32, replication_factor: i16) -> Self {
        self.num_partitions = Some(num_partitions);
        self.replication_factor = Some(replication_factor);
        self
    }

    /// Declare a config key
    pub fn with_config(mut self, key: &str, value: impl Into<kafkakit::ConfigValue>) -> Self {
        self.config.insert(key.to_string(), value.into());
        self
    }
}

/// Declared topics keyed by name.
pub type DesiredState = BTreeMap<String, TopicState>;

/// Why a record was left out of the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "detail", rename_all = "snake_case")]
pub enum DropReason {
    /// `topic.name` missing or empty
    MissingName,
    /// `topic.partitions` is not an integer fitting 32 bits
    InvalidPartitions(String),
    /// `topic.replication` is not an integer fitting 16 bits
    InvalidReplication(String),
    /// A topic field holds a list or mapping
    InvalidTopicField(String),
    /// A config key holds a list or mapping
    InvalidConfigValue(String),
    /// The YAML document could not be decoded; later documents of the
    /// same file are skipped
    Decode(String),
}

impl fmt::Display for DropReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MissingName => write!(f, "missing topic name"),
            Self::InvalidPartitions(v) => write!(f, "invalid partitions {v:?}"),
            Self::InvalidReplication(v) => write!(f, "invalid replication {v:?}"),
            Self::InvalidTopicField(k) => write!(f, "topic.{k} must be a scalar"),
            Self::InvalidConfigValue(k) => write!(f, "config.{k} must be a scalar or null"),
            Self::Decode(msg) => write!(f, "decode error: {msg}"),
        }
    }
}

/// A record that did not make it into the desired state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DroppedRecord {
    /// `<file>#<document index>`
    pub origin: String,
    /// Topic name, when one could be read
    pub name: Option<String>,
    /// Reason for dropping
    pub reason: DropReason,
}

impl fmt::Display for DroppedRecord {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.name {
            Some(name) => write!(f, "{} ({name}): {}", self.origin, self.reason),
            None => write!(f, "{}: {}", self.origin, self.reason),
        }
    }
}
