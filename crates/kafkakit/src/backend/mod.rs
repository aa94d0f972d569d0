//! Backend abstraction for cluster administration.
//!
//! The [`ClusterAdmin`] trait defines the five admin calls reconciliation
//! needs, allowing for different implementations (librdkafka, in-memory
//! for testing).

pub mod memory;
#[cfg(feature = "rdkafka")]
pub mod rdkafka;

use crate::error::Result;
use crate::types::{ConfigEntry, ConfigMap, TopicDetail};
use std::collections::BTreeMap;

/// Backend trait for Kafka admin operations.
///
/// Implementations must be shareable across worker threads; every call
/// blocks until the cluster answers or the operation times out.
pub trait ClusterAdmin: Send + Sync {
    /// List all user topics with their partition count, replication
    /// factor and non-default configuration.
    fn list_topics(&self) -> Result<BTreeMap<String, TopicDetail>>;

    /// Describe the full live configuration of a topic.
    fn describe_config(&self, topic: &str) -> Result<Vec<ConfigEntry>>;

    /// Create a topic. With `validate_only` the cluster only checks the
    /// request.
    fn create_topic(
        &self,
        topic: &str,
        num_partitions: i32,
        replication_factor: i16,
        validate_only: bool,
    ) -> Result<()>;

    /// Replace the configuration of a topic.
    ///
    /// This is a total overwrite: keys not present in `config` and keys
    /// mapped to [`ConfigValue::Reset`](crate::ConfigValue::Reset) go back
    /// to their defaults.
    fn alter_config(&self, topic: &str, config: &ConfigMap, validate_only: bool) -> Result<()>;

    /// Delete a topic.
    fn delete_topic(&self, topic: &str) -> Result<()>;
}

/// Topics managed by the cluster itself (`__consumer_offsets`, ...).
pub fn is_internal_topic(name: &str) -> bool {
    name.starts_with("__")
}
