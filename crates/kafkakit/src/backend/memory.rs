//! In-memory cluster backend.
//!
//! Models the admin semantics that matter for reconciliation (alter is a
//! total overwrite, default and read-only keys are not overrides), records
//! every call, and can be told to fail specific operations.

use crate::backend::{ClusterAdmin, is_internal_topic};
use crate::error::{Error, Result};
use crate::types::{ConfigEntry, ConfigMap, ConfigValue, TopicDetail};
use std::collections::BTreeMap;
use std::sync::{Mutex, MutexGuard, PoisonError};

/// Admin operations, used to target injected failures.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum Operation {
    ListTopics,
    DescribeConfig,
    CreateTopic,
    AlterConfig,
    DeleteTopic,
}

/// A recorded call against the backend.
#[derive(Debug, Clone, PartialEq, Eq)]
#[allow(missing_docs)]
pub enum AdminCall {
    ListTopics,
    DescribeConfig {
        topic: String,
    },
    CreateTopic {
        topic: String,
        num_partitions: i32,
        replication_factor: i16,
        validate_only: bool,
    },
    AlterConfig {
        topic: String,
        config: ConfigMap,
        validate_only: bool,
    },
    DeleteTopic {
        topic: String,
    },
}

impl AdminCall {
    /// Whether the call changes cluster state.
    pub fn is_mutation(&self) -> bool {
        match self {
            Self::ListTopics | Self::DescribeConfig { .. } => false,
            Self::CreateTopic { validate_only, .. } | Self::AlterConfig { validate_only, .. } => {
                !validate_only
            }
            Self::DeleteTopic { .. } => true,
        }
    }

    /// Topic the call targeted, if any.
    pub fn topic(&self) -> Option<&str> {
        match self {
            Self::ListTopics => None,
            Self::DescribeConfig { topic }
            | Self::CreateTopic { topic, .. }
            | Self::AlterConfig { topic, .. }
            | Self::DeleteTopic { topic } => Some(topic),
        }
    }
}

/// A topic held by [`MemoryAdmin`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MemoryTopic {
    /// Number of partitions
    pub num_partitions: i32,
    /// Replicas per partition
    pub replication_factor: i16,
    /// Keys at their default value plus read-only keys
    pub fixed: Vec<ConfigEntry>,
    /// Non-default writable values
    pub overrides: BTreeMap<String, String>,
}

impl MemoryTopic {
    fn new(num_partitions: i32, replication_factor: i16) -> Self {
        Self {
            num_partitions,
            replication_factor,
            fixed: Vec::new(),
            overrides: BTreeMap::new(),
        }
    }

    fn describe(&self) -> Vec<ConfigEntry> {
        let mut entries: Vec<ConfigEntry> = self
            .fixed
            .iter()
            .filter(|e| e.is_read_only || !self.overrides.contains_key(&e.name))
            .cloned()
            .collect();
        entries.extend(
            self.overrides
                .iter()
                .map(|(name, value)| ConfigEntry::dynamic(name.as_str(), value.as_str())),
        );
        entries.sort_by(|a, b| a.name.cmp(&b.name));
        entries
    }

    fn is_read_only(&self, key: &str) -> bool {
        self.fixed.iter().any(|e| e.is_read_only && e.name == key)
    }
}

#[derive(Debug, Default)]
struct Cluster {
    topics: BTreeMap<String, MemoryTopic>,
    calls: Vec<AdminCall>,
    failures: Vec<(Operation, Option<String>, Error)>,
}

impl Cluster {
    fn injected(&self, operation: Operation, topic: Option<&str>) -> Option<Error> {
        self.failures
            .iter()
            .find(|(op, target, _)| *op == operation && (target.is_none() || target.as_deref() == topic))
            .map(|(_, _, err)| err.clone())
    }

    fn topic(&self, name: &str) -> Result<&MemoryTopic> {
        self.topics.get(name).ok_or_else(|| Error::UnknownTopic {
            name: name.to_string(),
        })
    }
}

/// Cluster backend kept entirely in memory.
#[derive(Debug, Default)]
pub struct MemoryAdmin {
    cluster: Mutex<Cluster>,
}

impl MemoryAdmin {
    /// Create an empty cluster
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a topic.
    pub fn with_topic(self, name: &str, num_partitions: i32, replication_factor: i16) -> Self {
        self.lock()
            .topics
            .insert(name.to_string(), MemoryTopic::new(num_partitions, replication_factor));
        self
    }

    /// Add a live config entry to an existing topic.
    ///
    /// Override entries (non-default, writable) become topic overrides,
    /// everything else is kept as a fixed entry. Unknown topics are ignored.
    pub fn with_entry(self, topic: &str, entry: ConfigEntry) -> Self {
        if let Some(t) = self.lock().topics.get_mut(topic) {
            match (entry.is_override(), entry.value.clone()) {
                (true, Some(value)) => {
                    t.overrides.insert(entry.name, value);
                }
                _ => t.fixed.push(entry),
            }
        }
        self
    }

    /// Make an operation fail. `topic = None` fails it for every topic.
    pub fn fail(self, operation: Operation, topic: Option<&str>, error: Error) -> Self {
        self.lock()
            .failures
            .push((operation, topic.map(str::to_string), error));
        self
    }

    /// All calls made so far, in order
    pub fn calls(&self) -> Vec<AdminCall> {
        self.lock().calls.clone()
    }

    /// Snapshot of a topic's current state
    pub fn topic(&self, name: &str) -> Option<MemoryTopic> {
        self.lock().topics.get(name).cloned()
    }

    /// Names of all topics
    pub fn topic_names(&self) -> Vec<String> {
        self.lock().topics.keys().cloned().collect()
    }

    fn lock(&self) -> MutexGuard<'_, Cluster> {
        self.cluster.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl ClusterAdmin for MemoryAdmin {
    fn list_topics(&self) -> Result<BTreeMap<String, TopicDetail>> {
        let mut cluster = self.lock();
        cluster.calls.push(AdminCall::ListTopics);
        if let Some(err) = cluster.injected(Operation::ListTopics, None) {
            return Err(err);
        }

        Ok(cluster
            .topics
            .iter()
            .filter(|(name, _)| !is_internal_topic(name))
            .map(|(name, t)| {
                let mut detail = TopicDetail::new(t.num_partitions, t.replication_factor);
                detail.config = t.overrides.clone();
                (name.clone(), detail)
            })
            .collect())
    }

    fn describe_config(&self, topic: &str) -> Result<Vec<ConfigEntry>> {
        let mut cluster = self.lock();
        cluster.calls.push(AdminCall::DescribeConfig {
            topic: topic.to_string(),
        });
        if let Some(err) = cluster.injected(Operation::DescribeConfig, Some(topic)) {
            return Err(err);
        }

        Ok(cluster.topic(topic)?.describe())
    }

    fn create_topic(
        &self,
        topic: &str,
        num_partitions: i32,
        replication_factor: i16,
        validate_only: bool,
    ) -> Result<()> {
        let mut cluster = self.lock();
        cluster.calls.push(AdminCall::CreateTopic {
            topic: topic.to_string(),
            num_partitions,
            replication_factor,
            validate_only,
        });
        if let Some(err) = cluster.injected(Operation::CreateTopic, Some(topic)) {
            return Err(err);
        }

        if cluster.topics.contains_key(topic) {
            return Err(Error::TopicExists {
                name: topic.to_string(),
            });
        }
        if num_partitions <= 0 || replication_factor <= 0 {
            return Err(Error::InvalidRequest {
                topic: topic.to_string(),
                message: "partitions and replication factor must be positive".to_string(),
            });
        }

        if !validate_only {
            cluster.topics.insert(
                topic.to_string(),
                MemoryTopic::new(num_partitions, replication_factor),
            );
        }
        Ok(())
    }

    fn alter_config(&self, topic: &str, config: &ConfigMap, validate_only: bool) -> Result<()> {
        let mut cluster = self.lock();
        cluster.calls.push(AdminCall::AlterConfig {
            topic: topic.to_string(),
            config: config.clone(),
            validate_only,
        });
        if let Some(err) = cluster.injected(Operation::AlterConfig, Some(topic)) {
            return Err(err);
        }

        let current = cluster.topic(topic)?;
        if let Some(key) = config.keys().find(|k| current.is_read_only(k)) {
            return Err(Error::InvalidRequest {
                topic: topic.to_string(),
                message: format!("{key} is read-only"),
            });
        }

        if !validate_only {
            let overrides = config
                .iter()
                .filter_map(|(k, v)| match v {
                    ConfigValue::Set(value) => Some((k.clone(), value.clone())),
                    ConfigValue::Reset => None,
                })
                .collect();
            if let Some(t) = cluster.topics.get_mut(topic) {
                t.overrides = overrides;
            }
        }
        Ok(())
    }

    fn delete_topic(&self, topic: &str) -> Result<()> {
        let mut cluster = self.lock();
        cluster.calls.push(AdminCall::DeleteTopic {
            topic: topic.to_string(),
        });
        if let Some(err) = cluster.injected(Operation::DeleteTopic, Some(topic)) {
            return Err(err);
        }

        cluster
            .topics
            .remove(topic)
            .map(|_| ())
            .ok_or_else(|| Error::UnknownTopic {
                name: topic.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cluster() -> MemoryAdmin {
        MemoryAdmin::new()
            .with_topic("orders", 3, 2)
            .with_entry("orders", ConfigEntry::dynamic("retention.ms", "60000"))
            .with_entry("orders", ConfigEntry::default_value("cleanup.policy", "delete"))
            .with_entry("orders", ConfigEntry::read_only("segment.bytes", "1073741824"))
            .with_topic("__consumer_offsets", 50, 3)
    }

    #[test]
    fn test_list_topics_skips_internal() {
        let admin = cluster();
        let topics = admin.list_topics().unwrap();
        assert_eq!(topics.keys().collect::<Vec<_>>(), vec!["orders"]);
        assert_eq!(topics["orders"].config["retention.ms"], "60000");
    }

    #[test]
    fn test_alter_is_total_overwrite() {
        let admin = cluster().with_entry("orders", ConfigEntry::dynamic("max.message.bytes", "2000000"));

        let mut config = ConfigMap::new();
        config.insert("retention.ms".into(), "1000".into());
        config.insert("cleanup.policy".into(), "compact".into());
        admin.alter_config("orders", &config, false).unwrap();

        let topic = admin.topic("orders").unwrap();
        assert_eq!(topic.overrides.len(), 2);
        assert_eq!(topic.overrides["cleanup.policy"], "compact");
        assert!(!topic.overrides.contains_key("max.message.bytes"));

        // Resetting brings the default entry back in the description.
        let mut config = ConfigMap::new();
        config.insert("cleanup.policy".into(), ConfigValue::Reset);
        admin.alter_config("orders", &config, false).unwrap();

        let entries = admin.describe_config("orders").unwrap();
        let policy = entries.iter().find(|e| e.name == "cleanup.policy").unwrap();
        assert!(policy.is_default);
        assert_eq!(policy.value.as_deref(), Some("delete"));
    }

    #[test]
    fn test_validate_only_does_not_mutate() {
        let admin = cluster();
        let mut config = ConfigMap::new();
        config.insert("retention.ms".into(), "1".into());
        admin.alter_config("orders", &config, true).unwrap();
        admin.create_topic("payments", 1, 1, true).unwrap();

        assert_eq!(admin.topic("orders").unwrap().overrides["retention.ms"], "60000");
        assert!(admin.topic("payments").is_none());
        assert!(admin.calls().iter().all(|c| !c.is_mutation()));
    }

    #[test]
    fn test_read_only_keys_are_rejected() {
        let admin = cluster();
        let mut config = ConfigMap::new();
        config.insert("segment.bytes".into(), "1".into());
        let err = admin.alter_config("orders", &config, false).unwrap_err();
        assert!(matches!(err, Error::InvalidRequest { .. }));
    }

    #[test]
    fn test_injected_failures() {
        let admin = cluster().fail(
            Operation::DeleteTopic,
            Some("orders"),
            Error::Authorization {
                message: "denied".into(),
            },
        );
        assert!(admin.delete_topic("orders").is_err());
        assert!(admin.topic("orders").is_some());
        assert!(matches!(
            admin.delete_topic("missing"),
            Err(Error::UnknownTopic { .. })
        ));
    }

    #[test]
    fn test_create_rejects_existing_and_non_positive() {
        let admin = cluster();
        assert!(matches!(
            admin.create_topic("orders", 1, 1, false),
            Err(Error::TopicExists { .. })
        ));
        assert!(matches!(
            admin.create_topic("payments", 0, 1, false),
            Err(Error::InvalidRequest { .. })
        ));
        admin.create_topic("payments", 6, 3, false).unwrap();
        assert_eq!(admin.topic("payments").unwrap().num_partitions, 6);
    }
}
