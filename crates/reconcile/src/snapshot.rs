//! Observed cluster state, captured once per run.

use kafkakit::{ClusterAdmin, TopicDetail};
use std::collections::BTreeMap;

/// Topics as listed at prepare time. Never refreshed during a run.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Snapshot {
    topics: BTreeMap<String, TopicDetail>,
}

impl Snapshot {
    /// List the cluster's topics.
    pub fn capture(admin: &dyn ClusterAdmin) -> kafkakit::Result<Self> {
        let topics = admin.list_topics()?;
        for (name, detail) in &topics {
            log::debug!(
                "Observed topic {name} ({} partitions, replication {}, {} overrides)",
                detail.num_partitions,
                detail.replication_factor,
                detail.config.len()
            );
        }
        Ok(Self { topics })
    }

    /// Build from an already-known topic map
    pub fn from_topics(topics: BTreeMap<String, TopicDetail>) -> Self {
        Self { topics }
    }

    /// Check if a topic exists
    pub fn contains(&self, name: &str) -> bool {
        self.topics.contains_key(name)
    }

    /// Get a topic's details
    pub fn get(&self, name: &str) -> Option<&TopicDetail> {
        self.topics.get(name)
    }

    /// Topic names in order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.topics.keys().map(String::as_str)
    }

    /// Number of observed topics
    pub fn len(&self) -> usize {
        self.topics.len()
    }

    /// Check if no topics were observed
    pub fn is_empty(&self) -> bool {
        self.topics.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafkakit::MemoryAdmin;

    #[test]
    fn test_capture_lists_user_topics() {
        let admin = MemoryAdmin::new()
            .with_topic("orders", 3, 2)
            .with_topic("__consumer_offsets", 50, 3);

        let snapshot = Snapshot::capture(&admin).unwrap();
        assert!(snapshot.contains("orders"));
        assert!(!snapshot.contains("__consumer_offsets"));
        assert_eq!(snapshot.get("orders").unwrap().num_partitions, 3);
        assert_eq!(snapshot.names().collect::<Vec<_>>(), vec!["orders"]);
    }
}
