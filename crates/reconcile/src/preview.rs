//! Read-only preview of a run.
//!
//! Describes and merges like an apply would, but never calls create,
//! alter or delete.

use crate::error::Error;
use crate::merge::merge_config;
use crate::snapshot::Snapshot;
use crate::types::Action;
use declarations::TopicState;
use kafkakit::{ClusterAdmin, ConfigEntry, ConfigMap, ConfigValue};
use serde::Serialize;

/// A config key whose value an apply would change.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ConfigChange {
    /// Config key
    pub key: String,
    /// Current override value, `None` when at the default
    pub current: Option<String>,
    /// Value that would be submitted
    pub submitted: ConfigValue,
}

/// What an apply would do to one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct PlannedTopic {
    /// Topic name
    pub topic: String,
    /// Planned action
    pub action: Action,
    /// Map an apply would submit
    pub submitted: Option<ConfigMap>,
    /// Keys whose value would change
    pub changes: Vec<ConfigChange>,
    /// Why the plan cannot run, if it cannot
    pub error: Option<String>,
}

impl PlannedTopic {
    fn new(topic: &str, action: Action) -> Self {
        Self {
            topic: topic.to_string(),
            action,
            submitted: None,
            changes: Vec::new(),
            error: None,
        }
    }
}

/// Preview a declared topic.
pub(crate) fn preview_topic(
    admin: &dyn ClusterAdmin,
    snapshot: &Snapshot,
    topic: &TopicState,
    action: Action,
    strict: bool,
) -> PlannedTopic {
    let mut planned = PlannedTopic::new(&topic.name, action);
    let exists = snapshot.contains(&topic.name);

    if !exists && (topic.num_partitions.is_none() || topic.replication_factor.is_none()) {
        let err = Error::IncompleteTopic {
            topic: topic.name.clone(),
        };
        planned.error = Some(err.to_string());
    }

    let live = if exists {
        match admin.describe_config(&topic.name) {
            Ok(live) => Some(live),
            Err(e) => {
                planned.error = Some(e.to_string());
                return planned;
            }
        }
    } else {
        None
    };

    let submitted = merge_config(&topic.name, &topic.config, live.as_deref(), strict);
    planned.changes = diff(&submitted, live.as_deref().unwrap_or_default());
    planned.submitted = Some(submitted);
    planned
}

/// Preview deleting a marked topic.
pub(crate) fn preview_delete(topic: &str) -> PlannedTopic {
    PlannedTopic::new(topic, Action::Delete)
}

fn diff(submitted: &ConfigMap, live: &[ConfigEntry]) -> Vec<ConfigChange> {
    submitted
        .iter()
        .filter_map(|(key, value)| {
            let current = live
                .iter()
                .find(|e| e.name == *key && e.is_override())
                .and_then(|e| e.value.clone());
            let unchanged = match value {
                ConfigValue::Set(v) => current.as_deref() == Some(v.as_str()),
                ConfigValue::Reset => current.is_none(),
            };
            (!unchanged).then(|| ConfigChange {
                key: key.clone(),
                current,
                submitted: value.clone(),
            })
        })
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use kafkakit::MemoryAdmin;

    fn admin() -> MemoryAdmin {
        MemoryAdmin::new()
            .with_topic("orders", 3, 2)
            .with_entry("orders", ConfigEntry::dynamic("retention.ms", "60000"))
            .with_entry("orders", ConfigEntry::dynamic("max.message.bytes", "2000000"))
            .with_entry("orders", ConfigEntry::default_value("cleanup.policy", "delete"))
    }

    #[test]
    fn test_preview_existing_topic_lists_changes() {
        let admin = admin();
        let snapshot = Snapshot::capture(&admin).unwrap();
        let topic = TopicState::new("orders")
            .with_config("retention.ms", "60000")
            .with_config("cleanup.policy", "compact");

        let planned = preview_topic(&admin, &snapshot, &topic, Action::Alter, true);

        assert!(planned.error.is_none());
        assert_eq!(
            planned.changes,
            vec![
                ConfigChange {
                    key: "cleanup.policy".into(),
                    current: None,
                    submitted: "compact".into(),
                },
                ConfigChange {
                    key: "max.message.bytes".into(),
                    current: Some("2000000".into()),
                    submitted: ConfigValue::Reset,
                },
            ]
        );
        assert!(admin.calls().iter().all(|c| !c.is_mutation()));
    }

    #[test]
    fn test_preview_new_topic_without_counts() {
        let admin = admin();
        let snapshot = Snapshot::capture(&admin).unwrap();
        let topic = TopicState::new("payments").with_config("retention.ms", "1");

        let planned = preview_topic(&admin, &snapshot, &topic, Action::Create, false);
        assert!(planned.error.is_some());
        assert_eq!(planned.submitted, Some(topic.config.clone()));
        assert_eq!(planned.changes.len(), 1);
    }
}
