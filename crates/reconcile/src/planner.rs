//! Per-topic planning against the observed snapshot.

use crate::snapshot::Snapshot;
use crate::types::{Action, RunOptions};
use declarations::DesiredState;

/// A topic and what to do with it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Plan {
    /// Topic name
    pub topic: String,
    /// Planned action
    pub action: Action,
}

/// Decide the action for a declared topic.
///
/// Validate mode always validates; existence only matters otherwise.
pub fn plan_action(exists: bool, validate: bool) -> Action {
    match (validate, exists) {
        (true, _) => Action::ValidateOnly,
        (false, false) => Action::Create,
        (false, true) => Action::Alter,
    }
}

/// Plan every declared topic, in name order.
pub fn plan_topics(
    desired: &DesiredState,
    snapshot: &Snapshot,
    options: &RunOptions,
) -> Vec<Plan> {
    desired
        .keys()
        .map(|name| Plan {
            topic: name.clone(),
            action: plan_action(snapshot.contains(name), options.validate),
        })
        .collect()
}

/// Observed topics that are not declared. Empty unless `strict`.
pub fn marked_for_deletion(
    desired: &DesiredState,
    snapshot: &Snapshot,
    strict: bool,
) -> Vec<String> {
    if !strict {
        return Vec::new();
    }

    snapshot
        .names()
        .filter(|name| !desired.contains_key(*name))
        .inspect(|name| log::info!("Topic {name} is marked for deletion"))
        .map(str::to_string)
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;
    use declarations::TopicState;
    use kafkakit::TopicDetail;
    use std::collections::BTreeMap;

    fn snapshot(names: &[&str]) -> Snapshot {
        Snapshot::from_topics(
            names
                .iter()
                .map(|n| ((*n).to_string(), TopicDetail::new(1, 1)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn desired(names: &[&str]) -> DesiredState {
        names
            .iter()
            .map(|n| ((*n).to_string(), TopicState::new(*n)))
            .collect()
    }

    #[test]
    fn test_plan_action() {
        assert_eq!(plan_action(false, false), Action::Create);
        assert_eq!(plan_action(true, false), Action::Alter);
        assert_eq!(plan_action(false, true), Action::ValidateOnly);
        assert_eq!(plan_action(true, true), Action::ValidateOnly);
    }

    #[test]
    fn test_plan_topics() {
        let snap = snapshot(&["orders", "legacy"]);
        let plans = plan_topics(&desired(&["payments", "orders"]), &snap, &RunOptions::default());

        assert_eq!(
            plans,
            vec![
                Plan {
                    topic: "orders".into(),
                    action: Action::Alter
                },
                Plan {
                    topic: "payments".into(),
                    action: Action::Create
                },
            ]
        );
        // Planning leaves the snapshot untouched.
        assert_eq!(snap, snapshot(&["orders", "legacy"]));
    }

    #[test]
    fn test_marked_for_deletion() {
        let snap = snapshot(&["orders", "legacy", "old"]);
        let want = desired(&["orders", "new"]);

        assert_eq!(marked_for_deletion(&want, &snap, true), vec!["legacy", "old"]);
        assert!(marked_for_deletion(&want, &snap, false).is_empty());
    }
}
