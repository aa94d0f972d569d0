//! Run report - what happened to every topic.

use crate::types::{Action, Outcome};
use declarations::{BuildReport, DroppedRecord};
use kafkakit::ConfigMap;
use serde::Serialize;

/// Counters over a run's outcomes.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct Summary {
    /// Topics created
    pub created: usize,
    /// Existing topics altered
    pub altered: usize,
    /// Topics validated in validate mode
    pub validated: usize,
    /// Marked topics deleted
    pub deleted: usize,
    /// Topics whose calls failed
    pub failed: usize,
    /// Topics never started because the run was cancelled
    pub cancelled: usize,
}

impl Summary {
    /// Add an outcome to the summary
    pub fn add(&mut self, outcome: &Outcome) {
        if !outcome.is_success() {
            self.failed += 1;
            return;
        }
        match outcome.action {
            Action::Create => self.created += 1,
            Action::Alter => self.altered += 1,
            Action::ValidateOnly => self.validated += 1,
            Action::Delete => self.deleted += 1,
        }
    }

    /// Total number of topics the run touched or skipped
    pub fn total(&self) -> usize {
        self.created + self.altered + self.validated + self.deleted + self.failed + self.cancelled
    }

    /// Check if nothing failed
    pub fn is_success(&self) -> bool {
        self.failed == 0
    }
}

/// Everything a caller needs to present the result of a run.
#[derive(Debug, Clone, Default, Serialize)]
pub struct RunReport {
    /// Undeclared keys were reset and undeclared topics marked
    pub strict: bool,
    /// Only dry-run validation was performed
    pub validate: bool,
    /// Topics observed on the cluster at prepare time
    pub observed: Vec<String>,
    /// Declared topic names in input order
    pub entries: Vec<String>,
    /// Topics marked for deletion
    pub marked: Vec<String>,
    /// Outcomes for declared topics, sorted by name
    pub outcomes: Vec<Outcome>,
    /// Outcomes for marked topics, sorted by name
    pub deletions: Vec<Outcome>,
    /// Topics never started because the run was cancelled
    pub cancelled: Vec<String>,
    /// Records left out of the desired state
    pub dropped: Vec<DroppedRecord>,
    /// Names declared more than once
    pub duplicates: Vec<String>,
    /// Records without topic fields
    pub empty_records: usize,
    /// Counters
    pub summary: Summary,
}

impl RunReport {
    /// Attach the declaration diagnostics
    pub fn with_build_report(mut self, build: &BuildReport) -> Self {
        self.entries.clone_from(&build.entries);
        self.dropped.clone_from(&build.dropped);
        self.duplicates.clone_from(&build.duplicates);
        self.empty_records = build.empty;
        self
    }

    /// Sort outcomes and recompute the summary.
    pub fn finish(mut self) -> Self {
        self.outcomes.sort_by(|a, b| a.topic.cmp(&b.topic));
        self.deletions.sort_by(|a, b| a.topic.cmp(&b.topic));
        self.cancelled.sort();

        let mut summary = Summary {
            cancelled: self.cancelled.len(),
            ..Summary::default()
        };
        for outcome in self.outcomes.iter().chain(&self.deletions) {
            summary.add(outcome);
        }
        self.summary = summary;
        self
    }

    /// Check if no topic failed
    pub fn is_success(&self) -> bool {
        self.summary.is_success()
    }

    /// Failed outcomes, declared topics first
    pub fn failures(&self) -> impl Iterator<Item = &Outcome> {
        self.outcomes
            .iter()
            .chain(&self.deletions)
            .filter(|o| !o.is_success())
    }
}

/// Render a config map as `key="value", key=<default>`.
pub fn format_config(config: &ConfigMap) -> String {
    if config.is_empty() {
        return "(none)".to_string();
    }
    config
        .iter()
        .map(|(k, v)| format!("{k}={v}"))
        .collect::<Vec<_>>()
        .join(", ")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;
    use kafkakit::ConfigValue;

    fn ok(topic: &str, action: Action) -> Outcome {
        Outcome::succeeded(topic, action, None)
    }

    #[test]
    fn test_finish_sorts_and_counts() {
        let err = Error::IncompleteTopic {
            topic: "b".into(),
        };
        let report = RunReport {
            outcomes: vec![
                ok("c", Action::Alter),
                Outcome::failed("b", Action::Create, &err, None),
                ok("a", Action::Create),
            ],
            deletions: vec![ok("z", Action::Delete)],
            cancelled: vec!["y".into(), "x".into()],
            ..RunReport::default()
        }
        .finish();

        let names: Vec<_> = report.outcomes.iter().map(|o| o.topic.as_str()).collect();
        assert_eq!(names, vec!["a", "b", "c"]);
        assert_eq!(report.cancelled, vec!["x", "y"]);
        assert_eq!(
            report.summary,
            Summary {
                created: 1,
                altered: 1,
                validated: 0,
                deleted: 1,
                failed: 1,
                cancelled: 2,
            }
        );
        assert_eq!(report.summary.total(), 6);
        assert!(!report.is_success());
        assert_eq!(report.failures().count(), 1);
    }

    #[test]
    fn test_format_config() {
        let mut config = ConfigMap::new();
        assert_eq!(format_config(&config), "(none)");

        config.insert("retention.ms".into(), "1000".into());
        config.insert("cleanup.policy".into(), ConfigValue::Reset);
        assert_eq!(
            format_config(&config),
            r#"cleanup.policy=<default>, retention.ms="1000""#
        );
    }

    #[test]
    fn test_report_serializes() {
        let report = RunReport {
            strict: true,
            marked: vec!["legacy".into()],
            outcomes: vec![ok("orders", Action::Alter)],
            ..RunReport::default()
        }
        .finish();

        let json = serde_json::to_value(&report).unwrap();
        assert_eq!(json["marked"][0], "legacy");
        assert_eq!(json["outcomes"][0]["status"], "succeeded");
        assert_eq!(json["summary"]["altered"], 1);
    }
}
