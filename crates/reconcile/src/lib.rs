//! # Reconcile
//!
//! Converge Kafka topics to a declared state.
//!
//! ## Core Concepts
//!
//! - **Snapshot**: the cluster's topics, listed once at prepare time
//! - **Plan**: per topic, one of create / alter / validate / delete
//! - **Merge**: the full config map an alter submits. Alter calls
//!   overwrite the whole topic config, so undeclared live overrides are
//!   either carried forward (lenient) or reset (strict)
//! - **Report**: one outcome per topic that started, sorted by name
//!
//! ## Example
//!
//! ```no_run
//! use kafkakit::MemoryAdmin;
//! use reconcile::{CancelToken, NoProgress, Reconciler, RunOptions};
//! use std::path::Path;
//!
//! let build = declarations::load(Path::new("topics"))?;
//! let admin = MemoryAdmin::new().with_topic("orders", 3, 2);
//!
//! let reconciler = Reconciler::prepare(&admin, build.desired, RunOptions::default())?
//!     .with_build_report(build.report);
//! let report = reconciler.apply(&CancelToken::new(), &NoProgress)?;
//! println!("{} topics altered", report.summary.altered);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```
//!
//! A single topic's failure never stops the run: it is recorded on that
//! topic's [`Outcome`] and the remaining topics proceed.

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod context;
pub mod error;
mod executor;
pub mod merge;
pub mod planner;
pub mod preview;
pub mod report;
pub mod snapshot;
pub mod types;

pub use context::{CancelToken, NoProgress, ProgressCallback};
pub use error::{Error, Result};
pub use merge::merge_config;
pub use planner::{Plan, marked_for_deletion, plan_action, plan_topics};
pub use preview::{ConfigChange, PlannedTopic};
pub use report::{RunReport, Summary, format_config};
pub use snapshot::Snapshot;
pub use types::{Action, FailureCategory, Outcome, RunOptions, Status};

use declarations::{BuildReport, DesiredState};
use executor::{Task, Worker, execute_batch};
use kafkakit::ClusterAdmin;

/// A prepared reconciliation: desired state, snapshot and deletion set.
pub struct Reconciler<'a> {
    admin: &'a dyn ClusterAdmin,
    desired: DesiredState,
    build_report: BuildReport,
    snapshot: Snapshot,
    marked: Vec<String>,
    options: RunOptions,
}

impl<'a> Reconciler<'a> {
    /// Capture the cluster snapshot and compute the deletion set.
    ///
    /// Fails only if the topics cannot be listed.
    pub fn prepare(
        admin: &'a dyn ClusterAdmin,
        desired: DesiredState,
        options: RunOptions,
    ) -> Result<Self> {
        let snapshot = Snapshot::capture(admin)?;
        let marked = marked_for_deletion(&desired, &snapshot, options.strict);
        log::info!(
            "Observed {} topics, {} declared, {} marked for deletion",
            snapshot.len(),
            desired.len(),
            marked.len()
        );

        Ok(Self {
            admin,
            desired,
            build_report: BuildReport::default(),
            snapshot,
            marked,
            options,
        })
    }

    /// Carry the declaration diagnostics into the run report
    pub fn with_build_report(mut self, report: BuildReport) -> Self {
        self.build_report = report;
        self
    }

    /// Observed cluster state
    pub fn snapshot(&self) -> &Snapshot {
        &self.snapshot
    }

    /// Declared topics
    pub fn desired(&self) -> &DesiredState {
        &self.desired
    }

    /// Topics marked for deletion (strict mode)
    pub fn marked(&self) -> &[String] {
        &self.marked
    }

    /// Run options
    pub fn options(&self) -> &RunOptions {
        &self.options
    }

    /// Whether `apply` will delete topics
    pub fn deletes(&self) -> bool {
        self.options.strict && !self.options.validate && !self.marked.is_empty()
    }

    /// Planned action for every declared topic
    pub fn plans(&self) -> Vec<Plan> {
        plan_topics(&self.desired, &self.snapshot, &self.options)
    }

    /// Describe and merge every declared topic without changing anything.
    pub fn preview(&self) -> Vec<PlannedTopic> {
        let mut planned: Vec<PlannedTopic> = self
            .plans()
            .iter()
            .filter_map(|plan| {
                let topic = self.desired.get(&plan.topic)?;
                Some(preview::preview_topic(
                    self.admin,
                    &self.snapshot,
                    topic,
                    plan.action,
                    self.options.strict,
                ))
            })
            .collect();

        if self.deletes() {
            planned.extend(self.marked.iter().map(|name| preview::preview_delete(name)));
        }
        planned
    }

    /// Execute every plan, then the deletions.
    ///
    /// Only a worker pool failure is returned as an error; everything
    /// else ends up in the report.
    pub fn apply(
        &self,
        cancel: &CancelToken,
        progress: &dyn ProgressCallback,
    ) -> Result<RunReport> {
        let worker = Worker {
            admin: self.admin,
            snapshot: &self.snapshot,
            strict: self.options.strict,
        };
        let jobs = self.options.jobs.max(1);

        let tasks: Vec<Task<'_>> = self
            .plans()
            .into_iter()
            .filter_map(|plan| {
                let topic = self.desired.get(&plan.topic)?;
                Task::declared(topic, plan.action)
            })
            .collect();
        let label = if self.options.validate { "Validating" } else { "Applying" };
        let declared = execute_batch(&worker, &tasks, jobs, cancel, progress, label)?;

        let mut report = RunReport {
            strict: self.options.strict,
            validate: self.options.validate,
            observed: self.snapshot.names().map(str::to_string).collect(),
            marked: self.marked.clone(),
            outcomes: declared.outcomes,
            cancelled: declared.cancelled,
            ..RunReport::default()
        }
        .with_build_report(&self.build_report);

        if self.deletes() {
            let deletions: Vec<Task<'_>> = self
                .marked
                .iter()
                .map(|topic| Task::Delete {
                    topic: topic.as_str(),
                })
                .collect();
            let deleted = execute_batch(&worker, &deletions, jobs, cancel, progress, "Deleting")?;
            report.deletions = deleted.outcomes;
            report.cancelled.extend(deleted.cancelled);
        }

        Ok(report.finish())
    }
}
