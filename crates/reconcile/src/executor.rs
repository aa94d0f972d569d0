//! Execution engine - runs topic plans on a bounded worker pool

use crate::context::{CancelToken, ProgressCallback};
use crate::error::{Error, Result};
use crate::merge::merge_config;
use crate::report::format_config;
use crate::snapshot::Snapshot;
use crate::types::{Action, Outcome};
use declarations::TopicState;
use kafkakit::{ClusterAdmin, ConfigMap};
use rayon::prelude::*;
use std::sync::{Mutex, PoisonError};

/// One unit of work.
///
/// Declared topics and marked topics are separate variants so a declared
/// topic can never reach the delete path.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Task<'a> {
    /// Create a declared topic that is not on the cluster
    Create { topic: &'a TopicState },
    /// Alter the config of a declared topic that exists
    Alter { topic: &'a TopicState },
    /// Dry-run a declared topic
    Validate { topic: &'a TopicState },
    /// Delete an undeclared topic
    Delete { topic: &'a str },
}

impl<'a> Task<'a> {
    /// Task for a planned declared topic. `None` for `Action::Delete`,
    /// which only applies to marked topics.
    pub fn declared(topic: &'a TopicState, action: Action) -> Option<Self> {
        match action {
            Action::Create => Some(Self::Create { topic }),
            Action::Alter => Some(Self::Alter { topic }),
            Action::ValidateOnly => Some(Self::Validate { topic }),
            Action::Delete => None,
        }
    }

    fn name(&self) -> &str {
        match self {
            Self::Create { topic } | Self::Alter { topic } | Self::Validate { topic } => {
                &topic.name
            }
            Self::Delete { topic } => topic,
        }
    }

    fn action(&self) -> Action {
        match self {
            Self::Create { .. } => Action::Create,
            Self::Alter { .. } => Action::Alter,
            Self::Validate { .. } => Action::ValidateOnly,
            Self::Delete { .. } => Action::Delete,
        }
    }
}

/// Outcomes of a batch plus the topics never started.
#[derive(Debug, Default)]
pub(crate) struct BatchResult {
    pub outcomes: Vec<Outcome>,
    pub cancelled: Vec<String>,
}

/// Performs the admin calls for a single task.
pub(crate) struct Worker<'a> {
    pub admin: &'a dyn ClusterAdmin,
    pub snapshot: &'a Snapshot,
    pub strict: bool,
}

impl Worker<'_> {
    /// Run one task to its outcome. Never panics on admin errors.
    pub fn run(&self, task: &Task<'_>) -> Outcome {
        match *task {
            Task::Create { topic } => self.create(topic),
            Task::Alter { topic } => self.alter(topic),
            Task::Validate { topic } => self.validate(topic),
            Task::Delete { topic } => self.delete(topic),
        }
    }

    fn create(&self, topic: &TopicState) -> Outcome {
        let name = topic.name.as_str();
        let (partitions, replication) = match counts(topic) {
            Ok(counts) => counts,
            Err(e) => return failed(name, Action::Create, &e, None),
        };

        let created = self
            .admin
            .create_topic(name, partitions, replication, true)
            .and_then(|()| self.admin.create_topic(name, partitions, replication, false));
        if let Err(e) = created {
            return failed(name, Action::Create, &e.into(), None);
        }
        log::info!("Created topic {name} ({partitions} partitions, replication {replication})");

        let submitted = merge_config(name, &topic.config, None, self.strict);
        match self.admin.alter_config(name, &submitted, false) {
            Ok(()) => {
                log::info!("Altered configuration of {name}: {}", format_config(&submitted));
                Outcome::succeeded(name, Action::Create, Some(submitted))
            }
            Err(e) => failed(name, Action::Create, &e.into(), Some(submitted)),
        }
    }

    fn alter(&self, topic: &TopicState) -> Outcome {
        let name = topic.name.as_str();
        let live = match self.admin.describe_config(name) {
            Ok(live) => live,
            Err(e) => return failed(name, Action::Alter, &e.into(), None),
        };

        let submitted = merge_config(name, &topic.config, Some(live.as_slice()), self.strict);
        match self.admin.alter_config(name, &submitted, false) {
            Ok(()) => {
                log::info!("Altered configuration of {name}: {}", format_config(&submitted));
                Outcome::succeeded(name, Action::Alter, Some(submitted))
            }
            Err(e) => failed(name, Action::Alter, &e.into(), Some(submitted)),
        }
    }

    /// Existing topics get a dry-run alter with the merged map. For an
    /// absent topic the dry-run create is the whole validation, since
    /// the broker cannot alter a topic that does not exist yet.
    fn validate(&self, topic: &TopicState) -> Outcome {
        let name = topic.name.as_str();

        if !self.snapshot.contains(name) {
            let checked = counts(topic).and_then(|(partitions, replication)| {
                self.admin
                    .create_topic(name, partitions, replication, true)
                    .map_err(Error::from)
            });
            let submitted = merge_config(name, &topic.config, None, self.strict);
            return match checked {
                Ok(()) => {
                    log::info!("Topic {name} is valid");
                    Outcome::succeeded(name, Action::ValidateOnly, Some(submitted))
                }
                Err(e) => failed(name, Action::ValidateOnly, &e, None),
            };
        }

        let live = match self.admin.describe_config(name) {
            Ok(live) => live,
            Err(e) => return failed(name, Action::ValidateOnly, &e.into(), None),
        };

        let submitted = merge_config(name, &topic.config, Some(live.as_slice()), self.strict);
        match self.admin.alter_config(name, &submitted, true) {
            Ok(()) => {
                log::info!("Configuration of {name} is valid");
                Outcome::succeeded(name, Action::ValidateOnly, Some(submitted))
            }
            Err(e) => failed(name, Action::ValidateOnly, &e.into(), Some(submitted)),
        }
    }

    fn delete(&self, name: &str) -> Outcome {
        match self.admin.delete_topic(name) {
            Ok(()) => {
                log::info!("Deleted marked topic {name}");
                Outcome::succeeded(name, Action::Delete, None)
            }
            Err(e) => failed(name, Action::Delete, &e.into(), None),
        }
    }
}

fn counts(topic: &TopicState) -> Result<(i32, i16)> {
    match (topic.num_partitions, topic.replication_factor) {
        (Some(partitions), Some(replication)) => Ok((partitions, replication)),
        _ => Err(Error::IncompleteTopic {
            topic: topic.name.clone(),
        }),
    }
}

fn failed(name: &str, action: Action, err: &Error, submitted: Option<ConfigMap>) -> Outcome {
    log::warn!("Unable to {action} {name}: {err}");
    Outcome::failed(name, action, err, submitted)
}

/// Execute a batch of tasks with at most `jobs` running at once.
///
/// Cancellation is checked before each task starts; tasks that never
/// started are returned as cancelled.
pub(crate) fn execute_batch(
    worker: &Worker<'_>,
    tasks: &[Task<'_>],
    jobs: usize,
    cancel: &CancelToken,
    progress: &dyn ProgressCallback,
    label: &str,
) -> Result<BatchResult> {
    if tasks.is_empty() {
        return Ok(BatchResult::default());
    }

    progress.on_batch_start(tasks.len(), label);

    let outcomes = Mutex::new(Vec::with_capacity(tasks.len()));
    let cancelled = Mutex::new(Vec::new());

    let run_one = |task: &Task<'_>| {
        if cancel.is_cancelled() {
            push_recovering(&cancelled, task.name().to_string());
            return;
        }
        progress.on_topic_start(task.name(), task.action());
        let outcome = worker.run(task);
        progress.on_topic_complete(&outcome);
        push_recovering(&outcomes, outcome);
    };

    if jobs <= 1 || tasks.len() == 1 {
        tasks.iter().for_each(run_one);
    } else {
        let pool = rayon::ThreadPoolBuilder::new()
            .num_threads(jobs)
            .build()
            .map_err(|e| Error::Pool(e.to_string()))?;
        pool.install(|| tasks.par_iter().for_each(run_one));
    }

    progress.on_batch_complete();

    let mut cancelled = into_recovering(cancelled);
    cancelled.sort();
    if !cancelled.is_empty() {
        log::warn!("Cancelled before start: {}", cancelled.join(", "));
    }

    Ok(BatchResult {
        outcomes: into_recovering(outcomes),
        cancelled,
    })
}

fn push_recovering<T>(collector: &Mutex<Vec<T>>, item: T) {
    collector
        .lock()
        .unwrap_or_else(PoisonError::into_inner)
        .push(item);
}

fn into_recovering<T>(collector: Mutex<Vec<T>>) -> Vec<T> {
    collector.into_inner().unwrap_or_else(PoisonError::into_inner)
}
