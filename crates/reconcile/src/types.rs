//! Core types for reconciliation

use crate::error::Error;
use kafkakit::{ConfigMap, ErrorCategory};
use serde::{Serialize, Serializer};
use std::fmt;

/// What the engine does with a topic.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Action {
    /// Create the topic, then set its declared config
    Create,
    /// Overwrite the config with the merged map
    Alter,
    /// Dry-run validation only
    ValidateOnly,
    /// Delete an undeclared topic (strict mode)
    Delete,
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Self::Create => "create",
            Self::Alter => "alter",
            Self::ValidateOnly => "validate",
            Self::Delete => "delete",
        };
        write!(f, "{s}")
    }
}

/// Options for a reconciliation run
#[derive(Debug, Clone)]
pub struct RunOptions {
    /// Reset undeclared keys and delete undeclared topics
    pub strict: bool,
    /// Only run the cluster's dry-run validation
    pub validate: bool,
    /// Number of topics processed concurrently
    pub jobs: usize,
}

impl Default for RunOptions {
    fn default() -> Self {
        Self {
            strict: false,
            validate: false,
            jobs: 4,
        }
    }
}

/// Why a topic failed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum FailureCategory {
    /// The declaration is incomplete for the planned action
    Configuration,
    /// A cluster-admin call failed
    Admin(ErrorCategory),
}

impl FailureCategory {
    /// Get a user-friendly description of this category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Configuration => "Incomplete topic declaration",
            Self::Admin(category) => category.description(),
        }
    }

    /// Get actionable advice for this category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Configuration => "Declare both partitions and replication for new topics",
            Self::Admin(category) => category.advice(),
        }
    }
}

impl From<&Error> for FailureCategory {
    fn from(err: &Error) -> Self {
        match err {
            Error::IncompleteTopic { .. } => Self::Configuration,
            Error::Admin(e) => Self::Admin(e.category()),
            Error::Pool(_) => Self::Admin(ErrorCategory::Other),
        }
    }
}

impl Serialize for FailureCategory {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Configuration => serializer.serialize_str("configuration"),
            Self::Admin(category) => category.serialize(serializer),
        }
    }
}

/// Final status of one topic.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum Status {
    /// Every call for the topic succeeded
    Succeeded,
    /// A call failed; later calls for the topic were skipped
    Failed {
        /// What kind of failure
        category: FailureCategory,
        /// Error message of the failed call
        error: String,
    },
}

/// Result of executing one plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Outcome {
    /// Topic name
    pub topic: String,
    /// Planned action
    pub action: Action,
    /// Final status
    #[serde(flatten)]
    pub status: Status,
    /// Config map sent to the alter call, if one was issued
    pub submitted: Option<ConfigMap>,
}

impl Outcome {
    /// A successful outcome
    pub fn succeeded(topic: &str, action: Action, submitted: Option<ConfigMap>) -> Self {
        Self {
            topic: topic.to_string(),
            action,
            status: Status::Succeeded,
            submitted,
        }
    }

    /// A failed outcome
    pub fn failed(topic: &str, action: Action, error: &Error, submitted: Option<ConfigMap>) -> Self {
        Self {
            topic: topic.to_string(),
            action,
            status: Status::Failed {
                category: FailureCategory::from(error),
                error: error.to_string(),
            },
            submitted,
        }
    }

    /// Check if the outcome is a success
    pub fn is_success(&self) -> bool {
        matches!(self.status, Status::Succeeded)
    }

    /// Error message, if failed
    pub fn error(&self) -> Option<&str> {
        match &self.status {
            Status::Succeeded => None,
            Status::Failed { error, .. } => Some(error),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_failure_category_from_error() {
        let err = Error::IncompleteTopic {
            topic: "orders".into(),
        };
        assert_eq!(FailureCategory::from(&err), FailureCategory::Configuration);

        let err = Error::Admin(kafkakit::Error::Authorization {
            message: "denied".into(),
        });
        assert_eq!(
            FailureCategory::from(&err),
            FailureCategory::Admin(ErrorCategory::Authorization)
        );
    }

    #[test]
    fn test_outcome_serializes_flat() {
        let err = Error::IncompleteTopic {
            topic: "orders".into(),
        };
        let outcome = Outcome::failed("orders", Action::Create, &err, None);
        let json = serde_json::to_value(&outcome).unwrap();

        assert_eq!(json["topic"], "orders");
        assert_eq!(json["action"], "create");
        assert_eq!(json["status"], "failed");
        assert_eq!(json["category"], "configuration");
        assert!(json["submitted"].is_null());
    }

    #[test]
    fn test_action_display() {
        assert_eq!(Action::ValidateOnly.to_string(), "validate");
        assert_eq!(Action::Delete.to_string(), "delete");
    }
}
