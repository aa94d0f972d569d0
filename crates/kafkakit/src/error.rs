//! Error types for Kafka admin operations.
//!
//! Errors are categorized so callers can tell setup problems (bad broker
//! list, unreachable cluster) apart from per-topic rejections, and give
//! the user a hint about what to do next.

use thiserror::Error;

/// Categories of admin errors.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorCategory {
    /// Broker list or protocol version could not be parsed
    Setup,
    /// Transport failure, timeout, no reachable broker
    Connection,
    /// Topic does not exist on the cluster
    NotFound,
    /// Topic already exists on the cluster
    AlreadyExists,
    /// The cluster rejected the request contents (bad config, policy)
    InvalidRequest,
    /// Missing ACLs for the operation
    Authorization,
    /// Other/unknown errors
    Other,
}

impl ErrorCategory {
    /// Get a user-friendly description of this error category.
    pub fn description(&self) -> &'static str {
        match self {
            Self::Setup => "Invalid connection settings",
            Self::Connection => "Cluster unreachable",
            Self::NotFound => "Topic not found",
            Self::AlreadyExists => "Topic already exists",
            Self::InvalidRequest => "Request rejected by the cluster",
            Self::Authorization => "Not authorized",
            Self::Other => "Unexpected error",
        }
    }

    /// Get actionable advice for resolving this error category.
    pub fn advice(&self) -> &'static str {
        match self {
            Self::Setup => "Check the --brokers and --kafka-version values",
            Self::Connection => "Check that the brokers are reachable and try again",
            Self::NotFound => "Verify the topic name or let the topic be created first",
            Self::AlreadyExists => "No action needed - the topic is already there",
            Self::InvalidRequest => "Check the declared partitions, replication and config keys",
            Self::Authorization => "Grant the client the required topic/cluster ACLs",
            Self::Other => "Check the error details for more information",
        }
    }
}

/// Errors that can occur during Kafka admin operations.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// The broker list is empty or malformed
    #[error("invalid broker list: {0}")]
    InvalidBrokers(String),

    /// The protocol version string could not be parsed
    #[error("invalid Kafka version: {0}")]
    InvalidVersion(String),

    /// Transport failure, timeout or no broker available
    #[error("connection error: {message}")]
    Connection {
        /// Details from the client library
        message: String,
    },

    /// Topic does not exist
    #[error("unknown topic: {name}")]
    UnknownTopic {
        /// Name of the missing topic
        name: String,
    },

    /// Topic already exists
    #[error("topic already exists: {name}")]
    TopicExists {
        /// Name of the existing topic
        name: String,
    },

    /// The cluster refused the request contents
    #[error("invalid request for {topic}: {message}")]
    InvalidRequest {
        /// Topic the request targeted
        topic: String,
        /// Reason reported by the cluster
        message: String,
    },

    /// Missing authorization
    #[error("not authorized: {message}")]
    Authorization {
        /// Operation and reason
        message: String,
    },

    /// Any other error code returned for a topic operation
    #[error("{operation} failed for {topic}: {message}")]
    Rejected {
        /// Admin operation that failed
        operation: String,
        /// Topic the operation targeted
        topic: String,
        /// Reason reported by the cluster
        message: String,
    },

    /// Other error
    #[error("{0}")]
    Other(String),
}

impl Error {
    /// Get the error category.
    pub fn category(&self) -> ErrorCategory {
        match self {
            Error::InvalidBrokers(_) | Error::InvalidVersion(_) => ErrorCategory::Setup,
            Error::Connection { .. } => ErrorCategory::Connection,
            Error::UnknownTopic { .. } => ErrorCategory::NotFound,
            Error::TopicExists { .. } => ErrorCategory::AlreadyExists,
            Error::InvalidRequest { .. } => ErrorCategory::InvalidRequest,
            Error::Authorization { .. } => ErrorCategory::Authorization,
            Error::Rejected { .. } | Error::Other(_) => ErrorCategory::Other,
        }
    }
}

#[cfg(feature = "rdkafka")]
mod librdkafka {
    use super::Error;
    use rdkafka::error::KafkaError;
    use rdkafka::types::RDKafkaErrorCode;

    impl Error {
        /// Classify an error code returned for a single topic.
        pub fn from_code(operation: &str, topic: &str, code: RDKafkaErrorCode) -> Self {
            match code {
                RDKafkaErrorCode::UnknownTopicOrPartition | RDKafkaErrorCode::UnknownTopic => {
                    Error::UnknownTopic {
                        name: topic.to_string(),
                    }
                }
                RDKafkaErrorCode::TopicAlreadyExists => Error::TopicExists {
                    name: topic.to_string(),
                },
                RDKafkaErrorCode::InvalidConfig
                | RDKafkaErrorCode::InvalidPartitions
                | RDKafkaErrorCode::InvalidReplicationFactor
                | RDKafkaErrorCode::PolicyViolation
                | RDKafkaErrorCode::InvalidRequest => Error::InvalidRequest {
                    topic: topic.to_string(),
                    message: code.to_string(),
                },
                RDKafkaErrorCode::TopicAuthorizationFailed
                | RDKafkaErrorCode::ClusterAuthorizationFailed => Error::Authorization {
                    message: format!("{operation} on {topic}: {code}"),
                },
                RDKafkaErrorCode::BrokerTransportFailure
                | RDKafkaErrorCode::AllBrokersDown
                | RDKafkaErrorCode::OperationTimedOut
                | RDKafkaErrorCode::RequestTimedOut => Error::Connection {
                    message: format!("{operation} on {topic}: {code}"),
                },
                _ => Error::Rejected {
                    operation: operation.to_string(),
                    topic: topic.to_string(),
                    message: code.to_string(),
                },
            }
        }

        /// Classify a client-level error.
        pub fn from_kafka(operation: &str, topic: &str, err: KafkaError) -> Self {
            if let Some(code) = err.rdkafka_error_code() {
                return Self::from_code(operation, topic, code);
            }

            match err {
                KafkaError::ClientCreation(message) => Error::Connection { message },
                other => Error::Other(format!("{operation} failed for {topic}: {other}")),
            }
        }
    }
}

/// Result type for admin operations.
pub type Result<T> = std::result::Result<T, Error>;
