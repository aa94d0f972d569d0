//! Error types for reconciliation

use thiserror::Error;

/// Errors raised while preparing or running a reconciliation
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum Error {
    /// A topic cannot be created without both counts
    #[error("cannot create {topic}: partitions and replication must both be declared")]
    IncompleteTopic {
        /// Topic name
        topic: String,
    },

    /// A cluster-admin call failed
    #[error(transparent)]
    Admin(#[from] kafkakit::Error),

    /// The worker pool could not be started
    #[error("failed to create worker pool: {0}")]
    Pool(String),
}

/// Result type for reconciliation
pub type Result<T> = std::result::Result<T, Error>;
