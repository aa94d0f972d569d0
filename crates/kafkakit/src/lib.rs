//! # kafkakit
//!
//! Topic administration for Kafka clusters.
//!
//! This crate provides:
//! - Connection settings (broker list, protocol version, timeouts)
//! - The [`ClusterAdmin`] trait with the admin calls needed to converge
//!   topics: list, describe config, create, alter config, delete
//! - A librdkafka-backed implementation (feature `rdkafka`, on by default)
//! - An in-memory implementation for tests and dry runs
//!
//! ## Example
//!
//! ```no_run
//! use kafkakit::{AdminConfig, ClusterAdmin};
//!
//! let config = AdminConfig::new("localhost:9092", "2.8.0").unwrap();
//! let admin = kafkakit::connect(&config).unwrap();
//!
//! for (name, detail) in admin.list_topics().unwrap() {
//!     println!("{name}: {} partitions", detail.num_partitions);
//! }
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod backend;
pub mod connection;
pub mod error;
pub mod types;

pub use backend::ClusterAdmin;
pub use backend::memory::MemoryAdmin;
pub use connection::{AdminConfig, KafkaVersion};
pub use error::{Error, ErrorCategory, Result};
pub use types::{ConfigEntry, ConfigMap, ConfigValue, TopicDetail};

/// Connect to the configured cluster with the librdkafka backend.
#[cfg(feature = "rdkafka")]
pub fn connect(config: &AdminConfig) -> Result<Box<dyn ClusterAdmin>> {
    let admin = backend::rdkafka::RdKafkaAdmin::connect(config)?;
    Ok(Box::new(admin))
}
