//! # Declarations
//!
//! Topic declaration files and the desired state built from them.
//!
//! A declaration directory holds `.yaml`/`.yml` files; each YAML document
//! declares one topic:
//!
//! ```yaml
//! topic:
//!   name: orders
//!   partitions: 3
//!   replication: 2
//! config:
//!   retention.ms: 86400000
//!   cleanup.policy: null
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use std::path::Path;
//!
//! let build = declarations::load(Path::new("topics"))?;
//! for (name, topic) in &build.desired {
//!     println!("{name}: {:?} partitions", topic.num_partitions);
//! }
//! for dropped in &build.report.dropped {
//!     eprintln!("skipped {dropped}");
//! }
//! # Ok::<(), declarations::Error>(())
//! ```

#![warn(missing_docs)]
#![warn(clippy::all)]

pub mod builder;
mod error;
pub mod record;
pub mod source;
mod types;

pub use builder::{Build, BuildReport, build};
pub use error::{Error, Result};
pub use record::ConfigRecord;
pub use types::{DesiredState, DropReason, DroppedRecord, TopicState};

use std::path::Path;

/// Load a declaration directory and build its desired state.
///
/// Documents that fail to decode are reported alongside records the
/// builder dropped.
pub fn load(dir: &Path) -> Result<Build> {
    let loaded = source::load_dir(dir)?;
    let mut build = build(loaded.records);
    build.report.dropped.splice(0..0, loaded.failures);
    log::info!(
        "Loaded {} topics from {} files",
        build.desired.len(),
        loaded.files.len()
    );
    Ok(build)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::fs;
    use tempfile::TempDir;

    #[test]
    fn test_load_combines_decode_and_build_diagnostics() {
        let dir = TempDir::new().unwrap();
        fs::write(
            dir.path().join("a.yaml"),
            "topic:\n  name: orders\n  partitions: 3\n  replication: 1\n---\ntopic:\n  name: ''\n",
        )
        .unwrap();
        fs::write(dir.path().join("b.yaml"), "topic: [broken\n").unwrap();

        let build = load(dir.path()).unwrap();
        assert_eq!(build.desired.len(), 1);
        assert_eq!(build.report.dropped.len(), 2);
        assert!(matches!(build.report.dropped[0].reason, DropReason::Decode(_)));
        assert_eq!(build.report.dropped[1].reason, DropReason::MissingName);
    }
}
