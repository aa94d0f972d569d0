//! Error types for the declarations crate

use std::path::PathBuf;
use thiserror::Error;

/// Errors that abort loading declarations
#[derive(Error, Debug)]
pub enum Error {
    /// Target path does not exist or is not a directory
    #[error("not a directory: {}", .0.display())]
    NotADirectory(PathBuf),

    /// Directory could not be listed
    #[error("failed to read directory {}: {source}", .path.display())]
    ReadDir {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },

    /// Declaration file could not be read
    #[error("failed to read {}: {source}", .path.display())]
    ReadFile {
        /// Path that failed
        path: PathBuf,
        /// Underlying I/O error
        #[source]
        source: std::io::Error,
    },
}

/// Result type for declaration loading
pub type Result<T> = std::result::Result<T, Error>;
