//! Declaration file discovery and YAML decoding.

use crate::error::{Error, Result};
use crate::record::ConfigRecord;
use crate::types::{DropReason, DroppedRecord};
use serde::Deserialize;
use std::fs;
use std::path::{Path, PathBuf};

/// Records decoded from a directory, plus documents that failed to decode.
#[derive(Debug, Default)]
pub struct Loaded {
    /// Records in file-name then document order
    pub records: Vec<ConfigRecord>,
    /// Decode failures, at most one per file
    pub failures: Vec<DroppedRecord>,
    /// Files that were read
    pub files: Vec<PathBuf>,
}

/// Whether a path names a declaration file (`.yaml` / `.yml`).
pub fn is_declaration_file(path: &Path) -> bool {
    path.extension()
        .and_then(|e| e.to_str())
        .is_some_and(|e| e.eq_ignore_ascii_case("yaml") || e.eq_ignore_ascii_case("yml"))
}

/// List declaration files directly inside `dir`, sorted by name.
pub fn find_files(dir: &Path) -> Result<Vec<PathBuf>> {
    if !dir.is_dir() {
        return Err(Error::NotADirectory(dir.to_path_buf()));
    }

    let read_err = |source| Error::ReadDir {
        path: dir.to_path_buf(),
        source,
    };

    let mut files = Vec::new();
    for entry in fs::read_dir(dir).map_err(read_err)? {
        let path = entry.map_err(read_err)?.path();
        if path.is_file() && is_declaration_file(&path) {
            files.push(path);
        }
    }
    files.sort();
    Ok(files)
}

/// Load every declaration file in `dir`.
pub fn load_dir(dir: &Path) -> Result<Loaded> {
    let mut loaded = Loaded::default();

    for path in find_files(dir)? {
        let content = fs::read_to_string(&path).map_err(|source| Error::ReadFile {
            path: path.clone(),
            source,
        })?;
        let label = path
            .file_name()
            .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned());

        let (records, failure) = parse_str(&content, &label);
        log::debug!("{}: {} records", path.display(), records.len());
        loaded.records.extend(records);
        loaded.failures.extend(failure);
        loaded.files.push(path);
    }

    Ok(loaded)
}

/// Decode a YAML document stream. Each document is one record.
///
/// Decoding stops at the first bad document; records before it are kept
/// and the failure is returned alongside them.
pub fn parse_str(content: &str, label: &str) -> (Vec<ConfigRecord>, Option<DroppedRecord>) {
    let mut records = Vec::new();

    for (index, document) in serde_yaml::Deserializer::from_str(content).enumerate() {
        let origin = format!("{label}#{index}");
        match Option::<ConfigRecord>::deserialize(document) {
            Ok(record) => {
                let mut record = record.unwrap_or_default();
                record.origin = origin;
                records.push(record);
            }
            Err(e) => {
                log::warn!("{origin}: {e}");
                let failure = DroppedRecord {
                    origin,
                    name: None,
                    reason: DropReason::Decode(e.to_string()),
                };
                return (records, Some(failure));
            }
        }
    }

    (records, None)
}
