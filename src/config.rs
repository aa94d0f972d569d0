//! Run settings: config file, environment and flags.
//!
//! Flags win over `TOPICSYNC_*` variables (both handled by clap), which
//! win over the config file, which wins over the defaults.

use crate::cli::RunArgs;
use anyhow::{Context, Result, bail};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Config file looked up in the target directory.
pub const LOCAL_CONFIG: &str = "topicsync.toml";

/// Assumed broker version when none is configured
pub const DEFAULT_KAFKA_VERSION: &str = "1.1.0";
/// Default worker pool size
pub const DEFAULT_JOBS: usize = 4;
/// Default admin operation timeout in seconds
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

/// Get the user config directory path
pub fn config_dir() -> Result<PathBuf> {
    let home = dirs::home_dir().context("Could not determine home directory")?;
    Ok(home.join(".config").join("topicsync"))
}

/// Contents of a `topicsync.toml`.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, deny_unknown_fields)]
pub struct FileConfig {
    /// Comma-separated bootstrap brokers
    pub brokers: Option<String>,
    /// Kafka protocol version of the brokers
    pub kafka_version: Option<String>,
    /// Reset undeclared keys and delete undeclared topics
    pub strict: Option<bool>,
    /// Only validate, never change the cluster
    pub validate: Option<bool>,
    /// Topics processed concurrently
    pub jobs: Option<usize>,
    /// Admin operation timeout in seconds
    pub timeout_secs: Option<u64>,
    /// Declaration directory, `~` allowed
    pub target: Option<String>,
}

impl FileConfig {
    /// Load a config file
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Could not read config file: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Invalid TOML format in {}", path.display()))
    }

    /// Find and load the config file for a run.
    ///
    /// An explicit path must exist; the implicit locations are optional.
    pub fn discover(explicit: Option<&Path>, target: &Path) -> Result<Option<(PathBuf, Self)>> {
        if let Some(path) = explicit {
            return Ok(Some((path.to_path_buf(), Self::load(path)?)));
        }

        let mut candidates = vec![target.join(LOCAL_CONFIG)];
        if let Ok(dir) = config_dir() {
            candidates.push(dir.join("config.toml"));
        }

        for path in candidates {
            if path.is_file() {
                let config = Self::load(&path)?;
                return Ok(Some((path, config)));
            }
        }
        Ok(None)
    }
}

/// Fully resolved settings for a run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Settings {
    /// Comma-separated bootstrap brokers
    pub brokers: String,
    /// Kafka protocol version of the brokers
    pub kafka_version: String,
    /// Strict mode
    pub strict: bool,
    /// Validate mode
    pub validate: bool,
    /// Worker pool size, at least 1
    pub jobs: usize,
    /// Admin operation timeout
    pub timeout: Duration,
    /// Absolute declaration directory
    pub target: PathBuf,
    /// Config file that was used, if any
    pub config_file: Option<PathBuf>,
}

impl Settings {
    /// Resolve settings from flags/env and the discovered config file.
    pub fn resolve(args: &RunArgs) -> Result<Self> {
        let cli_target = args.target.as_deref().map(expand);
        let lookup_dir = cli_target.clone().unwrap_or_else(|| PathBuf::from("."));
        let discovered = FileConfig::discover(args.config.as_deref(), &lookup_dir)?;

        let (config_file, file) = match discovered {
            Some((path, file)) => {
                log::debug!("Using config file {}", path.display());
                (Some(path), file)
            }
            None => (None, FileConfig::default()),
        };

        Self::merge(args, cli_target, file, config_file)
    }

    fn merge(
        args: &RunArgs,
        cli_target: Option<PathBuf>,
        file: FileConfig,
        config_file: Option<PathBuf>,
    ) -> Result<Self> {
        let Some(brokers) = args.brokers.clone().or(file.brokers) else {
            bail!("No brokers given (use --brokers, TOPICSYNC_BROKERS or `brokers` in the config file)");
        };

        let target = cli_target
            .or_else(|| file.target.as_deref().map(Path::new).map(expand))
            .unwrap_or_else(|| PathBuf::from("."));
        let target = std::path::absolute(&target)
            .with_context(|| format!("Could not resolve target path {}", target.display()))?;

        Ok(Self {
            brokers,
            kafka_version: args
                .kafka_version
                .clone()
                .or(file.kafka_version)
                .unwrap_or_else(|| DEFAULT_KAFKA_VERSION.to_string()),
            strict: args.strict || file.strict.unwrap_or(false),
            validate: args.validate || file.validate.unwrap_or(false),
            jobs: args.jobs.or(file.jobs).unwrap_or(DEFAULT_JOBS).max(1),
            timeout: Duration::from_secs(
                args.timeout
                    .or(file.timeout_secs)
                    .unwrap_or(DEFAULT_TIMEOUT_SECS),
            ),
            target,
            config_file,
        })
    }
}

fn expand(path: &Path) -> PathBuf {
    let raw = path.to_string_lossy();
    PathBuf::from(shellexpand::tilde(&raw).as_ref())
}
