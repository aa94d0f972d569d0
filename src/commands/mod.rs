//! Command implementations and the plumbing they share.

pub mod apply;
pub mod plan;

use crate::Context;
use crate::config::Settings;
use crate::ui;
use anyhow::{Context as AnyhowContext, Result};
use declarations::Build;
use kafkakit::ClusterAdmin;
use reconcile::{CancelToken, RunOptions};
use std::path::Path;
use std::thread;

/// Read every declaration file in the target directory.
pub fn load_declarations(target: &Path) -> Result<Build> {
    let build = declarations::load(target)
        .with_context(|| format!("Failed to load topic declarations from {}", target.display()))?;
    log::info!(
        "Loaded {} from {}",
        ui::count(build.desired.len(), "topic"),
        target.display()
    );
    Ok(build)
}

/// Open a cluster-admin connection for the resolved settings.
#[cfg(feature = "rdkafka")]
pub fn connect(settings: &Settings) -> Result<Box<dyn ClusterAdmin>> {
    let config = kafkakit::AdminConfig::new(&settings.brokers, &settings.kafka_version)
        .context("Invalid connection settings")?
        .with_timeout(settings.timeout);
    kafkakit::connect(&config)
        .with_context(|| format!("Failed to connect to {}", settings.brokers))
}

/// Open a cluster-admin connection for the resolved settings.
#[cfg(not(feature = "rdkafka"))]
pub fn connect(settings: &Settings) -> Result<Box<dyn ClusterAdmin>> {
    anyhow::bail!(
        "Cannot connect to {}: built without the `rdkafka` feature",
        settings.brokers
    )
}

/// Options the reconciler needs from the settings
pub fn run_options(settings: &Settings) -> RunOptions {
    RunOptions {
        strict: settings.strict,
        validate: settings.validate,
        jobs: settings.jobs,
    }
}

/// Print the run header unless quiet.
pub fn print_header(ctx: &Context, title: &str, settings: &Settings) {
    if ctx.quiet {
        return;
    }
    ui::header(title);
    ui::kv("Target", &settings.target.display().to_string());
    ui::kv("Brokers", &settings.brokers);
    if ctx.verbose > 0 {
        ui::kv("Kafka version", &settings.kafka_version);
        ui::kv("Jobs", &settings.jobs.to_string());
        if let Some(path) = &settings.config_file {
            ui::kv("Config", &path.display().to_string());
        }
    }
    if settings.validate {
        ui::warn("Validate mode - the cluster will not be changed");
    }
}

/// Cancel the token on the first Ctrl-C.
///
/// Topics already in flight finish; the rest are skipped.
pub fn watch_ctrl_c(cancel: CancelToken) {
    let spawned = thread::Builder::new()
        .name("ctrl-c".into())
        .spawn(move || {
            let runtime = match tokio::runtime::Builder::new_current_thread()
                .enable_all()
                .build()
            {
                Ok(runtime) => runtime,
                Err(e) => {
                    log::warn!("Ctrl-C handling disabled: {e}");
                    return;
                }
            };
            runtime.block_on(async {
                if tokio::signal::ctrl_c().await.is_ok() {
                    log::warn!("Interrupted, finishing topics in progress");
                    cancel.cancel();
                }
            });
        });

    if let Err(e) = spawned {
        log::warn!("Ctrl-C handling disabled: {e}");
    }
}
