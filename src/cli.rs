use clap::{Args, Parser, Subcommand};
use clap_complete::Shell;
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "topicsync")]
#[command(author = "Alberto Cavalcante")]
#[command(version)]
#[command(about = "Declarative Kafka topic management", long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    /// Verbosity level
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress non-essential output
    #[arg(short, long, global = true)]
    pub quiet: bool,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand)]
pub enum Command {
    /// Create, alter and (in strict mode) delete topics to match the declarations
    Apply(ApplyArgs),

    /// Show what apply would do without changing anything
    Plan(PlanArgs),

    /// Generate shell completions
    Completions {
        /// Shell to generate completions for
        #[arg(value_enum)]
        shell: Shell,
    },
}

/// Options shared by every command that talks to a cluster
#[derive(Args, Debug, Clone, Default)]
pub struct RunArgs {
    /// Directory with topic declaration files (.yaml/.yml)
    #[arg(short, long, env = "TOPICSYNC_TARGET")]
    pub target: Option<PathBuf>,

    /// Comma-separated bootstrap brokers (host:port)
    #[arg(short, long, env = "TOPICSYNC_BROKERS")]
    pub brokers: Option<String>,

    /// Kafka protocol version of the brokers
    #[arg(long, env = "TOPICSYNC_KAFKA_VERSION")]
    pub kafka_version: Option<String>,

    /// Reset undeclared config keys and delete undeclared topics
    #[arg(long, env = "TOPICSYNC_STRICT")]
    pub strict: bool,

    /// Only validate against the cluster, never change anything
    #[arg(long, env = "TOPICSYNC_VALIDATE")]
    pub validate: bool,

    /// Number of topics processed concurrently
    #[arg(short, long, env = "TOPICSYNC_JOBS")]
    pub jobs: Option<usize>,

    /// Admin operation timeout in seconds
    #[arg(long, env = "TOPICSYNC_TIMEOUT")]
    pub timeout: Option<u64>,

    /// Config file (default: topicsync.toml in the target, then ~/.config/topicsync/config.toml)
    #[arg(short, long, env = "TOPICSYNC_CONFIG")]
    pub config: Option<PathBuf>,
}

#[derive(Args, Debug)]
pub struct ApplyArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Delete marked topics without asking
    #[arg(short, long)]
    pub yes: bool,

    /// Print the run report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct PlanArgs {
    #[command(flatten)]
    pub run: RunArgs,

    /// Print the plan as JSON
    #[arg(long)]
    pub json: bool,
}
