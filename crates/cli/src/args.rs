//! CLI argument definitions

use clap::{Args, Parser, Subcommand};
use std::path::PathBuf;

/// castscore: CLI tool for scoring and categorizing Farcaster casts
#[derive(Parser, Debug)]
#[command(name = "castscore")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Path to configuration file
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (trace, debug, info, warn, error)
    #[arg(long, global = true)]
    pub log_level: Option<String>,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Score a single cast
    Analyze(AnalyzeArgs),

    /// Score many casts from a JSON file
    Batch(BatchArgs),

    /// Configuration management
    Config(ConfigArgs),

    /// Validate configuration and show status
    Doctor(DoctorArgs),
}

#[derive(Args, Debug)]
pub struct AnalyzeArgs {
    /// Cast hash to fetch from the hub and analyze
    #[arg(long, conflicts_with_all = ["text", "file"])]
    pub hash: Option<String>,

    /// Cast text to analyze directly
    #[arg(long, conflicts_with = "file")]
    pub text: Option<String>,

    /// File containing cast text (use - for stdin)
    #[arg(long)]
    pub file: Option<PathBuf>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct BatchArgs {
    /// JSON file with an array of casts to score
    #[arg(long)]
    pub input: PathBuf,

    /// Persist results to the curated or replies table
    #[arg(long, default_value = "curated")]
    pub table: String,

    /// Override casts scored concurrently per chunk
    #[arg(long)]
    pub batch_size: Option<usize>,

    /// Override delay between chunks in milliseconds
    #[arg(long)]
    pub delay_ms: Option<u64>,

    /// Score without persisting to the database
    #[arg(long)]
    pub dry_run: bool,

    /// Output the report as JSON
    #[arg(long)]
    pub json: bool,
}

#[derive(Args, Debug)]
pub struct ConfigArgs {
    #[command(subcommand)]
    pub command: ConfigCommands,
}

#[derive(Subcommand, Debug)]
pub enum ConfigCommands {
    /// Generate example configuration file
    Init {
        /// Path to write config file
        #[arg(long, default_value = "./config.toml")]
        path: PathBuf,

        /// Overwrite existing file
        #[arg(long)]
        force: bool,
    },

    /// Print the example configuration to stdout
    Show,
}

#[derive(Args, Debug)]
pub struct DoctorArgs {
    /// Check specific component (config, scorer, hub, database)
    #[arg(long)]
    pub check: Option<String>,

    /// Output as JSON
    #[arg(long)]
    pub json: bool,
}
