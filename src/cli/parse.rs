//! CLI parse: clap types for the audit. No behavior; definitions only.

use clap::Parser;
use std::path::PathBuf;

/// Audit deleted fields and report how many records still reference them
#[derive(Parser, Debug)]
#[command(name = "field-audit")]
#[command(about = "Audit deleted Salesforce fields and keep a cumulative orphaned-record report")]
pub struct Cli {
    /// Salesforce organization to use (alias or username)
    #[arg(long)]
    pub org: Option<String>,

    /// File to export the results as JSON (empty string disables export)
    #[arg(long)]
    pub export: Option<String>,

    /// Summary format on stdout (text or json)
    #[arg(long, default_value = "text")]
    pub format: String,

    /// Workspace root directory (for config/config.toml discovery)
    #[arg(long, default_value = ".")]
    pub workspace: PathBuf,

    /// Configuration file path (overrides default config loading)
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Query tool executable (default: sf)
    #[arg(long)]
    pub sf_bin: Option<String>,

    /// Maximum number of queries in flight (default: unbounded)
    #[arg(long)]
    pub max_concurrency: Option<usize>,

    /// Skip failing branches instead of aborting the run
    #[arg(long)]
    pub continue_on_error: bool,

    /// Enable debug logging
    #[arg(long)]
    pub verbose: bool,

    /// Disable logging
    #[arg(long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Log level (trace, debug, info, warn, error, off)
    #[arg(long)]
    pub log_level: Option<String>,

    /// Log format (json, text)
    #[arg(long)]
    pub log_format: Option<String>,

    /// Log output (stderr, stdout, file)
    #[arg(long)]
    pub log_output: Option<String>,

    /// Log file path (if output is "file")
    #[arg(long)]
    pub log_file: Option<PathBuf>,
}
