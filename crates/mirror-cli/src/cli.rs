//! CLI argument parsing using clap derive

use std::path::PathBuf;

use clap::Parser;

/// Folder Mirror - keep a replica folder identical to a source folder
///
/// Examples:
///   mirror ./data ./backup 30 ./logs     # Every 30 seconds until Enter
///   mirror ./data ./backup --once        # Single run, exit code by result
///   mirror --config mirror.toml --dry-run
#[derive(Parser, Debug)]
#[command(name = "mirror")]
#[command(author, version, about, long_about = None)]
#[command(allow_negative_numbers = true)]
pub struct Cli {
    /// Folder to mirror from
    pub source: Option<PathBuf>,

    /// Folder kept identical to the source
    pub replica: Option<PathBuf>,

    /// Seconds between runs (non-positive values fall back to 60)
    pub interval: Option<i64>,

    /// Folder receiving the session log file
    pub log_dir: Option<PathBuf>,

    /// TOML file supplying any of the values above
    #[arg(short, long, value_name = "FILE", env = "MIRROR_CONFIG")]
    pub config: Option<PathBuf>,

    /// Content digest used to compare files (md5 or sha256)
    #[arg(short, long, value_name = "NAME")]
    pub algorithm: Option<String>,

    /// Run once and exit instead of running on an interval
    #[arg(long)]
    pub once: bool,

    /// Log what would change without touching the replica
    #[arg(long)]
    pub dry_run: bool,

    /// Print the run report as JSON (requires --once)
    #[arg(long, requires = "once")]
    pub json: bool,

    /// Enable verbose diagnostics on stderr
    #[arg(short, long)]
    pub verbose: bool,
}
