//! Assemble the startup configuration from arguments, file and defaults
//!
//! Positional arguments win over the config file, which wins over the
//! built-in defaults. Default folders live next to the executable.

use std::path::{Path, PathBuf};

use mirror_core::{ConfigFile, DEFAULT_INTERVAL_SECS, SyncConfig, normalize_interval};
use mirror_fs::DigestAlgorithm;

use crate::cli::Cli;
use crate::error::{CliError, Result};

pub const DEFAULT_SOURCE_DIR: &str = "defaultSource";
pub const DEFAULT_REPLICA_DIR: &str = "defaultReplica";
pub const DEFAULT_LOG_DIR: &str = "Logs";

pub const MISSING_ROOTS_NOTICE: &str =
    "You must provide at least source and replica paths. Default values will be used.";

/// Configuration plus the notices to show before validating it
#[derive(Debug)]
pub struct Settings {
    pub config: SyncConfig,
    pub notices: Vec<String>,
}

/// Directory holding the running executable.
pub fn executable_dir() -> Result<PathBuf> {
    let exe = std::env::current_exe()?;
    Ok(exe.parent().map(Path::to_path_buf).unwrap_or_default())
}

/// Merge `cli` over `file` over the defaults rooted at `default_dir`.
pub fn resolve(cli: &Cli, file: Option<ConfigFile>, default_dir: &Path) -> Result<Settings> {
    let file = file.unwrap_or_default();
    let mut notices = Vec::new();

    let source = cli.source.clone().or(file.source.clone());
    let replica = cli.replica.clone().or(file.replica.clone());
    if source.is_none() || replica.is_none() {
        notices.push(MISSING_ROOTS_NOTICE.to_string());
    }

    let interval_secs = match (cli.interval, file.interval_secs) {
        (Some(secs), _) => {
            let (secs, substituted) = normalize_interval(secs);
            if substituted {
                notices.push(format!(
                    "Interval must be greater than 0. Default value of {} seconds will be used.",
                    DEFAULT_INTERVAL_SECS
                ));
            }
            secs
        }
        // Zero is left for validation to reject
        (None, Some(secs)) => u64::try_from(secs).map_err(|_| {
            CliError::user(format!("Interval must be greater than 0, got {}", secs))
        })?,
        (None, None) => DEFAULT_INTERVAL_SECS,
    };

    let algorithm = match cli.algorithm.as_deref() {
        Some(name) => name.parse::<DigestAlgorithm>()?,
        None => file.algorithm()?.unwrap_or_default(),
    };

    let config = SyncConfig {
        source: source.unwrap_or_else(|| default_dir.join(DEFAULT_SOURCE_DIR)),
        replica: replica.unwrap_or_else(|| default_dir.join(DEFAULT_REPLICA_DIR)),
        interval_secs,
        log_dir: cli
            .log_dir
            .clone()
            .or(file.log_dir)
            .unwrap_or_else(|| default_dir.join(DEFAULT_LOG_DIR)),
        algorithm,
    };

    tracing::debug!(?config, "Resolved configuration");

    Ok(Settings { config, notices })
}
