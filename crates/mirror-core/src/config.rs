//! Startup configuration
//!
//! A [`SyncConfig`] is assembled once at startup from defaults, an optional
//! TOML file ([`ConfigFile`]) and command-line arguments, then checked by
//! [`SyncConfig::validate`]. The synchronizer and scheduler are only built
//! from the resulting [`ValidatedConfig`]: an invalid configuration never
//! starts a run.
//!
//! # Example
//!
//! ```toml
//! source = "/data/source"
//! replica = "/backup/replica"
//! interval_secs = 30
//! log_dir = "logs"          # relative to the config file
//! algorithm = "sha256"
//! ```

use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use mirror_fs::DigestAlgorithm;
use serde::Deserialize;

use crate::{Error, Result};

/// Interval between runs when none (or a non-positive one) is given
pub const DEFAULT_INTERVAL_SECS: u64 = 60;

/// Map a user-supplied interval onto a usable one.
///
/// Returns the interval in seconds and whether the default was substituted
/// for a non-positive value, so the caller can tell the user.
pub fn normalize_interval(seconds: i64) -> (u64, bool) {
    match u64::try_from(seconds) {
        Ok(s) if s > 0 => (s, false),
        _ => (DEFAULT_INTERVAL_SECS, true),
    }
}

/// Complete, not yet validated configuration
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SyncConfig {
    pub source: PathBuf,
    pub replica: PathBuf,
    pub interval_secs: u64,
    pub log_dir: PathBuf,
    pub algorithm: DigestAlgorithm,
}

impl SyncConfig {
    /// Configuration with the default interval and algorithm.
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        log_dir: impl Into<PathBuf>,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            interval_secs: DEFAULT_INTERVAL_SECS,
            log_dir: log_dir.into(),
            algorithm: DigestAlgorithm::default(),
        }
    }

    pub fn interval(&self) -> Duration {
        Duration::from_secs(self.interval_secs)
    }

    /// Check that every directory exists and the interval is positive.
    ///
    /// Checks run in order (source, replica, log directory, interval,
    /// overlap) and stop at the first failure.
    ///
    /// # Errors
    ///
    /// Returns the first configuration error found.
    pub fn validate(&self) -> Result<ValidatedConfig> {
        let source = existing_dir(&self.source)
            .ok_or_else(|| Error::InvalidSource { path: self.source.clone() })?;
        let replica = existing_dir(&self.replica)
            .ok_or_else(|| Error::InvalidReplica { path: self.replica.clone() })?;
        let log_dir = existing_dir(&self.log_dir)
            .ok_or_else(|| Error::InvalidLogDir { path: self.log_dir.clone() })?;

        if self.interval_secs == 0 {
            return Err(Error::InvalidInterval {
                seconds: self.interval_secs,
            });
        }

        // Mirroring a tree into itself would chase its own copies
        if source.starts_with(&replica) || replica.starts_with(&source) {
            return Err(Error::OverlappingRoots {
                source_root: source,
                replica_root: replica,
            });
        }

        tracing::debug!(
            source = %source.display(),
            replica = %replica.display(),
            log_dir = %log_dir.display(),
            interval_secs = self.interval_secs,
            algorithm = %self.algorithm,
            "Configuration validated"
        );

        Ok(ValidatedConfig {
            source,
            replica,
            log_dir,
            interval: self.interval(),
            algorithm: self.algorithm,
        })
    }
}

/// Canonical form of `path` if it names an existing directory.
fn existing_dir(path: &Path) -> Option<PathBuf> {
    if path.as_os_str().is_empty() {
        return None;
    }
    dunce::canonicalize(path).ok().filter(|p| p.is_dir())
}

/// Configuration whose directories were verified to exist at startup
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ValidatedConfig {
    source: PathBuf,
    replica: PathBuf,
    log_dir: PathBuf,
    interval: Duration,
    algorithm: DigestAlgorithm,
}

impl ValidatedConfig {
    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn log_dir(&self) -> &Path {
        &self.log_dir
    }

    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }
}

/// Optional TOML configuration file
///
/// Every key is optional; missing keys fall through to command-line values
/// or defaults. Relative paths are resolved against the file's directory.
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct ConfigFile {
    pub source: Option<PathBuf>,
    pub replica: Option<PathBuf>,
    pub interval_secs: Option<i64>,
    pub log_dir: Option<PathBuf>,
    pub algorithm: Option<String>,
}

impl ConfigFile {
    /// Load and parse a configuration file.
    ///
    /// # Errors
    ///
    /// Returns an error if the file cannot be read or is not valid TOML for
    /// this schema.
    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path).map_err(|e| mirror_fs::Error::io(path, e))?;
        let mut file = Self::parse(&content).map_err(|e| match e {
            Error::ConfigParse { message, .. } => Error::ConfigParse {
                path: path.to_path_buf(),
                message,
            },
            other => other,
        })?;

        if let Some(base) = path.parent() {
            file.resolve_relative_to(base);
        }
        Ok(file)
    }

    /// Parse configuration from TOML text.
    ///
    /// # Errors
    ///
    /// Returns [`Error::ConfigParse`] with an empty path on invalid input.
    pub fn parse(content: &str) -> Result<Self> {
        toml::from_str(content).map_err(|e| Error::ConfigParse {
            path: PathBuf::new(),
            message: e.to_string(),
        })
    }

    /// Parsed digest algorithm, if one is configured.
    ///
    /// # Errors
    ///
    /// Returns an unsupported-algorithm error for unknown names.
    pub fn algorithm(&self) -> Result<Option<DigestAlgorithm>> {
        self.algorithm
            .as_deref()
            .map(str::parse::<DigestAlgorithm>)
            .transpose()
            .map_err(Error::from)
    }

    fn resolve_relative_to(&mut self, base: &Path) {
        for path in [&mut self.source, &mut self.replica, &mut self.log_dir]
            .into_iter()
            .flatten()
        {
            if path.is_relative() {
                *path = base.join(&*path);
            }
        }
    }
}
