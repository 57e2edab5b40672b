//! Error types for mirror-core

use std::path::PathBuf;

/// Result type for mirror-core operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur in mirror-core operations
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Source root missing or not a directory
    #[error("Invalid path to source folder: {path}")]
    InvalidSource { path: PathBuf },

    /// Replica root missing or not a directory
    #[error("Invalid path to replica folder: {path}")]
    InvalidReplica { path: PathBuf },

    /// Log directory missing or not a directory
    #[error("Invalid path to logs folder: {path}")]
    InvalidLogDir { path: PathBuf },

    /// Run interval must be positive
    #[error("Interval must be greater than 0, got {seconds}")]
    InvalidInterval { seconds: u64 },

    /// Source and replica are the same tree or one contains the other
    #[error("Source {source_root} and replica {replica_root} must not overlap")]
    OverlappingRoots {
        source_root: PathBuf,
        replica_root: PathBuf,
    },

    /// Configuration file could not be parsed
    #[error("Failed to parse config at {path}: {message}")]
    ConfigParse { path: PathBuf, message: String },

    /// A file operation failed during a synchronization run
    #[error("Failed to {action} {path}: {source}")]
    Action {
        action: &'static str,
        path: String,
        #[source]
        source: mirror_fs::Error,
    },

    // Transparent wrappers for underlying crate errors
    /// Filesystem error from mirror-fs
    #[error(transparent)]
    Fs(#[from] mirror_fs::Error),

    /// Standard I/O error
    #[error(transparent)]
    Io(#[from] std::io::Error),
}
