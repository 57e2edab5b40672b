//! Core synchronization layer for Folder Mirror
//!
//! This crate builds on `mirror-fs` and provides:
//!
//! - **TreeSynchronizer**: one-way mirroring of a source tree onto a replica
//!   (delete stale files, then copy missing or changed ones)
//! - **Logger**: the event-log capability the synchronizer reports to, with a
//!   timestamped file implementation and an in-memory one
//! - **Configuration**: startup configuration and fail-fast validation
//! - **Scheduler**: fixed-interval, non-overlapping driver for runs
//!
//! # Architecture
//!
//! ```text
//!        mirror-cli
//!            |
//!       mirror-core
//!   (sync, scheduler, config, logger)
//!            |
//!        mirror-fs
//!   (index, digest, io, path)
//! ```
//!
//! # Example
//!
//! ```no_run
//! use mirror_core::{MemoryLogger, TreeSynchronizer};
//!
//! let sync = TreeSynchronizer::new("/data/source", "/data/replica", MemoryLogger::new());
//! let report = sync.run();
//! assert!(report.success);
//! ```

pub mod config;
pub mod error;
pub mod logger;
pub mod scheduler;
pub mod sync;

pub use config::{ConfigFile, DEFAULT_INTERVAL_SECS, SyncConfig, ValidatedConfig, normalize_interval};
pub use error::{Error, Result};
pub use logger::{FileLogger, Logger, MemoryLogger};
pub use scheduler::Scheduler;
pub use sync::{SyncAction, SyncOptions, SyncReport, Synchronizer, TreeSynchronizer};
