//! TreeSynchronizer implementation
//!
//! A run enumerates both trees, deletes replica files the source no longer
//! has, then copies every source file whose replica counterpart is missing or
//! differs in content.
//!
//! # Failure policy
//!
//! The first failing file operation aborts the rest of the run. There is no
//! per-file isolation and no retry: the error is logged once, the run reports
//! failure, and the next scheduled run re-evaluates both trees from scratch.
//! Actions applied before the failure stay applied and are listed in the
//! report.
//!
//! # Symlinks
//!
//! Symlinks are never indexed, followed or copied. One sitting in the
//! replica at (or above) a source file's path is removed before the copy,
//! so writes stay inside the replica tree.

use std::path::{Path, PathBuf};

use mirror_fs::{NormalizedPath, PathIndex, files_equal, io};

use super::{SyncAction, SyncOptions, SyncReport, Synchronizer};
use crate::config::ValidatedConfig;
use crate::logger::Logger;
use crate::{Error, Result};

/// One-way mirror of a source tree onto a replica tree.
pub struct TreeSynchronizer {
    source: PathBuf,
    replica: PathBuf,
    logger: Box<dyn Logger>,
    options: SyncOptions,
}

impl TreeSynchronizer {
    /// Create a synchronizer with default options (MD5 comparison, live run).
    pub fn new(
        source: impl Into<PathBuf>,
        replica: impl Into<PathBuf>,
        logger: impl Logger + 'static,
    ) -> Self {
        Self {
            source: source.into(),
            replica: replica.into(),
            logger: Box::new(logger),
            options: SyncOptions::default(),
        }
    }

    /// Create a synchronizer for validated roots, using the configured
    /// digest algorithm.
    pub fn from_config(config: &ValidatedConfig, logger: impl Logger + 'static) -> Self {
        Self::new(config.source(), config.replica(), logger).with_options(SyncOptions {
            algorithm: config.algorithm(),
            dry_run: false,
        })
    }

    pub fn with_options(mut self, options: SyncOptions) -> Self {
        self.options = options;
        self
    }

    /// Switch dry-run mode on or off, keeping the other options.
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.options.dry_run = dry_run;
        self
    }

    pub fn source(&self) -> &Path {
        &self.source
    }

    pub fn replica(&self) -> &Path {
        &self.replica
    }

    pub fn options(&self) -> SyncOptions {
        self.options
    }

    /// Execute one synchronization run.
    ///
    /// Never panics on I/O failure; the outcome is reported through the
    /// returned [`SyncReport`] and the logger.
    pub fn run(&self) -> SyncReport {
        self.logger.log("Starting synchronization...");

        let mut actions = Vec::new();
        match self.synchronize(&mut actions) {
            Ok(()) => {
                self.logger.log("Synchronization finished.");
                SyncReport::success(actions)
            }
            Err(e) => {
                self.logger
                    .log(&format!("[ERROR] Synchronization failed: {}", e));
                SyncReport::failure(e.to_string(), actions)
            }
        }
    }

    fn synchronize(&self, actions: &mut Vec<SyncAction>) -> Result<()> {
        let source = PathIndex::scan(&self.source)?;
        let replica = PathIndex::scan(&self.replica)?;

        if source.is_empty() && replica.is_empty() {
            self.logger
                .log("Both source and replica folders are empty. No synchronization needed.");
            return Ok(());
        }

        // Deletions complete before any copy decision is made
        for (relative, absolute) in replica.iter() {
            if source.contains(relative) {
                continue;
            }
            self.delete(relative, absolute)?;
            actions.push(SyncAction::delete(relative.clone()));
        }

        for (relative, absolute) in source.iter() {
            let native = match source.native_relative(relative) {
                Some(native) => native.to_path_buf(),
                None => relative.to_native(),
            };

            if !self.needs_copy(relative, absolute, &native)? {
                continue;
            }
            self.copy(relative, absolute, &native)?;
            actions.push(SyncAction::copy(relative.clone()));
        }

        Ok(())
    }

    /// A copy is needed when the target is absent, differs in content, or is
    /// reached through a symlink in the replica.
    fn needs_copy(&self, relative: &NormalizedPath, source: &Path, native: &Path) -> Result<bool> {
        // Replica links are replaced, never written through
        if io::has_symlink(&self.replica, native).map_err(|e| action_error("inspect", relative, e))? {
            tracing::debug!(path = %relative, "Symlink in replica");
            return Ok(true);
        }

        let target = self.replica.join(native);
        if !target.is_file() {
            tracing::debug!(path = %relative, "Missing in replica");
            return Ok(true);
        }

        let equal = files_equal(source, &target, self.options.algorithm)
            .map_err(|e| action_error("compare", relative, e))?;

        tracing::debug!(path = %relative, equal, algorithm = %self.options.algorithm, "Compared");
        Ok(!equal)
    }

    fn delete(&self, relative: &NormalizedPath, absolute: &Path) -> Result<()> {
        if self.options.dry_run {
            self.logger
                .log(&format!("[dry-run] Would delete from replica: {}", relative));
            return Ok(());
        }

        io::remove_file(absolute).map_err(|e| action_error("delete", relative, e))?;
        self.logger.log(&format!("Deleted from replica: {}", relative));
        Ok(())
    }

    fn copy(&self, relative: &NormalizedPath, source: &Path, native: &Path) -> Result<()> {
        if self.options.dry_run {
            self.logger
                .log(&format!("[dry-run] Would copy/update: {}", relative));
            return Ok(());
        }

        io::remove_symlinks(&self.replica, native)
            .map_err(|e| action_error("replace symlink", relative, e))?;

        // A directory left where the file belongs. After the deletion pass it
        // can only hold empty directories.
        let target = self.replica.join(native);
        if target.is_dir() {
            io::remove_empty_tree(&target)
                .map_err(|e| action_error("replace directory", relative, e))?;
        }

        let bytes = io::copy_file(source, &target)
            .map_err(|e| action_error("copy", relative, e))?;
        tracing::debug!(path = %relative, bytes, "Copied");

        self.logger.log(&format!("Copied/updated: {}", relative));
        Ok(())
    }
}

impl Synchronizer for TreeSynchronizer {
    fn run(&self) -> SyncReport {
        TreeSynchronizer::run(self)
    }
}

fn action_error(action: &'static str, relative: &NormalizedPath, source: mirror_fs::Error) -> Error {
    Error::Action {
        action,
        path: relative.to_string(),
        source,
    }
}

impl std::fmt::Debug for TreeSynchronizer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TreeSynchronizer")
            .field("source", &self.source)
            .field("replica", &self.replica)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}
