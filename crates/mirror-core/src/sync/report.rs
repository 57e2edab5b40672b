//! Actions and reports produced by a synchronization run

use std::fmt;

use mirror_fs::{DigestAlgorithm, NormalizedPath};
use serde::{Deserialize, Serialize};

/// One operation decided during a run, keyed by relative path.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "action", rename_all = "lowercase")]
pub enum SyncAction {
    /// Source file copied over (or into) the replica
    Copy { path: NormalizedPath },
    /// Replica file deleted because the source no longer has it
    Delete { path: NormalizedPath },
}

impl SyncAction {
    pub fn copy(path: NormalizedPath) -> Self {
        Self::Copy { path }
    }

    pub fn delete(path: NormalizedPath) -> Self {
        Self::Delete { path }
    }

    pub fn path(&self) -> &NormalizedPath {
        match self {
            Self::Copy { path } | Self::Delete { path } => path,
        }
    }

    pub fn is_copy(&self) -> bool {
        matches!(self, Self::Copy { .. })
    }

    pub fn is_delete(&self) -> bool {
        matches!(self, Self::Delete { .. })
    }
}

impl fmt::Display for SyncAction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Copy { path } => write!(f, "copy {path}"),
            Self::Delete { path } => write!(f, "delete {path}"),
        }
    }
}

/// Outcome of a synchronization run
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct SyncReport {
    /// Whether the run completed
    pub success: bool,
    /// Why the run stopped, when it did not complete
    pub error: Option<String>,
    /// Actions applied (or, in dry-run mode, planned) before the run ended
    pub actions: Vec<SyncAction>,
}

impl SyncReport {
    /// Create a successful sync report
    pub fn success(actions: Vec<SyncAction>) -> Self {
        Self {
            success: true,
            error: None,
            actions,
        }
    }

    /// Create a failed sync report
    ///
    /// `actions` holds whatever was applied before the failure.
    pub fn failure(error: impl Into<String>, actions: Vec<SyncAction>) -> Self {
        Self {
            success: false,
            error: Some(error.into()),
            actions,
        }
    }

    pub fn copies(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.actions
            .iter()
            .filter(|a| a.is_copy())
            .map(SyncAction::path)
    }

    pub fn deletions(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.actions
            .iter()
            .filter(|a| a.is_delete())
            .map(SyncAction::path)
    }

    /// True when the run succeeded without touching the replica.
    pub fn is_noop(&self) -> bool {
        self.success && self.actions.is_empty()
    }
}

/// Options for synchronization runs
#[derive(Debug, Clone, Copy, Default)]
pub struct SyncOptions {
    /// Digest used to compare same-length files
    pub algorithm: DigestAlgorithm,
    /// If true, decide and log every action without modifying the replica.
    /// Messages are prefixed with "[dry-run] Would ..."
    pub dry_run: bool,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn report_partitions_actions() {
        let report = SyncReport::success(vec![
            SyncAction::delete("old.txt".into()),
            SyncAction::copy("a/new.txt".into()),
            SyncAction::copy("b.txt".into()),
        ]);

        let copies: Vec<_> = report.copies().map(NormalizedPath::as_str).collect();
        let deletions: Vec<_> = report.deletions().map(NormalizedPath::as_str).collect();

        assert_eq!(copies, vec!["a/new.txt", "b.txt"]);
        assert_eq!(deletions, vec!["old.txt"]);
        assert!(!report.is_noop());
    }

    #[test]
    fn failure_keeps_error_and_partial_actions() {
        let report = SyncReport::failure("disk full", vec![SyncAction::delete("x".into())]);

        assert!(!report.success);
        assert_eq!(report.error.as_deref(), Some("disk full"));
        assert_eq!(report.actions.len(), 1);
        assert!(!report.is_noop());
    }

    #[test]
    fn action_display() {
        assert_eq!(SyncAction::copy("a/b.txt".into()).to_string(), "copy a/b.txt");
        assert_eq!(SyncAction::delete("c.txt".into()).to_string(), "delete c.txt");
    }

    #[test]
    fn report_serializes_tagged_actions() {
        let report = SyncReport::success(vec![SyncAction::copy("a.txt".into())]);
        let json = serde_json::to_value(&report).unwrap();

        assert_eq!(
            json,
            serde_json::json!({
                "success": true,
                "error": null,
                "actions": [{"action": "copy", "path": "a.txt"}]
            })
        );
    }
}
