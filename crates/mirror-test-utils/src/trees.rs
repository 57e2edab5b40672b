//! [`TestTrees`] builder for synchronization test scenarios.

use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};
use tempfile::TempDir;
use walkdir::WalkDir;

/// A temporary workspace holding `source/`, `replica/` and `logs/`
/// directories, with helpers for populating and inspecting them.
///
/// # Example
///
/// ```rust,no_run
/// use mirror_test_utils::TestTrees;
///
/// let trees = TestTrees::new();
/// trees.write_source("a/b/c/deep.txt", "deep");
/// trees.write_replica("stale.txt", "old");
/// // ... run a synchronizer against trees.source() / trees.replica() ...
/// trees.assert_mirrored();
/// ```
pub struct TestTrees {
    temp_dir: TempDir,
}

impl Default for TestTrees {
    fn default() -> Self {
        Self::new()
    }
}

impl TestTrees {
    /// Create empty `source/`, `replica/` and `logs/` directories.
    pub fn new() -> Self {
        let temp_dir = TempDir::new().unwrap();
        for dir in ["source", "replica", "logs"] {
            fs::create_dir_all(temp_dir.path().join(dir)).unwrap();
        }
        Self { temp_dir }
    }

    /// Root of the temporary workspace.
    pub fn root(&self) -> &Path {
        self.temp_dir.path()
    }

    pub fn source(&self) -> PathBuf {
        self.root().join("source")
    }

    pub fn replica(&self) -> PathBuf {
        self.root().join("replica")
    }

    pub fn logs(&self) -> PathBuf {
        self.root().join("logs")
    }

    /// Write `content` to `rel` under the source tree, creating parents.
    pub fn write_source(&self, rel: &str, content: impl AsRef<[u8]>) {
        write_file(&self.source().join(rel), content.as_ref());
    }

    /// Write `content` to `rel` under the replica tree, creating parents.
    pub fn write_replica(&self, rel: &str, content: impl AsRef<[u8]>) {
        write_file(&self.replica().join(rel), content.as_ref());
    }

    /// Read a replica file, panicking if it is missing.
    pub fn read_replica(&self, rel: &str) -> Vec<u8> {
        let path = self.replica().join(rel);
        fs::read(&path).unwrap_or_else(|e| panic!("Failed to read {}: {}", path.display(), e))
    }

    /// All regular files under `root` as `relative path -> content`, with
    /// `/` separators. Symlinks are not followed or included.
    pub fn snapshot(root: &Path) -> BTreeMap<String, Vec<u8>> {
        WalkDir::new(root)
            .follow_links(false)
            .into_iter()
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .map(|entry| {
                let rel = entry
                    .path()
                    .strip_prefix(root)
                    .unwrap()
                    .components()
                    .map(|c| c.as_os_str().to_string_lossy().into_owned())
                    .collect::<Vec<_>>()
                    .join("/");
                let content = fs::read(entry.path())
                    .unwrap_or_else(|e| panic!("Failed to read {}: {}", entry.path().display(), e));
                (rel, content)
            })
            .collect()
    }

    pub fn source_snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        Self::snapshot(&self.source())
    }

    pub fn replica_snapshot(&self) -> BTreeMap<String, Vec<u8>> {
        Self::snapshot(&self.replica())
    }

    /// Assert the replica holds exactly the source's files with identical
    /// content.
    ///
    /// # Panics
    /// Panics listing the differing paths if the trees do not match.
    pub fn assert_mirrored(&self) {
        let source = self.source_snapshot();
        let replica = self.replica_snapshot();
        if source != replica {
            let missing: Vec<_> = source.keys().filter(|k| !replica.contains_key(*k)).collect();
            let extra: Vec<_> = replica.keys().filter(|k| !source.contains_key(*k)).collect();
            let differing: Vec<_> = source
                .iter()
                .filter(|(k, v)| replica.get(*k).is_some_and(|r| r != *v))
                .map(|(k, _)| k)
                .collect();
            panic!(
                "Replica does not mirror source.\nMissing: {:?}\nExtra: {:?}\nDiffering: {:?}",
                missing, extra, differing
            );
        }
    }

    /// Assert that `rel` (relative to the replica root) exists.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path does not exist.
    pub fn assert_replica_exists(&self, rel: &str) {
        let full_path = self.replica().join(rel);
        assert!(
            full_path.exists(),
            "Expected replica path to exist: {}",
            full_path.display()
        );
    }

    /// Assert that `rel` (relative to the replica root) does **not** exist.
    ///
    /// # Panics
    /// Panics with a descriptive message if the path exists.
    pub fn assert_replica_not_exists(&self, rel: &str) {
        let full_path = self.replica().join(rel);
        assert!(
            !full_path.exists(),
            "Expected replica path NOT to exist: {}",
            full_path.display()
        );
    }
}

fn write_file(path: &Path, content: &[u8]) {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).unwrap();
    }
    fs::write(path, content).unwrap();
}
