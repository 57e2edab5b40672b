//! Relative-path indexes of directory trees
//!
//! A [`PathIndex`] maps each regular file under a root to its absolute path,
//! keyed by the file's [`NormalizedPath`] relative to that root. Directories
//! are not represented; only files participate in synchronization decisions.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, NormalizedPath, Result};

/// Index of the regular files under a root directory.
#[derive(Debug, Clone, Default)]
pub struct PathIndex {
    root: PathBuf,
    entries: BTreeMap<NormalizedPath, PathBuf>,
}

impl PathIndex {
    /// Recursively list all regular files under `root`.
    ///
    /// Symbolic links are neither followed nor indexed. Entries within each
    /// directory are visited in file-name order.
    ///
    /// # Errors
    ///
    /// Returns [`Error::Walk`] on the first entry that cannot be read,
    /// including a missing root.
    pub fn scan(root: impl Into<PathBuf>) -> Result<Self> {
        let root = root.into();
        let mut entries = BTreeMap::new();

        for entry in WalkDir::new(&root).follow_links(false).sort_by_file_name() {
            let entry = entry.map_err(|source| Error::Walk {
                root: root.clone(),
                source,
            })?;

            if !entry.file_type().is_file() {
                continue;
            }

            let absolute = entry.into_path();
            if let Some(relative) = NormalizedPath::relative_to(&absolute, &root) {
                entries.insert(relative, absolute);
            }
        }

        tracing::debug!(root = %root.display(), files = entries.len(), "Indexed tree");

        Ok(Self { root, entries })
    }

    /// The root this index was built from.
    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn contains(&self, relative: &NormalizedPath) -> bool {
        self.entries.contains_key(relative)
    }

    /// Absolute path of the file at `relative`, if indexed.
    pub fn get(&self, relative: &NormalizedPath) -> Option<&Path> {
        self.entries.get(relative).map(PathBuf::as_path)
    }

    /// Native relative path of an indexed file, suitable for joining onto
    /// another tree's root.
    pub fn native_relative(&self, relative: &NormalizedPath) -> Option<&Path> {
        self.get(relative)
            .and_then(|absolute| absolute.strip_prefix(&self.root).ok())
    }

    /// Iterate `(relative, absolute)` pairs in relative-path order.
    pub fn iter(&self) -> impl Iterator<Item = (&NormalizedPath, &Path)> {
        self.entries
            .iter()
            .map(|(relative, absolute)| (relative, absolute.as_path()))
    }

    /// Iterate relative paths in order.
    pub fn relative_paths(&self) -> impl Iterator<Item = &NormalizedPath> {
        self.entries.keys()
    }
}
