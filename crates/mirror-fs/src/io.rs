//! File operations applied to a replica tree
//!
//! Copies are plain overwrites: no temp-file-and-rename. A failure midway may
//! leave a partially written target, which the next synchronization run
//! detects and replaces.

use std::fs;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use crate::{Error, Result};

/// Create `path` and all missing ancestors.
pub fn ensure_dir(path: &Path) -> Result<()> {
    fs::create_dir_all(path).map_err(|e| Error::io(path, e))
}

/// Copy the full content of `src` to `dst`, overwriting `dst` if it exists.
///
/// Missing parent directories of `dst` are created first. Returns the number
/// of bytes copied.
pub fn copy_file(src: &Path, dst: &Path) -> Result<u64> {
    if let Some(parent) = dst.parent()
        && !parent.is_dir()
    {
        ensure_dir(parent)?;
    }

    fs::copy(src, dst).map_err(|e| {
        // Attribute the error to whichever side is actually broken
        if src.is_file() {
            Error::io(dst, e)
        } else {
            Error::io(src, e)
        }
    })
}

/// Delete the file at `path`.
pub fn remove_file(path: &Path) -> Result<()> {
    fs::remove_file(path).map_err(|e| Error::io(path, e))
}

/// Remove a directory that holds nothing but (possibly nested) empty
/// directories.
///
/// Fails without removing `path` itself if any non-directory entry remains
/// underneath it.
pub fn remove_empty_tree(path: &Path) -> Result<()> {
    for entry in WalkDir::new(path).contents_first(true) {
        let entry = entry.map_err(|source| Error::Walk {
            root: path.to_path_buf(),
            source,
        })?;

        if entry.file_type().is_dir() {
            fs::remove_dir(entry.path()).map_err(|e| Error::io(entry.path(), e))?;
        }
    }
    Ok(())
}

/// Whether `relative`, or any of its ancestors below `root`, is a symbolic
/// link.
///
/// `root` itself is not inspected.
pub fn has_symlink(root: &Path, relative: &Path) -> Result<bool> {
    for path in prefixes(root, relative) {
        if is_symlink(&path)? {
            return Ok(true);
        }
    }
    Ok(false)
}

/// Remove every symbolic link found at `relative` or at one of its ancestors
/// below `root`. The link targets are left untouched.
///
/// Returns the number of links removed.
pub fn remove_symlinks(root: &Path, relative: &Path) -> Result<usize> {
    let mut removed = 0;
    for path in prefixes(root, relative) {
        if !is_symlink(&path)? {
            continue;
        }
        remove_link(&path)?;
        tracing::debug!(path = %path.display(), "Removed symlink");
        removed += 1;
    }
    Ok(removed)
}

/// `root/a`, `root/a/b`, ... for each component of `relative`.
fn prefixes(root: &Path, relative: &Path) -> Vec<PathBuf> {
    let mut current = root.to_path_buf();
    relative
        .components()
        .map(|component| {
            current.push(component);
            current.clone()
        })
        .collect()
}

fn is_symlink(path: &Path) -> Result<bool> {
    match fs::symlink_metadata(path) {
        Ok(meta) => Ok(meta.file_type().is_symlink()),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(false),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn remove_link(path: &Path) -> Result<()> {
    let result = fs::remove_file(path);
    // Directory links on Windows are removed as directories
    #[cfg(windows)]
    let result = result.or_else(|_| fs::remove_dir(path));
    result.map_err(|e| Error::io(path, e))
}
