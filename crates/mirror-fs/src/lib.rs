//! Filesystem primitives for Folder Mirror
//!
//! Provides relative-path indexing of directory trees, content digests for
//! file equality checks, and the copy/delete operations the synchronizer
//! applies to a replica tree.

pub mod digest;
pub mod error;
pub mod index;
pub mod io;
pub mod path;

pub use digest::{DigestAlgorithm, FileDigest, compute_digest, compute_digest_hex, files_equal};
pub use error::{Error, Result};
pub use index::PathIndex;
pub use path::NormalizedPath;
