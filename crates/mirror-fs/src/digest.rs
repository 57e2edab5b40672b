//! Content digests and file equality
//!
//! Two files are considered equal when they have the same byte length and
//! the same digest under the selected [`DigestAlgorithm`]. The length check
//! runs first and short-circuits without reading content, which avoids full
//! reads in the common "file grew or shrank" case.
//!
//! Digests are used for change detection only, so the weak and fast MD5 is
//! the default. SHA-256 is available when collision resistance matters.

use std::fmt::{self, Write as _};
use std::fs::File;
use std::io::{self, BufReader, Write};
use std::path::Path;
use std::str::FromStr;

use md5::Md5;
use sha2::{Digest, Sha256};

use crate::{Error, Result};

/// Hash algorithm used to fingerprint file content.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum DigestAlgorithm {
    /// 128-bit MD5. Fast; not collision resistant.
    #[default]
    Md5,
    /// 256-bit SHA-256. Slower; collision resistant.
    Sha256,
}

impl DigestAlgorithm {
    /// Canonical lowercase name.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Md5 => "md5",
            Self::Sha256 => "sha256",
        }
    }

    /// Digest length in bytes.
    pub fn output_len(&self) -> usize {
        match self {
            Self::Md5 => 16,
            Self::Sha256 => 32,
        }
    }
}

impl fmt::Display for DigestAlgorithm {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for DigestAlgorithm {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim().to_ascii_lowercase().as_str() {
            "md5" => Ok(Self::Md5),
            "sha256" | "sha-256" => Ok(Self::Sha256),
            _ => Err(Error::UnsupportedAlgorithm {
                name: s.to_string(),
            }),
        }
    }
}

/// Fixed-length fingerprint of a file's content.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileDigest {
    algorithm: DigestAlgorithm,
    bytes: Vec<u8>,
}

impl FileDigest {
    pub fn algorithm(&self) -> DigestAlgorithm {
        self.algorithm
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.bytes
    }

    /// Lowercase hexadecimal rendering of the digest bytes.
    pub fn to_hex(&self) -> String {
        self.bytes
            .iter()
            .fold(String::with_capacity(self.bytes.len() * 2), |mut out, b| {
                let _ = write!(out, "{b:02x}");
                out
            })
    }
}

impl fmt::Display for FileDigest {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_hex())
    }
}

/// Compute the digest of a file's full byte stream.
///
/// The file is streamed through the hasher rather than loaded into memory.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_digest(path: &Path, algorithm: DigestAlgorithm) -> Result<FileDigest> {
    let file = File::open(path).map_err(|e| Error::io(path, e))?;
    let mut reader = BufReader::new(file);

    let bytes = match algorithm {
        DigestAlgorithm::Md5 => hash_stream::<Md5>(&mut reader),
        DigestAlgorithm::Sha256 => hash_stream::<Sha256>(&mut reader),
    }
    .map_err(|e| Error::io(path, e))?;

    Ok(FileDigest { algorithm, bytes })
}

/// Compute the digest of a file as a lowercase hexadecimal string.
///
/// # Errors
///
/// Returns an error if the file cannot be opened or read.
pub fn compute_digest_hex(path: &Path, algorithm: DigestAlgorithm) -> Result<String> {
    compute_digest(path, algorithm).map(|digest| digest.to_hex())
}

/// Decide whether two files have identical content.
///
/// A missing file on either side is not an error: the files are simply not
/// equal. Files of different lengths are reported unequal without reading
/// their content.
///
/// # Errors
///
/// Returns an error for I/O failures other than a missing file, such as a
/// permission error while reading.
pub fn files_equal(a: &Path, b: &Path, algorithm: DigestAlgorithm) -> Result<bool> {
    compare_files(a, b, |path| compute_digest(path, algorithm))
}

fn compare_files<F>(a: &Path, b: &Path, mut digest: F) -> Result<bool>
where
    F: FnMut(&Path) -> Result<FileDigest>,
{
    let (Some(len_a), Some(len_b)) = (file_len(a)?, file_len(b)?) else {
        return Ok(false);
    };

    if len_a != len_b {
        tracing::debug!(a = %a.display(), b = %b.display(), len_a, len_b, "Length mismatch");
        return Ok(false);
    }

    let digest_a = match digest(a) {
        Ok(d) => d,
        Err(e) if e.is_not_found() => return Ok(false),
        Err(e) => return Err(e),
    };
    let digest_b = match digest(b) {
        Ok(d) => d,
        Err(e) if e.is_not_found() => return Ok(false),
        Err(e) => return Err(e),
    };

    Ok(digest_a == digest_b)
}

/// Byte length of a regular file, or `None` if there is no file at `path`.
fn file_len(path: &Path) -> Result<Option<u64>> {
    match std::fs::metadata(path) {
        Ok(meta) if meta.is_file() => Ok(Some(meta.len())),
        Ok(_) => Ok(None),
        Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
        Err(e) => Err(Error::io(path, e)),
    }
}

fn hash_stream<D: Digest + Write>(reader: &mut impl io::Read) -> io::Result<Vec<u8>> {
    let mut hasher = D::new();
    io::copy(reader, &mut hasher)?;
    Ok(hasher.finalize().to_vec())
}
