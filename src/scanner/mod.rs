//! Scanner module: file records, chunked reading, hashing and path discovery.
//!
//! This module provides functionality for:
//! - Per-file records with lazily cached partial and full hashes
//! - Bounded-memory chunked reading ([`ChunkReader`])
//! - Content hashing with BLAKE3 ([`Hasher`])
//! - Path enumeration over overlapping roots ([`Walker`])
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::scanner::{FileRecord, Hasher};
//! use std::path::PathBuf;
//!
//! let hasher = Hasher::new();
//! let mut record = FileRecord::new(PathBuf::from("/tmp/a.bin"), 1024);
//!
//! // The first call reads the file, later calls return the cached digest.
//! let first = record.partial_hash(&hasher).unwrap();
//! let again = record.partial_hash(&hasher).unwrap();
//! assert_eq!(first, again);
//! ```

pub mod hasher;
pub mod reader;
pub mod walker;

use std::io;
use std::path::{Path, PathBuf};

pub use hasher::{hash_to_hex, Hash, Hasher, CHUNK_SIZE, PREHASH_SIZE};
pub use reader::ChunkReader;
pub use walker::{Walker, WalkerConfig};

/// A candidate file travelling through the detection pipeline.
///
/// The size is captured once by the size stage and never refreshed. Hashes
/// are filled in by the stage that first needs them and reused afterwards.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FileRecord {
    /// Absolute path to the file
    pub path: PathBuf,
    /// File size in bytes, as seen by the size stage
    pub size: u64,
    partial_hash: Option<Hash>,
    full_hash: Option<Hash>,
}

impl FileRecord {
    /// Create a record with no cached hashes.
    #[must_use]
    pub fn new(path: PathBuf, size: u64) -> Self {
        Self {
            path,
            size,
            partial_hash: None,
            full_hash: None,
        }
    }

    /// Stat `path` without following symlinks.
    ///
    /// Returns `Ok(None)` for anything that is not a regular file (symlinks
    /// included), so callers can skip it silently.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the metadata lookup fails.
    pub fn stat(path: PathBuf) -> Result<Option<Self>, FileError> {
        let metadata = std::fs::symlink_metadata(&path).map_err(|e| FileError::from_io(&path, e))?;
        if !metadata.file_type().is_file() {
            return Ok(None);
        }
        Ok(Some(Self::new(path, metadata.len())))
    }

    /// The cached leading-chunk digest, if one was computed.
    #[must_use]
    pub fn cached_partial_hash(&self) -> Option<Hash> {
        self.partial_hash
    }

    /// The cached full-content digest, if one was computed.
    #[must_use]
    pub fn cached_full_hash(&self) -> Option<Hash> {
        self.full_hash
    }

    /// Digest of the leading chunk, computed on first use.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the file cannot be opened or read.
    pub fn partial_hash(&mut self, hasher: &Hasher) -> Result<Hash, FileError> {
        if let Some(hash) = self.partial_hash {
            return Ok(hash);
        }
        let hash = hasher.prehash(&self.path)?;
        self.partial_hash = Some(hash);
        Ok(hash)
    }

    /// Digest of the whole file, computed on first use.
    ///
    /// A file no longer than the hasher's leading-chunk size was already read
    /// in full by [`partial_hash`](Self::partial_hash), so that digest is
    /// reused instead of reading the file again.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the file cannot be opened or read.
    pub fn full_hash(&mut self, hasher: &Hasher) -> Result<Hash, FileError> {
        if let Some(hash) = self.full_hash {
            return Ok(hash);
        }
        let hash = match self.partial_hash {
            Some(partial) if self.size <= hasher.head_size() as u64 => {
                log::trace!("Reusing partial hash as full hash: {}", self.path.display());
                partial
            }
            _ => hasher.full_hash(&self.path)?,
        };
        self.full_hash = Some(hash);
        Ok(hash)
    }
}

/// Per-file failures. These exclude one file from the run and are never fatal.
#[derive(thiserror::Error, Debug)]
pub enum FileError {
    /// The file disappeared between enumeration and processing.
    #[error("File vanished: {0}")]
    Vanished(PathBuf),

    /// The file exists but could not be stat'ed, opened, read or deleted.
    #[error("Inaccessible: {path}: {source}")]
    Inaccessible {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl FileError {
    /// Classify an I/O error raised while touching `path`.
    #[must_use]
    pub fn from_io(path: &Path, error: io::Error) -> Self {
        match error.kind() {
            io::ErrorKind::NotFound => Self::Vanished(path.to_path_buf()),
            _ => Self::Inaccessible {
                path: path.to_path_buf(),
                source: error,
            },
        }
    }

    /// Path of the file this error excludes.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::Vanished(path) | Self::Inaccessible { path, .. } => path,
        }
    }
}

/// Errors raised while enumerating paths.
#[derive(thiserror::Error, Debug)]
pub enum ScanError {
    /// A root given on the command line does not exist.
    #[error("Path not found: {0}")]
    NotFound(PathBuf),

    /// A directory or entry could not be read during traversal.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path where the error occurred
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}
