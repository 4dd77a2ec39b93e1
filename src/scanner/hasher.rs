//! BLAKE3 file hasher with streaming support.
//!
//! # Overview
//!
//! [`Hasher`] computes two digests per file:
//! - a *prehash* over at most the first [`PREHASH_SIZE`] bytes, and
//! - a *full hash* streamed through a [`ChunkReader`] in [`CHUNK_SIZE`]
//!   pieces, so peak memory is one chunk regardless of file size.
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::scanner::{hash_to_hex, Hasher};
//! use std::path::Path;
//!
//! let hasher = Hasher::new().with_chunk_size(1 << 20);
//! let digest = hasher.full_hash(Path::new("big.iso")).unwrap();
//! println!("{}", hash_to_hex(&digest));
//! ```

use std::fmt::Write as _;
use std::path::Path;

use super::{ChunkReader, FileError};

/// A 256-bit BLAKE3 digest.
pub type Hash = [u8; 32];

/// Default number of leading bytes covered by the prehash (16 KiB).
pub const PREHASH_SIZE: usize = 16 * 1024;

/// Default streaming chunk size (64 KiB).
pub const CHUNK_SIZE: usize = 64 * 1024;

/// Streaming content hasher.
#[derive(Debug, Clone)]
pub struct Hasher {
    head_size: usize,
    chunk_size: usize,
}

impl Default for Hasher {
    fn default() -> Self {
        Self::new()
    }
}

impl Hasher {
    /// Create a hasher with the default head and chunk sizes.
    #[must_use]
    pub fn new() -> Self {
        Self {
            head_size: PREHASH_SIZE,
            chunk_size: CHUNK_SIZE,
        }
    }

    /// Set how many leading bytes the prehash covers.
    #[must_use]
    pub fn with_head_size(mut self, bytes: usize) -> Self {
        self.head_size = bytes.max(1);
        self
    }

    /// Set the streaming chunk size for full hashes.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Leading bytes covered by [`prehash`](Self::prehash).
    #[must_use]
    pub fn head_size(&self) -> usize {
        self.head_size
    }

    /// Chunk size used by [`full_hash`](Self::full_hash).
    #[must_use]
    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    /// Hash at most the first `head_size` bytes of `path`.
    ///
    /// Shorter files are hashed in full; the digest is still comparable with
    /// other files of the same length.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the file cannot be opened or read.
    pub fn prehash(&self, path: &Path) -> Result<Hash, FileError> {
        let mut reader = ChunkReader::open(path, self.head_size)?;
        let mut hasher = blake3::Hasher::new();
        if let Some(chunk) = reader.next_chunk()? {
            hasher.update(chunk);
        }
        Ok(*hasher.finalize().as_bytes())
    }

    /// Hash the entire content of `path`, one chunk at a time.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the file cannot be opened or a read fails.
    pub fn full_hash(&self, path: &Path) -> Result<Hash, FileError> {
        let mut reader = ChunkReader::open(path, self.chunk_size)?;
        let mut hasher = blake3::Hasher::new();
        while let Some(chunk) = reader.next_chunk()? {
            hasher.update(chunk);
        }
        log::trace!("Hashed {} bytes of {}", reader.offset(), path.display());
        Ok(*hasher.finalize().as_bytes())
    }
}

/// Render a digest as lowercase hex.
#[must_use]
pub fn hash_to_hex(hash: &Hash) -> String {
    hash.iter().fold(String::with_capacity(64), |mut out, byte| {
        let _ = write!(out, "{byte:02x}");
        out
    })
}
