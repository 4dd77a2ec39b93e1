//! Fixed-size chunked file reading.
//!
//! A [`ChunkReader`] owns one open file handle and one chunk buffer, so memory
//! use is bounded by the chunk size no matter how large the file is. The
//! handle is released when the reader is dropped.

use std::fs::File;
use std::io::Read;
use std::path::{Path, PathBuf};

use super::FileError;

/// Sequential reader yielding successive chunks of one file.
#[derive(Debug)]
pub struct ChunkReader {
    path: PathBuf,
    file: File,
    chunk_size: usize,
    buf: Vec<u8>,
    offset: u64,
    exhausted: bool,
}

impl ChunkReader {
    /// Open `path` for chunked reading.
    ///
    /// A `chunk_size` of zero is treated as one byte.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the file cannot be opened.
    pub fn open(path: &Path, chunk_size: usize) -> Result<Self, FileError> {
        let file = File::open(path).map_err(|e| FileError::from_io(path, e))?;
        let chunk_size = chunk_size.max(1);
        Ok(Self {
            path: path.to_path_buf(),
            file,
            chunk_size,
            buf: Vec::with_capacity(chunk_size),
            offset: 0,
            exhausted: false,
        })
    }

    /// Read the next chunk into the internal buffer and return its length.
    ///
    /// Each chunk is exactly `chunk_size` bytes except the last one, which is
    /// shorter (possibly empty). Once a short chunk has been read the reader
    /// is [exhausted](Self::is_exhausted) and further calls return 0.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the read fails.
    pub fn fill_next(&mut self) -> Result<usize, FileError> {
        self.buf.clear();
        if self.exhausted {
            return Ok(0);
        }
        let read = (&mut self.file)
            .take(self.chunk_size as u64)
            .read_to_end(&mut self.buf)
            .map_err(|e| FileError::from_io(&self.path, e))?;
        self.offset += read as u64;
        if read < self.chunk_size {
            self.exhausted = true;
        }
        Ok(read)
    }

    /// Read the next chunk and borrow it, or `None` at end of file.
    ///
    /// # Errors
    ///
    /// Returns [`FileError`] if the read fails.
    pub fn next_chunk(&mut self) -> Result<Option<&[u8]>, FileError> {
        if self.fill_next()? == 0 {
            Ok(None)
        } else {
            Ok(Some(&self.buf))
        }
    }

    /// The chunk most recently read by [`fill_next`](Self::fill_next).
    #[must_use]
    pub fn chunk(&self) -> &[u8] {
        &self.buf
    }

    /// Total bytes consumed from the file so far.
    #[must_use]
    pub fn offset(&self) -> u64 {
        self.offset
    }

    /// Whether end of file has been observed.
    #[must_use]
    pub fn is_exhausted(&self) -> bool {
        self.exhausted
    }

    /// Path of the underlying file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }
}
