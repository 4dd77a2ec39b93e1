//! File removal back-ends.
//!
//! # Overview
//!
//! Two ways to get rid of a duplicate:
//! - Permanent removal with `remove_file` (the default)
//! - Move to the platform trash via the [`trash`] crate (`--trash`)
//!
//! Before removing anything, the file is stat'ed again and its size compared
//! with the size recorded during the scan. A file that changed length since
//! then is no longer known to be a duplicate and is left alone.
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::actions::delete::{delete_batch, DeleteConfig};
//! use std::path::PathBuf;
//!
//! let doomed = vec![PathBuf::from("/backup/copy.iso")];
//! let result = delete_batch(&doomed, Some(4_700_000_000), &DeleteConfig::trash());
//! println!("{}", result.summary());
//! ```

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

/// Per-file deletion failure. Reported, never fatal.
#[derive(Debug, Error)]
pub enum DeleteError {
    /// File was not found (already deleted or moved).
    #[error("file not found: {0}")]
    NotFound(PathBuf),

    /// Permission denied when attempting to delete.
    #[error("permission denied: {0}")]
    PermissionDenied(PathBuf),

    /// File changed size since it was scanned.
    #[error("file modified since scan: {path} (was {expected} bytes, now {actual})")]
    Modified {
        /// Path of the file
        path: PathBuf,
        /// Size recorded by the scan
        expected: u64,
        /// Size found just before deletion
        actual: u64,
    },

    /// Not a regular file any more (replaced by a directory or symlink).
    #[error("not a regular file: {0}")]
    NotAFile(PathBuf),

    /// Trash operation failed.
    #[error("trash operation failed for {path}: {message}")]
    TrashFailed {
        /// Path of the file
        path: PathBuf,
        /// Message from the trash back-end
        message: String,
    },

    /// Any other I/O failure.
    #[error("I/O error for {path}: {source}")]
    Io {
        /// Path of the file
        path: PathBuf,
        /// The underlying I/O error
        #[source]
        source: io::Error,
    },
}

impl DeleteError {
    fn from_io(path: &Path, err: io::Error) -> Self {
        match err.kind() {
            io::ErrorKind::NotFound => Self::NotFound(path.to_path_buf()),
            io::ErrorKind::PermissionDenied => Self::PermissionDenied(path.to_path_buf()),
            _ => Self::Io {
                path: path.to_path_buf(),
                source: err,
            },
        }
    }

    /// The path the failure concerns.
    #[must_use]
    pub fn path(&self) -> &Path {
        match self {
            Self::NotFound(p)
            | Self::PermissionDenied(p)
            | Self::NotAFile(p)
            | Self::Modified { path: p, .. }
            | Self::TrashFailed { path: p, .. }
            | Self::Io { path: p, .. } => p,
        }
    }
}

/// A file that was removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteResult {
    /// Path that was removed.
    pub path: PathBuf,
    /// Size of the removed file in bytes.
    pub size: u64,
    /// Whether it was removed permanently (`false` = moved to trash).
    pub permanent: bool,
}

/// Outcome of removing several files.
#[derive(Debug, Clone, Default)]
pub struct BatchDeleteResult {
    /// Files removed.
    pub successes: Vec<DeleteResult>,
    /// Files that could not be removed, with the reason.
    pub failures: Vec<(PathBuf, String)>,
    /// Total bytes freed.
    pub bytes_freed: u64,
}

impl BatchDeleteResult {
    /// Number of files removed.
    #[must_use]
    pub fn success_count(&self) -> usize {
        self.successes.len()
    }

    /// Number of failures.
    #[must_use]
    pub fn failure_count(&self) -> usize {
        self.failures.len()
    }

    /// Whether every attempted removal succeeded.
    #[must_use]
    pub fn all_succeeded(&self) -> bool {
        self.failures.is_empty()
    }

    /// Fold another batch into this one.
    pub fn merge(&mut self, other: BatchDeleteResult) {
        self.bytes_freed += other.bytes_freed;
        self.successes.extend(other.successes);
        self.failures.extend(other.failures);
    }

    /// One-line human-readable summary.
    #[must_use]
    pub fn summary(&self) -> String {
        let freed = bytesize::ByteSize::b(self.bytes_freed);
        if self.all_succeeded() {
            format!("Deleted {} file(s), freed {}", self.success_count(), freed)
        } else {
            format!(
                "Deleted {} file(s), {} failed, freed {}",
                self.success_count(),
                self.failure_count(),
                freed
            )
        }
    }
}

/// How files are removed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeleteConfig {
    /// Remove permanently instead of moving to the trash.
    pub permanent: bool,
}

impl Default for DeleteConfig {
    fn default() -> Self {
        Self { permanent: true }
    }
}

impl DeleteConfig {
    /// Move files to the platform trash.
    #[must_use]
    pub fn trash() -> Self {
        Self { permanent: false }
    }

    /// Remove files permanently.
    #[must_use]
    pub fn permanent() -> Self {
        Self::default()
    }
}

/// Current size of `path`, which must still be a regular file.
fn current_size(path: &Path) -> Result<u64, DeleteError> {
    let metadata = fs::symlink_metadata(path).map_err(|e| DeleteError::from_io(path, e))?;
    if !metadata.file_type().is_file() {
        return Err(DeleteError::NotAFile(path.to_path_buf()));
    }
    Ok(metadata.len())
}

/// Move one file to the platform trash.
///
/// # Errors
///
/// Returns [`DeleteError`] if the file is gone, is not a regular file, or the
/// trash back-end refuses it.
pub fn delete_to_trash(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = current_size(path)?;
    trash::delete(path).map_err(|e| DeleteError::TrashFailed {
        path: path.to_path_buf(),
        message: e.to_string(),
    })?;
    log::info!("Moved to trash: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: false,
    })
}

/// Remove one file permanently.
///
/// # Errors
///
/// Returns [`DeleteError`] if the file is gone, is not a regular file, or
/// cannot be removed.
pub fn permanent_delete(path: &Path) -> Result<DeleteResult, DeleteError> {
    let size = current_size(path)?;
    fs::remove_file(path).map_err(|e| DeleteError::from_io(path, e))?;
    log::info!("Deleted: {} ({} bytes)", path.display(), size);
    Ok(DeleteResult {
        path: path.to_path_buf(),
        size,
        permanent: true,
    })
}

/// Remove one file after checking it still has the scanned size.
///
/// # Errors
///
/// Returns [`DeleteError::Modified`] when the size changed, or any error from
/// the selected back-end.
pub fn delete_verified(
    path: &Path,
    expected_size: Option<u64>,
    config: &DeleteConfig,
) -> Result<DeleteResult, DeleteError> {
    if let Some(expected) = expected_size {
        let actual = current_size(path)?;
        if actual != expected {
            return Err(DeleteError::Modified {
                path: path.to_path_buf(),
                expected,
                actual,
            });
        }
    }

    if config.permanent {
        permanent_delete(path)
    } else {
        delete_to_trash(path)
    }
}

/// Remove several files, continuing past individual failures.
///
/// `expected_size` is the size every file had during the scan (members of
/// one duplicate set share it).
pub fn delete_batch(
    paths: &[PathBuf],
    expected_size: Option<u64>,
    config: &DeleteConfig,
) -> BatchDeleteResult {
    let mut result = BatchDeleteResult::default();

    for path in paths {
        match delete_verified(path, expected_size, config) {
            Ok(deleted) => {
                result.bytes_freed += deleted.size;
                result.successes.push(deleted);
            }
            Err(e) => {
                log::warn!("Failed to delete {}: {}", path.display(), e);
                result.failures.push((path.clone(), e.to_string()));
            }
        }
    }

    log::debug!("{}", result.summary());
    result
}
