//! Duplicate detection module.
//!
//! This module provides functionality for:
//! - Size-based file grouping (stage 1)
//! - Partial hash comparison over the leading chunk (stage 2)
//! - Full hash comparison, or lockstep exact comparison (stage 3)
//! - Per-run statistics threaded through every stage
//!
//! Each stage consumes the groups produced by the previous one, never adds a
//! file and never merges groups. Only groups of two or more files move on.

pub mod exact;
pub mod finder;
pub mod groups;
pub mod hashing;
pub mod stats;

use std::sync::Arc;

use rayon::ThreadPool;

use crate::progress::ProgressCallback;

pub use exact::compare_exact;
pub use finder::{CompareMode, DuplicateFinder, FinderConfig};
pub use groups::{
    group_by_size, group_records_by_size, DuplicateSet, FileGroup, GroupKey, Verification,
};
pub use hashing::{group_by_full_hash, group_by_partial_hash};
pub use stats::{ExcludedFile, RunStats, Stage, StageSummary};

/// Execution options shared by the content-reading stages.
#[derive(Clone)]
pub struct StageOptions {
    /// Number of files read concurrently.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for StageOptions {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("StageOptions")
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for StageOptions {
    fn default() -> Self {
        Self {
            io_threads: 4,
            progress_callback: None,
        }
    }
}

impl StageOptions {
    /// Set the number of concurrent readers.
    #[must_use]
    pub fn with_io_threads(mut self, threads: usize) -> Self {
        self.io_threads = threads.max(1);
        self
    }

    /// Set the progress callback.
    #[must_use]
    pub fn with_progress_callback(mut self, callback: Arc<dyn ProgressCallback>) -> Self {
        self.progress_callback = Some(callback);
        self
    }

    /// Build the bounded I/O pool for one stage.
    ///
    /// Returns `None` when the pool cannot be created; work then runs on the
    /// global rayon pool.
    pub(crate) fn build_pool(&self) -> Option<ThreadPool> {
        match rayon::ThreadPoolBuilder::new()
            .num_threads(self.io_threads)
            .build()
        {
            Ok(pool) => Some(pool),
            Err(e) => {
                log::warn!(
                    "Failed to create I/O thread pool ({}), using global pool with {} threads",
                    e,
                    rayon::current_num_threads()
                );
                None
            }
        }
    }

    pub(crate) fn phase_start(&self, phase: &str, total: usize) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_start(phase, total);
        }
    }

    pub(crate) fn progress(&self, current: usize, path: &std::path::Path) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_progress(current, path.to_string_lossy().as_ref());
        }
    }

    pub(crate) fn phase_end(&self, phase: &str) {
        if let Some(ref callback) = self.progress_callback {
            callback.on_phase_end(phase);
        }
    }
}

/// Run `f` inside `pool`, or directly when no pool is available.
pub(crate) fn install<R, F>(pool: Option<&ThreadPool>, f: F) -> R
where
    R: Send,
    F: FnOnce() -> R + Send,
{
    match pool {
        Some(pool) => pool.install(f),
        None => f(),
    }
}
