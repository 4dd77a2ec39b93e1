//! Duplicate finder: orchestrates the detection pipeline.
//!
//! # Overview
//!
//! 1. **Enumerate** - Walk the roots (see [`crate::scanner::walker`])
//! 2. **Stage 1 - Size grouping** - Bucket by exact byte length
//! 3. **Stage 2 - Partial hash** - Digest of the first `head_size` bytes
//! 4. **Stage 3 - Confirmation** - Full-content digest, or exact lockstep
//!    comparison when [`CompareMode::Exact`] is selected
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::duplicates::{CompareMode, DuplicateFinder, FinderConfig};
//! use fastdupes::scanner::WalkerConfig;
//! use std::path::PathBuf;
//!
//! let config = FinderConfig::default().with_mode(CompareMode::Exact);
//! let finder = DuplicateFinder::new(config);
//! let (sets, stats) = finder.find_duplicates(&[PathBuf::from(".")], WalkerConfig::default());
//!
//! println!("{} duplicate sets, {} files excluded", sets.len(), stats.excluded.len());
//! ```

use std::path::PathBuf;
use std::sync::Arc;
use std::time::Instant;

use serde::{Deserialize, Serialize};

use super::exact::compare_exact;
use super::groups::{group_by_size, DuplicateSet};
use super::hashing::{group_by_full_hash, group_by_partial_hash};
use super::stats::RunStats;
use super::StageOptions;
use crate::progress::ProgressCallback;
use crate::scanner::{Hasher, Walker, WalkerConfig, CHUNK_SIZE, PREHASH_SIZE};

/// How the final stage confirms that candidates are identical.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum CompareMode {
    /// Compare full-content BLAKE3 digests.
    #[default]
    Hash,
    /// Compare contents directly, chunk by chunk, stopping at the first difference.
    Exact,
}

impl std::fmt::Display for CompareMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Hash => write!(f, "hash"),
            Self::Exact => write!(f, "exact"),
        }
    }
}

/// Configuration for the duplicate finder.
#[derive(Clone)]
pub struct FinderConfig {
    /// Leading bytes covered by the partial hash.
    pub head_size: usize,
    /// Streaming chunk size for full hashing and exact comparison.
    pub chunk_size: usize,
    /// Final-stage comparison mode.
    pub mode: CompareMode,
    /// Files smaller than this are ignored.
    pub min_size: u64,
    /// Number of I/O threads for parallel reads.
    pub io_threads: usize,
    /// Optional progress callback.
    pub progress_callback: Option<Arc<dyn ProgressCallback>>,
}

impl std::fmt::Debug for FinderConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("FinderConfig")
            .field("head_size", &self.head_size)
            .field("chunk_size", &self.chunk_size)
            .field("mode", &self.mode)
            .field("min_size", &self.min_size)
            .field("io_threads", &self.io_threads)
            .field(
                "progress_callback",
                &self.progress_callback.as_ref().map(|_| "<callback>"),
            )
            .finish()
    }
}

impl Default for FinderConfig {
    fn default() -> Self {
        Self {
            head_size: PREHASH_SIZE,
            chunk_size: CHUNK_SIZE,
            mode: CompareMode::Hash,
            min_size: 25,
            io_threads: 4,
            progress_callback: None,
        }
    }
}

impl FinderConfig {
    /// Set the partial-hash head size.
    #[must_use]
    pub fn with_head_size(mut self, bytes: usize) -> Self {
        self.head_size = bytes.max(1);
        self
    }

    /// Set the streaming chunk size.
    #[must_use]
    pub fn with_chunk_size(mut self, bytes: usize) -> Self {
        self.chunk_size = bytes.max(1);
        self
    }

    /// Set the final-stage comparison mode.
    #[must_use]
    pub fn with_mode(mut self, mode: CompareMode) -> Self {
        self.mode = mode;
        self
    }

    /// Set the minimum file size considered.
    #[must_use]
    pub fn with_min_size(mut self, bytes: u64) -> Self {
        self.min_size = bytes;
        self
    }

    /// Set the number of I/O threads.
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

    fn stage_options(&self) -> StageOptions {
        StageOptions {
            io_threads: self.io_threads,
            progress_callback: self.progress_callback.clone(),
        }
    }
}

/// Runs the complete detection pipeline.
#[derive(Debug)]
pub struct DuplicateFinder {
    config: FinderConfig,
    hasher: Hasher,
}

impl DuplicateFinder {
    /// Create a finder with the given configuration.
    #[must_use]
    pub fn new(config: FinderConfig) -> Self {
        let hasher = Hasher::new()
            .with_head_size(config.head_size)
            .with_chunk_size(config.chunk_size);
        Self { config, hasher }
    }

    /// Create a finder with default configuration.
    #[must_use]
    pub fn with_defaults() -> Self {
        Self::new(FinderConfig::default())
    }

    /// The active configuration.
    #[must_use]
    pub fn config(&self) -> &FinderConfig {
        &self.config
    }

    /// Find duplicates under `roots`.
    ///
    /// Roots may overlap; each file is considered once. Missing roots and
    /// unreadable directories are recorded in the returned statistics and
    /// never abort the run.
    pub fn find_duplicates(
        &self,
        roots: &[PathBuf],
        walker_config: WalkerConfig,
    ) -> (Vec<DuplicateSet>, RunStats) {
        let start = Instant::now();
        let mut stats = RunStats::new();

        let walker = Walker::new(roots, walker_config);
        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_start("walking", 0);
        }

        let mut paths = Vec::new();
        for item in walker.walk() {
            match item {
                Ok(path) => {
                    if let Some(ref callback) = self.config.progress_callback {
                        callback.on_progress(paths.len() + 1, path.to_string_lossy().as_ref());
                    }
                    paths.push(path);
                }
                Err(e) => stats.scan_error(e),
            }
        }

        if let Some(ref callback) = self.config.progress_callback {
            callback.on_phase_end("walking");
        }
        log::info!("Enumerated {} files", paths.len());

        let sets = self.run_stages(paths, &mut stats);
        stats.duration = start.elapsed();
        (sets, stats)
    }

    /// Find duplicates among an explicit list of paths.
    pub fn find_duplicates_from_paths(
        &self,
        paths: impl IntoIterator<Item = PathBuf>,
    ) -> (Vec<DuplicateSet>, RunStats) {
        let start = Instant::now();
        let mut stats = RunStats::new();
        let sets = self.run_stages(paths.into_iter().collect(), &mut stats);
        stats.duration = start.elapsed();
        (sets, stats)
    }

    fn run_stages(&self, paths: Vec<PathBuf>, stats: &mut RunStats) -> Vec<DuplicateSet> {
        stats.files_enumerated = paths.len();
        let options = self.config.stage_options();

        let groups = group_by_size(paths, self.config.min_size, stats);
        if groups.is_empty() {
            log::info!("No files share a size; nothing more to compare");
            return Vec::new();
        }

        let groups = group_by_partial_hash(groups, &self.hasher, &options, stats);
        if groups.is_empty() {
            return Vec::new();
        }

        let mut sets = match self.config.mode {
            CompareMode::Hash => group_by_full_hash(groups, &self.hasher, &options, stats),
            CompareMode::Exact => compare_exact(groups, self.config.chunk_size, &options, stats),
        };

        sets.sort_by(|a, b| a.files[0].path.cmp(&b.files[0].path));

        log::info!(
            "Found {} duplicate sets ({} mode, {} files excluded)",
            sets.len(),
            self.config.mode,
            stats.excluded.len()
        );
        sets
    }
}
