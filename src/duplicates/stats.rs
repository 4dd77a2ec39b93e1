//! Run statistics threaded explicitly through the pipeline.
//!
//! Every stage receives `&mut RunStats`, records the files it had to drop
//! and pushes one [`StageSummary`] when it finishes. Nothing here is global.

use std::time::Duration;

use serde::Serialize;

use crate::scanner::{FileError, ScanError};

/// Pipeline stages, in execution order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum Stage {
    /// Grouping by exact byte length
    Size,
    /// Grouping by digest of the leading chunk
    PartialHash,
    /// Grouping by digest of the whole content
    FullHash,
    /// Lockstep byte comparison
    Exact,
}

impl Stage {
    /// Short machine name, also used as the progress phase name.
    #[must_use]
    pub fn name(self) -> &'static str {
        match self {
            Self::Size => "size",
            Self::PartialHash => "partial",
            Self::FullHash => "full",
            Self::Exact => "exact",
        }
    }

    /// What files are compared by at this stage, for messages.
    #[must_use]
    pub fn description(self) -> &'static str {
        match self {
            Self::Size => "sizes",
            Self::PartialHash => "header hashes",
            Self::FullHash => "hashes",
            Self::Exact => "contents",
        }
    }
}

/// Per-stage counters reported after each stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StageSummary {
    /// Which stage these numbers belong to
    pub stage: Stage,
    /// Files handed to the stage
    pub files_examined: usize,
    /// Files dropped because they could not be stat'ed or read
    pub excluded: usize,
    /// Files ignored on purpose (non-regular files, below the size floor)
    pub skipped: usize,
    /// Groups of two or more files that survived the stage
    pub groups_found: usize,
    /// Files inside those groups
    pub files_in_groups: usize,
    /// Bytes of file content read by the stage
    pub bytes_read: u64,
}

impl StageSummary {
    /// Empty counters for `stage`.
    #[must_use]
    pub fn new(stage: Stage) -> Self {
        Self {
            stage,
            files_examined: 0,
            excluded: 0,
            skipped: 0,
            groups_found: 0,
            files_in_groups: 0,
            bytes_read: 0,
        }
    }

    /// Percentage of examined files that did not make it into a group.
    #[must_use]
    pub fn elimination_rate(&self) -> f64 {
        if self.files_examined == 0 {
            0.0
        } else {
            let eliminated = self.files_examined.saturating_sub(self.files_in_groups);
            (eliminated as f64 / self.files_examined as f64) * 100.0
        }
    }
}

/// A file removed from consideration, and the stage that removed it.
#[derive(Debug)]
pub struct ExcludedFile {
    /// Stage at which the failure happened
    pub stage: Stage,
    /// Why the file was excluded
    pub error: FileError,
}

/// Statistics context for one run.
#[derive(Debug, Default)]
pub struct RunStats {
    /// Paths produced by the enumerator
    pub files_enumerated: usize,
    /// One summary per stage that ran
    pub stages: Vec<StageSummary>,
    /// Files dropped because of per-file failures
    pub excluded: Vec<ExcludedFile>,
    /// Enumeration failures (missing roots, unreadable directories)
    pub scan_errors: Vec<ScanError>,
    /// Wall time of the detection pipeline
    pub duration: Duration,
}

impl RunStats {
    /// Fresh, empty statistics.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Record that `error` removed a file at `stage`.
    pub fn exclude(&mut self, stage: Stage, error: FileError) {
        log::warn!("Excluding {} ({} stage): {}", error.path().display(), stage.name(), error);
        self.excluded.push(ExcludedFile { stage, error });
    }

    /// Record an enumeration failure.
    pub fn scan_error(&mut self, error: ScanError) {
        log::warn!("{}", error);
        self.scan_errors.push(error);
    }

    /// Store a finished stage summary, filling in its exclusion count.
    pub fn record(&mut self, mut summary: StageSummary) {
        summary.excluded = self
            .excluded
            .iter()
            .filter(|e| e.stage == summary.stage)
            .count();
        log::info!(
            "Found {} sets of files with identical {}. ({} files examined, {:.1}% eliminated)",
            summary.groups_found,
            summary.stage.description(),
            summary.files_examined,
            summary.elimination_rate()
        );
        self.stages.push(summary);
    }

    /// Summary of `stage`, if it ran.
    #[must_use]
    pub fn stage(&self, stage: Stage) -> Option<&StageSummary> {
        self.stages.iter().find(|s| s.stage == stage)
    }

    /// Whether any file or root was dropped because of an error.
    #[must_use]
    pub fn had_errors(&self) -> bool {
        !self.excluded.is_empty() || !self.scan_errors.is_empty()
    }
}
