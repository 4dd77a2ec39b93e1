//! JSON output formatter for duplicate scan results.
//!
//! # Output Schema
//!
//! ```json
//! {
//!   "duplicates": [
//!     {
//!       "key": "abc123...",
//!       "verification": "hash",
//!       "size": 1024,
//!       "files": ["/path/to/file1.txt", "/path/to/file2.txt"]
//!     }
//!   ],
//!   "stages": [
//!     { "stage": "size", "files_examined": 100, "groups_found": 4, ... }
//!   ],
//!   "excluded": [
//!     { "path": "/path/gone.txt", "stage": "partial_hash", "reason": "File vanished: ..." }
//!   ],
//!   "summary": {
//!     "files_enumerated": 100,
//!     "duplicate_sets": 5,
//!     "duplicate_files": 10,
//!     "reclaimable_space": 51200,
//!     "duration_ms": 1234,
//!     "exit_code": 0,
//!     "exit_code_name": "FD000"
//!   }
//! }
//! ```

use std::io::Write;

use serde::Serialize;

use crate::duplicates::{DuplicateSet, RunStats, Stage, StageSummary, Verification};
use crate::error::ExitCode;

/// A single duplicate set in JSON format.
#[derive(Debug, Clone, Serialize)]
pub struct JsonDuplicateSet {
    /// Hex digest, or `"exact"` for byte-compared sets
    pub key: String,
    /// `"hash"` or `"exact"`
    pub verification: &'static str,
    /// File size in bytes
    pub size: u64,
    /// Paths of every member
    pub files: Vec<String>,
}

impl JsonDuplicateSet {
    /// Convert one duplicate set.
    #[must_use]
    pub fn from_set(set: &DuplicateSet) -> Self {
        Self {
            key: set.key_display(),
            verification: match set.verification {
                Verification::FullHash(_) => "hash",
                Verification::ExactContent => "exact",
            },
            size: set.size,
            files: set
                .files
                .iter()
                .map(|f| f.path.to_string_lossy().into_owned())
                .collect(),
        }
    }
}

/// A file dropped from the run.
#[derive(Debug, Clone, Serialize)]
pub struct JsonExcluded {
    /// Path of the file
    pub path: String,
    /// Stage that dropped it
    pub stage: Stage,
    /// Why it was dropped
    pub reason: String,
}

/// Run-level totals.
#[derive(Debug, Clone, Serialize)]
pub struct JsonSummary {
    /// Paths produced by the enumerator
    pub files_enumerated: usize,
    /// Number of duplicate sets
    pub duplicate_sets: usize,
    /// Number of files in duplicate sets
    pub duplicate_files: usize,
    /// Bytes reclaimable by keeping one copy per set
    pub reclaimable_space: u64,
    /// Enumeration errors (missing roots, unreadable directories)
    pub scan_errors: Vec<String>,
    /// Pipeline wall time in milliseconds
    pub duration_ms: u64,
    /// The exit code number
    pub exit_code: i32,
    /// The machine-readable exit code name (e.g., "FD000")
    pub exit_code_name: String,
}

/// Complete JSON output structure.
#[derive(Debug, Clone, Serialize)]
pub struct JsonOutput {
    /// Duplicate sets, sorted by first path
    pub duplicates: Vec<JsonDuplicateSet>,
    /// Per-stage summaries in execution order
    pub stages: Vec<StageSummary>,
    /// Files excluded because of errors
    pub excluded: Vec<JsonExcluded>,
    /// Run totals
    pub summary: JsonSummary,
}

impl JsonOutput {
    /// Build the JSON document for a run.
    ///
    /// # Example
    ///
    /// ```
    /// use fastdupes::duplicates::RunStats;
    /// use fastdupes::error::ExitCode;
    /// use fastdupes::output::JsonOutput;
    ///
    /// let output = JsonOutput::new(&[], &RunStats::new(), ExitCode::NoDuplicates);
    /// assert!(output.duplicates.is_empty());
    /// assert_eq!(output.summary.exit_code, 2);
    /// ```
    #[must_use]
    pub fn new(sets: &[DuplicateSet], stats: &RunStats, exit_code: ExitCode) -> Self {
        Self {
            duplicates: sets.iter().map(JsonDuplicateSet::from_set).collect(),
            stages: stats.stages.clone(),
            excluded: stats
                .excluded
                .iter()
                .map(|e| JsonExcluded {
                    path: e.error.path().to_string_lossy().into_owned(),
                    stage: e.stage,
                    reason: e.error.to_string(),
                })
                .collect(),
            summary: JsonSummary {
                files_enumerated: stats.files_enumerated,
                duplicate_sets: sets.len(),
                duplicate_files: sets.iter().map(DuplicateSet::len).sum(),
                reclaimable_space: sets.iter().map(DuplicateSet::wasted_space).sum(),
                scan_errors: stats.scan_errors.iter().map(ToString::to_string).collect(),
                duration_ms: stats.duration.as_millis() as u64,
                exit_code: exit_code.as_i32(),
                exit_code_name: exit_code.code_prefix().to_string(),
            },
        }
    }

    /// Serialize to compact JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string(self)
    }

    /// Serialize to pretty-printed JSON string.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_json_pretty(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    /// Write JSON to a writer, followed by a newline.
    ///
    /// # Errors
    ///
    /// Returns an error if serialization or writing fails.
    pub fn write_to<W: Write>(&self, writer: &mut W, pretty: bool) -> Result<(), JsonOutputError> {
        let json = if pretty {
            self.to_json_pretty()?
        } else {
            self.to_json()?
        };
        writer.write_all(json.as_bytes())?;
        writer.write_all(b"\n")?;
        Ok(())
    }
}

/// Errors that can occur during JSON output.
#[derive(thiserror::Error, Debug)]
pub enum JsonOutputError {
    /// JSON serialization error
    #[error("JSON serialization error: {0}")]
    Serialization(#[from] serde_json::Error),

    /// I/O error during writing
    #[error("I/O error during JSON output: {0}")]
    Io(#[from] std::io::Error),
}
