//! Audit trail of deletion decisions, one JSON object per line.
//!
//! Each record is written and flushed as soon as its set is processed, so
//! the file is complete up to the last finished set even if the run stops.

use std::fs::{File, OpenOptions};
use std::io::{self, BufWriter, Write};
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::Serialize;

use crate::actions::{DeletionOutcome, ResolvedBy};

/// A file the planner tried and failed to delete.
#[derive(Debug, Clone, Serialize)]
pub struct AuditFailure {
    /// Path of the file
    pub path: String,
    /// Reason reported by the back-end
    pub error: String,
}

/// One deletion decision and its effect.
#[derive(Debug, Clone, Serialize)]
pub struct AuditRecord {
    /// When the set was processed
    pub timestamp: DateTime<Utc>,
    /// Size of every member in bytes
    pub size: u64,
    /// Paths kept
    pub kept: Vec<String>,
    /// Paths selected for deletion (not removed in dry-run mode)
    pub deleted: Vec<String>,
    /// Deletions that failed
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failed: Vec<AuditFailure>,
    /// What settled the decision
    pub resolved_by: ResolvedBy,
    /// Whether deletion was suppressed
    pub dry_run: bool,
    /// Why deletion was skipped for the whole set, if it was
    #[serde(skip_serializing_if = "Option::is_none")]
    pub skipped: Option<String>,
}

impl AuditRecord {
    /// Build a record from a finished outcome.
    #[must_use]
    pub fn from_outcome(outcome: &DeletionOutcome) -> Self {
        let lossy = |p: &std::path::PathBuf| p.to_string_lossy().into_owned();
        let decision = &outcome.decision;
        Self {
            timestamp: Utc::now(),
            size: decision.size,
            kept: decision.keep.iter().map(lossy).collect(),
            deleted: decision.delete.iter().map(lossy).collect(),
            failed: outcome
                .result
                .failures
                .iter()
                .map(|(path, error)| AuditFailure {
                    path: lossy(path),
                    error: error.clone(),
                })
                .collect(),
            resolved_by: decision.resolved_by,
            dry_run: decision.dry_run,
            skipped: outcome.skipped.clone(),
        }
    }
}

/// Appends [`AuditRecord`]s to a writer as JSON lines.
#[derive(Debug)]
pub struct AuditLog<W: Write> {
    writer: W,
}

impl AuditLog<BufWriter<File>> {
    /// Open `path` for appending, creating it if needed.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the file cannot be opened.
    pub fn open(path: &Path) -> io::Result<Self> {
        let file = OpenOptions::new().create(true).append(true).open(path)?;
        log::debug!("Audit log: {}", path.display());
        Ok(Self::new(BufWriter::new(file)))
    }
}

impl<W: Write> AuditLog<W> {
    /// Write records to `writer`.
    pub fn new(writer: W) -> Self {
        Self { writer }
    }

    /// Append one outcome.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if serialization or writing fails.
    pub fn record(&mut self, outcome: &DeletionOutcome) -> io::Result<()> {
        let record = AuditRecord::from_outcome(outcome);
        serde_json::to_writer(&mut self.writer, &record)?;
        self.writer.write_all(b"\n")?;
        self.writer.flush()
    }

    /// Recover the underlying writer.
    pub fn into_inner(self) -> W {
        self.writer
    }
}
