//! Structured error handling and exit codes.

use serde::Serialize;

use crate::actions::PlannerError;

/// Process exit codes.
///
/// - 0: Success (completed normally, duplicates found)
/// - 1: General error (bad arguments, unreadable config, prompt failure)
/// - 2: No duplicates found (completed normally, no duplicates)
/// - 3: Partial success (completed, but files were excluded or deletions failed)
/// - 4: Internal error (a deletion decision broke its invariants)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub enum ExitCode {
    /// Duplicates were found and every file was processed.
    Success = 0,
    /// An unexpected error occurred.
    GeneralError = 1,
    /// The run completed but found no duplicates.
    NoDuplicates = 2,
    /// The run completed with non-fatal per-file errors.
    PartialSuccess = 3,
    /// The deletion planner produced an invalid decision and stopped.
    InternalError = 4,
}

impl ExitCode {
    /// Get the numeric exit code.
    #[must_use]
    pub fn as_i32(self) -> i32 {
        self as i32
    }

    /// Get the machine-readable code prefix.
    #[must_use]
    pub fn code_prefix(self) -> &'static str {
        match self {
            Self::Success => "FD000",
            Self::GeneralError => "FD001",
            Self::NoDuplicates => "FD002",
            Self::PartialSuccess => "FD003",
            Self::InternalError => "FD004",
        }
    }

    /// Exit code for a run that completed.
    #[must_use]
    pub fn for_run(found_duplicates: bool, had_errors: bool) -> Self {
        match (had_errors, found_duplicates) {
            (true, _) => Self::PartialSuccess,
            (false, true) => Self::Success,
            (false, false) => Self::NoDuplicates,
        }
    }

    /// Exit code for a run that failed with `err`.
    #[must_use]
    pub fn from_error(err: &anyhow::Error) -> Self {
        match err.downcast_ref::<PlannerError>() {
            Some(PlannerError::InvariantViolation { .. }) => Self::InternalError,
            _ => Self::GeneralError,
        }
    }
}

/// Structured error information for JSON output.
#[derive(Debug, Serialize)]
pub struct StructuredError {
    /// The error code (e.g., "FD001")
    pub code: String,
    /// The exit code number
    pub exit_code: i32,
    /// Human-readable error message
    pub message: String,
    /// Underlying causes, outermost first
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub causes: Vec<String>,
}

impl StructuredError {
    /// Create a new structured error from an anyhow error and an exit code.
    #[must_use]
    pub fn new(err: &anyhow::Error, exit_code: ExitCode) -> Self {
        Self {
            code: exit_code.code_prefix().to_string(),
            exit_code: exit_code.as_i32(),
            message: err.to_string(),
            causes: err.chain().skip(1).map(ToString::to_string).collect(),
        }
    }
}
