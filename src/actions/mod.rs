//! File actions module.
//!
//! This module provides functionality for:
//! - Preference patterns that rank copies for deletion
//! - The deletion planner, which decides what to keep in each duplicate set
//! - Permanent deletion, or moving files to the system trash
//!
//! ```no_run
//! use fastdupes::actions::delete::permanent_delete;
//! use std::path::Path;
//!
//! let result = permanent_delete(Path::new("/tmp/copy.bin"));
//! ```

pub mod delete;
pub mod planner;
pub mod preference;

// Re-export commonly used types
pub use delete::{
    delete_batch, delete_to_trash, delete_verified, permanent_delete, BatchDeleteResult,
    DeleteConfig, DeleteError, DeleteResult,
};
pub use planner::{
    parse_selection, validate_decision, DeletionDecision, DeletionOutcome, DeletionPlanner,
    InteractionMode, KeepPrompt, PlannerConfig, PlannerError, PromptResponse, ResolvedBy,
    TerminalPrompt,
};
pub use preference::{PreferencePatterns, Rank, RankSplit};
