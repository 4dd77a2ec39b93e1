//! Output formatters for duplicate scan results.
//!
//! This module provides different output formats:
//! - Plain text, one block of paths per duplicate set
//! - JSON for automation and scripting
//! - A JSON-lines audit trail of deletion decisions
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::duplicates::DuplicateFinder;
//! use fastdupes::error::ExitCode;
//! use fastdupes::output::JsonOutput;
//! use fastdupes::scanner::WalkerConfig;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, stats) = finder.find_duplicates(&[PathBuf::from(".")], WalkerConfig::default());
//!
//! let output = JsonOutput::new(&sets, &stats, ExitCode::Success);
//! println!("{}", output.to_json_pretty().unwrap());
//! ```

pub mod audit;
pub mod json;
pub mod text;

// Re-export main types
pub use audit::{AuditLog, AuditRecord};
pub use json::{JsonOutput, JsonOutputError};
pub use text::TextOutput;
