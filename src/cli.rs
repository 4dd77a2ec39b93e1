//! Command-line interface definitions for fastdupes.
//!
//! # Example
//!
//! ```bash
//! # List duplicate sets below two overlapping roots
//! fastdupes ~/photos ~/photos/2019
//!
//! # Confirm byte-for-byte instead of by digest
//! fastdupes -E ~/music
//!
//! # Delete copies under Burned/ first, asking only when a tie remains
//! fastdupes -d -p '*/Burned' ~/archive
//!
//! # Report what would be deleted, never prompt, JSON output
//! fastdupes -d -n --noninteractive -o json ~/archive
//! ```

use clap::{Parser, ValueEnum};
use std::path::PathBuf;

/// Find duplicate files fast.
///
/// Candidates are narrowed by size, then by a hash of the first few kilobytes,
/// and only then confirmed by a full-content hash or a direct comparison.
#[derive(Debug, Parser)]
#[command(name = "fastdupes")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    /// Files or directories to search (overlapping roots are fine)
    #[arg(value_name = "PATH", required_unless_present = "defaults")]
    pub paths: Vec<PathBuf>,

    /// Increase verbosity level (-v for debug, -vv for trace)
    #[arg(short, long, action = clap::ArgAction::Count)]
    pub verbose: u8,

    /// Suppress all output except errors
    #[arg(short, long, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Report fatal errors as JSON on stderr
    #[arg(long)]
    pub json_errors: bool,

    /// Delete duplicates, keeping at least one copy of each set
    #[arg(short, long)]
    pub delete: bool,

    /// Confirm duplicates by comparing contents instead of full hashes
    #[arg(short = 'E', long)]
    pub exact: bool,

    /// Never prompt; files the preferences cannot separate are all kept
    #[arg(long)]
    pub noninteractive: bool,

    /// Decide what would be deleted, but delete nothing
    #[arg(short = 'n', long)]
    pub dry_run: bool,

    /// Glob for copies to delete first (repeatable, earlier wins)
    ///
    /// Matched against each file's path and all of its parent directories,
    /// so '*/Burned' selects everything below any directory named Burned.
    #[arg(short, long = "prefer", value_name = "PATTERN")]
    pub prefer: Vec<String>,

    /// Glob for paths to skip (repeatable)
    ///
    /// Added to the built-in version-control excludes. A pattern starting
    /// with '-' discards every exclude given before it, built-ins included.
    #[arg(
        short,
        long = "exclude",
        value_name = "PATTERN",
        allow_hyphen_values = true
    )]
    pub exclude: Vec<String>,

    /// Ignore files smaller than this (e.g., 25, 1KiB, 2MB)
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub min_size: Option<u64>,

    /// Bytes covered by the header hash
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub head_size: Option<u64>,

    /// Read size for full hashing and exact comparison
    #[arg(long, value_name = "SIZE", value_parser = parse_size)]
    pub chunk_size: Option<u64>,

    /// Number of concurrent readers (default: 4)
    ///
    /// Lower values reduce disk thrashing on HDDs.
    #[arg(long, value_name = "N")]
    pub io_threads: Option<usize>,

    /// Move deleted files to the system trash instead of removing them
    #[arg(long)]
    pub trash: bool,

    /// Output format for the duplicate report
    #[arg(short, long, value_enum, default_value = "text")]
    pub output: OutputFormat,

    /// Append every deletion decision to this file as JSON lines
    #[arg(long, value_name = "PATH")]
    pub audit_log: Option<PathBuf>,

    /// Read settings from this TOML file instead of the default location
    #[arg(long, value_name = "PATH")]
    pub config: Option<PathBuf>,

    /// Print the effective settings as TOML and exit
    #[arg(long)]
    pub defaults: bool,
}

/// Output format for the duplicate report.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    /// One block of paths per set
    Text,
    /// A single JSON document
    Json,
}

impl std::fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            OutputFormat::Text => write!(f, "text"),
            OutputFormat::Json => write!(f, "json"),
        }
    }
}

/// Parse a human-readable size string into bytes.
///
/// Supports suffixes: B, KB, KiB, MB, MiB, GB, GiB, TB, TiB
/// Case-insensitive. Numbers without suffix are treated as bytes.
///
/// # Examples
///
/// ```
/// use fastdupes::cli::parse_size;
///
/// assert_eq!(parse_size("1024").unwrap(), 1024);
/// assert_eq!(parse_size("1KB").unwrap(), 1000);
/// assert_eq!(parse_size("1KiB").unwrap(), 1024);
/// assert_eq!(parse_size("2MB").unwrap(), 2_000_000);
/// ```
///
/// # Errors
///
/// Returns an error if the string is empty, contains an invalid number,
/// a negative number, or an unknown size suffix.
pub fn parse_size(s: &str) -> Result<u64, String> {
    let s = s.trim();
    if s.is_empty() {
        return Err("Size cannot be empty".to_string());
    }
    if s.starts_with('-') {
        return Err("Size cannot be negative".to_string());
    }

    let (num_str, suffix) = match s.find(|c: char| !c.is_ascii_digit() && c != '.') {
        Some(idx) => (&s[..idx], s[idx..].trim().to_uppercase()),
        None => (s, String::new()),
    };

    let num: f64 = num_str
        .parse()
        .map_err(|_| format!("Invalid number: '{num_str}'"))?;

    let multiplier: u64 = match suffix.as_str() {
        "" | "B" => 1,
        "KB" | "K" => 1_000,
        "KIB" => 1_024,
        "MB" | "M" => 1_000_000,
        "MIB" => 1_048_576,
        "GB" | "G" => 1_000_000_000,
        "GIB" => 1_073_741_824,
        "TB" | "T" => 1_000_000_000_000,
        "TIB" => 1_099_511_627_776,
        _ => return Err(format!("Unknown size suffix: '{suffix}'")),
    };

    Ok((num * multiplier as f64) as u64)
}
