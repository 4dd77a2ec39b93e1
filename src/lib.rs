//! fastdupes - find duplicate files fast
//!
//! Candidate duplicates are narrowed with progressively more expensive tests:
//! equal size, then equal hash of the leading bytes, then equal full-content
//! hash or byte-for-byte equality. A deletion planner can then remove all but
//! the preferred copies of each duplicate set.
//!
//! ```no_run
//! use fastdupes::duplicates::DuplicateFinder;
//! use fastdupes::scanner::WalkerConfig;
//! use std::path::PathBuf;
//!
//! let finder = DuplicateFinder::with_defaults();
//! let (sets, _stats) = finder.find_duplicates(&[PathBuf::from(".")], WalkerConfig::default());
//! for set in &sets {
//!     println!("{:?}", set.paths());
//! }
//! ```

pub mod actions;
pub mod cli;
pub mod config;
pub mod duplicates;
pub mod error;
pub mod logging;
pub mod output;
pub mod pattern;
pub mod progress;
pub mod scanner;

use std::io;
use std::path::Path;
use std::sync::Arc;

use anyhow::{Context, Result};

use actions::{BatchDeleteResult, DeletionPlanner, PreferencePatterns};
use cli::{Cli, OutputFormat};
use config::Settings;
use duplicates::{DuplicateFinder, DuplicateSet};
use error::ExitCode;
use output::{text::summary_line, AuditLog, JsonOutput, TextOutput};
use progress::{Progress, ProgressCallback};

/// Run the application for parsed command-line arguments.
///
/// # Errors
///
/// Returns an error for bad settings or patterns, an unwritable report or
/// audit log, a failing prompt, or an invalid deletion decision. Per-file
/// problems are not errors; they surface as [`ExitCode::PartialSuccess`].
pub fn run_app(cli: Cli) -> Result<ExitCode> {
    logging::init_logging(cli.verbose, cli.quiet);

    let settings = Settings::for_cli(&cli).context("Failed to load configuration")?;
    log::debug!("Effective settings: {:?}", settings);

    if cli.defaults {
        let rendered = settings.to_toml().context("Failed to render settings")?;
        print!("{rendered}");
        return Ok(ExitCode::Success);
    }

    let walker_config = settings
        .walker_config()
        .context("Invalid exclude pattern")?;
    let preferences = settings
        .preferences()
        .context("Invalid preference pattern")?;

    let progress: Arc<dyn ProgressCallback> = Arc::new(Progress::new(cli.quiet));
    let finder = DuplicateFinder::new(settings.finder_config().with_progress_callback(progress));
    let (sets, stats) = finder.find_duplicates(&cli.paths, walker_config);
    let exit_code = ExitCode::for_run(!sets.is_empty(), stats.had_errors());

    {
        let mut out = io::stdout().lock();
        match cli.output {
            OutputFormat::Text => TextOutput::new(&sets)
                .write_to(&mut out)
                .context("Failed to write report")?,
            OutputFormat::Json => JsonOutput::new(&sets, &stats, exit_code)
                .write_to(&mut out, true)
                .context("Failed to write JSON report")?,
        }
    }
    if !cli.quiet {
        eprintln!("{}", summary_line(&sets, &stats));
    }

    if !cli.delete || sets.is_empty() {
        return Ok(exit_code);
    }

    let clean = run_deletion(&settings, preferences, &sets, cli.audit_log.as_deref())?;
    Ok(if clean {
        exit_code
    } else {
        ExitCode::PartialSuccess
    })
}

/// Plan and carry out deletions for every set.
///
/// Returns `false` if any deletion failed or was skipped, or an audit record
/// could not be written.
fn run_deletion(
    settings: &Settings,
    preferences: PreferencePatterns,
    sets: &[DuplicateSet],
    audit_path: Option<&Path>,
) -> Result<bool> {
    let mut audit = audit_path
        .map(|path| {
            AuditLog::open(path)
                .with_context(|| format!("Failed to open audit log {}", path.display()))
        })
        .transpose()?;

    let mut planner = DeletionPlanner::new(settings.planner_config(), preferences);
    let mut audit_failed = false;
    let outcomes = planner.run(sets, |outcome| {
        if let Some(ref mut audit) = audit {
            if let Err(e) = audit.record(outcome) {
                log::error!("Failed to write audit record: {}", e);
                audit_failed = true;
            }
        }
    })?;

    if planner.is_aborted() {
        log::warn!("Aborted; remaining sets were left untouched");
    }

    let mut total = BatchDeleteResult::default();
    let mut skipped = 0;
    for outcome in outcomes {
        if outcome.skipped.is_some() {
            skipped += 1;
        }
        total.merge(outcome.result);
    }
    if settings.dry_run {
        log::info!("Dry run: nothing was deleted");
    } else {
        log::info!("{}", total.summary());
    }
    if skipped > 0 {
        log::warn!("{} set(s) skipped because no kept copy remained", skipped);
    }

    Ok(total.all_succeeded() && skipped == 0 && !audit_failed)
}
