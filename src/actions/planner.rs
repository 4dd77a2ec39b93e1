//! Deletion planner: turns duplicate sets into keep/delete decisions.
//!
//! # Overview
//!
//! For each [`DuplicateSet`] the planner:
//!
//! 1. Ranks members with the [`PreferencePatterns`]. Lower-ranked members
//!    are marked for deletion; the top tier is tentatively kept.
//! 2. If the top tier holds a single file, the set is resolved. Otherwise,
//!    in interactive mode the operator is asked which of the tied files to
//!    **keep**; in noninteractive mode the whole tier is kept.
//! 3. Validates the decision: `keep` is non-empty and a subset of the set,
//!    and `delete` is exactly its complement. A violation is fatal.
//! 4. Unless in dry-run mode, removes the files in `delete`. Individual
//!    failures are reported and never stop the run.
//!
//! The prompt only ever asks what to keep. An empty answer is re-asked, so
//! a careless keystroke cannot select every copy for deletion.
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::actions::{DeletionPlanner, InteractionMode, PlannerConfig, PreferencePatterns};
//! # let sets: Vec<fastdupes::duplicates::DuplicateSet> = Vec::new();
//!
//! let config = PlannerConfig::default()
//!     .with_interaction(InteractionMode::NonInteractive)
//!     .with_dry_run(true);
//! let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
//! let mut planner = DeletionPlanner::new(config, prefs);
//! for outcome in planner.run(&sets, |_| {}).unwrap() {
//!     println!("keep {:?}, delete {:?}", outcome.decision.keep, outcome.decision.delete);
//! }
//! ```

use std::collections::HashSet;
use std::io::{self, BufRead, Write};
use std::path::PathBuf;

use serde::{Deserialize, Serialize};

use super::delete::{delete_batch, BatchDeleteResult, DeleteConfig};
use super::preference::PreferencePatterns;
use crate::duplicates::DuplicateSet;

/// Whether the operator may be asked to resolve ties.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum InteractionMode {
    /// Ask on the terminal.
    #[default]
    Interactive,
    /// Never ask; unresolved files are kept.
    NonInteractive,
}

/// Planner configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct PlannerConfig {
    /// Interaction mode.
    pub interaction: InteractionMode,
    /// Produce decisions without deleting anything.
    pub dry_run: bool,
    /// How files are removed.
    pub delete: DeleteConfig,
}

impl PlannerConfig {
    /// Set the interaction mode.
    #[must_use]
    pub fn with_interaction(mut self, interaction: InteractionMode) -> Self {
        self.interaction = interaction;
        self
    }

    /// Enable or disable dry-run mode.
    #[must_use]
    pub fn with_dry_run(mut self, dry_run: bool) -> Self {
        self.dry_run = dry_run;
        self
    }

    /// Set the deletion back-end configuration.
    #[must_use]
    pub fn with_delete_config(mut self, delete: DeleteConfig) -> Self {
        self.delete = delete;
        self
    }
}

/// What settled a decision.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum ResolvedBy {
    /// Preference patterns singled out one file to keep.
    Preference,
    /// The operator chose the keepers.
    Operator,
    /// Noninteractive mode kept every unresolved file.
    NonInteractiveDefault,
    /// The prompt was aborted; everything is kept.
    Aborted,
}

/// Final verdict for one duplicate set.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DeletionDecision {
    /// Size shared by every member.
    pub size: u64,
    /// Files to keep; never empty.
    pub keep: Vec<PathBuf>,
    /// Files to delete; the complement of `keep`.
    pub delete: Vec<PathBuf>,
    /// What settled the decision.
    pub resolved_by: ResolvedBy,
    /// Whether deletion is suppressed.
    pub dry_run: bool,
}

/// A decision and what happened when it was carried out.
#[derive(Debug, Clone)]
pub struct DeletionOutcome {
    /// The validated decision.
    pub decision: DeletionDecision,
    /// Files actually removed and per-file failures.
    pub result: BatchDeleteResult,
    /// Set when deletion was skipped as a whole, with the reason.
    pub skipped: Option<String>,
}

/// One answer from the keep prompt.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PromptResponse {
    /// Zero-based indices of the files to keep, sorted and deduplicated.
    ValidSelection(Vec<usize>),
    /// Nothing was selected.
    EmptyResponse,
    /// The input could not be understood.
    Invalid(String),
    /// Input ended; keep everything from here on.
    Abort,
}

/// Errors that stop the planner.
#[derive(thiserror::Error, Debug)]
pub enum PlannerError {
    /// A decision broke the keep/delete partition. Always a planner bug.
    #[error("internal error: invalid deletion decision: {reason}")]
    InvariantViolation {
        /// Which rule was broken
        reason: String,
        /// The members of the offending set
        members: Vec<PathBuf>,
    },

    /// The prompt terminal failed.
    #[error("prompt I/O error: {0}")]
    Io(#[from] io::Error),
}

/// Parse a keep-selection typed by the operator.
///
/// Accepts `all`, or one-based numbers separated by spaces or commas.
/// Numbers outside `1..=count` make the whole answer invalid.
#[must_use]
pub fn parse_selection(input: &str, count: usize) -> PromptResponse {
    let input = input.trim();
    if input.is_empty() {
        return PromptResponse::EmptyResponse;
    }
    if input.eq_ignore_ascii_case("all") {
        return PromptResponse::ValidSelection((0..count).collect());
    }

    let mut chosen = Vec::new();
    for token in input
        .split(|c: char| c.is_whitespace() || c == ',')
        .filter(|t| !t.is_empty())
    {
        match token.parse::<usize>() {
            Ok(n) if (1..=count).contains(&n) => chosen.push(n - 1),
            Ok(n) => {
                return PromptResponse::Invalid(format!(
                    "{n} is out of range (choose 1 to {count})"
                ))
            }
            Err(_) => {
                return PromptResponse::Invalid(format!(
                    "'{token}' is not a number; enter numbers or 'all'"
                ))
            }
        }
    }

    chosen.sort_unstable();
    chosen.dedup();
    if chosen.is_empty() {
        PromptResponse::EmptyResponse
    } else {
        PromptResponse::ValidSelection(chosen)
    }
}

/// Source of keep-selections.
pub trait KeepPrompt {
    /// Show `candidates` for set `position` of `total` and read one answer.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the terminal cannot be used.
    fn ask(
        &mut self,
        candidates: &[PathBuf],
        position: usize,
        total: usize,
    ) -> io::Result<PromptResponse>;

    /// Tell the operator why the last answer was refused.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the terminal cannot be used.
    fn reject(&mut self, message: &str) -> io::Result<()>;
}

/// Line-oriented prompt over any reader/writer pair.
#[derive(Debug)]
pub struct TerminalPrompt<R, W> {
    input: R,
    output: W,
}

impl<R: BufRead, W: Write> TerminalPrompt<R, W> {
    /// Prompt on arbitrary streams.
    pub fn new(input: R, output: W) -> Self {
        Self { input, output }
    }
}

impl TerminalPrompt<io::BufReader<io::Stdin>, io::Stderr> {
    /// Prompt on stdin, writing to stderr so reports on stdout stay clean.
    #[must_use]
    pub fn stdio() -> Self {
        Self::new(io::BufReader::new(io::stdin()), io::stderr())
    }
}

impl<R: BufRead, W: Write> KeepPrompt for TerminalPrompt<R, W> {
    fn ask(
        &mut self,
        candidates: &[PathBuf],
        position: usize,
        total: usize,
    ) -> io::Result<PromptResponse> {
        writeln!(self.output)?;
        for (i, path) in candidates.iter().enumerate() {
            writeln!(self.output, "  ({}) {}", i + 1, path.display())?;
        }
        write!(self.output, "[{position}/{total}] Keepers: ")?;
        self.output.flush()?;

        let mut line = String::new();
        if self.input.read_line(&mut line)? == 0 {
            writeln!(self.output)?;
            return Ok(PromptResponse::Abort);
        }
        Ok(parse_selection(&line, candidates.len()))
    }

    fn reject(&mut self, message: &str) -> io::Result<()> {
        writeln!(self.output, "  {message}")
    }
}

/// Turns duplicate sets into validated decisions and carries them out.
pub struct DeletionPlanner {
    config: PlannerConfig,
    preferences: PreferencePatterns,
    prompt: Box<dyn KeepPrompt>,
    aborted: bool,
}

impl std::fmt::Debug for DeletionPlanner {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("DeletionPlanner")
            .field("config", &self.config)
            .field("preferences", &self.preferences)
            .field("aborted", &self.aborted)
            .finish_non_exhaustive()
    }
}

impl DeletionPlanner {
    /// Create a planner prompting on the process terminal.
    #[must_use]
    pub fn new(config: PlannerConfig, preferences: PreferencePatterns) -> Self {
        Self {
            config,
            preferences,
            prompt: Box::new(TerminalPrompt::stdio()),
            aborted: false,
        }
    }

    /// Replace the prompt.
    #[must_use]
    pub fn with_prompt(mut self, prompt: Box<dyn KeepPrompt>) -> Self {
        self.prompt = prompt;
        self
    }

    /// Whether the operator aborted; later sets are kept whole.
    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.aborted
    }

    /// Decide what to keep and delete for `set` (number `position` of `total`).
    ///
    /// # Errors
    ///
    /// Returns [`PlannerError::Io`] if the prompt fails, or
    /// [`PlannerError::InvariantViolation`] if the decision is malformed.
    pub fn plan(
        &mut self,
        set: &DuplicateSet,
        position: usize,
        total: usize,
    ) -> Result<DeletionDecision, PlannerError> {
        let members = set.paths();
        let (keepers, resolved_by) = self.choose_keepers(&members, position, total)?;

        let keep_set: HashSet<&PathBuf> = keepers.iter().collect();
        let (keep, delete): (Vec<PathBuf>, Vec<PathBuf>) =
            members.iter().cloned().partition(|p| keep_set.contains(p));

        let decision = DeletionDecision {
            size: set.size,
            keep,
            delete,
            resolved_by,
            dry_run: self.config.dry_run,
        };
        validate_decision(&decision, &members)?;

        log::info!(
            "Set {}/{}: keeping {}, deleting {} ({:?}{})",
            position,
            total,
            decision.keep.len(),
            decision.delete.len(),
            decision.resolved_by,
            if decision.dry_run { ", dry run" } else { "" }
        );
        Ok(decision)
    }

    fn choose_keepers(
        &mut self,
        members: &[PathBuf],
        position: usize,
        total: usize,
    ) -> Result<(Vec<PathBuf>, ResolvedBy), PlannerError> {
        if self.aborted {
            return Ok((members.to_vec(), ResolvedBy::Aborted));
        }

        let split = self.preferences.split(members);
        if split.keep.len() == 1 {
            return Ok((split.keep, ResolvedBy::Preference));
        }

        match self.config.interaction {
            InteractionMode::NonInteractive => {
                let resolved_by = if split.delete.is_empty() {
                    ResolvedBy::NonInteractiveDefault
                } else {
                    ResolvedBy::Preference
                };
                Ok((split.keep, resolved_by))
            }
            InteractionMode::Interactive => {
                let mut candidates = split.keep;
                candidates.sort();
                loop {
                    match self.prompt.ask(&candidates, position, total)? {
                        PromptResponse::ValidSelection(indices) => {
                            let chosen = indices
                                .into_iter()
                                .filter_map(|i| candidates.get(i).cloned())
                                .collect();
                            return Ok((chosen, ResolvedBy::Operator));
                        }
                        PromptResponse::EmptyResponse => {
                            self.prompt
                                .reject("Select at least one file to keep (or 'all').")?;
                        }
                        PromptResponse::Invalid(message) => self.prompt.reject(&message)?,
                        PromptResponse::Abort => {
                            log::warn!("Prompt aborted; keeping all files in remaining sets");
                            self.aborted = true;
                            return Ok((members.to_vec(), ResolvedBy::Aborted));
                        }
                    }
                }
            }
        }
    }

    /// Carry out a validated decision.
    ///
    /// Nothing is removed in dry-run mode, or when none of the keepers still
    /// exists on disk.
    pub fn execute(&self, decision: DeletionDecision) -> DeletionOutcome {
        let mut outcome = DeletionOutcome {
            decision,
            result: BatchDeleteResult::default(),
            skipped: None,
        };
        let decision = &outcome.decision;

        if decision.delete.is_empty() {
            return outcome;
        }
        if decision.dry_run {
            for path in &decision.delete {
                log::info!("Would delete: {}", path.display());
            }
            return outcome;
        }
        if !decision.keep.iter().any(|p| p.is_file()) {
            let reason = "no kept copy exists any more".to_string();
            log::error!(
                "Skipping deletion of {} file(s): {}",
                decision.delete.len(),
                reason
            );
            outcome.skipped = Some(reason);
            return outcome;
        }

        outcome.result = delete_batch(&decision.delete, Some(decision.size), &self.config.delete);
        outcome
    }

    /// Plan and execute every set in order.
    ///
    /// `observe` sees each outcome as soon as it is complete.
    ///
    /// # Errors
    ///
    /// Stops at the first [`PlannerError`]; sets already processed stay processed.
    pub fn run<F>(
        &mut self,
        sets: &[DuplicateSet],
        mut observe: F,
    ) -> Result<Vec<DeletionOutcome>, PlannerError>
    where
        F: FnMut(&DeletionOutcome),
    {
        let total = sets.len();
        let mut outcomes = Vec::with_capacity(total);
        for (i, set) in sets.iter().enumerate() {
            let decision = self.plan(set, i + 1, total)?;
            let outcome = self.execute(decision);
            observe(&outcome);
            outcomes.push(outcome);
        }
        Ok(outcomes)
    }
}

/// Check the keep/delete partition of `decision` against the set `members`.
///
/// # Errors
///
/// Returns [`PlannerError::InvariantViolation`] if `keep` is empty, a path is
/// not a member, a path appears twice, or a member is missing.
pub fn validate_decision(
    decision: &DeletionDecision,
    members: &[PathBuf],
) -> Result<(), PlannerError> {
    let violation = |reason: &str| PlannerError::InvariantViolation {
        reason: reason.to_string(),
        members: members.to_vec(),
    };

    if decision.keep.is_empty() {
        return Err(violation("keep set is empty"));
    }

    let member_set: HashSet<&PathBuf> = members.iter().collect();
    let mut seen = HashSet::new();
    for path in decision.keep.iter().chain(&decision.delete) {
        if !member_set.contains(path) {
            return Err(violation(&format!("{} is not in the set", path.display())));
        }
        if !seen.insert(path) {
            return Err(violation(&format!("{} appears twice", path.display())));
        }
    }
    if seen.len() != member_set.len() {
        return Err(violation("keep and delete do not cover the set"));
    }
    Ok(())
}
