use fastdupes::actions::{
    DeleteConfig, DeletionPlanner, InteractionMode, PlannerConfig, PreferencePatterns,
    ResolvedBy, TerminalPrompt,
};
use fastdupes::duplicates::{DuplicateFinder, DuplicateSet, FinderConfig};
use fastdupes::output::AuditLog;
use fastdupes::scanner::WalkerConfig;
use std::collections::HashSet;
use std::io::Cursor;
use std::path::PathBuf;

use super::common::{pattern_bytes, Scratch};

fn scan(scratch: &Scratch) -> Vec<DuplicateSet> {
    let finder = DuplicateFinder::new(FinderConfig::default().with_min_size(0));
    let (sets, _) = finder.find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());
    sets
}

fn noninteractive() -> PlannerConfig {
    PlannerConfig::default()
        .with_interaction(InteractionMode::NonInteractive)
        .with_delete_config(DeleteConfig::permanent())
}

fn scripted(input: &str) -> Box<TerminalPrompt<Cursor<Vec<u8>>, Vec<u8>>> {
    Box::new(TerminalPrompt::new(
        Cursor::new(input.as_bytes().to_vec()),
        Vec::new(),
    ))
}

#[test]
fn test_preference_deletes_burned_copy_without_prompting() {
    let scratch = Scratch::new();
    let burned = scratch.write("data/Burned/x", &pattern_bytes(400, 1));
    let kept = scratch.write("data/ToBurn/x", &pattern_bytes(400, 1));
    let sets = scan(&scratch);
    assert_eq!(sets.len(), 1);

    let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
    let mut planner = DeletionPlanner::new(PlannerConfig::default(), prefs)
        .with_prompt(scripted(""));
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    let decision = &outcomes[0].decision;
    assert_eq!(decision.resolved_by, ResolvedBy::Preference);
    assert_eq!(decision.keep, vec![kept.clone()]);
    assert_eq!(decision.delete, vec![burned.clone()]);
    assert_eq!(outcomes[0].result.success_count(), 1);
    assert!(!burned.exists());
    assert!(kept.exists());
    assert!(!planner.is_aborted());
}

#[test]
fn test_noninteractive_unresolved_keeps_everything() {
    let scratch = Scratch::new();
    let a = scratch.write("a/f", &pattern_bytes(300, 2));
    let b = scratch.write("b/f", &pattern_bytes(300, 2));
    let sets = scan(&scratch);

    let mut planner = DeletionPlanner::new(noninteractive(), PreferencePatterns::default());
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    let decision = &outcomes[0].decision;
    assert_eq!(decision.resolved_by, ResolvedBy::NonInteractiveDefault);
    assert_eq!(decision.keep, vec![a.clone(), b.clone()]);
    assert!(decision.delete.is_empty());
    assert!(a.exists() && b.exists());
}

#[test]
fn test_dry_run_reports_but_deletes_nothing() {
    let scratch = Scratch::new();
    let doomed = scratch.write("Burned/f", &pattern_bytes(300, 3));
    scratch.write("home/f", &pattern_bytes(300, 3));
    let sets = scan(&scratch);

    let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
    let config = noninteractive().with_dry_run(true);
    let mut planner = DeletionPlanner::new(config, prefs);
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    assert_eq!(outcomes[0].decision.delete, vec![doomed.clone()]);
    assert!(outcomes[0].decision.dry_run);
    assert_eq!(outcomes[0].result.success_count(), 0);
    assert!(doomed.exists());
}

#[test]
fn test_prompt_rejects_empty_answer_then_keeps_selection() {
    let scratch = Scratch::new();
    let a = scratch.write("a", &pattern_bytes(300, 4));
    let b = scratch.write("b", &pattern_bytes(300, 4));
    let c = scratch.write("c", &pattern_bytes(300, 4));
    let sets = scan(&scratch);

    let mut planner =
        DeletionPlanner::new(PlannerConfig::default(), PreferencePatterns::default())
            .with_prompt(scripted("\nbogus\n9\n2\n"));
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    let decision = &outcomes[0].decision;
    assert_eq!(decision.resolved_by, ResolvedBy::Operator);
    assert_eq!(decision.keep, vec![b.clone()]);
    assert_eq!(decision.delete, vec![a.clone(), c.clone()]);
    assert!(b.exists());
    assert!(!a.exists() && !c.exists());
}

#[test]
fn test_end_of_input_aborts_and_keeps_remaining_sets() {
    let scratch = Scratch::new();
    let mut all = Vec::new();
    for name in ["x1", "x2"] {
        all.push(scratch.write(name, &pattern_bytes(300, 5)));
    }
    for name in ["y1", "y2"] {
        all.push(scratch.write(name, &pattern_bytes(400, 6)));
    }
    let sets = scan(&scratch);
    assert_eq!(sets.len(), 2);

    let mut planner =
        DeletionPlanner::new(PlannerConfig::default(), PreferencePatterns::default())
            .with_prompt(scripted(""));
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    assert!(planner.is_aborted());
    assert!(outcomes
        .iter()
        .all(|o| o.decision.resolved_by == ResolvedBy::Aborted && o.decision.delete.is_empty()));
    assert!(all.iter().all(|p| p.exists()));
}

#[test]
fn test_keep_and_delete_partition_every_set() {
    let scratch = Scratch::new();
    for dir in ["Burned", "keep", "other", "Burned/deep"] {
        scratch.write(&format!("{dir}/a"), &pattern_bytes(250, 7));
        scratch.write(&format!("{dir}/b"), &pattern_bytes(260, 8));
    }
    let sets = scan(&scratch);
    assert_eq!(sets.len(), 2);

    let prefs = PreferencePatterns::compile(&["*/Burned", "*/other"]).unwrap();
    let mut planner = DeletionPlanner::new(noninteractive().with_dry_run(true), prefs);
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    for (set, outcome) in sets.iter().zip(&outcomes) {
        let decision = &outcome.decision;
        assert!(!decision.keep.is_empty());
        let keep: HashSet<&PathBuf> = decision.keep.iter().collect();
        let delete: HashSet<&PathBuf> = decision.delete.iter().collect();
        assert!(keep.is_disjoint(&delete));
        let members: HashSet<PathBuf> = set.paths().into_iter().collect();
        let union: HashSet<PathBuf> = keep.union(&delete).map(|p| (*p).clone()).collect();
        assert_eq!(union, members);
        assert_eq!(decision.keep, vec![scratch.path(&format!(
            "keep/{}",
            set.files[0].path.file_name().unwrap().to_string_lossy()
        ))]);
    }
}

#[test]
fn test_missing_keeper_skips_deletion() {
    let scratch = Scratch::new();
    let doomed = scratch.write("Burned/f", &pattern_bytes(300, 9));
    let keeper = scratch.write("safe/f", &pattern_bytes(300, 9));
    let sets = scan(&scratch);
    std::fs::remove_file(&keeper).unwrap();

    let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
    let mut planner = DeletionPlanner::new(noninteractive(), prefs);
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    assert!(outcomes[0].skipped.is_some());
    assert!(doomed.exists());
}

#[test]
fn test_already_deleted_file_is_reported_and_processing_continues() {
    let scratch = Scratch::new();
    let gone = scratch.write("Burned/a", &pattern_bytes(300, 10));
    scratch.write("safe/a", &pattern_bytes(300, 10));
    let second = scratch.write("Burned/b", &pattern_bytes(500, 11));
    scratch.write("safe/b", &pattern_bytes(500, 11));
    let sets = scan(&scratch);
    assert_eq!(sets.len(), 2);
    std::fs::remove_file(&gone).unwrap();

    let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
    let mut planner = DeletionPlanner::new(noninteractive(), prefs);
    let outcomes = planner.run(&sets, |_| {}).unwrap();

    assert_eq!(outcomes[0].result.failure_count(), 1);
    assert_eq!(outcomes[1].result.success_count(), 1);
    assert!(!second.exists());
}

#[test]
fn test_audit_log_receives_every_decision() {
    let scratch = Scratch::new();
    scratch.write("Burned/a", &pattern_bytes(300, 12));
    scratch.write("safe/a", &pattern_bytes(300, 12));
    scratch.write("one/b", &pattern_bytes(310, 13));
    scratch.write("two/b", &pattern_bytes(310, 13));
    let sets = scan(&scratch);

    let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
    let mut planner = DeletionPlanner::new(noninteractive().with_dry_run(true), prefs);
    let mut audit = AuditLog::new(Vec::new());
    planner
        .run(&sets, |outcome| audit.record(outcome).unwrap())
        .unwrap();

    let text = String::from_utf8(audit.into_inner()).unwrap();
    let records: Vec<serde_json::Value> = text
        .lines()
        .map(|l| serde_json::from_str(l).unwrap())
        .collect();
    assert_eq!(records.len(), 2);
    assert_eq!(records[0]["resolved_by"], "preference");
    assert_eq!(records[0]["deleted"].as_array().unwrap().len(), 1);
    assert_eq!(records[1]["resolved_by"], "non_interactive_default");
    assert_eq!(records[1]["kept"].as_array().unwrap().len(), 2);
    assert!(records.iter().all(|r| r["dry_run"] == true));
}
