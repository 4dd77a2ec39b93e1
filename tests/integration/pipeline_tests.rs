use fastdupes::duplicates::{
    CompareMode, DuplicateFinder, FinderConfig, Stage, Verification,
};
use fastdupes::scanner::{FileError, WalkerConfig};
use std::fs;

use super::common::{pattern_bytes, Scratch};

fn finder() -> DuplicateFinder {
    DuplicateFinder::new(FinderConfig::default().with_min_size(0))
}

#[test]
fn test_scan_empty_directory() {
    let scratch = Scratch::new();
    let (sets, stats) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert!(sets.is_empty());
    assert_eq!(stats.files_enumerated, 0);
    assert!(!stats.had_errors());
}

#[test]
fn test_size_then_hash_confirms_single_pair() {
    let scratch = Scratch::new();
    scratch.write("small.bin", &pattern_bytes(100, 1));
    let a = scratch.write("a.bin", &pattern_bytes(200, 2));
    let b = scratch.write("b.bin", &pattern_bytes(200, 2));

    let (sets, stats) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    let size = stats.stage(Stage::Size).unwrap();
    assert_eq!(size.files_examined, 3);
    assert_eq!(size.groups_found, 1);
    assert_eq!(size.files_in_groups, 2);

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 200);
    assert_eq!(sets[0].paths(), vec![a, b]);
    assert!(matches!(sets[0].verification, Verification::FullHash(_)));
}

#[test]
fn test_hash_sets_have_equal_size_and_digest() {
    let scratch = Scratch::new();
    for (i, seed) in [1u8, 1, 2, 2, 2, 3].iter().enumerate() {
        scratch.write(&format!("d{i}/f.bin"), &pattern_bytes(5_000, *seed));
    }

    let (sets, _) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());
    assert_eq!(sets.len(), 2);

    let hasher = fastdupes::scanner::Hasher::new();
    for set in &sets {
        let first = hasher.full_hash(&set.files[0].path).unwrap();
        for file in &set.files {
            assert_eq!(fs::metadata(&file.path).unwrap().len(), set.size);
            assert_eq!(hasher.full_hash(&file.path).unwrap(), first);
        }
    }
}

#[test]
fn test_same_header_different_tail_is_not_a_duplicate() {
    let scratch = Scratch::new();
    let mut a = pattern_bytes(40_000, 9);
    let b = a.clone();
    a[30_000] ^= 0xff;
    scratch.write("a.bin", &a);
    scratch.write("b.bin", &b);

    let (sets, stats) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert!(sets.is_empty());
    assert_eq!(stats.stage(Stage::PartialHash).unwrap().groups_found, 1);
    assert_eq!(stats.stage(Stage::FullHash).unwrap().groups_found, 0);
}

#[test]
fn test_idempotent_groupings() {
    let scratch = Scratch::new();
    for i in 0..4 {
        scratch.write(&format!("x/{i}.bin"), &pattern_bytes(3_000, 7));
        scratch.write(&format!("y/{i}.bin"), &pattern_bytes(3_000 + i, 8));
    }
    scratch.write("z/0.bin", &pattern_bytes(3_001, 8));

    let roots = [scratch.root().to_path_buf()];
    let (first, _) = finder().find_duplicates(&roots, WalkerConfig::default());
    let (second, _) = finder().find_duplicates(&roots, WalkerConfig::default());

    let paths = |sets: &[fastdupes::duplicates::DuplicateSet]| {
        sets.iter().map(|s| s.paths()).collect::<Vec<_>>()
    };
    assert_eq!(first.len(), 2);
    assert_eq!(paths(&first), paths(&second));
}

#[test]
fn test_overlapping_roots_do_not_pair_a_file_with_itself() {
    let scratch = Scratch::new();
    scratch.write("music/a.flac", &pattern_bytes(1_000, 4));
    scratch.write("music/sub/b.flac", &pattern_bytes(2_000, 5));

    let roots = vec![
        scratch.root().to_path_buf(),
        scratch.path("music"),
        scratch.path("music/sub"),
        scratch.path("music/a.flac"),
    ];
    let (sets, stats) = finder().find_duplicates(&roots, WalkerConfig::default());

    assert!(sets.is_empty());
    assert_eq!(stats.files_enumerated, 2);
}

#[test]
fn test_min_size_floor() {
    let scratch = Scratch::new();
    scratch.write("a.txt", b"tiny");
    scratch.write("b.txt", b"tiny");
    scratch.write("c.bin", &pattern_bytes(64, 1));
    scratch.write("d.bin", &pattern_bytes(64, 1));

    let finder = DuplicateFinder::with_defaults();
    let (sets, stats) =
        finder.find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 64);
    assert_eq!(stats.stage(Stage::Size).unwrap().skipped, 2);
}

#[test]
fn test_empty_files_are_duplicates_without_floor() {
    let scratch = Scratch::new();
    scratch.write("a", b"");
    scratch.write("b", b"");

    let (sets, _) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());
    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].size, 0);
}

#[test]
fn test_vanished_file_is_excluded_not_fatal() {
    let scratch = Scratch::new();
    let a = scratch.write("a.bin", &pattern_bytes(500, 3));
    let b = scratch.write("b.bin", &pattern_bytes(500, 3));
    let gone = scratch.path("gone.bin");

    let (sets, stats) = finder().find_duplicates_from_paths(vec![a, gone.clone(), b]);

    assert_eq!(sets.len(), 1);
    assert_eq!(stats.excluded.len(), 1);
    assert_eq!(stats.excluded[0].stage, Stage::Size);
    assert!(matches!(&stats.excluded[0].error, FileError::Vanished(p) if *p == gone));
    assert!(stats.had_errors());
}

#[test]
fn test_missing_root_is_reported() {
    let scratch = Scratch::new();
    scratch.write("a.bin", &pattern_bytes(500, 3));
    scratch.write("b.bin", &pattern_bytes(500, 3));

    let roots = vec![scratch.root().to_path_buf(), scratch.path("nope")];
    let (sets, stats) = finder().find_duplicates(&roots, WalkerConfig::default());

    assert_eq!(sets.len(), 1);
    assert_eq!(stats.scan_errors.len(), 1);
}

#[test]
fn test_vcs_directories_excluded_by_default() {
    let scratch = Scratch::new();
    scratch.write("src/main.rs", &pattern_bytes(300, 1));
    scratch.write(".git/objects/ab", &pattern_bytes(300, 1));

    let (sets, stats) =
        finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());
    assert!(sets.is_empty());
    assert_eq!(stats.files_enumerated, 1);

    let (sets, _) = finder().find_duplicates(
        &[scratch.root().to_path_buf()],
        WalkerConfig::without_excludes(),
    );
    assert_eq!(sets.len(), 1);
}

#[test]
fn test_hash_and_exact_modes_agree() {
    let scratch = Scratch::new();
    for i in 0..3 {
        scratch.write(&format!("a{i}.bin"), &pattern_bytes(150_000, 1));
    }
    let mut odd = pattern_bytes(150_000, 1);
    odd[149_999] ^= 1;
    scratch.write("odd.bin", &odd);
    scratch.write("b0.bin", &pattern_bytes(90_000, 2));
    scratch.write("b1.bin", &pattern_bytes(90_000, 2));

    let roots = [scratch.root().to_path_buf()];
    let (hashed, _) = finder().find_duplicates(&roots, WalkerConfig::default());
    let exact_finder =
        DuplicateFinder::new(FinderConfig::default().with_min_size(0).with_mode(CompareMode::Exact));
    let (exact, _) = exact_finder.find_duplicates(&roots, WalkerConfig::default());

    let paths = |sets: &[fastdupes::duplicates::DuplicateSet]| {
        sets.iter().map(|s| s.paths()).collect::<Vec<_>>()
    };
    assert_eq!(hashed.len(), 2);
    assert_eq!(paths(&hashed), paths(&exact));
    assert!(exact
        .iter()
        .all(|s| s.verification == Verification::ExactContent));
}
