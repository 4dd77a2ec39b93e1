use fastdupes::duplicates::{
    compare_exact, group_records_by_size, CompareMode, DuplicateFinder, FinderConfig, RunStats,
    Stage, StageOptions,
};
use fastdupes::scanner::{FileRecord, WalkerConfig, CHUNK_SIZE};
use std::fs;

use super::common::{pattern_bytes, Scratch};

fn exact_finder() -> DuplicateFinder {
    DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(0)
            .with_mode(CompareMode::Exact),
    )
}

#[test]
fn test_divergence_after_header_yields_no_sets() {
    let scratch = Scratch::new();
    let a = pattern_bytes(30_000, 5);
    let mut b = a.clone();
    b[20_000] ^= 0x55;
    scratch.write("a.bin", &a);
    scratch.write("b.bin", &b);

    let (sets, stats) =
        exact_finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert!(sets.is_empty());
    let exact = stats.stage(Stage::Exact).unwrap();
    assert_eq!(exact.files_examined, 2);
    assert_eq!(exact.groups_found, 0);
}

#[test]
fn test_stops_reading_at_the_diverging_chunk() {
    let scratch = Scratch::new();
    let size = 16 * CHUNK_SIZE;
    let a = pattern_bytes(size, 3);
    let mut b = a.clone();
    let k = CHUNK_SIZE + 4_464;
    b[k] ^= 0xff;
    let pa = scratch.write("a.bin", &a);
    let pb = scratch.write("b.bin", &b);

    let mut stats = RunStats::new();
    let groups = group_records_by_size(
        vec![
            FileRecord::new(pa, size as u64),
            FileRecord::new(pb, size as u64),
        ],
        &mut stats,
    );
    let sets = compare_exact(groups, CHUNK_SIZE, &StageOptions::default(), &mut stats);

    assert!(sets.is_empty());
    let chunks_to_k = (k / CHUNK_SIZE + 1) as u64;
    let read = stats.stage(Stage::Exact).unwrap().bytes_read;
    assert!(read <= 2 * chunks_to_k * CHUNK_SIZE as u64, "read {read} bytes");
    assert!(read < 2 * size as u64);
}

#[test]
fn test_three_equal_one_different() {
    let scratch = Scratch::new();
    let content = pattern_bytes(200_000, 11);
    let mut odd = content.clone();
    odd[100] ^= 1;
    scratch.write("1.bin", &content);
    scratch.write("2.bin", &odd);
    scratch.write("3.bin", &content);
    scratch.write("4.bin", &content);

    let (sets, _) =
        exact_finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert_eq!(sets.len(), 1);
    assert_eq!(
        sets[0].paths(),
        vec![
            scratch.path("1.bin"),
            scratch.path("3.bin"),
            scratch.path("4.bin")
        ]
    );
}

#[test]
fn test_exact_sets_are_byte_identical_on_reread() {
    let scratch = Scratch::new();
    for i in 0..3 {
        scratch.write(&format!("p{i}"), &pattern_bytes(70_000, 1));
        scratch.write(&format!("q{i}"), &pattern_bytes(70_000, 2));
    }
    scratch.write("r0", &pattern_bytes(128, 3));
    scratch.write("r1", &pattern_bytes(128, 3));

    let (sets, _) =
        exact_finder().find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());
    assert_eq!(sets.len(), 3);

    for set in &sets {
        let first = fs::read(&set.files[0].path).unwrap();
        assert_eq!(first.len() as u64, set.size);
        for file in &set.files[1..] {
            assert_eq!(fs::read(&file.path).unwrap(), first);
        }
    }
}

#[test]
fn test_small_chunks_split_the_same_way() {
    let scratch = Scratch::new();
    let content = pattern_bytes(1_000, 6);
    let mut late = content.clone();
    late[999] ^= 1;
    scratch.write("a", &content);
    scratch.write("b", &content);
    scratch.write("c", &late);

    let finder = DuplicateFinder::new(
        FinderConfig::default()
            .with_min_size(0)
            .with_head_size(64)
            .with_chunk_size(7)
            .with_mode(CompareMode::Exact),
    );
    let (sets, _) = finder.find_duplicates(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert_eq!(sets.len(), 1);
    assert_eq!(sets[0].paths(), vec![scratch.path("a"), scratch.path("b")]);
}
