use fastdupes::pattern::GlobPattern;
use fastdupes::scanner::{ScanError, Walker, WalkerConfig};
use std::collections::HashSet;
use std::path::PathBuf;

use super::common::Scratch;

fn collect(roots: &[PathBuf], config: WalkerConfig) -> (Vec<PathBuf>, Vec<ScanError>) {
    let mut paths = Vec::new();
    let mut errors = Vec::new();
    for item in Walker::new(roots, config).walk() {
        match item {
            Ok(p) => paths.push(p),
            Err(e) => errors.push(e),
        }
    }
    (paths, errors)
}

#[test]
fn test_walk_is_sorted_and_absolute() {
    let scratch = Scratch::new();
    scratch.write("b/2", b"x");
    scratch.write("a/1", b"x");
    scratch.write("c", b"x");

    let (paths, errors) = collect(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert!(errors.is_empty());
    assert_eq!(
        paths,
        vec![scratch.path("a/1"), scratch.path("b/2"), scratch.path("c")]
    );
    assert!(paths.iter().all(|p| p.is_absolute()));
}

#[test]
fn test_overlapping_roots_yield_each_file_once() {
    let scratch = Scratch::new();
    scratch.write("top/mid/leaf/f1", b"1");
    scratch.write("top/mid/f2", b"2");
    scratch.write("top/f3", b"3");

    let roots = vec![
        scratch.path("top/mid/leaf"),
        scratch.path("top"),
        scratch.path("top/mid"),
        scratch.path("top/./mid/"),
        scratch.path("top/mid/f2"),
        scratch.path("top"),
    ];
    let (paths, errors) = collect(&roots, WalkerConfig::default());

    assert!(errors.is_empty());
    let unique: HashSet<&PathBuf> = paths.iter().collect();
    assert_eq!(unique.len(), paths.len());
    assert_eq!(paths.len(), 3);
}

#[test]
fn test_file_root_bypasses_excludes() {
    let scratch = Scratch::new();
    let hidden = scratch.write(".git/config", b"x");

    let (paths, _) = collect(&[scratch.root().to_path_buf()], WalkerConfig::default());
    assert!(paths.is_empty());

    let (paths, _) = collect(&[hidden.clone()], WalkerConfig::default());
    assert_eq!(paths, vec![hidden]);
}

#[test]
fn test_custom_excludes_prune_directories_and_skip_files() {
    let scratch = Scratch::new();
    scratch.write("keep/a.txt", b"x");
    scratch.write("keep/a.tmp", b"x");
    scratch.write("build/out.bin", b"x");

    let config = WalkerConfig::without_excludes()
        .with_excludes(GlobPattern::compile_all(&["*/build", "*.tmp"]).unwrap());
    let (paths, _) = collect(&[scratch.root().to_path_buf()], config);

    assert_eq!(paths, vec![scratch.path("keep/a.txt")]);
}

#[test]
fn test_missing_root_is_an_error_item() {
    let scratch = Scratch::new();
    scratch.write("a", b"x");

    let (paths, errors) = collect(
        &[scratch.path("missing"), scratch.root().to_path_buf()],
        WalkerConfig::default(),
    );

    assert_eq!(paths.len(), 1);
    assert_eq!(errors.len(), 1);
    assert!(matches!(&errors[0], ScanError::NotFound(p) if p.ends_with("missing")));
}

#[cfg(unix)]
#[test]
fn test_symlinks_are_not_followed_or_yielded() {
    let scratch = Scratch::new();
    let target = scratch.write("real/data.bin", b"content");
    std::os::unix::fs::symlink(&target, scratch.path("link.bin")).unwrap();
    std::os::unix::fs::symlink(scratch.path("real"), scratch.path("linkdir")).unwrap();

    let (paths, errors) = collect(&[scratch.root().to_path_buf()], WalkerConfig::default());

    assert!(errors.is_empty());
    assert_eq!(paths, vec![target]);
}
