//! Groups, duplicate sets and the size stage.
//!
//! # Overview
//!
//! A [`FileGroup`] holds files that are still indistinguishable by every
//! check applied so far. Each stage consumes groups by value and hands the
//! surviving records on, so a record is only ever owned by one stage.
//! Groups of one are dropped after every stage. What survives the last stage
//! becomes a [`DuplicateSet`].
//!
//! ## Size Grouping
//!
//! The first stage stats each path once, drops anything that is not a
//! regular file or is below the size floor, and buckets by exact length.
//! Files keep the order in which the enumerator produced them.
//!
//! # Example
//!
//! ```
//! use fastdupes::duplicates::{group_records_by_size, RunStats};
//! use fastdupes::scanner::FileRecord;
//! use std::path::PathBuf;
//!
//! let records = vec![
//!     FileRecord::new(PathBuf::from("/a"), 100),
//!     FileRecord::new(PathBuf::from("/b"), 200),
//!     FileRecord::new(PathBuf::from("/c"), 200),
//! ];
//!
//! let mut stats = RunStats::new();
//! let groups = group_records_by_size(records, &mut stats);
//!
//! assert_eq!(groups.len(), 1);
//! assert_eq!(groups[0].size, 200);
//! assert_eq!(groups[0].len(), 2);
//! ```

use std::collections::HashMap;
use std::path::PathBuf;

use super::stats::{RunStats, Stage, StageSummary};
use crate::scanner::{hash_to_hex, FileRecord, Hash};

/// The equality predicate a group's members satisfy.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum GroupKey {
    /// Same byte length
    Size(u64),
    /// Same digest of the leading chunk
    PartialHash(Hash),
}

/// Files indistinguishable by the checks applied so far.
#[derive(Debug, Clone)]
pub struct FileGroup {
    /// Key shared by every member at the stage that produced the group
    pub key: GroupKey,
    /// Byte length shared by every member
    pub size: u64,
    /// Members, in enumeration order
    pub files: Vec<FileRecord>,
}

impl FileGroup {
    /// Create a group.
    #[must_use]
    pub fn new(key: GroupKey, size: u64, files: Vec<FileRecord>) -> Self {
        Self { key, size, files }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the group has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }
}

/// How a duplicate set was confirmed.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Verification {
    /// Every member has this full-content digest
    FullHash(Hash),
    /// Every member was compared byte for byte to the end
    ExactContent,
}

/// Files confirmed byte-identical; the pipeline's output unit.
#[derive(Debug, Clone)]
pub struct DuplicateSet {
    /// Byte length of every member
    pub size: u64,
    /// How identity was established
    pub verification: Verification,
    /// Members, in enumeration order
    pub files: Vec<FileRecord>,
}

impl DuplicateSet {
    /// Create a duplicate set.
    #[must_use]
    pub fn new(size: u64, verification: Verification, files: Vec<FileRecord>) -> Self {
        debug_assert!(files.len() > 1, "a duplicate set needs at least two files");
        debug_assert!(files.iter().all(|f| f.size == size));
        Self {
            size,
            verification,
            files,
        }
    }

    /// Number of members.
    #[must_use]
    pub fn len(&self) -> usize {
        self.files.len()
    }

    /// Whether the set has no members.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    /// Paths of the members.
    #[must_use]
    pub fn paths(&self) -> Vec<PathBuf> {
        self.files.iter().map(|f| f.path.clone()).collect()
    }

    /// Bytes reclaimable by keeping a single copy.
    #[must_use]
    pub fn wasted_space(&self) -> u64 {
        self.size * (self.files.len().saturating_sub(1)) as u64
    }

    /// Digest as hex, or `"exact"` for byte-compared sets.
    #[must_use]
    pub fn key_display(&self) -> String {
        match self.verification {
            Verification::FullHash(hash) => hash_to_hex(&hash),
            Verification::ExactContent => "exact".to_string(),
        }
    }
}

/// Split `items` by key, keeping first-seen key order and insertion order
/// inside each bucket.
pub(crate) fn partition_stable<K, T>(items: impl IntoIterator<Item = (K, T)>) -> Vec<(K, Vec<T>)>
where
    K: Eq + std::hash::Hash + Clone,
{
    let mut index: HashMap<K, usize> = HashMap::new();
    let mut buckets: Vec<(K, Vec<T>)> = Vec::new();
    for (key, item) in items {
        match index.get(&key) {
            Some(&slot) => buckets[slot].1.push(item),
            None => {
                index.insert(key.clone(), buckets.len());
                buckets.push((key, vec![item]));
            }
        }
    }
    buckets
}

/// Size stage over raw paths.
///
/// Each path is stat'ed exactly once (without following symlinks). A failed
/// lookup excludes that path and is reported through `stats`; non-regular
/// files and files smaller than `min_size` are skipped.
pub fn group_by_size(
    paths: impl IntoIterator<Item = PathBuf>,
    min_size: u64,
    stats: &mut RunStats,
) -> Vec<FileGroup> {
    let mut records = Vec::new();
    let mut skipped = 0usize;
    let mut failed = 0usize;

    for path in paths {
        match FileRecord::stat(path) {
            Ok(Some(record)) if record.size >= min_size => records.push(record),
            Ok(Some(record)) => {
                log::trace!("Below size floor ({} bytes): {}", record.size, record.path.display());
                skipped += 1;
            }
            Ok(None) => skipped += 1,
            Err(e) => {
                failed += 1;
                stats.exclude(Stage::Size, e);
            }
        }
    }

    size_stage(records, skipped + failed, skipped, stats)
}

/// Size stage over records whose size is already known.
pub fn group_records_by_size(
    records: impl IntoIterator<Item = FileRecord>,
    stats: &mut RunStats,
) -> Vec<FileGroup> {
    size_stage(records.into_iter().collect(), 0, 0, stats)
}

fn size_stage(
    records: Vec<FileRecord>,
    dropped: usize,
    skipped: usize,
    stats: &mut RunStats,
) -> Vec<FileGroup> {
    let mut summary = StageSummary::new(Stage::Size);
    summary.files_examined = records.len() + dropped;
    summary.skipped = skipped;

    let groups: Vec<FileGroup> = partition_stable(records.into_iter().map(|r| (r.size, r)))
        .into_iter()
        .filter_map(|(size, files)| {
            if files.len() == 1 {
                log::trace!("Eliminated unique size {}: {}", size, files[0].path.display());
                None
            } else {
                log::debug!("Size group {} bytes: {} potential duplicates", size, files.len());
                Some(FileGroup::new(GroupKey::Size(size), size, files))
            }
        })
        .collect();

    summary.groups_found = groups.len();
    summary.files_in_groups = groups.iter().map(FileGroup::len).sum();
    stats.record(summary);
    groups
}
