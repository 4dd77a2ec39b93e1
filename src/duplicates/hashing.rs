//! Partial-hash and full-hash groupers.
//!
//! Both stages read files on a bounded rayon pool, subdivide every incoming
//! group by digest and drop subgroups of one. A file that cannot be read is
//! excluded from the run; its group continues without it.

use std::sync::atomic::{AtomicUsize, Ordering};

use rayon::prelude::*;

use super::groups::{partition_stable, DuplicateSet, FileGroup, GroupKey, Verification};
use super::stats::{RunStats, Stage, StageSummary};
use super::{install, StageOptions};
use crate::scanner::{FileError, FileRecord, Hash, Hasher};

/// Subdivide size groups by the digest of each file's leading chunk.
///
/// Files no longer than the hasher's head size are hashed in full here, and
/// that digest is later reused by [`group_by_full_hash`].
pub fn group_by_partial_hash(
    groups: Vec<FileGroup>,
    hasher: &Hasher,
    options: &StageOptions,
    stats: &mut RunStats,
) -> Vec<FileGroup> {
    let head = hasher.head_size() as u64;
    subdivide(groups, Stage::PartialHash, options, stats, |record| {
        let bytes = if record.cached_partial_hash().is_some() {
            0
        } else {
            record.size.min(head)
        };
        record.partial_hash(hasher).map(|hash| (hash, bytes))
    })
    .into_iter()
    .map(|(hash, size, files)| FileGroup::new(GroupKey::PartialHash(hash), size, files))
    .collect()
}

/// Subdivide groups by full-content digest, producing confirmed duplicates.
pub fn group_by_full_hash(
    groups: Vec<FileGroup>,
    hasher: &Hasher,
    options: &StageOptions,
    stats: &mut RunStats,
) -> Vec<DuplicateSet> {
    let head = hasher.head_size() as u64;
    subdivide(groups, Stage::FullHash, options, stats, |record| {
        let reused = record.cached_full_hash().is_some()
            || (record.cached_partial_hash().is_some() && record.size <= head);
        let bytes = if reused { 0 } else { record.size };
        record.full_hash(hasher).map(|hash| (hash, bytes))
    })
    .into_iter()
    .map(|(hash, size, files)| DuplicateSet::new(size, Verification::FullHash(hash), files))
    .collect()
}

/// Hash every member of every group and split each group by digest.
///
/// Returns `(digest, size, members)` for each subgroup of two or more, in
/// input group order and then first-appearance order.
fn subdivide<F>(
    groups: Vec<FileGroup>,
    stage: Stage,
    options: &StageOptions,
    stats: &mut RunStats,
    digest: F,
) -> Vec<(Hash, u64, Vec<FileRecord>)>
where
    F: Fn(&mut FileRecord) -> Result<(Hash, u64), FileError> + Sync,
{
    let mut summary = StageSummary::new(stage);

    let tagged: Vec<(usize, FileRecord)> = groups
        .into_iter()
        .enumerate()
        .flat_map(|(idx, group)| group.files.into_iter().map(move |f| (idx, f)))
        .collect();
    summary.files_examined = tagged.len();

    if tagged.is_empty() {
        log::debug!("{} stage: no files to process", stage.name());
        stats.record(summary);
        return Vec::new();
    }

    options.phase_start(stage.name(), tagged.len());
    log::info!("Computing {} for {} files", stage.description(), tagged.len());

    let pool = options.build_pool();
    let done = AtomicUsize::new(0);
    let results: Vec<(usize, FileRecord, Result<(Hash, u64), FileError>)> =
        install(pool.as_ref(), || {
            tagged
                .into_par_iter()
                .map(|(idx, mut record)| {
                    let result = digest(&mut record);
                    options.progress(done.fetch_add(1, Ordering::Relaxed) + 1, &record.path);
                    (idx, record, result)
                })
                .collect()
        });

    let mut keyed = Vec::with_capacity(results.len());
    for (idx, record, result) in results {
        match result {
            Ok((hash, bytes)) => {
                summary.bytes_read += bytes;
                keyed.push(((idx, hash), record));
            }
            Err(e) => stats.exclude(stage, e),
        }
    }

    let survivors: Vec<(Hash, u64, Vec<FileRecord>)> = partition_stable(keyed)
        .into_iter()
        .filter(|(_, files)| files.len() > 1)
        .map(|((_, hash), files)| {
            let size = files[0].size;
            (hash, size, files)
        })
        .collect();

    summary.groups_found = survivors.len();
    summary.files_in_groups = survivors.iter().map(|(_, _, files)| files.len()).sum();
    options.phase_end(stage.name());
    stats.record(summary);
    survivors
}
