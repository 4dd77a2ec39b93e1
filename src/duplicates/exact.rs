//! Exact comparator: lockstep chunk comparison with early termination.
//!
//! # Overview
//!
//! For each incoming group every member gets its own [`ChunkReader`]. The
//! comparator then works in rounds: one chunk is read from every active
//! member at the same offset (concurrently, on the I/O pool), and the
//! members are re-partitioned by value equality of that chunk. A partition
//! that shrinks to one member is dropped at once, which closes its file and
//! stops any further reading of it. A partition whose members all hit end of
//! file together is a confirmed [`DuplicateSet`].
//!
//! Groups are processed one at a time, so at most one group's files are open
//! simultaneously.

use std::collections::VecDeque;

use rayon::prelude::*;

use super::groups::{DuplicateSet, FileGroup, Verification};
use super::stats::{RunStats, Stage, StageSummary};
use super::{install, StageOptions};
use crate::scanner::{ChunkReader, FileError, FileRecord};

/// A group member with its open reader.
#[derive(Debug)]
struct Member {
    record: FileRecord,
    reader: ChunkReader,
}

/// Confirm duplicates by comparing file contents chunk by chunk.
///
/// # Arguments
///
/// * `groups` - Candidate groups, typically the partial-hash survivors
/// * `chunk_size` - Bytes read per member per round
/// * `options` - I/O pool size and progress reporting
/// * `stats` - Run statistics; read failures are recorded here
///
/// # Returns
///
/// Confirmed duplicate sets, in input group order. Members keep their order.
pub fn compare_exact(
    groups: Vec<FileGroup>,
    chunk_size: usize,
    options: &StageOptions,
    stats: &mut RunStats,
) -> Vec<DuplicateSet> {
    let mut summary = StageSummary::new(Stage::Exact);
    summary.files_examined = groups.iter().map(FileGroup::len).sum();

    options.phase_start(Stage::Exact.name(), groups.len());
    log::info!(
        "Comparing contents of {} files in {} groups",
        summary.files_examined,
        groups.len()
    );

    let pool = options.build_pool();
    let mut sets = Vec::new();

    for (idx, group) in groups.into_iter().enumerate() {
        let size = group.size;
        let label = group.files.first().map(|f| f.path.clone()).unwrap_or_default();
        let mut members = Vec::with_capacity(group.files.len());
        for record in group.files {
            match ChunkReader::open(&record.path, chunk_size) {
                Ok(reader) => members.push(Member { record, reader }),
                Err(e) => stats.exclude(Stage::Exact, e),
            }
        }

        let mut worklist = VecDeque::new();
        if members.len() > 1 {
            worklist.push_back(members);
        }

        while let Some(class) = worklist.pop_front() {
            let results: Vec<(Member, Result<usize, FileError>)> = install(pool.as_ref(), || {
                class
                    .into_par_iter()
                    .map(|mut member| {
                        let result = member.reader.fill_next();
                        (member, result)
                    })
                    .collect()
            });

            let mut active = Vec::with_capacity(results.len());
            for (member, result) in results {
                match result {
                    Ok(read) => {
                        summary.bytes_read += read as u64;
                        active.push(member);
                    }
                    Err(e) => stats.exclude(Stage::Exact, e),
                }
            }

            for part in split_by_chunk(active) {
                if part.len() < 2 {
                    if let Some(m) = part.first() {
                        log::trace!(
                            "Diverged at offset {}: {}",
                            m.reader.offset(),
                            m.record.path.display()
                        );
                    }
                } else if part.iter().all(|m| m.reader.is_exhausted()) {
                    let files = part.into_iter().map(|m| m.record).collect();
                    sets.push(DuplicateSet::new(size, Verification::ExactContent, files));
                } else {
                    worklist.push_back(part);
                }
            }
        }

        options.progress(idx + 1, &label);
    }

    summary.groups_found = sets.len();
    summary.files_in_groups = sets.iter().map(DuplicateSet::len).sum();
    options.phase_end(Stage::Exact.name());
    stats.record(summary);
    sets
}

/// Partition members by equality of their most recent chunk.
///
/// Each member is compared against the first member of every existing
/// partition, so partitions keep first-appearance order.
fn split_by_chunk(members: Vec<Member>) -> Vec<Vec<Member>> {
    let mut parts: Vec<Vec<Member>> = Vec::new();
    for member in members {
        let slot = parts.iter().position(|p| {
            let head = &p[0].reader;
            head.chunk() == member.reader.chunk()
                && head.is_exhausted() == member.reader.is_exhausted()
        });
        match slot {
            Some(i) => parts[i].push(member),
            None => parts.push(vec![member]),
        }
    }
    parts
}
