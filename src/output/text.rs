//! Plain-text report: one block of paths per duplicate set.
//!
//! ```text
//! /photos/2019/img_0001.jpg
//! /backup/photos/img_0001.jpg
//!
//! /music/a.flac
//! /music/copy of a.flac
//! ```

use std::io::{self, Write};

use bytesize::ByteSize;

use crate::duplicates::{DuplicateSet, RunStats};

/// Text rendering of duplicate sets.
#[derive(Debug)]
pub struct TextOutput<'a> {
    sets: &'a [DuplicateSet],
}

impl<'a> TextOutput<'a> {
    /// Render `sets`.
    #[must_use]
    pub fn new(sets: &'a [DuplicateSet]) -> Self {
        Self { sets }
    }

    /// Write every set as a block of paths, blocks separated by a blank line.
    ///
    /// # Errors
    ///
    /// Returns any error from `writer`.
    pub fn write_to<W: Write>(&self, writer: &mut W) -> io::Result<()> {
        for (i, set) in self.sets.iter().enumerate() {
            if i > 0 {
                writeln!(writer)?;
            }
            for file in &set.files {
                writeln!(writer, "{}", file.path.display())?;
            }
        }
        writer.flush()
    }
}

/// One-line human summary of a run.
#[must_use]
pub fn summary_line(sets: &[DuplicateSet], stats: &RunStats) -> String {
    let files: usize = sets.iter().map(DuplicateSet::len).sum();
    let wasted: u64 = sets.iter().map(DuplicateSet::wasted_space).sum();
    let mut line = format!(
        "Found {} duplicate set(s), {} files, {} reclaimable ({} files scanned in {:.2}s)",
        sets.len(),
        files,
        ByteSize::b(wasted),
        stats.files_enumerated,
        stats.duration.as_secs_f64()
    );
    let problems = stats.excluded.len() + stats.scan_errors.len();
    if problems > 0 {
        line.push_str(&format!("; {problems} path(s) skipped due to errors"));
    }
    line
}
