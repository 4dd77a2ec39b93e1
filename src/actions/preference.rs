//! Preference patterns: ordered rules naming which copies to delete first.
//!
//! Pattern `i` (zero-based, in the order given) ranks every file it matches
//! as [`Rank::Matched(i)`](Rank::Matched). A file no pattern matches is
//! [`Rank::Unmatched`]. Ranks are ordered so that a greater rank is more
//! worth keeping: earlier patterns mark files as *more* disposable.
//!
//! Patterns see the full canonical path, so a directory above the scan root
//! can match too: `*/tmp` ranks everything under `/tmp/scan` alike.
//!
//! ```
//! use fastdupes::actions::PreferencePatterns;
//! use std::path::PathBuf;
//!
//! let prefs = PreferencePatterns::compile(&["*/Burned"]).unwrap();
//! let split = prefs.split(&[
//!     PathBuf::from("/data/Burned/x"),
//!     PathBuf::from("/data/ToBurn/x"),
//! ]);
//! assert_eq!(split.keep, vec![PathBuf::from("/data/ToBurn/x")]);
//! assert_eq!(split.delete, vec![PathBuf::from("/data/Burned/x")]);
//! ```

use std::path::{Path, PathBuf};

use crate::pattern::{GlobPattern, PatternError};

/// How strongly a file should be kept. Variant order is significant.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Rank {
    /// Matched the pattern at this index; lower indices rank lower.
    Matched(usize),
    /// Matched no pattern.
    Unmatched,
}

/// Paths of one duplicate set split by rank.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RankSplit {
    /// Files sharing the greatest rank, in input order.
    pub keep: Vec<PathBuf>,
    /// Every other file, in input order.
    pub delete: Vec<PathBuf>,
}

/// An ordered list of preference patterns.
#[derive(Debug, Clone, Default)]
pub struct PreferencePatterns {
    patterns: Vec<GlobPattern>,
}

impl PreferencePatterns {
    /// Wrap already compiled patterns.
    #[must_use]
    pub fn new(patterns: Vec<GlobPattern>) -> Self {
        Self { patterns }
    }

    /// Compile patterns in order.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for the first pattern that fails to compile.
    pub fn compile<S: AsRef<str>>(patterns: &[S]) -> Result<Self, PatternError> {
        Ok(Self::new(GlobPattern::compile_all(patterns)?))
    }

    /// Whether there are no patterns.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.patterns.is_empty()
    }

    /// Rank `path` by the first pattern matching it or one of its ancestors.
    #[must_use]
    pub fn rank(&self, path: &Path) -> Rank {
        self.patterns
            .iter()
            .position(|p| p.matches_path_or_ancestor(path))
            .map_or(Rank::Unmatched, Rank::Matched)
    }

    /// Split `paths` into the highest-ranked tier and the rest.
    ///
    /// When every path has the same rank the whole input lands in `keep`.
    #[must_use]
    pub fn split(&self, paths: &[PathBuf]) -> RankSplit {
        let ranks: Vec<Rank> = paths.iter().map(|p| self.rank(p)).collect();
        let Some(best) = ranks.iter().max().copied() else {
            return RankSplit::default();
        };

        let mut split = RankSplit::default();
        for (path, rank) in paths.iter().zip(ranks) {
            if rank == best {
                split.keep.push(path.clone());
            } else {
                log::debug!("Preferred for deletion ({:?}): {}", rank, path.display());
                split.delete.push(path.clone());
            }
        }
        split
    }
}
