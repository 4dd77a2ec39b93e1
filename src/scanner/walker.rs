//! Path enumerator over one or more, possibly overlapping, roots.
//!
//! # Overview
//!
//! [`Walker`] turns the paths given on the command line into a stream of
//! absolute file paths in which no file appears twice:
//!
//! - every root is canonicalised first, so `./a`, `a/` and a symlinked alias
//!   of `a` all name the same directory;
//! - a root equal to, or nested inside, another directory root is dropped;
//! - a root naming a regular file is yielded as-is, bypassing excludes.
//!
//! Directories are walked with [`walkdir`] in file-name order. Symlinks are
//! never followed and never yielded. Excluded directories are pruned rather
//! than filtered, so their contents are never read.
//!
//! # Example
//!
//! ```no_run
//! use fastdupes::scanner::{Walker, WalkerConfig};
//! use std::path::PathBuf;
//!
//! let config = WalkerConfig::default();
//! let walker = Walker::new(&[PathBuf::from("/srv"), PathBuf::from("/srv/music")], config);
//! assert_eq!(walker.roots().len(), 1);
//! for path in walker.walk().filter_map(Result::ok) {
//!     println!("{}", path.display());
//! }
//! ```

use std::collections::HashSet;
use std::path::{Path, PathBuf};

use walkdir::WalkDir;

use super::ScanError;
use crate::pattern::GlobPattern;

/// Built-in exclude patterns (version control metadata).
pub const DEFAULT_EXCLUDES: &[&str] = &["*/.svn", "*/.bzr", "*/.git", "*/.hg"];

/// Configuration for path enumeration.
#[derive(Debug, Clone)]
pub struct WalkerConfig {
    /// Patterns matched against every visited path.
    pub exclude: Vec<GlobPattern>,
}

impl Default for WalkerConfig {
    fn default() -> Self {
        Self {
            exclude: DEFAULT_EXCLUDES
                .iter()
                .filter_map(|p| GlobPattern::new(p).ok())
                .collect(),
        }
    }
}

impl WalkerConfig {
    /// Configuration with no exclude patterns at all.
    #[must_use]
    pub fn without_excludes() -> Self {
        Self {
            exclude: Vec::new(),
        }
    }

    /// Replace the exclude patterns.
    #[must_use]
    pub fn with_excludes(mut self, exclude: Vec<GlobPattern>) -> Self {
        self.exclude = exclude;
        self
    }

    fn is_excluded(&self, path: &Path) -> bool {
        self.exclude.iter().any(|p| p.is_match(path))
    }
}

/// A canonical root scheduled for enumeration.
#[derive(Debug, Clone, PartialEq, Eq)]
enum Root {
    File(PathBuf),
    Dir(PathBuf),
}

impl Root {
    fn path(&self) -> &Path {
        match self {
            Self::File(p) | Self::Dir(p) => p,
        }
    }
}

/// Enumerates absolute file paths below a set of roots.
#[derive(Debug)]
pub struct Walker {
    roots: Vec<Root>,
    root_errors: Vec<PathBuf>,
    config: WalkerConfig,
}

impl Walker {
    /// Resolve and deduplicate `roots`.
    ///
    /// Roots that cannot be resolved are remembered and reported as
    /// [`ScanError::NotFound`] at the start of [`walk`](Self::walk).
    #[must_use]
    pub fn new(roots: &[PathBuf], config: WalkerConfig) -> Self {
        let mut resolved = Vec::new();
        let mut root_errors = Vec::new();

        for root in roots {
            match std::fs::canonicalize(root) {
                Ok(path) if path.is_dir() => resolved.push(Root::Dir(path)),
                Ok(path) => resolved.push(Root::File(path)),
                Err(e) => {
                    log::warn!("Cannot resolve {}: {}", root.display(), e);
                    root_errors.push(root.clone());
                }
            }
        }

        let roots = dedupe_roots(resolved);
        log::debug!(
            "Enumerating {} root(s): {:?}",
            roots.len(),
            roots.iter().map(|r| r.path().display()).collect::<Vec<_>>()
        );

        Self {
            roots,
            root_errors,
            config,
        }
    }

    /// The canonical roots that will be enumerated.
    #[must_use]
    pub fn roots(&self) -> Vec<&Path> {
        self.roots.iter().map(Root::path).collect()
    }

    /// Walk all roots, yielding each regular file once.
    pub fn walk(&self) -> impl Iterator<Item = Result<PathBuf, ScanError>> + '_ {
        let missing = self
            .root_errors
            .iter()
            .map(|p| Err(ScanError::NotFound(p.clone())));
        let found = self.roots.iter().flat_map(move |root| self.walk_root(root));
        missing.chain(found)
    }

    fn walk_root<'a>(
        &'a self,
        root: &'a Root,
    ) -> Box<dyn Iterator<Item = Result<PathBuf, ScanError>> + 'a> {
        match root {
            Root::File(path) => Box::new(std::iter::once(Ok(path.clone()))),
            // Files also named as roots were already yielded on their own.
            Root::Dir(path) => Box::new(self.walk_dir(path).filter(move |item| match item {
                Ok(p) => !self.is_explicit_file(p),
                Err(_) => true,
            })),
        }
    }

    fn is_explicit_file(&self, path: &Path) -> bool {
        self.roots
            .iter()
            .any(|r| matches!(r, Root::File(f) if f == path))
    }

    fn walk_dir<'a>(&'a self, root: &Path) -> impl Iterator<Item = Result<PathBuf, ScanError>> + 'a {
        WalkDir::new(root)
            .follow_links(false)
            .sort_by_file_name()
            .into_iter()
            .filter_entry(move |entry| {
                if entry.depth() > 0 && self.config.is_excluded(entry.path()) {
                    log::trace!("Excluding: {}", entry.path().display());
                    return false;
                }
                true
            })
            .filter_map(|entry| match entry {
                Ok(entry) if entry.file_type().is_file() => Some(Ok(entry.into_path())),
                Ok(entry) => {
                    if entry.file_type().is_symlink() {
                        log::trace!("Skipping symlink: {}", entry.path().display());
                    }
                    None
                }
                Err(e) => {
                    let path = e.path().map(Path::to_path_buf).unwrap_or_default();
                    log::warn!("Walker error for {}: {}", path.display(), e);
                    let source = e
                        .into_io_error()
                        .unwrap_or_else(|| std::io::Error::other("filesystem loop"));
                    Some(Err(ScanError::Io { path, source }))
                }
            })
    }
}

/// Drop duplicate roots and roots nested inside another directory root,
/// keeping the first occurrence order.
fn dedupe_roots(roots: Vec<Root>) -> Vec<Root> {
    let dirs: Vec<PathBuf> = roots
        .iter()
        .filter_map(|r| match r {
            Root::Dir(p) => Some(p.clone()),
            Root::File(_) => None,
        })
        .collect();

    let mut seen = HashSet::new();
    roots
        .into_iter()
        .filter(|root| {
            let path = root.path();
            if !seen.insert(path.to_path_buf()) {
                log::debug!("Skipping repeated root: {}", path.display());
                return false;
            }
            let nested = dirs.iter().any(|d| d != path && path.starts_with(d));
            if nested && matches!(root, Root::Dir(_)) {
                log::debug!("Skipping nested root: {}", path.display());
                return false;
            }
            true
        })
        .collect()
}
