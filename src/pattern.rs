//! Shell-style glob patterns over full paths.
//!
//! Used for `--exclude` (matched against each visited path) and `--prefer`
//! (matched against a file's path and all of its ancestor directories).
//!
//! Syntax follows `fnmatch`: `*` matches any run of characters *including*
//! the path separator, `?` matches one character, and `[...]` / `[!...]`
//! are character classes. Everything else is literal. `**` is only accepted
//! as a whole path component.
//!
//! ```
//! use fastdupes::pattern::GlobPattern;
//! use std::path::Path;
//!
//! let burned = GlobPattern::new("*/Burned").unwrap();
//! assert!(!burned.is_match(Path::new("/data/Burned/x")));
//! assert!(burned.matches_path_or_ancestor(Path::new("/data/Burned/x")));
//! assert!(!burned.matches_path_or_ancestor(Path::new("/data/ToBurn/x")));
//! ```

use std::fmt;
use std::path::Path;

use glob::{MatchOptions, Pattern};

/// `*` and `?` cross path separators; dot files get no special treatment.
const MATCH_OPTIONS: MatchOptions = MatchOptions {
    case_sensitive: true,
    require_literal_separator: false,
    require_literal_leading_dot: false,
};

/// Error raised when a pattern cannot be compiled.
#[derive(thiserror::Error, Debug)]
#[error("invalid pattern '{pattern}': {source}")]
pub struct PatternError {
    /// The offending pattern as written
    pub pattern: String,
    #[source]
    source: glob::PatternError,
}

/// A compiled glob pattern.
#[derive(Clone)]
pub struct GlobPattern {
    pattern: Pattern,
}

impl fmt::Debug for GlobPattern {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("GlobPattern").field(&self.as_str()).finish()
    }
}

impl GlobPattern {
    /// Compile `pattern`.
    ///
    /// # Errors
    ///
    /// Returns [`PatternError`] for an unclosed character class or a `**`
    /// that is not a whole path component.
    pub fn new(pattern: &str) -> Result<Self, PatternError> {
        let pattern = Pattern::new(pattern).map_err(|source| PatternError {
            pattern: pattern.to_string(),
            source,
        })?;
        Ok(Self { pattern })
    }

    /// Compile a list of patterns, failing on the first bad one.
    ///
    /// # Errors
    ///
    /// Returns the first [`PatternError`] encountered.
    pub fn compile_all<S: AsRef<str>>(patterns: &[S]) -> Result<Vec<Self>, PatternError> {
        patterns.iter().map(|p| Self::new(p.as_ref())).collect()
    }

    /// The pattern as written.
    #[must_use]
    pub fn as_str(&self) -> &str {
        self.pattern.as_str()
    }

    /// Whether the pattern matches the whole of `path`.
    #[must_use]
    pub fn is_match(&self, path: &Path) -> bool {
        self.pattern.matches_with(&path.to_string_lossy(), MATCH_OPTIONS)
    }

    /// Whether the pattern matches `path` or any directory containing it.
    ///
    /// Every ancestor up to the filesystem root is tried, including those
    /// above the directory a scan started from.
    #[must_use]
    pub fn matches_path_or_ancestor(&self, path: &Path) -> bool {
        path.ancestors()
            .filter(|p| !p.as_os_str().is_empty())
            .any(|p| self.is_match(p))
    }
}
