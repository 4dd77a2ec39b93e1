//! Application configuration management.
//!
//! Settings are layered with figment, later layers winning:
//!
//! 1. Built-in defaults ([`Settings::default`])
//! 2. A TOML file: `--config PATH`, or `config.toml` in the platform config
//!    directory when it exists
//! 3. `FASTDUPES_*` environment variables (`FASTDUPES_MIN_SIZE=4096`)
//! 4. Command-line flags ([`Settings::apply_cli`])
//!
//! ```toml
//! mode = "exact"
//! interaction = "noninteractive"
//! prefer = ["*/Burned", "*/Downloads"]
//! exclude = ["*/.git", "*/node_modules"]
//! min_size = 4096
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::actions::{DeleteConfig, InteractionMode, PlannerConfig, PreferencePatterns};
use crate::cli::Cli;
use crate::duplicates::{CompareMode, FinderConfig};
use crate::pattern::{GlobPattern, PatternError};
use crate::scanner::walker::DEFAULT_EXCLUDES;
use crate::scanner::{WalkerConfig, CHUNK_SIZE, PREHASH_SIZE};

/// Prefix of the environment variables read as settings.
pub const ENV_PREFIX: &str = "FASTDUPES_";

/// Errors raised while loading or validating settings.
#[derive(thiserror::Error, Debug)]
pub enum ConfigError {
    /// An explicitly named config file does not exist.
    #[error("Config file not found: {0}")]
    NotFound(PathBuf),

    /// A layer could not be parsed or had the wrong shape.
    #[error("Failed to load configuration: {0}")]
    Load(#[from] Box<figment::Error>),

    /// A value is out of range.
    #[error("Invalid setting '{key}': {reason}")]
    Invalid {
        /// Setting name
        key: &'static str,
        /// What is wrong with it
        reason: String,
    },
}

/// Effective settings for one run.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    /// Bytes covered by the partial hash.
    pub head_size: usize,
    /// Read size for full hashing and exact comparison.
    pub chunk_size: usize,
    /// Final-stage comparison mode.
    pub mode: CompareMode,
    /// Whether ties may be resolved by asking.
    pub interaction: InteractionMode,
    /// Decide but never delete.
    pub dry_run: bool,
    /// Preference patterns, most preferred for deletion first.
    pub prefer: Vec<String>,
    /// Exclude patterns.
    pub exclude: Vec<String>,
    /// Files smaller than this are ignored.
    pub min_size: u64,
    /// Concurrent readers.
    pub io_threads: usize,
    /// Move to trash instead of removing.
    pub trash: bool,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            head_size: PREHASH_SIZE,
            chunk_size: CHUNK_SIZE,
            mode: CompareMode::Hash,
            interaction: InteractionMode::Interactive,
            dry_run: false,
            prefer: Vec::new(),
            exclude: DEFAULT_EXCLUDES.iter().map(|s| (*s).to_string()).collect(),
            min_size: 25,
            io_threads: 4,
            trash: false,
        }
    }
}

/// Default platform-specific configuration file path.
///
/// `~/.config/fastdupes/config.toml` on Linux.
#[must_use]
pub fn default_config_path() -> Option<PathBuf> {
    ProjectDirs::from("", "", "fastdupes").map(|dirs| dirs.config_dir().join("config.toml"))
}

impl Settings {
    /// The figment for defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::NotFound`] if `config_path` is given but missing.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Settings::default()));

        match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound(path.to_path_buf()));
                }
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = default_config_path().filter(|p| p.is_file()) {
                    log::debug!("Using config file {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Extract and validate settings from `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Load`] on malformed input, or
    /// [`ConfigError::Invalid`] if validation fails.
    pub fn from_figment(figment: &Figment) -> Result<Self, ConfigError> {
        let settings: Settings = figment.extract().map_err(Box::new)?;
        settings.validate()?;
        Ok(settings)
    }

    /// Load defaults, config file and environment.
    ///
    /// # Errors
    ///
    /// See [`Settings::figment`] and [`Settings::from_figment`].
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::from_figment(&Self::figment(config_path)?)
    }

    /// Load every layer including the command line, and validate the result.
    ///
    /// # Errors
    ///
    /// Returns any loading or validation error.
    pub fn for_cli(cli: &Cli) -> Result<Self, ConfigError> {
        let mut settings = Self::load(cli.config.as_deref())?;
        settings.apply_cli(cli);
        settings.validate()?;
        Ok(settings)
    }

    /// Overlay command-line flags.
    pub fn apply_cli(&mut self, cli: &Cli) {
        if let Some(bytes) = cli.head_size {
            self.head_size = usize::try_from(bytes).unwrap_or(usize::MAX);
        }
        if let Some(bytes) = cli.chunk_size {
            self.chunk_size = usize::try_from(bytes).unwrap_or(usize::MAX);
        }
        if let Some(bytes) = cli.min_size {
            self.min_size = bytes;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if cli.exact {
            self.mode = CompareMode::Exact;
        }
        if cli.noninteractive {
            self.interaction = InteractionMode::NonInteractive;
        }
        if cli.dry_run {
            self.dry_run = true;
        }
        if cli.trash {
            self.trash = true;
        }
        if !cli.prefer.is_empty() {
            self.prefer = cli.prefer.clone();
        }
        self.exclude = merge_excludes(&self.exclude, &cli.exclude);
    }

    /// Reject values the pipeline cannot work with.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] naming the first bad key.
    pub fn validate(&self) -> Result<(), ConfigError> {
        let positive = |key: &'static str, value: usize| {
            if value == 0 {
                Err(ConfigError::Invalid {
                    key,
                    reason: "must be greater than zero".to_string(),
                })
            } else {
                Ok(())
            }
        };
        positive("head_size", self.head_size)?;
        positive("chunk_size", self.chunk_size)?;
        positive("io_threads", self.io_threads)?;
        Ok(())
    }

    /// Render as TOML, for `--defaults`.
    ///
    /// # Errors
    ///
    /// Returns a serialization error.
    pub fn to_toml(&self) -> Result<String, toml::ser::Error> {
        toml::to_string_pretty(self)
    }

    /// Detection pipeline configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_head_size(self.head_size)
            .with_chunk_size(self.chunk_size)
            .with_mode(self.mode)
            .with_min_size(self.min_size)
            .with_io_threads(self.io_threads)
    }

    /// Path enumerator configuration.
    ///
    /// # Errors
    ///
    /// Returns the first exclude pattern that does not compile.
    pub fn walker_config(&self) -> Result<WalkerConfig, PatternError> {
        let patterns: Vec<&str> = self.exclude.iter().map(|p| strip_separators(p)).collect();
        Ok(WalkerConfig::without_excludes().with_excludes(GlobPattern::compile_all(&patterns)?))
    }

    /// Compiled preference patterns.
    ///
    /// # Errors
    ///
    /// Returns the first preference pattern that does not compile.
    pub fn preferences(&self) -> Result<PreferencePatterns, PatternError> {
        PreferencePatterns::compile(&self.prefer)
    }

    /// Deletion planner configuration.
    #[must_use]
    pub fn planner_config(&self) -> PlannerConfig {
        let delete = if self.trash {
            DeleteConfig::trash()
        } else {
            DeleteConfig::permanent()
        };
        PlannerConfig::default()
            .with_interaction(self.interaction)
            .with_dry_run(self.dry_run)
            .with_delete_config(delete)
    }
}

/// Append `extra` exclude patterns to `base`.
///
/// A pattern starting with `-` first discards everything collected so far;
/// the rest of it, if any, is then added like any other pattern.
///
/// ```
/// use fastdupes::config::merge_excludes;
///
/// let base = vec!["*/.git".to_string()];
/// assert_eq!(merge_excludes(&base, &["*/tmp".into()]), vec!["*/.git", "*/tmp"]);
/// assert_eq!(merge_excludes(&base, &["-*/tmp".into()]), vec!["*/tmp"]);
/// assert!(merge_excludes(&base, &["-".into()]).is_empty());
/// ```
#[must_use]
pub fn merge_excludes(base: &[String], extra: &[String]) -> Vec<String> {
    let mut merged = base.to_vec();
    for pattern in extra {
        match pattern.strip_prefix('-') {
            Some(rest) => {
                merged.clear();
                if !rest.is_empty() {
                    merged.push(rest.to_string());
                }
            }
            None => merged.push(pattern.clone()),
        }
    }
    merged
}

/// Strip trailing path separators so `*/build/` matches the directory itself.
fn strip_separators(pattern: &str) -> &str {
    let stripped = pattern.trim_end_matches(['/', std::path::MAIN_SEPARATOR]);
    if stripped.is_empty() {
        pattern
    } else {
        stripped
    }
}
