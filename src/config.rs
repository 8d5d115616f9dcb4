//! Application configuration management.
//!
//! Settings are layered, later layers winning:
//! 1. Built-in defaults
//! 2. A TOML file (`--config PATH`, or `config.toml` in the platform config
//!    directory)
//! 3. Environment variables prefixed with `FINDDUPES_`
//! 4. Command-line flags
//!
//! ```toml
//! algorithm = "blake3"
//! io_threads = 8
//! skip_hidden = true
//! ignore_patterns = ["*.tmp", "node_modules/"]
//! ```

use std::path::{Path, PathBuf};

use directories::ProjectDirs;
use figment::providers::{Env, Format, Serialized, Toml};
use figment::Figment;
use serde::{Deserialize, Serialize};

use crate::cli::Cli;
use crate::duplicates::FinderConfig;
use crate::error::ConfigError;
use crate::scanner::{HashAlgorithm, WalkerConfig, DEFAULT_CHUNK_SIZE, MAX_CHUNK_SIZE};

/// Prefix for environment variable overrides.
pub const ENV_PREFIX: &str = "FINDDUPES_";

/// Application configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Digest algorithm for fingerprints.
    pub algorithm: HashAlgorithm,
    /// Number of hashing threads.
    pub io_threads: usize,
    /// Read buffer size for hashing, in bytes.
    pub chunk_size: usize,
    /// Follow symbolic links during traversal.
    pub follow_symlinks: bool,
    /// Skip hidden files and directories.
    pub skip_hidden: bool,
    /// Gitignore-style patterns to skip.
    pub ignore_patterns: Vec<String>,
    /// Minimum file size in bytes.
    pub min_size: Option<u64>,
    /// Maximum file size in bytes.
    pub max_size: Option<u64>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            algorithm: HashAlgorithm::default(),
            io_threads: 4,
            chunk_size: DEFAULT_CHUNK_SIZE,
            follow_symlinks: false,
            skip_hidden: false,
            ignore_patterns: Vec::new(),
            min_size: None,
            max_size: None,
        }
    }
}

impl Config {
    /// Build the layered figment: defaults, config file, environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::PathNotFound`] if an explicit config file
    /// does not exist.
    pub fn figment(config_path: Option<&Path>) -> Result<Figment, ConfigError> {
        let mut figment = Figment::from(Serialized::defaults(Config::default()));

        match config_path {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::PathNotFound(path.to_path_buf()));
                }
                log::debug!("Loading config from {}", path.display());
                figment = figment.merge(Toml::file(path));
            }
            None => {
                if let Some(path) = Self::default_path().filter(|p| p.is_file()) {
                    log::debug!("Loading config from {}", path.display());
                    figment = figment.merge(Toml::file(path));
                }
            }
        }

        Ok(figment.merge(Env::prefixed(ENV_PREFIX)))
    }

    /// Load defaults, the config file and the environment.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError`] naming the offending key when a value cannot
    /// be parsed, or when an explicit config file is missing.
    pub fn load(config_path: Option<&Path>) -> Result<Self, ConfigError> {
        Self::extract(&Self::figment(config_path)?)
    }

    /// Extract and validate a configuration from `figment`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] when extraction or validation
    /// fails.
    pub fn extract(figment: &Figment) -> Result<Self, ConfigError> {
        let config: Self = figment.extract().map_err(|e| ConfigError::InvalidValue {
            key: if e.path.is_empty() {
                "config".to_string()
            } else {
                e.path.join(".")
            },
            message: e.kind.to_string(),
        })?;
        config.validate()?;
        Ok(config)
    }

    /// Apply command-line flags on top of the loaded configuration.
    ///
    /// Ignore patterns given on the command line are added to the
    /// configured ones.
    #[must_use]
    pub fn with_cli_overrides(mut self, cli: &Cli) -> Self {
        if let Some(algorithm) = cli.algorithm {
            self.algorithm = algorithm;
        }
        if let Some(threads) = cli.io_threads {
            self.io_threads = threads;
        }
        if let Some(chunk_size) = cli.chunk_size {
            self.chunk_size = usize::try_from(chunk_size).unwrap_or(usize::MAX);
        }
        self.follow_symlinks |= cli.follow_symlinks;
        self.skip_hidden |= cli.skip_hidden;
        self.ignore_patterns
            .extend(cli.ignore_patterns.iter().cloned());
        if cli.min_size.is_some() {
            self.min_size = cli.min_size;
        }
        if cli.max_size.is_some() {
            self.max_size = cli.max_size;
        }
        self
    }

    /// Check value ranges.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::InvalidValue`] for a zero thread count, a chunk
    /// size of zero or above [`MAX_CHUNK_SIZE`], or a minimum size above the
    /// maximum size.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.io_threads == 0 {
            return Err(invalid("io_threads", "must be at least 1"));
        }
        if self.chunk_size == 0 {
            return Err(invalid("chunk_size", "must be at least 1 byte"));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(invalid(
                "chunk_size",
                &format!(
                    "{} is larger than the {} limit",
                    bytesize::ByteSize(self.chunk_size as u64),
                    bytesize::ByteSize(MAX_CHUNK_SIZE as u64)
                ),
            ));
        }
        if let (Some(min), Some(max)) = (self.min_size, self.max_size) {
            if min > max {
                return Err(invalid(
                    "min_size",
                    &format!("{min} is larger than max_size {max}"),
                ));
            }
        }
        Ok(())
    }

    /// Walker settings derived from this configuration.
    #[must_use]
    pub fn walker_config(&self) -> WalkerConfig {
        WalkerConfig::default()
            .with_follow_symlinks(self.follow_symlinks)
            .with_skip_hidden(self.skip_hidden)
            .with_size_bounds(self.min_size, self.max_size)
            .with_ignore_patterns(self.ignore_patterns.clone())
    }

    /// Finder settings derived from this configuration.
    #[must_use]
    pub fn finder_config(&self) -> FinderConfig {
        FinderConfig::default()
            .with_algorithm(self.algorithm)
            .with_chunk_size(self.chunk_size)
            .with_io_threads(self.io_threads)
            .with_walker_config(self.walker_config())
    }

    /// Get the default platform-specific configuration path.
    #[must_use]
    pub fn default_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "finddupes").map(|dirs| dirs.config_dir().join("config.toml"))
    }
}

fn invalid(key: &str, message: &str) -> ConfigError {
    ConfigError::InvalidValue {
        key: key.to_string(),
        message: message.to_string(),
    }
}
