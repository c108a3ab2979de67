//! Errors raised while reading `geox.toml`.

use std::path::PathBuf;

/// Why a project configuration could not be loaded.
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// The file exists but could not be read, or does not exist.
    #[error("cannot read {}: {source}", path.display())]
    Read {
        /// Path that was opened.
        path: PathBuf,
        /// Underlying I/O failure.
        source: std::io::Error,
    },

    /// The content is not valid TOML for a project configuration.
    #[error("invalid geox.toml: {0}")]
    Parse(#[from] toml::de::Error),

    /// The cache is enabled but has nowhere to store entries.
    #[error("cache.path must not be empty while the cache is enabled")]
    EmptyCachePath,

    /// An `[inputs]` entry has a shape no parameter can take.
    #[error("inputs.{name}: expected a string, number, boolean or list of numbers")]
    UnsupportedInput {
        /// Parameter name of the entry.
        name: String,
    },
}
