//! Error types for configuration operations.

use std::path::PathBuf;
use thiserror::Error;

/// Errors raised while assembling or validating a configuration.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// A required source or output path was not specified.
    #[error("missing required input: '{option}' must be specified")]
    MissingInput {
        /// Name of the absent option.
        option: &'static str,
    },

    /// An option has an unrecognized or out-of-range value.
    #[error("invalid value for '{option}': {reason}")]
    InvalidConfig {
        /// Name of the offending option.
        option: String,
        /// Why the value was rejected.
        reason: String,
    },

    /// A recipe file could not be read.
    #[error("failed to read recipe '{path}': {source}")]
    ReadFile {
        /// Path of the recipe.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },

    /// A recipe file could not be parsed (including unrecognized keys).
    #[error("failed to parse recipe: {0}")]
    TomlParse(#[from] toml::de::Error),
}

impl ConfigError {
    /// Shorthand for an [`InvalidConfig`](ConfigError::InvalidConfig) error.
    pub fn invalid(option: impl Into<String>, reason: impl Into<String>) -> Self {
        ConfigError::InvalidConfig {
            option: option.into(),
            reason: reason.into(),
        }
    }
}
