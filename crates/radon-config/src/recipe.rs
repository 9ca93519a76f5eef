//! TOML recipe files.
//!
//! A recipe is a `Params` serialized as TOML. Unknown keys are rejected so
//! a typo in an option name fails fast instead of silently using a
//! default.

use std::path::Path;

use crate::error::ConfigError;
use crate::params::Params;

/// Loads and validates a recipe file.
pub fn load_recipe(path: impl AsRef<Path>) -> Result<Params, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(|e| ConfigError::ReadFile {
        path: path.to_path_buf(),
        source: e,
    })?;
    let params: Params = toml::from_str(&text)?;
    params.validate()?;
    Ok(params)
}
