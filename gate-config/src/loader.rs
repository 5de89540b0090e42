//! Rule-set loaders.

use std::fs;
use std::path::{Path, PathBuf};

use gate_policy::{RegistryError, RuleRegistry};
use thiserror::Error;
use tracing::info;

use crate::schema::RuleSetConfig;

/// Errors raised while loading a rule set.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The rule file could not be read.
    #[error("failed to read rule set `{}`: {source}", path.display())]
    Io {
        /// Path that failed to load.
        path: PathBuf,
        /// Underlying I/O error.
        #[source]
        source: std::io::Error,
    },
    /// The document is not a valid rule set.
    #[error("invalid rule set: {0}")]
    Parse(#[from] serde_json::Error),
    /// The rule set parsed but could not be registered.
    #[error("invalid rule set: {0}")]
    Registry(#[from] RegistryError),
}

/// Result alias for configuration loading.
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Parses a JSON rule set and builds a registry from it.
///
/// # Errors
///
/// Returns [`ConfigError::Parse`] for malformed documents and
/// [`ConfigError::Registry`] for invalid or duplicate names.
pub fn from_json_str(json: &str) -> ConfigResult<RuleRegistry> {
    let config: RuleSetConfig = serde_json::from_str(json)?;
    let rules = config.rule_count();
    let registry = config.into_registry()?;
    info!(actions = registry.len(), rules, "rule set loaded");
    Ok(registry)
}

/// Reads and parses a JSON rule set from `path`.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] when the file cannot be read, otherwise the
/// errors of [`from_json_str`].
pub fn load_file(path: impl AsRef<Path>) -> ConfigResult<RuleRegistry> {
    let path = path.as_ref();
    let json = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    info!(path = %path.display(), "reading rule set");
    from_json_str(&json)
}
