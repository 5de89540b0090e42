//! Shared error definitions for gate primitives.

use thiserror::Error;

/// Result alias used throughout the gate crates.
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur while constructing primitive types.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum Error {
    /// Action name failed validation.
    #[error("invalid action name `{name}`: {reason}")]
    InvalidActionName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },

    /// Rule name failed validation.
    #[error("invalid rule name `{name}`: {reason}")]
    InvalidRuleName {
        /// The offending name.
        name: String,
        /// Human-readable reason for rejection.
        reason: String,
    },
}

impl Error {
    /// Returns the human-readable reason without the offending name.
    #[must_use]
    pub fn reason(&self) -> &str {
        match self {
            Self::InvalidActionName { reason, .. } | Self::InvalidRuleName { reason, .. } => reason,
        }
    }
}
