//! Core shared types for the rule gate.

#![warn(missing_docs, clippy::pedantic)]

mod error;
mod ids;

/// Error type and result alias shared across the workspace.
pub use error::{Error, Result};
/// Validated identifiers for gated actions and their rules.
pub use ids::{ActionName, RuleName};
