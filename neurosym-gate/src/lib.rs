//! Symbolic rule gate for agent actions.
//!
//! Bundles the workspace crates behind feature flags so downstream users can
//! enable only what they need.

#![warn(missing_docs, clippy::pedantic)]

/// Re-export shared primitives for convenience.
pub use gate_primitives as primitives;

/// Rules, registry, gate and caller-side integrations (enabled by `policy` feature).
#[cfg(feature = "policy")]
pub use gate_policy as policy;

/// Declarative rule-set loading (enabled by `config` feature).
#[cfg(feature = "config")]
pub use gate_config as config;

/// Tracing setup and observers (enabled by `telemetry` feature).
#[cfg(feature = "telemetry")]
pub use gate_telemetry as telemetry;
