//! Observability utilities for the rule gate.
//!
//! The gate itself never logs. Callers attach a [`TracingObserver`] to a
//! [`GuardedExecutor`](gate_policy::GuardedExecutor) and install a subscriber
//! with [`init`].

#![warn(missing_docs, clippy::pedantic)]

pub mod observer;
pub mod tracing_support;

pub use observer::TracingObserver;
pub use tracing_support::init;
