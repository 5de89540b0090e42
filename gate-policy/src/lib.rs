//! Rule-based validation gate for actions proposed by agents.
//!
//! A [`RuleRegistry`] maps action names to ordered lists of [`Rule`]s. The
//! registry evaluates every rule for an action against a per-call [`Context`]
//! and returns a [`Decision`]. Evaluation never aborts early: missing context
//! keys, incomparable values, and panicking predicates all fail closed and
//! surface as violations. Actions without rules are allowed.
//!
//! Enforcement is the caller's job. An action proposer calls
//! [`RuleGate::validate`] (or goes through a [`GuardedExecutor`]) before running
//! the real side effect.

#![warn(missing_docs, clippy::pedantic)]

pub mod condition;
pub mod context;
pub mod decision;
pub mod gate;
pub mod integrations;
pub mod registry;
pub mod rule;

pub use condition::{Comparison, Condition};
pub use context::Context;
pub use decision::{Decision, Violation, ViolationKind};
pub use gate::RuleGate;
pub use integrations::{
    ActionExecutor, CompositeObserver, ContextResolver, DecisionObserver, ExecutionError,
    GuardError, GuardResult, GuardedExecutor, ParamsResolver, ProposedAction,
};
pub use registry::{RegistryError, RegistryResult, RuleRegistry};
pub use rule::{Predicate, PredicateFn, Rule, RuleFault};
