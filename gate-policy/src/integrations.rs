//! Caller-side wiring between action proposers, the gate, and executors.
//!
//! The gate never intercepts anything on its own. A proposer either calls
//! [`RuleGate::validate`] itself or dispatches through a [`GuardedExecutor`],
//! which resolves the context, validates, reports the decision, and only then
//! runs the side effect.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};
use thiserror::Error;
use tracing::debug;

use crate::context::Context;
use crate::decision::Decision;
use crate::gate::RuleGate;

/// Candidate action produced by an agent.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProposedAction {
    name: String,
    #[serde(default)]
    params: Map<String, Value>,
}

impl ProposedAction {
    /// Creates an action with no parameters.
    #[must_use]
    pub fn new(name: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            params: Map::new(),
        }
    }

    /// Adds a parameter and returns the updated action.
    #[must_use]
    pub fn with_param(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.params.insert(key.into(), value.into());
        self
    }

    /// Action name as proposed.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// All parameters.
    #[must_use]
    pub fn params(&self) -> &Map<String, Value> {
        &self.params
    }

    /// Single parameter by name.
    #[must_use]
    pub fn param(&self, key: &str) -> Option<&Value> {
        self.params.get(key)
    }

    /// Parameter as a string slice, if present and a string.
    #[must_use]
    pub fn param_str(&self, key: &str) -> Option<&str> {
        self.params.get(key).and_then(Value::as_str)
    }
}

/// Builds the validation context for a proposed action.
///
/// Lookups against external state happen here, before validation starts.
#[async_trait]
pub trait ContextResolver: Send + Sync {
    /// Returns the context the action's rules are evaluated against.
    async fn resolve(&self, action: &ProposedAction) -> Context;
}

/// Resolver that uses the action parameters unchanged.
#[derive(Debug, Default, Clone, Copy)]
pub struct ParamsResolver;

#[async_trait]
impl ContextResolver for ParamsResolver {
    async fn resolve(&self, action: &ProposedAction) -> Context {
        Context::from_map(action.params().clone())
    }
}

/// Errors returned by action executors.
#[derive(Debug, Error)]
pub enum ExecutionError {
    /// The executor does not implement the action.
    #[error("action `{action}` is not supported")]
    Unsupported {
        /// Name of the unsupported action.
        action: String,
    },
    /// The side effect failed.
    #[error("action `{action}` failed: {reason}")]
    Failed {
        /// Name of the failing action.
        action: String,
        /// Human-readable error returned by the executor.
        reason: String,
    },
}

impl ExecutionError {
    /// Creates a failure for `action` with the supplied reason.
    #[must_use]
    pub fn failed(action: impl Into<String>, reason: impl Into<String>) -> Self {
        Self::Failed {
            action: action.into(),
            reason: reason.into(),
        }
    }
}

/// Runs the real side effect of an authorized action.
#[async_trait]
pub trait ActionExecutor: Send + Sync {
    /// Executes the action and returns its JSON output.
    async fn execute(&self, action: &ProposedAction) -> Result<Value, ExecutionError>;
}

/// Observer invoked for every decision produced by a [`GuardedExecutor`].
pub trait DecisionObserver: Send + Sync {
    /// Records the decision for the proposed action.
    fn on_decision(&self, action: &ProposedAction, decision: &Decision);
}

/// Forwards decisions to a collection of observers.
#[derive(Default)]
pub struct CompositeObserver {
    observers: Vec<Arc<dyn DecisionObserver>>,
}

impl CompositeObserver {
    /// Creates a composite observer from the supplied list.
    #[must_use]
    pub fn new<I>(observers: I) -> Self
    where
        I: IntoIterator<Item = Arc<dyn DecisionObserver>>,
    {
        Self {
            observers: observers.into_iter().collect(),
        }
    }

    /// Adds an observer to the set.
    pub fn push(&mut self, observer: Arc<dyn DecisionObserver>) {
        self.observers.push(observer);
    }
}

impl DecisionObserver for CompositeObserver {
    fn on_decision(&self, action: &ProposedAction, decision: &Decision) {
        for observer in &self.observers {
            observer.on_decision(action, decision);
        }
    }
}

/// Errors surfaced by [`GuardedExecutor::dispatch`].
#[derive(Debug, Error)]
pub enum GuardError {
    /// The gate denied the action; the side effect did not run.
    #[error("{}", .0.summary())]
    Blocked(Decision),
    /// The action was authorized but its execution failed.
    #[error(transparent)]
    Execution(#[from] ExecutionError),
}

impl GuardError {
    /// Returns the denial decision, if the action was blocked.
    #[must_use]
    pub fn decision(&self) -> Option<&Decision> {
        match self {
            Self::Blocked(decision) => Some(decision),
            Self::Execution(_) => None,
        }
    }
}

/// Result alias for guarded dispatch.
pub type GuardResult<T> = Result<T, GuardError>;

/// Executor wrapper that validates every action before running it.
#[derive(Clone)]
pub struct GuardedExecutor {
    gate: Arc<RuleGate>,
    resolver: Arc<dyn ContextResolver>,
    executor: Arc<dyn ActionExecutor>,
    observer: Option<Arc<dyn DecisionObserver>>,
}

impl fmt::Debug for GuardedExecutor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GuardedExecutor")
            .field("gated_actions", &self.gate.snapshot().len())
            .field("observer_configured", &self.observer.is_some())
            .finish_non_exhaustive()
    }
}

impl GuardedExecutor {
    /// Creates a guarded executor that validates against the raw parameters.
    #[must_use]
    pub fn new(gate: Arc<RuleGate>, executor: Arc<dyn ActionExecutor>) -> Self {
        Self {
            gate,
            resolver: Arc::new(ParamsResolver),
            executor,
            observer: None,
        }
    }

    /// Replaces the context resolver.
    #[must_use]
    pub fn with_resolver(mut self, resolver: Arc<dyn ContextResolver>) -> Self {
        self.resolver = resolver;
        self
    }

    /// Installs a decision observer.
    pub fn set_observer(&mut self, observer: Arc<dyn DecisionObserver>) {
        self.observer = Some(observer);
    }

    /// Installs a decision observer, returning the updated executor for chaining.
    #[must_use]
    pub fn with_observer(mut self, observer: Arc<dyn DecisionObserver>) -> Self {
        self.set_observer(observer);
        self
    }

    /// Returns the gate used for validation.
    #[must_use]
    pub fn gate(&self) -> &Arc<RuleGate> {
        &self.gate
    }

    /// Resolves the context and validates the action without executing it.
    pub async fn authorize(&self, action: &ProposedAction) -> Decision {
        let ctx = self.resolver.resolve(action).await;
        let decision = self.gate.validate(action.name(), &ctx);
        if let Some(observer) = &self.observer {
            observer.on_decision(action, &decision);
        }
        decision
    }

    /// Validates the action and executes it when every rule holds.
    ///
    /// # Errors
    ///
    /// Returns [`GuardError::Blocked`] with the decision when the gate denies
    /// the action, or [`GuardError::Execution`] when the executor fails.
    pub async fn dispatch(&self, action: &ProposedAction) -> GuardResult<Value> {
        let decision = self.authorize(action).await;
        if decision.is_denied() {
            debug!(
                action = action.name(),
                violations = decision.violations().len(),
                "action blocked before execution"
            );
            return Err(GuardError::Blocked(decision));
        }

        debug!(action = action.name(), "action authorized");
        Ok(self.executor.execute(action).await?)
    }
}
