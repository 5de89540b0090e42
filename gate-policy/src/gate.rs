//! Shared gate with atomically replaceable rule sets.

use std::sync::{Arc, PoisonError, RwLock};

use crate::context::Context;
use crate::decision::Decision;
use crate::registry::RuleRegistry;

/// Validation gate shared between concurrent callers.
///
/// Each [`validate`](Self::validate) call runs against one immutable registry
/// snapshot. [`publish`](Self::publish) swaps in a complete new registry, so a
/// caller never observes a partially updated rule set.
#[derive(Debug, Default)]
pub struct RuleGate {
    registry: RwLock<Arc<RuleRegistry>>,
}

impl RuleGate {
    /// Creates a gate over the supplied registry.
    #[must_use]
    pub fn new(registry: RuleRegistry) -> Self {
        Self::from_shared(Arc::new(registry))
    }

    /// Creates a gate over an already shared registry.
    #[must_use]
    pub fn from_shared(registry: Arc<RuleRegistry>) -> Self {
        Self {
            registry: RwLock::new(registry),
        }
    }

    /// Returns the registry snapshot currently in effect.
    #[must_use]
    pub fn snapshot(&self) -> Arc<RuleRegistry> {
        // The slot always holds a complete `Arc`, so a poisoned lock is still usable.
        let guard = self.registry.read().unwrap_or_else(PoisonError::into_inner);
        Arc::clone(&*guard)
    }

    /// Replaces the registry wholesale and returns the previous snapshot.
    pub fn publish(&self, registry: impl Into<Arc<RuleRegistry>>) -> Arc<RuleRegistry> {
        let mut guard = self
            .registry
            .write()
            .unwrap_or_else(PoisonError::into_inner);
        std::mem::replace(&mut *guard, registry.into())
    }

    /// Validates `action` against the current snapshot.
    #[must_use]
    pub fn validate(&self, action: &str, ctx: &Context) -> Decision {
        self.snapshot().validate(action, ctx)
    }
}

impl From<RuleRegistry> for RuleGate {
    fn from(registry: RuleRegistry) -> Self {
        Self::new(registry)
    }
}
