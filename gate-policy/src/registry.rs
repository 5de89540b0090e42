//! Rule registry and the validation procedure.

use std::collections::BTreeMap;

use gate_primitives::{ActionName, RuleName};
use thiserror::Error;

use crate::context::Context;
use crate::decision::{Decision, Violation};
use crate::rule::Rule;

/// Errors surfaced while building a registry.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RegistryError {
    /// A rule with the same name is already registered for the action.
    #[error("rule `{rule}` is already registered for action `{action}`")]
    DuplicateRule {
        /// Action the rule was registered against.
        action: ActionName,
        /// Name of the rejected rule.
        rule: RuleName,
    },
    /// The action name failed validation.
    #[error(transparent)]
    InvalidName(#[from] gate_primitives::Error),
}

/// Result alias for registry operations.
pub type RegistryResult<T> = Result<T, RegistryError>;

/// Ordered rules per action name.
///
/// Built up front and then only read. To change rules at runtime, build a new
/// registry and publish it through [`RuleGate::publish`](crate::RuleGate::publish).
#[derive(Debug, Clone, Default)]
pub struct RuleRegistry {
    actions: BTreeMap<ActionName, Vec<Rule>>,
}

impl RuleRegistry {
    /// Creates an empty registry.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Appends `rule` to the rule list of `action`.
    ///
    /// # Errors
    ///
    /// Returns [`RegistryError::DuplicateRule`] when the action already has a
    /// rule with the same name, or [`RegistryError::InvalidName`] when the
    /// action name fails validation. The registry is left unchanged.
    pub fn register(&mut self, action: impl Into<String>, rule: Rule) -> RegistryResult<()> {
        let action = ActionName::new(action)?;
        if self
            .rules_for(action.as_str())
            .iter()
            .any(|existing| existing.name() == rule.name())
        {
            return Err(RegistryError::DuplicateRule {
                action,
                rule: rule.name().clone(),
            });
        }
        self.actions.entry(action).or_default().push(rule);
        Ok(())
    }

    /// Registers a rule and returns the registry for chaining.
    ///
    /// # Errors
    ///
    /// See [`RuleRegistry::register`].
    pub fn with_rule(mut self, action: impl Into<String>, rule: Rule) -> RegistryResult<Self> {
        self.register(action, rule)?;
        Ok(self)
    }

    /// Rules registered for `action`, in registration order.
    #[must_use]
    pub fn rules_for(&self, action: &str) -> &[Rule] {
        self.actions.get(action).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Action names that have rules.
    pub fn actions(&self) -> impl Iterator<Item = &ActionName> {
        self.actions.keys()
    }

    /// Number of gated actions.
    #[must_use]
    pub fn len(&self) -> usize {
        self.actions.len()
    }

    /// Returns true when no action is gated.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.actions.is_empty()
    }

    /// Total number of rules across all actions.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }

    /// Evaluates every rule registered for `action` against `ctx`.
    ///
    /// Actions without rules are allowed. Every rule runs even after an
    /// earlier one failed or faulted, and each failure contributes one
    /// violation in registration order. An invalid action name yields a single
    /// [`ViolationKind::InvalidAction`](crate::ViolationKind::InvalidAction)
    /// violation.
    #[must_use]
    pub fn validate(&self, action: &str, ctx: &Context) -> Decision {
        if let Err(err) = ActionName::new(action) {
            return Decision::from_violations(vec![Violation::invalid_action(&err)]);
        }

        let violations = self
            .rules_for(action)
            .iter()
            .filter_map(|rule| match rule.check(ctx) {
                Ok(true) => None,
                Ok(false) => Some(Violation::broken(rule)),
                Err(fault) => Some(Violation::from_fault(rule.name(), &fault)),
            })
            .collect();

        Decision::from_violations(violations)
    }
}
