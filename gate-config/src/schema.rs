//! Strongly typed rule-set schema.

use std::collections::BTreeMap;

use gate_policy::{Condition, RegistryResult, Rule, RuleRegistry};
use serde::{Deserialize, Serialize};

/// A complete rule set: action name to ordered rules.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleSetConfig {
    /// Rules per action, evaluated in list order.
    #[serde(default)]
    pub actions: BTreeMap<String, Vec<RuleConfig>>,
}

/// One declarative rule.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RuleConfig {
    /// Rule name, unique within its action.
    pub name: String,
    /// Message reported when the condition does not hold.
    pub message: String,
    /// Condition that must hold for the action to proceed.
    pub condition: Condition,
}

impl RuleConfig {
    /// Converts the entry into a [`Rule`].
    ///
    /// # Errors
    ///
    /// Returns [`gate_primitives::Error::InvalidRuleName`] when the name fails
    /// validation.
    pub fn into_rule(self) -> gate_primitives::Result<Rule> {
        Rule::when(self.name, self.condition, self.message)
    }
}

impl RuleSetConfig {
    /// Builds a registry from the rule set.
    ///
    /// # Errors
    ///
    /// Returns a [`RegistryError`](gate_policy::RegistryError) for invalid
    /// names or duplicate rule names within one action.
    pub fn into_registry(self) -> RegistryResult<RuleRegistry> {
        let mut registry = RuleRegistry::new();
        for (action, rules) in self.actions {
            for rule in rules {
                registry.register(action.as_str(), rule.into_rule()?)?;
            }
        }
        Ok(registry)
    }

    /// Number of rules across all actions.
    #[must_use]
    pub fn rule_count(&self) -> usize {
        self.actions.values().map(Vec::len).sum()
    }
}
