//! Decisions returned by the gate.

use std::fmt::{self, Display, Formatter};

use gate_primitives::RuleName;
use serde::{Deserialize, Serialize};

use crate::rule::{Rule, RuleFault};

/// Why a violation was recorded.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ViolationKind {
    /// The rule evaluated to false.
    Rule,
    /// The context lacked a key the rule depends on.
    MissingContext,
    /// The rule could not be evaluated.
    Fault,
    /// The action name itself was rejected.
    InvalidAction,
}

/// A single reason an action was blocked.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Violation {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    rule: Option<RuleName>,
    kind: ViolationKind,
    message: String,
}

impl Violation {
    /// Violation carrying the rule's own message.
    #[must_use]
    pub fn broken(rule: &Rule) -> Self {
        Self {
            rule: Some(rule.name().clone()),
            kind: ViolationKind::Rule,
            message: rule.message().to_owned(),
        }
    }

    /// Violation for a rule that could not be evaluated.
    ///
    /// Missing context keys are reported as [`ViolationKind::MissingContext`]
    /// so configuration gaps stay distinguishable from business-rule failures.
    #[must_use]
    pub fn from_fault(rule: &RuleName, fault: &RuleFault) -> Self {
        match fault {
            RuleFault::MissingContext { key } => Self {
                rule: Some(rule.clone()),
                kind: ViolationKind::MissingContext,
                message: format!("missing required context `{key}` for rule `{rule}`"),
            },
            other => Self {
                rule: Some(rule.clone()),
                kind: ViolationKind::Fault,
                message: format!("rule `{rule}` failed to evaluate: {other}"),
            },
        }
    }

    /// Violation for an action name that failed validation.
    #[must_use]
    pub fn invalid_action(error: &gate_primitives::Error) -> Self {
        Self {
            rule: None,
            kind: ViolationKind::InvalidAction,
            message: format!("invalid action name: {}", error.reason()),
        }
    }

    /// Name of the rule that produced the violation, if any.
    #[must_use]
    pub fn rule(&self) -> Option<&RuleName> {
        self.rule.as_ref()
    }

    /// Kind of violation.
    #[must_use]
    pub fn kind(&self) -> ViolationKind {
        self.kind
    }

    /// Human-readable message.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }
}

/// Outcome of validating one proposed action.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Decision {
    passed: bool,
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    violations: Vec<Violation>,
}

impl Decision {
    /// Decision that lets the action proceed.
    #[must_use]
    pub fn allow() -> Self {
        Self {
            passed: true,
            violations: Vec::new(),
        }
    }

    /// Builds a decision from the collected violations, in rule order.
    #[must_use]
    pub fn from_violations(violations: Vec<Violation>) -> Self {
        Self {
            passed: violations.is_empty(),
            violations,
        }
    }

    /// True when every rule held.
    #[must_use]
    pub fn passed(&self) -> bool {
        self.passed
    }

    /// True when at least one violation was recorded.
    #[must_use]
    pub fn is_denied(&self) -> bool {
        !self.passed
    }

    /// Violations in registry rule order.
    #[must_use]
    pub fn violations(&self) -> &[Violation] {
        &self.violations
    }

    /// Violation messages in registry rule order.
    #[must_use]
    pub fn messages(&self) -> Vec<String> {
        self.violations
            .iter()
            .map(|violation| violation.message.clone())
            .collect()
    }

    /// One-line summary suitable for returning to the proposer.
    #[must_use]
    pub fn summary(&self) -> String {
        if self.passed {
            return "ALLOWED".to_owned();
        }
        let reasons: Vec<&str> = self.violations.iter().map(Violation::message).collect();
        format!("BLOCKED: {}", reasons.join(", "))
    }
}

impl Default for Decision {
    fn default() -> Self {
        Self::allow()
    }
}

impl Display for Decision {
    fn fmt(&self, f: &mut Formatter<'_>) -> fmt::Result {
        f.write_str(&self.summary())
    }
}
