//! Named rules and their predicates.

use std::any::Any;
use std::fmt;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;

use gate_primitives::RuleName;
use thiserror::Error;

use crate::condition::{Comparison, Condition};
use crate::context::Context;

/// Signature of an opaque rule predicate.
pub type PredicateFn = dyn Fn(&Context) -> Result<bool, RuleFault> + Send + Sync;

/// Faults raised while evaluating a rule, as opposed to the rule not holding.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RuleFault {
    /// A context key the rule depends on is absent.
    #[error("missing required context `{key}`")]
    MissingContext {
        /// The absent key.
        key: String,
    },
    /// Two values could not be compared with the requested operator.
    #[error("cannot compare {left} {op} {right}")]
    Incomparable {
        /// Operator that was applied.
        op: Comparison,
        /// JSON type of the left operand.
        left: &'static str,
        /// JSON type of the right operand.
        right: &'static str,
    },
    /// A context value had an unexpected JSON type.
    #[error("context value `{key}` must be a {expected}, found {found}")]
    TypeMismatch {
        /// Key of the offending value.
        key: String,
        /// Expected JSON type.
        expected: &'static str,
        /// Actual JSON type.
        found: &'static str,
    },
    /// The predicate failed for any other reason.
    #[error("{reason}")]
    Evaluation {
        /// Human-readable explanation.
        reason: String,
    },
}

impl RuleFault {
    /// Creates an evaluation fault from the supplied reason.
    #[must_use]
    pub fn evaluation(reason: impl Into<String>) -> Self {
        Self::Evaluation {
            reason: reason.into(),
        }
    }
}

/// How a rule decides whether it holds.
#[derive(Clone)]
pub enum Predicate {
    /// Inspectable declarative condition.
    Condition(Condition),
    /// Opaque callable for checks a [`Condition`] cannot express.
    Custom {
        /// Context keys the callable reads; absent keys fail closed before it runs.
        requires: Vec<String>,
        /// The predicate itself. Must be pure and deterministic.
        func: Arc<PredicateFn>,
    },
}

impl fmt::Debug for Predicate {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Condition(condition) => f.debug_tuple("Condition").field(condition).finish(),
            Self::Custom { requires, .. } => f
                .debug_struct("Custom")
                .field("requires", requires)
                .finish_non_exhaustive(),
        }
    }
}

/// A named, deterministic predicate paired with a violation message.
#[derive(Debug, Clone)]
pub struct Rule {
    name: RuleName,
    message: String,
    predicate: Predicate,
}

impl Rule {
    /// Creates a rule backed by a declarative condition.
    ///
    /// # Errors
    ///
    /// Returns [`gate_primitives::Error::InvalidRuleName`] when the name fails
    /// validation.
    pub fn when(
        name: impl Into<String>,
        condition: Condition,
        message: impl Into<String>,
    ) -> gate_primitives::Result<Self> {
        Ok(Self {
            name: RuleName::new(name)?,
            message: message.into(),
            predicate: Predicate::Condition(condition),
        })
    }

    /// Creates a rule backed by an opaque callable.
    ///
    /// `requires` lists the context keys the callable reads. The callable may
    /// also use [`Context::require`] for keys it only reads conditionally.
    ///
    /// # Errors
    ///
    /// Returns [`gate_primitives::Error::InvalidRuleName`] when the name fails
    /// validation.
    pub fn custom<I, S, F>(
        name: impl Into<String>,
        requires: I,
        message: impl Into<String>,
        func: F,
    ) -> gate_primitives::Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
        F: Fn(&Context) -> Result<bool, RuleFault> + Send + Sync + 'static,
    {
        Ok(Self {
            name: RuleName::new(name)?,
            message: message.into(),
            predicate: Predicate::Custom {
                requires: requires.into_iter().map(Into::into).collect(),
                func: Arc::new(func),
            },
        })
    }

    /// Returns the rule name.
    #[must_use]
    pub fn name(&self) -> &RuleName {
        &self.name
    }

    /// Returns the message reported when the rule does not hold.
    #[must_use]
    pub fn message(&self) -> &str {
        &self.message
    }

    /// Returns the rule predicate.
    #[must_use]
    pub fn predicate(&self) -> &Predicate {
        &self.predicate
    }

    /// Returns the declarative condition, if the rule has one.
    #[must_use]
    pub fn condition(&self) -> Option<&Condition> {
        match &self.predicate {
            Predicate::Condition(condition) => Some(condition),
            Predicate::Custom { .. } => None,
        }
    }

    /// Context keys the rule depends on.
    #[must_use]
    pub fn required_fields(&self) -> Vec<&str> {
        match &self.predicate {
            Predicate::Condition(condition) => condition.fields(),
            Predicate::Custom { requires, .. } => requires.iter().map(String::as_str).collect(),
        }
    }

    /// Evaluates the rule against `ctx`.
    ///
    /// Required keys are checked first. A panicking predicate is caught and
    /// reported as [`RuleFault::Evaluation`].
    ///
    /// # Errors
    ///
    /// Returns the [`RuleFault`] that prevented evaluation.
    pub fn check(&self, ctx: &Context) -> Result<bool, RuleFault> {
        if let Some(key) = self
            .required_fields()
            .into_iter()
            .find(|key| !ctx.contains(key))
        {
            return Err(RuleFault::MissingContext {
                key: key.to_owned(),
            });
        }

        let outcome = panic::catch_unwind(AssertUnwindSafe(|| match &self.predicate {
            Predicate::Condition(condition) => condition.evaluate(ctx),
            Predicate::Custom { func, .. } => func(ctx),
        }));

        outcome.unwrap_or_else(|payload| {
            Err(RuleFault::evaluation(format!(
                "predicate panicked: {}",
                panic_message(payload.as_ref())
            )))
        })
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> &str {
    if let Some(message) = payload.downcast_ref::<&str>() {
        *message
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.as_str()
    } else {
        "unknown panic payload"
    }
}

#[cfg(test)]
mod tests {
    use serde_json::Value;

    use super::*;

    #[test]
    fn declarative_rule_lists_fields() {
        let rule = Rule::when(
            "valid_dates",
            Condition::compare_fields("check_in", Comparison::Lt, "check_out"),
            "Check-in must be before check-out",
        )
        .unwrap();

        assert_eq!(rule.name().as_str(), "valid_dates");
        assert_eq!(rule.required_fields(), vec!["check_in", "check_out"]);
        assert!(rule.condition().is_some());
    }

    #[test]
    fn invalid_rule_name_is_rejected() {
        let err = Rule::when("", Condition::present("x"), "msg").unwrap_err();
        assert!(matches!(err, gate_primitives::Error::InvalidRuleName { .. }));
    }

    #[test]
    fn custom_rule_checks_required_fields_before_running() {
        let rule = Rule::custom("even_guests", ["guests"], "Guests must be even", |ctx| {
            let guests = ctx
                .require("guests")?
                .as_u64()
                .ok_or_else(|| RuleFault::evaluation("guests must be an unsigned integer"))?;
            Ok(guests % 2 == 0)
        })
        .unwrap();

        assert!(rule.check(&Context::new().with("guests", 4)).unwrap());
        assert!(!rule.check(&Context::new().with("guests", 3)).unwrap());
        assert_eq!(
            rule.check(&Context::new()).unwrap_err(),
            RuleFault::MissingContext {
                key: "guests".into()
            }
        );
        assert!(matches!(
            rule.check(&Context::new().with("guests", Value::Null)),
            Err(RuleFault::Evaluation { .. })
        ));
    }

    #[test]
    fn panicking_predicate_becomes_fault() {
        let rule = Rule::custom("explodes", Vec::<String>::new(), "never shown", |_| {
            panic!("lookup table corrupted")
        })
        .unwrap();

        let err = rule.check(&Context::new()).unwrap_err();
        assert_eq!(
            err,
            RuleFault::evaluation("predicate panicked: lookup table corrupted")
        );
    }

    #[test]
    fn debug_hides_callable() {
        let rule = Rule::custom("opaque", ["a"], "msg", |_| Ok(true)).unwrap();
        let rendered = format!("{rule:?}");
        assert!(rendered.contains("Custom"));
        assert!(rendered.contains("\"a\""));
    }
}
