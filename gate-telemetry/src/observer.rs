//! Decision observer backed by `tracing`.

use gate_policy::{Decision, DecisionObserver, ProposedAction};
use tracing::{debug, warn};

/// Logs allow decisions at `debug` and denials at `warn`.
#[derive(Debug, Default, Clone, Copy)]
pub struct TracingObserver;

impl DecisionObserver for TracingObserver {
    fn on_decision(&self, action: &ProposedAction, decision: &Decision) {
        if decision.passed() {
            debug!(action = action.name(), "gate allow");
            return;
        }

        let messages = decision.messages();
        warn!(
            action = action.name(),
            violations = messages.len(),
            reasons = %messages.join("; "),
            "gate deny"
        );
    }
}

#[cfg(test)]
mod tests {
    use gate_policy::{Rule, RuleRegistry, Condition, Context};

    use super::*;

    #[test]
    fn observes_both_outcomes_without_panicking() {
        let registry = RuleRegistry::new()
            .with_rule(
                "confirm_booking",
                Rule::when(
                    "payment_before_confirm",
                    Condition::is_true("payment_verified"),
                    "Payment must be verified before confirmation",
                )
                .unwrap(),
            )
            .unwrap();
        let action = ProposedAction::new("confirm_booking");

        let denied = registry.validate(action.name(), &Context::new());
        TracingObserver.on_decision(&action, &denied);
        TracingObserver.on_decision(&action, &Decision::allow());
        assert!(denied.is_denied());
    }
}
