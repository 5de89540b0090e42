use std::sync::Arc;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use neurosym_gate::config::from_json_str;
use neurosym_gate::policy::{
    ActionExecutor, Context, Decision, ExecutionError, GuardError, GuardedExecutor,
    ProposedAction, RegistryError, Rule, RuleFault, RuleGate, RuleRegistry, ViolationKind,
};
use neurosym_gate::telemetry::TracingObserver;
use serde_json::{Value, json};

const RULES: &str = r#"{
    "actions": {
        "book_hotel": [
            {
                "name": "valid_dates",
                "message": "Check-in must be before check-out",
                "condition": { "kind": "compare_fields", "left": "check_in", "op": "lt", "right": "check_out" }
            },
            {
                "name": "max_guests",
                "message": "Maximum 10 guests per booking",
                "condition": { "kind": "compare", "field": "guests", "op": "le", "value": 10 }
            },
            {
                "name": "advance_booking",
                "message": "Must book at least 1 day in advance",
                "condition": { "kind": "compare", "field": "days_until_checkin", "op": "ge", "value": 1 }
            }
        ],
        "confirm_booking": [
            {
                "name": "payment_before_confirm",
                "message": "Payment must be verified before confirmation",
                "condition": { "kind": "is_true", "field": "payment_verified" }
            }
        ]
    }
}"#;

fn registry() -> RuleRegistry {
    from_json_str(RULES).expect("rule set parses")
}

fn booking(guests: u64) -> Context {
    Context::new()
        .with("check_in", "2026-03-20")
        .with("check_out", "2026-03-25")
        .with("guests", guests)
        .with("days_until_checkin", 30)
}

#[test]
fn unconstrained_actions_are_allowed() {
    let registry = registry();
    for action in ["process_payment", "search_hotels", "cancel_booking"] {
        let decision = registry.validate(action, &Context::new());
        assert!(decision.passed(), "{action} should be ungated");
        assert!(decision.violations().is_empty());
    }
}

#[test]
fn too_many_guests_is_blocked() {
    let decision = registry().validate("book_hotel", &booking(15));

    assert!(!decision.passed());
    assert_eq!(decision.violations().len(), 1);
    assert!(decision.messages()[0].contains("Maximum 10 guests"));
}

#[test]
fn missing_payment_state_fails_closed() {
    let decision = registry().validate("confirm_booking", &Context::new().with("booking_id", "BK001"));

    assert!(!decision.passed());
    let violation = &decision.violations()[0];
    assert_eq!(violation.kind(), ViolationKind::MissingContext);
    assert!(violation.message().contains("missing required context"));
    assert!(!violation.message().contains("Payment must be verified"));
}

#[test]
fn duplicate_registration_keeps_first_rule() {
    let mut registry = registry();
    let duplicate = Rule::custom("max_guests", ["guests"], "Maximum 50 guests", |ctx| {
        Ok(ctx.require("guests")?.as_u64().unwrap_or(u64::MAX) <= 50)
    })
    .unwrap();

    let err = registry.register("book_hotel", duplicate).unwrap_err();
    assert!(matches!(err, RegistryError::DuplicateRule { .. }));

    let max_guests_rules = registry
        .rules_for("book_hotel")
        .iter()
        .filter(|rule| rule.name().as_str() == "max_guests")
        .count();
    assert_eq!(max_guests_rules, 1);

    let decision = registry.validate("book_hotel", &booking(15));
    assert_eq!(decision.messages(), vec!["Maximum 10 guests per booking"]);
}

#[test]
fn faulting_rule_is_isolated_from_siblings() {
    let mut registry = registry();
    registry
        .register(
            "book_hotel",
            Rule::custom("room_inventory", ["hotel"], "No rooms left", |ctx| {
                match ctx.require("hotel")? {
                    Value::String(name) if name == "Grand Hotel" => {
                        panic!("inventory shard offline")
                    }
                    Value::String(_) => Ok(true),
                    _ => Err(RuleFault::evaluation("hotel must be a string")),
                }
            })
            .unwrap(),
        )
        .unwrap();

    let ctx = booking(15)
        .with("hotel", "Grand Hotel")
        .with("days_until_checkin", 0);
    let decision = registry.validate("book_hotel", &ctx);

    let kinds: Vec<_> = decision.violations().iter().map(|v| v.kind()).collect();
    assert_eq!(
        kinds,
        vec![ViolationKind::Rule, ViolationKind::Rule, ViolationKind::Fault]
    );
    let fault = &decision.violations()[2];
    assert_eq!(fault.rule().map(|name| name.as_str()), Some("room_inventory"));
    assert!(fault.message().contains("inventory shard offline"));
}

#[test]
fn pass_result_is_independent_of_rule_order() {
    let forward = registry();
    let mut reverse = RuleRegistry::new();
    for action in ["book_hotel", "confirm_booking"] {
        for rule in forward.rules_for(action).iter().rev() {
            reverse.register(action, rule.clone()).unwrap();
        }
    }

    let contexts = [
        booking(2),
        booking(15),
        booking(15).with("days_until_checkin", 0),
        booking(2).with("check_out", "2026-03-01"),
        Context::new(),
    ];
    for ctx in &contexts {
        let a = forward.validate("book_hotel", ctx);
        let b = reverse.validate("book_hotel", ctx);
        assert_eq!(a.passed(), b.passed());

        let mut reversed = b.messages();
        reversed.reverse();
        assert_eq!(a.messages(), reversed);
    }
}

#[test]
fn repeated_validation_is_identical() {
    let registry = registry();
    let ctx = booking(12).with("days_until_checkin", 0);

    let first = registry.validate("book_hotel", &ctx);
    let second = registry.validate("book_hotel", &ctx);
    assert_eq!(first, second);
    assert_eq!(
        serde_json::to_string(&first).unwrap(),
        serde_json::to_string(&second).unwrap()
    );
}

#[test]
fn independent_registries_do_not_share_rules() {
    let tenant_a = registry();
    let tenant_b = RuleRegistry::new();

    assert!(tenant_a.validate("book_hotel", &booking(15)).is_denied());
    assert!(tenant_b.validate("book_hotel", &booking(15)).passed());
}

struct BookingDesk {
    executed: AtomicUsize,
}

#[async_trait]
impl ActionExecutor for BookingDesk {
    async fn execute(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        self.executed.fetch_add(1, Ordering::SeqCst);
        Ok(json!({ "result": format!("SUCCESS: {}", action.name()) }))
    }
}

#[tokio::test]
async fn guarded_dispatch_runs_only_authorized_actions() {
    let desk = Arc::new(BookingDesk {
        executed: AtomicUsize::new(0),
    });
    let guarded = GuardedExecutor::new(Arc::new(RuleGate::new(registry())), desk.clone())
        .with_observer(Arc::new(TracingObserver));

    let blocked = ProposedAction::new("book_hotel")
        .with_param("check_in", "2026-03-20")
        .with_param("check_out", "2026-03-25")
        .with_param("guests", 15)
        .with_param("days_until_checkin", 30);
    let err = guarded.dispatch(&blocked).await.unwrap_err();
    match err {
        GuardError::Blocked(decision) => {
            assert_eq!(decision.summary(), "BLOCKED: Maximum 10 guests per booking");
        }
        other => panic!("unexpected error: {other}"),
    }
    assert_eq!(desk.executed.load(Ordering::SeqCst), 0);

    let allowed = blocked.clone().with_param("guests", 2);
    let output = guarded.dispatch(&allowed).await.unwrap();
    assert_eq!(output, json!({ "result": "SUCCESS: book_hotel" }));
    assert_eq!(desk.executed.load(Ordering::SeqCst), 1);
}

#[tokio::test]
async fn publishing_a_new_rule_set_takes_effect_for_later_calls() {
    let gate = Arc::new(RuleGate::new(registry()));
    let desk = Arc::new(BookingDesk {
        executed: AtomicUsize::new(0),
    });
    let guarded = GuardedExecutor::new(Arc::clone(&gate), desk);

    let action = ProposedAction::new("book_hotel");
    assert!(guarded.authorize(&action).await.is_denied());

    gate.publish(RuleRegistry::new());
    assert_eq!(guarded.authorize(&action).await, Decision::allow());
}
