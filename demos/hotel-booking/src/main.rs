//! Hotel booking desk whose tool calls pass through the rule gate.
//!
//! A scripted proposer stands in for the agent. Each proposed action is
//! validated against the booking rules before the desk executes it.

mod desk;
mod state;

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{Context as _, Result};
use chrono::{Days, Local, NaiveDate};
use clap::Parser;
use gate_policy::{GuardError, GuardedExecutor, ProposedAction, RuleGate, RuleRegistry};
use gate_telemetry::TracingObserver;
use tracing::info;

use crate::desk::BookingDesk;
use crate::state::{Booking, BookingResolver, BookingState, DATE_FORMAT};

const DEFAULT_RULES: &str = include_str!("../rules/booking.json");

#[derive(Debug, Parser)]
#[command(about = "Validate hotel booking actions against symbolic rules")]
struct Args {
    /// JSON rule set to use instead of the built-in booking rules.
    #[arg(long, env = "GATE_RULES")]
    rules: Option<PathBuf>,

    /// Date treated as today, formatted YYYY-MM-DD.
    #[arg(long, value_parser = parse_today)]
    today: Option<NaiveDate>,

    /// Log filter used when RUST_LOG is unset.
    #[arg(long, default_value = "info")]
    log: String,
}

fn parse_today(value: &str) -> Result<NaiveDate, chrono::ParseError> {
    NaiveDate::parse_from_str(value, DATE_FORMAT)
}

struct Scenario {
    action: ProposedAction,
    expected: &'static str,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();
    gate_telemetry::init(&args.log);

    let registry = load_rules(args.rules.as_deref())?;
    let today = args.today.unwrap_or_else(|| Local::now().date_naive());
    info!(
        %today,
        actions = registry.len(),
        rules = registry.rule_count(),
        "=== Hotel booking desk with symbolic validation ==="
    );

    let state = BookingState::new(today);
    seed(&state).await?;

    let guarded = GuardedExecutor::new(
        Arc::new(RuleGate::new(registry)),
        Arc::new(BookingDesk::new(state.clone())),
    )
    .with_resolver(Arc::new(BookingResolver::new(state.clone())))
    .with_observer(Arc::new(TracingObserver));

    for scenario in scenarios(today)? {
        info!(
            action = scenario.action.name(),
            params = %serde_json::Value::Object(scenario.action.params().clone()),
            expected = scenario.expected,
            "proposed"
        );
        match guarded.dispatch(&scenario.action).await {
            Ok(output) => info!(%output, "executed"),
            Err(GuardError::Blocked(decision)) => info!(outcome = %decision, "blocked by rules"),
            Err(GuardError::Execution(err)) => info!(%err, "execution failed"),
        }
    }

    Ok(())
}

fn load_rules(path: Option<&std::path::Path>) -> Result<RuleRegistry> {
    match path {
        Some(path) => gate_config::load_file(path)
            .with_context(|| format!("loading rules from {}", path.display())),
        None => gate_config::from_json_str(DEFAULT_RULES).context("loading built-in rules"),
    }
}

fn offset(today: NaiveDate, days: u64) -> Result<NaiveDate> {
    today
        .checked_add_days(Days::new(days))
        .context("date out of range")
}

async fn seed(state: &BookingState) -> Result<()> {
    let today = state.today();
    state.ledger().write().await.insert_booking(Booking {
        hotel: "Grand Hotel".into(),
        check_in: offset(today, 30)?,
        check_out: offset(today, 33)?,
        guests: 2,
    });
    Ok(())
}

fn scenarios(today: NaiveDate) -> Result<Vec<Scenario>> {
    let check_in = offset(today, 45)?.format(DATE_FORMAT).to_string();
    let check_out = offset(today, 50)?.format(DATE_FORMAT).to_string();
    let booking = |guests: u64| {
        ProposedAction::new("book_hotel")
            .with_param("hotel", "Grand Hotel")
            .with_param("check_in", check_in.as_str())
            .with_param("check_out", check_out.as_str())
            .with_param("guests", guests)
    };

    Ok(vec![
        Scenario {
            action: ProposedAction::new("confirm_booking").with_param("booking_id", "BK001"),
            expected: "block: no payment",
        },
        Scenario {
            action: booking(15),
            expected: "block: max 10 guests",
        },
        Scenario {
            action: booking(2),
            expected: "succeed",
        },
        Scenario {
            action: booking(2).with_param("check_out", today.format(DATE_FORMAT).to_string()),
            expected: "block: dates reversed",
        },
        Scenario {
            action: ProposedAction::new("process_payment")
                .with_param("booking_id", "BK001")
                .with_param("amount", 450.0),
            expected: "succeed: payments are not gated",
        },
        Scenario {
            action: ProposedAction::new("confirm_booking").with_param("booking_id", "BK001"),
            expected: "succeed: payment verified",
        },
        Scenario {
            action: ProposedAction::new("cancel_booking").with_param("booking_id", "BK999"),
            expected: "block: no such booking",
        },
        Scenario {
            action: ProposedAction::new("cancel_booking").with_param("booking_id", "BK001"),
            expected: "succeed",
        },
    ])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn built_in_rules_load() {
        let registry = load_rules(None).unwrap();
        assert_eq!(registry.len(), 3);
        assert_eq!(registry.rule_count(), 6);
    }

    #[tokio::test]
    async fn scripted_run_matches_expectations() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let state = BookingState::new(today);
        seed(&state).await.unwrap();
        let guarded = GuardedExecutor::new(
            Arc::new(RuleGate::new(load_rules(None).unwrap())),
            Arc::new(BookingDesk::new(state.clone())),
        )
        .with_resolver(Arc::new(BookingResolver::new(state.clone())));

        let mut outcomes = Vec::new();
        for scenario in scenarios(today).unwrap() {
            let passed = guarded.dispatch(&scenario.action).await.is_ok();
            outcomes.push((scenario.expected.starts_with("succeed"), passed));
        }

        for (expected, actual) in outcomes {
            assert_eq!(expected, actual);
        }
    }
}
