//! In-memory booking state and the context resolver that reads it.

use std::collections::BTreeMap;
use std::sync::Arc;

use async_trait::async_trait;
use chrono::NaiveDate;
use gate_policy::{Context, ContextResolver, ProposedAction};
use serde_json::Value;
use tokio::sync::RwLock;

pub const DATE_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone)]
pub struct Booking {
    pub hotel: String,
    pub check_in: NaiveDate,
    pub check_out: NaiveDate,
    pub guests: u64,
}

#[derive(Debug, Default)]
pub struct Ledger {
    pub bookings: BTreeMap<String, Booking>,
    pub payments: BTreeMap<String, f64>,
    next_id: u32,
}

impl Ledger {
    pub fn insert_booking(&mut self, booking: Booking) -> String {
        self.next_id += 1;
        let mut id = format!("BK{:03}", self.next_id);
        while self.bookings.contains_key(&id) {
            self.next_id += 1;
            id = format!("BK{:03}", self.next_id);
        }
        self.bookings.insert(id.clone(), booking);
        id
    }
}

/// Booking store shared by the resolver (read-only) and the desk (writes).
#[derive(Debug, Clone)]
pub struct BookingState {
    today: NaiveDate,
    ledger: Arc<RwLock<Ledger>>,
}

impl BookingState {
    pub fn new(today: NaiveDate) -> Self {
        Self {
            today,
            ledger: Arc::new(RwLock::new(Ledger::default())),
        }
    }

    pub fn today(&self) -> NaiveDate {
        self.today
    }

    pub fn ledger(&self) -> &Arc<RwLock<Ledger>> {
        &self.ledger
    }

    fn days_until(&self, date: NaiveDate) -> i64 {
        (date - self.today).num_days()
    }
}

pub fn parse_date(value: Option<&str>) -> Option<NaiveDate> {
    NaiveDate::parse_from_str(value?, DATE_FORMAT).ok()
}

/// Builds per-action contexts from parameters plus the booking ledger.
///
/// Malformed input yields an empty context, so the action's rules fail closed
/// as missing context.
#[derive(Debug, Clone)]
pub struct BookingResolver {
    state: BookingState,
}

impl BookingResolver {
    pub fn new(state: BookingState) -> Self {
        Self { state }
    }

    fn booking_context(&self, action: &ProposedAction) -> Context {
        let (Some(check_in), Some(check_out)) = (
            parse_date(action.param_str("check_in")),
            parse_date(action.param_str("check_out")),
        ) else {
            return Context::new();
        };

        Context::new()
            .with("check_in", check_in.format(DATE_FORMAT).to_string())
            .with("check_out", check_out.format(DATE_FORMAT).to_string())
            .with(
                "guests",
                action.param("guests").cloned().unwrap_or(Value::from(1)),
            )
            .with("days_until_checkin", self.state.days_until(check_in))
    }

    async fn confirmation_context(&self, action: &ProposedAction) -> Context {
        let Some(booking_id) = action.param_str("booking_id") else {
            return Context::new();
        };
        let ledger = self.state.ledger.read().await;
        Context::new().with("payment_verified", ledger.payments.contains_key(booking_id))
    }

    async fn cancellation_context(&self, action: &ProposedAction) -> Context {
        let Some(booking_id) = action.param_str("booking_id") else {
            return Context::new();
        };
        let ledger = self.state.ledger.read().await;
        match ledger.bookings.get(booking_id) {
            Some(booking) => Context::new()
                .with("booking_id", booking_id)
                .with("days_until_checkin", self.state.days_until(booking.check_in)),
            None => Context::new().with("booking_id", Value::Null),
        }
    }
}

#[async_trait]
impl ContextResolver for BookingResolver {
    async fn resolve(&self, action: &ProposedAction) -> Context {
        match action.name() {
            "book_hotel" => self.booking_context(action),
            "confirm_booking" => self.confirmation_context(action).await,
            "cancel_booking" => self.cancellation_context(action).await,
            _ => Context::from_map(action.params().clone()),
        }
    }
}
