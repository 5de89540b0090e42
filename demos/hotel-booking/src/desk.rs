//! Booking side effects, run only after the gate authorized them.

use async_trait::async_trait;
use gate_policy::{ActionExecutor, ExecutionError, ProposedAction};
use serde_json::{Value, json};

use crate::state::{Booking, BookingState, parse_date};

pub struct BookingDesk {
    state: BookingState,
}

impl BookingDesk {
    pub fn new(state: BookingState) -> Self {
        Self { state }
    }

    async fn book(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        let invalid = |field: &str| {
            ExecutionError::failed(action.name(), format!("missing or invalid `{field}`"))
        };
        let hotel = action.param_str("hotel").ok_or_else(|| invalid("hotel"))?;
        let check_in =
            parse_date(action.param_str("check_in")).ok_or_else(|| invalid("check_in"))?;
        let check_out =
            parse_date(action.param_str("check_out")).ok_or_else(|| invalid("check_out"))?;
        let guests = match action.param("guests") {
            None => 1,
            Some(value) => value.as_u64().ok_or_else(|| invalid("guests"))?,
        };

        let id = self.state.ledger().write().await.insert_booking(Booking {
            hotel: hotel.to_owned(),
            check_in,
            check_out,
            guests,
        });
        Ok(json!({
            "booking_id": id,
            "result": format!("SUCCESS: Booked {hotel} for {guests} guests, {check_in} to {check_out}"),
        }))
    }

    async fn confirm(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        let id = booking_id(action)?;
        let ledger = self.state.ledger().read().await;
        let booking = ledger
            .bookings
            .get(id)
            .ok_or_else(|| ExecutionError::failed(action.name(), "Booking not found"))?;
        Ok(json!({
            "result": format!("SUCCESS: Confirmed {id} at {} for {} guests", booking.hotel, booking.guests),
        }))
    }

    async fn cancel(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        let id = booking_id(action)?;
        let mut ledger = self.state.ledger().write().await;
        ledger
            .bookings
            .remove(id)
            .ok_or_else(|| ExecutionError::failed(action.name(), "Booking not found"))?;
        ledger.payments.remove(id);
        Ok(json!({ "result": format!("SUCCESS: Cancelled booking {id}") }))
    }

    async fn pay(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        let id = booking_id(action)?;
        let amount = action
            .param("amount")
            .and_then(Value::as_f64)
            .ok_or_else(|| ExecutionError::failed(action.name(), "missing or invalid `amount`"))?;

        let mut ledger = self.state.ledger().write().await;
        if !ledger.bookings.contains_key(id) {
            return Err(ExecutionError::failed(action.name(), "Booking not found"));
        }
        ledger.payments.insert(id.to_owned(), amount);
        Ok(json!({ "result": format!("SUCCESS: Processed ${amount:.2} for {id}") }))
    }
}

fn booking_id(action: &ProposedAction) -> Result<&str, ExecutionError> {
    action
        .param_str("booking_id")
        .ok_or_else(|| ExecutionError::failed(action.name(), "missing `booking_id`"))
}

#[async_trait]
impl ActionExecutor for BookingDesk {
    async fn execute(&self, action: &ProposedAction) -> Result<Value, ExecutionError> {
        match action.name() {
            "book_hotel" => self.book(action).await,
            "confirm_booking" => self.confirm(action).await,
            "cancel_booking" => self.cancel(action).await,
            "process_payment" => self.pay(action).await,
            other => Err(ExecutionError::Unsupported {
                action: other.to_owned(),
            }),
        }
    }
}

#[cfg(test)]
mod tests {
    use chrono::NaiveDate;

    use super::*;

    #[tokio::test]
    async fn payment_requires_existing_booking() {
        let state = BookingState::new(NaiveDate::from_ymd_opt(2026, 3, 1).unwrap());
        let desk = BookingDesk::new(state.clone());

        let pay = ProposedAction::new("process_payment")
            .with_param("booking_id", "BK001")
            .with_param("amount", 200.0);
        assert!(desk.execute(&pay).await.is_err());

        let book = ProposedAction::new("book_hotel")
            .with_param("hotel", "Grand Hotel")
            .with_param("check_in", "2026-03-20")
            .with_param("check_out", "2026-03-25")
            .with_param("guests", 2);
        let output = desk.execute(&book).await.unwrap();
        assert_eq!(output["booking_id"], "BK001");

        desk.execute(&pay).await.unwrap();
        assert!(state.ledger().read().await.payments.contains_key("BK001"));
    }

    #[tokio::test]
    async fn unknown_actions_are_unsupported() {
        let today = NaiveDate::from_ymd_opt(2026, 3, 1).unwrap();
        let desk = BookingDesk::new(BookingState::new(today));
        let err = desk
            .execute(&ProposedAction::new("teleport"))
            .await
            .unwrap_err();
        assert!(matches!(err, ExecutionError::Unsupported { .. }));
    }
}
