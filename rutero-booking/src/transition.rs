use std::sync::Arc;

use rutero_core::EventBus;
use rutero_shared::EventEnvelope;
use tracing::info;

use crate::error::BookingError;
use crate::models::{Booking, BookingKey, CancellationDetail, StatusChange};
use crate::repository::BookingStore;
use crate::status::BookingStatus;

/// Validates a status-change request against the stored record and
/// announces the merged result on the event bus.
///
/// The record store is never written here; applying the transition is
/// the event handlers' job downstream.
pub struct TransitionValidator {
    bookings: Arc<dyn BookingStore>,
    bus: Arc<dyn EventBus>,
}

impl TransitionValidator {
    pub fn new(bookings: Arc<dyn BookingStore>, bus: Arc<dyn EventBus>) -> Self {
        Self { bookings, bus }
    }

    pub async fn submit(&self, key: &BookingKey, payload: &[u8]) -> Result<(), BookingError> {
        // 1. Reject an empty payload outright.
        if payload.is_empty() {
            return Err(BookingError::EmptyPayload);
        }

        // 2. Decode the partial change.
        let mut change: StatusChange = serde_json::from_slice(payload)
            .map_err(|err| BookingError::MalformedPayload(err.to_string()))?;

        // 3. Fetch the record under change.
        let mut record = self
            .bookings
            .get(key)
            .await?
            .ok_or(BookingError::NotFound)?;

        // 4. A cancelled booking can never be re-confirmed. An absent
        // cancellation flag reads as not cancelled.
        if filled(&change.status) == Some("CONFIRMED") && record.is_cancelled == Some(true) {
            return Err(BookingError::IllegalReconfirmation);
        }

        // 5. A cancelling change raises the flag on both sides before the
        // merge, whether or not the requester set it.
        if filled(&change.status) == Some("CANCELLED") {
            change.is_cancelled = Some(true);
            record.is_cancelled = Some(true);
        }

        // 6. Merge the non-blank change fields onto the record and
        // 7. parse the resulting status.
        let merged = apply_change(&change, record)?;

        // 8. Resolve the event source; PENDING cannot be announced.
        let source = merged.status.event_source()?;

        // 9. A cancelled record must carry complete cancellation details.
        require_cancellation_detail(&merged)?;

        // 10. Publish exactly one event carrying the merged record.
        let detail = serde_json::to_string(&merged)
            .map_err(|err| BookingError::Collaborator(err.into()))?;
        self.bus
            .publish(EventEnvelope {
                source: source.as_str().to_string(),
                detail,
            })
            .await?;

        info!(id = %merged.id, status = %merged.status, %source, "announced booking transition");

        Ok(())
    }
}

fn filled(value: &str) -> Option<&str> {
    (!value.is_empty()).then_some(value)
}

/// Applies non-blank change fields onto the stored record. Cancellation
/// details only merge when the change carries the cancellation flag, and
/// an untouched detail stays absent.
fn apply_change(change: &StatusChange, mut record: Booking) -> Result<Booking, BookingError> {
    let candidate = filled(&change.status).unwrap_or_else(|| record.status.as_str());
    record.status = BookingStatus::parse(candidate)?;

    if let Some(seat_number) = filled(&change.seat_number) {
        record.seat_number = seat_number.to_string();
    }

    if change.is_cancelled.is_some() {
        if let Some(patch) = &change.cancelled {
            if let Some(reason) = filled(&patch.reason) {
                record
                    .cancelled
                    .get_or_insert_with(CancellationDetail::default)
                    .reason = reason.to_string();
            }
            if let Some(cancelled_by) = filled(&patch.cancelled_by) {
                record
                    .cancelled
                    .get_or_insert_with(CancellationDetail::default)
                    .cancelled_by = cancelled_by.to_string();
            }
        }
    }

    Ok(record)
}

fn require_cancellation_detail(record: &Booking) -> Result<(), BookingError> {
    if record.is_cancelled != Some(true) {
        return Ok(());
    }

    let detail = match &record.cancelled {
        Some(detail) if !(detail.reason.is_empty() && detail.cancelled_by.is_empty()) => detail,
        _ => return Err(BookingError::CancellationDetailMissing),
    };

    let mut missing = Vec::new();
    if detail.reason.is_empty() {
        missing.push("'reason'");
    }
    if detail.cancelled_by.is_empty() {
        missing.push("'cancelled_by'");
    }

    if missing.is_empty() {
        Ok(())
    } else {
        Err(BookingError::MissingCancellationFields(missing.join(", ")))
    }
}
