use std::sync::Arc;

use chrono::Utc;
use rutero_core::identity;
use rutero_shared::QueuedMessage;
use tracing::info;

use crate::error::BookingError;
use crate::models::{Booking, BookingDraft};
use crate::repository::BookingStore;
use crate::status::BookingStatus;

/// Drains the intake queue, turning accepted drafts into stored records.
///
/// Append-only: there is no read before the write, and every delivery
/// gets a fresh id. Collapsing duplicate deliveries is the queue's job.
pub struct BookingWorker {
    bookings: Arc<dyn BookingStore>,
}

impl BookingWorker {
    pub fn new(bookings: Arc<dyn BookingStore>) -> Self {
        Self { bookings }
    }

    /// Creates the record for one queued draft. A decode failure fails
    /// the delivery; the queue's redrive policy owns the retry.
    pub async fn process(&self, message: &QueuedMessage) -> Result<Booking, BookingError> {
        let draft: BookingDraft = serde_json::from_str(&message.body)
            .map_err(|err| BookingError::MalformedPayload(err.to_string()))?;

        let booking = Booking {
            id: identity::record_id(),
            user_id: draft.user_id,
            bus_id: draft.bus_id,
            bus_route_id: draft.bus_route_id,
            status: BookingStatus::parse(&draft.status)?,
            seat_number: draft.seat_number,
            travel_date: draft.travel_date,
            date_created: Some(Utc::now()),
            date_confirmed: None,
            is_cancelled: None,
            cancelled: None,
            timestamp: draft.timestamp,
            version: 1,
        };

        self.bookings.put(&booking).await?;
        info!(id = %booking.id, status = %booking.status, "created booking record");

        Ok(booking)
    }
}
