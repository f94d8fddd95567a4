use std::sync::Arc;

use rutero_core::{identity, DeliveryQueue};
use rutero_shared::QueuedMessage;
use tracing::info;

use crate::error::BookingError;
use crate::models::BookingDraft;
use crate::status::BookingStatus;

/// Message group every booking creation is enqueued under, so creations
/// are delivered to the worker in arrival order.
pub const BOOKING_GROUP_ID: &str = "process.booking";

/// Front door of the booking pipeline: rejects bad creation payloads and
/// queues good ones for the worker. Never touches the record store.
pub struct IntakeValidator {
    queue: Arc<dyn DeliveryQueue>,
}

impl IntakeValidator {
    pub fn new(queue: Arc<dyn DeliveryQueue>) -> Self {
        Self { queue }
    }

    /// Validates a creation payload and enqueues it unchanged.
    pub async fn accept(&self, payload: &[u8]) -> Result<(), BookingError> {
        // 1. Reject an empty payload outright.
        if payload.is_empty() {
            return Err(BookingError::EmptyPayload);
        }

        // 2. The payload must decode as a booking draft.
        let draft: BookingDraft = serde_json::from_slice(payload)
            .map_err(|err| BookingError::MalformedPayload(err.to_string()))?;

        // 3. An invalid status never reaches the queue.
        BookingStatus::parse(&draft.status)?;

        // 4. Queue the raw payload as given; the worker decodes it again.
        self.queue
            .enqueue(QueuedMessage {
                body: String::from_utf8_lossy(payload).into_owned(),
                dedup_token: identity::dedup_token(payload),
                group_id: BOOKING_GROUP_ID.to_string(),
            })
            .await?;

        info!(user_id = %draft.user_id, status = %draft.status, "queued booking creation");

        Ok(())
    }
}
