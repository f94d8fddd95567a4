use async_trait::async_trait;
use rutero_shared::{EventEnvelope, QueuedMessage};

/// Buffering queue between reservation intake and the booking worker.
///
/// Messages sharing a `group_id` are delivered in order; messages with the
/// same `dedup_token` collapse into a single delivery.
#[async_trait]
pub trait DeliveryQueue: Send + Sync {
    async fn enqueue(
        &self,
        message: QueuedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Typed event channel carrying booking transition events to their handlers.
///
/// Delivery is at-least-once; consumers must tolerate repeats.
#[async_trait]
pub trait EventBus: Send + Sync {
    async fn publish(
        &self,
        event: EventEnvelope,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}

/// Outbound mail channel for passenger notices.
#[async_trait]
pub trait Mailer: Send + Sync {
    async fn send(
        &self,
        to: &str,
        subject: &str,
        html_body: &str,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>>;
}
