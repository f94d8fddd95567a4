//! Kafka consumer loops for the booking pipeline.
//!
//! Offsets commit only after a delivery is fully handled, so a crash
//! mid-handler replays the message. The handlers tolerate that: the
//! worker assigns fresh ids per delivery and the queue collapses
//! duplicates upstream, while the transition handlers are idempotent.

use std::sync::Arc;

use rdkafka::config::ClientConfig;
use rdkafka::consumer::{CommitMode, Consumer, StreamConsumer};
use rdkafka::message::{BorrowedMessage, Headers, Message};
use tracing::{error, info, warn};

use rutero_booking::{
    BookingWorker, CancellationHandler, ConfirmationHandler, EventSource, BOOKING_GROUP_ID,
};
use rutero_shared::{EventEnvelope, QueuedMessage};
use rutero_store::DEDUP_TOKEN_HEADER;

fn consumer_for(brokers: &str, group_id: &str, topic: &str) -> StreamConsumer {
    let consumer: StreamConsumer = ClientConfig::new()
        .set("bootstrap.servers", brokers)
        .set("group.id", group_id)
        .set("enable.auto.commit", "false")
        .set("auto.offset.reset", "earliest")
        .create()
        .expect("Consumer creation failed");

    consumer.subscribe(&[topic]).expect("Can't subscribe");
    consumer
}

fn header_value(message: &BorrowedMessage<'_>, key: &str) -> Option<String> {
    message.headers()?.iter().find_map(|header| {
        if header.key == key {
            header
                .value
                .map(|value| String::from_utf8_lossy(value).into_owned())
        } else {
            None
        }
    })
}

/// Drains the intake queue, creating one record per accepted draft.
pub async fn run_intake_worker(
    brokers: String,
    group_id: String,
    topic: String,
    worker: Arc<BookingWorker>,
) {
    let consumer = consumer_for(&brokers, &group_id, &topic);

    info!(topic = %topic, "intake worker started, draining booking drafts");

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                let Some(Ok(body)) = m.payload_view::<str>() else {
                    warn!("skipping intake delivery without a readable payload");
                    let _ = consumer.commit_message(&m, CommitMode::Async);
                    continue;
                };

                let message = QueuedMessage {
                    body: body.to_string(),
                    dedup_token: header_value(&m, DEDUP_TOKEN_HEADER).unwrap_or_default(),
                    group_id: m
                        .key()
                        .map(|key| String::from_utf8_lossy(key).into_owned())
                        .unwrap_or_else(|| BOOKING_GROUP_ID.to_string()),
                };

                match worker.process(&message).await {
                    Ok(_) => {
                        if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                            error!("Failed to commit intake offset: {}", e);
                        }
                    }
                    // Leave the offset uncommitted so the delivery replays.
                    Err(e) => error!("Failed to process booking draft: {}", e),
                }
            }
        }
    }
}

/// Dispatches transition events to their handlers by source tag.
pub async fn run_event_worker(
    brokers: String,
    group_id: String,
    topic: String,
    confirmations: Arc<ConfirmationHandler>,
    cancellations: Arc<CancellationHandler>,
) {
    let consumer = consumer_for(&brokers, &group_id, &topic);

    info!(topic = %topic, "event worker started, listening for booking transitions");

    loop {
        match consumer.recv().await {
            Err(e) => error!("Kafka error: {}", e),
            Ok(m) => {
                let Some(Ok(payload)) = m.payload_view::<str>() else {
                    warn!("skipping event delivery without a readable payload");
                    let _ = consumer.commit_message(&m, CommitMode::Async);
                    continue;
                };

                let envelope: EventEnvelope = match serde_json::from_str(payload) {
                    Ok(envelope) => envelope,
                    Err(e) => {
                        error!("Malformed event envelope, dropping: {}", e);
                        let _ = consumer.commit_message(&m, CommitMode::Async);
                        continue;
                    }
                };

                let outcome = match EventSource::parse(&envelope.source) {
                    Some(EventSource::Confirmed) => confirmations.process(&envelope.detail).await,
                    Some(EventSource::Cancelled) => cancellations.process(&envelope.detail).await,
                    None => {
                        warn!(source = %envelope.source, "unrecognized event source, dropping");
                        let _ = consumer.commit_message(&m, CommitMode::Async);
                        continue;
                    }
                };

                match outcome {
                    Ok(()) => {
                        if let Err(e) = consumer.commit_message(&m, CommitMode::Async) {
                            error!("Failed to commit event offset: {}", e);
                        }
                    }
                    // Leave the offset uncommitted so the delivery replays.
                    Err(e) => error!(source = %envelope.source, "Failed to handle event: {}", e),
                }
            }
        }
    }
}
