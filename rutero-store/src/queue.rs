use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::message::{Header, OwnedHeaders};
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

use rutero_core::DeliveryQueue;
use rutero_shared::QueuedMessage;

/// Kafka header carrying the dedup token alongside the raw payload.
pub const DEDUP_TOKEN_HEADER: &str = "dedup_token";

/// Intake queue over a Kafka topic. The group id keys the record, so
/// messages of one group land on one partition and stay ordered; the
/// dedup token rides along as a header for the consumer to skip repeats.
#[derive(Clone)]
pub struct KafkaIntakeQueue {
    producer: FutureProducer,
    topic: String,
}

impl KafkaIntakeQueue {
    pub fn new(brokers: &str, topic: &str) -> Result<Self, rdkafka::error::KafkaError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", brokers)
            .set("message.timeout.ms", "5000")
            .create()?;

        Ok(Self {
            producer,
            topic: topic.to_string(),
        })
    }
}

#[async_trait]
impl DeliveryQueue for KafkaIntakeQueue {
    async fn enqueue(
        &self,
        message: QueuedMessage,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let headers = OwnedHeaders::new().insert(Header {
            key: DEDUP_TOKEN_HEADER,
            value: Some(&message.dedup_token),
        });
        let record = FutureRecord::to(&self.topic)
            .key(&message.group_id)
            .payload(&message.body)
            .headers(headers);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                let partition = delivery.partition;
                let offset = delivery.offset;
                info!(
                    "Queued message to {}/{}: partition {} offset {}",
                    self.topic, message.group_id, partition, offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to queue message to {}: {}", self.topic, e);
                Err(Box::new(e))
            }
        }
    }
}
