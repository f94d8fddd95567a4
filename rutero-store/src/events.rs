use async_trait::async_trait;
use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};
use rdkafka::util::Timeout;
use std::time::Duration;
use tracing::{error, info};

use rutero_core::EventBus;
use rutero_shared::EventEnvelope;

/// Event bus over a Kafka topic. The whole envelope travels as the
/// payload; the source tag keys the record for partitioning.
#[derive(Clone)]
pub struct KafkaEventBus {
    producer: FutureProducer,
    topic: String,
}

impl KafkaEventBus {
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
impl EventBus for KafkaEventBus {
    async fn publish(
        &self,
        event: EventEnvelope,
    ) -> Result<(), Box<dyn std::error::Error + Send + Sync>> {
        let payload = serde_json::to_string(&event)?;
        let record = FutureRecord::to(&self.topic)
            .key(&event.source)
            .payload(&payload);

        match self
            .producer
            .send(record, Timeout::After(Duration::from_secs(0)))
            .await
        {
            Ok(delivery) => {
                let partition = delivery.partition;
                let offset = delivery.offset;
                info!(
                    "Published {} to {}: partition {} offset {}",
                    event.source, self.topic, partition, offset
                );
                Ok(())
            }
            Err((e, _msg)) => {
                error!("Failed to publish {} to {}: {}", event.source, self.topic, e);
                Err(Box::new(e))
            }
        }
    }
}
