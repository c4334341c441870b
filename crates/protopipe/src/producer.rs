//! One-shot record producer.

use std::time::Duration;

use rdkafka::config::ClientConfig;
use rdkafka::producer::{FutureProducer, FutureRecord};

use crate::Person;
use crate::error::PipeError;

/// How long a record may sit unacknowledged before delivery counts as failed.
const DELIVERY_TIMEOUT: Duration = Duration::from_secs(3);

pub struct RecordProducer {
    producer: FutureProducer,
}

impl RecordProducer {
    /// Build a producer against the given seed brokers.
    pub fn connect(seeds: &[String]) -> Result<Self, PipeError> {
        let producer: FutureProducer = ClientConfig::new()
            .set("bootstrap.servers", seeds.join(","))
            .set(
                "message.timeout.ms",
                DELIVERY_TIMEOUT.as_millis().to_string(),
            )
            .create()
            .map_err(|e| PipeError::from_transport_error(e, "producer construction"))?;

        Ok(Self { producer })
    }

    /// Send one entry to the topic, keyed by its decimal id, and wait for the
    /// delivery acknowledgement. Returns the partition and offset the record
    /// landed at.
    pub async fn send(&self, topic: &str, person: &Person) -> Result<(i32, i64), PipeError> {
        let key = person.key();
        let payload = person.to_wire();
        let record = FutureRecord::to(topic).key(&key).payload(&payload);

        self.producer
            .send(record, DELIVERY_TIMEOUT)
            .await
            .map_err(|(err, _)| PipeError::Delivery {
                topic: topic.to_string(),
                reason: err.to_string(),
            })
    }
}
