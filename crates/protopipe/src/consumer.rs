//! Topic consumption: one poll worker relaying fetched records to a print
//! loop over a single-slot channel.

use rdkafka::Message;
use rdkafka::config::ClientConfig;
use rdkafka::consumer::{Consumer, StreamConsumer};
use rdkafka::error::{KafkaError, RDKafkaErrorCode};
use rdkafka::message::BorrowedMessage;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::Person;
use crate::error::PipeError;

/// Owned copy of one fetched record, detached from the client's buffers so
/// it can cross the relay.
#[derive(Debug, Clone, PartialEq)]
pub struct FetchedRecord {
    pub partition: i32,
    pub offset: i64,
    pub key: Option<Vec<u8>>,
    pub payload: Option<Vec<u8>>,
}

impl FetchedRecord {
    fn from_message(message: &BorrowedMessage<'_>) -> Self {
        Self {
            partition: message.partition(),
            offset: message.offset(),
            key: message.key().map(|k| k.to_vec()),
            payload: message.payload().map(|p| p.to_vec()),
        }
    }
}

/// One item on the relay: a record to print, or the error that ends the run.
#[derive(Debug, Clone, PartialEq)]
pub enum FetchItem {
    Record(FetchedRecord),
    Fatal(PipeError),
}

pub struct TopicConsumer {
    consumer: StreamConsumer,
    topic: String,
}

impl TopicConsumer {
    /// Build a group consumer and subscribe to the topic. Offsets start at
    /// the earliest available record and commit automatically.
    pub fn connect(seeds: &[String], group_id: &str, topic: &str) -> Result<Self, PipeError> {
        let consumer: StreamConsumer = ClientConfig::new()
            .set("bootstrap.servers", seeds.join(","))
            .set("group.id", group_id)
            .set("auto.offset.reset", "earliest")
            .set("enable.auto.commit", "true")
            .create()
            .map_err(|e| PipeError::from_transport_error(e, "consumer construction"))?;

        consumer
            .subscribe(&[topic])
            .map_err(|e| PipeError::from_transport_error(e, "topic subscription"))?;

        info!(topic = %topic, group_id = %group_id, "Subscribed to topic");

        Ok(Self {
            consumer,
            topic: topic.to_string(),
        })
    }

    /// Poll until the first fatal fetch error. Records flow from the poll
    /// worker to the invoking task through a channel of capacity 1, so
    /// polling never runs ahead of printing by more than one record.
    pub async fn run(self) -> Result<(), PipeError> {
        let (tx, rx) = mpsc::channel(1);

        debug!(topic = %self.topic, "Starting poll worker");
        let worker = tokio::spawn(poll_loop(self.consumer, tx));

        let result = print_loop(rx).await;
        worker.abort();
        result.map(|records| {
            debug!(records, "Relay closed");
        })
    }
}

/// Broker errors the client keeps retrying underneath. Everything else ends
/// the run.
fn is_retryable_fetch_error(err: &KafkaError) -> bool {
    matches!(
        err.rdkafka_error_code(),
        Some(
            RDKafkaErrorCode::BrokerTransportFailure
                | RDKafkaErrorCode::AllBrokersDown
                | RDKafkaErrorCode::OperationTimedOut
        )
    )
}

async fn poll_loop(consumer: StreamConsumer, relay: mpsc::Sender<FetchItem>) {
    loop {
        let item = match consumer.recv().await {
            Ok(message) => FetchItem::Record(FetchedRecord::from_message(&message)),
            Err(err) if is_retryable_fetch_error(&err) => {
                warn!(error = %err, "Transient fetch error, still polling");
                continue;
            }
            Err(err) => FetchItem::Fatal(PipeError::Fetch {
                reason: err.to_string(),
            }),
        };

        let fatal = matches!(item, FetchItem::Fatal(_));
        if relay.send(item).await.is_err() {
            // Receiver side is gone; nothing left to relay to.
            return;
        }
        if fatal {
            return;
        }
    }
}

async fn print_loop(mut relay: mpsc::Receiver<FetchItem>) -> Result<u64, PipeError> {
    let mut processed = 0;
    while let Some(item) = relay.recv().await {
        match item {
            FetchItem::Record(record) => {
                let payload = record.payload.as_deref().unwrap_or_default();
                let entry = Person::from_wire(payload, "record value")?;
                info!(
                    partition = record.partition,
                    offset = record.offset,
                    id = entry.id,
                    name = %entry.name,
                    email = %entry.email,
                    "Record"
                );
                processed += 1;
            }
            FetchItem::Fatal(err) => return Err(err),
        }
    }
    Ok(processed)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn record_item(person: &Person) -> FetchItem {
        FetchItem::Record(FetchedRecord {
            partition: 0,
            offset: 0,
            key: Some(person.key().into_bytes()),
            payload: Some(person.to_wire()),
        })
    }

    #[test_log::test(tokio::test)]
    async fn test_print_loop_processes_records_in_order() {
        let (tx, rx) = mpsc::channel(1);
        let people = vec![
            Person {
                id: 1,
                name: "Ada".to_string(),
                email: "ada@example.com".to_string(),
            },
            Person {
                id: 2,
                name: "Grace".to_string(),
                email: "grace@example.com".to_string(),
            },
        ];
        let items: Vec<FetchItem> = people.iter().map(record_item).collect();

        let sender = tokio::spawn(async move {
            for item in items {
                tx.send(item).await.unwrap();
            }
        });

        let processed = print_loop(rx).await.unwrap();
        assert_eq!(processed, 2);
        sender.await.unwrap();
    }

    #[test_log::test(tokio::test)]
    async fn test_print_loop_fails_on_malformed_payload() {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            let item = FetchItem::Record(FetchedRecord {
                partition: 0,
                offset: 3,
                key: None,
                payload: Some(vec![0xff, 0xff, 0xff]),
            });
            let _ = tx.send(item).await;
        });

        let result = print_loop(rx).await;
        assert!(matches!(result, Err(PipeError::InvalidRecord { .. })));
    }

    #[test_log::test(tokio::test)]
    async fn test_print_loop_returns_relayed_fatal_error() {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            let _ = tx
                .send(FetchItem::Fatal(PipeError::Fetch {
                    reason: "Unknown topic or partition".to_string(),
                }))
                .await;
        });

        let result = print_loop(rx).await;
        assert_eq!(
            result,
            Err(PipeError::Fetch {
                reason: "Unknown topic or partition".to_string()
            })
        );
    }

    #[test_log::test(tokio::test)]
    async fn test_print_loop_treats_missing_payload_as_default_record() {
        let (tx, rx) = mpsc::channel(1);
        tokio::spawn(async move {
            let _ = tx
                .send(FetchItem::Record(FetchedRecord {
                    partition: 1,
                    offset: 9,
                    key: None,
                    payload: None,
                }))
                .await;
        });

        let processed = print_loop(rx).await.unwrap();
        assert_eq!(processed, 1);
    }
}
