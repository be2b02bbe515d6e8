//! Kafka implementation of the domain's event transport.

use std::time::Duration;

use async_trait::async_trait;
use domain::{EventTransport, PublishError};
use rdkafka::config::ClientConfig;
use rdkafka::error::KafkaError;
use rdkafka::producer::{FutureProducer, FutureRecord, Producer};
use rdkafka::util::Timeout;
use thiserror::Error;

/// The producer could not be created from the given settings.
#[derive(Debug, Error)]
#[error("Kafka producer configuration error: {0}")]
pub struct KafkaConfigError(#[from] KafkaError);

/// Producer settings.
#[derive(Debug, Clone)]
pub struct KafkaConfig {
    /// Comma-separated `host:port` list.
    pub brokers: String,
    pub client_id: String,
    /// Upper bound on a single delivery, including broker acknowledgement.
    pub send_timeout: Duration,
}

impl KafkaConfig {
    pub fn new(brokers: impl Into<String>) -> Self {
        Self {
            brokers: brokers.into(),
            client_id: "customer-service".to_string(),
            send_timeout: Duration::from_secs(5),
        }
    }

    pub fn with_client_id(mut self, client_id: impl Into<String>) -> Self {
        self.client_id = client_id.into();
        self
    }

    pub fn with_send_timeout(mut self, send_timeout: Duration) -> Self {
        self.send_timeout = send_timeout;
        self
    }

    fn client_config(&self) -> ClientConfig {
        let mut config = ClientConfig::new();
        config
            .set("bootstrap.servers", &self.brokers)
            .set("client.id", &self.client_id)
            .set(
                "message.timeout.ms",
                self.send_timeout.as_millis().to_string(),
            );
        config
    }
}

/// Sends keyed messages through an rdkafka `FutureProducer`.
#[derive(Clone)]
pub struct KafkaTransport {
    producer: FutureProducer,
    send_timeout: Duration,
}

impl KafkaTransport {
    /// Creates the producer. No broker connection is made until the first send.
    pub fn new(config: &KafkaConfig) -> Result<Self, KafkaConfigError> {
        let producer: FutureProducer = config.client_config().create()?;
        Ok(Self {
            producer,
            send_timeout: config.send_timeout,
        })
    }

    /// Waits for queued messages to be delivered.
    pub fn flush(&self, timeout: Duration) -> Result<(), KafkaError> {
        self.producer.flush(Timeout::After(timeout))
    }
}

#[async_trait]
impl EventTransport for KafkaTransport {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        let record = FutureRecord::to(topic).key(key).payload(payload);

        self.producer
            .send(record, Timeout::After(self.send_timeout))
            .await
            .map_err(|(e, _)| PublishError::transport(e))?;

        tracing::debug!(topic = %topic, key = %key, "message delivered");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_client_config_carries_timeout() {
        let config = KafkaConfig::new("broker-1:9092,broker-2:9092")
            .with_client_id("test-client")
            .with_send_timeout(Duration::from_millis(1500));

        let client = config.client_config();

        assert_eq!(client.get("bootstrap.servers"), Some("broker-1:9092,broker-2:9092"));
        assert_eq!(client.get("client.id"), Some("test-client"));
        assert_eq!(client.get("message.timeout.ms"), Some("1500"));
    }

    #[tokio::test]
    async fn test_unreachable_broker_fails_send() {
        // nothing listens on port 1
        let config = KafkaConfig::new("127.0.0.1:1").with_send_timeout(Duration::from_millis(200));
        let transport = KafkaTransport::new(&config).unwrap();

        let result = transport
            .send("customer.registered", "key", b"{\"customer_id\":\"key\"}")
            .await;

        assert!(matches!(result, Err(PublishError::Transport(_))));
    }
}
