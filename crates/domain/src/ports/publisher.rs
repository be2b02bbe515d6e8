//! Domain event publication with dead-letter fallback.
//!
//! [`TopicPublisher`] serializes each event, sends it through an
//! [`EventTransport`] keyed by customer id and, when the send fails, hands the
//! event and its payload to a [`DeadLetterSink`] before reporting the failure.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use common::{Clock, SystemClock};
use thiserror::Error;
use tokio::sync::RwLock;

use super::BoxError;
use super::dead_letter::DeadLetterSink;
use crate::customer::{CustomerRegistered, DeadLetterRecord};

/// Errors reported when publishing a domain event.
#[derive(Debug, Error)]
pub enum PublishError {
    /// The event could not be encoded.
    #[error("marshal event: {0}")]
    Serialization(#[from] serde_json::Error),

    /// The bus did not accept the message.
    #[error("write message: {0}")]
    Transport(#[source] BoxError),
}

impl PublishError {
    pub fn transport(err: impl Into<BoxError>) -> Self {
        Self::Transport(err.into())
    }
}

/// Publishes customer domain events.
#[async_trait]
pub trait DomainEventPublisher: Send + Sync {
    async fn publish_customer_registered(
        &self,
        event: &CustomerRegistered,
    ) -> Result<(), PublishError>;
}

/// Raw keyed message delivery to a named topic.
#[async_trait]
pub trait EventTransport: Send + Sync {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublishError>;
}

/// Event publisher bound to a single topic with dead-letter capture.
pub struct TopicPublisher<T, D>
where
    T: EventTransport,
    D: DeadLetterSink,
{
    transport: T,
    dead_letters: D,
    topic: String,
    clock: Arc<dyn Clock>,
}

impl<T, D> TopicPublisher<T, D>
where
    T: EventTransport,
    D: DeadLetterSink,
{
    pub fn new(transport: T, dead_letters: D, topic: impl Into<String>) -> Self {
        Self {
            transport,
            dead_letters,
            topic: topic.into(),
            clock: Arc::new(SystemClock),
        }
    }

    /// Overrides the clock used to stamp dead-letter records.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    async fn capture(&self, event: &CustomerRegistered, payload: Vec<u8>, err: &PublishError) {
        let record = DeadLetterRecord::capture(event.clone(), payload, err, self.clock.now());

        match self.dead_letters.save_customer_event(record).await {
            Ok(()) => {
                metrics::counter!("customer_events_dead_lettered_total").increment(1);
                tracing::warn!(
                    customer_id = %event.customer_id,
                    topic = %self.topic,
                    error = %err,
                    "event publish failed, captured in dead-letter store"
                );
            }
            Err(sink_err) => {
                // must not mask the publish failure
                metrics::counter!("customer_dead_letter_failures_total").increment(1);
                tracing::error!(
                    customer_id = %event.customer_id,
                    topic = %self.topic,
                    error = %err,
                    sink_error = %sink_err,
                    "event publish failed and dead-letter capture failed"
                );
            }
        }
    }
}

#[async_trait]
impl<T, D> DomainEventPublisher for TopicPublisher<T, D>
where
    T: EventTransport,
    D: DeadLetterSink,
{
    async fn publish_customer_registered(
        &self,
        event: &CustomerRegistered,
    ) -> Result<(), PublishError> {
        let payload = event.to_payload()?;

        match self
            .transport
            .send(&self.topic, &event.customer_id, &payload)
            .await
        {
            Ok(()) => {
                metrics::counter!("customer_events_published_total").increment(1);
                tracing::debug!(
                    customer_id = %event.customer_id,
                    topic = %self.topic,
                    "published CustomerRegistered"
                );
                Ok(())
            }
            Err(err) => {
                self.capture(event, payload, &err).await;
                Err(err)
            }
        }
    }
}

/// A message accepted by [`InMemoryEventBus`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PublishedMessage {
    pub topic: String,
    pub key: String,
    pub payload: Vec<u8>,
}

/// In-memory event transport for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryEventBus {
    messages: Arc<RwLock<Vec<PublishedMessage>>>,
    fail_on_send: Arc<AtomicBool>,
}

impl InMemoryEventBus {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the bus to reject every send.
    pub fn set_fail_on_send(&self, fail: bool) {
        self.fail_on_send.store(fail, Ordering::SeqCst);
    }

    pub async fn messages(&self) -> Vec<PublishedMessage> {
        self.messages.read().await.clone()
    }

    /// Decodes every accepted message as a `CustomerRegistered` event.
    pub async fn customer_registered_events(&self) -> Vec<CustomerRegistered> {
        self.messages
            .read()
            .await
            .iter()
            .filter_map(|m| serde_json::from_slice(&m.payload).ok())
            .collect()
    }
}

#[async_trait]
impl EventTransport for InMemoryEventBus {
    async fn send(&self, topic: &str, key: &str, payload: &[u8]) -> Result<(), PublishError> {
        if self.fail_on_send.load(Ordering::SeqCst) {
            return Err(PublishError::transport("broker unavailable"));
        }

        self.messages.write().await.push(PublishedMessage {
            topic: topic.to_string(),
            key: key.to_string(),
            payload: payload.to_vec(),
        });
        Ok(())
    }
}
