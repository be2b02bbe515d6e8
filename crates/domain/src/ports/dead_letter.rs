//! Dead-letter sink contract and in-memory implementation.

use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::RwLock;

use super::BoxError;
use crate::customer::DeadLetterRecord;

/// The dead-letter store could not take the record.
#[derive(Debug, Error)]
#[error("dead-letter write failed: {0}")]
pub struct DeadLetterError(#[source] pub BoxError);

impl DeadLetterError {
    pub fn new(err: impl Into<BoxError>) -> Self {
        Self(err.into())
    }
}

/// Durable, write-only store for events that failed to publish.
#[async_trait]
pub trait DeadLetterSink: Send + Sync {
    async fn save_customer_event(&self, record: DeadLetterRecord) -> Result<(), DeadLetterError>;
}

/// In-memory dead-letter sink for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemoryDeadLetterSink {
    records: Arc<RwLock<Vec<DeadLetterRecord>>>,
    fail_on_save: Arc<AtomicBool>,
}

impl InMemoryDeadLetterSink {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    /// Returns a copy of every captured record, oldest first.
    pub async fn records(&self) -> Vec<DeadLetterRecord> {
        self.records.read().await.clone()
    }
}

#[async_trait]
impl DeadLetterSink for InMemoryDeadLetterSink {
    async fn save_customer_event(&self, record: DeadLetterRecord) -> Result<(), DeadLetterError> {
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(DeadLetterError::new("dead-letter store unavailable"));
        }
        self.records.write().await.push(record);
        Ok(())
    }
}
