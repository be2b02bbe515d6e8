//! Search projection contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::sync::RwLock;

use super::BoxError;
use crate::customer::Customer;

/// Errors reported by a search indexer.
#[derive(Debug, Error)]
pub enum IndexError {
    /// The search backend answered with a non-success status.
    #[error("search backend rejected document {document_id}: status {status}")]
    Rejected { document_id: String, status: u16 },

    /// The search backend could not be reached or the body could not be built.
    #[error("search backend failure: {0}")]
    Backend(#[source] BoxError),
}

impl IndexError {
    pub fn backend(err: impl Into<BoxError>) -> Self {
        Self::Backend(err.into())
    }
}

/// Document shape stored in the search index, keyed by `id`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchDocument {
    pub id: String,
    pub email: String,
    pub full_name: String,
    pub phone_number: String,
    pub birth_date: DateTime<Utc>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Customer> for SearchDocument {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id().to_string(),
            email: customer.email().to_string(),
            full_name: customer.full_name().to_string(),
            phone_number: customer.phone_number().to_string(),
            birth_date: customer.birth_date(),
            created_at: customer.created_at(),
            updated_at: customer.updated_at(),
        }
    }
}

/// Best-effort projection of customers into a search index.
#[async_trait]
pub trait CustomerSearchIndexer: Send + Sync {
    /// Creates or replaces the customer's document.
    async fn index(&self, customer: &Customer) -> Result<(), IndexError>;
}

/// In-memory search indexer for testing.
#[derive(Debug, Clone, Default)]
pub struct InMemorySearchIndexer {
    documents: Arc<RwLock<HashMap<String, SearchDocument>>>,
    fail_on_index: Arc<AtomicBool>,
}

impl InMemorySearchIndexer {
    pub fn new() -> Self {
        Self::default()
    }

    /// Configures the indexer to fail every index call.
    pub fn set_fail_on_index(&self, fail: bool) {
        self.fail_on_index.store(fail, Ordering::SeqCst);
    }

    pub async fn document_count(&self) -> usize {
        self.documents.read().await.len()
    }

    pub async fn document(&self, id: &str) -> Option<SearchDocument> {
        self.documents.read().await.get(id).cloned()
    }
}

#[async_trait]
impl CustomerSearchIndexer for InMemorySearchIndexer {
    async fn index(&self, customer: &Customer) -> Result<(), IndexError> {
        if self.fail_on_index.load(Ordering::SeqCst) {
            return Err(IndexError::Rejected {
                document_id: customer.id().to_string(),
                status: 503,
            });
        }

        let document = SearchDocument::from(customer);
        self.documents
            .write()
            .await
            .insert(document.id.clone(), document);
        Ok(())
    }
}
