//! OpenSearch implementation of the customer search indexer.
//!
//! Documents are written with the single-document index API,
//! `PUT /{index}/_doc/{id}?refresh=true`, so a re-index replaces the
//! previous document and the change is searchable on return.

use std::time::Duration;

use async_trait::async_trait;
use domain::{Customer, CustomerSearchIndexer, IndexError, SearchDocument};
use reqwest::Client;

/// Writes customer documents to an OpenSearch (or Elasticsearch) index.
#[derive(Clone)]
pub struct OpenSearchIndexer {
    client: Client,
    endpoint: String,
    index: String,
}

impl OpenSearchIndexer {
    /// Builds an indexer with its own HTTP client.
    pub fn new(
        endpoint: impl Into<String>,
        index: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self::with_client(client, endpoint, index))
    }

    pub fn with_client(client: Client, endpoint: impl Into<String>, index: impl Into<String>) -> Self {
        let endpoint = endpoint.into().trim_end_matches('/').to_string();
        Self {
            client,
            endpoint,
            index: index.into(),
        }
    }

    pub fn index_name(&self) -> &str {
        &self.index
    }

    fn document_url(&self, id: &str) -> String {
        format!("{}/{}/_doc/{}", self.endpoint, self.index, id)
    }
}

#[async_trait]
impl CustomerSearchIndexer for OpenSearchIndexer {
    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id(), index = %self.index))]
    async fn index(&self, customer: &Customer) -> Result<(), IndexError> {
        let document = SearchDocument::from(customer);

        let response = self
            .client
            .put(self.document_url(&document.id))
            .query(&[("refresh", "true")])
            .json(&document)
            .send()
            .await
            .map_err(IndexError::backend)?;

        let status = response.status();
        if !status.is_success() {
            return Err(IndexError::Rejected {
                document_id: document.id,
                status: status.as_u16(),
            });
        }

        tracing::debug!("customer indexed");
        Ok(())
    }
}
