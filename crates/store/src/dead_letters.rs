use async_trait::async_trait;
use domain::{DeadLetterError, DeadLetterRecord, DeadLetterSink};
use sqlx::PgPool;

use crate::StoreError;

/// Dead-letter sink writing to the `customer_event_dead_letters` table.
#[derive(Clone)]
pub struct PostgresDeadLetterSink {
    pool: PgPool,
}

impl PostgresDeadLetterSink {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn insert(&self, record: &DeadLetterRecord) -> Result<(), StoreError> {
        let event = serde_json::to_value(&record.event)?;

        sqlx::query(
            r#"
            INSERT INTO customer_event_dead_letters (customer_id, event, payload, error, created_at)
            VALUES ($1, $2, $3, $4, $5)
            "#,
        )
        .bind(&record.event.customer_id)
        .bind(event)
        .bind(&record.payload)
        .bind(&record.error)
        .bind(record.created_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

#[async_trait]
impl DeadLetterSink for PostgresDeadLetterSink {
    #[tracing::instrument(skip(self, record), fields(customer_id = %record.event.customer_id))]
    async fn save_customer_event(&self, record: DeadLetterRecord) -> Result<(), DeadLetterError> {
        self.insert(&record).await.map_err(DeadLetterError::new)
    }
}
