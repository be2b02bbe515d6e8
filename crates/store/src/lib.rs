//! PostgreSQL adapters for the customer service.
//!
//! [`PostgresCustomerRepository`] backs the `customers` table, whose
//! `customers_email_key` constraint is the final guard on email uniqueness.
//! [`PostgresDeadLetterSink`] writes undeliverable events to
//! `customer_event_dead_letters`.

pub mod customers;
pub mod dead_letters;
pub mod error;

pub use customers::PostgresCustomerRepository;
pub use dead_letters::PostgresDeadLetterSink;
pub use error::{Result, StoreError};

use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;

/// Opens a connection pool.
pub async fn connect(database_url: &str, max_connections: u32) -> Result<PgPool> {
    let pool = PgPoolOptions::new()
        .max_connections(max_connections)
        .connect(database_url)
        .await?;
    Ok(pool)
}

/// Runs the database migrations.
pub async fn run_migrations(pool: &PgPool) -> Result<()> {
    sqlx::migrate!("../../migrations").run(pool).await?;
    Ok(())
}
