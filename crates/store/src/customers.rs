use async_trait::async_trait;
use chrono::{DateTime, Utc};
use common::CustomerId;
use domain::{Customer, CustomerRepository, Email, PhoneNumber, RepositoryError};
use sqlx::{PgPool, Row, postgres::PgRow};
use uuid::Uuid;

use crate::StoreError;

const EMAIL_UNIQUE_CONSTRAINT: &str = "customers_email_key";

/// PostgreSQL-backed customer repository.
#[derive(Clone)]
pub struct PostgresCustomerRepository {
    pool: PgPool,
}

impl PostgresCustomerRepository {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    fn row_to_customer(row: PgRow) -> Result<Customer, StoreError> {
        let id: Uuid = row.try_get("id")?;
        let corrupt = |reason: String| StoreError::CorruptRow { id, reason };

        let email = Email::new(row.try_get::<String, _>("email")?)
            .map_err(|e| corrupt(e.to_string()))?;
        let phone_number = PhoneNumber::new(row.try_get::<String, _>("phone_number")?)
            .map_err(|e| corrupt(e.to_string()))?;

        Ok(Customer::rehydrate(
            CustomerId::from_uuid(id),
            email,
            row.try_get("full_name")?,
            phone_number,
            row.try_get::<DateTime<Utc>, _>("birth_date")?,
            row.try_get("created_at")?,
            row.try_get("updated_at")?,
            row.try_get("version")?,
        ))
    }
}

fn storage(err: impl Into<StoreError>) -> RepositoryError {
    RepositoryError::storage(err.into())
}

#[async_trait]
impl CustomerRepository for PostgresCustomerRepository {
    async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        sqlx::query_scalar("SELECT EXISTS(SELECT 1 FROM customers WHERE email = $1)")
            .bind(email.as_str())
            .fetch_one(&self.pool)
            .await
            .map_err(storage)
    }

    #[tracing::instrument(skip(self, customer), fields(customer_id = %customer.id()))]
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        sqlx::query(
            r#"
            INSERT INTO customers (id, email, full_name, phone_number, birth_date, created_at, updated_at, version)
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8)
            "#,
        )
        .bind(customer.id().as_uuid())
        .bind(customer.email().as_str())
        .bind(customer.full_name())
        .bind(customer.phone_number().as_str())
        .bind(customer.birth_date())
        .bind(customer.created_at())
        .bind(customer.updated_at())
        .bind(customer.version())
        .execute(&self.pool)
        .await
        .map_err(|e| {
            if let sqlx::Error::Database(ref db_err) = e
                && db_err.constraint() == Some(EMAIL_UNIQUE_CONSTRAINT)
            {
                return RepositoryError::DuplicateEmail(customer.email().to_string());
            }
            storage(e)
        })?;

        Ok(())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        let row = sqlx::query(
            r#"
            SELECT id, email, full_name, phone_number, birth_date, created_at, updated_at, version
            FROM customers
            WHERE id = $1
            "#,
        )
        .bind(id.as_uuid())
        .fetch_optional(&self.pool)
        .await
        .map_err(storage)?;

        match row {
            Some(row) => Self::row_to_customer(row).map_err(storage),
            None => Err(RepositoryError::NotFound(id)),
        }
    }
}
