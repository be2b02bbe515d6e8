//! PostgreSQL integration tests
//!
//! These tests use a shared PostgreSQL container for efficiency.
//! Run with:
//!
//! ```bash
//! cargo test -p store --test postgres_integration
//! ```

use std::sync::Arc;

use chrono::{TimeZone, Utc};
use common::CustomerId;
use domain::{
    Customer, CustomerRegistered, CustomerRepository, DeadLetterRecord, DeadLetterSink, Email,
    PhoneNumber, RepositoryError,
};
use serial_test::serial;
use sqlx::{PgPool, Row};
use store::{PostgresCustomerRepository, PostgresDeadLetterSink};
use testcontainers::{ContainerAsync, runners::AsyncRunner};
use testcontainers_modules::postgres::Postgres;
use tokio::sync::OnceCell;

/// Shared container info - container stays alive for all tests
struct ContainerInfo {
    #[allow(dead_code)] // Container must stay alive for tests
    container: ContainerAsync<Postgres>,
    connection_string: String,
}

static CONTAINER: OnceCell<Arc<ContainerInfo>> = OnceCell::const_new();

async fn get_container_info() -> Arc<ContainerInfo> {
    CONTAINER
        .get_or_init(|| async {
            let container = Postgres::default().start().await.unwrap();

            let host = container.get_host().await.unwrap();
            let port = container.get_host_port_ipv4(5432).await.unwrap();

            let connection_string =
                format!("postgres://postgres:postgres@{}:{}/postgres", host, port);

            let temp_pool = PgPool::connect(&connection_string).await.unwrap();
            store::run_migrations(&temp_pool).await.unwrap();
            temp_pool.close().await;

            Arc::new(ContainerInfo {
                container,
                connection_string,
            })
        })
        .await
        .clone()
}

/// Get a fresh pool with cleared tables
async fn get_test_pool() -> PgPool {
    let info = get_container_info().await;

    let pool = store::connect(&info.connection_string, 5).await.unwrap();

    sqlx::query("TRUNCATE TABLE customers, customer_event_dead_letters")
        .execute(&pool)
        .await
        .unwrap();

    pool
}

fn customer(email: &str) -> Customer {
    Customer::register(
        "John Doe",
        Email::new(email).unwrap(),
        PhoneNumber::new("+1234567890").unwrap(),
        Utc.with_ymd_and_hms(1990, 5, 10, 0, 0, 0).unwrap(),
    )
    .unwrap()
}

#[tokio::test]
#[serial]
async fn save_and_get_round_trips_all_fields() {
    let repo = PostgresCustomerRepository::new(get_test_pool().await);
    let mut john = customer("john@example.com");
    john.update_full_name("John Q. Doe");

    repo.save(&john).await.unwrap();
    let loaded = repo.get_by_id(john.id()).await.unwrap();

    assert_eq!(loaded.id(), john.id());
    assert_eq!(loaded.email(), john.email());
    assert_eq!(loaded.full_name(), "John Q. Doe");
    assert_eq!(loaded.phone_number(), john.phone_number());
    assert_eq!(loaded.birth_date(), john.birth_date());
    assert_eq!(loaded.version(), 2);
    // postgres keeps microseconds
    assert_eq!(
        loaded.created_at().timestamp_micros(),
        john.created_at().timestamp_micros()
    );
}

#[tokio::test]
#[serial]
async fn exists_by_email() {
    let repo = PostgresCustomerRepository::new(get_test_pool().await);
    let john = customer("john@example.com");

    assert!(!repo.exists_by_email(john.email()).await.unwrap());
    repo.save(&john).await.unwrap();
    assert!(repo.exists_by_email(john.email()).await.unwrap());
}

#[tokio::test]
#[serial]
async fn get_missing_is_not_found() {
    let repo = PostgresCustomerRepository::new(get_test_pool().await);
    let id = CustomerId::new();

    let result = repo.get_by_id(id).await;

    assert!(matches!(result, Err(RepositoryError::NotFound(missing)) if missing == id));
}

#[tokio::test]
#[serial]
async fn unique_email_violation_is_duplicate_email() {
    let repo = PostgresCustomerRepository::new(get_test_pool().await);
    repo.save(&customer("john@example.com")).await.unwrap();

    let result = repo.save(&customer("john@example.com")).await;

    assert!(
        matches!(result, Err(RepositoryError::DuplicateEmail(ref email)) if email == "john@example.com")
    );
}

#[tokio::test]
#[serial]
async fn closed_pool_is_storage_error() {
    let pool = get_test_pool().await;
    let repo = PostgresCustomerRepository::new(pool.clone());
    pool.close().await;

    let result = repo.exists_by_email(&Email::new("a@b.co").unwrap()).await;

    assert!(matches!(result, Err(RepositoryError::Storage(_))));
}

#[tokio::test]
#[serial]
async fn dead_letter_record_is_stored() {
    let pool = get_test_pool().await;
    let sink = PostgresDeadLetterSink::new(pool.clone());
    let event = CustomerRegistered::new(
        &customer("john@example.com"),
        Utc.with_ymd_and_hms(2024, 1, 10, 12, 0, 0).unwrap(),
    );
    let payload = event.to_payload().unwrap();
    let record = DeadLetterRecord::capture(
        event.clone(),
        payload.clone(),
        &"Message production error: MessageTimedOut",
        Utc::now(),
    );

    sink.save_customer_event(record).await.unwrap();

    let row = sqlx::query(
        "SELECT customer_id, event, payload, error FROM customer_event_dead_letters",
    )
    .fetch_one(&pool)
    .await
    .unwrap();
    assert_eq!(row.get::<String, _>("customer_id"), event.customer_id);
    assert_eq!(row.get::<Vec<u8>, _>("payload"), payload);
    assert!(row.get::<String, _>("error").contains("MessageTimedOut"));

    let stored: CustomerRegistered =
        serde_json::from_value(row.get::<serde_json::Value, _>("event")).unwrap();
    assert_eq!(stored, event);
}
