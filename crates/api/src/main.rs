//! Customer service entry point.

use std::sync::Arc;
use std::time::Duration;

use api::AppState;
use api::config::Config;
use domain::{GetCustomerHandler, RegisterCustomerHandler, TopicPublisher};
use messaging::{KafkaConfig, KafkaTransport};
use search::OpenSearchIndexer;
use store::{PostgresCustomerRepository, PostgresDeadLetterSink};
use tokio::signal;

const KAFKA_FLUSH_TIMEOUT: Duration = Duration::from_secs(5);

/// Waits for a shutdown signal (SIGINT or SIGTERM).
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install SIGINT handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install SIGTERM handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {
            tracing::info!("received SIGINT, starting graceful shutdown");
        }
        () = terminate => {
            tracing::info!("received SIGTERM, starting graceful shutdown");
        }
    }
}

#[tokio::main]
async fn main() {
    let config = Config::from_env();

    // 1. Initialize tracing
    api::telemetry::init_tracing(&config);

    // 2. Install Prometheus metrics recorder
    let metrics_handle = metrics_exporter_prometheus::PrometheusBuilder::new()
        .install_recorder()
        .expect("failed to install Prometheus recorder");
    api::telemetry::describe_metrics();

    // 3. Connect to Postgres and migrate
    let pool = store::connect(&config.database_url, config.database_max_connections)
        .await
        .expect("failed to connect to Postgres");
    store::run_migrations(&pool)
        .await
        .expect("failed to run migrations");

    // 4. Kafka producer
    let kafka = KafkaTransport::new(
        &KafkaConfig::new(&config.kafka_brokers)
            .with_client_id(&config.service_name)
            .with_send_timeout(config.kafka_send_timeout),
    )
    .expect("failed to create Kafka producer");

    // 5. Search client
    let indexer = OpenSearchIndexer::new(
        &config.search_endpoint,
        &config.search_index,
        config.request_timeout,
    )
    .expect("failed to build search client");

    // 6. Handlers
    let publisher = TopicPublisher::new(
        kafka.clone(),
        PostgresDeadLetterSink::new(pool.clone()),
        &config.kafka_customer_topic,
    );
    let state = Arc::new(AppState {
        register: RegisterCustomerHandler::new(
            PostgresCustomerRepository::new(pool.clone()),
            indexer,
            publisher,
        ),
        query: GetCustomerHandler::new(PostgresCustomerRepository::new(pool.clone())),
        request_timeout: config.request_timeout,
    });

    // 7. Build the application
    let app = api::create_app(state, &config.service_name, metrics_handle);

    // 8. Start server
    let addr = config.addr();
    tracing::info!(%addr, service = %config.service_name, "starting customer service");

    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("failed to bind address");
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .expect("server error");

    // 9. Drain outgoing events, then release connections
    if let Err(e) = kafka.flush(KAFKA_FLUSH_TIMEOUT) {
        tracing::warn!(error = %e, "failed to flush Kafka producer");
    }
    pool.close().await;

    tracing::info!("server shut down gracefully");
}
