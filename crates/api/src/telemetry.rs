//! Tracing initialization and per-request HTTP metrics.

use std::time::Instant;

use axum::extract::{MatchedPath, Request};
use axum::middleware::Next;
use axum::response::Response;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;

use crate::config::{Config, LogFormat};

/// Installs the global tracing subscriber.
///
/// `RUST_LOG` directives win over `config.log_level`.
pub fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(&config.log_level))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let registry = tracing_subscriber::registry().with(filter);
    match config.log_format {
        LogFormat::Json => registry
            .with(tracing_subscriber::fmt::layer().json().with_target(false))
            .init(),
        LogFormat::Pretty => registry.with(tracing_subscriber::fmt::layer()).init(),
    }
}

/// Records `http_requests_total` and `http_request_duration_seconds`,
/// labelled by method, matched route and status.
pub async fn track_http_metrics(req: Request, next: Next) -> Response {
    let start = Instant::now();
    let path = match req.extensions().get::<MatchedPath>() {
        Some(matched) => matched.as_str().to_owned(),
        None => req.uri().path().to_owned(),
    };
    let method = req.method().to_string();

    let response = next.run(req).await;

    let latency = start.elapsed().as_secs_f64();
    let status = response.status().as_u16().to_string();
    let labels = [("method", method), ("path", path), ("status", status)];

    metrics::counter!("http_requests_total", &labels).increment(1);
    metrics::histogram!("http_request_duration_seconds", &labels).record(latency);

    response
}

/// Registers help text for the service's metrics.
pub fn describe_metrics() {
    metrics::describe_counter!(
        "customer_registrations_total",
        "Registration attempts by outcome (registered, rejected, failed)"
    );
    metrics::describe_histogram!(
        "customer_registration_duration_seconds",
        metrics::Unit::Seconds,
        "Time spent in the registration pipeline"
    );
    metrics::describe_counter!(
        "customer_index_failures_total",
        "Customers stored but not indexed"
    );
    metrics::describe_counter!(
        "customer_events_published_total",
        "CustomerRegistered events accepted by the bus"
    );
    metrics::describe_counter!(
        "customer_events_dead_lettered_total",
        "Undelivered events captured in the dead-letter store"
    );
    metrics::describe_counter!(
        "customer_dead_letter_failures_total",
        "Undelivered events the dead-letter store also rejected"
    );
    metrics::describe_counter!("http_requests_total", "HTTP requests served");
    metrics::describe_histogram!(
        "http_request_duration_seconds",
        metrics::Unit::Seconds,
        "HTTP request latency"
    );
}
