//! HTTP transport for the customer service.
//!
//! Exposes customer registration and lookup over REST, with structured
//! logging (tracing) and Prometheus metrics.

pub mod config;
pub mod error;
pub mod routes;
pub mod telemetry;

use std::sync::Arc;

use axum::Router;
use axum::routing::{get, post};
use domain::{CustomerRepository, CustomerSearchIndexer, DomainEventPublisher};
use metrics_exporter_prometheus::PrometheusHandle;
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

pub use routes::customers::AppState;

/// Creates the Axum application router with all routes and shared state.
pub fn create_app<R, I, P>(
    state: Arc<AppState<R, I, P>>,
    service_name: impl Into<String>,
    metrics_handle: PrometheusHandle,
) -> Router
where
    R: CustomerRepository + 'static,
    I: CustomerSearchIndexer + 'static,
    P: DomainEventPublisher + 'static,
{
    let metrics_router = Router::new()
        .route("/metrics", get(routes::metrics::get))
        .with_state(metrics_handle);

    let health_router = Router::new()
        .route("/health", get(routes::health::check))
        .with_state(service_name.into());

    Router::new()
        .route("/customers", post(routes::customers::register::<R, I, P>))
        .route("/customers/{id}", get(routes::customers::get::<R, I, P>))
        .route_layer(axum::middleware::from_fn(telemetry::track_http_metrics))
        .with_state(state)
        .merge(health_router)
        .merge(metrics_router)
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .layer(TraceLayer::new_for_http())
}
