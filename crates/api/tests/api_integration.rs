//! Integration tests for the API server.

use std::sync::{Arc, OnceLock};
use std::time::Duration;

use axum::body::Body;
use axum::http::{Request, StatusCode};
use domain::{
    GetCustomerHandler, InMemoryCustomerRepository, InMemoryDeadLetterSink, InMemoryEventBus,
    InMemorySearchIndexer, RegisterCustomerHandler, TopicPublisher,
};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::{Value, json};
use tower::ServiceExt;

static METRICS_HANDLE: OnceLock<PrometheusHandle> = OnceLock::new();

fn get_metrics_handle() -> PrometheusHandle {
    METRICS_HANDLE
        .get_or_init(|| {
            let builder = metrics_exporter_prometheus::PrometheusBuilder::new();
            builder
                .install_recorder()
                .expect("failed to install Prometheus recorder")
        })
        .clone()
}

/// In-memory ports behind the router, kept for inspection.
struct Doubles {
    repo: InMemoryCustomerRepository,
    bus: InMemoryEventBus,
    dead_letters: InMemoryDeadLetterSink,
}

fn setup() -> (axum::Router, Doubles) {
    let repo = InMemoryCustomerRepository::new();
    let bus = InMemoryEventBus::new();
    let dead_letters = InMemoryDeadLetterSink::new();
    let publisher = TopicPublisher::new(bus.clone(), dead_letters.clone(), "customer.registered");

    let state = Arc::new(api::AppState {
        register: RegisterCustomerHandler::new(
            repo.clone(),
            InMemorySearchIndexer::new(),
            publisher,
        ),
        query: GetCustomerHandler::new(repo.clone()),
        request_timeout: Duration::from_secs(5),
    });
    let app = api::create_app(state, "customer-service", get_metrics_handle());

    (
        app,
        Doubles {
            repo,
            bus,
            dead_letters,
        },
    )
}

fn post_customer(body: Value) -> Request<Body> {
    Request::builder()
        .method("POST")
        .uri("/customers")
        .header("content-type", "application/json")
        .body(Body::from(serde_json::to_string(&body).unwrap()))
        .unwrap()
}

fn john() -> Value {
    json!({
        "full_name": "John Doe",
        "email": "john@example.com",
        "phone_number": "+1234567890",
        "birth_date": "1990-05-10"
    })
}

async fn body_json(response: axum::response::Response) -> Value {
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&body).unwrap()
}

#[tokio::test]
async fn test_health_check() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/health")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let json = body_json(response).await;
    assert_eq!(json["status"], "ok");
    assert_eq!(json["service"], "customer-service");
}

#[tokio::test]
async fn test_register_customer() {
    let (app, doubles) = setup();

    let response = app.oneshot(post_customer(john())).await.unwrap();

    assert_eq!(response.status(), StatusCode::CREATED);
    let json = body_json(response).await;
    let id = json["id"].as_str().unwrap();
    assert!(common::CustomerId::parse(id).is_ok());
    assert_eq!(doubles.repo.customer_count().await, 1);
    assert_eq!(doubles.bus.messages().await.len(), 1);
}

#[tokio::test]
async fn test_register_and_get_customer() {
    let (app, _) = setup();

    let created = app.clone().oneshot(post_customer(john())).await.unwrap();
    let id = body_json(created).await["id"].as_str().unwrap().to_string();

    let response = app
        .oneshot(
            Request::builder()
                .uri(format!("/customers/{id}"))
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let customer = body_json(response).await;
    assert_eq!(customer["id"], id.as_str());
    assert_eq!(customer["full_name"], "John Doe");
    assert_eq!(customer["email"], "john@example.com");
    assert_eq!(customer["phone_number"], "+1234567890");
}

#[tokio::test]
async fn test_invalid_email_is_bad_request() {
    let (app, doubles) = setup();
    let mut body = john();
    body["email"] = json!("broken");

    let response = app.oneshot(post_customer(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert_eq!(body_json(response).await["error"], "invalid email format");
    assert_eq!(doubles.repo.call_count(), 0);
}

#[tokio::test]
async fn test_invalid_birth_date_is_bad_request() {
    let (app, _) = setup();
    let mut body = john();
    body["birth_date"] = json!("yesterday");

    let response = app.oneshot(post_customer(body)).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(
        body_json(response).await["error"]
            .as_str()
            .unwrap()
            .contains("birth_date")
    );
}

#[tokio::test]
async fn test_malformed_json_is_bad_request() {
    let (app, _) = setup();

    let response = app
        .oneshot(
            Request::builder()
                .method("POST")
                .uri("/customers")
                .header("content-type", "application/json")
                .body(Body::from("{\"full_name\":"))
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::BAD_REQUEST);
    assert!(body_json(response).await["error"].is_string());
}

#[tokio::test]
async fn test_duplicate_email_is_conflict() {
    let (app, _) = setup();

    let first = app.clone().oneshot(post_customer(john())).await.unwrap();
    assert_eq!(first.status(), StatusCode::CREATED);

    let second = app.oneshot(post_customer(john())).await.unwrap();
    assert_eq!(second.status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn test_publish_failure_is_bad_gateway() {
    let (app, doubles) = setup();
    doubles.bus.set_fail_on_send(true);

    let response = app.oneshot(post_customer(john())).await.unwrap();

    assert_eq!(response.status(), StatusCode::BAD_GATEWAY);
    assert_eq!(doubles.repo.customer_count().await, 1);
    assert_eq!(doubles.dead_letters.records().await.len(), 1);
}

#[tokio::test]
async fn test_get_unknown_customer_is_not_found() {
    let (app, _) = setup();

    for id in [common::CustomerId::new().to_string(), "not-a-uuid".to_string()] {
        let response = app
            .clone()
            .oneshot(
                Request::builder()
                    .uri(format!("/customers/{id}"))
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }
}

#[tokio::test]
async fn test_metrics_endpoint() {
    let (app, _) = setup();

    app.clone().oneshot(post_customer(john())).await.unwrap();

    let response = app
        .oneshot(
            Request::builder()
                .uri("/metrics")
                .body(Body::empty())
                .unwrap(),
        )
        .await
        .unwrap();

    assert_eq!(response.status(), StatusCode::OK);
    let body = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    let text = String::from_utf8(body.to_vec()).unwrap();
    assert!(text.contains("http_requests_total"));
    assert!(text.contains("customer_registrations_total"));
}
