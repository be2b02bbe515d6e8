//! Customer registration and lookup endpoints.

use std::sync::Arc;
use std::time::Duration;

use axum::Json;
use axum::extract::rejection::JsonRejection;
use axum::extract::{Path, State};
use axum::http::StatusCode;
use chrono::{DateTime, NaiveDate, Utc};
use common::RequestContext;
use domain::{
    CustomerDto, CustomerRepository, CustomerSearchIndexer, DomainEventPublisher,
    GetCustomerHandler, RegisterCustomer, RegisterCustomerHandler,
};
use serde::{Deserialize, Serialize};

use crate::error::ApiError;

/// Shared application state accessible from all customer handlers.
pub struct AppState<R, I, P>
where
    R: CustomerRepository,
    I: CustomerSearchIndexer,
    P: DomainEventPublisher,
{
    pub register: RegisterCustomerHandler<R, I, P>,
    pub query: GetCustomerHandler<R>,
    /// Deadline put on every request's context.
    pub request_timeout: Duration,
}

impl<R, I, P> AppState<R, I, P>
where
    R: CustomerRepository,
    I: CustomerSearchIndexer,
    P: DomainEventPublisher,
{
    fn context(&self) -> RequestContext {
        RequestContext::background().timeout(self.request_timeout)
    }
}

// -- Request types --

#[derive(Deserialize)]
pub struct RegisterCustomerRequest {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    /// RFC 3339 timestamp or `YYYY-MM-DD`.
    pub birth_date: String,
}

// -- Response types --

#[derive(Serialize)]
pub struct CustomerCreatedResponse {
    pub id: String,
}

// -- Handlers --

/// POST /customers — register a new customer.
#[tracing::instrument(skip(state, req))]
pub async fn register<R, I, P>(
    State(state): State<Arc<AppState<R, I, P>>>,
    req: Result<Json<RegisterCustomerRequest>, JsonRejection>,
) -> Result<(StatusCode, Json<CustomerCreatedResponse>), ApiError>
where
    R: CustomerRepository + 'static,
    I: CustomerSearchIndexer + 'static,
    P: DomainEventPublisher + 'static,
{
    let Json(req) = req.map_err(|e| ApiError::BadRequest(e.body_text()))?;
    let birth_date = parse_birth_date(&req.birth_date)?;

    let cmd = RegisterCustomer::new(req.full_name, req.email, req.phone_number, birth_date);
    let id = state.register.handle(&state.context(), cmd).await?;

    Ok((StatusCode::CREATED, Json(CustomerCreatedResponse { id })))
}

/// GET /customers/{id} — load a customer by id.
#[tracing::instrument(skip(state))]
pub async fn get<R, I, P>(
    State(state): State<Arc<AppState<R, I, P>>>,
    Path(id): Path<String>,
) -> Result<Json<CustomerDto>, ApiError>
where
    R: CustomerRepository + 'static,
    I: CustomerSearchIndexer + 'static,
    P: DomainEventPublisher + 'static,
{
    let customer = state.query.handle(&state.context(), &id).await?;
    Ok(Json(customer))
}

// -- Helpers --

/// Accepts a full RFC 3339 timestamp or a bare date at midnight UTC.
fn parse_birth_date(raw: &str) -> Result<DateTime<Utc>, ApiError> {
    if let Ok(ts) = DateTime::parse_from_rfc3339(raw) {
        return Ok(ts.with_timezone(&Utc));
    }

    NaiveDate::parse_from_str(raw, "%Y-%m-%d")
        .ok()
        .and_then(|date| date.and_hms_opt(0, 0, 0))
        .map(|midnight| midnight.and_utc())
        .ok_or_else(|| ApiError::BadRequest(format!("Invalid birth_date: {raw}")))
}
