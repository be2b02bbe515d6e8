//! Customer persistence contract and in-memory implementation.

use std::collections::HashMap;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};

use async_trait::async_trait;
use common::CustomerId;
use thiserror::Error;
use tokio::sync::RwLock;

use super::BoxError;
use crate::customer::{Customer, Email};

/// Errors reported by a customer repository.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// No customer with this id.
    #[error("customer not found: {0}")]
    NotFound(CustomerId),

    /// The store's uniqueness constraint on email rejected a write.
    #[error("email already registered: {0}")]
    DuplicateEmail(String),

    /// The backing store failed.
    #[error("storage failure: {0}")]
    Storage(#[source] BoxError),
}

impl RepositoryError {
    pub fn storage(err: impl Into<BoxError>) -> Self {
        Self::Storage(err.into())
    }
}

/// Persistence contract for customer aggregates.
#[async_trait]
pub trait CustomerRepository: Send + Sync {
    /// Returns true if any customer already uses this email.
    async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError>;

    /// Inserts a new customer.
    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError>;

    /// Loads a customer, or `NotFound`.
    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError>;
}

/// In-memory customer repository for testing.
///
/// Enforces email uniqueness on `save` the way the database constraint does,
/// counts every call, and can be switched into failure mode per operation.
#[derive(Debug, Clone, Default)]
pub struct InMemoryCustomerRepository {
    customers: Arc<RwLock<HashMap<CustomerId, Customer>>>,
    calls: Arc<AtomicUsize>,
    fail_on_exists: Arc<AtomicBool>,
    fail_on_save: Arc<AtomicBool>,
    fail_on_get: Arc<AtomicBool>,
}

impl InMemoryCustomerRepository {
    /// Creates a new empty repository.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn set_fail_on_exists(&self, fail: bool) {
        self.fail_on_exists.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_save(&self, fail: bool) {
        self.fail_on_save.store(fail, Ordering::SeqCst);
    }

    pub fn set_fail_on_get(&self, fail: bool) {
        self.fail_on_get.store(fail, Ordering::SeqCst);
    }

    /// Total number of port calls received.
    pub fn call_count(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }

    /// Returns the number of stored customers.
    pub async fn customer_count(&self) -> usize {
        self.customers.read().await.len()
    }

    /// Returns a stored customer without counting it as a port call.
    pub async fn find(&self, id: CustomerId) -> Option<Customer> {
        self.customers.read().await.get(&id).cloned()
    }

    fn record_call(&self) {
        self.calls.fetch_add(1, Ordering::SeqCst);
    }
}

#[async_trait]
impl CustomerRepository for InMemoryCustomerRepository {
    async fn exists_by_email(&self, email: &Email) -> Result<bool, RepositoryError> {
        self.record_call();
        if self.fail_on_exists.load(Ordering::SeqCst) {
            return Err(RepositoryError::storage("connection refused"));
        }

        let customers = self.customers.read().await;
        Ok(customers.values().any(|c| c.email() == email))
    }

    async fn save(&self, customer: &Customer) -> Result<(), RepositoryError> {
        self.record_call();
        if self.fail_on_save.load(Ordering::SeqCst) {
            return Err(RepositoryError::storage("connection refused"));
        }

        let mut customers = self.customers.write().await;
        if customers.values().any(|c| c.email() == customer.email()) {
            return Err(RepositoryError::DuplicateEmail(customer.email().to_string()));
        }
        customers.insert(customer.id(), customer.clone());
        Ok(())
    }

    async fn get_by_id(&self, id: CustomerId) -> Result<Customer, RepositoryError> {
        self.record_call();
        if self.fail_on_get.load(Ordering::SeqCst) {
            return Err(RepositoryError::storage("connection refused"));
        }

        self.customers
            .read()
            .await
            .get(&id)
            .cloned()
            .ok_or(RepositoryError::NotFound(id))
    }
}
