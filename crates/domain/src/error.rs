//! Domain error types.

use common::ContextError;
use thiserror::Error;

use crate::customer::ValidationError;
use crate::ports::{PublishError, RepositoryError};

/// Errors returned by the customer command and query handlers.
#[derive(Debug, Error)]
pub enum DomainError {
    /// The input was rejected before any side effect.
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// Another customer already uses this email.
    #[error("email already registered: {email}")]
    DuplicateEmail { email: String },

    /// No customer with this id.
    #[error("customer not found: {id}")]
    NotFound { id: String },

    /// The repository failed.
    #[error("repository error: {0}")]
    Repository(#[source] RepositoryError),

    /// The customer was stored but the registration event was not delivered.
    #[error("publish customer registered: {0}")]
    EventPublish(#[source] PublishError),

    /// The caller cancelled the request or its deadline passed.
    #[error("request aborted: {0}")]
    Aborted(#[from] ContextError),
}

/// Coarse classification used by transports to pick a response.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorKind {
    Validation,
    Conflict,
    NotFound,
    Dependency,
    Aborted,
}

impl DomainError {
    pub fn kind(&self) -> ErrorKind {
        match self {
            DomainError::Validation(_) => ErrorKind::Validation,
            DomainError::DuplicateEmail { .. } => ErrorKind::Conflict,
            DomainError::NotFound { .. } => ErrorKind::NotFound,
            DomainError::Repository(_) | DomainError::EventPublish(_) => ErrorKind::Dependency,
            DomainError::Aborted(_) => ErrorKind::Aborted,
        }
    }
}

impl From<RepositoryError> for DomainError {
    fn from(e: RepositoryError) -> Self {
        match e {
            RepositoryError::DuplicateEmail(email) => DomainError::DuplicateEmail { email },
            RepositoryError::NotFound(id) => DomainError::NotFound { id: id.to_string() },
            other => DomainError::Repository(other),
        }
    }
}

impl From<PublishError> for DomainError {
    fn from(e: PublishError) -> Self {
        DomainError::EventPublish(e)
    }
}
