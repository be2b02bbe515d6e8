//! Customer aggregate, its registration pipeline and read path.

mod aggregate;
mod commands;
mod events;
mod query;
mod register;
mod value_objects;

pub use aggregate::Customer;
pub use commands::RegisterCustomer;
pub use events::{CustomerRegistered, DeadLetterRecord};
pub use query::{CustomerDto, GetCustomerHandler};
pub use register::RegisterCustomerHandler;
pub use value_objects::{Email, PhoneNumber};

use thiserror::Error;

/// Input that can be fixed by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum ValidationError {
    #[error("invalid email format")]
    InvalidEmail,

    #[error("invalid phone number")]
    InvalidPhone,

    #[error("full name must not be empty")]
    EmptyFullName,

    #[error("birth date must be in the past")]
    InvalidBirthDate,
}
