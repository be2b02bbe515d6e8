//! Customer commands.

use chrono::{DateTime, Utc};

/// Command to register a new customer from raw, unvalidated input.
#[derive(Debug, Clone)]
pub struct RegisterCustomer {
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
    pub birth_date: DateTime<Utc>,
}

impl RegisterCustomer {
    /// Creates a new RegisterCustomer command.
    pub fn new(
        full_name: impl Into<String>,
        email: impl Into<String>,
        phone_number: impl Into<String>,
        birth_date: DateTime<Utc>,
    ) -> Self {
        Self {
            full_name: full_name.into(),
            email: email.into(),
            phone_number: phone_number.into(),
            birth_date,
        }
    }
}
