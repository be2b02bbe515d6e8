//! Customer aggregate implementation.

use chrono::{DateTime, Utc};
use common::CustomerId;

use super::{Email, PhoneNumber, ValidationError};

/// Customer aggregate root.
///
/// Every field change goes through [`Customer::touch`], which moves
/// `updated_at` forward and bumps `version` in the same step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Customer {
    id: CustomerId,
    email: Email,
    full_name: String,
    phone_number: PhoneNumber,
    birth_date: DateTime<Utc>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
    /// Starts at 1, incremented on every mutation.
    version: i64,
}

impl Customer {
    /// Creates a newly registered customer with a fresh id.
    ///
    /// The birth date is taken as given; comparing it with the current time
    /// is the caller's job.
    pub fn register(
        full_name: impl Into<String>,
        email: Email,
        phone_number: PhoneNumber,
        birth_date: DateTime<Utc>,
    ) -> Result<Self, ValidationError> {
        let full_name = full_name.into();
        if full_name.is_empty() {
            return Err(ValidationError::EmptyFullName);
        }

        let now = Utc::now();
        Ok(Self {
            id: CustomerId::new(),
            email,
            full_name,
            phone_number,
            birth_date,
            created_at: now,
            updated_at: now,
            version: 1,
        })
    }

    /// Restores a customer from trusted storage without re-validating.
    #[allow(clippy::too_many_arguments)]
    pub fn rehydrate(
        id: CustomerId,
        email: Email,
        full_name: String,
        phone_number: PhoneNumber,
        birth_date: DateTime<Utc>,
        created_at: DateTime<Utc>,
        updated_at: DateTime<Utc>,
        version: i64,
    ) -> Self {
        Self {
            id,
            email,
            full_name,
            phone_number,
            birth_date,
            created_at,
            updated_at,
            version,
        }
    }

    pub fn update_email(&mut self, email: Email) {
        self.email = email;
        self.touch();
    }

    pub fn update_phone_number(&mut self, phone_number: PhoneNumber) {
        self.phone_number = phone_number;
        self.touch();
    }

    /// Replaces the full name. An empty name is ignored.
    pub fn update_full_name(&mut self, full_name: impl Into<String>) {
        let full_name = full_name.into();
        if full_name.is_empty() {
            return;
        }
        self.full_name = full_name;
        self.touch();
    }

    fn touch(&mut self) {
        // never move backwards, even if the wall clock does
        self.updated_at = Utc::now().max(self.updated_at);
        self.version += 1;
    }
}

// Query methods
impl Customer {
    pub fn id(&self) -> CustomerId {
        self.id
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn full_name(&self) -> &str {
        &self.full_name
    }

    pub fn phone_number(&self) -> &PhoneNumber {
        &self.phone_number
    }

    pub fn birth_date(&self) -> DateTime<Utc> {
        self.birth_date
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }

    pub fn updated_at(&self) -> DateTime<Utc> {
        self.updated_at
    }

    pub fn version(&self) -> i64 {
        self.version
    }
}
