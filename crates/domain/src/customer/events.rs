//! Customer domain events.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::Customer;

/// A customer finished registration.
///
/// `occurred_at` is when the event was raised, which is not necessarily the
/// aggregate's `created_at`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerRegistered {
    pub customer_id: String,
    pub email: String,
    pub full_name: String,
    pub occurred_at: DateTime<Utc>,
}

impl CustomerRegistered {
    pub fn new(customer: &Customer, occurred_at: DateTime<Utc>) -> Self {
        Self {
            customer_id: customer.id().to_string(),
            email: customer.email().to_string(),
            full_name: customer.full_name().to_string(),
            occurred_at,
        }
    }

    /// Serializes the event into the JSON bytes sent to the bus.
    pub fn to_payload(&self) -> Result<Vec<u8>, serde_json::Error> {
        serde_json::to_vec(self)
    }
}

/// A `CustomerRegistered` event that could not be delivered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DeadLetterRecord {
    pub event: CustomerRegistered,

    /// The exact bytes that failed to send.
    pub payload: Vec<u8>,

    /// Rendered send error.
    pub error: String,

    pub created_at: DateTime<Utc>,
}

impl DeadLetterRecord {
    pub fn capture(
        event: CustomerRegistered,
        payload: Vec<u8>,
        error: &impl std::fmt::Display,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            event,
            payload,
            error: error.to_string(),
            created_at,
        }
    }
}
