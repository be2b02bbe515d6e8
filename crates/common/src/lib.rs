//! Shared building blocks for the customer service workspace.
//!
//! - [`CustomerId`]: the aggregate identity
//! - [`Clock`]: injectable time source
//! - [`RequestContext`]: caller-supplied cancellation and deadline

pub mod clock;
pub mod context;
pub mod types;

pub use clock::{Clock, FixedClock, SystemClock};
pub use context::{CancelHandle, ContextError, RequestContext};
pub use types::CustomerId;
