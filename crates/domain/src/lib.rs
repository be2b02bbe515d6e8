//! Domain layer for the customer service.
//!
//! This crate provides:
//! - The `Customer` aggregate and its `Email`/`PhoneNumber` value objects
//! - Port traits for persistence, search indexing, event publication and
//!   dead-letter capture, each with an in-memory implementation
//! - `RegisterCustomerHandler` and `GetCustomerHandler`

pub mod customer;
pub mod error;
pub mod ports;

pub use customer::{
    Customer, CustomerDto, CustomerRegistered, DeadLetterRecord, Email, GetCustomerHandler,
    PhoneNumber, RegisterCustomer, RegisterCustomerHandler, ValidationError,
};
pub use error::{DomainError, ErrorKind};
pub use ports::{
    BoxError, CustomerRepository, CustomerSearchIndexer, DeadLetterError, DeadLetterSink,
    DomainEventPublisher, EventTransport, InMemoryCustomerRepository, InMemoryDeadLetterSink,
    InMemoryEventBus, InMemorySearchIndexer, IndexError, PublishError, PublishedMessage,
    RepositoryError, SearchDocument, TopicPublisher,
};
