//! Capability contracts the customer pipeline depends on, each with an
//! in-memory implementation for tests and local runs.

pub mod dead_letter;
pub mod publisher;
pub mod repository;
pub mod search;

pub use dead_letter::{DeadLetterError, DeadLetterSink, InMemoryDeadLetterSink};
pub use publisher::{
    DomainEventPublisher, EventTransport, InMemoryEventBus, PublishError, PublishedMessage,
    TopicPublisher,
};
pub use repository::{CustomerRepository, InMemoryCustomerRepository, RepositoryError};
pub use search::{CustomerSearchIndexer, InMemorySearchIndexer, IndexError, SearchDocument};

/// Type-erased adapter error, kept as the `source` of port errors.
pub type BoxError = Box<dyn std::error::Error + Send + Sync + 'static>;
