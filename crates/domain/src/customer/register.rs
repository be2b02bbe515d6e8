//! The registration command pipeline.

use std::sync::Arc;
use std::time::Instant;

use common::{Clock, RequestContext, SystemClock};

use super::{Customer, CustomerRegistered, Email, PhoneNumber, RegisterCustomer, ValidationError};
use crate::error::DomainError;
use crate::ports::{CustomerRepository, CustomerSearchIndexer, DomainEventPublisher};

/// Runs [`RegisterCustomer`] commands against the customer ports.
///
/// Steps run strictly in order and stop at the first failure:
/// validate email, phone and birth date; check email uniqueness; build the
/// aggregate; persist; index (failure only logged); publish
/// `CustomerRegistered` (failure returned after dead-lettering).
pub struct RegisterCustomerHandler<R, I, P>
where
    R: CustomerRepository,
    I: CustomerSearchIndexer,
    P: DomainEventPublisher,
{
    repository: R,
    indexer: I,
    publisher: P,
    clock: Arc<dyn Clock>,
}

impl<R, I, P> RegisterCustomerHandler<R, I, P>
where
    R: CustomerRepository,
    I: CustomerSearchIndexer,
    P: DomainEventPublisher,
{
    /// Creates a handler that reads the wall clock.
    pub fn new(repository: R, indexer: I, publisher: P) -> Self {
        Self {
            repository,
            indexer,
            publisher,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replaces the clock used for the birth-date check and event time.
    pub fn with_clock(mut self, clock: impl Clock + 'static) -> Self {
        self.clock = Arc::new(clock);
        self
    }

    /// Registers a customer and returns its id as a hyphenated UUID string.
    #[tracing::instrument(skip(self, ctx, cmd))]
    pub async fn handle(
        &self,
        ctx: &RequestContext,
        cmd: RegisterCustomer,
    ) -> Result<String, DomainError> {
        let start = Instant::now();
        let result = self.register(ctx, cmd).await;

        let outcome = match &result {
            Ok(_) => "registered",
            Err(DomainError::Validation(_) | DomainError::DuplicateEmail { .. }) => "rejected",
            Err(_) => "failed",
        };
        metrics::counter!("customer_registrations_total", "outcome" => outcome).increment(1);
        metrics::histogram!("customer_registration_duration_seconds")
            .record(start.elapsed().as_secs_f64());

        result
    }

    async fn register(
        &self,
        ctx: &RequestContext,
        cmd: RegisterCustomer,
    ) -> Result<String, DomainError> {
        ctx.check()?;

        let email = Email::new(cmd.email)?;
        let phone_number = PhoneNumber::new(&cmd.phone_number)?;
        if cmd.birth_date > self.clock.now() {
            return Err(ValidationError::InvalidBirthDate.into());
        }

        if ctx
            .run(self.repository.exists_by_email(&email))
            .await?
            .map_err(DomainError::Repository)?
        {
            return Err(DomainError::DuplicateEmail {
                email: email.into_inner(),
            });
        }

        let customer = Customer::register(cmd.full_name, email, phone_number, cmd.birth_date)?;
        let customer_id = customer.id().to_string();

        // a unique-constraint race surfaces here as DuplicateEmail
        ctx.run(self.repository.save(&customer)).await??;

        if let Err(err) = ctx.run(self.indexer.index(&customer)).await? {
            metrics::counter!("customer_index_failures_total").increment(1);
            tracing::warn!(
                customer_id = %customer_id,
                error = %err,
                "failed to index customer in search backend"
            );
        }

        let event = CustomerRegistered::new(&customer, self.clock.now());
        ctx.run(self.publisher.publish_customer_registered(&event))
            .await??;

        tracing::info!(customer_id = %customer_id, "customer registered");
        Ok(customer_id)
    }
}
