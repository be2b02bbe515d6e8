//! Customer read path.

use common::{CustomerId, RequestContext};
use serde::{Deserialize, Serialize};

use super::Customer;
use crate::error::DomainError;
use crate::ports::{CustomerRepository, RepositoryError};

/// Read model returned by [`GetCustomerHandler`].
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CustomerDto {
    pub id: String,
    pub full_name: String,
    pub email: String,
    pub phone_number: String,
}

impl From<&Customer> for CustomerDto {
    fn from(customer: &Customer) -> Self {
        Self {
            id: customer.id().to_string(),
            full_name: customer.full_name().to_string(),
            email: customer.email().to_string(),
            phone_number: customer.phone_number().to_string(),
        }
    }
}

/// Loads a single customer by id.
pub struct GetCustomerHandler<R: CustomerRepository> {
    repository: R,
}

impl<R: CustomerRepository> GetCustomerHandler<R> {
    pub fn new(repository: R) -> Self {
        Self { repository }
    }

    #[tracing::instrument(skip(self, ctx))]
    pub async fn handle(&self, ctx: &RequestContext, id: &str) -> Result<CustomerDto, DomainError> {
        ctx.check()?;

        // a malformed id cannot name a stored customer
        let Ok(customer_id) = CustomerId::parse(id) else {
            return Err(DomainError::NotFound { id: id.to_string() });
        };

        match ctx.run(self.repository.get_by_id(customer_id)).await? {
            Ok(customer) => Ok(CustomerDto::from(&customer)),
            Err(RepositoryError::NotFound(_)) => Err(DomainError::NotFound { id: id.to_string() }),
            Err(err) => Err(DomainError::Repository(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::customer::{Email, PhoneNumber};
    use crate::ports::InMemoryCustomerRepository;
    use chrono::{TimeZone, Utc};

    async fn seeded() -> (GetCustomerHandler<InMemoryCustomerRepository>, Customer) {
        let repo = InMemoryCustomerRepository::new();
        let customer = Customer::register(
            "Jane Roe",
            Email::new("jane@example.com").unwrap(),
            PhoneNumber::new(" (555) 123-4567 ").unwrap(),
            Utc.with_ymd_and_hms(1985, 2, 1, 0, 0, 0).unwrap(),
        )
        .unwrap();
        repo.save(&customer).await.unwrap();
        (GetCustomerHandler::new(repo), customer)
    }

    #[tokio::test]
    async fn test_get_existing_customer() {
        let (handler, customer) = seeded().await;

        let dto = handler
            .handle(&RequestContext::background(), &customer.id().to_string())
            .await
            .unwrap();

        assert_eq!(dto.id, customer.id().to_string());
        assert_eq!(dto.full_name, "Jane Roe");
        assert_eq!(dto.email, "jane@example.com");
        assert_eq!(dto.phone_number, "(555) 123-4567");
    }

    #[tokio::test]
    async fn test_unknown_id_is_not_found() {
        let (handler, _) = seeded().await;

        let result = handler
            .handle(&RequestContext::background(), &CustomerId::new().to_string())
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { .. })));
    }

    #[tokio::test]
    async fn test_malformed_id_is_not_found() {
        let (handler, _) = seeded().await;

        let result = handler
            .handle(&RequestContext::background(), "not-a-uuid")
            .await;

        assert!(matches!(result, Err(DomainError::NotFound { ref id }) if id == "not-a-uuid"));
    }

    #[tokio::test]
    async fn test_storage_failure_is_repository_error() {
        let repo = InMemoryCustomerRepository::new();
        repo.set_fail_on_get(true);
        let handler = GetCustomerHandler::new(repo);

        let result = handler
            .handle(&RequestContext::background(), &CustomerId::new().to_string())
            .await;

        assert!(matches!(result, Err(DomainError::Repository(_))));
    }
}
