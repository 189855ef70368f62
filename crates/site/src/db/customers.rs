//! Customer repository.

use parti_poodles_core::{CustomerId, Email};

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{Customer, CustomerPatch, NewCustomer};

impl Table for Customer {
    const SCHEMA: &'static TableSchema = &schema::CUSTOMERS;
    type Id = CustomerId;
    type New = NewCustomer;
    type Patch = CustomerPatch;

    fn validate_new(new: &NewCustomer) -> Result<(), RepositoryError> {
        require_non_blank("name", &new.name)
    }

    fn validate_patch(patch: &CustomerPatch) -> Result<(), RepositoryError> {
        patch
            .name
            .as_deref()
            .map_or(Ok(()), |name| require_non_blank("name", name))
    }
}

/// Repository for CRM customers. Emails are unique.
pub struct CustomerRepository<'a> {
    rows: Collection<'a, Customer>,
}

impl<'a> CustomerRepository<'a> {
    /// Create a new customer repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// All customers.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Customer>, RepositoryError> {
        self.rows.list().await
    }

    /// One customer, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: CustomerId) -> Result<Option<Customer>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Look a customer up by email.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get_by_email(&self, email: &Email) -> Result<Option<Customer>, RepositoryError> {
        self.rows.first_by("email", email).await
    }

    /// Create a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the email is already on file.
    pub async fn create(&self, new: &NewCustomer) -> Result<CustomerId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the customer does not exist.
    /// Returns `RepositoryError::Conflict` if the new email belongs to someone
    /// else.
    pub async fn update(
        &self,
        id: CustomerId,
        patch: &CustomerPatch,
    ) -> Result<Customer, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Delete a customer.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: CustomerId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::collection::contract;
    use chrono::NaiveDate;
    use parti_poodles_core::CustomerStatus;

    fn email(raw: &str) -> Email {
        Email::parse(raw).unwrap()
    }

    #[tokio::test]
    async fn test_create_and_lookup_by_email() {
        let store = Store::memory();
        let repo = CustomerRepository::new(&store);

        let mut new = NewCustomer::new("Jordan Lee", email("Jordan@Example.com"));
        new.status = Some(CustomerStatus::Prospective);
        let id = repo.create(&new).await.unwrap();

        let found = repo
            .get_by_email(&email("jordan@example.com"))
            .await
            .unwrap()
            .unwrap();
        assert_eq!(found.id, id);
        assert_eq!(found.email.as_ref(), "jordan@example.com");
        assert!(
            repo.get_by_email(&email("nobody@example.com"))
                .await
                .unwrap()
                .is_none()
        );
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let store = Store::memory();
        let repo = CustomerRepository::new(&store);
        repo.create(&NewCustomer::new("Jordan", email("jordan@example.com")))
            .await
            .unwrap();

        let err = repo
            .create(&NewCustomer::new("Jordan Again", email("JORDAN@example.com")))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_update_to_taken_email_conflicts() {
        let store = Store::memory();
        let repo = CustomerRepository::new(&store);
        repo.create(&NewCustomer::new("Jordan", email("jordan@example.com")))
            .await
            .unwrap();
        let casey = repo
            .create(&NewCustomer::new("Casey", email("casey@example.com")))
            .await
            .unwrap();

        let patch = CustomerPatch {
            email: Some(email("jordan@example.com")),
            ..CustomerPatch::default()
        };
        assert!(matches!(
            repo.update(casey, &patch).await,
            Err(RepositoryError::Conflict(_))
        ));

        // Re-saving one's own email is fine.
        let patch = CustomerPatch {
            email: Some(email("casey@example.com")),
            last_contact_date: NaiveDate::from_ymd_opt(2025, 9, 1),
            ..CustomerPatch::default()
        };
        let updated = repo.update(casey, &patch).await.unwrap();
        assert_eq!(updated.last_contact_date, NaiveDate::from_ymd_opt(2025, 9, 1));
    }

    #[tokio::test]
    async fn test_remove() {
        let store = Store::memory();
        let repo = CustomerRepository::new(&store);
        let id = repo
            .create(&NewCustomer::new("Jordan", email("jordan@example.com")))
            .await
            .unwrap();
        repo.remove(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
        // Removing again is a no-op.
        repo.remove(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_crud_contract() {
        let new = NewCustomer {
            phone: Some("0400 000 000".to_string()),
            status: Some(CustomerStatus::Prospective),
            last_contact_date: NaiveDate::from_ymd_opt(2025, 2, 14),
            ..NewCustomer::new("Alex Buyer", email("alex@example.com"))
        };
        let patch = CustomerPatch {
            status: Some(CustomerStatus::Current),
            ..CustomerPatch::default()
        };
        contract::create_get_update::<Customer>(&new, &patch).await;
    }
}
