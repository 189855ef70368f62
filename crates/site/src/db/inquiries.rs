//! Inquiry repository.

use parti_poodles_core::{InquiryId, InquiryStatus};
use serde::Serialize;

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{Inquiry, InquiryStatusUpdate, NewInquiry};

impl Table for Inquiry {
    const SCHEMA: &'static TableSchema = &schema::INQUIRIES;
    type Id = InquiryId;
    type New = NewInquiry;
    type Patch = InquiryStatusUpdate;

    fn validate_new(new: &NewInquiry) -> Result<(), RepositoryError> {
        require_non_blank("customer_name", &new.customer_name)?;
        require_non_blank("message", &new.message)
    }
}

/// Repository for contact form inquiries.
pub struct InquiryRepository<'a> {
    rows: Collection<'a, Inquiry>,
}

/// Newest first. Ties keep the later insert first.
fn newest_first(mut inquiries: Vec<Inquiry>) -> Vec<Inquiry> {
    inquiries.reverse();
    inquiries.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    inquiries
}

impl<'a> InquiryRepository<'a> {
    /// Create a new inquiry repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// Every inquiry, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Inquiry>, RepositoryError> {
        self.rows.list().await.map(newest_first)
    }

    /// Inquiries with the given status, newest first.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_by_status(
        &self,
        status: InquiryStatus,
    ) -> Result<Vec<Inquiry>, RepositoryError> {
        self.rows.list_by("status", status).await.map(newest_first)
    }

    /// Number of inquiries nobody has looked at yet.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn count_new(&self) -> Result<usize, RepositoryError> {
        Ok(self.rows.list_by("status", InquiryStatus::New).await?.len())
    }

    /// One inquiry, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: InquiryId) -> Result<Option<Inquiry>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Record a new inquiry. The stored status is always `new`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name or message.
    pub async fn create(&self, new: &NewInquiry) -> Result<InquiryId, RepositoryError> {
        let new = NewInquiry {
            status: InquiryStatus::New,
            ..new.clone()
        };
        self.rows.create(&new).await
    }

    /// Change an inquiry's status, and its response if one is given.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the inquiry does not exist.
    pub async fn update_status(
        &self,
        id: InquiryId,
        update: &InquiryStatusUpdate,
    ) -> Result<Inquiry, RepositoryError> {
        self.rows.update(id, update).await
    }

    /// Delete an inquiry.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: InquiryId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}

/// Inquiry counts by status, for the admin dashboard.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct InquiryCounts {
    pub new: usize,
    pub contacted: usize,
    pub resolved: usize,
    pub closed: usize,
}

impl InquiryCounts {
    /// Tally a list of inquiries.
    #[must_use]
    pub fn tally(inquiries: &[Inquiry]) -> Self {
        inquiries
            .iter()
            .fold(Self::default(), |mut counts, inquiry| {
                match inquiry.status {
                    InquiryStatus::New => counts.new += 1,
                    InquiryStatus::Contacted => counts.contacted += 1,
                    InquiryStatus::Resolved => counts.resolved += 1,
                    InquiryStatus::Closed => counts.closed += 1,
                }
                counts
            })
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::db::collection::contract;
    use crate::db::MemoryDocumentStore;
    use chrono::{Duration, TimeZone, Utc};
    use parti_poodles_core::{Email, ManualClock};

    fn inquiry(name: &str) -> NewInquiry {
        NewInquiry::new(
            name,
            Email::parse("buyer@example.com").unwrap(),
            "Do you have any red parti puppies?",
        )
    }

    fn clocked_store() -> (Store, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 8, 25, 9, 0, 0).unwrap(),
        ));
        let store = Store::Memory(Arc::new(MemoryDocumentStore::with_clock(clock.clone())));
        (store, clock)
    }

    #[tokio::test]
    async fn test_create_always_starts_new() {
        let store = Store::memory();
        let repo = InquiryRepository::new(&store);

        let mut new = inquiry("Sam");
        new.status = InquiryStatus::Closed;
        let id = repo.create(&new).await.unwrap();

        let stored = repo.get(id).await.unwrap().unwrap();
        assert_eq!(stored.status, InquiryStatus::New);
        assert_eq!(stored.email.as_deref(), Some("buyer@example.com"));
        assert!(stored.response.is_none());
    }

    #[tokio::test]
    async fn test_status_cannot_be_supplied_on_the_wire() {
        let args = serde_json::json!({
            "customer_name": "Sam",
            "email": "sam@example.com",
            "message": "Hello",
            "status": "resolved",
        });
        assert!(serde_json::from_value::<NewInquiry>(args).is_err());
    }

    #[tokio::test]
    async fn test_list_is_newest_first() {
        let (store, clock) = clocked_store();
        let repo = InquiryRepository::new(&store);

        repo.create(&inquiry("First")).await.unwrap();
        clock.advance(Duration::minutes(5));
        repo.create(&inquiry("Second")).await.unwrap();
        clock.advance(Duration::minutes(5));
        repo.create(&inquiry("Third")).await.unwrap();

        let names: Vec<_> = repo
            .list()
            .await
            .unwrap()
            .into_iter()
            .filter_map(|i| i.customer_name)
            .collect();
        assert_eq!(names, vec!["Third", "Second", "First"]);
    }

    #[tokio::test]
    async fn test_count_new_drops_after_contact() {
        let store = Store::memory();
        let repo = InquiryRepository::new(&store);
        let first = repo.create(&inquiry("Sam")).await.unwrap();
        repo.create(&inquiry("Alex")).await.unwrap();
        assert_eq!(repo.count_new().await.unwrap(), 2);

        let update = InquiryStatusUpdate {
            status: InquiryStatus::Contacted,
            response: Some("Called back on Monday".to_string()),
        };
        repo.update_status(first, &update).await.unwrap();

        assert_eq!(repo.count_new().await.unwrap(), 1);
        let contacted = repo.list_by_status(InquiryStatus::Contacted).await.unwrap();
        assert_eq!(contacted.len(), 1);
        assert_eq!(contacted[0].response.as_deref(), Some("Called back on Monday"));
    }

    #[tokio::test]
    async fn test_update_status_without_response_keeps_previous() {
        let store = Store::memory();
        let repo = InquiryRepository::new(&store);
        let id = repo.create(&inquiry("Sam")).await.unwrap();

        repo.update_status(
            id,
            &InquiryStatusUpdate {
                status: InquiryStatus::Contacted,
                response: Some("Left a voicemail".to_string()),
            },
        )
        .await
        .unwrap();
        let resolved = repo
            .update_status(
                id,
                &InquiryStatusUpdate {
                    status: InquiryStatus::Resolved,
                    response: None,
                },
            )
            .await
            .unwrap();

        assert_eq!(resolved.status, InquiryStatus::Resolved);
        assert_eq!(resolved.response.as_deref(), Some("Left a voicemail"));
    }

    #[tokio::test]
    async fn test_update_status_missing_is_not_found() {
        let store = Store::memory();
        let repo = InquiryRepository::new(&store);
        let update = InquiryStatusUpdate {
            status: InquiryStatus::Closed,
            response: None,
        };
        assert!(matches!(
            repo.update_status(InquiryId::generate(), &update).await,
            Err(RepositoryError::NotFound)
        ));
    }

    #[tokio::test]
    async fn test_tally() {
        let store = Store::memory();
        let repo = InquiryRepository::new(&store);
        let id = repo.create(&inquiry("Sam")).await.unwrap();
        repo.create(&inquiry("Alex")).await.unwrap();
        repo.update_status(
            id,
            &InquiryStatusUpdate {
                status: InquiryStatus::Closed,
                response: None,
            },
        )
        .await
        .unwrap();

        let counts = InquiryCounts::tally(&repo.list().await.unwrap());
        assert_eq!(
            counts,
            InquiryCounts {
                new: 1,
                closed: 1,
                ..InquiryCounts::default()
            }
        );
    }

    #[tokio::test]
    async fn test_shared_crud_contract() {
        let new = NewInquiry {
            phone: Some("0400 000 000".to_string()),
            puppy_interest: Some("Milo".to_string()),
            ..NewInquiry::new("Sam", Email::parse("sam@example.com").unwrap(), "Is Milo available?")
        };
        let patch = InquiryStatusUpdate {
            status: InquiryStatus::Contacted,
            response: Some("Called back on Monday".to_string()),
        };
        contract::create_get_update::<Inquiry>(&new, &patch).await;
    }
}
