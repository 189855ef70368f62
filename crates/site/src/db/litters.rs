//! Litter repository.

use parti_poodles_core::LitterId;

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{Litter, LitterPatch, NewLitter};

impl Table for Litter {
    const SCHEMA: &'static TableSchema = &schema::LITTERS;
    type Id = LitterId;
    type New = NewLitter;
    type Patch = LitterPatch;

    fn validate_new(new: &NewLitter) -> Result<(), RepositoryError> {
        require_non_blank("name", &new.name)
    }

    fn validate_patch(patch: &LitterPatch) -> Result<(), RepositoryError> {
        patch
            .name
            .as_deref()
            .map_or(Ok(()), |name| require_non_blank("name", name))
    }
}

/// Repository for litters.
pub struct LitterRepository<'a> {
    rows: Collection<'a, Litter>,
}

impl<'a> LitterRepository<'a> {
    /// Create a new litter repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// All litters.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Litter>, RepositoryError> {
        self.rows.list().await
    }

    /// Litters still marked active.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_active(&self) -> Result<Vec<Litter>, RepositoryError> {
        self.rows.list_by("is_active", true).await
    }

    /// One litter, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: LitterId) -> Result<Option<Litter>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Create a litter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name.
    pub async fn create(&self, new: &NewLitter) -> Result<LitterId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update a litter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the litter does not exist.
    pub async fn update(&self, id: LitterId, patch: &LitterPatch) -> Result<Litter, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Delete a litter. Puppies referencing it keep their `litter_id`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: LitterId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::collection::contract;
    use crate::db::PuppyRepository;
    use crate::models::NewPuppy;
    use chrono::NaiveDate;

    #[tokio::test]
    async fn test_create_defaults_to_active() {
        let store = Store::memory();
        let repo = LitterRepository::new(&store);

        let new: NewLitter = serde_json::from_value(serde_json::json!({
            "name": "Spring 2025",
            "date_of_birth": "2025-03-14",
        }))
        .unwrap();
        let id = repo.create(&new).await.unwrap();
        let litter = repo.get(id).await.unwrap().unwrap();

        assert!(litter.is_active);
        assert_eq!(litter.date_of_birth, NaiveDate::from_ymd_opt(2025, 3, 14));
        assert_eq!(litter.created_at, litter.updated_at);
    }

    #[tokio::test]
    async fn test_list_active_after_update() {
        let store = Store::memory();
        let repo = LitterRepository::new(&store);
        let spring = repo.create(&NewLitter::named("Spring")).await.unwrap();
        repo.create(&NewLitter::named("Summer")).await.unwrap();

        let before = repo.get(spring).await.unwrap().unwrap();
        let patch = LitterPatch {
            is_active: Some(false),
            ..LitterPatch::default()
        };
        let after = repo.update(spring, &patch).await.unwrap();

        assert!(!after.is_active);
        assert_eq!(after.name, before.name);
        assert!(after.updated_at > before.updated_at);

        let active = repo.list_active().await.unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "Summer");
    }

    #[tokio::test]
    async fn test_remove_leaves_puppies_dangling() {
        let store = Store::memory();
        let litters = LitterRepository::new(&store);
        let puppies = PuppyRepository::new(&store);

        let litter = litters.create(&NewLitter::named("Winter")).await.unwrap();
        let puppy = puppies
            .create(&NewPuppy {
                name: "Pip".to_string(),
                litter_id: Some(litter),
                ..NewPuppy::default()
            })
            .await
            .unwrap();

        litters.remove(litter).await.unwrap();
        assert!(litters.get(litter).await.unwrap().is_none());

        let orphan = puppies.get(puppy).await.unwrap().unwrap();
        assert_eq!(orphan.litter_id, Some(litter));
        assert_eq!(puppies.list_by_litter(litter).await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_shared_crud_contract() {
        let new = NewLitter {
            date_of_birth: NaiveDate::from_ymd_opt(2025, 3, 1),
            description: Some("Six parti puppies".to_string()),
            ..NewLitter::named("Autumn 2025")
        };
        let patch = LitterPatch {
            is_active: Some(false),
            ..LitterPatch::default()
        };
        contract::create_get_update::<Litter>(&new, &patch).await;
    }
}
