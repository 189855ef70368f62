//! Parent dog repository.

use parti_poodles_core::{Gender, ParentDogId, ParentDogStatus};

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{NewParentDog, ParentDog, ParentDogPatch};

impl Table for ParentDog {
    const SCHEMA: &'static TableSchema = &schema::PARENT_DOGS;
    type Id = ParentDogId;
    type New = NewParentDog;
    type Patch = ParentDogPatch;

    fn validate_new(new: &NewParentDog) -> Result<(), RepositoryError> {
        require_non_blank("name", &new.name)?;
        check_measurements(new.weight, new.height)
    }

    fn validate_patch(patch: &ParentDogPatch) -> Result<(), RepositoryError> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        check_measurements(patch.weight, patch.height)
    }
}

fn check_measurements(weight: Option<f64>, height: Option<f64>) -> Result<(), RepositoryError> {
    for (field, value) in [("weight", weight), ("height", height)] {
        if value.is_some_and(|v| !v.is_finite() || v < 0.0) {
            return Err(RepositoryError::Validation(format!(
                "{field} must be a non-negative number"
            )));
        }
    }
    Ok(())
}

/// Repository for parent dogs.
pub struct ParentDogRepository<'a> {
    rows: Collection<'a, ParentDog>,
}

impl<'a> ParentDogRepository<'a> {
    /// Create a new parent dog repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// All parent dogs.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<ParentDog>, RepositoryError> {
        self.rows.list().await
    }

    /// Dogs with status `active`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_active(&self) -> Result<Vec<ParentDog>, RepositoryError> {
        self.rows.list_by("status", ParentDogStatus::Active).await
    }

    /// Dams (`female`) or sires (`male`).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_by_gender(&self, gender: Gender) -> Result<Vec<ParentDog>, RepositoryError> {
        self.rows.list_by("gender", gender).await
    }

    /// One parent dog, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: ParentDogId) -> Result<Option<ParentDog>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Create a parent dog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name or a negative
    /// measurement.
    pub async fn create(&self, new: &NewParentDog) -> Result<ParentDogId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update a parent dog.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the dog does not exist.
    pub async fn update(
        &self,
        id: ParentDogId,
        patch: &ParentDogPatch,
    ) -> Result<ParentDog, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Delete a parent dog. Litters and puppies referencing it are untouched.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: ParentDogId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::collection::contract;

    #[tokio::test]
    async fn test_create_then_get() {
        let store = Store::memory();
        let repo = ParentDogRepository::new(&store);

        let mut new = NewParentDog::new("Daisy", Gender::Female, ParentDogStatus::Active);
        new.registered_name = Some("Parti Daisy Chain".to_string());
        new.weight = Some(22.5);
        let id = repo.create(&new).await.unwrap();

        let dog = repo.get(id).await.unwrap().unwrap();
        assert_eq!(dog.name, "Daisy");
        assert_eq!(dog.registered_name.as_deref(), Some("Parti Daisy Chain"));
        assert_eq!(dog.weight, Some(22.5));
        assert!(dog.is_dam());
        assert_eq!(dog.created_at, dog.updated_at);
    }

    #[tokio::test]
    async fn test_required_fields_enforced_by_type() {
        let missing_gender = serde_json::json!({"name": "Rex", "status": "active"});
        assert!(serde_json::from_value::<NewParentDog>(missing_gender).is_err());

        let bad_status = serde_json::json!({"name": "Rex", "gender": "male", "status": "asleep"});
        assert!(serde_json::from_value::<NewParentDog>(bad_status).is_err());
    }

    #[tokio::test]
    async fn test_list_by_gender_and_active() {
        let store = Store::memory();
        let repo = ParentDogRepository::new(&store);
        repo.create(&NewParentDog::new("Daisy", Gender::Female, ParentDogStatus::Active))
            .await
            .unwrap();
        repo.create(&NewParentDog::new("Duke", Gender::Male, ParentDogStatus::Active))
            .await
            .unwrap();
        let old = repo
            .create(&NewParentDog::new("Grace", Gender::Female, ParentDogStatus::Active))
            .await
            .unwrap();

        let patch = ParentDogPatch {
            status: Some(ParentDogStatus::Retired),
            ..ParentDogPatch::default()
        };
        let retired = repo.update(old, &patch).await.unwrap();
        assert_eq!(retired.gender, Gender::Female);
        assert!(retired.updated_at > retired.created_at);

        assert_eq!(repo.list_by_gender(Gender::Female).await.unwrap().len(), 2);
        let active: Vec<_> = repo
            .list_active()
            .await
            .unwrap()
            .into_iter()
            .map(|d| d.name)
            .collect();
        assert_eq!(active, vec!["Daisy".to_string(), "Duke".to_string()]);
    }

    #[tokio::test]
    async fn test_negative_weight_rejected() {
        let store = Store::memory();
        let repo = ParentDogRepository::new(&store);
        let mut new = NewParentDog::new("Duke", Gender::Male, ParentDogStatus::Active);
        new.weight = Some(-1.0);
        assert!(matches!(
            repo.create(&new).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_then_get_is_none() {
        let store = Store::memory();
        let repo = ParentDogRepository::new(&store);
        let id = repo
            .create(&NewParentDog::new("Duke", Gender::Male, ParentDogStatus::Retired))
            .await
            .unwrap();
        repo.remove(id).await.unwrap();
        assert!(repo.get(id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_shared_crud_contract() {
        let new = NewParentDog {
            color: Some("black and white parti".to_string()),
            photos: vec!["/images/bella.jpg".to_string()],
            weight: Some(22.5),
            ..NewParentDog::new("Bella", Gender::Female, ParentDogStatus::Active)
        };
        let patch = ParentDogPatch {
            status: Some(ParentDogStatus::Retired),
            ..ParentDogPatch::default()
        };
        contract::create_get_update::<ParentDog>(&new, &patch).await;
    }
}
