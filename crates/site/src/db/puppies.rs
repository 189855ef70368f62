//! Puppy repository.

use parti_poodles_core::{LitterId, PuppyId, PuppyStatus};

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{NewPuppy, Puppy, PuppyPatch};

impl Table for Puppy {
    const SCHEMA: &'static TableSchema = &schema::PUPPIES;
    type Id = PuppyId;
    type New = NewPuppy;
    type Patch = PuppyPatch;

    fn validate_new(new: &NewPuppy) -> Result<(), RepositoryError> {
        require_non_blank("name", &new.name)?;
        check_price_range(new.price_min, new.price_max)
    }

    fn validate_patch(patch: &PuppyPatch) -> Result<(), RepositoryError> {
        if let Some(name) = &patch.name {
            require_non_blank("name", name)?;
        }
        check_price_range(patch.price_min, patch.price_max)
    }
}

fn check_price_range(min: Option<i64>, max: Option<i64>) -> Result<(), RepositoryError> {
    if min.is_some_and(|c| c < 0) || max.is_some_and(|c| c < 0) {
        return Err(RepositoryError::Validation(
            "prices cannot be negative".to_string(),
        ));
    }
    if matches!((min, max), (Some(min), Some(max)) if min > max) {
        return Err(RepositoryError::Validation(
            "price_min cannot exceed price_max".to_string(),
        ));
    }
    Ok(())
}

/// Repository for puppies.
pub struct PuppyRepository<'a> {
    rows: Collection<'a, Puppy>,
}

impl<'a> PuppyRepository<'a> {
    /// Create a new puppy repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// All puppies.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<Puppy>, RepositoryError> {
        self.rows.list().await
    }

    /// Puppies with status `available`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_available(&self) -> Result<Vec<Puppy>, RepositoryError> {
        self.list_by_status(PuppyStatus::Available).await
    }

    /// Puppies with the given status.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_by_status(&self, status: PuppyStatus) -> Result<Vec<Puppy>, RepositoryError> {
        self.rows.list_by("status", status).await
    }

    /// Puppies belonging to a litter.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_by_litter(&self, litter_id: LitterId) -> Result<Vec<Puppy>, RepositoryError> {
        self.rows.list_by("litter_id", litter_id).await
    }

    /// One puppy, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: PuppyId) -> Result<Option<Puppy>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Create a puppy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank name or an invalid
    /// price range.
    pub async fn create(&self, new: &NewPuppy) -> Result<PuppyId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update a puppy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the puppy does not exist.
    pub async fn update(&self, id: PuppyId, patch: &PuppyPatch) -> Result<Puppy, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Delete a puppy.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: PuppyId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}
