//! Admin user repository.

use chrono::{DateTime, Utc};
use parti_poodles_core::AdminUserId;

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{AdminUser, AdminUserPatch, NewAdminUser, ProfileUpdate};

impl Table for AdminUser {
    const SCHEMA: &'static TableSchema = &schema::ADMIN_USERS;
    type Id = AdminUserId;
    type New = NewAdminUser;
    type Patch = AdminUserPatch;

    fn validate_new(new: &NewAdminUser) -> Result<(), RepositoryError> {
        require_non_blank("username", &new.username)?;
        require_non_blank("password_hash", &new.password_hash)
    }

    fn validate_patch(patch: &AdminUserPatch) -> Result<(), RepositoryError> {
        patch
            .password_hash
            .as_deref()
            .map_or(Ok(()), |hash| require_non_blank("password_hash", hash))
    }
}

/// Repository for admin accounts. Usernames are unique.
pub struct AdminUserRepository<'a> {
    rows: Collection<'a, AdminUser>,
}

impl<'a> AdminUserRepository<'a> {
    /// Create a new admin user repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// All admin users.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<AdminUser>, RepositoryError> {
        self.rows.list().await
    }

    /// Get an admin user by ID.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: AdminUserId) -> Result<Option<AdminUser>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Get an admin user by username.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get_by_username(&self, username: &str) -> Result<Option<AdminUser>, RepositoryError> {
        self.rows.first_by("username", username).await
    }

    /// Create a new admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Conflict` if the username is taken.
    pub async fn create(&self, new: &NewAdminUser) -> Result<AdminUserId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update an admin user.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update(
        &self,
        id: AdminUserId,
        patch: &AdminUserPatch,
    ) -> Result<AdminUser, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Record a successful login.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_last_login(
        &self,
        id: AdminUserId,
        at: DateTime<Utc>,
    ) -> Result<AdminUser, RepositoryError> {
        let patch = AdminUserPatch {
            last_login_at: Some(at),
            ..AdminUserPatch::default()
        };
        self.rows.update(id, &patch).await
    }

    /// Update the profile fields an admin may edit themselves.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the user does not exist.
    pub async fn update_profile(
        &self,
        id: AdminUserId,
        update: ProfileUpdate,
    ) -> Result<AdminUser, RepositoryError> {
        self.rows.update(id, &AdminUserPatch::from(update)).await
    }
}
