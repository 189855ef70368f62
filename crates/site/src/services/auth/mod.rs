//! Admin authentication service.
//!
//! Username and password login against argon2 hashes stored on the admin
//! user record. Successful logins stamp `last_login_at`.

mod error;

pub use error::AdminAuthError;

use argon2::password_hash::rand_core::OsRng;
use argon2::password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString};
use argon2::Argon2;
use chrono::Utc;
use tracing::instrument;

use parti_poodles_core::AdminUserId;

use crate::db::{AdminUserRepository, RepositoryError, Store};
use crate::models::{AdminUser, NewAdminUser};

/// Hash a plaintext password into an argon2 PHC string.
///
/// # Errors
///
/// Returns `AdminAuthError::Hash` if hashing fails.
pub fn hash_password(password: &str) -> Result<String, AdminAuthError> {
    let salt = SaltString::generate(&mut OsRng);
    let hash = Argon2::default().hash_password(password.as_bytes(), &salt)?;
    Ok(hash.to_string())
}

/// Check a plaintext password against a stored PHC string.
///
/// # Errors
///
/// Returns `AdminAuthError::Hash` if the stored hash cannot be parsed.
pub fn verify_password(password: &str, stored: &str) -> Result<bool, AdminAuthError> {
    let parsed = PasswordHash::new(stored)?;
    match Argon2::default().verify_password(password.as_bytes(), &parsed) {
        Ok(()) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(e.into()),
    }
}

/// Admin authentication service.
pub struct AdminAuthService<'a> {
    users: AdminUserRepository<'a>,
}

impl<'a> AdminAuthService<'a> {
    /// Create a new admin authentication service.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            users: AdminUserRepository::new(store),
        }
    }

    /// Verify credentials and record the login.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::InvalidCredentials` for an unknown username or
    /// a wrong password.
    /// Returns `AdminAuthError::Inactive` if the account is disabled.
    #[instrument(skip(self, password))]
    pub async fn login(&self, username: &str, password: &str) -> Result<AdminUser, AdminAuthError> {
        let user = self
            .users
            .get_by_username(username.trim())
            .await?
            .ok_or(AdminAuthError::InvalidCredentials)?;

        if !verify_password(password, &user.password_hash)? {
            return Err(AdminAuthError::InvalidCredentials);
        }
        if !user.is_active {
            return Err(AdminAuthError::Inactive);
        }

        let user = self.users.update_last_login(user.id, Utc::now()).await?;
        tracing::info!(admin_user_id = %user.id, "Admin logged in");
        Ok(user)
    }

    /// Create an admin account with a freshly hashed password.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::UserAlreadyExists` if the username is taken.
    pub async fn create_user(
        &self,
        username: &str,
        password: &str,
        email: Option<String>,
        role: Option<String>,
    ) -> Result<AdminUserId, AdminAuthError> {
        let new = NewAdminUser {
            username: username.trim().to_string(),
            password_hash: hash_password(password)?,
            email,
            first_name: None,
            last_name: None,
            role,
            is_active: true,
        };
        match self.users.create(&new).await {
            Ok(id) => Ok(id),
            Err(RepositoryError::Conflict(_)) => Err(AdminAuthError::UserAlreadyExists),
            Err(e) => Err(e.into()),
        }
    }

    /// Get an admin user by ID.
    ///
    /// # Errors
    ///
    /// Returns `AdminAuthError::UserNotFound` if the user doesn't exist.
    pub async fn get_user(&self, id: AdminUserId) -> Result<AdminUser, AdminAuthError> {
        self.users
            .get(id)
            .await?
            .ok_or(AdminAuthError::UserNotFound)
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::models::AdminUserPatch;

    #[test]
    fn test_hash_then_verify() {
        let hash = hash_password("poodle-pass").unwrap();
        assert!(hash.starts_with("$argon2"));
        assert!(verify_password("poodle-pass", &hash).unwrap());
        assert!(!verify_password("wrong", &hash).unwrap());
    }

    #[test]
    fn test_plaintext_stored_value_is_not_a_match() {
        assert!(matches!(
            verify_password("poodle-pass", "poodle-pass"),
            Err(AdminAuthError::Hash(_))
        ));
    }

    #[tokio::test]
    async fn test_login_stamps_last_login() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        let id = auth
            .create_user("owner", "poodle-pass", None, Some("owner".to_string()))
            .await
            .unwrap();

        let user = auth.login("owner", "poodle-pass").await.unwrap();
        assert_eq!(user.id, id);
        assert!(user.last_login_at.is_some());
    }

    #[tokio::test]
    async fn test_wrong_password_and_unknown_user_look_the_same() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        auth.create_user("owner", "poodle-pass", None, None)
            .await
            .unwrap();

        assert!(matches!(
            auth.login("owner", "nope").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
        assert!(matches!(
            auth.login("ghost", "poodle-pass").await,
            Err(AdminAuthError::InvalidCredentials)
        ));
        let user = auth.get_user(auth.login("owner", "poodle-pass").await.unwrap().id).await;
        assert!(user.is_ok());
    }

    #[tokio::test]
    async fn test_inactive_user_cannot_log_in() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        let id = auth
            .create_user("former", "poodle-pass", None, None)
            .await
            .unwrap();
        AdminUserRepository::new(&store)
            .update(
                id,
                &AdminUserPatch {
                    is_active: Some(false),
                    ..AdminUserPatch::default()
                },
            )
            .await
            .unwrap();

        assert!(matches!(
            auth.login("former", "poodle-pass").await,
            Err(AdminAuthError::Inactive)
        ));
    }

    #[tokio::test]
    async fn test_duplicate_username() {
        let store = Store::memory();
        let auth = AdminAuthService::new(&store);
        auth.create_user("owner", "a", None, None).await.unwrap();
        assert!(matches!(
            auth.create_user("owner", "b", None, None).await,
            Err(AdminAuthError::UserAlreadyExists)
        ));
    }
}
