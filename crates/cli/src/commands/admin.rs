//! Admin user management commands.
//!
//! # Usage
//!
//! ```bash
//! pp-cli admin create -u owner -p 'correct horse' -e owner@example.com -r owner
//! ```
//!
//! The password may also be supplied through `PP_ADMIN_PASSWORD` so it does
//! not end up in shell history.

use thiserror::Error;

use parti_poodles_core::AdminUserId;
use parti_poodles_site::db::{PgDocumentStore, Store};
use parti_poodles_site::services::{AdminAuthError, AdminAuthService};

use super::{ConnectError, connect};

/// Shortest password accepted for an admin account.
const MIN_PASSWORD_LEN: usize = 8;

/// Errors that can occur during admin operations.
#[derive(Debug, Error)]
pub enum AdminError {
    #[error(transparent)]
    Connect(#[from] ConnectError),

    /// Username is blank.
    #[error("Username must not be empty")]
    EmptyUsername,

    /// Password too short.
    #[error("Password must be at least {MIN_PASSWORD_LEN} characters")]
    WeakPassword,

    /// User already exists.
    #[error("Admin user already exists with username: {0}")]
    UserExists(String),

    #[error(transparent)]
    Auth(AdminAuthError),
}

fn validate(username: &str, password: &str) -> Result<(), AdminError> {
    if username.trim().is_empty() {
        return Err(AdminError::EmptyUsername);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AdminError::WeakPassword);
    }
    Ok(())
}

/// Create a new admin user.
///
/// # Returns
///
/// The ID of the created admin user.
pub async fn create_user(
    username: &str,
    password: &str,
    email: Option<String>,
    role: Option<String>,
) -> Result<AdminUserId, AdminError> {
    validate(username, password)?;

    let store = Store::Postgres(PgDocumentStore::new(connect().await?));

    tracing::info!("Creating admin user: {}", username.trim());
    let id = AdminAuthService::new(&store)
        .create_user(username, password, email, role)
        .await
        .map_err(|e| match e {
            AdminAuthError::UserAlreadyExists => AdminError::UserExists(username.to_owned()),
            other => AdminError::Auth(other),
        })?;

    tracing::info!("Admin user created successfully! ID: {}", id);
    Ok(id)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_validate() {
        assert!(validate("owner", "long enough").is_ok());
        assert!(matches!(validate("  ", "long enough"), Err(AdminError::EmptyUsername)));
        assert!(matches!(validate("owner", "short"), Err(AdminError::WeakPassword)));
    }
}
