//! Admin authentication error types.

use thiserror::Error;

use crate::db::RepositoryError;

/// Errors that can occur during admin authentication operations.
#[derive(Debug, Error)]
pub enum AdminAuthError {
    /// Unknown username or wrong password. The two are not distinguished.
    #[error("invalid username or password")]
    InvalidCredentials,

    /// The account exists but has been deactivated.
    #[error("account is disabled")]
    Inactive,

    /// Admin user not found.
    #[error("admin user not found")]
    UserNotFound,

    /// Admin user already exists.
    #[error("admin user already exists")]
    UserAlreadyExists,

    /// Password could not be hashed, or a stored hash is malformed.
    #[error("password hash error: {0}")]
    Hash(String),

    /// Repository/database error.
    #[error("database error: {0}")]
    Repository(#[from] RepositoryError),
}

impl From<argon2::password_hash::Error> for AdminAuthError {
    fn from(e: argon2::password_hash::Error) -> Self {
        Self::Hash(e.to_string())
    }
}
