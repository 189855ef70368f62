//! Session-related types for admin authentication.
//!
//! Types stored in the session for authentication state.

use serde::{Deserialize, Serialize};

use parti_poodles_core::AdminUserId;

use super::admin_user::AdminUser;

/// Session-stored admin identity.
///
/// Minimal data stored in the session to identify the logged-in admin.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CurrentAdmin {
    /// Admin's record ID.
    pub id: AdminUserId,
    /// Login name.
    pub username: String,
    /// Display name shown in the admin header.
    pub name: String,
    /// Free-form role label.
    pub role: Option<String>,
}

impl From<&AdminUser> for CurrentAdmin {
    fn from(user: &AdminUser) -> Self {
        Self {
            id: user.id,
            username: user.username.clone(),
            name: user.display_name(),
            role: user.role.clone(),
        }
    }
}

/// Session keys for admin authentication data.
pub mod keys {
    /// Key for the logged-in flag.
    pub const ADMIN_LOGGED_IN: &str = "adminLoggedIn";

    /// Key for the current admin ([`CurrentAdmin`](super::CurrentAdmin)).
    pub const ADMIN_USER: &str = "adminUser";
}
