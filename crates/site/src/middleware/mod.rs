//! HTTP middleware for the site.
//!
//! - `auth` - Admin session extractors ([`RequireAdminAuth`], [`OptionalAdminAuth`])
//! - `session` - tower-sessions layer (`PostgreSQL` store, or memory in demo mode)

pub mod auth;
pub mod session;

pub use auth::{OptionalAdminAuth, RequireAdminAuth, clear_current_admin, set_current_admin};
pub use session::{SESSION_COOKIE_NAME, create_session_layer, postgres_session_store};
