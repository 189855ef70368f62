//! Admin back-office pages.
//!
//! Every handler takes [`RequireAdminAuth`](crate::middleware::RequireAdminAuth);
//! visitors without an admin session are redirected to the login page.
//! Forms follow post-redirect-get: each POST redirects back to its list page
//! with a `success` or `error` flash message.

pub mod customers;
pub mod dashboard;
pub mod forms;
pub mod gallery;
pub mod inquiries;
pub mod litters;
pub mod parent_dogs;
pub mod profile;
pub mod puppies;

use crate::error::AppError;

/// Parse a record id from the URL path.
///
/// # Errors
///
/// Returns `AppError::BadRequest` if the id is malformed.
pub fn path_id<I>(raw: &str) -> Result<I, AppError>
where
    I: std::str::FromStr<Err = parti_poodles_core::IdError>,
{
    raw.parse()
        .map_err(|e: parti_poodles_core::IdError| AppError::BadRequest(e.to_string()))
}
