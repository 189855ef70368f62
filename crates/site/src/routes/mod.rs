//! HTTP route handlers for the site.
//!
//! # Route Structure
//!
//! ```text
//! GET  /health                 - Health check
//! GET  /health/ready           - Readiness check (store reachable)
//!
//! # Public pages
//! GET  /                       - Home page (available puppies preview)
//! GET  /about                  - About the breeder
//! GET  /puppies                - Puppies grouped by litter
//! GET  /puppy/{id}             - Puppy detail with litter mates
//! GET  /gallery                - Public photo gallery
//! GET  /parents                - Active dams and sires
//! GET  /contact                - Contact form
//! POST /contact                - Submit an inquiry
//!
//! # Auth
//! GET  /admin-login            - Login page
//! POST /admin-login            - Login action
//! POST /admin/logout           - Logout action
//!
//! # Admin (requires an admin session)
//! GET  /admin                  - Dashboard statistics
//! GET  /admin/puppies          - Puppy list      (POST create, POST /{id} update, POST /{id}/delete)
//! GET  /admin/parent-dogs      - Parent dog list (same shape)
//! GET  /admin/litters          - Litter list     (same shape)
//! GET  /admin/inquiries        - Inquiries       (POST /{id}/status, POST /{id}/delete)
//! GET  /admin/gallery          - Gallery         (POST create, POST /{id}/visibility, POST /{id}/delete)
//! GET  /admin/customers        - Customer CRM    (POST create, POST /{id} update, POST /{id}/delete)
//! GET  /admin/profile          - Own profile     (POST update)
//!
//! # API
//! POST /api/query              - Run a named query function
//! POST /api/mutation           - Run a named mutation function
//! GET  /api/image-orientation  - EXIF orientation lookup for an image URL
//! ```

pub mod admin;
pub mod api;
pub mod auth;
pub mod contact;
pub mod gallery;
pub mod health;
pub mod home;
pub mod parents;
pub mod puppies;

use axum::{
    Router,
    routing::{get, post},
};

use crate::state::AppState;

/// Create the admin routes router.
pub fn admin_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(admin::dashboard::index))
        .route("/logout", post(auth::logout))
        // Puppies
        .route(
            "/puppies",
            get(admin::puppies::index).post(admin::puppies::create),
        )
        .route("/puppies/{id}", post(admin::puppies::update))
        .route("/puppies/{id}/delete", post(admin::puppies::delete))
        // Parent dogs
        .route(
            "/parent-dogs",
            get(admin::parent_dogs::index).post(admin::parent_dogs::create),
        )
        .route("/parent-dogs/{id}", post(admin::parent_dogs::update))
        .route("/parent-dogs/{id}/delete", post(admin::parent_dogs::delete))
        // Litters
        .route(
            "/litters",
            get(admin::litters::index).post(admin::litters::create),
        )
        .route("/litters/{id}", post(admin::litters::update))
        .route("/litters/{id}/delete", post(admin::litters::delete))
        // Inquiries
        .route("/inquiries", get(admin::inquiries::index))
        .route("/inquiries/{id}/status", post(admin::inquiries::update_status))
        .route("/inquiries/{id}/delete", post(admin::inquiries::delete))
        // Gallery
        .route(
            "/gallery",
            get(admin::gallery::index).post(admin::gallery::create),
        )
        .route("/gallery/{id}/visibility", post(admin::gallery::set_visibility))
        .route("/gallery/{id}/delete", post(admin::gallery::delete))
        // Customers
        .route(
            "/customers",
            get(admin::customers::index).post(admin::customers::create),
        )
        .route("/customers/{id}", post(admin::customers::update))
        .route("/customers/{id}/delete", post(admin::customers::delete))
        // Profile
        .route(
            "/profile",
            get(admin::profile::index).post(admin::profile::update),
        )
}

/// Create the API routes router.
pub fn api_routes() -> Router<AppState> {
    Router::new()
        .route("/query", post(api::functions::query))
        .route("/mutation", post(api::functions::mutation))
        .route("/image-orientation", get(api::orientation::lookup))
}

/// Create all routes for the site.
pub fn routes() -> Router<AppState> {
    Router::new()
        // Health
        .route("/health", get(health::health))
        .route("/health/ready", get(health::readiness))
        // Public pages
        .route("/", get(home::home))
        .route("/about", get(home::about))
        .route("/puppies", get(puppies::index))
        .route("/puppy/{id}", get(puppies::show))
        .route("/gallery", get(gallery::index))
        .route("/parents", get(parents::index))
        .route("/contact", get(contact::show).post(contact::submit))
        // Auth
        .route("/admin-login", get(auth::login_page).post(auth::login))
        // Admin back office
        .nest("/admin", admin_routes())
        // Function API
        .nest("/api", api_routes())
}
