//! Parti Poodles site library.
//!
//! Public pages, the admin back office, and the JSON function API, exposed
//! as a library so the binary and the integration tests build the same
//! router.

#![cfg_attr(not(test), forbid(unsafe_code))]

pub mod config;
pub mod db;
pub mod error;
pub mod filters;
pub mod middleware;
pub mod models;
pub mod routes;
pub mod services;
pub mod state;

use axum::Router;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tower_sessions::MemoryStore;

use crate::middleware::{create_session_layer, postgres_session_store};
use crate::state::AppState;

/// Static assets, relative to the workspace root.
const STATIC_DIR: &str = "crates/site/static";

/// Build the complete application router.
///
/// Sessions are stored in `PostgreSQL` when the store is database-backed,
/// and in process memory otherwise.
pub fn app(state: AppState) -> Router {
    let router = routes::routes().nest_service("/static", ServeDir::new(STATIC_DIR));

    let router = match state.store().pool() {
        Some(pool) => router.layer(create_session_layer(
            postgres_session_store(pool),
            state.config(),
        )),
        None => router.layer(create_session_layer(MemoryStore::default(), state.config())),
    };

    router
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}
