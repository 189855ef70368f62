//! Home and about pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::PuppyRepository;
use crate::error::AppError;
use crate::filters;
use crate::routes::puppies::{PuppyCard, puppy_cards};
use crate::state::AppState;

/// Available puppies shown on the home page.
const FEATURED_PUPPIES: usize = 3;

/// Home page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/home.html")]
pub struct HomeTemplate {
    pub featured: Vec<PuppyCard>,
    pub available_count: usize,
}

/// About page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/about.html")]
pub struct AboutTemplate;

/// Display the home page with the newest available puppies.
#[instrument(skip(state))]
pub async fn home(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut available = PuppyRepository::new(state.store())
        .list_available()
        .await?;
    let available_count = available.len();

    available.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    available.truncate(FEATURED_PUPPIES);

    Ok(HomeTemplate {
        featured: puppy_cards(&state, &available).await,
        available_count,
    })
}

/// Display the about page.
pub async fn about() -> impl IntoResponse {
    AboutTemplate
}
