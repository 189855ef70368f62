//! Parent dogs page.

use askama::Template;
use askama_web::WebTemplate;
use axum::{extract::State, response::IntoResponse};
use tracing::instrument;

use crate::db::ParentDogRepository;
use crate::error::AppError;
use crate::filters;
use crate::models::ParentDog;
use crate::services::orientation::transforms_for;
use crate::state::AppState;

/// Parent dog display data.
#[derive(Clone)]
pub struct ParentView {
    pub name: String,
    pub registered_name: Option<String>,
    pub color: Option<String>,
    pub description: Option<String>,
    pub health_testing: Option<String>,
    pub achievements: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
    pub photo: Option<String>,
    pub transform: &'static str,
}

impl ParentView {
    fn new(dog: ParentDog, transform: &'static str) -> Self {
        Self {
            photo: dog.photos.first().cloned(),
            name: dog.name,
            registered_name: dog.registered_name,
            color: dog.color,
            description: dog.description,
            health_testing: dog.health_testing,
            achievements: dog.achievements,
            weight: dog.weight.map(|kg| format!("{kg} kg")),
            height: dog.height.map(|cm| format!("{cm} cm")),
            transform,
        }
    }
}

/// Parents page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/parents.html")]
pub struct ParentsTemplate {
    pub dams: Vec<ParentView>,
    pub sires: Vec<ParentView>,
}

/// Display the active breeding dogs, dams first.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let mut active = ParentDogRepository::new(state.store())
        .list_active()
        .await?;
    active.sort_by(|a, b| a.name.cmp(&b.name));

    let transforms = transforms_for(
        state.orientation(),
        active
            .iter()
            .map(|d| d.photos.first().cloned().unwrap_or_default()),
    )
    .await;

    let (mut dams, mut sires) = (Vec::new(), Vec::new());
    for (dog, transform) in active.into_iter().zip(transforms) {
        if dog.is_dam() {
            dams.push(ParentView::new(dog, transform));
        } else {
            sires.push(ParentView::new(dog, transform));
        }
    }

    Ok(ParentsTemplate { dams, sires })
}
