//! Public photo gallery.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Query, State},
    response::IntoResponse,
};
use serde::Deserialize;
use tracing::instrument;

use crate::db::GalleryPhotoRepository;
use crate::error::AppError;
use crate::filters;
use crate::models::GalleryPhotoWithUrl;
use crate::services::orientation::transforms_for;
use crate::state::AppState;

/// Gallery photo display data.
#[derive(Clone)]
pub struct GalleryItem {
    pub image_url: String,
    pub alt: String,
    pub caption: Option<String>,
    pub puppy_name: Option<String>,
    pub age_description: Option<String>,
    pub transform: &'static str,
}

impl GalleryItem {
    fn new(photo: GalleryPhotoWithUrl, transform: &'static str) -> Self {
        let alt = photo
            .photo
            .caption
            .clone()
            .unwrap_or_else(|| photo.photo.filename.clone());
        Self {
            image_url: photo.image_url,
            alt,
            caption: photo.photo.caption,
            puppy_name: photo.photo.puppy_name,
            age_description: photo.photo.age_description,
            transform,
        }
    }
}

/// Gallery filter parameters.
#[derive(Debug, Deserialize)]
pub struct GalleryQuery {
    #[serde(rename = "type")]
    pub photo_type: Option<String>,
}

/// Gallery page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/gallery.html")]
pub struct GalleryTemplate {
    pub photos: Vec<GalleryItem>,
    pub photo_types: Vec<String>,
    pub selected_type: Option<String>,
}

/// Display public photos, optionally of one type.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    Query(query): Query<GalleryQuery>,
) -> Result<impl IntoResponse, AppError> {
    let public = GalleryPhotoRepository::new(state.store())
        .list_public()
        .await?;

    let mut photo_types: Vec<String> = public
        .iter()
        .filter_map(|p| p.photo_type.clone())
        .collect();
    photo_types.sort();
    photo_types.dedup();

    let selected_type = query.photo_type.filter(|t| !t.is_empty());
    let shown: Vec<_> = match &selected_type {
        Some(wanted) => public
            .into_iter()
            .filter(|p| p.photo_type.as_ref() == Some(wanted))
            .collect(),
        None => public,
    };

    let resolved = state.storage().resolve_all(shown).await;
    let transforms = transforms_for(
        state.orientation(),
        resolved.iter().map(|p| p.image_url.clone()),
    )
    .await;

    Ok(GalleryTemplate {
        photos: resolved
            .into_iter()
            .zip(transforms)
            .map(|(photo, transform)| GalleryItem::new(photo, transform))
            .collect(),
        photo_types,
        selected_type,
    })
}
