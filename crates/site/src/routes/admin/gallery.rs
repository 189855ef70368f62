//! Gallery moderation.
//!
//! Photos start private; an admin makes them public.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::GalleryPhotoId;

use crate::db::GalleryPhotoRepository;
use crate::error::AppError;
use crate::filters;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, GalleryPhotoWithUrl, NewGalleryPhoto};
use crate::routes::admin::forms::{self, Flash, flag, required, text};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/gallery";

/// New photo form data.
#[derive(Debug, Default, Deserialize)]
pub struct PhotoForm {
    pub filename: Option<String>,
    pub url: Option<String>,
    pub caption: Option<String>,
    pub is_public: Option<String>,
    pub uploader_name: Option<String>,
    pub uploader_email: Option<String>,
    pub puppy_name: Option<String>,
    pub parent_dam: Option<String>,
    pub parent_sire: Option<String>,
    pub age_description: Option<String>,
    pub photo_type: Option<String>,
    pub related_photo_id: Option<String>,
}

impl PhotoForm {
    fn into_new(self, uploaded_by: &CurrentAdmin) -> Result<NewGalleryPhoto, AppError> {
        let url = required("url", self.url)?;
        // Default the filename to the last path segment of the URL.
        let filename = text(self.filename).unwrap_or_else(|| {
            url.rsplit('/')
                .next()
                .unwrap_or(url.as_str())
                .to_string()
        });

        Ok(NewGalleryPhoto {
            filename,
            url,
            caption: text(self.caption),
            is_public: flag("is_public", self.is_public)?.unwrap_or(false),
            uploaded_by: Some(uploaded_by.id.to_string()),
            uploader_name: text(self.uploader_name).or_else(|| Some(uploaded_by.name.clone())),
            uploader_email: text(self.uploader_email),
            puppy_name: text(self.puppy_name),
            parent_dam: text(self.parent_dam),
            parent_sire: text(self.parent_sire),
            age_description: text(self.age_description),
            photo_type: text(self.photo_type),
            related_photo_id: text(self.related_photo_id),
        })
    }
}

/// Visibility toggle form data.
#[derive(Debug, Deserialize)]
pub struct VisibilityForm {
    pub is_public: Option<String>,
}

/// Gallery moderation template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/gallery.html")]
pub struct GalleryTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub pending: Vec<GalleryPhotoWithUrl>,
    pub published: Vec<GalleryPhotoWithUrl>,
}

/// List all photos, pending ones first.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let mut photos = GalleryPhotoRepository::new(state.store()).list().await?;
    photos.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let resolved = state.storage().resolve_all(photos).await;
    let (published, pending): (Vec<_>, Vec<_>) =
        resolved.into_iter().partition(|p| p.photo.is_public);

    Ok(GalleryTemplate {
        admin,
        flash,
        pending,
        published,
    })
}

/// Add a photo.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<PhotoForm>,
) -> Response {
    let result = async {
        let new = form.into_new(&admin)?;
        Ok::<_, AppError>(GalleryPhotoRepository::new(state.store()).create(&new).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Photo added")
}

/// Publish or hide a photo.
#[instrument(skip(state))]
pub async fn set_visibility(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<VisibilityForm>,
) -> Response {
    let result = async {
        let id: GalleryPhotoId = path_id(&id)?;
        let is_public = flag("is_public", form.is_public)?
            .ok_or_else(|| AppError::BadRequest("is_public is required".to_string()))?;
        Ok::<_, AppError>(
            GalleryPhotoRepository::new(state.store())
                .set_public(id, is_public)
                .await?,
        )
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Photo visibility changed")
}

/// Delete a photo.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: GalleryPhotoId = path_id(&id)?;
        GalleryPhotoRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Photo deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use parti_poodles_core::AdminUserId;

    use super::*;

    fn admin() -> CurrentAdmin {
        CurrentAdmin {
            id: AdminUserId::generate(),
            username: "owner".to_string(),
            name: "Pat Owner".to_string(),
            role: None,
        }
    }

    #[test]
    fn test_filename_defaults_from_url() {
        let form = PhotoForm {
            url: Some("https://cdn.example.com/puppies/bella.jpg".to_string()),
            ..PhotoForm::default()
        };
        let new = form.into_new(&admin()).unwrap();
        assert_eq!(new.filename, "bella.jpg");
        assert!(!new.is_public);
        assert_eq!(new.uploader_name.as_deref(), Some("Pat Owner"));
    }

    #[test]
    fn test_url_required() {
        let err = PhotoForm::default().into_new(&admin()).unwrap_err();
        assert_eq!(err.to_string(), "Bad request: url is required");
    }
}
