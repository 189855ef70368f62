//! Parent dog management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::{Gender, ParentDogId, ParentDogStatus};

use crate::db::ParentDogRepository;
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, NewParentDog, ParentDog, ParentDogPatch};
use crate::routes::admin::forms::{
    self, Flash, SelectOption, date, enum_options, lines, parsed, required, text,
};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/parent-dogs";

/// Parent dog form data.
#[derive(Debug, Default, Deserialize)]
pub struct ParentDogForm {
    pub name: Option<String>,
    pub registered_name: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub date_of_birth: Option<String>,
    pub description: Option<String>,
    pub photos: Option<String>,
    pub status: Option<String>,
    pub health_testing: Option<String>,
    pub achievements: Option<String>,
    pub pedigree: Option<String>,
    pub microchip_id: Option<String>,
    pub registration_number: Option<String>,
    pub weight: Option<String>,
    pub height: Option<String>,
}

impl ParentDogForm {
    fn into_patch(self) -> Result<ParentDogPatch, AppError> {
        Ok(ParentDogPatch {
            name: text(self.name),
            registered_name: text(self.registered_name),
            color: text(self.color),
            gender: parsed::<Gender>("gender", self.gender)?,
            date_of_birth: date("date_of_birth", self.date_of_birth)?,
            description: text(self.description),
            photos: lines(self.photos),
            status: parsed::<ParentDogStatus>("status", self.status)?,
            health_testing: text(self.health_testing),
            achievements: text(self.achievements),
            pedigree: text(self.pedigree),
            microchip_id: text(self.microchip_id),
            registration_number: text(self.registration_number),
            weight: parsed::<f64>("weight", self.weight)?,
            height: parsed::<f64>("height", self.height)?,
        })
    }

    fn into_new(mut self) -> Result<NewParentDog, AppError> {
        let name = required("name", self.name.take())?;
        let patch = self.into_patch()?;
        let gender = patch
            .gender
            .ok_or_else(|| AppError::BadRequest("gender is required".to_string()))?;
        let status = patch.status.unwrap_or(ParentDogStatus::Active);

        Ok(NewParentDog {
            registered_name: patch.registered_name,
            color: patch.color,
            date_of_birth: patch.date_of_birth,
            description: patch.description,
            photos: patch.photos.unwrap_or_default(),
            health_testing: patch.health_testing,
            achievements: patch.achievements,
            pedigree: patch.pedigree,
            microchip_id: patch.microchip_id,
            registration_number: patch.registration_number,
            weight: patch.weight,
            height: patch.height,
            ..NewParentDog::new(name, gender, status)
        })
    }
}

/// Parent dog display data with form values.
#[derive(Clone)]
pub struct ParentDogRow {
    pub id: String,
    pub name: String,
    pub registered_name: String,
    pub color: String,
    pub gender: String,
    pub date_of_birth: String,
    pub description: String,
    pub photos: String,
    pub status: String,
    pub health_testing: String,
    pub achievements: String,
    pub pedigree: String,
    pub microchip_id: String,
    pub registration_number: String,
    pub weight: String,
    pub height: String,
    pub gender_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
}

impl From<&ParentDog> for ParentDogRow {
    fn from(dog: &ParentDog) -> Self {
        let or_blank = |v: &Option<String>| v.clone().unwrap_or_default();
        Self {
            id: dog.id.to_string(),
            name: dog.name.clone(),
            registered_name: or_blank(&dog.registered_name),
            color: or_blank(&dog.color),
            gender: dog.gender.to_string(),
            date_of_birth: dog
                .date_of_birth
                .map(|d| d.to_string())
                .unwrap_or_default(),
            description: or_blank(&dog.description),
            photos: dog.photos.join("\n"),
            status: dog.status.to_string(),
            health_testing: or_blank(&dog.health_testing),
            achievements: or_blank(&dog.achievements),
            pedigree: or_blank(&dog.pedigree),
            microchip_id: or_blank(&dog.microchip_id),
            registration_number: or_blank(&dog.registration_number),
            weight: dog.weight.map(|w| w.to_string()).unwrap_or_default(),
            height: dog.height.map(|h| h.to_string()).unwrap_or_default(),
            gender_options: enum_options(Gender::ALL, Some(dog.gender)),
            status_options: enum_options(ParentDogStatus::ALL, Some(dog.status)),
        }
    }
}

/// Parent dog management template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/parent_dogs.html")]
pub struct ParentDogsTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub dogs: Vec<ParentDogRow>,
    pub gender_options: Vec<SelectOption>,
    pub status_options: Vec<SelectOption>,
}

/// List parent dogs with create and edit forms.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let mut dogs = ParentDogRepository::new(state.store()).list().await?;
    dogs.sort_by(|a, b| a.name.cmp(&b.name));

    Ok(ParentDogsTemplate {
        admin,
        flash,
        dogs: dogs.iter().map(ParentDogRow::from).collect(),
        gender_options: enum_options(Gender::ALL, None),
        status_options: enum_options(ParentDogStatus::ALL, Some(ParentDogStatus::Active)),
    })
}

/// Create a parent dog.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<ParentDogForm>,
) -> Response {
    let result = async {
        let new = form.into_new()?;
        Ok::<_, AppError>(ParentDogRepository::new(state.store()).create(&new).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Parent dog added")
}

/// Update a parent dog.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<ParentDogForm>,
) -> Response {
    let result = async {
        let id: ParentDogId = path_id(&id)?;
        let patch = form.into_patch()?;
        Ok::<_, AppError>(ParentDogRepository::new(state.store()).update(id, &patch).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Parent dog updated")
}

/// Delete a parent dog. Puppies and litters referencing it are untouched.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: ParentDogId = path_id(&id)?;
        ParentDogRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Parent dog deleted")
}
