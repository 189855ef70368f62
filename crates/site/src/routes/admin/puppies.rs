//! Puppy management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::{Gender, LitterId, ParentDogId, PuppyId, PuppyStatus};

use crate::db::{LitterRepository, ParentDogRepository, PuppyRepository};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Litter, NewPuppy, ParentDog, Puppy, PuppyPatch};
use crate::routes::admin::forms::{
    self, Flash, SelectOption, cents, dollars_input, enum_options, lines, options, parsed,
    required, text,
};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/puppies";

/// Puppy form data. Every input arrives as optional text.
#[derive(Debug, Default, Deserialize)]
pub struct PuppyForm {
    pub name: Option<String>,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub description: Option<String>,
    pub status: Option<String>,
    pub photos: Option<String>,
    pub parent_dam: Option<String>,
    pub parent_sire: Option<String>,
    pub parent_dam_id: Option<String>,
    pub parent_sire_id: Option<String>,
    pub health_testing: Option<String>,
    pub microchip_id: Option<String>,
    pub litter_id: Option<String>,
    pub price_min: Option<String>,
    pub price_max: Option<String>,
}

impl PuppyForm {
    fn into_patch(self) -> Result<PuppyPatch, AppError> {
        Ok(PuppyPatch {
            name: text(self.name),
            color: text(self.color),
            gender: parsed::<Gender>("gender", self.gender)?,
            description: text(self.description),
            status: parsed::<PuppyStatus>("status", self.status)?,
            photos: lines(self.photos),
            parent_dam: text(self.parent_dam),
            parent_sire: text(self.parent_sire),
            parent_dam_id: parsed::<ParentDogId>("parent_dam_id", self.parent_dam_id)?,
            parent_sire_id: parsed::<ParentDogId>("parent_sire_id", self.parent_sire_id)?,
            health_testing: text(self.health_testing),
            microchip_id: text(self.microchip_id),
            litter_name: None,
            litter_date_of_birth: None,
            litter_id: parsed::<LitterId>("litter_id", self.litter_id)?,
            price_min: cents("price_min", self.price_min)?,
            price_max: cents("price_max", self.price_max)?,
        })
    }

    fn into_new(mut self) -> Result<NewPuppy, AppError> {
        let name = required("name", self.name.take())?;
        let patch = self.into_patch()?;
        Ok(NewPuppy {
            name,
            color: patch.color,
            gender: patch.gender,
            description: patch.description,
            status: Some(patch.status.unwrap_or_default()),
            photos: patch.photos.unwrap_or_default(),
            parent_dam: patch.parent_dam,
            parent_sire: patch.parent_sire,
            parent_dam_id: patch.parent_dam_id,
            parent_sire_id: patch.parent_sire_id,
            health_testing: patch.health_testing,
            microchip_id: patch.microchip_id,
            litter_name: None,
            litter_date_of_birth: None,
            litter_id: patch.litter_id,
            price_min: patch.price_min,
            price_max: patch.price_max,
        })
    }
}

/// Copy the litter's name and birth date onto the puppy.
async fn litter_details(
    state: &AppState,
    litter_id: Option<LitterId>,
) -> Result<Option<Litter>, AppError> {
    match litter_id {
        Some(id) => Ok(LitterRepository::new(state.store()).get(id).await?),
        None => Ok(None),
    }
}

/// Puppy display data with form values.
#[derive(Clone)]
pub struct PuppyRow {
    pub id: String,
    pub name: String,
    pub color: String,
    pub description: String,
    pub status: String,
    pub price: String,
    pub photos: String,
    pub photo_count: usize,
    pub parent_dam: String,
    pub parent_sire: String,
    pub health_testing: String,
    pub microchip_id: String,
    pub litter_name: String,
    pub price_min: String,
    pub price_max: String,
    pub status_options: Vec<SelectOption>,
    pub gender_options: Vec<SelectOption>,
    pub litter_options: Vec<SelectOption>,
    pub dam_options: Vec<SelectOption>,
    pub sire_options: Vec<SelectOption>,
}

/// Choices shared by every form on the page.
struct Choices {
    litters: Vec<(String, String)>,
    dams: Vec<(String, String)>,
    sires: Vec<(String, String)>,
}

impl Choices {
    fn new(litters: &[Litter], parents: &[ParentDog]) -> Self {
        let pairs = |dams: bool| {
            parents
                .iter()
                .filter(|d| d.is_dam() == dams)
                .map(|d| (d.id.to_string(), d.name.clone()))
                .collect()
        };
        Self {
            litters: litters
                .iter()
                .map(|l| (l.id.to_string(), l.name.clone()))
                .collect(),
            dams: pairs(true),
            sires: pairs(false),
        }
    }
}

impl PuppyRow {
    fn new(puppy: &Puppy, choices: &Choices) -> Self {
        let litter = puppy.litter_id.map(|id| id.to_string());
        let dam = puppy.parent_dam_id.map(|id| id.to_string());
        let sire = puppy.parent_sire_id.map(|id| id.to_string());

        Self {
            id: puppy.id.to_string(),
            name: puppy.name.clone(),
            color: puppy.color.clone().unwrap_or_default(),
            description: puppy.description.clone().unwrap_or_default(),
            status: puppy.status.unwrap_or_default().to_string(),
            price: puppy.price().label(),
            photos: puppy.photos.join("\n"),
            photo_count: puppy.photos.len(),
            parent_dam: puppy.parent_dam.clone().unwrap_or_default(),
            parent_sire: puppy.parent_sire.clone().unwrap_or_default(),
            health_testing: puppy.health_testing.clone().unwrap_or_default(),
            microchip_id: puppy.microchip_id.clone().unwrap_or_default(),
            litter_name: puppy.litter_name.clone().unwrap_or_default(),
            price_min: dollars_input(puppy.price_min),
            price_max: dollars_input(puppy.price_max),
            status_options: enum_options(PuppyStatus::ALL, puppy.status),
            gender_options: enum_options(Gender::ALL, puppy.gender),
            litter_options: options(choices.litters.clone(), litter.as_deref()),
            dam_options: options(choices.dams.clone(), dam.as_deref()),
            sire_options: options(choices.sires.clone(), sire.as_deref()),
        }
    }
}

/// Puppy management template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/puppies.html")]
pub struct PuppiesTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub puppies: Vec<PuppyRow>,
    pub status_options: Vec<SelectOption>,
    pub gender_options: Vec<SelectOption>,
    pub litter_options: Vec<SelectOption>,
    pub dam_options: Vec<SelectOption>,
    pub sire_options: Vec<SelectOption>,
}

/// List puppies with create and edit forms.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let mut puppies = PuppyRepository::new(state.store()).list().await?;
    puppies.sort_by(|a, b| b.created_at.cmp(&a.created_at));
    let litters = LitterRepository::new(state.store()).list().await?;
    let parents = ParentDogRepository::new(state.store()).list().await?;
    let choices = Choices::new(&litters, &parents);

    Ok(PuppiesTemplate {
        admin,
        flash,
        puppies: puppies.iter().map(|p| PuppyRow::new(p, &choices)).collect(),
        status_options: enum_options(PuppyStatus::ALL, Some(PuppyStatus::Available)),
        gender_options: enum_options(Gender::ALL, None),
        litter_options: options(choices.litters, None),
        dam_options: options(choices.dams, None),
        sire_options: options(choices.sires, None),
    })
}

/// Create a puppy.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<PuppyForm>,
) -> Response {
    let result = async {
        let mut new = form.into_new()?;
        if let Some(litter) = litter_details(&state, new.litter_id).await? {
            new.litter_name = Some(litter.name);
            new.litter_date_of_birth = litter.date_of_birth;
        }
        let id = PuppyRepository::new(state.store()).create(&new).await?;
        tracing::info!(puppy_id = %id, admin = %admin.username, "Puppy created");
        Ok::<_, AppError>(id)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Puppy added")
}

/// Update a puppy. Blank inputs leave fields unchanged.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<PuppyForm>,
) -> Response {
    let result = async {
        let id: PuppyId = path_id(&id)?;
        let mut patch = form.into_patch()?;
        if let Some(litter) = litter_details(&state, patch.litter_id).await? {
            patch.litter_name = Some(litter.name);
            patch.litter_date_of_birth = litter.date_of_birth;
        }
        Ok::<_, AppError>(PuppyRepository::new(state.store()).update(id, &patch).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Puppy updated")
}

/// Delete a puppy.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: PuppyId = path_id(&id)?;
        PuppyRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Puppy deleted")
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    fn form(pairs: &[(&str, &str)]) -> PuppyForm {
        let fields: serde_json::Map<String, serde_json::Value> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), serde_json::Value::from(*v)))
            .collect();
        serde_json::from_value(serde_json::Value::Object(fields)).unwrap()
    }

    #[test]
    fn test_create_requires_name() {
        let err = form(&[("name", "  "), ("color", "red")])
            .into_new()
            .unwrap_err();
        assert_eq!(err.to_string(), "Bad request: name is required");
    }

    #[test]
    fn test_create_defaults_to_available() {
        let new = form(&[("name", "Bella"), ("price_min", "2,500"), ("photos", "a.jpg\nb.jpg")])
            .into_new()
            .unwrap();
        assert_eq!(new.status, Some(PuppyStatus::Available));
        assert_eq!(new.price_min, Some(250_000));
        assert_eq!(new.photos, vec!["a.jpg", "b.jpg"]);
    }

    #[test]
    fn test_blank_update_fields_are_unset() {
        let patch = form(&[("name", ""), ("status", "sold"), ("litter_id", "")])
            .into_patch()
            .unwrap();
        assert_eq!(patch.name, None);
        assert_eq!(patch.status, Some(PuppyStatus::Sold));
        assert_eq!(patch.litter_id, None);
    }

    #[test]
    fn test_bad_enum_rejected() {
        assert!(form(&[("gender", "Female")]).into_patch().is_err());
    }
}
