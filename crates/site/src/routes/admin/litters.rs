//! Litter management.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    Form,
    extract::{Path, Query, State},
    response::{IntoResponse, Response},
};
use serde::Deserialize;
use tracing::instrument;

use parti_poodles_core::{LitterId, ParentDogId};

use crate::db::{LitterRepository, ParentDogRepository, PuppyRepository};
use crate::error::AppError;
use crate::middleware::RequireAdminAuth;
use crate::models::{CurrentAdmin, Litter, LitterPatch, NewLitter};
use crate::routes::admin::forms::{
    self, Flash, SelectOption, date, flag, options, parsed, required, text,
};
use crate::routes::admin::path_id;
use crate::state::AppState;

const LIST_PATH: &str = "/admin/litters";

/// Litter form data.
#[derive(Debug, Default, Deserialize)]
pub struct LitterForm {
    pub name: Option<String>,
    pub date_of_birth: Option<String>,
    pub dam_id: Option<String>,
    pub sire_id: Option<String>,
    pub description: Option<String>,
    pub is_active: Option<String>,
}

impl LitterForm {
    fn into_patch(self) -> Result<LitterPatch, AppError> {
        Ok(LitterPatch {
            name: text(self.name),
            date_of_birth: date("date_of_birth", self.date_of_birth)?,
            dam_id: parsed::<ParentDogId>("dam_id", self.dam_id)?,
            sire_id: parsed::<ParentDogId>("sire_id", self.sire_id)?,
            description: text(self.description),
            is_active: flag("is_active", self.is_active)?,
        })
    }

    fn into_new(mut self) -> Result<NewLitter, AppError> {
        let name = required("name", self.name.take())?;
        let patch = self.into_patch()?;
        Ok(NewLitter {
            date_of_birth: patch.date_of_birth,
            dam_id: patch.dam_id,
            sire_id: patch.sire_id,
            description: patch.description,
            is_active: patch.is_active.unwrap_or(true),
            ..NewLitter::named(name)
        })
    }
}

/// Litter display data with form values.
#[derive(Clone)]
pub struct LitterRow {
    pub id: String,
    pub name: String,
    pub date_of_birth: String,
    pub dam: String,
    pub sire: String,
    pub description: String,
    pub is_active: bool,
    pub puppy_count: usize,
    pub dam_options: Vec<SelectOption>,
    pub sire_options: Vec<SelectOption>,
}

/// Litter management template.
#[derive(Template, WebTemplate)]
#[template(path = "admin/litters.html")]
pub struct LittersTemplate {
    pub admin: CurrentAdmin,
    pub flash: Flash,
    pub litters: Vec<LitterRow>,
    pub dam_options: Vec<SelectOption>,
    pub sire_options: Vec<SelectOption>,
}

/// List litters with create and edit forms.
#[instrument(skip(state))]
pub async fn index(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Query(flash): Query<Flash>,
) -> Result<impl IntoResponse, AppError> {
    let mut litters = LitterRepository::new(state.store()).list().await?;
    litters.sort_by(|a, b| b.date_of_birth.cmp(&a.date_of_birth));
    let parents = ParentDogRepository::new(state.store()).list().await?;
    let puppies = PuppyRepository::new(state.store()).list().await?;

    let (dams, sires): (Vec<_>, Vec<_>) = parents.iter().partition(|d| d.is_dam());
    let pairs = |dogs: &[&crate::models::ParentDog]| -> Vec<(String, String)> {
        dogs.iter()
            .map(|d| (d.id.to_string(), d.name.clone()))
            .collect()
    };
    let (dam_pairs, sire_pairs) = (pairs(&dams), pairs(&sires));
    let name_of = |id: Option<ParentDogId>| {
        id.and_then(|id| parents.iter().find(|d| d.id == id))
            .map(|d| d.name.clone())
            .unwrap_or_default()
    };

    let rows = litters
        .iter()
        .map(|litter: &Litter| {
            let dam_id = litter.dam_id.map(|id| id.to_string());
            let sire_id = litter.sire_id.map(|id| id.to_string());
            LitterRow {
                id: litter.id.to_string(),
                name: litter.name.clone(),
                date_of_birth: litter
                    .date_of_birth
                    .map(|d| d.to_string())
                    .unwrap_or_default(),
                dam: name_of(litter.dam_id),
                sire: name_of(litter.sire_id),
                description: litter.description.clone().unwrap_or_default(),
                is_active: litter.is_active,
                puppy_count: puppies
                    .iter()
                    .filter(|p| p.litter_id == Some(litter.id))
                    .count(),
                dam_options: options(dam_pairs.clone(), dam_id.as_deref()),
                sire_options: options(sire_pairs.clone(), sire_id.as_deref()),
            }
        })
        .collect();

    Ok(LittersTemplate {
        admin,
        flash,
        litters: rows,
        dam_options: options(dam_pairs, None),
        sire_options: options(sire_pairs, None),
    })
}

/// Create a litter.
#[instrument(skip(state, form))]
pub async fn create(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Form(form): Form<LitterForm>,
) -> Response {
    let result = async {
        let new = form.into_new()?;
        Ok::<_, AppError>(LitterRepository::new(state.store()).create(&new).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Litter added")
}

/// Update a litter.
#[instrument(skip(state, form))]
pub async fn update(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
    Form(form): Form<LitterForm>,
) -> Response {
    let result = async {
        let id: LitterId = path_id(&id)?;
        let patch = form.into_patch()?;
        Ok::<_, AppError>(LitterRepository::new(state.store()).update(id, &patch).await?)
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Litter updated")
}

/// Delete a litter. Its puppies keep their (now dangling) litter reference.
#[instrument(skip(state))]
pub async fn delete(
    State(state): State<AppState>,
    RequireAdminAuth(admin): RequireAdminAuth,
    Path(id): Path<String>,
) -> Response {
    let result = async {
        let id: LitterId = path_id(&id)?;
        LitterRepository::new(state.store()).remove(id).await?;
        Ok::<_, AppError>(())
    }
    .await;
    forms::finish(&state, result, LIST_PATH, "Litter deleted")
}
