//! Puppy listing and detail pages.

use askama::Template;
use askama_web::WebTemplate;
use axum::{
    extract::{Path, State},
    response::IntoResponse,
};
use tracing::instrument;

use parti_poodles_core::{LitterId, ParentDogId, PuppyId};

use crate::db::{LitterRepository, ParentDogRepository, PuppyRepository};
use crate::error::AppError;
use crate::filters;
use crate::models::{Litter, Puppy};
use crate::services::orientation::transforms_for;
use crate::state::AppState;

// =============================================================================
// View Types
// =============================================================================

/// Puppy display data for listing cards.
#[derive(Clone)]
pub struct PuppyCard {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub status: String,
    pub price: String,
    pub photo: Option<String>,
    pub transform: &'static str,
    litter_id: Option<LitterId>,
}

impl PuppyCard {
    fn new(puppy: &Puppy, transform: &'static str) -> Self {
        Self {
            id: puppy.id.to_string(),
            name: puppy.name.clone(),
            color: puppy.color.clone(),
            gender: puppy.gender.map(|g| g.to_string()),
            status: puppy.status.unwrap_or_default().to_string(),
            price: puppy.price().label(),
            photo: puppy.photos.first().cloned(),
            transform,
            litter_id: puppy.litter_id,
        }
    }
}

/// An image with its corrective transform.
#[derive(Clone)]
pub struct PhotoView {
    pub url: String,
    pub transform: &'static str,
}

/// Build listing cards, resolving the orientation of each lead photo.
pub async fn puppy_cards(state: &AppState, puppies: &[Puppy]) -> Vec<PuppyCard> {
    let lead_photos = puppies
        .iter()
        .map(|p| p.photos.first().cloned().unwrap_or_default());
    let transforms = transforms_for(state.orientation(), lead_photos).await;
    puppies
        .iter()
        .zip(transforms)
        .map(|(puppy, transform)| PuppyCard::new(puppy, transform))
        .collect()
}

/// Puppies from one litter.
#[derive(Clone)]
pub struct LitterGroup {
    pub name: String,
    pub born: Option<String>,
    pub description: Option<String>,
    pub puppies: Vec<PuppyCard>,
}

fn long_date(date: chrono::NaiveDate) -> String {
    date.format("%-d %B %Y").to_string()
}

/// Group cards under their litters, newest litter first.
///
/// Active litters are shown even before puppies are listed. Puppies whose
/// litter is missing or was deleted are collected in a trailing group.
fn group_by_litter(mut litters: Vec<Litter>, cards: Vec<PuppyCard>) -> Vec<LitterGroup> {
    litters.sort_by(|a, b| {
        b.date_of_birth
            .cmp(&a.date_of_birth)
            .then_with(|| a.name.cmp(&b.name))
    });

    let mut remaining = cards;
    let mut groups = Vec::with_capacity(litters.len() + 1);
    for litter in litters {
        let (mine, rest): (Vec<_>, Vec<_>) = remaining
            .into_iter()
            .partition(|card| card.litter_id == Some(litter.id));
        remaining = rest;
        if mine.is_empty() && !litter.is_active {
            continue;
        }
        groups.push(LitterGroup {
            name: litter.name,
            born: litter.date_of_birth.map(long_date),
            description: litter.description,
            puppies: mine,
        });
    }

    if !remaining.is_empty() {
        groups.push(LitterGroup {
            name: "More puppies".to_string(),
            born: None,
            description: None,
            puppies: remaining,
        });
    }
    groups
}

// =============================================================================
// Templates
// =============================================================================

/// Puppies page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/puppies.html")]
pub struct PuppiesTemplate {
    pub groups: Vec<LitterGroup>,
}

/// Puppy detail fields.
#[derive(Clone)]
pub struct PuppyDetail {
    pub id: String,
    pub name: String,
    pub color: Option<String>,
    pub gender: Option<String>,
    pub status: String,
    pub available: bool,
    pub description: Option<String>,
    pub price: String,
    pub health_testing: Option<String>,
}

/// Puppy detail page template.
#[derive(Template, WebTemplate)]
#[template(path = "pages/puppy.html")]
pub struct PuppyTemplate {
    pub puppy: PuppyDetail,
    pub photos: Vec<PhotoView>,
    pub litter_name: Option<String>,
    pub born: Option<String>,
    pub dam: Option<String>,
    pub sire: Option<String>,
    pub mates: Vec<PuppyCard>,
}

// =============================================================================
// Handlers
// =============================================================================

/// Display all puppies grouped by litter.
#[instrument(skip(state))]
pub async fn index(State(state): State<AppState>) -> Result<impl IntoResponse, AppError> {
    let puppies = PuppyRepository::new(state.store()).list().await?;
    let litters = LitterRepository::new(state.store()).list().await?;
    let cards = puppy_cards(&state, &puppies).await;

    Ok(PuppiesTemplate {
        groups: group_by_litter(litters, cards),
    })
}

/// Resolve a parent's display name, preferring the linked record.
///
/// A link to a deleted dog falls back to the free-text name.
async fn parent_name(
    parents: &ParentDogRepository<'_>,
    id: Option<ParentDogId>,
    fallback: Option<&String>,
) -> Result<Option<String>, AppError> {
    let linked = match id {
        Some(id) => parents.get(id).await?,
        None => None,
    };
    Ok(linked.map(|dog| dog.name).or_else(|| fallback.cloned()))
}

/// Display a puppy with its parents and litter mates.
#[instrument(skip(state))]
pub async fn show(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<impl IntoResponse, AppError> {
    let not_found = || AppError::NotFound(format!("puppy {id}"));
    let puppy_id = PuppyId::parse(&id).map_err(|_| not_found())?;

    let puppies = PuppyRepository::new(state.store());
    let puppy = puppies.get(puppy_id).await?.ok_or_else(not_found)?;

    let litter = match puppy.litter_id {
        Some(litter_id) => LitterRepository::new(state.store()).get(litter_id).await?,
        None => None,
    };
    let mates: Vec<Puppy> = match puppy.litter_id {
        Some(litter_id) => puppies
            .list_by_litter(litter_id)
            .await?
            .into_iter()
            .filter(|mate| mate.id != puppy.id)
            .collect(),
        None => Vec::new(),
    };

    let parents = ParentDogRepository::new(state.store());
    let dam = parent_name(&parents, puppy.parent_dam_id, puppy.parent_dam.as_ref()).await?;
    let sire = parent_name(&parents, puppy.parent_sire_id, puppy.parent_sire.as_ref()).await?;

    let transforms = transforms_for(state.orientation(), puppy.photos.iter().cloned()).await;
    let photos = puppy
        .photos
        .iter()
        .zip(transforms)
        .map(|(url, transform)| PhotoView {
            url: url.clone(),
            transform,
        })
        .collect();

    let (litter_name, born) = match litter {
        Some(litter) => (Some(litter.name), litter.date_of_birth.map(long_date)),
        None => (
            puppy.litter_name.clone(),
            puppy.litter_date_of_birth.map(long_date),
        ),
    };

    Ok(PuppyTemplate {
        puppy: PuppyDetail {
            id: puppy.id.to_string(),
            name: puppy.name.clone(),
            color: puppy.color.clone(),
            gender: puppy.gender.map(|g| g.to_string()),
            status: puppy.status.unwrap_or_default().to_string(),
            available: puppy.is_available(),
            description: puppy.description.clone(),
            price: puppy.price().label(),
            health_testing: puppy.health_testing.clone(),
        },
        photos,
        litter_name,
        born,
        dam,
        sire,
        mates: puppy_cards(&state, &mates).await,
    })
}
