//! Puppy domain types.

use chrono::{DateTime, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use parti_poodles_core::{Gender, LitterId, ParentDogId, PriceRange, PuppyId, PuppyStatus};

/// A puppy listed on the site.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Puppy {
    #[serde(rename = "_id")]
    pub id: PuppyId,
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PuppyStatus>,
    #[serde(default)]
    pub photos: Vec<String>,
    /// Dam's name as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    /// Sire's name as free text.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_testing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microchip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_id: Option<LitterId>,
    /// Lower price bound in AUD cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,
    /// Upper price bound in AUD cents.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Puppy {
    /// The puppy's price range.
    #[must_use]
    pub const fn price(&self) -> PriceRange {
        PriceRange::new(self.price_min, self.price_max)
    }

    /// Whether the puppy can still be reserved.
    #[must_use]
    pub fn is_available(&self) -> bool {
        self.status == Some(PuppyStatus::Available)
    }
}

/// Fields for creating a puppy.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewPuppy {
    pub name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PuppyStatus>,
    #[serde(default)]
    pub photos: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_testing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microchip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_id: Option<LitterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,
}

/// Partial update of a puppy. Unset fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct PuppyPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub color: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gender: Option<Gender>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub status: Option<PuppyStatus>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photos: Option<Vec<String>>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire_id: Option<ParentDogId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub health_testing: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub microchip_id: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_date_of_birth: Option<NaiveDate>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub litter_id: Option<LitterId>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_min: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub price_max: Option<i64>,
}
