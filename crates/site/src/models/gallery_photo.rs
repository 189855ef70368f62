//! Gallery photo domain types.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use parti_poodles_core::GalleryPhotoId;

/// A photo in the gallery.
///
/// `url` holds either a full URL or an opaque storage id that is resolved
/// when photos are listed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct GalleryPhoto {
    #[serde(rename = "_id")]
    pub id: GalleryPhotoId,
    pub filename: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puppy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_photo_id: Option<String>,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// A gallery photo with its display URL resolved.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct GalleryPhotoWithUrl {
    #[serde(flatten)]
    pub photo: GalleryPhoto,
    /// Fetchable URL: the resolved storage URL, or `url` unchanged.
    #[serde(rename = "imageUrl")]
    pub image_url: String,
}

/// Fields for creating a gallery photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct NewGalleryPhoto {
    pub filename: String,
    pub url: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default)]
    pub is_public: bool,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puppy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_photo_id: Option<String>,
}

/// Partial update of a gallery photo.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GalleryPhotoPatch {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub url: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub caption: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub is_public: Option<bool>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploaded_by: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub uploader_email: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub puppy_name: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_dam: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub parent_sire: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub age_description: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub photo_type: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub related_photo_id: Option<String>,
}
