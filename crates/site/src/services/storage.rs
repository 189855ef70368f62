//! Storage-id to URL resolution for gallery photos.
//!
//! A photo's `url` is either a full URL or an opaque id issued by the object
//! store. Ids are exchanged for fetchable URLs when photos are listed. A
//! failed or empty lookup never fails the listing: the photo keeps its
//! stored value.

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use futures::future::join_all;
use thiserror::Error;
use url::Url;

use crate::models::{GalleryPhoto, GalleryPhotoWithUrl};

/// Shortest string treated as a storage id.
const MIN_STORAGE_ID_LEN: usize = 20;

/// Errors from the storage service.
#[derive(Debug, Error)]
pub enum StorageError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// The storage service answered with an unexpected status.
    #[error("storage returned status {0}")]
    Status(u16),

    /// The configured base URL or a built object URL is invalid.
    #[error("invalid storage URL: {0}")]
    InvalidUrl(#[from] url::ParseError),
}

/// Whether `value` looks like an opaque storage id rather than a URL or path.
#[must_use]
pub fn is_storage_id(value: &str) -> bool {
    value.len() >= MIN_STORAGE_ID_LEN && value.bytes().all(|b| b.is_ascii_alphanumeric())
}

/// Where storage ids are resolved.
#[derive(Debug, Clone)]
pub enum ObjectStorage {
    /// An HTTP object store serving `{base}/{id}`.
    Http {
        client: reqwest::Client,
        base: Arc<Url>,
    },
    /// A fixed id to URL table (demo mode and tests).
    Fixed(Arc<HashMap<String, String>>),
    /// No storage configured; every id is absent.
    Disabled,
}

impl ObjectStorage {
    /// Storage backed by an HTTP object store at `base`.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if `base` is not a URL or the client fails to
    /// build.
    pub fn http(base: &str) -> Result<Self, StorageError> {
        let mut base = Url::parse(base)?;
        if !base.path().ends_with('/') {
            base.set_path(&format!("{}/", base.path()));
        }
        let client = reqwest::Client::builder()
            .timeout(Duration::from_secs(10))
            .build()?;
        Ok(Self::Http {
            client,
            base: Arc::new(base),
        })
    }

    /// Storage answering from a fixed table.
    #[must_use]
    pub fn fixed(entries: impl IntoIterator<Item = (String, String)>) -> Self {
        Self::Fixed(Arc::new(entries.into_iter().collect()))
    }

    /// Exchange a storage id for a URL. `Ok(None)` means the object does not
    /// exist.
    ///
    /// # Errors
    ///
    /// Returns `StorageError` if the storage service cannot be reached or
    /// answers with an error.
    pub async fn url_for(&self, id: &str) -> Result<Option<String>, StorageError> {
        match self {
            Self::Http { client, base } => {
                let url = base.join(id)?;
                let response = client.head(url.clone()).send().await?;
                let status = response.status();
                if status.is_success() {
                    Ok(Some(url.into()))
                } else if status == reqwest::StatusCode::NOT_FOUND {
                    Ok(None)
                } else {
                    Err(StorageError::Status(status.as_u16()))
                }
            }
            Self::Fixed(table) => Ok(table.get(id).cloned()),
            Self::Disabled => Ok(None),
        }
    }

    /// The display URL for one photo.
    pub async fn resolve(&self, photo: GalleryPhoto) -> GalleryPhotoWithUrl {
        let image_url = if is_storage_id(&photo.url) {
            match self.url_for(&photo.url).await {
                Ok(Some(url)) => url,
                Ok(None) => photo.url.clone(),
                Err(e) => {
                    tracing::warn!(photo_id = %photo.id, error = %e, "Storage lookup failed");
                    photo.url.clone()
                }
            }
        } else {
            photo.url.clone()
        };
        GalleryPhotoWithUrl { photo, image_url }
    }

    /// Resolve display URLs for a list of photos concurrently, keeping order.
    pub async fn resolve_all(&self, photos: Vec<GalleryPhoto>) -> Vec<GalleryPhotoWithUrl> {
        join_all(photos.into_iter().map(|photo| self.resolve(photo))).await
    }
}
