//! Gallery photo repository.

use parti_poodles_core::GalleryPhotoId;

use super::collection::{Collection, Table, require_non_blank};
use super::schema::{self, TableSchema};
use super::{RepositoryError, Store};
use crate::models::{GalleryPhoto, GalleryPhotoPatch, NewGalleryPhoto};

impl Table for GalleryPhoto {
    const SCHEMA: &'static TableSchema = &schema::GALLERY_PHOTOS;
    type Id = GalleryPhotoId;
    type New = NewGalleryPhoto;
    type Patch = GalleryPhotoPatch;

    fn validate_new(new: &NewGalleryPhoto) -> Result<(), RepositoryError> {
        require_non_blank("filename", &new.filename)?;
        require_non_blank("url", &new.url)
    }

    fn validate_patch(patch: &GalleryPhotoPatch) -> Result<(), RepositoryError> {
        if let Some(filename) = &patch.filename {
            require_non_blank("filename", filename)?;
        }
        if let Some(url) = &patch.url {
            require_non_blank("url", url)?;
        }
        Ok(())
    }
}

/// Repository for gallery photos.
///
/// Records come back with `url` as stored; resolving storage ids to
/// fetchable URLs is done by [`crate::services::storage`].
pub struct GalleryPhotoRepository<'a> {
    rows: Collection<'a, GalleryPhoto>,
}

impl<'a> GalleryPhotoRepository<'a> {
    /// Create a new gallery photo repository.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            rows: Collection::new(store),
        }
    }

    /// Every photo, public or not.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list(&self) -> Result<Vec<GalleryPhoto>, RepositoryError> {
        self.rows.list().await
    }

    /// Photos approved for the public gallery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_public(&self) -> Result<Vec<GalleryPhoto>, RepositoryError> {
        self.rows.list_by("is_public", true).await
    }

    /// Photos of one type (`puppy`, `parent`, `family`, ...).
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn list_by_type(&self, photo_type: &str) -> Result<Vec<GalleryPhoto>, RepositoryError> {
        self.rows.list_by("photo_type", photo_type).await
    }

    /// One photo, or `None`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails.
    pub async fn get(&self, id: GalleryPhotoId) -> Result<Option<GalleryPhoto>, RepositoryError> {
        self.rows.get(id).await
    }

    /// Add a photo. New photos are private unless `is_public` is set.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` for a blank filename or URL.
    pub async fn create(&self, new: &NewGalleryPhoto) -> Result<GalleryPhotoId, RepositoryError> {
        self.rows.create(new).await
    }

    /// Update a photo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the photo does not exist.
    pub async fn update(
        &self,
        id: GalleryPhotoId,
        patch: &GalleryPhotoPatch,
    ) -> Result<GalleryPhoto, RepositoryError> {
        self.rows.update(id, patch).await
    }

    /// Show or hide a photo in the public gallery.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the photo does not exist.
    pub async fn set_public(
        &self,
        id: GalleryPhotoId,
        is_public: bool,
    ) -> Result<GalleryPhoto, RepositoryError> {
        let patch = GalleryPhotoPatch {
            is_public: Some(is_public),
            ..GalleryPhotoPatch::default()
        };
        self.rows.update(id, &patch).await
    }

    /// Delete a photo.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError` if the store query fails. Removing a
    /// missing id succeeds.
    pub async fn remove(&self, id: GalleryPhotoId) -> Result<(), RepositoryError> {
        self.rows.remove(id).await
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use crate::db::collection::contract;

    fn photo(filename: &str, photo_type: &str) -> NewGalleryPhoto {
        NewGalleryPhoto {
            filename: filename.to_string(),
            url: format!("/images/{filename}"),
            photo_type: Some(photo_type.to_string()),
            ..NewGalleryPhoto::default()
        }
    }

    #[tokio::test]
    async fn test_new_photos_are_private() {
        let store = Store::memory();
        let repo = GalleryPhotoRepository::new(&store);

        let id = repo.create(&photo("milo.jpg", "puppy")).await.unwrap();
        let stored = repo.get(id).await.unwrap().unwrap();

        assert!(!stored.is_public);
        assert!(repo.list_public().await.unwrap().is_empty());
        assert_eq!(repo.list().await.unwrap().len(), 1);
    }

    #[tokio::test]
    async fn test_set_public_moves_photo_into_public_list() {
        let store = Store::memory();
        let repo = GalleryPhotoRepository::new(&store);
        let id = repo.create(&photo("milo.jpg", "puppy")).await.unwrap();
        repo.create(&photo("daisy.jpg", "parent")).await.unwrap();

        let before = repo.get(id).await.unwrap().unwrap();
        let after = repo.set_public(id, true).await.unwrap();
        assert!(after.is_public);
        assert_eq!(after.filename, before.filename);
        assert!(after.updated_at > before.updated_at);

        let public = repo.list_public().await.unwrap();
        assert_eq!(public.len(), 1);
        assert_eq!(public[0].id, id);
    }

    #[tokio::test]
    async fn test_list_by_type() {
        let store = Store::memory();
        let repo = GalleryPhotoRepository::new(&store);
        repo.create(&photo("milo.jpg", "puppy")).await.unwrap();
        repo.create(&photo("rosie.jpg", "puppy")).await.unwrap();
        repo.create(&photo("daisy.jpg", "parent")).await.unwrap();

        assert_eq!(repo.list_by_type("puppy").await.unwrap().len(), 2);
        assert_eq!(repo.list_by_type("family").await.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_blank_url_rejected() {
        let store = Store::memory();
        let repo = GalleryPhotoRepository::new(&store);
        let new = NewGalleryPhoto {
            url: String::new(),
            ..photo("milo.jpg", "puppy")
        };
        assert!(matches!(
            repo.create(&new).await,
            Err(RepositoryError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn test_remove_missing_succeeds() {
        let store = Store::memory();
        let repo = GalleryPhotoRepository::new(&store);
        repo.remove(GalleryPhotoId::generate()).await.unwrap();
        assert!(repo.list().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_shared_crud_contract() {
        let new = NewGalleryPhoto {
            caption: Some("Milo at eight weeks".to_string()),
            puppy_name: Some("Milo".to_string()),
            ..photo("milo.jpg", "puppy")
        };
        let patch = GalleryPhotoPatch {
            caption: Some("Milo at nine weeks".to_string()),
            ..GalleryPhotoPatch::default()
        };
        contract::create_get_update::<GalleryPhoto>(&new, &patch).await;
    }
}
