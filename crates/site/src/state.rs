//! Application state shared across handlers.

use std::sync::Arc;

use url::Url;

use crate::config::SiteConfig;
use crate::db::Store;
use crate::services::orientation::OrientationError;
use crate::services::{
    HttpExifSource, ObjectStorage, OrientationCache, OrientationPolicy, OrientationResolver,
    QueryCache, StorageError,
};

/// Errors building the application state.
#[derive(Debug, thiserror::Error)]
pub enum StateError {
    #[error("storage setup failed: {0}")]
    Storage(#[from] StorageError),
    #[error("image metadata setup failed: {0}")]
    Orientation(#[from] OrientationError),
    #[error("invalid base URL: {0}")]
    BaseUrl(#[from] url::ParseError),
}

/// Orientation resolver used by the running site.
pub type SiteOrientationResolver = OrientationResolver<HttpExifSource>;

/// Application state shared across all handlers.
#[derive(Clone)]
pub struct AppState {
    inner: Arc<AppStateInner>,
}

struct AppStateInner {
    config: SiteConfig,
    store: Store,
    storage: ObjectStorage,
    orientation: Arc<SiteOrientationResolver>,
    query_cache: QueryCache,
}

impl AppState {
    /// Build state from configuration.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the storage or image clients cannot be built.
    pub fn new(config: SiteConfig, store: Store) -> Result<Self, StateError> {
        let storage = match &config.storage_url {
            Some(url) => ObjectStorage::http(url)?,
            None => ObjectStorage::Disabled,
        };
        let cache = OrientationCache::new(config.orientation_cache_capacity);
        Self::with_parts(config, store, storage, cache)
    }

    /// Build state with an explicit storage backend and orientation cache.
    ///
    /// # Errors
    ///
    /// Returns `StateError` if the image client cannot be built.
    pub fn with_parts(
        config: SiteConfig,
        store: Store,
        storage: ObjectStorage,
        orientation_cache: OrientationCache,
    ) -> Result<Self, StateError> {
        // Storage-resolved photo URLs may be inspected too.
        let storage_host = config
            .storage_url
            .as_deref()
            .and_then(|url| Url::parse(url).ok())
            .and_then(|url| url.host_str().map(str::to_string));
        let policy = OrientationPolicy::new(
            config.normalized_image_origins.iter().cloned(),
            config.processed_image_markers.iter().cloned(),
        )
        .with_fetch_scope(
            Url::parse(&config.base_url)?,
            config.image_hosts.iter().cloned().chain(storage_host),
        );
        let source = HttpExifSource::new()?;
        let orientation = Arc::new(OrientationResolver::new(source, orientation_cache, policy));

        Ok(Self {
            inner: Arc::new(AppStateInner {
                config,
                store,
                storage,
                orientation,
                query_cache: QueryCache::default(),
            }),
        })
    }

    #[must_use]
    pub fn config(&self) -> &SiteConfig {
        &self.inner.config
    }

    #[must_use]
    pub fn store(&self) -> &Store {
        &self.inner.store
    }

    #[must_use]
    pub fn storage(&self) -> &ObjectStorage {
        &self.inner.storage
    }

    #[must_use]
    pub fn orientation(&self) -> &Arc<SiteOrientationResolver> {
        &self.inner.orientation
    }

    #[must_use]
    pub fn query_cache(&self) -> &QueryCache {
        &self.inner.query_cache
    }
}
