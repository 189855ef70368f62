//! Site configuration loaded from environment variables.
//!
//! # Environment Variables
//!
//! All variables are optional. With no database configured the site runs in
//! demo mode against the in-memory store.
//!
//! - `SITE_DATABASE_URL` - `PostgreSQL` connection string (falls back to `DATABASE_URL`)
//! - `SITE_HOST` - Bind address (default: 127.0.0.1)
//! - `SITE_PORT` - Listen port (default: 3000)
//! - `SITE_BASE_URL` - Public URL of the site (default: <http://localhost:3000>)
//! - `SITE_STORAGE_URL` - Object storage base URL for gallery storage ids
//! - `SITE_IMAGE_HOSTS` - Extra hosts whose images may be fetched to read
//!   their orientation (comma-separated; the site itself and the storage
//!   host are always allowed)
//! - `SITE_NORMALIZED_IMAGE_ORIGINS` - Hosts serving already-rotated images
//!   (comma-separated, default: storage.googleapis.com)
//! - `SITE_PROCESSED_IMAGE_MARKERS` - Query-string markers of server-processed
//!   images (comma-separated, default: orientation-fix)
//! - `SITE_ORIENTATION_CACHE_CAPACITY` - Max cached image orientations (default: 10000)
//! - `SENTRY_DSN` - Sentry error tracking DSN
//! - `SENTRY_ENVIRONMENT` - Sentry environment name
//! - `SENTRY_SAMPLE_RATE` - Error sample rate (default: 1.0)
//! - `SENTRY_TRACES_SAMPLE_RATE` - Traces sample rate (default: 0.1)

use std::net::{IpAddr, SocketAddr};

use secrecy::SecretString;
use thiserror::Error;
use url::Url;

const DEFAULT_NORMALIZED_ORIGINS: &str = "storage.googleapis.com";
const DEFAULT_PROCESSED_MARKERS: &str = "orientation-fix";

/// Configuration errors that can occur during loading.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),
    #[error("Invalid environment variable {0}: {1}")]
    InvalidEnvVar(String, String),
}

/// Site configuration.
#[derive(Debug, Clone)]
pub struct SiteConfig {
    /// `PostgreSQL` connection URL; `None` runs in demo mode.
    pub database_url: Option<SecretString>,
    /// IP address to bind the server to
    pub host: IpAddr,
    /// Port to listen on
    pub port: u16,
    /// Public base URL of the site
    pub base_url: String,
    /// Object storage base URL
    pub storage_url: Option<String>,
    /// Extra hosts whose images may be fetched for orientation lookups
    pub image_hosts: Vec<String>,
    /// Hosts whose images are already orientation-normalized
    pub normalized_image_origins: Vec<String>,
    /// Query-string markers of server-processed images
    pub processed_image_markers: Vec<String>,
    /// Max cached image orientations
    pub orientation_cache_capacity: u64,
    /// Sentry DSN for error tracking
    pub sentry_dsn: Option<String>,
    /// Sentry environment (e.g., "development", "production")
    pub sentry_environment: Option<String>,
    /// Sentry error sample rate (0.0 to 1.0)
    pub sentry_sample_rate: f32,
    /// Sentry traces sample rate (0.0 to 1.0)
    pub sentry_traces_sample_rate: f32,
}

impl Default for SiteConfig {
    /// Demo-mode defaults.
    fn default() -> Self {
        Self {
            database_url: None,
            host: IpAddr::from([127, 0, 0, 1]),
            port: 3000,
            base_url: "http://localhost:3000".to_string(),
            storage_url: None,
            image_hosts: Vec::new(),
            normalized_image_origins: split_list(DEFAULT_NORMALIZED_ORIGINS),
            processed_image_markers: split_list(DEFAULT_PROCESSED_MARKERS),
            orientation_cache_capacity: 10_000,
            sentry_dsn: None,
            sentry_environment: None,
            sentry_sample_rate: 1.0,
            sentry_traces_sample_rate: 0.1,
        }
    }
}

impl SiteConfig {
    /// Load configuration from environment variables.
    ///
    /// Calls `dotenvy::dotenv()` to load from `.env` file if present.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_env() -> Result<Self, ConfigError> {
        // Load .env file if present (ignore errors if not found)
        let _ = dotenvy::dotenv();
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Build configuration from an arbitrary variable lookup.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError` if a variable is set to an invalid value.
    pub fn from_lookup(get: impl Fn(&str) -> Option<String>) -> Result<Self, ConfigError> {
        let defaults = Self::default();
        let get = |key: &str| get(key).filter(|v| !v.trim().is_empty());

        let database_url = get("SITE_DATABASE_URL")
            .or_else(|| get("DATABASE_URL"))
            .map(SecretString::from);
        let host = parse_or(get("SITE_HOST"), "SITE_HOST", defaults.host)?;
        let port = parse_or(get("SITE_PORT"), "SITE_PORT", defaults.port)?;

        let base_url = get("SITE_BASE_URL").unwrap_or(defaults.base_url);
        validate_url(&base_url, "SITE_BASE_URL")?;
        let storage_url = get("SITE_STORAGE_URL");
        if let Some(url) = &storage_url {
            validate_url(url, "SITE_STORAGE_URL")?;
        }

        let image_hosts = get("SITE_IMAGE_HOSTS").map_or_else(Vec::new, |v| split_list(&v));
        let normalized_image_origins = get("SITE_NORMALIZED_IMAGE_ORIGINS")
            .map_or(defaults.normalized_image_origins, |v| split_list(&v));
        let processed_image_markers = get("SITE_PROCESSED_IMAGE_MARKERS")
            .map_or(defaults.processed_image_markers, |v| split_list(&v));
        let orientation_cache_capacity = parse_or(
            get("SITE_ORIENTATION_CACHE_CAPACITY"),
            "SITE_ORIENTATION_CACHE_CAPACITY",
            defaults.orientation_cache_capacity,
        )?;

        let sentry_sample_rate = get("SENTRY_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.sentry_sample_rate);
        let sentry_traces_sample_rate = get("SENTRY_TRACES_SAMPLE_RATE")
            .and_then(|s| s.parse().ok())
            .unwrap_or(defaults.sentry_traces_sample_rate);

        Ok(Self {
            database_url,
            host,
            port,
            base_url,
            storage_url,
            image_hosts,
            normalized_image_origins,
            processed_image_markers,
            orientation_cache_capacity,
            sentry_dsn: get("SENTRY_DSN"),
            sentry_environment: get("SENTRY_ENVIRONMENT"),
            sentry_sample_rate,
            sentry_traces_sample_rate,
        })
    }

    /// Returns the socket address for binding the server.
    #[must_use]
    pub const fn socket_addr(&self) -> SocketAddr {
        SocketAddr::new(self.host, self.port)
    }

    /// Whether the site runs without a database.
    #[must_use]
    pub const fn is_demo_mode(&self) -> bool {
        self.database_url.is_none()
    }

    /// The database URL, for commands that cannot run in demo mode.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::MissingEnvVar` if no database is configured.
    pub fn require_database_url(&self) -> Result<&SecretString, ConfigError> {
        self.database_url
            .as_ref()
            .ok_or_else(|| ConfigError::MissingEnvVar("SITE_DATABASE_URL".to_string()))
    }

    /// Whether cookies should carry the `Secure` flag.
    #[must_use]
    pub fn is_https(&self) -> bool {
        self.base_url.starts_with("https://")
    }
}

// =============================================================================
// Helper Functions
// =============================================================================

fn parse_or<T>(value: Option<String>, key: &str, default: T) -> Result<T, ConfigError>
where
    T: std::str::FromStr,
    T::Err: std::fmt::Display,
{
    value.map_or(Ok(default), |v| {
        v.trim()
            .parse()
            .map_err(|e: T::Err| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
    })
}

fn validate_url(value: &str, key: &str) -> Result<(), ConfigError> {
    Url::parse(value)
        .map(|_| ())
        .map_err(|e| ConfigError::InvalidEnvVar(key.to_string(), e.to_string()))
}

fn split_list(value: &str) -> Vec<String> {
    value
        .split(',')
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(ToString::to_string)
        .collect()
}
