//! Document storage for the site's tables.
//!
//! # Tables
//!
//! - `admin_users` - Back-office accounts (argon2 password hashes)
//! - `customers` - CRM contacts
//! - `gallery_photos` - Photo gallery entries (URL or storage id)
//! - `inquiries` - Contact form submissions
//! - `litters` - Puppy litters
//! - `parent_dogs` - Breeding dams and sires
//! - `puppies` - Puppies for sale
//!
//! Records are JSON documents with a server-assigned UUID and
//! `created_at`/`updated_at` timestamps. Two stores implement
//! [`DocumentStore`]: [`PgDocumentStore`] (one JSONB table in `PostgreSQL`)
//! and [`MemoryDocumentStore`] (process memory, used for demo mode and tests).
//!
//! # Migrations
//!
//! Migrations are stored in `crates/site/migrations/` and run via:
//! ```bash
//! cargo run -p parti-poodles-cli -- migrate
//! ```

pub mod admin_users;
pub mod collection;
pub mod customers;
pub mod gallery_photos;
pub mod inquiries;
pub mod litters;
pub mod memory;
pub mod parent_dogs;
pub mod postgres;
pub mod puppies;
pub mod schema;

use std::future::Future;
use std::sync::Arc;
use std::time::Duration;

use chrono::{DateTime, Utc};
use secrecy::ExposeSecret;
use serde_json::{Map, Value};
use sqlx::PgPool;
use sqlx::postgres::PgPoolOptions;
use thiserror::Error;
use uuid::Uuid;

pub use admin_users::AdminUserRepository;
pub use collection::{Collection, Table};
pub use customers::CustomerRepository;
pub use gallery_photos::GalleryPhotoRepository;
pub use inquiries::InquiryRepository;
pub use litters::LitterRepository;
pub use memory::MemoryDocumentStore;
pub use parent_dogs::ParentDogRepository;
pub use postgres::PgDocumentStore;
pub use puppies::PuppyRepository;
pub use schema::TableSchema;

/// Errors that can occur during repository operations.
#[derive(Debug, Error)]
pub enum RepositoryError {
    /// Database error from sqlx.
    #[error("database error: {0}")]
    Database(#[from] sqlx::Error),

    /// Data in the store is corrupted or invalid.
    #[error("data corruption: {0}")]
    DataCorruption(String),

    /// Requested record was not found.
    #[error("not found")]
    NotFound,

    /// Input failed validation (missing required field, wrong type, bad id).
    #[error("validation failed: {0}")]
    Validation(String),

    /// Constraint violation (e.g., duplicate username).
    #[error("constraint violation: {0}")]
    Conflict(String),

    /// Lookup on a field that has no declared index.
    #[error("table {table} has no index on {field}")]
    UnknownIndex {
        /// Table queried.
        table: &'static str,
        /// Field that was not indexed.
        field: String,
    },
}

/// A stored record: metadata plus a JSON object body.
#[derive(Debug, Clone, PartialEq)]
pub struct Document {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
    pub body: Map<String, Value>,
}

impl Document {
    /// Merge metadata into the body, producing the record's JSON form.
    #[must_use]
    pub fn into_value(self) -> Value {
        let mut object = self.body;
        object.insert("_id".to_string(), Value::String(self.id.to_string()));
        object.insert(
            "created_at".to_string(),
            Value::String(self.created_at.to_rfc3339()),
        );
        object.insert(
            "updated_at".to_string(),
            Value::String(self.updated_at.to_rfc3339()),
        );
        Value::Object(object)
    }
}

/// Storage operations shared by every table.
///
/// Implementations stamp `created_at` and `updated_at` themselves; the body
/// passed in never contains metadata fields.
pub trait DocumentStore: Send + Sync {
    /// All documents in `table`.
    fn list(
        &self,
        table: &'static TableSchema,
    ) -> impl Future<Output = Result<Vec<Document>, RepositoryError>> + Send;

    /// Documents whose `field` equals `value` exactly. The caller has already
    /// checked that `field` is indexed.
    fn list_where(
        &self,
        table: &'static TableSchema,
        field: &str,
        value: &Value,
    ) -> impl Future<Output = Result<Vec<Document>, RepositoryError>> + Send;

    /// One document, or `None` if absent.
    fn get(
        &self,
        table: &'static TableSchema,
        id: Uuid,
    ) -> impl Future<Output = Result<Option<Document>, RepositoryError>> + Send;

    /// Store a new document and return it with its assigned id.
    fn insert(
        &self,
        table: &'static TableSchema,
        body: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, RepositoryError>> + Send;

    /// Merge `changes` over an existing document.
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist.
    fn patch(
        &self,
        table: &'static TableSchema,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> impl Future<Output = Result<Document, RepositoryError>> + Send;

    /// Delete a document. Nothing that references it is touched.
    ///
    /// Deleting an id that does not exist succeeds.
    fn delete(
        &self,
        table: &'static TableSchema,
        id: Uuid,
    ) -> impl Future<Output = Result<(), RepositoryError>> + Send;
}

/// The store the site runs against.
#[derive(Debug, Clone)]
pub enum Store {
    /// `PostgreSQL` JSONB documents.
    Postgres(PgDocumentStore),
    /// In-process documents (demo mode and tests).
    Memory(Arc<MemoryDocumentStore>),
}

impl Store {
    /// Create an empty in-memory store using the system clock.
    #[must_use]
    pub fn memory() -> Self {
        Self::Memory(Arc::new(MemoryDocumentStore::default()))
    }

    /// The connection pool, if backed by `PostgreSQL`.
    #[must_use]
    pub const fn pool(&self) -> Option<&PgPool> {
        match self {
            Self::Postgres(store) => Some(store.pool()),
            Self::Memory(_) => None,
        }
    }

    /// Check that the backing store is reachable.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if `PostgreSQL` does not answer.
    pub async fn ping(&self) -> Result<(), RepositoryError> {
        if let Self::Postgres(store) = self {
            sqlx::query("SELECT 1").fetch_one(store.pool()).await?;
        }
        Ok(())
    }

    /// Documents matching an exact value on a declared index.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UnknownIndex` if `field` is not indexed.
    pub async fn list_by_index(
        &self,
        table: &'static TableSchema,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        if table.index_on(field).is_none() {
            return Err(RepositoryError::UnknownIndex {
                table: table.name,
                field: field.to_string(),
            });
        }
        self.list_where(table, field, value).await
    }
}

impl DocumentStore for Store {
    async fn list(&self, table: &'static TableSchema) -> Result<Vec<Document>, RepositoryError> {
        match self {
            Self::Postgres(store) => store.list(table).await,
            Self::Memory(store) => store.list(table).await,
        }
    }

    async fn list_where(
        &self,
        table: &'static TableSchema,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        match self {
            Self::Postgres(store) => store.list_where(table, field, value).await,
            Self::Memory(store) => store.list_where(table, field, value).await,
        }
    }

    async fn get(
        &self,
        table: &'static TableSchema,
        id: Uuid,
    ) -> Result<Option<Document>, RepositoryError> {
        match self {
            Self::Postgres(store) => store.get(table, id).await,
            Self::Memory(store) => store.get(table, id).await,
        }
    }

    async fn insert(
        &self,
        table: &'static TableSchema,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        match self {
            Self::Postgres(store) => store.insert(table, body).await,
            Self::Memory(store) => store.insert(table, body).await,
        }
    }

    async fn patch(
        &self,
        table: &'static TableSchema,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        match self {
            Self::Postgres(store) => store.patch(table, id, changes).await,
            Self::Memory(store) => store.patch(table, id, changes).await,
        }
    }

    async fn delete(&self, table: &'static TableSchema, id: Uuid) -> Result<(), RepositoryError> {
        match self {
            Self::Postgres(store) => store.delete(table, id).await,
            Self::Memory(store) => store.delete(table, id).await,
        }
    }
}

/// Create a `PostgreSQL` connection pool with sensible defaults.
///
/// # Arguments
///
/// * `database_url` - `PostgreSQL` connection string (wrapped in `SecretString`)
///
/// # Errors
///
/// Returns `sqlx::Error` if the connection cannot be established.
pub async fn create_pool(database_url: &secrecy::SecretString) -> Result<PgPool, sqlx::Error> {
    PgPoolOptions::new()
        .max_connections(10)
        .min_connections(2)
        .acquire_timeout(Duration::from_secs(10))
        .connect(database_url.expose_secret())
        .await
}
