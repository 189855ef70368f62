//! Business logic services.
//!
//! # Services
//!
//! - `auth` - Username and password login for admins (argon2)
//! - `orientation` - EXIF orientation lookup with a bounded cache
//! - `query_cache` - Short-lived cache of public query results
//! - `storage` - Storage id to URL resolution for gallery photos

pub mod auth;
pub mod orientation;
pub mod query_cache;
pub mod storage;

pub use auth::{AdminAuthError, AdminAuthService};
pub use orientation::{
    HttpExifSource, MetadataSource, Orientation, OrientationCache, OrientationPolicy,
    OrientationResolver, OrientationTask,
};
pub use query_cache::QueryCache;
pub use storage::{ObjectStorage, StorageError};
