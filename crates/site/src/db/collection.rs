//! Typed CRUD over one table.
//!
//! [`Collection`] turns documents into typed records. The per-table
//! repositories wrap it and add the named queries each table supports.

use std::marker::PhantomData;

use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::{Map, Value};
use uuid::Uuid;

use super::schema::TableSchema;
use super::{Document, DocumentStore, RepositoryError, Store};

/// A record type stored in a table.
pub trait Table: DeserializeOwned + Send {
    /// The table's schema.
    const SCHEMA: &'static TableSchema;

    /// Typed id of the table's records.
    type Id: Copy + Into<Uuid> + From<Uuid> + Send + Sync;

    /// Fields accepted by `create`.
    type New: Serialize + Sync;

    /// Fields accepted by `update`; `None` fields are left unchanged.
    type Patch: Serialize + Sync;

    /// Checks beyond what the field types already enforce.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` describing the first problem.
    fn validate_new(_new: &Self::New) -> Result<(), RepositoryError> {
        Ok(())
    }

    /// Checks applied to partial updates.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` describing the first problem.
    fn validate_patch(_patch: &Self::Patch) -> Result<(), RepositoryError> {
        Ok(())
    }
}

/// Reject a blank required string.
///
/// # Errors
///
/// Returns `RepositoryError::Validation` if `value` is empty after trimming.
pub fn require_non_blank(field: &str, value: &str) -> Result<(), RepositoryError> {
    if value.trim().is_empty() {
        return Err(RepositoryError::Validation(format!("{field} is required")));
    }
    Ok(())
}

/// Serialize a value that must be a JSON object.
fn to_object(value: &impl Serialize) -> Result<Map<String, Value>, RepositoryError> {
    match serde_json::to_value(value) {
        Ok(Value::Object(map)) => Ok(map),
        Ok(other) => Err(RepositoryError::Validation(format!(
            "expected an object, got {other}"
        ))),
        Err(e) => Err(RepositoryError::Validation(e.to_string())),
    }
}

fn decode<T: Table>(doc: Document) -> Result<T, RepositoryError> {
    let id = doc.id;
    serde_json::from_value(doc.into_value()).map_err(|e| {
        RepositoryError::DataCorruption(format!("{} {id}: {e}", T::SCHEMA.name))
    })
}

/// Typed access to one table.
pub struct Collection<'a, T> {
    store: &'a Store,
    _table: PhantomData<fn() -> T>,
}

impl<'a, T: Table> Collection<'a, T> {
    /// Create a collection over `store`.
    #[must_use]
    pub const fn new(store: &'a Store) -> Self {
        Self {
            store,
            _table: PhantomData,
        }
    }

    /// All records.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    /// Returns `RepositoryError::DataCorruption` if a record does not decode.
    pub async fn list(&self) -> Result<Vec<T>, RepositoryError> {
        let docs = self.store.list(T::SCHEMA).await?;
        docs.into_iter().map(decode).collect()
    }

    /// Records whose indexed `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::UnknownIndex` if `field` is not indexed.
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn list_by(
        &self,
        field: &str,
        value: impl Serialize + Send,
    ) -> Result<Vec<T>, RepositoryError> {
        let value =
            serde_json::to_value(value).map_err(|e| RepositoryError::Validation(e.to_string()))?;
        let docs = self.store.list_by_index(T::SCHEMA, field, &value).await?;
        docs.into_iter().map(decode).collect()
    }

    /// First record whose indexed `field` equals `value`.
    ///
    /// # Errors
    ///
    /// Same as [`Collection::list_by`].
    pub async fn first_by(
        &self,
        field: &str,
        value: impl Serialize + Send,
    ) -> Result<Option<T>, RepositoryError> {
        Ok(self.list_by(field, value).await?.into_iter().next())
    }

    /// One record, or `None` if absent.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the query fails.
    pub async fn get(&self, id: T::Id) -> Result<Option<T>, RepositoryError> {
        self.store
            .get(T::SCHEMA, id.into())
            .await?
            .map(decode)
            .transpose()
    }

    /// Insert a record and return its new id.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Validation` if the fields are invalid.
    /// Returns `RepositoryError::Conflict` on a duplicate unique value.
    pub async fn create(&self, new: &T::New) -> Result<T::Id, RepositoryError> {
        T::validate_new(new)?;
        let body = to_object(new)?;
        let doc = self.store.insert(T::SCHEMA, body).await?;
        Ok(T::Id::from(doc.id))
    }

    /// Merge the set fields of `patch` into a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::NotFound` if the id does not exist.
    /// Returns `RepositoryError::Validation` if the fields are invalid.
    pub async fn update(&self, id: T::Id, patch: &T::Patch) -> Result<T, RepositoryError> {
        T::validate_patch(patch)?;
        let changes = to_object(patch)?;
        let doc = self.store.patch(T::SCHEMA, id.into(), changes).await?;
        decode(doc)
    }

    /// Delete a record.
    ///
    /// # Errors
    ///
    /// Returns `RepositoryError::Database` if the delete fails. A missing
    /// id is not an error.
    pub async fn remove(&self, id: T::Id) -> Result<(), RepositoryError> {
        self.store.delete(T::SCHEMA, id.into()).await
    }
}

/// CRUD behaviour every table shares, checked by each table's tests.
#[cfg(test)]
#[allow(clippy::unwrap_used)]
pub mod contract {
    use chrono::{DateTime, Utc};
    use serde::Serialize;
    use serde_json::{Map, Value};

    use super::{Collection, Table, to_object};
    use crate::db::Store;

    fn fields(value: &impl Serialize) -> Map<String, Value> {
        to_object(value).unwrap()
    }

    fn updated_at(record: &Map<String, Value>) -> DateTime<Utc> {
        serde_json::from_value(record.get("updated_at").cloned().unwrap()).unwrap()
    }

    /// Create a record from `new`, read it back, then apply `patch`.
    ///
    /// Every field given to `create` comes back unchanged with equal
    /// timestamps. The update changes exactly the patched fields and
    /// strictly advances `updated_at`.
    pub async fn create_get_update<T: Table + Serialize>(new: &T::New, patch: &T::Patch) {
        let store = Store::memory();
        let rows = Collection::<T>::new(&store);
        let table = T::SCHEMA.name;

        let id = rows.create(new).await.unwrap();
        let created = fields(&rows.get(id).await.unwrap().unwrap());
        for (field, value) in fields(new) {
            if !value.is_null() {
                assert_eq!(created.get(&field), Some(&value), "{table}.{field} after create");
            }
        }
        assert!(created.contains_key("created_at"), "{table} has created_at");
        assert_eq!(
            created.get("created_at"),
            created.get("updated_at"),
            "{table} timestamps after create"
        );

        let changes = fields(patch);
        assert!(!changes.is_empty(), "{table} patch sets something");
        rows.update(id, patch).await.unwrap();
        let updated = fields(&rows.get(id).await.unwrap().unwrap());

        for (field, value) in &changes {
            assert_ne!(created.get(field), Some(value), "{table}.{field} patch is a change");
            assert_eq!(updated.get(field), Some(value), "{table}.{field} after update");
        }
        for (field, before) in &created {
            if field == "updated_at" || changes.contains_key(field) {
                continue;
            }
            assert_eq!(updated.get(field), Some(before), "{table}.{field} left alone");
        }
        assert!(updated_at(&updated) > updated_at(&created), "{table} updated_at advances");
    }
}
