//! In-process document store.
//!
//! Used when no database is configured (demo mode) and as the test double for
//! everything above the storage layer. Each table is a vector of documents in
//! insertion order behind its own lock.

use std::collections::HashMap;
use std::sync::Arc;

use parti_poodles_core::{Clock, SystemClock, next_timestamp};
use serde_json::{Map, Value};
use tokio::sync::RwLock;
use uuid::Uuid;

use super::schema::{self, TableSchema};
use super::{Document, DocumentStore, RepositoryError};

/// Documents held in memory, lost on restart.
#[derive(Debug)]
pub struct MemoryDocumentStore {
    tables: HashMap<&'static str, RwLock<Vec<Document>>>,
    clock: Arc<dyn Clock>,
}

impl Default for MemoryDocumentStore {
    fn default() -> Self {
        Self::with_clock(Arc::new(SystemClock))
    }
}

impl MemoryDocumentStore {
    /// Create an empty store stamping timestamps from `clock`.
    #[must_use]
    pub fn with_clock(clock: Arc<dyn Clock>) -> Self {
        let tables = schema::ALL
            .iter()
            .map(|table| (table.name, RwLock::new(Vec::new())))
            .collect();
        Self { tables, clock }
    }

    fn table(&self, table: &TableSchema) -> Result<&RwLock<Vec<Document>>, RepositoryError> {
        self.tables
            .get(table.name)
            .ok_or_else(|| RepositoryError::DataCorruption(format!("unknown table {}", table.name)))
    }
}

/// Reject `body` if it would duplicate a unique index value held by another
/// document.
fn check_unique(
    table: &TableSchema,
    docs: &[Document],
    body: &Map<String, Value>,
    skip: Option<Uuid>,
) -> Result<(), RepositoryError> {
    for index in table.unique_indexes() {
        let Some(value) = body.get(index.field) else {
            continue;
        };
        let taken = docs
            .iter()
            .filter(|doc| Some(doc.id) != skip)
            .any(|doc| doc.body.get(index.field) == Some(value));
        if taken {
            return Err(RepositoryError::Conflict(format!(
                "{}.{} already exists",
                table.name, index.field
            )));
        }
    }
    Ok(())
}

impl DocumentStore for MemoryDocumentStore {
    async fn list(&self, table: &'static TableSchema) -> Result<Vec<Document>, RepositoryError> {
        Ok(self.table(table)?.read().await.clone())
    }

    async fn list_where(
        &self,
        table: &'static TableSchema,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        let docs = self.table(table)?.read().await;
        Ok(docs
            .iter()
            .filter(|doc| doc.body.get(field) == Some(value))
            .cloned()
            .collect())
    }

    async fn get(
        &self,
        table: &'static TableSchema,
        id: Uuid,
    ) -> Result<Option<Document>, RepositoryError> {
        let docs = self.table(table)?.read().await;
        Ok(docs.iter().find(|doc| doc.id == id).cloned())
    }

    async fn insert(
        &self,
        table: &'static TableSchema,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let mut docs = self.table(table)?.write().await;
        check_unique(table, &docs, &body, None)?;

        let now = self.clock.now();
        let doc = Document {
            id: Uuid::new_v4(),
            created_at: now,
            updated_at: now,
            body,
        };
        docs.push(doc.clone());
        Ok(doc)
    }

    async fn patch(
        &self,
        table: &'static TableSchema,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let mut docs = self.table(table)?.write().await;
        check_unique(table, &docs, &changes, Some(id))?;

        let doc = docs
            .iter_mut()
            .find(|doc| doc.id == id)
            .ok_or(RepositoryError::NotFound)?;
        doc.body.extend(changes);
        doc.updated_at = next_timestamp(self.clock.now(), doc.updated_at);
        Ok(doc.clone())
    }

    async fn delete(&self, table: &'static TableSchema, id: Uuid) -> Result<(), RepositoryError> {
        self.table(table)?.write().await.retain(|doc| doc.id != id);
        Ok(())
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;
    use chrono::{Duration, TimeZone, Utc};
    use parti_poodles_core::ManualClock;
    use serde_json::json;

    fn body(value: Value) -> Map<String, Value> {
        match value {
            Value::Object(map) => map,
            _ => Map::new(),
        }
    }

    fn store_with_clock() -> (MemoryDocumentStore, Arc<ManualClock>) {
        let clock = Arc::new(ManualClock::new(
            Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap(),
        ));
        (MemoryDocumentStore::with_clock(clock.clone()), clock)
    }

    #[tokio::test]
    async fn test_insert_stamps_equal_timestamps() {
        let (store, clock) = store_with_clock();
        let doc = store
            .insert(&schema::LITTERS, body(json!({"name": "Spring"})))
            .await
            .unwrap();
        assert_eq!(doc.created_at, clock.now());
        assert_eq!(doc.created_at, doc.updated_at);
    }

    #[tokio::test]
    async fn test_patch_merges_and_advances_updated_at() {
        let (store, clock) = store_with_clock();
        let doc = store
            .insert(
                &schema::PUPPIES,
                body(json!({"name": "Milo", "color": "red"})),
            )
            .await
            .unwrap();

        // Same instant: updated_at must still move forward.
        let patched = store
            .patch(&schema::PUPPIES, doc.id, body(json!({"color": "cream"})))
            .await
            .unwrap();
        assert!(patched.updated_at > doc.updated_at);
        assert_eq!(patched.created_at, doc.created_at);
        assert_eq!(patched.body["name"], "Milo");
        assert_eq!(patched.body["color"], "cream");

        clock.advance(Duration::minutes(5));
        let again = store
            .patch(&schema::PUPPIES, doc.id, body(json!({"color": "red"})))
            .await
            .unwrap();
        assert_eq!(again.updated_at, clock.now());
    }

    #[tokio::test]
    async fn test_patch_missing_is_not_found() {
        let (store, _) = store_with_clock();
        let err = store
            .patch(&schema::PUPPIES, Uuid::new_v4(), Map::new())
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::NotFound));
    }

    #[tokio::test]
    async fn test_delete_then_get_is_none() {
        let (store, _) = store_with_clock();
        let doc = store
            .insert(&schema::LITTERS, body(json!({"name": "Autumn"})))
            .await
            .unwrap();
        store.delete(&schema::LITTERS, doc.id).await.unwrap();
        assert!(store.get(&schema::LITTERS, doc.id).await.unwrap().is_none());
        store.delete(&schema::LITTERS, doc.id).await.unwrap();
    }

    #[tokio::test]
    async fn test_unique_index_conflict() {
        let (store, _) = store_with_clock();
        store
            .insert(&schema::ADMIN_USERS, body(json!({"username": "sally"})))
            .await
            .unwrap();
        let err = store
            .insert(&schema::ADMIN_USERS, body(json!({"username": "sally"})))
            .await
            .unwrap_err();
        assert!(matches!(err, RepositoryError::Conflict(_)));
    }

    #[tokio::test]
    async fn test_patch_keeps_own_unique_value() {
        let (store, _) = store_with_clock();
        let doc = store
            .insert(
                &schema::CUSTOMERS,
                body(json!({"name": "Jo", "email": "jo@example.com"})),
            )
            .await
            .unwrap();
        store
            .patch(
                &schema::CUSTOMERS,
                doc.id,
                body(json!({"email": "jo@example.com", "phone": "0400"})),
            )
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_where_exact_match() {
        let (store, _) = store_with_clock();
        for (name, status) in [("A", "available"), ("B", "sold"), ("C", "available")] {
            store
                .insert(
                    &schema::PUPPIES,
                    body(json!({"name": name, "status": status})),
                )
                .await
                .unwrap();
        }
        let available = store
            .list_where(&schema::PUPPIES, "status", &json!("available"))
            .await
            .unwrap();
        let names: Vec<_> = available.iter().map(|d| d.body["name"].clone()).collect();
        assert_eq!(names, vec![json!("A"), json!("C")]);
    }
}
