//! `PostgreSQL` document store.
//!
//! All tables share `site.documents`; `table_name` partitions them. Index
//! lookups use JSONB containment so the GIN index on `body` applies, and the
//! unique indexes from the schema are partial unique indexes created by the
//! migration.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use parti_poodles_core::{Clock, SystemClock};
use serde_json::{Map, Value};
use sqlx::PgPool;
use uuid::Uuid;

use super::schema::TableSchema;
use super::{Document, DocumentStore, RepositoryError};

// =============================================================================
// Internal Row Types
// =============================================================================

#[derive(Debug, sqlx::FromRow)]
struct DocumentRow {
    id: Uuid,
    body: sqlx::types::Json<Value>,
    created_at: DateTime<Utc>,
    updated_at: DateTime<Utc>,
}

impl TryFrom<DocumentRow> for Document {
    type Error = RepositoryError;

    fn try_from(row: DocumentRow) -> Result<Self, Self::Error> {
        let Value::Object(body) = row.body.0 else {
            return Err(RepositoryError::DataCorruption(format!(
                "document {} body is not an object",
                row.id
            )));
        };
        Ok(Self {
            id: row.id,
            created_at: row.created_at,
            updated_at: row.updated_at,
            body,
        })
    }
}

/// Map unique violations to `Conflict`, everything else to `Database`.
fn map_write_error(table: &TableSchema, e: sqlx::Error) -> RepositoryError {
    let is_unique_violation = matches!(&e, sqlx::Error::Database(db_err) if db_err.is_unique_violation());
    if is_unique_violation {
        let field = table
            .unique_indexes()
            .next()
            .map_or("value", |index| index.field);
        return RepositoryError::Conflict(format!("{}.{field} already exists", table.name));
    }
    RepositoryError::Database(e)
}

// =============================================================================
// Store
// =============================================================================

/// Documents persisted in `PostgreSQL`.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
    clock: Arc<dyn Clock>,
}

impl PgDocumentStore {
    /// Create a store over an existing pool using the system clock.
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self {
            pool,
            clock: Arc::new(SystemClock),
        }
    }

    /// Replace the clock used for timestamps.
    #[must_use]
    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// The underlying connection pool.
    #[must_use]
    pub const fn pool(&self) -> &PgPool {
        &self.pool
    }
}

impl DocumentStore for PgDocumentStore {
    async fn list(&self, table: &'static TableSchema) -> Result<Vec<Document>, RepositoryError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body, created_at, updated_at
            FROM site.documents
            WHERE table_name = $1
            ORDER BY created_at, id
            ",
        )
        .bind(table.name)
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn list_where(
        &self,
        table: &'static TableSchema,
        field: &str,
        value: &Value,
    ) -> Result<Vec<Document>, RepositoryError> {
        let mut filter = Map::new();
        filter.insert(field.to_string(), value.clone());

        let rows = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body, created_at, updated_at
            FROM site.documents
            WHERE table_name = $1 AND body @> $2
            ORDER BY created_at, id
            ",
        )
        .bind(table.name)
        .bind(sqlx::types::Json(Value::Object(filter)))
        .fetch_all(&self.pool)
        .await?;

        rows.into_iter().map(TryInto::try_into).collect()
    }

    async fn get(
        &self,
        table: &'static TableSchema,
        id: Uuid,
    ) -> Result<Option<Document>, RepositoryError> {
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            SELECT id, body, created_at, updated_at
            FROM site.documents
            WHERE table_name = $1 AND id = $2
            ",
        )
        .bind(table.name)
        .bind(id)
        .fetch_optional(&self.pool)
        .await?;

        row.map(TryInto::try_into).transpose()
    }

    async fn insert(
        &self,
        table: &'static TableSchema,
        body: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        let now = self.clock.now();
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            INSERT INTO site.documents (id, table_name, body, created_at, updated_at)
            VALUES ($1, $2, $3, $4, $4)
            RETURNING id, body, created_at, updated_at
            ",
        )
        .bind(Uuid::new_v4())
        .bind(table.name)
        .bind(sqlx::types::Json(Value::Object(body)))
        .bind(now)
        .fetch_one(&self.pool)
        .await
        .map_err(|e| map_write_error(table, e))?;

        row.try_into()
    }

    async fn patch(
        &self,
        table: &'static TableSchema,
        id: Uuid,
        changes: Map<String, Value>,
    ) -> Result<Document, RepositoryError> {
        // GREATEST keeps updated_at strictly increasing even if the clock
        // has not advanced since the last write.
        let row = sqlx::query_as::<_, DocumentRow>(
            r"
            UPDATE site.documents
            SET body = body || $3,
                updated_at = GREATEST($4, updated_at + INTERVAL '1 microsecond')
            WHERE table_name = $1 AND id = $2
            RETURNING id, body, created_at, updated_at
            ",
        )
        .bind(table.name)
        .bind(id)
        .bind(sqlx::types::Json(Value::Object(changes)))
        .bind(self.clock.now())
        .fetch_optional(&self.pool)
        .await
        .map_err(|e| map_write_error(table, e))?
        .ok_or(RepositoryError::NotFound)?;

        row.try_into()
    }

    async fn delete(&self, table: &'static TableSchema, id: Uuid) -> Result<(), RepositoryError> {
        sqlx::query(
            r"
            DELETE FROM site.documents
            WHERE table_name = $1 AND id = $2
            ",
        )
        .bind(table.name)
        .bind(id)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}
