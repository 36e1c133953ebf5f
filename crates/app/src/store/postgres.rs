//! PostgreSQL document store.

use async_trait::async_trait;
use serde_json::Value;
use sqlx::{PgPool, Postgres, query_as, query_scalar, types::Json};

use super::{Collection, Document, DocumentStore, QueryFilter, StoreError, StoreKind};

const GET_DOCUMENT_SQL: &str = include_str!("sql/get_document.sql");
const INSERT_DOCUMENT_SQL: &str = include_str!("sql/insert_document.sql");
const CONDITIONAL_UPDATE_DOCUMENT_SQL: &str = include_str!("sql/conditional_update_document.sql");
const DOCUMENT_EXISTS_SQL: &str = include_str!("sql/document_exists.sql");

type DocumentRow = (String, i64, Json<Value>);

/// Documents stored as `jsonb` rows with a version column; conditional
/// updates compare the version in the `WHERE` clause.
#[derive(Debug, Clone)]
pub struct PgDocumentStore {
    pool: PgPool,
}

impl PgDocumentStore {
    #[must_use]
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    async fn exists(&self, collection: Collection, id: &str) -> Result<bool, StoreError> {
        let exists: bool = query_scalar(DOCUMENT_EXISTS_SQL)
            .bind(collection.as_str())
            .bind(id)
            .fetch_one(&self.pool)
            .await?;

        Ok(exists)
    }
}

#[async_trait]
impl DocumentStore for PgDocumentStore {
    fn kind(&self) -> StoreKind {
        StoreKind::Postgres
    }

    #[tracing::instrument(
        name = "store.pg.get",
        skip(self),
        fields(collection = collection.as_str()),
        err
    )]
    async fn get(&self, collection: Collection, id: &str) -> Result<Document, StoreError> {
        let row = query_as::<Postgres, DocumentRow>(GET_DOCUMENT_SQL)
            .bind(collection.as_str())
            .bind(id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::NotFound)?;

        into_document(row)
    }

    #[tracing::instrument(
        name = "store.pg.insert",
        skip(self, body),
        fields(collection = collection.as_str()),
        err
    )]
    async fn insert(
        &self,
        collection: Collection,
        id: &str,
        body: Value,
    ) -> Result<Document, StoreError> {
        // A lost `ON CONFLICT DO NOTHING` returns no row.
        let row = query_as::<Postgres, DocumentRow>(INSERT_DOCUMENT_SQL)
            .bind(collection.as_str())
            .bind(id)
            .bind(Json(body))
            .fetch_optional(&self.pool)
            .await?
            .ok_or(StoreError::AlreadyExists)?;

        into_document(row)
    }

    #[tracing::instrument(
        name = "store.pg.conditional_update",
        skip(self, body),
        fields(collection = collection.as_str()),
        err
    )]
    async fn conditional_update(
        &self,
        collection: Collection,
        id: &str,
        expected_version: u64,
        body: Value,
    ) -> Result<Document, StoreError> {
        let expected_version =
            i64::try_from(expected_version).map_err(|_overflow| StoreError::InvalidVersion)?;

        let updated = query_as::<Postgres, DocumentRow>(CONDITIONAL_UPDATE_DOCUMENT_SQL)
            .bind(collection.as_str())
            .bind(id)
            .bind(expected_version)
            .bind(Json(body))
            .fetch_optional(&self.pool)
            .await?;

        match updated {
            Some(row) => into_document(row),
            None if self.exists(collection, id).await? => Err(StoreError::Conflict),
            None => Err(StoreError::NotFound),
        }
    }

    #[tracing::instrument(
        name = "store.pg.query",
        skip(self, filter),
        fields(collection = collection.as_str(), field = filter.field),
        err
    )]
    async fn query(
        &self,
        collection: Collection,
        filter: QueryFilter,
    ) -> Result<Vec<Document>, StoreError> {
        // The operator comes from a closed enum, never from caller input.
        let sql = format!(
            "SELECT id, version, body FROM documents \
             WHERE collection = $1 AND body -> $2 {} $3 \
             ORDER BY id",
            filter.op.as_sql()
        );

        query_as::<Postgres, DocumentRow>(&sql)
            .bind(collection.as_str())
            .bind(filter.field)
            .bind(Json(filter.value))
            .fetch_all(&self.pool)
            .await?
            .into_iter()
            .map(into_document)
            .collect()
    }
}

fn into_document((id, version, Json(body)): DocumentRow) -> Result<Document, StoreError> {
    Ok(Document {
        id,
        version: u64::try_from(version).map_err(|_negative| StoreError::InvalidVersion)?,
        body,
    })
}
