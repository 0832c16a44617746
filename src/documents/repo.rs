use anyhow::Context;
use async_trait::async_trait;
use serde::Serialize;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::AppError;

/// Metadata for an object living in external storage.
#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Document {
    pub id: i64,
    pub filename: String,
    #[serde(rename = "key")]
    pub storage_key: String,
    pub matter_id: i64,
    pub uploaded_by: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewDocument {
    pub filename: String,
    pub storage_key: String,
    pub matter_id: i64,
    pub uploaded_by: i64,
}

#[async_trait]
pub trait DocumentRepo: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Document>, AppError>;
    /// A storage key can be registered once.
    async fn insert(&self, doc: NewDocument) -> Result<Document, AppError>;
    /// Newest first.
    async fn list_for_matter(&self, matter_id: i64) -> Result<Vec<Document>, AppError>;
}

#[derive(Clone)]
pub struct PgDocumentRepo {
    db: PgPool,
}

impl PgDocumentRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl DocumentRepo for PgDocumentRepo {
    async fn find(&self, id: i64) -> Result<Option<Document>, AppError> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, filename, storage_key, matter_id, uploaded_by, created_at
              FROM documents
             WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find document")
        .map_err(AppError::storage)
    }

    async fn insert(&self, doc: NewDocument) -> Result<Document, AppError> {
        let res = sqlx::query_as::<_, Document>(
            r#"
            INSERT INTO documents (filename, storage_key, matter_id, uploaded_by)
            VALUES ($1, $2, $3, $4)
            RETURNING id, filename, storage_key, matter_id, uploaded_by, created_at
            "#,
        )
        .bind(&doc.filename)
        .bind(&doc.storage_key)
        .bind(doc.matter_id)
        .bind(doc.uploaded_by)
        .fetch_one(&self.db)
        .await;

        match res {
            Ok(d) => Ok(d),
            Err(sqlx::Error::Database(db)) if db.is_unique_violation() => {
                Err(AppError::bad_request("Document already registered"))
            }
            Err(e) => Err(AppError::storage(anyhow::Error::new(e).context("insert document"))),
        }
    }

    async fn list_for_matter(&self, matter_id: i64) -> Result<Vec<Document>, AppError> {
        sqlx::query_as::<_, Document>(
            r#"
            SELECT id, filename, storage_key, matter_id, uploaded_by, created_at
              FROM documents
             WHERE matter_id = $1
             ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(matter_id)
        .fetch_all(&self.db)
        .await
        .context("list documents by matter")
        .map_err(AppError::storage)
    }
}
