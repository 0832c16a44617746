use anyhow::Context;
use async_trait::async_trait;
use sqlx::PgPool;

use super::repo_types::{Matter, MatterUpdate, NewMatter};
use crate::error::AppError;

/// Matter store. Listings are newest first.
#[async_trait]
pub trait MatterRepo: Send + Sync {
    async fn find(&self, id: i64) -> Result<Option<Matter>, AppError>;
    async fn insert(&self, matter: NewMatter) -> Result<Matter, AppError>;
    async fn update(&self, id: i64, update: MatterUpdate) -> Result<Option<Matter>, AppError>;
    async fn list_for_client(&self, client_id: i64) -> Result<Vec<Matter>, AppError>;
    async fn list_for_lawyer(&self, lawyer_id: i64) -> Result<Vec<Matter>, AppError>;
}

#[derive(Clone)]
pub struct PgMatterRepo {
    db: PgPool,
}

impl PgMatterRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl MatterRepo for PgMatterRepo {
    async fn find(&self, id: i64) -> Result<Option<Matter>, AppError> {
        sqlx::query_as::<_, Matter>(
            r#"
            SELECT id, title, description, status, client_id, lawyer_id, created_at
            FROM matters
            WHERE id = $1
            "#,
        )
        .bind(id)
        .fetch_optional(&self.db)
        .await
        .context("find matter")
        .map_err(AppError::storage)
    }

    async fn insert(&self, matter: NewMatter) -> Result<Matter, AppError> {
        sqlx::query_as::<_, Matter>(
            r#"
            INSERT INTO matters (title, description, status, client_id, lawyer_id)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING id, title, description, status, client_id, lawyer_id, created_at
            "#,
        )
        .bind(&matter.title)
        .bind(&matter.description)
        .bind(&matter.status)
        .bind(matter.client_id)
        .bind(matter.lawyer_id)
        .fetch_one(&self.db)
        .await
        .context("insert matter")
        .map_err(AppError::storage)
    }

    async fn update(&self, id: i64, update: MatterUpdate) -> Result<Option<Matter>, AppError> {
        sqlx::query_as::<_, Matter>(
            r#"
            UPDATE matters
               SET status = COALESCE($2, status),
                   description = COALESCE($3, description)
             WHERE id = $1
            RETURNING id, title, description, status, client_id, lawyer_id, created_at
            "#,
        )
        .bind(id)
        .bind(&update.status)
        .bind(&update.description)
        .fetch_optional(&self.db)
        .await
        .context("update matter")
        .map_err(AppError::storage)
    }

    async fn list_for_client(&self, client_id: i64) -> Result<Vec<Matter>, AppError> {
        sqlx::query_as::<_, Matter>(
            r#"
            SELECT id, title, description, status, client_id, lawyer_id, created_at
            FROM matters
            WHERE client_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(client_id)
        .fetch_all(&self.db)
        .await
        .context("list matters for client")
        .map_err(AppError::storage)
    }

    async fn list_for_lawyer(&self, lawyer_id: i64) -> Result<Vec<Matter>, AppError> {
        sqlx::query_as::<_, Matter>(
            r#"
            SELECT id, title, description, status, client_id, lawyer_id, created_at
            FROM matters
            WHERE lawyer_id = $1
            ORDER BY created_at DESC, id DESC
            "#,
        )
        .bind(lawyer_id)
        .fetch_all(&self.db)
        .await
        .context("list matters for lawyer")
        .map_err(AppError::storage)
    }
}
