use anyhow::Context;
use async_trait::async_trait;
use sqlx::{FromRow, PgPool};
use time::OffsetDateTime;

use crate::error::AppError;

#[derive(Debug, Clone, FromRow)]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewContactSubmission {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

#[async_trait]
pub trait ContactRepo: Send + Sync {
    async fn insert(&self, submission: NewContactSubmission) -> Result<ContactSubmission, AppError>;
}

#[derive(Clone)]
pub struct PgContactRepo {
    db: PgPool,
}

impl PgContactRepo {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ContactRepo for PgContactRepo {
    async fn insert(&self, s: NewContactSubmission) -> Result<ContactSubmission, AppError> {
        sqlx::query_as::<_, ContactSubmission>(
            r#"
            INSERT INTO contact_submissions (name, email, phone, message)
            VALUES ($1, $2, $3, $4)
            RETURNING id, name, email, phone, message, created_at
            "#,
        )
        .bind(&s.name)
        .bind(&s.email)
        .bind(&s.phone)
        .bind(&s.message)
        .fetch_one(&self.db)
        .await
        .context("insert contact submission")
        .map_err(AppError::storage)
    }
}
