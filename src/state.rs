use std::sync::Arc;

use anyhow::Context;
use sqlx::PgPool;

use crate::{
    auth::{
        jwt::JwtKeys,
        password::Passwords,
        repo::{PgUserRepo, UserRepo},
    },
    config::AppConfig,
    contact::repo::{ContactRepo, PgContactRepo},
    documents::repo::{DocumentRepo, PgDocumentRepo},
    matters::repo::{MatterRepo, PgMatterRepo},
    storage::{Storage, StorageClient},
};

/// Everything a handler may touch. Built once at startup, cloned per request.
#[derive(Clone)]
pub struct AppState {
    pub db: PgPool,
    pub config: Arc<AppConfig>,
    pub keys: JwtKeys,
    pub passwords: Passwords,
    pub users: Arc<dyn UserRepo>,
    pub matters: Arc<dyn MatterRepo>,
    pub documents: Arc<dyn DocumentRepo>,
    pub contacts: Arc<dyn ContactRepo>,
    pub storage: Arc<dyn StorageClient>,
}

impl AppState {
    pub async fn init(config: AppConfig) -> anyhow::Result<Self> {
        let config = Arc::new(config);

        let db = sqlx::postgres::PgPoolOptions::new()
            .max_connections(10)
            .connect(&config.database_url)
            .await
            .context("connect to database")?;

        let storage = Arc::new(Storage::new(&config.storage).await?) as Arc<dyn StorageClient>;

        Ok(Self {
            keys: JwtKeys::new(&config.jwt),
            passwords: Passwords::new(&config.password)?,
            users: Arc::new(PgUserRepo::new(db.clone())),
            matters: Arc::new(PgMatterRepo::new(db.clone())),
            documents: Arc::new(PgDocumentRepo::new(db.clone())),
            contacts: Arc::new(PgContactRepo::new(db.clone())),
            db,
            config,
            storage,
        })
    }
}
