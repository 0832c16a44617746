use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

#[derive(Debug, Clone, Serialize, FromRow)]
pub struct Matter {
    pub id: i64,
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub client_id: i64,
    pub lawyer_id: Option<i64>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewMatter {
    pub title: String,
    pub description: Option<String>,
    pub status: String,
    pub client_id: i64,
    pub lawyer_id: Option<i64>,
}

/// Fields left as `None` keep their stored value.
#[derive(Debug, Clone, Default)]
pub struct MatterUpdate {
    pub status: Option<String>,
    pub description: Option<String>,
}
