use serde::{Deserialize, Serialize};
use time::OffsetDateTime;

use super::repo_types::Matter;
use crate::auth::repo_types::User;
use crate::error::AppError;

const TITLE_MAX: usize = 200;
const DESCRIPTION_MAX: usize = 1000;
const STATUS_MAX: usize = 50;
pub const DEFAULT_STATUS: &str = "Open";

#[derive(Debug, Deserialize)]
pub struct CreateMatterRequest {
    pub title: String,
    pub description: Option<String>,
    pub status: Option<String>,
    pub client_id: i64,
}

#[derive(Debug, Deserialize)]
pub struct UpdateMatterRequest {
    pub status: Option<String>,
    pub description: Option<String>,
}

/// A matter as the client sees it in `/client/matters`.
#[derive(Debug, Serialize)]
pub struct ClientMatterItem {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub description: Option<String>,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Matter> for ClientMatterItem {
    fn from(m: Matter) -> Self {
        Self {
            id: m.id,
            title: m.title,
            status: m.status,
            description: m.description,
            created_at: m.created_at,
        }
    }
}

/// `/lawyer/matters` additionally names the client.
#[derive(Debug, Serialize)]
pub struct LawyerMatterItem {
    pub id: i64,
    pub title: String,
    pub status: String,
    pub description: Option<String>,
    pub client_id: i64,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
}

impl From<Matter> for LawyerMatterItem {
    fn from(m: Matter) -> Self {
        Self {
            id: m.id,
            title: m.title,
            status: m.status,
            description: m.description,
            client_id: m.client_id,
            created_at: m.created_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClientSummary {
    pub id: i64,
    pub name: String,
    pub email: String,
}

impl From<User> for ClientSummary {
    fn from(u: User) -> Self {
        Self {
            id: u.id,
            name: u.name,
            email: u.email,
        }
    }
}

pub(crate) fn clean_title(raw: &str) -> Result<String, AppError> {
    let title = raw.trim();
    if title.is_empty() {
        return Err(AppError::bad_request("Title is required"));
    }
    if title.chars().count() > TITLE_MAX {
        return Err(AppError::bad_request("Title is too long"));
    }
    Ok(title.to_string())
}

/// Blank descriptions are stored as `NULL`.
pub(crate) fn clean_description(raw: Option<&str>) -> Result<Option<String>, AppError> {
    match raw.map(str::trim) {
        None | Some("") => Ok(None),
        Some(d) if d.chars().count() > DESCRIPTION_MAX => {
            Err(AppError::bad_request("Description is too long"))
        }
        Some(d) => Ok(Some(d.to_string())),
    }
}

pub(crate) fn clean_status(raw: &str) -> Result<String, AppError> {
    let status = raw.trim();
    if status.is_empty() {
        return Err(AppError::bad_request("Status must not be blank"));
    }
    if status.chars().count() > STATUS_MAX {
        return Err(AppError::bad_request("Status is too long"));
    }
    Ok(status.to_string())
}
