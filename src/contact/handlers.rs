use axum::{
    extract::State,
    http::StatusCode,
    response::{IntoResponse, Redirect, Response},
    routing::post,
    Json, Router,
};
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};

use super::repo::NewContactSubmission;
use crate::{
    error::{AppError, AppResult},
    extract::AppForm,
    state::AppState,
};

#[derive(Debug, Deserialize)]
pub struct ContactForm {
    pub name: String,
    pub email: String,
    pub phone: Option<String>,
    pub message: String,
}

pub fn contact_routes() -> Router<AppState> {
    Router::new().route("/contact", post(submit_contact))
}

/// Public intake form; no authentication.
#[instrument(skip_all)]
pub async fn submit_contact(
    State(state): State<AppState>,
    AppForm(form): AppForm<ContactForm>,
) -> AppResult<Response> {
    let name = form.name.trim();
    let email = form.email.trim();
    let message = form.message.trim();
    if name.is_empty() || email.is_empty() || message.is_empty() {
        return Err(AppError::bad_request("Name, email, and message are required."));
    }
    let phone = form
        .phone
        .as_deref()
        .map(str::trim)
        .filter(|p| !p.is_empty())
        .map(str::to_string);

    let saved = state
        .contacts
        .insert(NewContactSubmission {
            name: name.to_string(),
            email: email.to_string(),
            phone,
            message: message.to_string(),
        })
        .await?;
    info!(submission_id = saved.id, "contact submission stored");

    Ok(match &state.config.contact_redirect_url {
        Some(url) => Redirect::to(url).into_response(),
        None => (StatusCode::CREATED, Json(json!({ "id": saved.id }))).into_response(),
    })
}
