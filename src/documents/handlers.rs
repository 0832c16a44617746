use axum::{
    extract::State,
    http::{header, StatusCode},
    response::{IntoResponse, Redirect},
    routing::{get, post},
    Json, Router,
};
use tracing::{info, instrument};

use super::{
    dto::{PresignUploadRequest, PresignUploadResponse, RegisterDocumentRequest},
    policy::{check_filename, check_upload, ensure_key_for_matter, mint_key},
    repo::{Document, NewDocument},
};
use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    matters::access::load_accessible_matter,
    state::AppState,
};

pub fn document_routes() -> Router<AppState> {
    Router::new()
        .route("/matters/:id/uploads", post(presign_upload))
        .route("/matters/:id/documents", get(list_documents).post(register_document))
        .route("/documents/:id/download", get(download_document))
}

/// Phase one of an upload: mint a key under the matter and hand back a
/// presigned PUT for it. Nothing is recorded yet.
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn presign_upload(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(matter_id): AppPath<i64>,
    AppJson(body): AppJson<PresignUploadRequest>,
) -> AppResult<Json<PresignUploadResponse>> {
    let matter = load_accessible_matter(state.matters.as_ref(), &user, matter_id).await?;
    check_upload(&body.filename, &body.content_type)?;

    let cfg = &state.config.storage;
    let key = mint_key(&cfg.upload_prefix, matter.id, &body.filename);
    let url = state
        .storage
        .presign_put(&key, body.content_type.trim(), cfg.presign_ttl_secs)
        .await
        .map_err(AppError::storage)?;

    info!(matter_id = matter.id, key = %key, "upload presigned");
    Ok(Json(PresignUploadResponse {
        key,
        url,
        expires_in: cfg.presign_ttl_secs,
    }))
}

/// Phase two: record a finished upload. The object itself is not checked.
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn register_document(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(matter_id): AppPath<i64>,
    AppJson(body): AppJson<RegisterDocumentRequest>,
) -> AppResult<impl IntoResponse> {
    let matter = load_accessible_matter(state.matters.as_ref(), &user, matter_id).await?;

    let filename = body.filename.trim();
    if filename.is_empty() {
        return Err(AppError::bad_request("Filename is required"));
    }
    check_filename(filename)?;
    ensure_key_for_matter(&state.config.storage.upload_prefix, matter.id, &body.key)?;

    let doc = state
        .documents
        .insert(NewDocument {
            filename: filename.to_string(),
            storage_key: body.key,
            matter_id: matter.id,
            uploaded_by: user.id,
        })
        .await?;

    info!(matter_id = matter.id, document_id = doc.id, "document registered");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/documents/{}/download", doc.id))],
        Json(doc),
    ))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn list_documents(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(matter_id): AppPath<i64>,
) -> AppResult<Json<Vec<Document>>> {
    let matter = load_accessible_matter(state.matters.as_ref(), &user, matter_id).await?;
    let docs = state.documents.list_for_matter(matter.id).await?;
    Ok(Json(docs))
}

/// 307 to a short-lived presigned GET.
#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn download_document(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Redirect> {
    let doc = state
        .documents
        .find(id)
        .await?
        .ok_or_else(|| AppError::not_found("Document not found"))?;
    load_accessible_matter(state.matters.as_ref(), &user, doc.matter_id).await?;

    let url = state
        .storage
        .presign_get(&doc.storage_key, state.config.storage.presign_ttl_secs)
        .await
        .map_err(AppError::storage)?;
    Ok(Redirect::temporary(&url))
}
