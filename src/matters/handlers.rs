use axum::{
    extract::State,
    http::{header, StatusCode},
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use tracing::{info, instrument, warn};

use super::{
    access::{load_accessible_matter, require_role},
    dto::{
        clean_description, clean_status, clean_title, ClientMatterItem, ClientSummary,
        CreateMatterRequest, LawyerMatterItem, UpdateMatterRequest, DEFAULT_STATUS,
    },
    repo_types::{Matter, MatterUpdate, NewMatter},
};
use crate::{
    auth::{extractors::CurrentUser, repo_types::Role},
    error::{AppError, AppResult},
    extract::{AppJson, AppPath},
    state::AppState,
};

pub fn matter_routes() -> Router<AppState> {
    Router::new()
        .route("/matters", get(list_my_matters).post(create_matter))
        .route("/matters/:id", get(get_matter).patch(update_matter))
        .route("/client/matters", get(list_client_matters))
        .route("/lawyer/matters", get(list_lawyer_matters))
        .route("/clients", get(list_clients))
}

/// Role-branched "my matters".
#[instrument(skip_all)]
pub async fn list_my_matters(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<Matter>>> {
    let matters = match user.role() {
        Some(Role::Client) => state.matters.list_for_client(user.id).await?,
        Some(Role::Lawyer) => state.matters.list_for_lawyer(user.id).await?,
        None => {
            warn!(user_id = user.id, role = %user.role, "unsupported role");
            return Err(AppError::forbidden("Unsupported role"));
        }
    };
    Ok(Json(matters))
}

#[instrument(skip_all)]
pub async fn list_client_matters(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ClientMatterItem>>> {
    require_role(&user, Role::Client)?;
    let matters = state.matters.list_for_client(user.id).await?;
    Ok(Json(matters.into_iter().map(Into::into).collect()))
}

#[instrument(skip_all)]
pub async fn list_lawyer_matters(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<LawyerMatterItem>>> {
    require_role(&user, Role::Lawyer)?;
    let matters = state.matters.list_for_lawyer(user.id).await?;
    Ok(Json(matters.into_iter().map(Into::into).collect()))
}

/// Clients a lawyer can open a matter for.
#[instrument(skip_all)]
pub async fn list_clients(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
) -> AppResult<Json<Vec<ClientSummary>>> {
    require_role(&user, Role::Lawyer)?;
    let clients = state.users.list_by_role(Role::Client).await?;
    Ok(Json(clients.into_iter().map(Into::into).collect()))
}

#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn create_matter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppJson(body): AppJson<CreateMatterRequest>,
) -> AppResult<impl IntoResponse> {
    require_role(&user, Role::Lawyer)?;

    let title = clean_title(&body.title)?;
    let description = clean_description(body.description.as_deref())?;
    let status = match body.status.as_deref() {
        Some(s) => clean_status(s)?,
        None => DEFAULT_STATUS.to_string(),
    };

    let client = state
        .users
        .find_by_id(body.client_id)
        .await?
        .filter(|c| c.role() == Some(Role::Client))
        .ok_or_else(|| AppError::not_found("Client not found"))?;

    let matter = state
        .matters
        .insert(NewMatter {
            title,
            description,
            status,
            client_id: client.id,
            lawyer_id: Some(user.id),
        })
        .await?;

    info!(matter_id = matter.id, client_id = client.id, "matter created");
    Ok((
        StatusCode::CREATED,
        [(header::LOCATION, format!("/matters/{}", matter.id))],
        Json(matter),
    ))
}

#[instrument(skip(state, user), fields(user_id = user.id))]
pub async fn get_matter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Matter>> {
    let matter = load_accessible_matter(state.matters.as_ref(), &user, id).await?;
    Ok(Json(matter))
}

/// Status/description only, and only by the assigned lawyer.
#[instrument(skip(state, user, body), fields(user_id = user.id))]
pub async fn update_matter(
    State(state): State<AppState>,
    CurrentUser(user): CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(body): AppJson<UpdateMatterRequest>,
) -> AppResult<Json<Matter>> {
    let matter = load_accessible_matter(state.matters.as_ref(), &user, id).await?;
    require_role(&user, Role::Lawyer)?;

    let update = MatterUpdate {
        status: body.status.as_deref().map(clean_status).transpose()?,
        description: match body.description.as_deref() {
            Some(d) => Some(
                clean_description(Some(d))?
                    .ok_or_else(|| AppError::bad_request("Description must not be blank"))?,
            ),
            None => None,
        },
    };
    if update.status.is_none() && update.description.is_none() {
        return Err(AppError::bad_request("Nothing to update"));
    }

    let updated = state
        .matters
        .update(matter.id, update)
        .await?
        .ok_or_else(|| AppError::not_found("Matter not found"))?;
    info!(matter_id = updated.id, status = %updated.status, "matter updated");
    Ok(Json(updated))
}
