use axum::{
    extract::State,
    http::StatusCode,
    routing::{get, post},
    Json, Router,
};
use lazy_static::lazy_static;
use regex::Regex;
use tracing::{info, instrument, warn};

use crate::{
    auth::{
        dto::{LoginForm, PublicUser, SignupForm, SignupResponse, TokenResponse},
        extractors::CurrentUser,
        repo_types::{NewUser, Role},
    },
    error::{AppError, AppResult},
    extract::AppForm,
    state::AppState,
};

pub(crate) fn normalize_email(email: &str) -> String {
    email.trim().to_lowercase()
}

pub(crate) fn is_valid_email(email: &str) -> bool {
    lazy_static! {
        static ref EMAIL_RE: Regex = Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").unwrap();
    }
    EMAIL_RE.is_match(email)
}

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/signup", post(signup))
        .route("/login", post(login))
}

pub fn me_routes() -> Router<AppState> {
    Router::new()
        .route("/me", get(get_me))
        .route("/profile", get(get_me))
}

#[instrument(skip(state, form))]
pub async fn signup(
    State(state): State<AppState>,
    AppForm(form): AppForm<SignupForm>,
) -> AppResult<(StatusCode, Json<SignupResponse>)> {
    let name = form.name.trim().to_string();
    let email = normalize_email(&form.email);

    if name.is_empty() {
        return Err(AppError::bad_request("Name is required"));
    }
    if !is_valid_email(&email) {
        warn!(email = %email, "invalid email");
        return Err(AppError::bad_request("Invalid email"));
    }
    if form.password.chars().count() < 8 {
        return Err(AppError::bad_request("Password too short"));
    }

    // The unique index is the real guard; this only avoids hashing for nothing
    if state.users.find_by_email(&email).await?.is_some() {
        warn!(email = %email, "email already registered");
        return Err(AppError::DuplicateEmail);
    }

    let password_hash = state.passwords.hash(&form.password).map_err(AppError::internal)?;

    let user = state
        .users
        .insert(NewUser {
            name,
            email,
            password_hash,
            role: Role::Client,
        })
        .await?;

    info!(user_id = user.id, email = %user.email, "user registered");
    Ok((
        StatusCode::CREATED,
        Json(SignupResponse {
            message: "User created successfully",
            user_id: user.id,
        }),
    ))
}

#[instrument(skip(state, form))]
pub async fn login(
    State(state): State<AppState>,
    AppForm(form): AppForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let email = normalize_email(&form.email);

    let Some(user) = state.users.find_by_email(&email).await? else {
        warn!(email = %email, "login unknown email");
        return Err(AppError::InvalidCredentials);
    };

    let ok = state
        .passwords
        .verify(&form.password, &user.password_hash)
        .map_err(AppError::internal)?;
    if !ok {
        warn!(user_id = user.id, "login invalid password");
        return Err(AppError::InvalidCredentials);
    }

    let access_token = state.keys.issue_for(&user).map_err(AppError::internal)?;

    info!(user_id = user.id, "user logged in");
    Ok(Json(TokenResponse {
        access_token,
        token_type: "bearer",
    }))
}

pub async fn get_me(CurrentUser(user): CurrentUser) -> Json<PublicUser> {
    Json(user.into())
}
