use async_trait::async_trait;
use axum::{
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};
use tracing::warn;

use super::{jwt::JwtKeys, repo::UserRepo, repo_types::User};
use crate::{error::AppError, state::AppState};

/// Resolves the caller behind a request. Every step fails closed with
/// `Unauthenticated`; only a broken user store surfaces as something else.
pub async fn resolve(
    headers: &HeaderMap,
    keys: &JwtKeys,
    users: &dyn UserRepo,
) -> Result<User, AppError> {
    let auth = headers
        .get(AUTHORIZATION)
        .and_then(|h| h.to_str().ok())
        .ok_or_else(|| AppError::unauthenticated("Not authenticated"))?;

    // Expect "Bearer <token>", scheme case-insensitive
    let token = match auth.trim().split_once(' ') {
        Some((scheme, token)) if scheme.eq_ignore_ascii_case("bearer") => token.trim(),
        _ => return Err(AppError::unauthenticated("Not authenticated")),
    };
    if token.is_empty() {
        return Err(AppError::unauthenticated("Not authenticated"));
    }

    let claims = keys.verify(token).map_err(|e| {
        warn!(error = %e, "bearer token rejected");
        AppError::from(e)
    })?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::unauthenticated("Invalid token payload"))?;

    users.find_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id, "token for unknown user");
        AppError::unauthenticated("User not found")
    })
}

/// The authenticated caller, freshly loaded from the user store.
pub struct CurrentUser(pub User);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        resolve(&parts.headers, &state.keys, state.users.as_ref())
            .await
            .map(CurrentUser)
    }
}
