use axum::{async_trait, extract::FromRequestParts, http::request::Parts};
use tracing::warn;

use super::jwt::JwtKeys;
use crate::{
    error::{AppError, AppResult},
    state::AppState,
    users::{repo::UserStore, repo_types::UserWithOrders},
};

/// Turns a bearer token into the user it names. Fails closed: a missing,
/// invalid or expired token is `Unauthenticated`, a token whose subject no
/// longer exists is `UserNotFound`.
pub async fn resolve(
    keys: &JwtKeys,
    users: &dyn UserStore,
    token: Option<&str>,
) -> AppResult<UserWithOrders> {
    let token = token.ok_or_else(|| AppError::Unauthenticated("Not authenticated".into()))?;
    let user_id = keys.verify(token).map_err(|e| {
        warn!(error = %e, "rejected bearer token");
        AppError::from(e)
    })?;
    users.get_by_id(user_id).await?.ok_or_else(|| {
        warn!(user_id, "token subject no longer exists");
        AppError::UserNotFound
    })
}

fn bearer_token(parts: &Parts) -> Option<&str> {
    let auth = parts
        .headers
        .get(axum::http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok())?;
    auth.strip_prefix("Bearer ")
        .or_else(|| auth.strip_prefix("bearer "))
        .map(str::trim)
        .filter(|t| !t.is_empty())
}

/// The authenticated caller, loaded with its orders.
pub struct CurrentUser(pub UserWithOrders);

#[async_trait]
impl FromRequestParts<AppState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &AppState,
    ) -> Result<Self, Self::Rejection> {
        let user = resolve(&state.jwt, state.users.as_ref(), bearer_token(parts)).await?;
        Ok(CurrentUser(user))
    }
}
