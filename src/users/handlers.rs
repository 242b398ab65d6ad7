use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::instrument;

use super::{
    dto::UserUpdateRequest,
    repo_types::UserWithOrders,
    services::{delete_user, update_user},
};
use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    extractors::{AppJson, AppPath, AppQuery},
    pagination::Pagination,
    state::AppState,
};

const MAX_USERS_PAGE: i64 = 1000;

pub fn user_routes() -> Router<AppState> {
    Router::new()
        .route("/users", get(list_users))
        .route("/users/", get(list_users))
        .route("/users/me", get(read_me))
        .route("/users/by-email/:email", get(get_user_by_email))
        .route(
            "/users/:id",
            get(get_user).patch(patch_user).delete(remove_user),
        )
}

#[instrument(skip_all)]
pub async fn read_me(CurrentUser(me): CurrentUser) -> Json<UserWithOrders> {
    Json(me)
}

#[instrument(skip(state, _caller))]
pub async fn get_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<UserWithOrders>> {
    let user = state
        .users
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state, _caller))]
pub async fn get_user_by_email(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(email): AppPath<String>,
) -> AppResult<Json<UserWithOrders>> {
    let user = state
        .users
        .get_by_email(&email)
        .await?
        .ok_or(AppError::NotFound("User"))?;
    Ok(Json(user))
}

#[instrument(skip(state, _caller))]
pub async fn list_users(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<Vec<UserWithOrders>>> {
    let page = page.validate(Some(MAX_USERS_PAGE))?;
    let users = state.users.list(page.skip, page.limit).await?;
    Ok(Json(users))
}

#[instrument(skip(state, _caller, payload))]
pub async fn patch_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UserUpdateRequest>,
) -> AppResult<Json<UserWithOrders>> {
    let user = update_user(state.users.as_ref(), id, payload).await?;
    Ok(Json(user))
}

#[instrument(skip(state, _caller))]
pub async fn remove_user(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    delete_user(state.users.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
