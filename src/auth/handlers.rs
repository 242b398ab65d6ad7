use axum::{
    extract::State,
    http::StatusCode,
    routing::post,
    Json, Router,
};
use tracing::instrument;

use crate::{
    auth::{
        dto::{LoginForm, RegisterRequest, TokenResponse},
        services::AuthService,
    },
    error::AppResult,
    extractors::{AppForm, AppJson},
    state::AppState,
};

pub fn auth_routes() -> Router<AppState> {
    Router::new()
        .route("/auth/register", post(register))
        .route("/auth/login", post(login))
}

#[instrument(skip(auth, payload))]
pub async fn register(
    State(auth): State<AuthService>,
    AppJson(payload): AppJson<RegisterRequest>,
) -> AppResult<(StatusCode, Json<TokenResponse>)> {
    let token = auth
        .register(&payload.email, &payload.full_name, &payload.password)
        .await?;
    Ok((StatusCode::CREATED, Json(TokenResponse::bearer(token))))
}

#[instrument(skip(auth, form))]
pub async fn login(
    State(auth): State<AuthService>,
    AppForm(form): AppForm<LoginForm>,
) -> AppResult<Json<TokenResponse>> {
    let token = auth.login(&form.username, &form.password).await?;
    Ok(Json(TokenResponse::bearer(token)))
}
