use axum::{
    extract::State,
    http::StatusCode,
    routing::get,
    Json, Router,
};
use tracing::{debug, instrument};

use super::{
    dto::{CreateOrderRequest, UpdateOrderRequest},
    repo_types::Order,
    services::{amend_order, cancel_order, place_order},
};
use crate::{
    auth::extractors::CurrentUser,
    error::{AppError, AppResult},
    extractors::{AppJson, AppPath, AppQuery},
    pagination::Pagination,
    state::AppState,
};

// Listing, reading and updating orders is open; creating, deleting and
// /orders/me require a bearer token.
pub fn order_routes() -> Router<AppState> {
    Router::new()
        .route("/orders", get(list_orders).post(create_order))
        .route("/orders/", get(list_orders).post(create_order))
        .route("/orders/me", get(my_orders))
        .route(
            "/orders/:id",
            get(get_order).put(update_order).delete(delete_order),
        )
}

#[instrument(skip(state, me), fields(user_id = me.0.user.id))]
pub async fn my_orders(
    State(state): State<AppState>,
    me: CurrentUser,
) -> AppResult<Json<Vec<Order>>> {
    let orders = state.orders.list_by_user(me.0.user.id).await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn list_orders(
    State(state): State<AppState>,
    AppQuery(page): AppQuery<Pagination>,
) -> AppResult<Json<Vec<Order>>> {
    let page = page.validate(None)?;
    let orders = state.orders.list(page.skip, page.limit).await?;
    Ok(Json(orders))
}

#[instrument(skip(state))]
pub async fn get_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
) -> AppResult<Json<Order>> {
    let order = state
        .orders
        .get_by_id(id)
        .await?
        .ok_or(AppError::NotFound("Order"))?;
    Ok(Json(order))
}

#[instrument(skip(state, me, payload), fields(user_id = me.0.user.id))]
pub async fn create_order(
    State(state): State<AppState>,
    me: CurrentUser,
    AppJson(payload): AppJson<CreateOrderRequest>,
) -> AppResult<(StatusCode, Json<Order>)> {
    if let Some(requested) = payload.user_id.filter(|id| *id != me.0.user.id) {
        debug!(requested, "ignoring user_id from body");
    }
    let order = place_order(state.orders.as_ref(), payload.for_user(me.0.user.id)).await?;
    Ok((StatusCode::CREATED, Json(order)))
}

#[instrument(skip(state, payload))]
pub async fn update_order(
    State(state): State<AppState>,
    AppPath(id): AppPath<i64>,
    AppJson(payload): AppJson<UpdateOrderRequest>,
) -> AppResult<Json<Order>> {
    let order = amend_order(state.orders.as_ref(), id, payload.into()).await?;
    Ok(Json(order))
}

#[instrument(skip(state, _caller))]
pub async fn delete_order(
    State(state): State<AppState>,
    _caller: CurrentUser,
    AppPath(id): AppPath<i64>,
) -> AppResult<StatusCode> {
    cancel_order(state.orders.as_ref(), id).await?;
    Ok(StatusCode::NO_CONTENT)
}
