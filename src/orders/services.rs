use tracing::{info, instrument};

use super::{
    repo::OrderStore,
    repo_types::{NewOrder, Order, OrderChanges},
};
use crate::error::{AppError, AppResult};

/// Rejects non-positive quantity/price before the store is touched.
#[instrument(skip(orders, new), fields(user_id = new.user_id))]
pub async fn place_order(orders: &dyn OrderStore, new: NewOrder) -> AppResult<Order> {
    new.validate()?;
    let order = orders.create(new).await?;
    info!(order_id = order.id, "order created");
    Ok(order)
}

#[instrument(skip(orders, changes))]
pub async fn amend_order(orders: &dyn OrderStore, id: i64, changes: OrderChanges) -> AppResult<Order> {
    changes.validate()?;
    let order = orders.get_by_id(id).await?.ok_or(AppError::NotFound("Order"))?;
    let updated = orders.update(&order, changes).await?;
    info!(order_id = id, "order updated");
    Ok(updated)
}

#[instrument(skip(orders))]
pub async fn cancel_order(orders: &dyn OrderStore, id: i64) -> AppResult<()> {
    let order = orders.get_by_id(id).await?.ok_or(AppError::NotFound("Order"))?;
    orders.delete(&order).await?;
    info!(order_id = id, "order deleted");
    Ok(())
}
