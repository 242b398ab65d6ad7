use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::repo_types::{NewOrder, Order, OrderChanges};
use crate::error::{AppError, AppResult};

const ORDER_COLUMNS: &str =
    "id, user_id, product_name, quantity, price, is_paid, created_at, updated_at";

/// Persistence for orders. Every call is its own transaction.
#[async_trait]
pub trait OrderStore: Send + Sync {
    /// Fails with `ForeignKeyViolation` when `user_id` has no live user.
    async fn create(&self, new: NewOrder) -> AppResult<Order>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<Order>>;
    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<Order>>;
    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Order>>;
    /// Applies the present fields and refreshes `updated_at`.
    async fn update(&self, order: &Order, changes: OrderChanges) -> AppResult<Order>;
    async fn delete(&self, order: &Order) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgOrderStore {
    db: PgPool,
}

impl PgOrderStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl OrderStore for PgOrderStore {
    async fn create(&self, new: NewOrder) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let order = sqlx::query_as::<_, Order>(&format!(
            r#"
            INSERT INTO orders (user_id, product_name, quantity, price, is_paid)
            VALUES ($1, $2, $3, $4, $5)
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(new.user_id)
        .bind(&new.product_name)
        .bind(new.quantity)
        .bind(new.price)
        .bind(new.is_paid)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        let mut tx = self.db.begin().await?;
        let order = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(order)
    }

    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<Order>> {
        let mut tx = self.db.begin().await?;
        let rows = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        let mut tx = self.db.begin().await?;
        let rows = orders_for_users(&mut *tx, &[user_id]).await?;
        tx.commit().await?;
        Ok(rows)
    }

    async fn update(&self, order: &Order, changes: OrderChanges) -> AppResult<Order> {
        let mut tx = self.db.begin().await?;
        let mut current = sqlx::query_as::<_, Order>(&format!(
            "SELECT {ORDER_COLUMNS} FROM orders WHERE id = $1 FOR UPDATE"
        ))
        .bind(order.id)
        .fetch_optional(&mut *tx)
        .await?
        .ok_or(AppError::NotFound("Order"))?;

        changes.apply_to(&mut current);

        let updated = sqlx::query_as::<_, Order>(&format!(
            r#"
            UPDATE orders
               SET product_name = $2, quantity = $3, price = $4, is_paid = $5,
                   updated_at = now()
             WHERE id = $1
            RETURNING {ORDER_COLUMNS}
            "#
        ))
        .bind(current.id)
        .bind(&current.product_name)
        .bind(current.quantity)
        .bind(current.price)
        .bind(current.is_paid)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(updated)
    }

    async fn delete(&self, order: &Order) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        sqlx::query("DELETE FROM orders WHERE id = $1")
            .bind(order.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

/// Orders owned by any of `user_ids`, oldest first. Runs on the caller's transaction.
pub(crate) async fn orders_for_users(
    conn: &mut PgConnection,
    user_ids: &[i64],
) -> AppResult<Vec<Order>> {
    let rows = sqlx::query_as::<_, Order>(&format!(
        "SELECT {ORDER_COLUMNS} FROM orders WHERE user_id = ANY($1) ORDER BY id"
    ))
    .bind(user_ids)
    .fetch_all(conn)
    .await?;
    Ok(rows)
}
