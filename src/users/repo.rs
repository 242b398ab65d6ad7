use std::collections::HashMap;

use async_trait::async_trait;
use sqlx::{PgConnection, PgPool};

use super::repo_types::{NewUser, User, UserChanges, UserWithOrders};
use crate::{error::AppResult, orders::repo::orders_for_users};

const USER_COLUMNS: &str = "id, email, full_name, hashed_password, is_active";

/// Persistence for users. Every call is its own transaction; reads include the user's orders.
#[async_trait]
pub trait UserStore: Send + Sync {
    /// Fails with `DuplicateEmail` when the email is taken.
    async fn create(&self, new: NewUser) -> AppResult<User>;
    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserWithOrders>>;
    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserWithOrders>>;
    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<UserWithOrders>>;
    /// Returns `None` when no user has this id. `hashed_password` must already be hashed.
    async fn update(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserWithOrders>>;
    /// Removes the user and, by cascade, all of its orders.
    async fn delete(&self, user: &User) -> AppResult<()>;
}

#[derive(Clone)]
pub struct PgUserStore {
    db: PgPool,
}

impl PgUserStore {
    pub fn new(db: PgPool) -> Self {
        Self { db }
    }
}

#[async_trait]
impl UserStore for PgUserStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            INSERT INTO users (email, full_name, hashed_password)
            VALUES ($1, $2, $3)
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(&new.email)
        .bind(&new.full_name)
        .bind(&new.hashed_password)
        .fetch_one(&mut *tx)
        .await?;
        tx.commit().await?;
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserWithOrders>> {
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?;
        let found = match user {
            Some(user) => Some(with_orders(&mut *tx, user).await?),
            None => None,
        };
        tx.commit().await?;
        Ok(found)
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserWithOrders>> {
        let mut tx = self.db.begin().await?;
        let user = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE email = $1"
        ))
        .bind(email)
        .fetch_optional(&mut *tx)
        .await?;
        let found = match user {
            Some(user) => Some(with_orders(&mut *tx, user).await?),
            None => None,
        };
        tx.commit().await?;
        Ok(found)
    }

    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<UserWithOrders>> {
        let mut tx = self.db.begin().await?;
        let users = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users ORDER BY id LIMIT $1 OFFSET $2"
        ))
        .bind(limit)
        .bind(skip)
        .fetch_all(&mut *tx)
        .await?;

        let ids: Vec<i64> = users.iter().map(|u| u.id).collect();
        let mut by_user: HashMap<i64, Vec<_>> = HashMap::new();
        for order in orders_for_users(&mut *tx, &ids).await? {
            by_user.entry(order.user_id).or_default().push(order);
        }
        tx.commit().await?;

        Ok(users
            .into_iter()
            .map(|user| {
                let orders = by_user.remove(&user.id).unwrap_or_default();
                UserWithOrders { user, orders }
            })
            .collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserWithOrders>> {
        let mut tx = self.db.begin().await?;
        let Some(mut user) = sqlx::query_as::<_, User>(&format!(
            "SELECT {USER_COLUMNS} FROM users WHERE id = $1 FOR UPDATE"
        ))
        .bind(id)
        .fetch_optional(&mut *tx)
        .await?
        else {
            return Ok(None);
        };

        changes.apply_to(&mut user);

        let user = sqlx::query_as::<_, User>(&format!(
            r#"
            UPDATE users
               SET email = $2, full_name = $3, hashed_password = $4, is_active = $5
             WHERE id = $1
            RETURNING {USER_COLUMNS}
            "#
        ))
        .bind(user.id)
        .bind(&user.email)
        .bind(&user.full_name)
        .bind(&user.hashed_password)
        .bind(user.is_active)
        .fetch_one(&mut *tx)
        .await?;
        let updated = with_orders(&mut *tx, user).await?;
        tx.commit().await?;
        Ok(Some(updated))
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        let mut tx = self.db.begin().await?;
        // orders go with it via ON DELETE CASCADE
        sqlx::query("DELETE FROM users WHERE id = $1")
            .bind(user.id)
            .execute(&mut *tx)
            .await?;
        tx.commit().await?;
        Ok(())
    }
}

async fn with_orders(conn: &mut PgConnection, user: User) -> AppResult<UserWithOrders> {
    let orders = orders_for_users(conn, &[user.id]).await?;
    Ok(UserWithOrders { user, orders })
}
