//! In-process store used by the test suite. Mirrors the Postgres schema
//! rules: unique email, order -> user foreign key, cascade on user delete.

use std::{collections::BTreeMap, sync::Mutex};

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::{
    error::{AppError, AppResult},
    orders::{
        repo::OrderStore,
        repo_types::{NewOrder, Order, OrderChanges},
    },
    users::{
        repo::UserStore,
        repo_types::{NewUser, User, UserChanges, UserWithOrders},
    },
};

#[derive(Default)]
pub struct MemoryStore {
    inner: Mutex<Tables>,
}

#[derive(Default)]
struct Tables {
    users: BTreeMap<i64, User>,
    orders: BTreeMap<i64, Order>,
    user_seq: i64,
    order_seq: i64,
}

impl Tables {
    fn with_orders(&self, user: &User) -> UserWithOrders {
        UserWithOrders {
            user: user.clone(),
            orders: self.orders_of(user.id),
        }
    }

    fn orders_of(&self, user_id: i64) -> Vec<Order> {
        self.orders
            .values()
            .filter(|o| o.user_id == user_id)
            .cloned()
            .collect()
    }

    fn email_taken(&self, email: &str, except: Option<i64>) -> bool {
        self.users
            .values()
            .any(|u| u.email == email && Some(u.id) != except)
    }
}

impl MemoryStore {
    fn tables(&self) -> std::sync::MutexGuard<'_, Tables> {
        self.inner.lock().expect("memory store poisoned")
    }

    pub fn order_count(&self) -> usize {
        self.tables().orders.len()
    }
}

#[async_trait]
impl UserStore for MemoryStore {
    async fn create(&self, new: NewUser) -> AppResult<User> {
        let mut t = self.tables();
        if t.email_taken(&new.email, None) {
            return Err(AppError::DuplicateEmail);
        }
        t.user_seq += 1;
        let user = User {
            id: t.user_seq,
            email: new.email,
            full_name: new.full_name,
            hashed_password: new.hashed_password,
            is_active: true,
        };
        t.users.insert(user.id, user.clone());
        Ok(user)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<UserWithOrders>> {
        let t = self.tables();
        Ok(t.users.get(&id).map(|u| t.with_orders(u)))
    }

    async fn get_by_email(&self, email: &str) -> AppResult<Option<UserWithOrders>> {
        let t = self.tables();
        Ok(t.users
            .values()
            .find(|u| u.email == email)
            .map(|u| t.with_orders(u)))
    }

    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<UserWithOrders>> {
        let t = self.tables();
        Ok(t.users
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .map(|u| t.with_orders(u))
            .collect())
    }

    async fn update(&self, id: i64, changes: UserChanges) -> AppResult<Option<UserWithOrders>> {
        let mut t = self.tables();
        let Some(mut user) = t.users.get(&id).cloned() else {
            return Ok(None);
        };
        if let Some(email) = &changes.email {
            if t.email_taken(email, Some(id)) {
                return Err(AppError::DuplicateEmail);
            }
        }
        changes.apply_to(&mut user);
        t.users.insert(id, user.clone());
        Ok(Some(t.with_orders(&user)))
    }

    async fn delete(&self, user: &User) -> AppResult<()> {
        let mut t = self.tables();
        t.users.remove(&user.id);
        t.orders.retain(|_, o| o.user_id != user.id);
        Ok(())
    }
}

#[async_trait]
impl OrderStore for MemoryStore {
    async fn create(&self, new: NewOrder) -> AppResult<Order> {
        let mut t = self.tables();
        if !t.users.contains_key(&new.user_id) {
            return Err(AppError::ForeignKeyViolation);
        }
        t.order_seq += 1;
        let now = OffsetDateTime::now_utc();
        let order = Order {
            id: t.order_seq,
            user_id: new.user_id,
            product_name: new.product_name,
            quantity: new.quantity,
            price: new.price,
            is_paid: new.is_paid,
            created_at: now,
            updated_at: now,
        };
        t.orders.insert(order.id, order.clone());
        Ok(order)
    }

    async fn get_by_id(&self, id: i64) -> AppResult<Option<Order>> {
        Ok(self.tables().orders.get(&id).cloned())
    }

    async fn list(&self, skip: i64, limit: i64) -> AppResult<Vec<Order>> {
        Ok(self
            .tables()
            .orders
            .values()
            .skip(skip as usize)
            .take(limit as usize)
            .cloned()
            .collect())
    }

    async fn list_by_user(&self, user_id: i64) -> AppResult<Vec<Order>> {
        Ok(self.tables().orders_of(user_id))
    }

    async fn update(&self, order: &Order, changes: OrderChanges) -> AppResult<Order> {
        let mut t = self.tables();
        let current = t
            .orders
            .get_mut(&order.id)
            .ok_or(AppError::NotFound("Order"))?;
        changes.apply_to(current);
        current.updated_at = OffsetDateTime::now_utc();
        Ok(current.clone())
    }

    async fn delete(&self, order: &Order) -> AppResult<()> {
        self.tables().orders.remove(&order.id);
        Ok(())
    }
}
