use serde::Serialize;
use sqlx::FromRow;

use crate::orders::repo_types::Order;

/// Row of the `users` table.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct User {
    pub id: i64,
    pub email: String,
    pub full_name: String,
    #[serde(skip_serializing)]
    pub hashed_password: String, // Argon2 PHC string, never sent to clients
    pub is_active: bool,
}

/// A user together with every order it owns.
#[derive(Debug, Clone, Serialize, PartialEq)]
pub struct UserWithOrders {
    #[serde(flatten)]
    pub user: User,
    pub orders: Vec<Order>,
}

#[derive(Debug, Clone)]
pub struct NewUser {
    pub email: String,
    pub full_name: String,
    pub hashed_password: String,
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct UserChanges {
    pub email: Option<String>,
    pub full_name: Option<String>,
    pub hashed_password: Option<String>,
    pub is_active: Option<bool>,
}

impl UserChanges {
    pub fn apply_to(self, user: &mut User) {
        if let Some(email) = self.email {
            user.email = email;
        }
        if let Some(full_name) = self.full_name {
            user.full_name = full_name;
        }
        if let Some(hashed_password) = self.hashed_password {
            user.hashed_password = hashed_password;
        }
        if let Some(is_active) = self.is_active {
            user.is_active = is_active;
        }
    }
}
