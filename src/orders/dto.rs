use serde::Deserialize;

use super::repo_types::{NewOrder, OrderChanges};

/// POST body. `user_id` is accepted for compatibility but replaced by the caller's id.
#[derive(Debug, Deserialize)]
pub struct CreateOrderRequest {
    #[serde(default)]
    pub user_id: Option<i64>,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    #[serde(default)]
    pub is_paid: bool,
}

impl CreateOrderRequest {
    pub fn for_user(self, user_id: i64) -> NewOrder {
        NewOrder {
            user_id,
            product_name: self.product_name,
            quantity: self.quantity,
            price: self.price,
            is_paid: self.is_paid,
        }
    }
}

/// PUT body. Absent and `null` fields are both left unchanged.
#[derive(Debug, Default, Deserialize)]
pub struct UpdateOrderRequest {
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<f64>,
    pub is_paid: Option<bool>,
}

impl From<UpdateOrderRequest> for OrderChanges {
    fn from(req: UpdateOrderRequest) -> Self {
        Self {
            product_name: req.product_name,
            quantity: req.quantity,
            price: req.price,
            is_paid: req.is_paid,
        }
    }
}
