use serde::Serialize;
use sqlx::FromRow;
use time::OffsetDateTime;

use crate::error::{AppError, AppResult};

/// Row of the `orders` table.
#[derive(Debug, Clone, Serialize, FromRow, PartialEq)]
pub struct Order {
    pub id: i64,
    pub user_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub is_paid: bool,
    #[serde(with = "time::serde::rfc3339")]
    pub created_at: OffsetDateTime,
    #[serde(with = "time::serde::rfc3339")]
    pub updated_at: OffsetDateTime,
}

#[derive(Debug, Clone)]
pub struct NewOrder {
    pub user_id: i64,
    pub product_name: String,
    pub quantity: i32,
    pub price: f64,
    pub is_paid: bool,
}

impl NewOrder {
    pub fn validate(&self) -> AppResult<()> {
        check_quantity(self.quantity)?;
        check_price(self.price)
    }
}

/// Partial update. `None` leaves the column unchanged.
#[derive(Debug, Clone, Default)]
pub struct OrderChanges {
    pub product_name: Option<String>,
    pub quantity: Option<i32>,
    pub price: Option<f64>,
    pub is_paid: Option<bool>,
}

impl OrderChanges {
    pub fn validate(&self) -> AppResult<()> {
        if let Some(quantity) = self.quantity {
            check_quantity(quantity)?;
        }
        if let Some(price) = self.price {
            check_price(price)?;
        }
        Ok(())
    }

    pub fn apply_to(self, order: &mut Order) {
        if let Some(product_name) = self.product_name {
            order.product_name = product_name;
        }
        if let Some(quantity) = self.quantity {
            order.quantity = quantity;
        }
        if let Some(price) = self.price {
            order.price = price;
        }
        if let Some(is_paid) = self.is_paid {
            order.is_paid = is_paid;
        }
    }
}

fn check_quantity(quantity: i32) -> AppResult<()> {
    if quantity <= 0 {
        return Err(AppError::Validation("quantity must be greater than 0".into()));
    }
    Ok(())
}

fn check_price(price: f64) -> AppResult<()> {
    if !price.is_finite() || price <= 0.0 {
        return Err(AppError::Validation("price must be greater than 0".into()));
    }
    Ok(())
}
