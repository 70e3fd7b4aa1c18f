// storefront/src/models/cart_line.rs

use crate::models::user::UserId;
use crate::pricing::PizzaSize;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// One priced entry of a user's cart.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct CartLine {
  pub id: Uuid,
  pub user_id: UserId,
  pub pizza_id: Uuid,
  /// Catalog name at the time the line was created.
  pub pizza_name: String,
  pub size: PizzaSize,
  /// Canonical (sorted, deduplicated) toppings.
  pub toppings: Vec<String>,
  pub quantity: i32,
  /// Total for the line at its current quantity.
  pub price: Decimal,
  pub added_at: DateTime<Utc>,
}

impl CartLine {
  pub fn key(&self) -> CartLineKey {
    CartLineKey {
      pizza_id: self.pizza_id,
      size: self.size,
      toppings: self.toppings.clone(),
    }
  }
}

/// Configuration identifying a cart line within one user's cart. Additions with an
/// equal key merge into the existing line.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub struct CartLineKey {
  pub pizza_id: Uuid,
  pub size: PizzaSize,
  pub toppings: Vec<String>,
}
