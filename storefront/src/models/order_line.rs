// storefront/src/models/order_line.rs

use crate::pricing::PizzaSize;
use rust_decimal::Decimal;
use serde::Serialize;
use sqlx::FromRow;
use uuid::Uuid;

/// Immutable snapshot of a cart line, taken when its order was placed.
#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct OrderLine {
  pub id: Uuid,
  pub order_id: Uuid,
  pub pizza_id: Uuid,
  pub pizza_name: String,
  pub size: PizzaSize,
  pub toppings: Vec<String>,
  pub quantity: i32,
  pub price: Decimal,
}
