// storefront/src/models/order.rs

use crate::errors::{AppError, Result};
use crate::models::order_line::OrderLine;
use crate::models::user::UserId;
use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use sqlx::{FromRow, Type as SqlxType};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

/// Kitchen lifecycle of an order.
///
/// ```text
/// pending -> preparing -> ready -> delivered
/// pending | preparing | ready -> cancelled
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, SqlxType)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "order_status", rename_all = "lowercase")]
pub enum OrderStatus {
  Pending,
  Preparing,
  Ready,
  Delivered,
  Cancelled,
}

impl OrderStatus {
  pub fn as_str(self) -> &'static str {
    match self {
      OrderStatus::Pending => "pending",
      OrderStatus::Preparing => "preparing",
      OrderStatus::Ready => "ready",
      OrderStatus::Delivered => "delivered",
      OrderStatus::Cancelled => "cancelled",
    }
  }

  pub fn is_terminal(self) -> bool {
    matches!(self, OrderStatus::Delivered | OrderStatus::Cancelled)
  }

  /// Whether `next` is a lifecycle edge out of `self`.
  pub fn can_transition_to(self, next: OrderStatus) -> bool {
    use OrderStatus::*;
    matches!(
      (self, next),
      (Pending, Preparing)
        | (Preparing, Ready)
        | (Ready, Delivered)
        | (Pending, Cancelled)
        | (Preparing, Cancelled)
        | (Ready, Cancelled)
    )
  }
}

impl fmt::Display for OrderStatus {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for OrderStatus {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "pending" => Ok(OrderStatus::Pending),
      "preparing" => Ok(OrderStatus::Preparing),
      "ready" => Ok(OrderStatus::Ready),
      "delivered" => Ok(OrderStatus::Delivered),
      "cancelled" => Ok(OrderStatus::Cancelled),
      other => Err(AppError::validation(format!("Unknown order status '{}'.", other))),
    }
  }
}

/// Contact details captured at checkout. Missing fields read as blank and are
/// rejected by checkout validation.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CustomerInfo {
  pub customer_name: String,
  pub customer_email: String,
  pub customer_phone: String,
  pub customer_address: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, FromRow)]
#[serde(rename_all = "camelCase")]
pub struct Order {
  pub id: Uuid,
  pub user_id: UserId,
  pub customer_name: String,
  pub customer_email: String,
  pub customer_phone: String,
  pub customer_address: String,
  pub status: OrderStatus,
  /// Sum of the order's line prices at creation.
  pub total_amount: Decimal,
  pub order_date: DateTime<Utc>,
}

/// An order joined with its lines, as returned by order history reads.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct OrderWithLines {
  #[serde(flatten)]
  pub order: Order,
  pub items: Vec<OrderLine>,
}
