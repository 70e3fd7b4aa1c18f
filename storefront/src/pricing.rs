// storefront/src/pricing.rs

//! The pricing engine: pure functions turning a pizza selection into a line price.
//!
//! `price = (base_price * size_multiplier + topping_count * 1.50) * quantity`
//!
//! Amounts are `Decimal` and keep full precision; rounding to cents only happens in
//! `format_currency`, for display.

use crate::errors::{AppError, Result};
use rust_decimal::{Decimal, RoundingStrategy};
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Price of a single extra topping.
pub fn topping_price() -> Decimal {
  Decimal::new(150, 2)
}

/// Two amounts closer than this are the same price. Absorbs float noise from clients.
pub fn price_tolerance() -> Decimal {
  Decimal::new(5, 3)
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize, sqlx::Type)]
#[serde(rename_all = "lowercase")]
#[sqlx(type_name = "pizza_size", rename_all = "lowercase")]
pub enum PizzaSize {
  Small,
  Medium,
  Large,
}

impl PizzaSize {
  pub const ALL: [PizzaSize; 3] = [PizzaSize::Small, PizzaSize::Medium, PizzaSize::Large];

  pub fn multiplier(self) -> Decimal {
    match self {
      PizzaSize::Small => Decimal::new(10, 1),
      PizzaSize::Medium => Decimal::new(13, 1),
      PizzaSize::Large => Decimal::new(16, 1),
    }
  }

  pub fn as_str(self) -> &'static str {
    match self {
      PizzaSize::Small => "small",
      PizzaSize::Medium => "medium",
      PizzaSize::Large => "large",
    }
  }

  /// Menu label shown next to the size picker.
  pub fn label(self) -> &'static str {
    match self {
      PizzaSize::Small => "Small (10\")",
      PizzaSize::Medium => "Medium (12\")",
      PizzaSize::Large => "Large (14\")",
    }
  }
}

impl fmt::Display for PizzaSize {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

impl FromStr for PizzaSize {
  type Err = AppError;

  fn from_str(s: &str) -> Result<Self> {
    match s.trim().to_ascii_lowercase().as_str() {
      "small" => Ok(PizzaSize::Small),
      "medium" => Ok(PizzaSize::Medium),
      "large" => Ok(PizzaSize::Large),
      other => Err(AppError::validation(format!(
        "Unknown pizza size '{}'. Expected one of: small, medium, large.",
        other
      ))),
    }
  }
}

/// Prices one cart or order line.
///
/// # Errors
/// `AppError::Validation` when `base_price` is negative or `quantity` is below one.
pub fn line_price(base_price: Decimal, size: PizzaSize, topping_count: usize, quantity: i32) -> Result<Decimal> {
  if base_price.is_sign_negative() && !base_price.is_zero() {
    return Err(AppError::validation(format!(
      "Base price must not be negative (got {}).",
      base_price
    )));
  }
  if quantity < 1 {
    return Err(AppError::validation(format!(
      "Quantity must be at least 1 (got {}).",
      quantity
    )));
  }

  let toppings = topping_price() * Decimal::from(topping_count as u64);
  Ok((base_price * size.multiplier() + toppings) * Decimal::from(quantity))
}

/// Adds up line prices.
///
/// # Errors
/// `AppError::Validation` when the sum does not fit in a `Decimal`.
pub fn sum_prices<I>(prices: I) -> Result<Decimal>
where
  I: IntoIterator<Item = Decimal>,
{
  prices
    .into_iter()
    .try_fold(Decimal::ZERO, |acc, price| acc.checked_add(price))
    .ok_or_else(|| AppError::validation("Prices add up to more than can be represented."))
}

pub fn prices_match(supplied: Decimal, expected: Decimal) -> bool {
  (supplied - expected).abs() <= price_tolerance()
}

/// Rounds half away from zero to whole cents: `70.855` displays as `$70.86`.
pub fn format_currency(amount: Decimal) -> String {
  let mut cents = amount.round_dp_with_strategy(2, RoundingStrategy::MidpointAwayFromZero);
  cents.rescale(2);
  if cents.is_sign_negative() && !cents.is_zero() {
    format!("-${}", cents.abs())
  } else {
    format!("${}", cents)
  }
}
