// storefront/src/pipelines/common_steps.rs

//! Steps shared by several pipelines.

use crate::errors::{AppError, Result};
use crate::models::{canonicalize_toppings, Pizza};
use crate::pipelines::contexts::{CallerScoped, LineInput, ValidatedLine};
use crate::pricing::{format_currency, line_price, prices_match, PizzaSize};
use pizzeria_flow::{ContextData, PipelineControl};
use tracing::{info, instrument, warn};

/// Resolves the caller's user key into the context, or fails with `Unauthenticated`.
#[instrument(name = "common_step::require_customer", skip_all, err(Display))]
pub async fn require_customer<T: CallerScoped>(ctx_data: ContextData<T>) -> Result<PipelineControl> {
  let user_id = { ctx_data.read().caller().require_user()?.clone() };
  info!(user_id = %user_id, "Caller identified.");
  ctx_data.write().set_user(user_id);
  Ok(PipelineControl::Continue)
}

/// Checks one submitted line and brings its toppings into canonical form.
pub fn validate_line(input: &LineInput) -> Result<ValidatedLine> {
  if input.quantity < 1 {
    return Err(AppError::validation(format!(
      "Quantity must be at least 1 (got {}).",
      input.quantity
    )));
  }
  if input.price.is_sign_negative() && !input.price.is_zero() {
    return Err(AppError::validation(format!(
      "Price must not be negative (got {}).",
      input.price
    )));
  }
  let size: PizzaSize = input.size.parse()?;
  let toppings = canonicalize_toppings(&input.toppings)?;

  Ok(ValidatedLine {
    pizza_id: input.pizza_id,
    pizza_name: input.pizza_name.trim().to_string(),
    size,
    toppings,
    quantity: input.quantity,
    price: input.price,
  })
}

/// Recomputes the price of `quantity` pizzas of the given configuration and rejects a
/// supplied price that does not match it.
pub fn verify_supplied_price(
  pizza: &Pizza,
  size: PizzaSize,
  topping_count: usize,
  quantity: i32,
  supplied: rust_decimal::Decimal,
) -> Result<()> {
  let expected = line_price(pizza.base_price, size, topping_count, quantity)?;
  if prices_match(supplied, expected) {
    return Ok(());
  }
  warn!(
    pizza = %pizza.name,
    size = %size,
    quantity,
    supplied = %supplied,
    expected = %expected,
    "Supplied line price does not match the menu."
  );
  Err(AppError::validation(format!(
    "Price {} does not match the menu price {} for {} x {} {}.",
    format_currency(supplied),
    format_currency(expected),
    quantity,
    size,
    pizza.name
  )))
}
