// storefront/src/services/storefront.rs

//! Caller-facing cart and order operations.
//!
//! Mutations build a pipeline context and hand it to the registry; reads go straight
//! to the store. Every operation is scoped to the resolved caller: mutations by an
//! anonymous caller fail with `Unauthenticated`, reads return nothing.

use crate::errors::{AppError, Result};
use crate::models::{CartLine, CustomerInfo, Order, OrderWithLines};
use crate::pipelines::contexts::{
  AddToCartCtxData, CheckoutCtxData, LineInput, OrderStatusCtxData, UpdateCartItemCtxData,
};
use crate::pricing::sum_prices;
use crate::services::identity::Caller;
use crate::state::AppState;
use pizzeria_flow::{ContextData, PipelineResult};
use rust_decimal::Decimal;
use tracing::{info, instrument};
use uuid::Uuid;

async fn run_workflow<T: Send + Sync + 'static>(app_state: &AppState, ctx_data: &ContextData<T>) -> Result<()> {
  match app_state.flow.run(ctx_data.clone()).await? {
    PipelineResult::Completed => Ok(()),
    PipelineResult::Stopped => Err(AppError::PipelineHalted),
  }
}

/// Result of adding a selection to the cart.
#[derive(Debug, Clone, PartialEq)]
pub struct CartAddition {
  pub line: CartLine,
  /// `true` when an existing line with the same configuration absorbed the selection.
  pub merged: bool,
}

#[instrument(name = "storefront::add_to_cart", skip(app_state, input), fields(user_id = ?caller.user_id, pizza_id = %input.pizza_id), err(Display))]
pub async fn add_to_cart(app_state: &AppState, caller: &Caller, input: LineInput) -> Result<CartAddition> {
  let ctx_data = ContextData::new(AddToCartCtxData::new(app_state.clone(), caller.clone(), input));
  run_workflow(app_state, &ctx_data).await?;

  let guard = ctx_data.read();
  let line = guard
    .cart_line
    .clone()
    .ok_or_else(|| AppError::Internal("Add to cart completed without a cart line.".to_string()))?;
  Ok(CartAddition {
    line,
    merged: guard.merged,
  })
}

/// Sets a line's quantity and price. Returns `None` when the line was removed.
#[instrument(name = "storefront::update_cart_item", skip(app_state), fields(user_id = ?caller.user_id), err(Display))]
pub async fn update_cart_item(
  app_state: &AppState,
  caller: &Caller,
  line_id: Uuid,
  quantity: i32,
  price: Decimal,
) -> Result<Option<CartLine>> {
  let ctx_data = ContextData::new(UpdateCartItemCtxData::new(
    app_state.clone(),
    caller.clone(),
    line_id,
    quantity,
    price,
  ));
  run_workflow(app_state, &ctx_data).await?;
  let updated = ctx_data.read().updated_line.clone();
  Ok(updated)
}

/// Deletes every line of the caller's cart and returns how many there were.
#[instrument(name = "storefront::clear_cart", skip(app_state), fields(user_id = ?caller.user_id), err(Display))]
pub async fn clear_cart(app_state: &AppState, caller: &Caller) -> Result<usize> {
  let user_id = caller.require_user()?;

  let mut tx = app_state.store.begin().await?;
  tx.lock_user(user_id).await?;
  let lines = tx.user_cart_lines(user_id).await?;
  for line in &lines {
    tx.delete_cart_line(line.id).await?;
  }
  tx.commit().await?;

  info!(removed = lines.len(), "Cart cleared.");
  Ok(lines.len())
}

#[instrument(name = "storefront::get_cart", skip(app_state), fields(user_id = ?caller.user_id), err(Display))]
pub async fn get_cart(app_state: &AppState, caller: &Caller) -> Result<Vec<CartLine>> {
  match &caller.user_id {
    Some(user_id) => app_state.store.cart_lines(user_id).await,
    None => Ok(Vec::new()),
  }
}

/// Places an order from the submitted lines and clears the caller's cart, atomically.
#[instrument(name = "storefront::create_order", skip(app_state, customer, lines), fields(user_id = ?caller.user_id, line_count = lines.len()), err(Display))]
pub async fn create_order(
  app_state: &AppState,
  caller: &Caller,
  customer: CustomerInfo,
  lines: Vec<LineInput>,
  total_amount: Decimal,
) -> Result<Uuid> {
  let ctx_data = ContextData::new(CheckoutCtxData::new(
    app_state.clone(),
    caller.clone(),
    customer,
    lines,
    total_amount,
  ));
  run_workflow(app_state, &ctx_data).await?;

  let order_id = ctx_data.read().order.as_ref().map(|order| order.id);
  order_id.ok_or_else(|| AppError::Internal("Checkout completed without an order.".to_string()))
}

/// Moves an order along the kitchen lifecycle. Staff only.
#[instrument(name = "storefront::update_order_status", skip(app_state), fields(staff = caller.staff), err(Display))]
pub async fn update_order_status(app_state: &AppState, caller: &Caller, order_id: Uuid, status: &str) -> Result<Order> {
  let ctx_data = ContextData::new(OrderStatusCtxData::new(
    app_state.clone(),
    caller.clone(),
    order_id,
    status.to_string(),
  ));
  run_workflow(app_state, &ctx_data).await?;

  let updated = ctx_data.read().updated_order.clone();
  updated.ok_or_else(|| AppError::Internal("Status update completed without an order.".to_string()))
}

#[instrument(name = "storefront::get_user_orders", skip(app_state), fields(user_id = ?caller.user_id), err(Display))]
pub async fn get_user_orders(app_state: &AppState, caller: &Caller) -> Result<Vec<OrderWithLines>> {
  match &caller.user_id {
    Some(user_id) => app_state.store.orders_for_user(user_id).await,
    None => Ok(Vec::new()),
  }
}

/// One of the caller's orders. Orders of other users are reported as missing.
#[instrument(name = "storefront::get_order", skip(app_state), fields(user_id = ?caller.user_id), err(Display))]
pub async fn get_order(app_state: &AppState, caller: &Caller, order_id: Uuid) -> Result<OrderWithLines> {
  let not_found = || AppError::not_found(format!("Order {} not found.", order_id));
  let user_id = caller.user_id.as_ref().ok_or_else(not_found)?;

  match app_state.store.order_with_lines(order_id).await? {
    Some(found) if &found.order.user_id == user_id || caller.staff => Ok(found),
    _ => Err(not_found()),
  }
}

/// Sum of the line prices of a cart.
pub fn cart_total(lines: &[CartLine]) -> Result<Decimal> {
  sum_prices(lines.iter().map(|line| line.price))
}
