// storefront/src/pipelines/contexts.rs

//! Workflow state for every storefront pipeline. Handlers receive these wrapped in
//! `pizzeria_flow::ContextData`; the service that started the run reads the outputs
//! back once it completes.

use crate::models::{CartLine, CustomerInfo, Order, OrderLine, OrderStatus, Pizza, UserId};
use crate::pricing::PizzaSize;
use crate::services::identity::Caller;
use crate::state::AppState;
use rust_decimal::Decimal;
use serde::Deserialize;
use uuid::Uuid;

/// A pizza selection as submitted by the client, for the cart or for checkout.
#[derive(Debug, Clone, PartialEq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LineInput {
  pub pizza_id: Uuid,
  #[serde(default)]
  pub pizza_name: String,
  pub size: String,
  #[serde(default)]
  pub toppings: Vec<String>,
  pub quantity: i32,
  pub price: Decimal,
}

/// A `LineInput` that passed validation.
#[derive(Debug, Clone, PartialEq)]
pub struct ValidatedLine {
  pub pizza_id: Uuid,
  pub pizza_name: String,
  pub size: PizzaSize,
  pub toppings: Vec<String>,
  pub quantity: i32,
  pub price: Decimal,
}

/// Implemented by every context whose run is scoped to a caller.
pub trait CallerScoped: Send + Sync + 'static {
  fn caller(&self) -> &Caller;
  fn set_user(&mut self, user_id: UserId);
}

macro_rules! caller_scoped {
  ($($ctx:ty),+ $(,)?) => {
    $(
      impl CallerScoped for $ctx {
        fn caller(&self) -> &Caller {
          &self.caller
        }

        fn set_user(&mut self, user_id: UserId) {
          self.user_id = Some(user_id);
        }
      }
    )+
  };
}

#[derive(Clone)]
pub struct AddToCartCtxData {
  pub app_state: AppState,
  pub caller: Caller,
  pub input: LineInput,

  pub user_id: Option<UserId>,
  pub line: Option<ValidatedLine>,
  pub pizza: Option<Pizza>,

  pub cart_line: Option<CartLine>,
  /// Whether the selection was folded into an existing line.
  pub merged: bool,
}

impl AddToCartCtxData {
  pub fn new(app_state: AppState, caller: Caller, input: LineInput) -> Self {
    Self {
      app_state,
      caller,
      input,
      user_id: None,
      line: None,
      pizza: None,
      cart_line: None,
      merged: false,
    }
  }
}

#[derive(Clone)]
pub struct UpdateCartItemCtxData {
  pub app_state: AppState,
  pub caller: Caller,
  pub line_id: Uuid,
  pub quantity: i32,
  pub price: Decimal,

  pub user_id: Option<UserId>,

  /// `None` after a successful run means the line was removed.
  pub updated_line: Option<CartLine>,
}

impl UpdateCartItemCtxData {
  pub fn new(app_state: AppState, caller: Caller, line_id: Uuid, quantity: i32, price: Decimal) -> Self {
    Self {
      app_state,
      caller,
      line_id,
      quantity,
      price,
      user_id: None,
      updated_line: None,
    }
  }
}

#[derive(Clone)]
pub struct CheckoutCtxData {
  pub app_state: AppState,
  pub caller: Caller,
  pub customer: CustomerInfo,
  pub submitted_lines: Vec<LineInput>,
  pub submitted_total: Decimal,

  pub user_id: Option<UserId>,
  pub lines: Vec<ValidatedLine>,
  /// Exact sum of the validated line prices; becomes the order total.
  pub total_amount: Decimal,

  pub order: Option<Order>,
  pub order_lines: Vec<OrderLine>,
  pub cleared_cart_lines: usize,
}

impl CheckoutCtxData {
  pub fn new(
    app_state: AppState,
    caller: Caller,
    customer: CustomerInfo,
    submitted_lines: Vec<LineInput>,
    submitted_total: Decimal,
  ) -> Self {
    Self {
      app_state,
      caller,
      customer,
      submitted_lines,
      submitted_total,
      user_id: None,
      lines: Vec::new(),
      total_amount: Decimal::ZERO,
      order: None,
      order_lines: Vec::new(),
      cleared_cart_lines: 0,
    }
  }
}

#[derive(Clone)]
pub struct OrderStatusCtxData {
  pub app_state: AppState,
  pub caller: Caller,
  pub order_id: Uuid,
  pub requested_status: String,

  pub status: Option<OrderStatus>,
  pub updated_order: Option<Order>,
}

impl OrderStatusCtxData {
  pub fn new(app_state: AppState, caller: Caller, order_id: Uuid, requested_status: String) -> Self {
    Self {
      app_state,
      caller,
      order_id,
      requested_status,
      status: None,
      updated_order: None,
    }
  }
}

caller_scoped!(AddToCartCtxData, UpdateCartItemCtxData, CheckoutCtxData);
