// storefront/tests/common/mod.rs
#![allow(dead_code)]

use async_trait::async_trait;
use once_cell::sync::Lazy;
use pizzeria::config::AppConfig;
use pizzeria::errors::{AppError, Result};
use pizzeria::models::{
  CartLine, CartLineKey, CustomerInfo, NewPizza, Order, OrderLine, OrderStatus, OrderWithLines, Pizza, UserId,
};
use pizzeria::pipelines::contexts::LineInput;
use pizzeria::pricing::{line_price, PizzaSize};
use pizzeria::services::catalog;
use pizzeria::services::identity::{hash_staff_token, Caller};
use pizzeria::state::AppState;
use pizzeria::store::{MemoryStore, Store, StoreTx};
use rust_decimal::Decimal;
use std::sync::Arc;
use tracing::Level;
use uuid::Uuid;

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}

pub const STAFF_TOKEN: &str = "hot-oven-2024";

static STAFF_TOKEN_HASH: Lazy<String> =
  Lazy::new(|| hash_staff_token(STAFF_TOKEN).expect("hashing the test staff token"));

pub fn test_config() -> AppConfig {
  AppConfig {
    staff_token_hash: Some(STAFF_TOKEN_HASH.clone()),
    ..AppConfig::default()
  }
}

pub async fn seeded_state_with(store: Arc<dyn Store>, config: AppConfig) -> AppState {
  setup_tracing();
  catalog::seed_catalog(store.as_ref()).await.expect("seeding the catalog");
  AppState::build(store, config)
}

pub async fn seeded_state() -> AppState {
  seeded_state_with(Arc::new(MemoryStore::new()), test_config()).await
}

pub fn customer(key: &str) -> Caller {
  Caller::customer(UserId::parse(key).expect("non-blank user key"))
}

pub fn kitchen_staff() -> Caller {
  customer("kitchen-1").with_staff(true)
}

pub fn customer_info() -> CustomerInfo {
  CustomerInfo {
    customer_name: "Ada Lovelace".to_string(),
    customer_email: "ada@example.com".to_string(),
    customer_phone: "555-0101".to_string(),
    customer_address: "12 Analytical Row".to_string(),
  }
}

pub async fn pizza_named(state: &AppState, name: &str) -> Pizza {
  state
    .store
    .available_pizzas()
    .await
    .expect("listing pizzas")
    .into_iter()
    .find(|p| p.name == name)
    .unwrap_or_else(|| panic!("{} is not on the seeded menu", name))
}

/// A correctly priced selection.
pub fn selection(pizza: &Pizza, size: PizzaSize, toppings: &[&str], quantity: i32) -> LineInput {
  let price = line_price(pizza.base_price, size, toppings.len(), quantity).expect("valid selection");
  LineInput {
    pizza_id: pizza.id,
    pizza_name: pizza.name.clone(),
    size: size.as_str().to_string(),
    toppings: toppings.iter().map(|t| t.to_string()).collect(),
    quantity,
    price,
  }
}

/// Checkout lines mirroring a stored cart.
pub fn lines_from_cart(cart: &[CartLine]) -> Vec<LineInput> {
  cart
    .iter()
    .map(|line| LineInput {
      pizza_id: line.pizza_id,
      pizza_name: line.pizza_name.clone(),
      size: line.size.as_str().to_string(),
      toppings: line.toppings.clone(),
      quantity: line.quantity,
      price: line.price,
    })
    .collect()
}

pub fn dec(text: &str) -> Decimal {
  text.parse().expect("decimal literal")
}

/// Store operation a `FaultyStore` transaction fails on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FaultPoint {
  InsertOrderLine,
  DeleteCartLine,
  Commit,
}

/// Delegates to a `MemoryStore` but makes one transactional operation fail.
#[derive(Clone)]
pub struct FaultyStore {
  pub inner: MemoryStore,
  pub fault: FaultPoint,
}

impl FaultyStore {
  pub fn new(inner: MemoryStore, fault: FaultPoint) -> Self {
    Self { inner, fault }
  }
}

fn injected(fault: FaultPoint) -> AppError {
  match fault {
    FaultPoint::Commit => AppError::Transaction("injected commit failure".to_string()),
    other => AppError::Internal(format!("injected failure at {:?}", other)),
  }
}

#[async_trait]
impl Store for FaultyStore {
  async fn begin(&self) -> Result<Box<dyn StoreTx>> {
    let inner = self.inner.begin().await?;
    Ok(Box::new(FaultyTx {
      inner,
      fault: self.fault,
    }))
  }

  async fn available_pizzas(&self) -> Result<Vec<Pizza>> {
    self.inner.available_pizzas().await
  }

  async fn pizza(&self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    self.inner.pizza(pizza_id).await
  }

  async fn cart_lines(&self, user_id: &UserId) -> Result<Vec<CartLine>> {
    self.inner.cart_lines(user_id).await
  }

  async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<OrderWithLines>> {
    self.inner.orders_for_user(user_id).await
  }

  async fn order_with_lines(&self, order_id: Uuid) -> Result<Option<OrderWithLines>> {
    self.inner.order_with_lines(order_id).await
  }
}

struct FaultyTx {
  inner: Box<dyn StoreTx>,
  fault: FaultPoint,
}

#[async_trait]
impl StoreTx for FaultyTx {
  async fn lock_user(&mut self, user_id: &UserId) -> Result<()> {
    self.inner.lock_user(user_id).await
  }

  async fn lock_catalog(&mut self) -> Result<()> {
    self.inner.lock_catalog().await
  }

  async fn count_pizzas(&mut self) -> Result<usize> {
    self.inner.count_pizzas().await
  }

  async fn insert_pizza(&mut self, pizza: NewPizza) -> Result<Pizza> {
    self.inner.insert_pizza(pizza).await
  }

  async fn get_pizza(&mut self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    self.inner.get_pizza(pizza_id).await
  }

  async fn find_cart_line(&mut self, user_id: &UserId, key: &CartLineKey) -> Result<Option<CartLine>> {
    self.inner.find_cart_line(user_id, key).await
  }

  async fn get_cart_line(&mut self, line_id: Uuid) -> Result<Option<CartLine>> {
    self.inner.get_cart_line(line_id).await
  }

  async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
    self.inner.insert_cart_line(line).await
  }

  async fn update_cart_line(&mut self, line_id: Uuid, quantity: i32, price: Decimal) -> Result<()> {
    self.inner.update_cart_line(line_id, quantity, price).await
  }

  async fn delete_cart_line(&mut self, line_id: Uuid) -> Result<()> {
    if self.fault == FaultPoint::DeleteCartLine {
      return Err(injected(self.fault));
    }
    self.inner.delete_cart_line(line_id).await
  }

  async fn user_cart_lines(&mut self, user_id: &UserId) -> Result<Vec<CartLine>> {
    self.inner.user_cart_lines(user_id).await
  }

  async fn insert_order(&mut self, order: &Order) -> Result<()> {
    self.inner.insert_order(order).await
  }

  async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()> {
    if self.fault == FaultPoint::InsertOrderLine {
      return Err(injected(self.fault));
    }
    self.inner.insert_order_line(line).await
  }

  async fn get_order(&mut self, order_id: Uuid) -> Result<Option<Order>> {
    self.inner.get_order(order_id).await
  }

  async fn update_order_status(&mut self, order_id: Uuid, status: OrderStatus) -> Result<()> {
    self.inner.update_order_status(order_id, status).await
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    if self.fault == FaultPoint::Commit {
      return Err(injected(self.fault));
    }
    self.inner.commit().await
  }
}
