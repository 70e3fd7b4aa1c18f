// storefront/src/store/mod.rs

//! Transactional access to the storefront tables.
//!
//! Mutating workflows open a `StoreTx` with `Store::begin`, do all their reads and
//! writes through it and finish with `commit`. A transaction dropped without commit
//! leaves the store exactly as it was. The snapshot reads on `Store` itself are
//! side-effect free and safe to call concurrently.

pub mod memory;
pub mod postgres;

use crate::errors::Result;
use crate::models::{CartLine, CartLineKey, NewPizza, Order, OrderLine, OrderStatus, OrderWithLines, Pizza, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use uuid::Uuid;

pub use memory::MemoryStore;
pub use postgres::PgStore;

#[async_trait]
pub trait Store: Send + Sync {
  async fn begin(&self) -> Result<Box<dyn StoreTx>>;

  /// Available pizzas in catalog order.
  async fn available_pizzas(&self) -> Result<Vec<Pizza>>;

  async fn pizza(&self, pizza_id: Uuid) -> Result<Option<Pizza>>;

  /// The user's cart lines in the order they were added.
  async fn cart_lines(&self, user_id: &UserId) -> Result<Vec<CartLine>>;

  /// The user's orders, newest first, each with its lines.
  async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<OrderWithLines>>;

  async fn order_with_lines(&self, order_id: Uuid) -> Result<Option<OrderWithLines>>;
}

#[async_trait]
pub trait StoreTx: Send {
  /// Serialises this transaction against every other transaction that locks the
  /// same user, until commit or rollback.
  async fn lock_user(&mut self, user_id: &UserId) -> Result<()>;

  /// Serialises catalog seeding across transactions, until commit or rollback.
  async fn lock_catalog(&mut self) -> Result<()>;

  async fn count_pizzas(&mut self) -> Result<usize>;
  async fn insert_pizza(&mut self, pizza: NewPizza) -> Result<Pizza>;
  async fn get_pizza(&mut self, pizza_id: Uuid) -> Result<Option<Pizza>>;

  async fn find_cart_line(&mut self, user_id: &UserId, key: &CartLineKey) -> Result<Option<CartLine>>;
  async fn get_cart_line(&mut self, line_id: Uuid) -> Result<Option<CartLine>>;
  async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()>;
  async fn update_cart_line(&mut self, line_id: Uuid, quantity: i32, price: Decimal) -> Result<()>;
  async fn delete_cart_line(&mut self, line_id: Uuid) -> Result<()>;
  async fn user_cart_lines(&mut self, user_id: &UserId) -> Result<Vec<CartLine>>;

  async fn insert_order(&mut self, order: &Order) -> Result<()>;
  async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()>;
  async fn get_order(&mut self, order_id: Uuid) -> Result<Option<Order>>;
  async fn update_order_status(&mut self, order_id: Uuid, status: OrderStatus) -> Result<()>;

  async fn commit(self: Box<Self>) -> Result<()>;
}
