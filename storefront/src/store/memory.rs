// storefront/src/store/memory.rs

//! In-process store. One mutex guards all four tables; a transaction holds it from
//! `begin` until commit or drop and works on a staged copy, so readers only ever see
//! committed states and mutations are fully serialised.

use super::{Store, StoreTx};
use crate::errors::{AppError, Result};
use crate::models::{CartLine, CartLineKey, NewPizza, Order, OrderLine, OrderStatus, OrderWithLines, Pizza, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use std::sync::Arc;
use tokio::sync::{Mutex, OwnedMutexGuard};
use tracing::debug;
use uuid::Uuid;

#[derive(Debug, Clone, Default)]
struct Tables {
  pizzas: Vec<Pizza>,
  cart_lines: Vec<CartLine>,
  orders: Vec<Order>,
  order_lines: Vec<OrderLine>,
}

impl Tables {
  fn order_with_lines(&self, order: &Order) -> OrderWithLines {
    OrderWithLines {
      order: order.clone(),
      items: self
        .order_lines
        .iter()
        .filter(|line| line.order_id == order.id)
        .cloned()
        .collect(),
    }
  }
}

#[derive(Debug, Clone, Default)]
pub struct MemoryStore {
  tables: Arc<Mutex<Tables>>,
}

impl MemoryStore {
  pub fn new() -> Self {
    Self::default()
  }
}

#[async_trait]
impl Store for MemoryStore {
  async fn begin(&self) -> Result<Box<dyn StoreTx>> {
    let guard = Arc::clone(&self.tables).lock_owned().await;
    let staged = guard.clone();
    Ok(Box::new(MemoryTx { guard, staged }))
  }

  async fn available_pizzas(&self) -> Result<Vec<Pizza>> {
    let tables = self.tables.lock().await;
    Ok(tables.pizzas.iter().filter(|p| p.available).cloned().collect())
  }

  async fn pizza(&self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    let tables = self.tables.lock().await;
    Ok(tables.pizzas.iter().find(|p| p.id == pizza_id).cloned())
  }

  async fn cart_lines(&self, user_id: &UserId) -> Result<Vec<CartLine>> {
    let tables = self.tables.lock().await;
    Ok(tables.cart_lines.iter().filter(|l| &l.user_id == user_id).cloned().collect())
  }

  async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<OrderWithLines>> {
    let tables = self.tables.lock().await;
    // Newest insert first, then a stable sort keeps that order among equal timestamps.
    let mut orders: Vec<&Order> = tables.orders.iter().rev().filter(|o| &o.user_id == user_id).collect();
    orders.sort_by(|a, b| b.order_date.cmp(&a.order_date));
    Ok(orders.into_iter().map(|o| tables.order_with_lines(o)).collect())
  }

  async fn order_with_lines(&self, order_id: Uuid) -> Result<Option<OrderWithLines>> {
    let tables = self.tables.lock().await;
    Ok(
      tables
        .orders
        .iter()
        .find(|o| o.id == order_id)
        .map(|o| tables.order_with_lines(o)),
    )
  }
}

struct MemoryTx {
  guard: OwnedMutexGuard<Tables>,
  staged: Tables,
}

#[async_trait]
impl StoreTx for MemoryTx {
  async fn lock_user(&mut self, _user_id: &UserId) -> Result<()> {
    // The table mutex is already held for the whole transaction.
    Ok(())
  }

  async fn lock_catalog(&mut self) -> Result<()> {
    Ok(())
  }

  async fn count_pizzas(&mut self) -> Result<usize> {
    Ok(self.staged.pizzas.len())
  }

  async fn insert_pizza(&mut self, pizza: NewPizza) -> Result<Pizza> {
    let pizza = pizza.into_pizza(Uuid::new_v4());
    self.staged.pizzas.push(pizza.clone());
    Ok(pizza)
  }

  async fn get_pizza(&mut self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    Ok(self.staged.pizzas.iter().find(|p| p.id == pizza_id).cloned())
  }

  async fn find_cart_line(&mut self, user_id: &UserId, key: &CartLineKey) -> Result<Option<CartLine>> {
    Ok(
      self
        .staged
        .cart_lines
        .iter()
        .find(|l| &l.user_id == user_id && &l.key() == key)
        .cloned(),
    )
  }

  async fn get_cart_line(&mut self, line_id: Uuid) -> Result<Option<CartLine>> {
    Ok(self.staged.cart_lines.iter().find(|l| l.id == line_id).cloned())
  }

  async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
    self.staged.cart_lines.push(line.clone());
    Ok(())
  }

  async fn update_cart_line(&mut self, line_id: Uuid, quantity: i32, price: Decimal) -> Result<()> {
    let line = self
      .staged
      .cart_lines
      .iter_mut()
      .find(|l| l.id == line_id)
      .ok_or_else(|| AppError::not_found(format!("Cart line {} not found.", line_id)))?;
    line.quantity = quantity;
    line.price = price;
    Ok(())
  }

  async fn delete_cart_line(&mut self, line_id: Uuid) -> Result<()> {
    let before = self.staged.cart_lines.len();
    self.staged.cart_lines.retain(|l| l.id != line_id);
    if self.staged.cart_lines.len() == before {
      return Err(AppError::not_found(format!("Cart line {} not found.", line_id)));
    }
    Ok(())
  }

  async fn user_cart_lines(&mut self, user_id: &UserId) -> Result<Vec<CartLine>> {
    Ok(
      self
        .staged
        .cart_lines
        .iter()
        .filter(|l| &l.user_id == user_id)
        .cloned()
        .collect(),
    )
  }

  async fn insert_order(&mut self, order: &Order) -> Result<()> {
    self.staged.orders.push(order.clone());
    Ok(())
  }

  async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()> {
    if !self.staged.orders.iter().any(|o| o.id == line.order_id) {
      return Err(AppError::Internal(format!(
        "Order line {} references unknown order {}.",
        line.id, line.order_id
      )));
    }
    self.staged.order_lines.push(line.clone());
    Ok(())
  }

  async fn get_order(&mut self, order_id: Uuid) -> Result<Option<Order>> {
    Ok(self.staged.orders.iter().find(|o| o.id == order_id).cloned())
  }

  async fn update_order_status(&mut self, order_id: Uuid, status: OrderStatus) -> Result<()> {
    let order = self
      .staged
      .orders
      .iter_mut()
      .find(|o| o.id == order_id)
      .ok_or_else(|| AppError::not_found(format!("Order {} not found.", order_id)))?;
    order.status = status;
    Ok(())
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    let MemoryTx { mut guard, staged } = *self;
    *guard = staged;
    debug!("In-memory transaction committed.");
    Ok(())
  }
}
