// storefront/src/store/postgres.rs

//! PostgreSQL store on sqlx runtime queries.

use super::{Store, StoreTx};
use crate::errors::{AppError, Result};
use crate::models::{CartLine, CartLineKey, NewPizza, Order, OrderLine, OrderStatus, OrderWithLines, Pizza, UserId};
use async_trait::async_trait;
use rust_decimal::Decimal;
use sqlx::postgres::{PgPool, PgPoolOptions};
use sqlx::{Postgres, Transaction};
use std::collections::HashMap;
use tracing::{error, info, instrument};
use uuid::Uuid;

const SCHEMA_SQL: &str = include_str!("../../migrations/0001_storefront.sql");

const PIZZA_COLUMNS: &str = "id, name, description, base_price, image, category, available";
const CART_LINE_COLUMNS: &str = "id, user_id, pizza_id, pizza_name, size, toppings, quantity, price, added_at";
const ORDER_COLUMNS: &str =
  "id, user_id, customer_name, customer_email, customer_phone, customer_address, status, total_amount, order_date";
const ORDER_LINE_COLUMNS: &str = "id, order_id, pizza_id, pizza_name, size, toppings, quantity, price";

#[derive(Debug, Clone)]
pub struct PgStore {
  pool: PgPool,
}

impl PgStore {
  #[instrument(name = "PgStore::connect", skip(database_url), err(Display))]
  pub async fn connect(database_url: &str) -> Result<Self> {
    let pool = PgPoolOptions::new().max_connections(10).connect(database_url).await?;
    info!("Connected to PostgreSQL.");
    Ok(Self { pool })
  }

  pub fn from_pool(pool: PgPool) -> Self {
    Self { pool }
  }

  /// Creates the storefront types, tables and indexes if they do not exist yet.
  pub async fn migrate(&self) -> Result<()> {
    sqlx::raw_sql(SCHEMA_SQL).execute(&self.pool).await?;
    info!("Storefront schema is up to date.");
    Ok(())
  }

  async fn lines_for_orders(&self, orders: Vec<Order>) -> Result<Vec<OrderWithLines>> {
    if orders.is_empty() {
      return Ok(Vec::new());
    }
    let order_ids: Vec<Uuid> = orders.iter().map(|o| o.id).collect();
    let lines: Vec<OrderLine> = sqlx::query_as(&format!(
      "SELECT {} FROM order_lines WHERE order_id = ANY($1) ORDER BY position",
      ORDER_LINE_COLUMNS
    ))
    .bind(&order_ids)
    .fetch_all(&self.pool)
    .await?;

    let mut by_order: HashMap<Uuid, Vec<OrderLine>> = HashMap::new();
    for line in lines {
      by_order.entry(line.order_id).or_default().push(line);
    }
    Ok(
      orders
        .into_iter()
        .map(|order| {
          let items = by_order.remove(&order.id).unwrap_or_default();
          OrderWithLines { order, items }
        })
        .collect(),
    )
  }
}

#[async_trait]
impl Store for PgStore {
  async fn begin(&self) -> Result<Box<dyn StoreTx>> {
    let tx = self.pool.begin().await.map_err(|e| {
      error!("Could not open a transaction: {}", e);
      AppError::Transaction(e.to_string())
    })?;
    Ok(Box::new(PgStoreTx { tx }))
  }

  async fn available_pizzas(&self) -> Result<Vec<Pizza>> {
    let pizzas = sqlx::query_as(&format!(
      "SELECT {} FROM pizzas WHERE available ORDER BY position",
      PIZZA_COLUMNS
    ))
    .fetch_all(&self.pool)
    .await?;
    Ok(pizzas)
  }

  async fn pizza(&self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    let pizza = sqlx::query_as(&format!("SELECT {} FROM pizzas WHERE id = $1", PIZZA_COLUMNS))
      .bind(pizza_id)
      .fetch_optional(&self.pool)
      .await?;
    Ok(pizza)
  }

  async fn cart_lines(&self, user_id: &UserId) -> Result<Vec<CartLine>> {
    let lines = sqlx::query_as(&format!(
      "SELECT {} FROM cart_lines WHERE user_id = $1 ORDER BY added_at, id",
      CART_LINE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    Ok(lines)
  }

  async fn orders_for_user(&self, user_id: &UserId) -> Result<Vec<OrderWithLines>> {
    let orders: Vec<Order> = sqlx::query_as(&format!(
      "SELECT {} FROM orders WHERE user_id = $1 ORDER BY order_date DESC",
      ORDER_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&self.pool)
    .await?;
    self.lines_for_orders(orders).await
  }

  async fn order_with_lines(&self, order_id: Uuid) -> Result<Option<OrderWithLines>> {
    let order: Option<Order> = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&self.pool)
      .await?;
    match order {
      Some(order) => Ok(self.lines_for_orders(vec![order]).await?.pop()),
      None => Ok(None),
    }
  }
}

struct PgStoreTx {
  tx: Transaction<'static, Postgres>,
}

#[async_trait]
impl StoreTx for PgStoreTx {
  async fn lock_user(&mut self, user_id: &UserId) -> Result<()> {
    sqlx::query("SELECT pg_advisory_xact_lock(hashtext($1))")
      .bind(user_id)
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn lock_catalog(&mut self) -> Result<()> {
    // Self-conflicting mode: a second seeder waits here until the first commits.
    sqlx::query("LOCK TABLE pizzas IN SHARE ROW EXCLUSIVE MODE")
      .execute(&mut *self.tx)
      .await?;
    Ok(())
  }

  async fn count_pizzas(&mut self) -> Result<usize> {
    let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM pizzas")
      .fetch_one(&mut *self.tx)
      .await?;
    Ok(count.max(0) as usize)
  }

  async fn insert_pizza(&mut self, pizza: NewPizza) -> Result<Pizza> {
    let inserted = sqlx::query_as(&format!(
      "INSERT INTO pizzas (id, name, description, base_price, image, category, available) \
       VALUES ($1, $2, $3, $4, $5, $6, TRUE) RETURNING {}",
      PIZZA_COLUMNS
    ))
    .bind(Uuid::new_v4())
    .bind(&pizza.name)
    .bind(&pizza.description)
    .bind(pizza.base_price)
    .bind(&pizza.image)
    .bind(&pizza.category)
    .fetch_one(&mut *self.tx)
    .await?;
    Ok(inserted)
  }

  async fn get_pizza(&mut self, pizza_id: Uuid) -> Result<Option<Pizza>> {
    let pizza = sqlx::query_as(&format!("SELECT {} FROM pizzas WHERE id = $1", PIZZA_COLUMNS))
      .bind(pizza_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(pizza)
  }

  async fn find_cart_line(&mut self, user_id: &UserId, key: &CartLineKey) -> Result<Option<CartLine>> {
    let line = sqlx::query_as(&format!(
      "SELECT {} FROM cart_lines WHERE user_id = $1 AND pizza_id = $2 AND size = $3 AND toppings = $4 FOR UPDATE",
      CART_LINE_COLUMNS
    ))
    .bind(user_id)
    .bind(key.pizza_id)
    .bind(key.size)
    .bind(&key.toppings)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(line)
  }

  async fn get_cart_line(&mut self, line_id: Uuid) -> Result<Option<CartLine>> {
    let line = sqlx::query_as(&format!(
      "SELECT {} FROM cart_lines WHERE id = $1 FOR UPDATE",
      CART_LINE_COLUMNS
    ))
    .bind(line_id)
    .fetch_optional(&mut *self.tx)
    .await?;
    Ok(line)
  }

  async fn insert_cart_line(&mut self, line: &CartLine) -> Result<()> {
    sqlx::query(
      "INSERT INTO cart_lines (id, user_id, pizza_id, pizza_name, size, toppings, quantity, price, added_at) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(line.id)
    .bind(&line.user_id)
    .bind(line.pizza_id)
    .bind(&line.pizza_name)
    .bind(line.size)
    .bind(&line.toppings)
    .bind(line.quantity)
    .bind(line.price)
    .bind(line.added_at)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn update_cart_line(&mut self, line_id: Uuid, quantity: i32, price: Decimal) -> Result<()> {
    let result = sqlx::query("UPDATE cart_lines SET quantity = $2, price = $3 WHERE id = $1")
      .bind(line_id)
      .bind(quantity)
      .bind(price)
      .execute(&mut *self.tx)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::not_found(format!("Cart line {} not found.", line_id)));
    }
    Ok(())
  }

  async fn delete_cart_line(&mut self, line_id: Uuid) -> Result<()> {
    let result = sqlx::query("DELETE FROM cart_lines WHERE id = $1")
      .bind(line_id)
      .execute(&mut *self.tx)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::not_found(format!("Cart line {} not found.", line_id)));
    }
    Ok(())
  }

  async fn user_cart_lines(&mut self, user_id: &UserId) -> Result<Vec<CartLine>> {
    let lines = sqlx::query_as(&format!(
      "SELECT {} FROM cart_lines WHERE user_id = $1 ORDER BY added_at, id FOR UPDATE",
      CART_LINE_COLUMNS
    ))
    .bind(user_id)
    .fetch_all(&mut *self.tx)
    .await?;
    Ok(lines)
  }

  async fn insert_order(&mut self, order: &Order) -> Result<()> {
    sqlx::query(
      "INSERT INTO orders (id, user_id, customer_name, customer_email, customer_phone, customer_address, \
       status, total_amount, order_date) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9)",
    )
    .bind(order.id)
    .bind(&order.user_id)
    .bind(&order.customer_name)
    .bind(&order.customer_email)
    .bind(&order.customer_phone)
    .bind(&order.customer_address)
    .bind(order.status)
    .bind(order.total_amount)
    .bind(order.order_date)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn insert_order_line(&mut self, line: &OrderLine) -> Result<()> {
    sqlx::query(
      "INSERT INTO order_lines (id, order_id, pizza_id, pizza_name, size, toppings, quantity, price) \
       VALUES ($1, $2, $3, $4, $5, $6, $7, $8)",
    )
    .bind(line.id)
    .bind(line.order_id)
    .bind(line.pizza_id)
    .bind(&line.pizza_name)
    .bind(line.size)
    .bind(&line.toppings)
    .bind(line.quantity)
    .bind(line.price)
    .execute(&mut *self.tx)
    .await?;
    Ok(())
  }

  async fn get_order(&mut self, order_id: Uuid) -> Result<Option<Order>> {
    let order = sqlx::query_as(&format!("SELECT {} FROM orders WHERE id = $1 FOR UPDATE", ORDER_COLUMNS))
      .bind(order_id)
      .fetch_optional(&mut *self.tx)
      .await?;
    Ok(order)
  }

  async fn update_order_status(&mut self, order_id: Uuid, status: OrderStatus) -> Result<()> {
    let result = sqlx::query("UPDATE orders SET status = $2 WHERE id = $1")
      .bind(order_id)
      .bind(status)
      .execute(&mut *self.tx)
      .await?;
    if result.rows_affected() == 0 {
      return Err(AppError::not_found(format!("Order {} not found.", order_id)));
    }
    Ok(())
  }

  async fn commit(self: Box<Self>) -> Result<()> {
    self.tx.commit().await.map_err(|e| {
      error!("Transaction commit failed: {}", e);
      AppError::Transaction(e.to_string())
    })
  }
}
