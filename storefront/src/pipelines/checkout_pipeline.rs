// storefront/src/pipelines/checkout_pipeline.rs

use crate::errors::AppError;
use crate::models::{Order, OrderLine, OrderStatus};
use crate::pipelines::common_steps::{require_customer, validate_line, verify_supplied_price};
use crate::pipelines::contexts::CheckoutCtxData;
use crate::pricing::{format_currency, prices_match, sum_prices};
use chrono::Utc;
use pizzeria_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{error, info, warn};
use uuid::Uuid;

pub fn register_checkout_pipeline(registry: &FlowRegistry<AppError>) {
  let skip_price_check: SkipCondition<CheckoutCtxData> =
    Arc::new(|ctx_data: ContextData<CheckoutCtxData>| !ctx_data.read().app_state.config.verify_prices);

  let mut p = Pipeline::<CheckoutCtxData, AppError>::new(&[
    ("require_customer", false, None),
    ("validate_checkout_input", false, None),
    ("reconcile_total", false, None),
    ("verify_line_prices", false, Some(skip_price_check)),
    ("place_order", false, None),
  ]);

  p.on_root("require_customer", require_customer::<CheckoutCtxData>);

  p.on_root("validate_checkout_input", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (customer, submitted) = {
        let guard = ctx_data.read();
        (guard.customer.clone(), guard.submitted_lines.clone())
      };

      if submitted.is_empty() {
        warn!("Checkout Pipeline: Attempted checkout with an empty cart.");
        return Err(AppError::validation("Cart is empty"));
      }

      for (field, value) in [
        ("customerName", &customer.customer_name),
        ("customerEmail", &customer.customer_email),
        ("customerPhone", &customer.customer_phone),
        ("customerAddress", &customer.customer_address),
      ] {
        if value.trim().is_empty() {
          return Err(AppError::validation(format!("{} is required.", field)));
        }
      }

      let lines = submitted.iter().map(validate_line).collect::<Result<Vec<_>, _>>()?;
      // Order lines keep the submitted name, so it has to be there.
      if let Some(nameless) = lines.iter().find(|line| line.pizza_name.is_empty()) {
        return Err(AppError::validation(format!(
          "pizzaName is required for pizza {}.",
          nameless.pizza_id
        )));
      }
      info!("Checkout Pipeline: {} line(s) validated.", lines.len());
      ctx_data.write().lines = lines;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("reconcile_total", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (line_sum, submitted_total) = {
        let guard = ctx_data.read();
        (sum_prices(guard.lines.iter().map(|l| l.price)), guard.submitted_total)
      };
      let line_sum = line_sum?;

      if !prices_match(submitted_total, line_sum) {
        warn!(
          "Checkout Pipeline: Submitted total {} does not match line sum {}.",
          submitted_total, line_sum
        );
        return Err(AppError::validation(format!(
          "Order total {} does not match the sum of its items {}.",
          format_currency(submitted_total),
          format_currency(line_sum)
        )));
      }

      ctx_data.write().total_amount = line_sum;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("verify_line_prices", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, lines) = {
        let guard = ctx_data.read();
        (guard.app_state.store.clone(), guard.lines.clone())
      };

      for line in &lines {
        let pizza = store
          .pizza(line.pizza_id)
          .await?
          .ok_or_else(|| AppError::not_found(format!("Pizza {} is not on the menu.", line.pizza_id)))?;
        verify_supplied_price(&pizza, line.size, line.toppings.len(), line.quantity, line.price)?;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("place_order", |ctx_data: ContextData<CheckoutCtxData>| {
    Box::pin(async move {
      let (store, user_id, customer, lines, total_amount) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.user_id.clone(),
          guard.customer.clone(),
          guard.lines.clone(),
          guard.total_amount,
        )
      };
      let user_id = user_id.ok_or_else(|| AppError::Internal("Checkout reached without a caller.".to_string()))?;

      let order = Order {
        id: Uuid::new_v4(),
        user_id: user_id.clone(),
        customer_name: customer.customer_name.trim().to_string(),
        customer_email: customer.customer_email.trim().to_string(),
        customer_phone: customer.customer_phone.trim().to_string(),
        customer_address: customer.customer_address.trim().to_string(),
        status: OrderStatus::Pending,
        total_amount,
        order_date: Utc::now(),
      };
      let order_lines: Vec<OrderLine> = lines
        .into_iter()
        .map(|line| OrderLine {
          id: Uuid::new_v4(),
          order_id: order.id,
          pizza_id: line.pizza_id,
          pizza_name: line.pizza_name,
          size: line.size,
          toppings: line.toppings,
          quantity: line.quantity,
          price: line.price,
        })
        .collect();

      let mut tx = store.begin().await?;
      tx.lock_user(&user_id).await?;

      tx.insert_order(&order).await?;
      for line in &order_lines {
        tx.insert_order_line(line).await?;
      }

      // The cart is cleared from what is stored now, not from the submitted lines.
      let current_cart = tx.user_cart_lines(&user_id).await?;
      for cart_line in &current_cart {
        tx.delete_cart_line(cart_line.id).await?;
      }

      tx.commit().await.map_err(|e| {
        error!("Checkout Pipeline: Commit of order {} failed: {}", order.id, e);
        e
      })?;
      info!(
        "Checkout Pipeline: Order {} placed for user {} ({} line(s), total {}, {} cart line(s) cleared).",
        order.id,
        user_id,
        order_lines.len(),
        format_currency(total_amount),
        current_cart.len()
      );

      {
        let mut guard = ctx_data.write();
        guard.order = Some(order);
        guard.order_lines = order_lines;
        guard.cleared_cart_lines = current_cart.len();
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Checkout pipeline registered.");
}
