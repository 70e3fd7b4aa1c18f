// storefront/src/pipelines/cart_pipeline.rs

use crate::errors::AppError;
use crate::models::{CartLine, CartLineKey};
use crate::pipelines::common_steps::{require_customer, validate_line, verify_supplied_price};
use crate::pipelines::contexts::{AddToCartCtxData, UpdateCartItemCtxData};
use chrono::Utc;
use pizzeria_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl, SkipCondition};
use std::sync::Arc;
use tracing::{info, warn};
use uuid::Uuid;

pub fn register_add_to_cart_pipeline(registry: &FlowRegistry<AppError>) {
  let skip_price_check: SkipCondition<AddToCartCtxData> =
    Arc::new(|ctx_data: ContextData<AddToCartCtxData>| !ctx_data.read().app_state.config.verify_prices);

  let mut p = Pipeline::<AddToCartCtxData, AppError>::new(&[
    ("require_customer", false, None),
    ("validate_cart_input", false, None),
    ("load_pizza", false, None),
    ("verify_line_price", false, Some(skip_price_check)),
    ("merge_into_cart", false, None),
  ]);

  p.on_root("require_customer", require_customer::<AddToCartCtxData>);

  p.on_root("validate_cart_input", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let input = { ctx_data.read().input.clone() };
      let line = validate_line(&input)?;
      info!(
        "Add to Cart Pipeline: Input validated ({} x {} with {} toppings).",
        line.quantity,
        line.size,
        line.toppings.len()
      );
      ctx_data.write().line = Some(line);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("load_pizza", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (pizza_id, store) = {
        let guard = ctx_data.read();
        (guard.input.pizza_id, guard.app_state.store.clone())
      };

      let pizza = store
        .pizza(pizza_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Pizza {} is not on the menu.", pizza_id)))?;
      if !pizza.available {
        warn!("Add to Cart Pipeline: Pizza {} is currently unavailable.", pizza.name);
        return Err(AppError::validation(format!("{} is currently unavailable.", pizza.name)));
      }

      ctx_data.write().pizza = Some(pizza);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("verify_line_price", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let guard = ctx_data.read();
      let (pizza, line) = match (guard.pizza.as_ref(), guard.line.as_ref()) {
        (Some(pizza), Some(line)) => (pizza, line),
        _ => return Err(AppError::Internal("Pizza or line missing before price check.".to_string())),
      };
      verify_supplied_price(pizza, line.size, line.toppings.len(), line.quantity, line.price)?;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("merge_into_cart", |ctx_data: ContextData<AddToCartCtxData>| {
    Box::pin(async move {
      let (store, user_id, line, pizza) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.user_id.clone(),
          guard.line.clone(),
          guard.pizza.clone(),
        )
      };
      let (user_id, line, pizza) = match (user_id, line, pizza) {
        (Some(user_id), Some(line), Some(pizza)) => (user_id, line, pizza),
        _ => {
          return Err(AppError::Internal(
            "Cart merge reached without a caller, line or pizza.".to_string(),
          ))
        }
      };

      let key = CartLineKey {
        pizza_id: line.pizza_id,
        size: line.size,
        toppings: line.toppings.clone(),
      };

      let mut tx = store.begin().await?;
      tx.lock_user(&user_id).await?;

      let (cart_line, merged) = match tx.find_cart_line(&user_id, &key).await? {
        Some(existing) => {
          let quantity = existing.quantity.checked_add(line.quantity).ok_or_else(|| {
            AppError::validation(format!("Quantity for {} would overflow.", existing.pizza_name))
          })?;
          let price = existing.price.checked_add(line.price).ok_or_else(|| {
            AppError::validation(format!("Price for {} would overflow.", existing.pizza_name))
          })?;
          tx.update_cart_line(existing.id, quantity, price).await?;
          info!(
            "Add to Cart Pipeline: Merged into line {} for user {}, quantity now {}.",
            existing.id, user_id, quantity
          );
          (CartLine { quantity, price, ..existing }, true)
        }
        None => {
          let new_line = CartLine {
            id: Uuid::new_v4(),
            user_id: user_id.clone(),
            pizza_id: pizza.id,
            pizza_name: pizza.name.clone(),
            size: line.size,
            toppings: line.toppings,
            quantity: line.quantity,
            price: line.price,
            added_at: Utc::now(),
          };
          tx.insert_cart_line(&new_line).await?;
          info!("Add to Cart Pipeline: Added line {} for user {}.", new_line.id, user_id);
          (new_line, false)
        }
      };
      tx.commit().await?;

      {
        let mut guard = ctx_data.write();
        guard.cart_line = Some(cart_line);
        guard.merged = merged;
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Add to Cart pipeline registered.");
}

pub fn register_update_cart_item_pipeline(registry: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<UpdateCartItemCtxData, AppError>::new(&[
    ("require_customer", false, None),
    ("validate_update_input", false, None),
    ("apply_cart_update", false, None),
  ]);

  p.on_root("require_customer", require_customer::<UpdateCartItemCtxData>);

  p.on_root("validate_update_input", |ctx_data: ContextData<UpdateCartItemCtxData>| {
    Box::pin(async move {
      let (quantity, price) = {
        let guard = ctx_data.read();
        (guard.quantity, guard.price)
      };
      // A removal ignores the price entirely.
      if quantity > 0 && price.is_sign_negative() && !price.is_zero() {
        return Err(AppError::validation(format!("Price must not be negative (got {}).", price)));
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("apply_cart_update", |ctx_data: ContextData<UpdateCartItemCtxData>| {
    Box::pin(async move {
      let (store, user_id, line_id, quantity, price, verify_prices) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.user_id.clone(),
          guard.line_id,
          guard.quantity,
          guard.price,
          guard.app_state.config.verify_prices,
        )
      };
      let user_id = user_id.ok_or_else(|| AppError::Internal("Cart update reached without a caller.".to_string()))?;

      let mut tx = store.begin().await?;
      tx.lock_user(&user_id).await?;

      let existing = tx
        .get_cart_line(line_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Cart line {} not found.", line_id)))?;
      if existing.user_id != user_id {
        warn!(
          "Update Cart Pipeline: User {} tried to modify line {} owned by someone else.",
          user_id, line_id
        );
        return Err(AppError::Forbidden("This cart line belongs to another customer.".to_string()));
      }

      let updated = if quantity <= 0 {
        tx.delete_cart_line(line_id).await?;
        info!("Update Cart Pipeline: Removed line {} for user {}.", line_id, user_id);
        None
      } else {
        if verify_prices {
          let pizza = tx.get_pizza(existing.pizza_id).await?.ok_or_else(|| {
            AppError::not_found(format!("Pizza {} is no longer on the menu.", existing.pizza_id))
          })?;
          verify_supplied_price(&pizza, existing.size, existing.toppings.len(), quantity, price)?;
        }
        tx.update_cart_line(line_id, quantity, price).await?;
        info!(
          "Update Cart Pipeline: Line {} for user {} set to quantity {}.",
          line_id, user_id, quantity
        );
        Some(CartLine {
          quantity,
          price,
          ..existing
        })
      };
      tx.commit().await?;

      ctx_data.write().updated_line = updated;
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Update Cart Item pipeline registered.");
}
