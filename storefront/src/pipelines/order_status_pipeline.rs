// storefront/src/pipelines/order_status_pipeline.rs

use crate::errors::AppError;
use crate::models::{Order, OrderStatus};
use crate::pipelines::contexts::OrderStatusCtxData;
use pizzeria_flow::{ContextData, FlowRegistry, Pipeline, PipelineControl};
use tracing::{info, warn};

pub fn register_order_status_pipeline(registry: &FlowRegistry<AppError>) {
  let mut p = Pipeline::<OrderStatusCtxData, AppError>::new(&[
    ("require_staff", false, None),
    ("parse_status", false, None),
    ("apply_status", false, None),
  ]);

  p.on_root("require_staff", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let check = { ctx_data.read().caller.require_staff() };
      if let Err(e) = check {
        warn!("Order Status Pipeline: Rejected status change by a non-staff caller.");
        return Err(e);
      }
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("parse_status", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let status: OrderStatus = { ctx_data.read().requested_status.parse()? };
      ctx_data.write().status = Some(status);
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  p.on_root("apply_status", |ctx_data: ContextData<OrderStatusCtxData>| {
    Box::pin(async move {
      let (store, order_id, status, enforce) = {
        let guard = ctx_data.read();
        (
          guard.app_state.store.clone(),
          guard.order_id,
          guard.status,
          guard.app_state.config.enforce_status_transitions,
        )
      };
      let status = status.ok_or_else(|| AppError::Internal("Status missing after parsing.".to_string()))?;

      let mut tx = store.begin().await?;
      let current = tx
        .get_order(order_id)
        .await?
        .ok_or_else(|| AppError::not_found(format!("Order {} not found.", order_id)))?;

      if current.status == status {
        info!("Order Status Pipeline: Order {} is already {}.", order_id, status);
        ctx_data.write().updated_order = Some(current);
        return Ok(PipelineControl::Continue);
      }
      if enforce && !current.status.can_transition_to(status) {
        warn!(
          "Order Status Pipeline: Refused transition {} -> {} for order {}.",
          current.status, status, order_id
        );
        return Err(AppError::validation(format!(
          "An order cannot move from {} to {}.",
          current.status, status
        )));
      }

      tx.update_order_status(order_id, status).await?;
      tx.commit().await?;
      info!(
        "Order Status Pipeline: Order {} moved from {} to {}.",
        order_id, current.status, status
      );

      ctx_data.write().updated_order = Some(Order { status, ..current });
      Ok::<_, AppError>(PipelineControl::Continue)
    })
  });

  registry.register_pipeline(p);
  info!("Order Status pipeline registered.");
}
