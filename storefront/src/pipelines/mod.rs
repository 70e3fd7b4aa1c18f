// storefront/src/pipelines/mod.rs

//! The storefront's mutating workflows, each a `pizzeria_flow::Pipeline` over its own
//! context type.

use crate::errors::AppError;
use pizzeria_flow::FlowRegistry;

pub mod common_steps;
pub mod contexts;

pub mod cart_pipeline;
pub mod checkout_pipeline;
pub mod order_status_pipeline;

/// Registers every storefront pipeline. Called once while building the `AppState`.
pub fn register_all_pipelines(registry: &FlowRegistry<AppError>) {
  tracing::info!("Registering storefront pipelines...");

  cart_pipeline::register_add_to_cart_pipeline(registry);
  cart_pipeline::register_update_cart_item_pipeline(registry);
  checkout_pipeline::register_checkout_pipeline(registry);
  order_status_pipeline::register_order_status_pipeline(registry);

  tracing::info!("All storefront pipelines registered.");
}
