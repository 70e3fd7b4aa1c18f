// storefront/src/state.rs
use crate::config::AppConfig;
use crate::errors::AppError;
use crate::pipelines;
use crate::store::Store;
use pizzeria_flow::FlowRegistry;
use std::sync::Arc;

#[derive(Clone)]
pub struct AppState {
  pub store: Arc<dyn Store>,
  pub flow: Arc<FlowRegistry<AppError>>,
  pub config: Arc<AppConfig>,
}

impl AppState {
  /// Wires a store and a configuration together with a registry holding every
  /// storefront pipeline.
  pub fn build(store: Arc<dyn Store>, config: AppConfig) -> Self {
    let flow = Arc::new(FlowRegistry::<AppError>::new());
    pipelines::register_all_pipelines(&flow);
    Self {
      store,
      flow,
      config: Arc::new(config),
    }
  }
}
