// storefront/src/web/handlers/catalog_handlers.rs

use actix_web::{web, HttpResponse};
use serde_json::json;
use tracing::{info, instrument};

use crate::errors::AppError;
use crate::services::catalog::{self, SeedOutcome};
use crate::state::AppState;

#[instrument(name = "handler::list_pizzas", skip(app_state))]
pub async fn list_pizzas_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let pizzas = catalog::list_pizzas(app_state.store.as_ref()).await?;
  info!("Listing {} available pizzas.", pizzas.len());
  Ok(HttpResponse::Ok().json(json!({ "pizzas": pizzas })))
}

pub async fn menu_options_handler() -> HttpResponse {
  HttpResponse::Ok().json(catalog::menu_options())
}

#[instrument(name = "handler::seed_pizzas", skip(app_state))]
pub async fn seed_pizzas_handler(app_state: web::Data<AppState>) -> Result<HttpResponse, AppError> {
  let response = match catalog::seed_catalog(app_state.store.as_ref()).await? {
    SeedOutcome::Seeded(count) => HttpResponse::Created().json(json!({
      "message": "Pizzas seeded successfully",
      "seeded": count
    })),
    SeedOutcome::AlreadySeeded => HttpResponse::Ok().json(json!({
      "message": "Pizzas already seeded",
      "seeded": 0
    })),
  };
  Ok(response)
}
