// storefront/src/web/handlers/order_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::models::CustomerInfo;
use crate::pipelines::contexts::LineInput;
use crate::services::identity::Caller;
use crate::services::storefront;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct CreateOrderPayload {
  #[serde(flatten)]
  pub customer: CustomerInfo,
  #[serde(default)]
  pub items: Vec<LineInput>,
  pub total_amount: Decimal,
}

#[derive(Deserialize, Debug)]
pub struct UpdateOrderStatusPayload {
  pub status: String,
}

#[instrument(name = "handler::create_order", skip(app_state, caller, payload), fields(user_id = ?caller.user_id))]
pub async fn create_order_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  payload: web::Json<CreateOrderPayload>,
) -> Result<HttpResponse, AppError> {
  let CreateOrderPayload {
    customer,
    items,
    total_amount,
  } = payload.into_inner();

  let order_id = storefront::create_order(&app_state, &caller, customer, items, total_amount).await?;
  info!(order_id = %order_id, "Order placed.");
  Ok(HttpResponse::Created().json(json!({ "message": "Order placed.", "orderId": order_id })))
}

#[instrument(name = "handler::list_orders", skip(app_state, caller), fields(user_id = ?caller.user_id))]
pub async fn list_orders_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let orders = storefront::get_user_orders(&app_state, &caller).await?;
  Ok(HttpResponse::Ok().json(json!({ "orders": orders })))
}

#[instrument(name = "handler::get_order", skip(app_state, caller, path), fields(order_id = %path.as_ref()))]
pub async fn get_order_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<Uuid>,
) -> Result<HttpResponse, AppError> {
  let order = storefront::get_order(&app_state, &caller, path.into_inner()).await?;
  Ok(HttpResponse::Ok().json(json!({ "order": order })))
}

#[instrument(name = "handler::update_order_status", skip(app_state, caller, path, payload), fields(order_id = %path.as_ref()))]
pub async fn update_order_status_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateOrderStatusPayload>,
) -> Result<HttpResponse, AppError> {
  let order = storefront::update_order_status(&app_state, &caller, path.into_inner(), &payload.status).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Order status updated.", "order": order })))
}
