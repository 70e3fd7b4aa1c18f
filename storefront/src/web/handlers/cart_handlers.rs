// storefront/src/web/handlers/cart_handlers.rs

use actix_web::{web, HttpResponse};
use rust_decimal::Decimal;
use serde::Deserialize;
use serde_json::json;
use tracing::{info, instrument};
use uuid::Uuid;

use crate::errors::AppError;
use crate::pipelines::contexts::LineInput;
use crate::pricing::format_currency;
use crate::services::identity::Caller;
use crate::services::storefront;
use crate::state::AppState;

#[derive(Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct UpdateCartItemPayload {
  pub quantity: i32,
  /// Ignored when the quantity removes the line.
  #[serde(default)]
  pub price: Decimal,
}

#[instrument(name = "handler::get_cart", skip(app_state, caller), fields(user_id = ?caller.user_id))]
pub async fn get_cart_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let lines = storefront::get_cart(&app_state, &caller).await?;
  let total = storefront::cart_total(&lines)?;
  Ok(HttpResponse::Ok().json(json!({
    "items": lines,
    "total": total,
    "totalDisplay": format_currency(total)
  })))
}

#[instrument(name = "handler::add_to_cart", skip(app_state, caller, payload), fields(user_id = ?caller.user_id))]
pub async fn add_to_cart_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  payload: web::Json<LineInput>,
) -> Result<HttpResponse, AppError> {
  let addition = storefront::add_to_cart(&app_state, &caller, payload.into_inner()).await?;
  info!(line_id = %addition.line.id, merged = addition.merged, "Item added to cart.");

  let body = json!({
    "message": if addition.merged { "Cart item updated." } else { "Item added to cart." },
    "cartItem": addition.line,
    "merged": addition.merged
  });
  if addition.merged {
    Ok(HttpResponse::Ok().json(body))
  } else {
    Ok(HttpResponse::Created().json(body))
  }
}

#[instrument(name = "handler::update_cart_item", skip(app_state, caller, path, payload), fields(line_id = %path.as_ref()))]
pub async fn update_cart_item_handler(
  app_state: web::Data<AppState>,
  caller: Caller,
  path: web::Path<Uuid>,
  payload: web::Json<UpdateCartItemPayload>,
) -> Result<HttpResponse, AppError> {
  let line_id = path.into_inner();
  let updated = storefront::update_cart_item(&app_state, &caller, line_id, payload.quantity, payload.price).await?;

  Ok(HttpResponse::Ok().json(match updated {
    Some(line) => json!({ "message": "Cart item updated.", "cartItem": line, "removed": false }),
    None => json!({ "message": "Cart item removed.", "cartItem": null, "removed": true }),
  }))
}

#[instrument(name = "handler::clear_cart", skip(app_state, caller), fields(user_id = ?caller.user_id))]
pub async fn clear_cart_handler(app_state: web::Data<AppState>, caller: Caller) -> Result<HttpResponse, AppError> {
  let removed = storefront::clear_cart(&app_state, &caller).await?;
  Ok(HttpResponse::Ok().json(json!({ "message": "Cart cleared.", "removed": removed })))
}
