// storefront/src/web/extractors.rs

use actix_web::{web, FromRequest, HttpRequest};
use futures_util::future::{ready, Ready};
use tracing::warn;

use crate::errors::AppError;
use crate::services::identity::{resolve_caller, Caller};
use crate::state::AppState;

/// Header carrying the per-user key issued by the identity provider.
pub const USER_ID_HEADER: &str = "X-User-ID";
/// Header carrying the kitchen staff token.
pub const STAFF_TOKEN_HEADER: &str = "X-Staff-Token";

fn header_value<'a>(req: &'a HttpRequest, name: &str) -> Option<&'a str> {
  let value = req.headers().get(name)?;
  match value.to_str() {
    Ok(text) => Some(text),
    Err(_) => {
      warn!(header = name, "Ignoring a header that is not valid visible ASCII.");
      None
    }
  }
}

/// Never rejects a request for lacking identity; operations decide what an
/// anonymous caller may do.
impl FromRequest for Caller {
  type Error = AppError;
  type Future = Ready<Result<Self, Self::Error>>;

  fn from_request(req: &HttpRequest, _payload: &mut actix_web::dev::Payload) -> Self::Future {
    let Some(app_state) = req.app_data::<web::Data<AppState>>() else {
      return ready(Err(AppError::Internal("Application state is not configured.".to_string())));
    };

    ready(resolve_caller(
      &app_state.config,
      header_value(req, USER_ID_HEADER),
      header_value(req, STAFF_TOKEN_HEADER),
    ))
  }
}
