// storefront/src/services/identity.rs

//! Caller identity: the per-user key from the identity provider plus the staff
//! capability, which is proven with a token checked against an Argon2 hash.

use crate::config::AppConfig;
use crate::errors::{AppError, Result};
use crate::models::UserId;
use argon2::{
  password_hash::{rand_core::OsRng, PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
  Argon2,
};
use tracing::{debug, error, instrument, warn};

/// Who is making a request.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Caller {
  /// `None` for anonymous callers.
  pub user_id: Option<UserId>,
  pub staff: bool,
}

impl Caller {
  pub fn anonymous() -> Self {
    Self::default()
  }

  pub fn customer(user_id: UserId) -> Self {
    Self {
      user_id: Some(user_id),
      staff: false,
    }
  }

  pub fn with_staff(mut self, staff: bool) -> Self {
    self.staff = staff;
    self
  }

  pub fn is_anonymous(&self) -> bool {
    self.user_id.is_none()
  }

  /// The caller's user key, or `Unauthenticated` for anonymous callers.
  pub fn require_user(&self) -> Result<&UserId> {
    self
      .user_id
      .as_ref()
      .ok_or_else(|| AppError::Unauthenticated("Please sign in to continue.".to_string()))
  }

  pub fn require_staff(&self) -> Result<()> {
    if self.staff {
      Ok(())
    } else {
      Err(AppError::Forbidden(
        "Only kitchen staff may change the status of an order.".to_string(),
      ))
    }
  }
}

/// Hashes a staff token into the PHC string expected in `STAFF_TOKEN_HASH`.
#[instrument(name = "identity::hash_staff_token", skip(token), err(Display))]
pub fn hash_staff_token(token: &str) -> Result<String> {
  if token.trim().is_empty() {
    return Err(AppError::validation("Staff token cannot be empty."));
  }

  let salt = SaltString::generate(&mut OsRng);
  Argon2::default()
    .hash_password(token.as_bytes(), &salt)
    .map(|hash| hash.to_string())
    .map_err(|e| {
      error!(error = %e, "Argon2 hashing of the staff token failed.");
      AppError::Internal(format!("Staff token hashing failed: {}", e))
    })
}

/// Checks `token` against the stored hash. A mismatch is `Ok(false)`; a hash that
/// cannot be parsed is a configuration problem.
#[instrument(name = "identity::verify_staff_token", skip_all, err(Display))]
pub fn verify_staff_token(stored_hash: &str, token: &str) -> Result<bool> {
  if token.is_empty() {
    return Ok(false);
  }

  let parsed = PasswordHash::new(stored_hash).map_err(|e| {
    error!(error = %e, "STAFF_TOKEN_HASH is not a valid PHC string.");
    AppError::Config(format!("Invalid STAFF_TOKEN_HASH: {}", e))
  })?;

  match Argon2::default().verify_password(token.as_bytes(), &parsed) {
    Ok(()) => Ok(true),
    Err(argon2::password_hash::Error::Password) => {
      debug!("Staff token did not match.");
      Ok(false)
    }
    Err(e) => Err(AppError::Internal(format!("Staff token verification failed: {}", e))),
  }
}

/// Builds the caller from the raw identity headers.
///
/// A blank user key is anonymous. A staff token is only honoured when a hash is
/// configured and the token verifies against it.
pub fn resolve_caller(config: &AppConfig, user_key: Option<&str>, staff_token: Option<&str>) -> Result<Caller> {
  let user_id = user_key.and_then(UserId::parse);

  let staff = match (config.staff_token_hash.as_deref(), staff_token) {
    (Some(hash), Some(token)) => verify_staff_token(hash, token.trim())?,
    (None, Some(_)) => {
      warn!("Staff token presented but no STAFF_TOKEN_HASH is configured; ignoring it.");
      false
    }
    (_, None) => false,
  };

  Ok(Caller { user_id, staff })
}
