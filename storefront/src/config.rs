// storefront/src/config.rs

use crate::errors::{AppError, Result};
use dotenvy::dotenv;
use std::env;

#[derive(Debug, Clone)]
pub struct AppConfig {
  pub server_host: String,
  pub server_port: u16,
  /// PostgreSQL connection string; without one the storefront runs on the in-memory store.
  pub database_url: Option<String>,

  /// Populate the catalog at startup if it is empty.
  pub seed_catalog: bool,
  /// Recompute caller-supplied line prices with the pricing engine and reject mismatches.
  pub verify_prices: bool,
  /// Only accept order status changes along the kitchen lifecycle.
  pub enforce_status_transitions: bool,
  /// Argon2 PHC hash of the staff token. `None` means no caller has the staff capability.
  pub staff_token_hash: Option<String>,
}

impl Default for AppConfig {
  fn default() -> Self {
    Self {
      server_host: "127.0.0.1".to_string(),
      server_port: 8080,
      database_url: None,
      seed_catalog: true,
      verify_prices: true,
      enforce_status_transitions: true,
      staff_token_hash: None,
    }
  }
}

fn parse_flag(var_name: &str, raw: Option<String>, default: bool) -> Result<bool> {
  match raw {
    None => Ok(default),
    Some(value) => value
      .trim()
      .parse::<bool>()
      .map_err(|e| AppError::Config(format!("Invalid {} value '{}': {}", var_name, value, e))),
  }
}

impl AppConfig {
  pub fn from_env() -> Result<Self> {
    dotenv().ok();

    let get_env = |var_name: &str| env::var(var_name).ok().filter(|v| !v.trim().is_empty());
    let defaults = Self::default();

    let server_host = get_env("SERVER_HOST").unwrap_or(defaults.server_host);
    let server_port = match get_env("SERVER_PORT") {
      Some(raw) => raw
        .trim()
        .parse::<u16>()
        .map_err(|e| AppError::Config(format!("Invalid SERVER_PORT: {}", e)))?,
      None => defaults.server_port,
    };
    let database_url = get_env("DATABASE_URL");

    let seed_catalog = parse_flag("SEED_CATALOG", get_env("SEED_CATALOG"), defaults.seed_catalog)?;
    let verify_prices = parse_flag("VERIFY_PRICES", get_env("VERIFY_PRICES"), defaults.verify_prices)?;
    let enforce_status_transitions = parse_flag(
      "ENFORCE_STATUS_TRANSITIONS",
      get_env("ENFORCE_STATUS_TRANSITIONS"),
      defaults.enforce_status_transitions,
    )?;
    let staff_token_hash = get_env("STAFF_TOKEN_HASH");

    tracing::info!(
      store = if database_url.is_some() { "postgres" } else { "memory" },
      seed_catalog,
      verify_prices,
      enforce_status_transitions,
      staff_enabled = staff_token_hash.is_some(),
      "Application configuration loaded."
    );

    Ok(Self {
      server_host,
      server_port,
      database_url,
      seed_catalog,
      verify_prices,
      enforce_status_transitions,
      staff_token_hash,
    })
  }

  pub fn bind_address(&self) -> String {
    format!("{}:{}", self.server_host, self.server_port)
  }
}
