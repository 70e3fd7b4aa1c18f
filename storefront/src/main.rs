// storefront/src/main.rs

use actix_web::{web as actix_data, App, HttpServer};
use pizzeria::config::AppConfig;
use pizzeria::errors::AppError;
use pizzeria::services::catalog;
use pizzeria::state::AppState;
use pizzeria::store::{MemoryStore, PgStore, Store};
use pizzeria::web::configure_app_routes;
use std::sync::Arc;
use tracing_subscriber::fmt::format::FmtSpan;
use tracing_subscriber::EnvFilter;

async fn open_store(config: &AppConfig) -> Result<Arc<dyn Store>, AppError> {
  match config.database_url.as_deref() {
    Some(url) => {
      let store = PgStore::connect(url).await?;
      store.migrate().await?;
      Ok(Arc::new(store))
    }
    None => {
      tracing::warn!("DATABASE_URL is not set; using the in-memory store. Data is lost on restart.");
      Ok(Arc::new(MemoryStore::new()))
    }
  }
}

#[actix_web::main]
async fn main() -> std::io::Result<()> {
  tracing_subscriber::fmt()
    .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")))
    .with_span_events(FmtSpan::CLOSE)
    .init();

  tracing::info!("Starting pizzeria storefront...");

  let app_config = match AppConfig::from_env() {
    Ok(cfg) => cfg,
    Err(e) => {
      tracing::error!(error = %e, "Failed to load application configuration.");
      return Err(std::io::Error::new(std::io::ErrorKind::InvalidInput, e.to_string()));
    }
  };

  let store = match open_store(&app_config).await {
    Ok(store) => store,
    Err(e) => {
      tracing::error!(error = %e, "Failed to open the store.");
      return Err(std::io::Error::new(std::io::ErrorKind::Other, e.to_string()));
    }
  };

  if app_config.seed_catalog {
    match catalog::seed_catalog(store.as_ref()).await {
      Ok(outcome) => tracing::info!(?outcome, "Catalog seeding finished."),
      Err(e) => tracing::error!(error = %e, "Catalog seeding failed; continuing without it."),
    }
  }

  let server_address = app_config.bind_address();
  let app_state = AppState::build(store, app_config);

  tracing::info!("Binding server to {}...", server_address);
  HttpServer::new(move || {
    App::new()
      .app_data(actix_data::Data::new(app_state.clone()))
      .wrap(tracing_actix_web::TracingLogger::default())
      .configure(configure_app_routes)
  })
  .bind(&server_address)?
  .run()
  .await
}
