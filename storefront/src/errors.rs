// storefront/src/errors.rs

use actix_web::{HttpResponse, ResponseError};
use serde_json::json;
use thiserror::Error;

use pizzeria_flow::FlowError;

#[derive(Debug, Error)]
pub enum AppError {
  /// No caller identity could be resolved for a user-scoped mutation.
  #[error("Authentication Required: {0}")]
  Unauthenticated(String),

  #[error("Validation Error: {0}")]
  Validation(String),

  /// The caller is known but may not touch the resource (someone else's cart line,
  /// status changes without the staff capability).
  #[error("Forbidden: {0}")]
  Forbidden(String),

  #[error("Resource Not Found: {0}")]
  NotFound(String),

  /// The store could not commit an atomic unit of work.
  #[error("Transaction Failed: {0}")]
  Transaction(String),

  #[error("Configuration Error: {0}")]
  Config(String),

  #[error("Database Error: {0}")]
  Sqlx(#[from] sqlx::Error),

  #[error("Workflow Error: {source}")]
  Workflow {
    #[from]
    source: FlowError,
  },

  #[error("Internal Server Error: {0}")]
  Internal(String),

  #[error("Pipeline execution was halted by a handler.")]
  PipelineHalted,
}

impl AppError {
  pub fn validation(message: impl Into<String>) -> Self {
    AppError::Validation(message.into())
  }

  pub fn not_found(message: impl Into<String>) -> Self {
    AppError::NotFound(message.into())
  }

  /// The error taxonomy name surfaced to clients next to the message.
  pub fn kind(&self) -> &'static str {
    match self {
      AppError::Unauthenticated(_) => "unauthenticated",
      AppError::Validation(_) => "validation",
      AppError::Forbidden(_) => "authorization",
      AppError::NotFound(_) => "not_found",
      AppError::Transaction(_) => "transaction_failure",
      AppError::PipelineHalted => "halted",
      AppError::Config(_) | AppError::Sqlx(_) | AppError::Workflow { .. } | AppError::Internal(_) => "internal",
    }
  }
}

impl ResponseError for AppError {
  fn error_response(&self) -> HttpResponse {
    tracing::error!(application_error = %self, "Responding with error");
    let kind = self.kind();
    match self {
      AppError::Unauthenticated(m) => HttpResponse::Unauthorized().json(json!({"error": m, "kind": kind})),
      AppError::Validation(m) => HttpResponse::BadRequest().json(json!({"error": m, "kind": kind})),
      AppError::Forbidden(m) => HttpResponse::Forbidden().json(json!({"error": m, "kind": kind})),
      AppError::NotFound(m) => HttpResponse::NotFound().json(json!({"error": m, "kind": kind})),
      AppError::Transaction(m) => {
        HttpResponse::Conflict().json(json!({"error": "Could not commit the operation", "detail": m, "kind": kind}))
      }
      AppError::Config(m) => {
        HttpResponse::InternalServerError().json(json!({"error": "Configuration issue", "detail": m, "kind": kind}))
      }
      AppError::Sqlx(_) => {
        HttpResponse::InternalServerError().json(json!({"error": "Database operation failed", "kind": kind}))
      }
      AppError::Workflow { source } => {
        tracing::error!(flow_error_source = ?source, "Workflow error details");
        HttpResponse::InternalServerError()
          .json(json!({"error": "Workflow processing error", "detail": source.to_string(), "kind": kind}))
      }
      AppError::Internal(m) => HttpResponse::InternalServerError()
        .json(json!({"error": "An internal error occurred", "detail": m, "kind": kind})),
      AppError::PipelineHalted => {
        HttpResponse::Conflict().json(json!({"error": "Process halted by business logic.", "kind": kind}))
      }
    }
  }
}

pub type Result<T, E = AppError> = std::result::Result<T, E>;
