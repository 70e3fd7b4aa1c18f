// flow/tests/common/mod.rs
#![allow(dead_code)]

use once_cell::sync::Lazy;
use pizzeria_flow::{ContextData, FlowError, Handler, PipelineControl};
use tracing::Level;

/// A kitchen ticket passed through test pipelines.
#[derive(Clone, Debug, Default)]
pub struct TicketContext {
  pub counter: i32,
  pub notes: String,
  pub steps_executed: Vec<String>,
  pub stop_at: Option<String>,
  pub rush_order: bool,
}

#[derive(Debug, thiserror::Error, Clone, PartialEq, Eq)]
pub enum TestError {
  /// Engine errors are kept as their `Debug` text so they can be compared.
  #[error("Flow error: {0}")]
  Flow(String),

  #[error("Test handler failed: {0}")]
  Handler(String),
}

impl From<FlowError> for TestError {
  fn from(e: FlowError) -> Self {
    TestError::Flow(format!("{:?}", e))
  }
}

/// Appends `note` to the ticket and records the step; stops if the ticket says so.
pub fn recording_handler(step_name: &'static str, note: &'static str) -> Handler<TicketContext, TestError> {
  Box::new(move |ctx: ContextData<TicketContext>| {
    Box::pin(async move {
      let mut guard = ctx.write();
      guard.counter += 1;
      guard.notes.push_str(note);
      guard.steps_executed.push(step_name.to_string());
      tracing::debug!(target: "test_handlers", step = step_name, counter = guard.counter, "handler ran");
      if guard.stop_at.as_deref() == Some(step_name) {
        return Ok(PipelineControl::Stop);
      }
      Ok(PipelineControl::Continue)
    })
  })
}

pub fn failing_handler(step_name: &'static str, message: &'static str) -> Handler<TicketContext, TestError> {
  Box::new(move |ctx: ContextData<TicketContext>| {
    Box::pin(async move {
      ctx.write().steps_executed.push(step_name.to_string());
      Err(TestError::Handler(message.to_string()))
    })
  })
}

static TRACING_INIT: Lazy<()> = Lazy::new(|| {
  tracing_subscriber::fmt()
    .with_max_level(Level::DEBUG)
    .with_test_writer()
    .try_init()
    .ok();
});

pub fn setup_tracing() {
  Lazy::force(&TRACING_INIT);
}
