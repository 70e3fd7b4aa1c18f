// flow/src/lib.rs

//! pizzeria-flow: the step-pipeline engine behind the storefront workflows.
//!
//! A workflow (adding a pizza to a cart, placing an order, moving an order through
//! the kitchen) is a `Pipeline<TData, Err>` of named steps. Each step can carry
//! `before`, `on` and `after` handlers, may be optional, and may be skipped by a
//! predicate evaluated against the shared context. A handler ends the run early by
//! returning `PipelineControl::Stop`, or aborts it by returning an error.
//!
//! Pipelines are registered in a `FlowRegistry<E>` keyed by their context type, so a
//! caller only needs to build the context and hand it to `FlowRegistry::run`.

pub mod core;
pub mod error;
pub mod pipeline;
pub mod registry;

pub use crate::core::context_data::ContextData;
pub use crate::core::control::{PipelineControl, PipelineResult};
pub use crate::core::handler::Handler;
pub use crate::core::step::{SkipCondition, StepDef};

pub use crate::pipeline::definition::Pipeline;

pub use crate::error::{FlowError, FlowResult};

pub use crate::registry::FlowRegistry;

/*
    Typical wiring:
    1. Define a context struct holding the inputs and the outputs of one workflow.
    2. Build a `Pipeline<Ctx, AppError>` from its step list.
    3. Attach handlers with `.on_root()` (and `.before_root()` / `.after_root()` where a
       step needs guarding or follow-up work).
    4. Register the pipeline once at startup in a shared `FlowRegistry<AppError>`.
    5. Per request: wrap a fresh `Ctx` in `ContextData`, call `registry.run(ctx.clone())`,
       then read the outputs back from `ctx`.
*/
