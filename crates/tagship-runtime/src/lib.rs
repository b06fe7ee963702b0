//! tagship-runtime - Tokio runtime integration
//!
//! This crate provides:
//! - [`PipelineRuntime`] for owning the Tokio runtime a pipeline run executes on
//! - [`CancelHandle`] / [`CancelSignal`] for cancelling a run and every unit in it

mod cancel;
mod runtime;

pub use cancel::{CancelHandle, CancelSignal};
pub use runtime::{PipelineRuntime, RuntimeConfig};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{CancelHandle, CancelSignal, PipelineRuntime, RuntimeConfig};
}
