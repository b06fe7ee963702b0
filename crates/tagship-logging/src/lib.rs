//! tagship-logging - Tracing subscriber setup
//!
//! This crate provides:
//! - [`init_logging`] to install the console subscriber
//! - [`RunEventCounter`] tracing layer that tallies warnings and errors of a run
//! - [`apply_level`] and [`ReloadHandle`] for switching the console level once
//!   the configuration file is loaded

mod layer;
mod reload;

pub use layer::{RunEventCounter, init_logging};
pub use reload::{ReloadHandle, apply_level};
pub use tagship_core::LogLevel;

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{LogLevel, ReloadHandle, RunEventCounter, apply_level, init_logging};
}
