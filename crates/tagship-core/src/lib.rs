//! tagship-core - Target descriptors, trigger events, and errors
//!
//! This crate provides the data model shared by every pipeline stage:
//! - [`Platform`] and [`TargetDescriptor`] for the build matrix
//! - [`TargetSet`] for the validated, immutable target enumeration
//! - [`TriggerEvent`] and [`VersionTag`] for deciding whether a run publishes
//! - [`PipelineConfig`] for `tagship.toml`
//! - [`PipelineError`] for error handling

mod config;
mod error;
mod platform;
mod target;
mod trigger;

pub use config::{
    FailurePolicy, HostKind, LoggingSection, PipelineConfig, PipelineSection, ProjectSection,
    PublishSection, TargetEntry,
};
pub use error::{PipelineError, PipelineResult, StripWarning};
pub use platform::{Platform, PlatformFamily};
pub use target::{TargetDescriptor, TargetSet};
pub use trigger::{TriggerEvent, VersionTag};

/// Default configuration file name.
pub const CONFIG_FILE: &str = "tagship.toml";

/// Log levels understood by the CLI and the logging layer
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum LogLevel {
    Trace,
    Debug,
    Info,
    Warn,
    Error,
    Off,
}

impl LogLevel {
    /// Parse a level name case-insensitively ("info", "WARN", ...)
    pub fn parse(s: &str) -> Option<Self> {
        match s.to_ascii_lowercase().as_str() {
            "trace" => Some(LogLevel::Trace),
            "debug" => Some(LogLevel::Debug),
            "info" => Some(LogLevel::Info),
            "warn" | "warning" => Some(LogLevel::Warn),
            "error" => Some(LogLevel::Error),
            "off" => Some(LogLevel::Off),
            _ => None,
        }
    }
}

impl std::fmt::Display for LogLevel {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            LogLevel::Trace => write!(f, "TRACE"),
            LogLevel::Debug => write!(f, "DEBUG"),
            LogLevel::Info => write!(f, "INFO"),
            LogLevel::Warn => write!(f, "WARN"),
            LogLevel::Error => write!(f, "ERROR"),
            LogLevel::Off => write!(f, "OFF"),
        }
    }
}

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::{
        FailurePolicy, LogLevel, PipelineConfig, PipelineError, PipelineResult, Platform,
        StripWarning, TargetDescriptor, TargetSet, TriggerEvent, VersionTag,
    };
}

#[cfg(test)]
mod lib_tests;
