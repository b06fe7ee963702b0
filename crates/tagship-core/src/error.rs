//! Error types for pipeline runs

use serde::Serialize;
use thiserror::Error;

/// Result type alias for pipeline operations
pub type PipelineResult<T> = Result<T, PipelineError>;

/// Fatal errors that end a pipeline run
#[derive(Error, Debug)]
pub enum PipelineError {
    /// The toolchain failed or produced no output for a target
    #[error("build failed for {target}: {reason}")]
    BuildFailure { target: String, reason: String },

    /// Two writes to the same staging key within one run
    #[error("staging collision: artifact {name} was already staged in this run")]
    StagingCollision { name: String },

    /// Fewer artifacts were collected than there are targets
    #[error("incomplete assembly: expected {expected} artifacts, found {found} (missing: {})", missing.join(", "))]
    IncompleteAssembly {
        expected: usize,
        found: usize,
        missing: Vec<String>,
    },

    /// A release already exists for the tag
    #[error("release already exists for tag {tag}")]
    PublishConflict { tag: String },

    /// The release-hosting service could not be reached or rejected the request
    #[error("publish transport error: {0}")]
    PublishTransportError(String),

    /// The run was cancelled before completing
    #[error("pipeline run cancelled")]
    Cancelled,

    /// A ref that is not a version tag was given as the trigger
    #[error("invalid version tag: {0}")]
    InvalidTag(String),

    /// Configuration error
    #[error("configuration error: {0}")]
    Config(String),

    /// I/O error
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),
}

impl PipelineError {
    /// Process exit code for this error
    pub fn exit_code(&self) -> i32 {
        match self {
            PipelineError::BuildFailure { .. } => 10,
            PipelineError::StagingCollision { .. } => 11,
            PipelineError::IncompleteAssembly { .. } => 12,
            PipelineError::PublishConflict { .. } => 13,
            PipelineError::PublishTransportError(_) => 14,
            PipelineError::Cancelled => 130,
            PipelineError::InvalidTag(_) => 2,
            PipelineError::Config(_) => 3,
            PipelineError::Io(_) => 1,
        }
    }

    /// Short machine-readable name of the error kind
    pub fn kind(&self) -> &'static str {
        match self {
            PipelineError::BuildFailure { .. } => "build_failure",
            PipelineError::StagingCollision { .. } => "staging_collision",
            PipelineError::IncompleteAssembly { .. } => "incomplete_assembly",
            PipelineError::PublishConflict { .. } => "publish_conflict",
            PipelineError::PublishTransportError(_) => "publish_transport_error",
            PipelineError::Cancelled => "cancelled",
            PipelineError::InvalidTag(_) => "invalid_tag",
            PipelineError::Config(_) => "config",
            PipelineError::Io(_) => "io",
        }
    }

    pub fn build_failure(target: impl Into<String>, reason: impl Into<String>) -> Self {
        PipelineError::BuildFailure {
            target: target.into(),
            reason: reason.into(),
        }
    }
}

// io::Error is not Clone; the copy keeps its kind and message
impl Clone for PipelineError {
    fn clone(&self) -> Self {
        match self {
            PipelineError::BuildFailure { target, reason } => PipelineError::BuildFailure {
                target: target.clone(),
                reason: reason.clone(),
            },
            PipelineError::StagingCollision { name } => {
                PipelineError::StagingCollision { name: name.clone() }
            }
            PipelineError::IncompleteAssembly {
                expected,
                found,
                missing,
            } => PipelineError::IncompleteAssembly {
                expected: *expected,
                found: *found,
                missing: missing.clone(),
            },
            PipelineError::PublishConflict { tag } => {
                PipelineError::PublishConflict { tag: tag.clone() }
            }
            PipelineError::PublishTransportError(msg) => {
                PipelineError::PublishTransportError(msg.clone())
            }
            PipelineError::Cancelled => PipelineError::Cancelled,
            PipelineError::InvalidTag(tag) => PipelineError::InvalidTag(tag.clone()),
            PipelineError::Config(msg) => PipelineError::Config(msg.clone()),
            PipelineError::Io(e) => PipelineError::Io(std::io::Error::new(e.kind(), e.to_string())),
        }
    }
}

impl From<toml::de::Error> for PipelineError {
    fn from(err: toml::de::Error) -> Self {
        PipelineError::Config(err.to_string())
    }
}

/// Non-fatal symbol stripping failure.
///
/// Returned alongside the artifact it concerns; never propagated as an error.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StripWarning {
    pub artifact: String,
    pub reason: String,
}

impl std::fmt::Display for StripWarning {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "could not strip {}: {}", self.artifact, self.reason)
    }
}


#[cfg(test)]
#[path = "error/error_parameterized_tests.rs"]
mod error_parameterized_tests;
