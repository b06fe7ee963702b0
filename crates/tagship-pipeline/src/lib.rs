//! tagship-pipeline - Build matrix orchestration and release publishing
//!
//! A run goes through these stages:
//! - [`BuildMatrix`] dispatches one unit per target: [`BuildExecutor`] →
//!   [`Normalizer`] → [`StagingArea`]
//! - [`ReleaseAssembler`] flattens the staging area into one directory
//! - [`ReleasePublisher`] creates the release on a [`ReleaseHost`]
//!
//! [`Pipeline`] composes them and gates assembly and publish on the
//! trigger and on every unit succeeding.

mod artifact;
mod assembler;
mod executor;
pub mod hosts;
mod normalizer;
pub mod notes;
mod orchestrator;
mod pipeline;
mod publisher;
mod runners;
mod staging;

#[cfg(test)]
mod test_support;

pub use artifact::{NormalizedArtifact, RawBinary, compute_sha256};
pub use assembler::{ReleaseAssembler, ReleaseFile, ReleaseFiles};
pub use executor::{BuildExecutor, CargoExecutor};
pub use normalizer::{NoStrip, Normalizer, StripCommand, SymbolStripper};
pub use orchestrator::{BuildMatrix, MatrixReport, UnitOutcome, UnitReport};
pub use pipeline::{Pipeline, RunReport};
pub use publisher::{
    NotesMode, PublishOutcome, ReleaseHost, ReleaseId, ReleasePublisher, ReleaseRequest,
};
pub use runners::{RunnerPermit, RunnerPool};
pub use staging::{StagedEntry, StagingArea};

/// Prelude module for convenient imports
pub mod prelude {
    pub use crate::hosts::{DirectoryHost, GithubCliHost, InMemoryHost};
    pub use crate::{
        BuildExecutor, CargoExecutor, NotesMode, Pipeline, PublishOutcome, RawBinary,
        ReleaseHost, ReleaseId, ReleaseRequest, RunReport, UnitOutcome,
    };
}
