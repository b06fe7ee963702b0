//! Release Publisher: gated, single-shot release creation

use crate::assembler::{ReleaseFile, ReleaseFiles};
use crate::notes;
use async_trait::async_trait;
use serde::Serialize;
use std::fmt;
use std::path::PathBuf;
use std::sync::Arc;
use tagship_core::{PipelineResult, TriggerEvent, VersionTag};

/// How the release description is produced
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum NotesMode {
    /// Let the host derive notes from commit and tag history
    AutoGenerate,
    /// Use the given text verbatim
    Provided(String),
}

/// Everything a host needs to create one release
#[derive(Debug, Clone)]
pub struct ReleaseRequest {
    pub tag: VersionTag,
    pub files: Vec<ReleaseFile>,
    pub notes: NotesMode,
    pub draft: bool,
    pub prerelease: bool,
}

impl ReleaseRequest {
    /// A published, non-prerelease release with auto-generated notes
    pub fn standard(tag: VersionTag, files: Vec<ReleaseFile>) -> Self {
        Self {
            tag,
            files,
            notes: NotesMode::AutoGenerate,
            draft: false,
            prerelease: false,
        }
    }
}

/// Host-assigned identifier of a created release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct ReleaseId(pub String);

impl fmt::Display for ReleaseId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// A release-hosting service
///
/// `create_release` must fail with `PublishConflict` when a release for the
/// tag already exists, leaving that release untouched, and with
/// `PublishTransportError` when the service cannot be reached.
#[async_trait]
pub trait ReleaseHost: Send + Sync {
    fn name(&self) -> &str;

    /// Whether the host turns `NotesMode::AutoGenerate` into notes itself
    fn generates_notes(&self) -> bool {
        false
    }

    async fn create_release(&self, request: &ReleaseRequest) -> PipelineResult<ReleaseId>;
}

/// What the publish step did
#[derive(Debug, Clone, Serialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum PublishOutcome {
    Published {
        tag: String,
        id: ReleaseId,
        host: String,
        files: Vec<String>,
    },
    Skipped {
        reason: String,
    },
}

impl PublishOutcome {
    pub fn is_published(&self) -> bool {
        matches!(self, PublishOutcome::Published { .. })
    }

    pub(crate) fn skipped(reason: impl Into<String>) -> Self {
        PublishOutcome::Skipped {
            reason: reason.into(),
        }
    }
}

pub struct ReleasePublisher {
    host: Arc<dyn ReleaseHost>,
    repo_dir: PathBuf,
}

impl ReleasePublisher {
    pub fn new(host: Arc<dyn ReleaseHost>) -> Self {
        Self {
            host,
            repo_dir: PathBuf::from("."),
        }
    }

    /// Repository whose history feeds generated notes
    pub fn with_repo_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.repo_dir = dir.into();
        self
    }

    /// Create the release for a tag-push trigger.
    ///
    /// Manual triggers return `Skipped` without contacting the host. Errors
    /// from the host are returned as-is; nothing is retried here.
    pub async fn publish(
        &self,
        trigger: &TriggerEvent,
        release: &ReleaseFiles,
    ) -> PipelineResult<PublishOutcome> {
        let Some(tag) = trigger.tag() else {
            tracing::info!("manual run: skipping publish");
            return Ok(PublishOutcome::skipped("manual invocation never publishes"));
        };

        if tag.is_prerelease_version() {
            tracing::info!(tag = %tag, "tag looks like a prerelease; publishing as a standard release");
        }

        let mut request = ReleaseRequest::standard(tag.clone(), release.files.clone());
        if !self.host.generates_notes() {
            let names = release.names();
            request.notes =
                NotesMode::Provided(notes::generate_notes(&self.repo_dir, tag, &names).await);
        }

        tracing::info!(tag = %tag, host = self.host.name(), files = request.files.len(), "publishing release");
        let id = self.host.create_release(&request).await.inspect_err(|e| {
            tracing::error!(tag = %tag, host = self.host.name(), error = %e, "publish failed");
        })?;
        tracing::info!(tag = %tag, id = %id, "release published");

        Ok(PublishOutcome::Published {
            tag: tag.to_string(),
            id,
            host: self.host.name().to_string(),
            files: release.names().into_iter().map(String::from).collect(),
        })
    }
}
