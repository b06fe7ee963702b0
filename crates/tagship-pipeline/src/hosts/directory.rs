use crate::notes;
use crate::publisher::{NotesMode, ReleaseHost, ReleaseId, ReleaseRequest};
use async_trait::async_trait;
use serde::Serialize;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tagship_core::{PipelineError, PipelineResult};

/// Publishes each release as a directory `<root>/<tag>/`.
///
/// The directory holds the release files, `notes.md`, and a `release.json`
/// manifest. Creating the tag directory is the conflict check: it fails if
/// an earlier run already published the tag.
#[derive(Debug, Clone)]
pub struct DirectoryHost {
    root: PathBuf,
}

#[derive(Serialize)]
struct ReleaseManifest<'a> {
    tag: &'a str,
    draft: bool,
    prerelease: bool,
    files: Vec<ManifestFile<'a>>,
}

#[derive(Serialize)]
struct ManifestFile<'a> {
    name: &'a str,
    size: u64,
    sha256: &'a str,
}

impl DirectoryHost {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn release_dir(&self, tag: &str) -> PathBuf {
        self.root.join(tag)
    }

    async fn write_release(&self, dir: &Path, request: &ReleaseRequest) -> std::io::Result<()> {
        for file in &request.files {
            tokio::fs::copy(&file.path, dir.join(&file.name)).await?;
        }

        let body = match &request.notes {
            NotesMode::Provided(text) => text.clone(),
            NotesMode::AutoGenerate => {
                let names: Vec<&str> = request.files.iter().map(|f| f.name.as_str()).collect();
                notes::render_notes(&request.tag, None, &[], &names)
            }
        };
        tokio::fs::write(dir.join("notes.md"), body).await?;

        let manifest = ReleaseManifest {
            tag: request.tag.as_str(),
            draft: request.draft,
            prerelease: request.prerelease,
            files: request
                .files
                .iter()
                .map(|f| ManifestFile {
                    name: &f.name,
                    size: f.size,
                    sha256: &f.sha256,
                })
                .collect(),
        };
        let json = serde_json::to_string_pretty(&manifest)?;
        tokio::fs::write(dir.join("release.json"), json).await
    }
}

#[async_trait]
impl ReleaseHost for DirectoryHost {
    fn name(&self) -> &str {
        "directory"
    }

    async fn create_release(&self, request: &ReleaseRequest) -> PipelineResult<ReleaseId> {
        let transport = |e: std::io::Error| PipelineError::PublishTransportError(e.to_string());

        tokio::fs::create_dir_all(&self.root).await.map_err(transport)?;
        let dir = self.release_dir(request.tag.as_str());
        match tokio::fs::create_dir(&dir).await {
            Ok(()) => {}
            Err(e) if e.kind() == ErrorKind::AlreadyExists => {
                return Err(PipelineError::PublishConflict {
                    tag: request.tag.to_string(),
                });
            }
            Err(e) => return Err(transport(e)),
        }

        if let Err(e) = self.write_release(&dir, request).await {
            // Leave no partial release behind
            let _ = tokio::fs::remove_dir_all(&dir).await;
            return Err(transport(e));
        }

        Ok(ReleaseId(dir.display().to_string()))
    }
}

#[cfg(test)]
#[path = "directory/directory_tests.rs"]
mod directory_tests;
