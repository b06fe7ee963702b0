//! Release Assembler: flattens staging slots into one release directory

use crate::artifact::compute_sha256;
use crate::staging::StagingArea;
use serde::Serialize;
use std::collections::{BTreeMap, BTreeSet};
use std::path::PathBuf;
use tagship_core::{PipelineError, PipelineResult, TargetSet};

/// One file of an assembled release
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReleaseFile {
    pub name: String,
    pub path: PathBuf,
    pub size: u64,
    pub sha256: String,
}

/// The flat set of files a release is published from
#[derive(Debug, Clone, Serialize)]
pub struct ReleaseFiles {
    pub dir: PathBuf,
    pub files: Vec<ReleaseFile>,
}

impl ReleaseFiles {
    pub fn len(&self) -> usize {
        self.files.len()
    }

    pub fn is_empty(&self) -> bool {
        self.files.is_empty()
    }

    pub fn names(&self) -> Vec<&str> {
        self.files.iter().map(|f| f.name.as_str()).collect()
    }
}

pub struct ReleaseAssembler {
    dist_dir: PathBuf,
}

impl ReleaseAssembler {
    pub fn new(dist_dir: impl Into<PathBuf>) -> Self {
        Self {
            dist_dir: dist_dir.into(),
        }
    }

    /// Copy every staged artifact into the dist directory.
    ///
    /// Only regular, non-empty files whose name belongs to the target set and
    /// whose content matches the staging index are collected. If fewer files
    /// than targets were collected, the files copied by this call are
    /// removed again and `IncompleteAssembly` names the missing artifacts.
    pub async fn assemble(
        &self,
        staging: &StagingArea,
        targets: &TargetSet,
    ) -> PipelineResult<ReleaseFiles> {
        let expected: BTreeSet<String> = targets.file_names().into_iter().collect();
        let index: BTreeMap<String, String> = staging
            .entries()
            .into_values()
            .map(|entry| (entry.name, entry.sha256))
            .collect();

        tokio::fs::create_dir_all(&self.dist_dir).await?;

        let mut collected: BTreeMap<String, ReleaseFile> = BTreeMap::new();
        let mut slots = tokio::fs::read_dir(staging.root()).await?;
        while let Some(slot) = slots.next_entry().await? {
            if !slot.file_type().await?.is_dir() {
                tracing::debug!(path = %slot.path().display(), "ignoring non-slot entry");
                continue;
            }
            let mut files = tokio::fs::read_dir(slot.path()).await?;
            while let Some(file) = files.next_entry().await? {
                if let Some(release_file) = self.collect(&file, &expected, &index).await? {
                    collected.insert(release_file.name.clone(), release_file);
                }
            }
        }

        let missing: Vec<String> = expected
            .iter()
            .filter(|name| !collected.contains_key(*name))
            .cloned()
            .collect();

        if !missing.is_empty() {
            for file in collected.values() {
                if let Err(e) = tokio::fs::remove_file(&file.path).await {
                    tracing::warn!(path = %file.path.display(), error = %e, "failed to remove partial release file");
                }
            }
            tracing::error!(missing = ?missing, "release is incomplete");
            return Err(PipelineError::IncompleteAssembly {
                expected: expected.len(),
                found: collected.len(),
                missing,
            });
        }

        tracing::info!(dir = %self.dist_dir.display(), files = collected.len(), "release assembled");
        Ok(ReleaseFiles {
            dir: self.dist_dir.clone(),
            files: collected.into_values().collect(),
        })
    }

    async fn collect(
        &self,
        file: &tokio::fs::DirEntry,
        expected: &BTreeSet<String>,
        index: &BTreeMap<String, String>,
    ) -> PipelineResult<Option<ReleaseFile>> {
        let name = file.file_name().to_string_lossy().into_owned();
        let path = file.path();

        // file_type() does not follow symlinks
        if !file.file_type().await?.is_file() {
            tracing::debug!(path = %path.display(), "skipping non-regular entry");
            return Ok(None);
        }
        if !expected.contains(&name) {
            tracing::warn!(file = %name, "skipping file that belongs to no target");
            return Ok(None);
        }

        let bytes = tokio::fs::read(&path).await?;
        if bytes.is_empty() {
            tracing::warn!(file = %name, "skipping empty placeholder");
            return Ok(None);
        }
        let sha256 = compute_sha256(&bytes);
        if index.get(&name) != Some(&sha256) {
            tracing::warn!(file = %name, "staged file does not match its recorded checksum");
            return Ok(None);
        }

        let dest = self.dist_dir.join(&name);
        tokio::fs::write(&dest, &bytes).await?;

        Ok(Some(ReleaseFile {
            name,
            path: dest,
            size: bytes.len() as u64,
            sha256,
        }))
    }
}
