//! Artifact Stager: write-once staging slots keyed by canonical name
//!
//! Each slot is a directory `<root>/<key>/` holding exactly one artifact
//! file. Slots are reserved in an in-memory index before any byte is
//! written, so a second write to the same key fails without touching disk.

use crate::artifact::NormalizedArtifact;
use parking_lot::Mutex;
use serde::Serialize;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use tagship_core::{PipelineError, PipelineResult};
use tempfile::TempDir;

/// Index entry for one staged artifact
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct StagedEntry {
    pub name: String,
    pub path: PathBuf,
    pub sha256: String,
    pub size: u64,
}

enum Slot {
    Reserved,
    Written(StagedEntry),
}

/// Shared staging area for one pipeline run
pub struct StagingArea {
    root: PathBuf,
    // Held so the directory lives exactly as long as the area
    temp: Option<TempDir>,
    remove_on_drop: bool,
    slots: Mutex<BTreeMap<String, Slot>>,
}

impl StagingArea {
    /// Stage into a fresh temporary directory, removed on drop
    pub fn temporary() -> PipelineResult<Self> {
        let temp = tempfile::Builder::new().prefix("tagship-staging").tempdir()?;
        Ok(Self {
            root: temp.path().to_path_buf(),
            temp: Some(temp),
            remove_on_drop: false,
            slots: Mutex::new(BTreeMap::new()),
        })
    }

    /// Stage under `root`.
    ///
    /// The directory must not exist yet; it is created here and removed on
    /// drop, so leftovers of an earlier run can never be mistaken for slots.
    pub fn at(root: impl Into<PathBuf>) -> PipelineResult<Self> {
        let root = root.into();
        if root.exists() {
            return Err(PipelineError::Config(format!(
                "staging directory {} already exists",
                root.display()
            )));
        }
        std::fs::create_dir_all(&root)?;
        Ok(Self {
            root,
            temp: None,
            remove_on_drop: true,
            slots: Mutex::new(BTreeMap::new()),
        })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write an artifact into its slot. Fails if the key was staged before.
    pub async fn stage(&self, artifact: &NormalizedArtifact) -> PipelineResult<StagedEntry> {
        {
            let mut slots = self.slots.lock();
            if slots.contains_key(&artifact.key) {
                return Err(PipelineError::StagingCollision {
                    name: artifact.key.clone(),
                });
            }
            slots.insert(artifact.key.clone(), Slot::Reserved);
        }

        match self.write_slot(artifact).await {
            Ok(entry) => {
                self.slots
                    .lock()
                    .insert(artifact.key.clone(), Slot::Written(entry.clone()));
                tracing::debug!(artifact = %entry.name, path = %entry.path.display(), "staged");
                Ok(entry)
            }
            Err(e) => {
                self.slots.lock().remove(&artifact.key);
                Err(e)
            }
        }
    }

    async fn write_slot(&self, artifact: &NormalizedArtifact) -> PipelineResult<StagedEntry> {
        let slot_dir = self.root.join(&artifact.key);
        tokio::fs::create_dir_all(&slot_dir).await?;
        let path = slot_dir.join(&artifact.name);
        tokio::fs::write(&path, &artifact.bytes).await?;

        Ok(StagedEntry {
            name: artifact.name.clone(),
            path,
            sha256: artifact.sha256.clone(),
            size: artifact.size(),
        })
    }

    /// Completed slots, keyed by canonical name
    pub fn entries(&self) -> BTreeMap<String, StagedEntry> {
        self.slots
            .lock()
            .iter()
            .filter_map(|(key, slot)| match slot {
                Slot::Written(entry) => Some((key.clone(), entry.clone())),
                Slot::Reserved => None,
            })
            .collect()
    }

    pub fn len(&self) -> usize {
        self.entries().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Drop for StagingArea {
    fn drop(&mut self) {
        let removed = match self.temp.take() {
            Some(temp) => temp.close(),
            None if self.remove_on_drop => std::fs::remove_dir_all(&self.root),
            None => Ok(()),
        };
        if let Err(e) = removed {
            tracing::warn!(path = %self.root.display(), error = %e, "failed to remove staging directory");
        }
    }
}

#[cfg(test)]
#[path = "staging/staging_tests.rs"]
mod staging_tests;
