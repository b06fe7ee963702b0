use crate::publisher::{NotesMode, ReleaseHost, ReleaseId, ReleaseRequest};
use async_trait::async_trait;
use parking_lot::Mutex;
use std::collections::BTreeMap;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use tagship_core::{PipelineError, PipelineResult};

/// A release as recorded by [`InMemoryHost`]
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoredRelease {
    pub id: ReleaseId,
    pub files: BTreeMap<String, Vec<u8>>,
    pub notes: NotesMode,
    pub draft: bool,
    pub prerelease: bool,
}

/// Host that keeps releases in memory, for tests and embedding
#[derive(Debug, Default)]
pub struct InMemoryHost {
    releases: Mutex<BTreeMap<String, StoredRelease>>,
    unreachable: AtomicBool,
    calls: AtomicUsize,
}

impl InMemoryHost {
    pub fn new() -> Self {
        Self::default()
    }

    /// Make every following call fail with a transport error
    pub fn set_unreachable(&self, unreachable: bool) {
        self.unreachable.store(unreachable, Ordering::SeqCst);
    }

    pub fn release(&self, tag: &str) -> Option<StoredRelease> {
        self.releases.lock().get(tag).cloned()
    }

    pub fn release_count(&self) -> usize {
        self.releases.lock().len()
    }

    /// Number of `create_release` calls, successful or not
    pub fn calls(&self) -> usize {
        self.calls.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ReleaseHost for InMemoryHost {
    fn name(&self) -> &str {
        "memory"
    }

    fn generates_notes(&self) -> bool {
        true
    }

    async fn create_release(&self, request: &ReleaseRequest) -> PipelineResult<ReleaseId> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        if self.unreachable.load(Ordering::SeqCst) {
            return Err(PipelineError::PublishTransportError(
                "in-memory host is unreachable".to_string(),
            ));
        }

        let mut files = BTreeMap::new();
        for file in &request.files {
            let bytes = tokio::fs::read(&file.path).await.map_err(|e| {
                PipelineError::PublishTransportError(format!("cannot upload {}: {e}", file.name))
            })?;
            files.insert(file.name.clone(), bytes);
        }

        let mut releases = self.releases.lock();
        let tag = request.tag.to_string();
        if releases.contains_key(&tag) {
            return Err(PipelineError::PublishConflict { tag });
        }
        let id = ReleaseId(format!("memory:{}", releases.len() + 1));
        releases.insert(
            tag,
            StoredRelease {
                id: id.clone(),
                files,
                notes: request.notes.clone(),
                draft: request.draft,
                prerelease: request.prerelease,
            },
        );
        Ok(id)
    }
}
