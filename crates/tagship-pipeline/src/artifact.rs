//! Build outputs and their normalized form

use serde::Serialize;
use sha2::{Digest, Sha256};
use tagship_core::TargetDescriptor;

/// The toolchain's direct output for one target.
///
/// Owned by the unit that built it; moved into the normalizer.
#[derive(Debug)]
pub struct RawBinary {
    pub target: TargetDescriptor,
    pub bytes: Vec<u8>,
}

impl RawBinary {
    pub fn new(target: TargetDescriptor, bytes: Vec<u8>) -> Self {
        Self { target, bytes }
    }
}

/// A binary renamed to its canonical release name
#[derive(Debug, Clone, Serialize)]
pub struct NormalizedArtifact {
    /// Canonical file name, with executable suffix
    pub name: String,
    /// Staging key (canonical name without suffix)
    pub key: String,
    #[serde(skip)]
    pub bytes: Vec<u8>,
    pub symbols_stripped: bool,
    pub sha256: String,
}

impl NormalizedArtifact {
    pub fn size(&self) -> u64 {
        self.bytes.len() as u64
    }
}

/// Compute SHA256 hash of data and return as hex string.
pub fn compute_sha256(data: &[u8]) -> String {
    let mut hasher = Sha256::new();
    hasher.update(data);
    hex::encode(hasher.finalize())
}
