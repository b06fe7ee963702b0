//! Artifact Normalizer: canonical naming and best-effort symbol stripping

use crate::artifact::{NormalizedArtifact, RawBinary, compute_sha256};
use async_trait::async_trait;
use std::io::Write;
use std::sync::Arc;
use tagship_core::{PipelineError, PipelineResult, StripWarning, TargetDescriptor};
use tokio::process::Command;

/// Removes debug symbols from a binary
#[async_trait]
pub trait SymbolStripper: Send + Sync {
    /// Return the stripped bytes, or the reason stripping failed
    async fn strip(&self, target: &TargetDescriptor, bytes: &[u8]) -> Result<Vec<u8>, String>;
}

/// Runs the system `strip` tool on a temporary copy of the binary
#[derive(Debug, Clone)]
pub struct StripCommand {
    program: String,
}

impl StripCommand {
    pub fn new() -> Self {
        Self {
            program: "strip".to_string(),
        }
    }

    pub fn with_program(program: impl Into<String>) -> Self {
        Self {
            program: program.into(),
        }
    }
}

impl Default for StripCommand {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl SymbolStripper for StripCommand {
    async fn strip(&self, target: &TargetDescriptor, bytes: &[u8]) -> Result<Vec<u8>, String> {
        let mut file = tempfile::Builder::new()
            .prefix(&target.artifact_name)
            .tempfile()
            .map_err(|e| format!("cannot create temp file: {e}"))?;
        file.write_all(bytes)
            .and_then(|_| file.flush())
            .map_err(|e| format!("cannot write temp file: {e}"))?;

        let output = Command::new(&self.program)
            .arg(file.path())
            .kill_on_drop(true)
            .output()
            .await
            .map_err(|e| format!("failed to run {}: {}", self.program, e))?;

        if !output.status.success() {
            return Err(format!(
                "{} exited with {}: {}",
                self.program,
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            ));
        }

        tokio::fs::read(file.path())
            .await
            .map_err(|e| format!("cannot read stripped binary: {e}"))
    }
}

/// A stripper that leaves every binary untouched
#[derive(Debug, Clone, Copy, Default)]
pub struct NoStrip;

#[async_trait]
impl SymbolStripper for NoStrip {
    async fn strip(&self, _target: &TargetDescriptor, bytes: &[u8]) -> Result<Vec<u8>, String> {
        Ok(bytes.to_vec())
    }
}

/// Turns a raw binary into its canonical release artifact
#[derive(Clone)]
pub struct Normalizer {
    stripper: Arc<dyn SymbolStripper>,
}

impl Normalizer {
    pub fn new(stripper: Arc<dyn SymbolStripper>) -> Self {
        Self { stripper }
    }

    /// Rename and strip one raw binary.
    ///
    /// A strip failure never fails the call: the unstripped artifact is
    /// returned with the warning beside it. Zero-byte input is a build failure.
    pub async fn normalize(
        &self,
        raw: RawBinary,
    ) -> PipelineResult<(NormalizedArtifact, Option<StripWarning>)> {
        let RawBinary { target, bytes } = raw;

        if bytes.is_empty() {
            return Err(PipelineError::build_failure(
                &target.triple,
                "toolchain produced an empty binary",
            ));
        }

        let name = target.file_name();
        let mut warning = None;
        let mut symbols_stripped = false;
        let mut bytes = bytes;

        if target.platform.strips_symbols() {
            match self.stripper.strip(&target, &bytes).await {
                Ok(stripped) if !stripped.is_empty() => {
                    bytes = stripped;
                    symbols_stripped = true;
                }
                Ok(_) => {
                    warning = Some(StripWarning {
                        artifact: name.clone(),
                        reason: "strip produced an empty file".to_string(),
                    });
                }
                Err(reason) => {
                    warning = Some(StripWarning {
                        artifact: name.clone(),
                        reason,
                    });
                }
            }
        }

        if let Some(w) = &warning {
            tracing::warn!(artifact = %w.artifact, reason = %w.reason, "symbol stripping skipped");
        }

        let artifact = NormalizedArtifact {
            sha256: compute_sha256(&bytes),
            name,
            key: target.artifact_name.clone(),
            bytes,
            symbols_stripped,
        };
        tracing::debug!(
            artifact = %artifact.name,
            size = artifact.size(),
            stripped = artifact.symbols_stripped,
            "normalized"
        );

        Ok((artifact, warning))
    }
}

#[cfg(test)]
#[path = "normalizer/normalizer_tests.rs"]
mod normalizer_tests;
