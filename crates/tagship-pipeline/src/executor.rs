//! Build Executor: invokes the toolchain once per target

use crate::artifact::RawBinary;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::process::Stdio;
use tagship_core::{PipelineError, PipelineResult, TargetDescriptor};
use tokio::process::Command;

/// Produces the raw binary for one target
#[async_trait]
pub trait BuildExecutor: Send + Sync {
    async fn build(&self, target: &TargetDescriptor) -> PipelineResult<RawBinary>;
}

/// Builds with `cargo build --release --target <triple>` (or `cross`)
#[derive(Debug, Clone)]
pub struct CargoExecutor {
    project_dir: PathBuf,
    binary: String,
    program: String,
    target_dir: Option<PathBuf>,
}

impl CargoExecutor {
    pub fn new(project_dir: impl Into<PathBuf>, binary: impl Into<String>) -> Self {
        Self {
            project_dir: project_dir.into(),
            binary: binary.into(),
            program: "cargo".to_string(),
            target_dir: None,
        }
    }

    /// Build through `cross` instead of `cargo`
    pub fn with_cross(mut self, use_cross: bool) -> Self {
        self.program = if use_cross { "cross" } else { "cargo" }.to_string();
        self
    }

    /// Override the program invoked (a cargo-compatible wrapper)
    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_target_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.target_dir = Some(dir.into());
        self
    }

    /// Where cargo leaves the release binary for a target
    pub fn output_path(&self, target: &TargetDescriptor) -> PathBuf {
        let target_dir = self
            .target_dir
            .clone()
            .unwrap_or_else(|| self.project_dir.join("target"));
        target_dir.join(&target.triple).join("release").join(format!(
            "{}{}",
            self.binary,
            target.platform.executable_suffix()
        ))
    }

    fn command(&self, target: &TargetDescriptor) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.arg("build")
            .arg("--release")
            .arg("--target")
            .arg(&target.triple)
            .arg("--bin")
            .arg(&self.binary)
            .current_dir(&self.project_dir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);

        if let Some(dir) = &self.target_dir {
            cmd.arg("--target-dir").arg(dir);
        }
        cmd
    }
}

#[async_trait]
impl BuildExecutor for CargoExecutor {
    async fn build(&self, target: &TargetDescriptor) -> PipelineResult<RawBinary> {
        tracing::info!(
            triple = %target.triple,
            environment = %target.environment,
            program = %self.program,
            "building"
        );

        let output = self.command(target).output().await.map_err(|e| {
            PipelineError::build_failure(
                &target.triple,
                format!("failed to run {}: {}", self.program, e),
            )
        })?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            return Err(PipelineError::build_failure(
                &target.triple,
                format!("{} exited with {}: {}", self.program, output.status, tail(&stderr, 20)),
            ));
        }

        let path = self.output_path(target);
        let bytes = read_output(&path).await.map_err(|e| {
            PipelineError::build_failure(
                &target.triple,
                format!("cannot read build output {}: {}", path.display(), e),
            )
        })?;

        tracing::debug!(triple = %target.triple, bytes = bytes.len(), "build output read");
        Ok(RawBinary::new(target.clone(), bytes))
    }
}

async fn read_output(path: &Path) -> std::io::Result<Vec<u8>> {
    tokio::fs::read(path).await
}

/// Last `lines` lines of toolchain output
pub(crate) fn tail(text: &str, lines: usize) -> String {
    let all: Vec<&str> = text.trim_end().lines().collect();
    let start = all.len().saturating_sub(lines);
    all[start..].join("\n")
}
