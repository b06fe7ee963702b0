use crate::executor::tail;
use crate::publisher::{NotesMode, ReleaseHost, ReleaseId, ReleaseRequest};
use async_trait::async_trait;
use std::path::PathBuf;
use std::process::{Output, Stdio};
use tagship_core::{PipelineError, PipelineResult};
use tokio::process::Command;

/// Publishes GitHub releases through the `gh` command line tool.
///
/// `gh` must be authenticated already; authentication is not handled here.
#[derive(Debug, Clone)]
pub struct GithubCliHost {
    program: String,
    repo: Option<String>,
    workdir: PathBuf,
}

impl GithubCliHost {
    pub fn new() -> Self {
        Self {
            program: "gh".to_string(),
            repo: None,
            workdir: PathBuf::from("."),
        }
    }

    /// `owner/name`; defaults to the repository of the working directory
    pub fn with_repo(mut self, repo: Option<String>) -> Self {
        self.repo = repo;
        self
    }

    pub fn with_program(mut self, program: impl Into<String>) -> Self {
        self.program = program.into();
        self
    }

    pub fn with_workdir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.workdir = dir.into();
        self
    }

    fn command(&self) -> Command {
        let mut cmd = Command::new(&self.program);
        cmd.current_dir(&self.workdir)
            .stdin(Stdio::null())
            .stdout(Stdio::piped())
            .stderr(Stdio::piped())
            .kill_on_drop(true);
        cmd
    }

    fn with_repo_arg<'a>(&self, cmd: &'a mut Command) -> &'a mut Command {
        if let Some(repo) = &self.repo {
            cmd.arg("--repo").arg(repo);
        }
        cmd
    }

    async fn run(&self, cmd: &mut Command) -> PipelineResult<Output> {
        cmd.output().await.map_err(|e| {
            PipelineError::PublishTransportError(format!("failed to run {}: {}", self.program, e))
        })
    }

    /// Whether the tag already has a release
    async fn release_exists(&self, tag: &str) -> PipelineResult<bool> {
        let mut cmd = self.command();
        cmd.args(["release", "view", tag, "--json", "tagName"]);
        let output = self.run(self.with_repo_arg(&mut cmd)).await?;

        if output.status.success() {
            return Ok(true);
        }
        let stderr = String::from_utf8_lossy(&output.stderr);
        if stderr.contains("release not found") {
            return Ok(false);
        }
        Err(PipelineError::PublishTransportError(format!(
            "{} release view exited with {}: {}",
            self.program,
            output.status,
            tail(&stderr, 5)
        )))
    }
}

impl Default for GithubCliHost {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl ReleaseHost for GithubCliHost {
    fn name(&self) -> &str {
        "github"
    }

    fn generates_notes(&self) -> bool {
        true
    }

    async fn create_release(&self, request: &ReleaseRequest) -> PipelineResult<ReleaseId> {
        let tag = request.tag.as_str();
        if self.release_exists(tag).await? {
            return Err(PipelineError::PublishConflict {
                tag: tag.to_string(),
            });
        }

        let mut cmd = self.command();
        cmd.args(["release", "create", tag]);
        for file in &request.files {
            cmd.arg(&file.path);
        }
        cmd.arg("--verify-tag").arg("--title").arg(tag);
        match &request.notes {
            NotesMode::AutoGenerate => {
                cmd.arg("--generate-notes");
            }
            NotesMode::Provided(text) => {
                cmd.arg("--notes").arg(text);
            }
        }
        if request.draft {
            cmd.arg("--draft");
        }
        if request.prerelease {
            cmd.arg("--prerelease");
        }
        let output = self.run(self.with_repo_arg(&mut cmd)).await?;

        if !output.status.success() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            if stderr.contains("already exists") {
                return Err(PipelineError::PublishConflict {
                    tag: tag.to_string(),
                });
            }
            return Err(PipelineError::PublishTransportError(format!(
                "{} release create exited with {}: {}",
                self.program,
                output.status,
                tail(&stderr, 5)
            )));
        }

        let url = String::from_utf8_lossy(&output.stdout).trim().to_string();
        Ok(ReleaseId(if url.is_empty() { tag.to_string() } else { url }))
    }
}
