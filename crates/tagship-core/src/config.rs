//! `tagship.toml` configuration

use crate::LogLevel;
use crate::error::{PipelineError, PipelineResult};
use crate::platform::Platform;
use crate::target::{TargetDescriptor, TargetSet};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Top-level configuration file
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineConfig {
    pub project: ProjectSection,

    #[serde(default)]
    pub pipeline: PipelineSection,

    /// Runner capacity per execution environment class
    #[serde(default)]
    pub runners: BTreeMap<String, usize>,

    /// Explicit build matrix; empty means the standard set
    #[serde(default)]
    pub targets: Vec<TargetEntry>,

    #[serde(default)]
    pub publish: PublishSection,

    #[serde(default)]
    pub logging: LoggingSection,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ProjectSection {
    /// Artifact name prefix
    pub name: String,

    /// Cargo binary to build (default: project name)
    #[serde(default)]
    pub binary: Option<String>,

    /// Project directory, relative to the config file
    #[serde(default = "default_project_path")]
    pub path: PathBuf,

    /// Build with `cross` instead of `cargo`
    #[serde(default)]
    pub use_cross: bool,
}

fn default_project_path() -> PathBuf {
    PathBuf::from(".")
}

/// What happens to sibling units after one unit fails
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum FailurePolicy {
    /// Let units that already started finish; start nothing new
    #[default]
    FinishStarted,
    /// Abort every in-flight unit immediately
    FailFast,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineSection {
    #[serde(default)]
    pub failure_policy: FailurePolicy,

    /// Global cap on concurrently running units (0 = one per target)
    #[serde(default)]
    pub max_parallel: usize,

    /// Staging root; a temporary directory is used when unset
    #[serde(default)]
    pub staging_dir: Option<PathBuf>,

    /// Flat directory the release files are assembled into
    #[serde(default = "default_dist_dir")]
    pub dist_dir: PathBuf,
}

fn default_dist_dir() -> PathBuf {
    PathBuf::from("dist")
}

impl Default for PipelineSection {
    fn default() -> Self {
        Self {
            failure_policy: FailurePolicy::default(),
            max_parallel: 0,
            staging_dir: None,
            dist_dir: default_dist_dir(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TargetEntry {
    /// Platform key, e.g. "linux-aarch64"
    pub platform: String,

    /// Host class override
    #[serde(default)]
    pub environment: Option<String>,
}

/// Release-hosting backend
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum HostKind {
    /// GitHub releases through the `gh` CLI
    #[default]
    Github,
    /// Releases written to a local directory tree
    Directory,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublishSection {
    #[serde(default)]
    pub host: HostKind,

    /// Root directory for the directory host
    #[serde(default = "default_release_root")]
    pub root: PathBuf,

    /// `owner/name` passed to `gh --repo`
    #[serde(default)]
    pub repo: Option<String>,
}

fn default_release_root() -> PathBuf {
    PathBuf::from(".tagship/releases")
}

impl Default for PublishSection {
    fn default() -> Self {
        Self {
            host: HostKind::default(),
            root: default_release_root(),
            repo: None,
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct LoggingSection {
    /// Console level ("trace" .. "off"); `-v`/`-q` and `RUST_LOG` take precedence
    #[serde(default)]
    pub level: Option<String>,
}

impl PipelineConfig {
    /// Configuration for a project with every default
    pub fn new(project: impl Into<String>) -> Self {
        Self {
            project: ProjectSection {
                name: project.into(),
                binary: None,
                path: default_project_path(),
                use_cross: false,
            },
            pipeline: PipelineSection::default(),
            runners: BTreeMap::new(),
            targets: Vec::new(),
            publish: PublishSection::default(),
            logging: LoggingSection::default(),
        }
    }

    /// Load and validate a configuration file.
    ///
    /// Relative paths inside the file are resolved against its directory.
    pub fn from_file(path: impl AsRef<Path>) -> PipelineResult<Self> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|e| {
            PipelineError::Config(format!("failed to read {}: {}", path.display(), e))
        })?;

        let mut config = Self::from_str(&content)?;
        if let Some(base) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            config.resolve_paths(base);
        }
        Ok(config)
    }

    /// Parse and validate configuration text
    #[allow(clippy::should_implement_trait)]
    pub fn from_str(content: &str) -> PipelineResult<Self> {
        let config: Self = toml::from_str(content)?;
        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> PipelineResult<()> {
        let name = self.project.name.trim();
        if name.is_empty() {
            return Err(PipelineError::Config(
                "project name cannot be empty".to_string(),
            ));
        }
        if name.contains(['/', '\\']) || name.chars().any(char::is_whitespace) {
            return Err(PipelineError::Config(format!(
                "project name must be a plain file-name prefix: {name:?}"
            )));
        }

        for (env, capacity) in &self.runners {
            if *capacity == 0 {
                return Err(PipelineError::Config(format!(
                    "runner capacity for {env} must be at least 1"
                )));
            }
        }

        if let Some(level) = self
            .logging
            .level
            .as_deref()
            .filter(|level| LogLevel::parse(level).is_none())
        {
            return Err(PipelineError::Config(format!("unknown log level: {level}")));
        }

        self.target_set().map(|_| ())
    }

    /// Console log level from `[logging]`, if set
    pub fn log_level(&self) -> Option<LogLevel> {
        self.logging.level.as_deref().and_then(LogLevel::parse)
    }

    /// Cargo binary name
    pub fn binary(&self) -> &str {
        self.project.binary.as_deref().unwrap_or(&self.project.name)
    }

    /// Build the validated target set from `[[targets]]`, or the standard set
    pub fn target_set(&self) -> PipelineResult<TargetSet> {
        if self.targets.is_empty() {
            return Ok(TargetSet::standard(&self.project.name));
        }

        let descriptors = self
            .targets
            .iter()
            .map(|entry| {
                let platform = Platform::parse(&entry.platform).ok_or_else(|| {
                    PipelineError::Config(format!("unknown platform: {}", entry.platform))
                })?;
                Ok(match &entry.environment {
                    Some(env) => {
                        TargetDescriptor::with_environment(&self.project.name, platform, env)
                    }
                    None => TargetDescriptor::new(&self.project.name, platform),
                })
            })
            .collect::<PipelineResult<Vec<_>>>()?;

        TargetSet::new(descriptors)
    }

    /// Runner capacity for an environment class (default 1)
    pub fn runner_capacity(&self, environment: &str) -> usize {
        self.runners.get(environment).copied().unwrap_or(1)
    }

    fn resolve_paths(&mut self, base: &Path) {
        let join = |p: &Path| {
            if p.is_absolute() {
                p.to_path_buf()
            } else {
                base.join(p)
            }
        };
        self.project.path = join(&self.project.path);
        self.pipeline.dist_dir = join(&self.pipeline.dist_dir);
        self.pipeline.staging_dir = self.pipeline.staging_dir.as_deref().map(join);
        self.publish.root = join(&self.publish.root);
    }

    /// Starter file written by `tagship init`
    pub fn template(project: &str) -> String {
        format!(
            r#"[project]
name = "{project}"
binary = "{project}"

[pipeline]
failure_policy = "finish-started"
dist_dir = "dist"

[runners]
ubuntu-latest = 2

[[targets]]
platform = "linux-x86_64"

[[targets]]
platform = "linux-aarch64"

[[targets]]
platform = "macos-x86_64"

[[targets]]
platform = "macos-aarch64"

[[targets]]
platform = "windows-x86_64"

[publish]
host = "github"
"#
        )
    }
}

#[cfg(test)]
#[path = "config/config_tests.rs"]
mod config_tests;
