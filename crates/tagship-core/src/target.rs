//! Build targets and the validated target set

use crate::error::{PipelineError, PipelineResult};
use crate::platform::Platform;
use serde::Serialize;
use std::collections::HashSet;

/// One entry of the build matrix
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct TargetDescriptor {
    /// Rust target triple handed to the toolchain
    pub triple: String,
    /// Host class required to run the build (e.g. "ubuntu-latest")
    pub environment: String,
    /// `<project>-<platform>-<arch>`, without executable suffix
    pub artifact_name: String,
    pub platform: Platform,
}

impl TargetDescriptor {
    /// Create a descriptor using the platform's default host class
    pub fn new(project: &str, platform: Platform) -> Self {
        Self::with_environment(project, platform, platform.default_environment())
    }

    pub fn with_environment(
        project: &str,
        platform: Platform,
        environment: impl Into<String>,
    ) -> Self {
        Self {
            triple: platform.rust_target().to_string(),
            environment: environment.into(),
            artifact_name: canonical_name(project, platform),
            platform,
        }
    }

    /// Final artifact file name, including the executable suffix
    pub fn file_name(&self) -> String {
        format!("{}{}", self.artifact_name, self.platform.executable_suffix())
    }
}

/// `<project>-<family>-<arch>`
pub fn canonical_name(project: &str, platform: Platform) -> String {
    format!("{}-{}-{}", project, platform.family(), platform.arch())
}

/// Immutable target enumeration with unique artifact names
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(transparent)]
pub struct TargetSet {
    targets: Vec<TargetDescriptor>,
}

impl TargetSet {
    /// Validate and freeze a list of descriptors
    pub fn new(targets: Vec<TargetDescriptor>) -> PipelineResult<Self> {
        if targets.is_empty() {
            return Err(PipelineError::Config("target set is empty".to_string()));
        }

        let mut seen = HashSet::new();
        for target in &targets {
            if !seen.insert(target.artifact_name.as_str()) {
                return Err(PipelineError::Config(format!(
                    "duplicate artifact name in target set: {}",
                    target.artifact_name
                )));
            }
        }

        Ok(Self { targets })
    }

    /// The default five-target release matrix
    pub fn standard(project: &str) -> Self {
        let targets = [
            Platform::LinuxX86_64,
            Platform::LinuxAarch64,
            Platform::MacosX86_64,
            Platform::MacosAarch64,
            Platform::WindowsX86_64,
        ]
        .into_iter()
        .map(|p| TargetDescriptor::new(project, p))
        .collect();

        Self { targets }
    }

    pub fn len(&self) -> usize {
        self.targets.len()
    }

    pub fn is_empty(&self) -> bool {
        self.targets.is_empty()
    }

    pub fn iter(&self) -> std::slice::Iter<'_, TargetDescriptor> {
        self.targets.iter()
    }

    /// Execution environment classes used by this set, deduplicated in order
    pub fn environments(&self) -> Vec<&str> {
        let mut seen = HashSet::new();
        self.targets
            .iter()
            .map(|t| t.environment.as_str())
            .filter(|env| seen.insert(*env))
            .collect()
    }

    /// Final file names of every artifact the set produces
    pub fn file_names(&self) -> Vec<String> {
        self.targets.iter().map(TargetDescriptor::file_name).collect()
    }
}

impl<'a> IntoIterator for &'a TargetSet {
    type Item = &'a TargetDescriptor;
    type IntoIter = std::slice::Iter<'a, TargetDescriptor>;

    fn into_iter(self) -> Self::IntoIter {
        self.targets.iter()
    }
}
