#![allow(non_snake_case)]

use super::*;
use std::fs;
use tempfile::TempDir;

#[test]
fn PipelineConfig___from_str___minimal_uses_defaults() {
    let config = PipelineConfig::from_str("[project]\nname = \"proj\"\n").unwrap();

    assert_eq!(config.binary(), "proj");
    assert_eq!(config.pipeline.failure_policy, FailurePolicy::FinishStarted);
    assert_eq!(config.pipeline.dist_dir, PathBuf::from("dist"));
    assert_eq!(config.publish.host, HostKind::Github);
    assert_eq!(config.log_level(), None);
    assert_eq!(config.target_set().unwrap().len(), 5);
}

#[test]
fn PipelineConfig___from_str___parses_full_file() {
    let toml = r#"
[project]
name = "proj"
binary = "proj-cli"
use_cross = true

[pipeline]
failure_policy = "fail-fast"
max_parallel = 3

[runners]
ubuntu-latest = 4

[[targets]]
platform = "linux-x86_64"

[[targets]]
platform = "darwin-aarch64"
environment = "macos-14"

[publish]
host = "directory"
root = "out/releases"

[logging]
level = "Debug"
"#;

    let config = PipelineConfig::from_str(toml).unwrap();
    let set = config.target_set().unwrap();

    assert_eq!(config.binary(), "proj-cli");
    assert!(config.project.use_cross);
    assert_eq!(config.pipeline.failure_policy, FailurePolicy::FailFast);
    assert_eq!(config.pipeline.max_parallel, 3);
    assert_eq!(config.runner_capacity("ubuntu-latest"), 4);
    assert_eq!(config.runner_capacity("macos-14"), 1);
    assert_eq!(config.publish.host, HostKind::Directory);
    assert_eq!(config.log_level(), Some(crate::LogLevel::Debug));
    assert_eq!(set.file_names(), vec!["proj-linux-x86_64", "proj-macos-aarch64"]);
    assert_eq!(set.environments(), vec!["ubuntu-latest", "macos-14"]);
}

#[test]
fn PipelineConfig___from_str___rejects_unknown_log_level() {
    let err = PipelineConfig::from_str("[project]\nname = \"proj\"\n\n[logging]\nlevel = \"loud\"\n")
        .unwrap_err();

    assert!(matches!(err, PipelineError::Config(ref m) if m.contains("loud")));
}

#[test]
fn PipelineConfig___from_str___rejects_unknown_platform() {
    let toml = "[project]\nname = \"p\"\n[[targets]]\nplatform = \"plan9-mips\"\n";

    let err = PipelineConfig::from_str(toml).unwrap_err();

    assert!(err.to_string().contains("plan9-mips"));
}

#[test]
fn PipelineConfig___from_str___rejects_duplicate_targets() {
    let toml = "[project]\nname = \"p\"\n[[targets]]\nplatform = \"macos-x86_64\"\n[[targets]]\nplatform = \"darwin-x86_64\"\n";

    let err = PipelineConfig::from_str(toml).unwrap_err();

    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn PipelineConfig___from_str___rejects_empty_name() {
    assert!(PipelineConfig::from_str("[project]\nname = \"  \"\n").is_err());
}

#[test]
fn PipelineConfig___from_str___rejects_zero_runner_capacity() {
    let toml = "[project]\nname = \"p\"\n[runners]\nwindows-latest = 0\n";

    assert!(PipelineConfig::from_str(toml).is_err());
}

#[test]
fn PipelineConfig___from_str___rejects_malformed_toml() {
    let err = PipelineConfig::from_str("[project\nname=").unwrap_err();

    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn PipelineConfig___from_file___resolves_relative_paths() {
    let temp_dir = TempDir::new().unwrap();
    let path = temp_dir.path().join("tagship.toml");
    fs::write(&path, "[project]\nname = \"proj\"\npath = \"app\"\n").unwrap();

    let config = PipelineConfig::from_file(&path).unwrap();

    assert_eq!(config.project.path, temp_dir.path().join("app"));
    assert_eq!(config.pipeline.dist_dir, temp_dir.path().join("dist"));
    assert_eq!(
        config.publish.root,
        temp_dir.path().join(".tagship/releases")
    );
}

#[test]
fn PipelineConfig___from_file___missing_file_is_config_error() {
    let err = PipelineConfig::from_file("/nonexistent/tagship.toml").unwrap_err();

    assert!(matches!(err, PipelineError::Config(_)));
}

#[test]
fn PipelineConfig___template___parses_back() {
    let config = PipelineConfig::from_str(&PipelineConfig::template("demo")).unwrap();

    assert_eq!(config.project.name, "demo");
    assert_eq!(config.target_set().unwrap().len(), 5);
}
