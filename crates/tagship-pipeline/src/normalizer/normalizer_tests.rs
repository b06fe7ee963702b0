#![allow(non_snake_case)]

use super::*;
use tagship_core::{Platform, TargetSet};
use test_case::test_case;

/// Drops the last byte, standing in for a real strip
struct Truncate;

#[async_trait]
impl SymbolStripper for Truncate {
    async fn strip(&self, _target: &TargetDescriptor, bytes: &[u8]) -> Result<Vec<u8>, String> {
        Ok(bytes[..bytes.len() - 1].to_vec())
    }
}

struct Failing;

#[async_trait]
impl SymbolStripper for Failing {
    async fn strip(&self, _target: &TargetDescriptor, _bytes: &[u8]) -> Result<Vec<u8>, String> {
        Err("strip: Unable to recognise the format of the input file".to_string())
    }
}

struct Emptying;

#[async_trait]
impl SymbolStripper for Emptying {
    async fn strip(&self, _target: &TargetDescriptor, _bytes: &[u8]) -> Result<Vec<u8>, String> {
        Ok(Vec::new())
    }
}

fn raw(platform: Platform, bytes: &[u8]) -> RawBinary {
    RawBinary::new(TargetDescriptor::new("proj", platform), bytes.to_vec())
}

#[test_case(Platform::LinuxX86_64, "proj-linux-x86_64", true)]
#[test_case(Platform::LinuxAarch64, "proj-linux-aarch64", true)]
#[test_case(Platform::MacosX86_64, "proj-macos-x86_64", true)]
#[test_case(Platform::MacosAarch64, "proj-macos-aarch64", true)]
#[test_case(Platform::WindowsX86_64, "proj-windows-x86_64.exe", false)]
#[tokio::test]
async fn Normalizer___normalize___names_and_strips_per_platform(
    platform: Platform,
    expected_name: &str,
    stripped: bool,
) {
    let normalizer = Normalizer::new(Arc::new(Truncate));

    let (artifact, warning) = normalizer.normalize(raw(platform, b"binary")).await.unwrap();

    assert_eq!(artifact.name, expected_name);
    assert_eq!(artifact.symbols_stripped, stripped);
    assert_eq!(artifact.bytes.len(), if stripped { 5 } else { 6 });
    assert_eq!(artifact.sha256, compute_sha256(&artifact.bytes));
    assert!(warning.is_none());
}

#[tokio::test]
async fn Normalizer___normalize___strip_failure_is_a_warning() {
    let normalizer = Normalizer::new(Arc::new(Failing));

    let (artifact, warning) = normalizer
        .normalize(raw(Platform::LinuxAarch64, b"binary"))
        .await
        .unwrap();

    let warning = warning.unwrap();
    assert_eq!(artifact.name, "proj-linux-aarch64");
    assert_eq!(artifact.key, "proj-linux-aarch64");
    assert!(!artifact.symbols_stripped);
    assert_eq!(artifact.bytes, b"binary");
    assert_eq!(warning.artifact, "proj-linux-aarch64");
    assert!(warning.reason.contains("Unable to recognise"));
}

#[tokio::test]
async fn Normalizer___normalize___empty_strip_output_keeps_original() {
    let normalizer = Normalizer::new(Arc::new(Emptying));

    let (artifact, warning) = normalizer
        .normalize(raw(Platform::MacosX86_64, b"binary"))
        .await
        .unwrap();

    assert_eq!(artifact.bytes, b"binary");
    assert!(warning.is_some());
}

#[tokio::test]
async fn Normalizer___normalize___windows_never_calls_stripper() {
    let normalizer = Normalizer::new(Arc::new(Failing));

    let (artifact, warning) = normalizer
        .normalize(raw(Platform::WindowsX86_64, b"MZ"))
        .await
        .unwrap();

    assert!(warning.is_none());
    assert!(!artifact.symbols_stripped);
}

#[tokio::test]
async fn Normalizer___normalize___empty_binary_is_build_failure() {
    let normalizer = Normalizer::new(Arc::new(NoStrip));

    let err = normalizer
        .normalize(raw(Platform::LinuxX86_64, b""))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::BuildFailure { .. }));
}

#[tokio::test]
async fn Normalizer___normalize___every_standard_target_matches_naming_contract() {
    let normalizer = Normalizer::new(Arc::new(NoStrip));

    for target in &TargetSet::standard("proj") {
        let (artifact, _) = normalizer
            .normalize(RawBinary::new(target.clone(), b"x".to_vec()))
            .await
            .unwrap();
        let expected = format!(
            "proj-{}-{}{}",
            target.platform.family(),
            target.platform.arch(),
            target.platform.executable_suffix()
        );

        assert_eq!(artifact.name, expected);
    }
}

#[cfg(unix)]
#[tokio::test]
async fn StripCommand___strip___missing_tool_reports_reason() {
    let stripper = StripCommand::with_program("tagship-no-such-strip");
    let target = TargetDescriptor::new("proj", Platform::LinuxX86_64);

    let reason = stripper.strip(&target, b"binary").await.unwrap_err();

    assert!(reason.contains("tagship-no-such-strip"));
}

#[cfg(unix)]
#[tokio::test]
async fn StripCommand___strip___returns_file_contents_after_tool_runs() {
    // `true` leaves the file untouched and exits 0
    let stripper = StripCommand::with_program("true");
    let target = TargetDescriptor::new("proj", Platform::LinuxX86_64);

    let bytes = stripper.strip(&target, b"binary").await.unwrap();

    assert_eq!(bytes, b"binary");
}
