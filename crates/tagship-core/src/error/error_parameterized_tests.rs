#![allow(non_snake_case)]

use super::*;
use test_case::test_case;

// ============================================================================
// Every fatal error ends the run with a distinct non-zero exit code
// ============================================================================

fn all_variants() -> Vec<PipelineError> {
    vec![
        PipelineError::build_failure("t", "r"),
        PipelineError::StagingCollision { name: "a".into() },
        PipelineError::IncompleteAssembly {
            expected: 2,
            found: 1,
            missing: vec!["b".into()],
        },
        PipelineError::PublishConflict { tag: "v1".into() },
        PipelineError::PublishTransportError("down".into()),
        PipelineError::Cancelled,
        PipelineError::InvalidTag("main".into()),
        PipelineError::Config("bad".into()),
        PipelineError::Io(std::io::Error::other("io")),
    ]
}

#[test]
fn PipelineError___exit_codes___are_nonzero_and_distinct() {
    let codes: Vec<i32> = all_variants().iter().map(|e| e.exit_code()).collect();

    assert!(codes.iter().all(|c| *c != 0));
    let mut deduped = codes.clone();
    deduped.sort_unstable();
    deduped.dedup();
    assert_eq!(deduped.len(), codes.len());
}

#[test_case(PipelineError::build_failure("t", "r"), "build_failure")]
#[test_case(PipelineError::StagingCollision { name: "a".into() }, "staging_collision")]
#[test_case(PipelineError::PublishConflict { tag: "v1".into() }, "publish_conflict")]
#[test_case(PipelineError::PublishTransportError("x".into()), "publish_transport_error")]
#[test_case(PipelineError::Cancelled, "cancelled")]
#[test_case(PipelineError::InvalidTag("x".into()), "invalid_tag")]
#[test_case(PipelineError::Config("x".into()), "config")]
fn PipelineError___kind___names_variant(error: PipelineError, expected: &str) {
    assert_eq!(error.kind(), expected);
}

#[test_case(PipelineError::build_failure("aarch64-apple-darwin", "linker"), "aarch64-apple-darwin")]
#[test_case(PipelineError::StagingCollision { name: "proj-macos-x86_64".into() }, "proj-macos-x86_64")]
#[test_case(PipelineError::PublishTransportError("connection refused".into()), "connection refused")]
#[test_case(PipelineError::InvalidTag("release-1".into()), "release-1")]
#[test_case(PipelineError::Config("empty project name".into()), "empty project name")]
fn PipelineError___message_variants___preserve_details(error: PipelineError, expected_part: &str) {
    let display = error.to_string();

    assert!(
        display.contains(expected_part),
        "Error message '{}' should contain '{}'",
        display,
        expected_part
    );
}
