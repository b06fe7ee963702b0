#![allow(non_snake_case)]

use super::*;
use crate::assembler::ReleaseFile;
use tagship_core::VersionTag;
use tempfile::TempDir;

fn release_file(dir: &Path, name: &str, bytes: &[u8]) -> ReleaseFile {
    let path = dir.join(name);
    std::fs::write(&path, bytes).unwrap();
    ReleaseFile {
        name: name.to_string(),
        path,
        size: bytes.len() as u64,
        sha256: crate::artifact::compute_sha256(bytes),
    }
}

fn request(tag: &str, files: Vec<ReleaseFile>) -> ReleaseRequest {
    ReleaseRequest::standard(VersionTag::parse(tag).unwrap(), files)
}

#[tokio::test]
async fn DirectoryHost___create_release___writes_files_notes_and_manifest() {
    let dist = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let host = DirectoryHost::new(root.path().join("releases"));
    let files = vec![
        release_file(dist.path(), "proj-linux-x86_64", b"ELF"),
        release_file(dist.path(), "proj-windows-x86_64.exe", b"MZ"),
    ];

    let id = host.create_release(&request("v1.2.0", files)).await.unwrap();

    let dir = host.release_dir("v1.2.0");
    assert_eq!(id.0, dir.display().to_string());
    assert_eq!(std::fs::read(dir.join("proj-windows-x86_64.exe")).unwrap(), b"MZ");
    let notes = std::fs::read_to_string(dir.join("notes.md")).unwrap();
    assert!(notes.contains("## v1.2.0"));

    let manifest: serde_json::Value =
        serde_json::from_str(&std::fs::read_to_string(dir.join("release.json")).unwrap()).unwrap();
    assert_eq!(manifest["tag"], "v1.2.0");
    assert_eq!(manifest["draft"], false);
    assert_eq!(manifest["prerelease"], false);
    assert_eq!(manifest["files"].as_array().unwrap().len(), 2);
}

#[tokio::test]
async fn DirectoryHost___create_release___uses_provided_notes() {
    let root = TempDir::new().unwrap();
    let host = DirectoryHost::new(root.path());
    let mut req = request("v2.0.0", vec![]);
    req.notes = NotesMode::Provided("hand written".to_string());

    host.create_release(&req).await.unwrap();

    let notes = std::fs::read_to_string(host.release_dir("v2.0.0").join("notes.md")).unwrap();
    assert_eq!(notes, "hand written");
}

#[tokio::test]
async fn DirectoryHost___create_release___existing_tag_is_conflict_and_untouched() {
    let dist = TempDir::new().unwrap();
    let root = TempDir::new().unwrap();
    let host = DirectoryHost::new(root.path());
    host.create_release(&request("v1.0.0", vec![release_file(dist.path(), "a", b"first")]))
        .await
        .unwrap();

    let err = host
        .create_release(&request("v1.0.0", vec![release_file(dist.path(), "a", b"second")]))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::PublishConflict { .. }));
    assert_eq!(std::fs::read(host.release_dir("v1.0.0").join("a")).unwrap(), b"first");
}

#[tokio::test]
async fn DirectoryHost___create_release___failed_upload_leaves_no_release() {
    let root = TempDir::new().unwrap();
    let host = DirectoryHost::new(root.path());
    let missing = ReleaseFile {
        name: "gone".to_string(),
        path: root.path().join("does-not-exist"),
        size: 1,
        sha256: String::new(),
    };

    let err = host.create_release(&request("v1.0.0", vec![missing])).await.unwrap_err();

    assert!(matches!(err, PipelineError::PublishTransportError(_)));
    assert!(!host.release_dir("v1.0.0").exists());
}
