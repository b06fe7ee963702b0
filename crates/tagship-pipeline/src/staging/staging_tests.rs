#![allow(non_snake_case)]

use super::*;
use crate::artifact::compute_sha256;
use crate::test_support::WarnCounter;
use std::sync::Arc;
use tempfile::TempDir;
use tracing_subscriber::prelude::*;

fn artifact(key: &str, name: &str, bytes: &[u8]) -> NormalizedArtifact {
    NormalizedArtifact {
        name: name.to_string(),
        key: key.to_string(),
        bytes: bytes.to_vec(),
        symbols_stripped: false,
        sha256: compute_sha256(bytes),
    }
}

#[tokio::test]
async fn StagingArea___stage___writes_file_into_keyed_slot() {
    let staging = StagingArea::temporary().unwrap();

    let entry = staging
        .stage(&artifact("proj-windows-x86_64", "proj-windows-x86_64.exe", b"MZ"))
        .await
        .unwrap();

    assert_eq!(
        entry.path,
        staging.root().join("proj-windows-x86_64").join("proj-windows-x86_64.exe")
    );
    assert_eq!(std::fs::read(&entry.path).unwrap(), b"MZ");
    assert_eq!(entry.size, 2);
    assert_eq!(staging.len(), 1);
}

#[tokio::test]
async fn StagingArea___stage___second_write_to_key_is_collision() {
    let staging = StagingArea::temporary().unwrap();
    staging
        .stage(&artifact("proj-linux-x86_64", "proj-linux-x86_64", b"one"))
        .await
        .unwrap();

    let err = staging
        .stage(&artifact("proj-linux-x86_64", "proj-linux-x86_64", b"two"))
        .await
        .unwrap_err();

    assert!(matches!(err, PipelineError::StagingCollision { ref name } if name == "proj-linux-x86_64"));
    let entries = staging.entries();
    assert_eq!(std::fs::read(&entries["proj-linux-x86_64"].path).unwrap(), b"one");
}

#[tokio::test]
async fn StagingArea___stage___concurrent_distinct_keys_never_collide() {
    let staging = Arc::new(StagingArea::temporary().unwrap());
    let mut handles = Vec::new();

    for i in 0..8 {
        let staging = staging.clone();
        handles.push(tokio::spawn(async move {
            let key = format!("proj-{i}");
            staging.stage(&artifact(&key, &key, b"bin")).await
        }));
    }
    for handle in handles {
        handle.await.unwrap().unwrap();
    }

    assert_eq!(staging.len(), 8);
}

#[tokio::test]
async fn StagingArea___stage___concurrent_same_key_admits_exactly_one() {
    let staging = Arc::new(StagingArea::temporary().unwrap());
    let mut handles = Vec::new();

    for _ in 0..4 {
        let staging = staging.clone();
        handles.push(tokio::spawn(async move {
            staging.stage(&artifact("dup", "dup", b"bin")).await
        }));
    }
    let mut ok = 0;
    for handle in handles {
        if handle.await.unwrap().is_ok() {
            ok += 1;
        }
    }

    assert_eq!(ok, 1);
}

#[test]
fn StagingArea___drop___removes_temporary_root() {
    let staging = StagingArea::temporary().unwrap();
    let root = staging.root().to_path_buf();
    assert!(root.exists());

    drop(staging);

    assert!(!root.exists());
}

#[test]
fn StagingArea___at___creates_and_removes_directory() {
    let temp_dir = TempDir::new().unwrap();
    let root = temp_dir.path().join("staging");

    let staging = StagingArea::at(&root).unwrap();
    assert!(root.is_dir());
    drop(staging);

    assert!(!root.exists());
}

#[test]
fn StagingArea___drop___warns_when_temporary_root_cannot_be_removed() {
    let warnings = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());

    tracing::subscriber::with_default(subscriber, || {
        let staging = StagingArea::temporary().unwrap();
        std::fs::remove_dir_all(staging.root()).unwrap();
        drop(staging);
    });

    assert_eq!(warnings.count(), 1);
}

#[test]
fn StagingArea___drop___warns_when_fixed_root_cannot_be_removed() {
    let temp_dir = TempDir::new().unwrap();
    let warnings = WarnCounter::default();
    let subscriber = tracing_subscriber::registry().with(warnings.clone());

    tracing::subscriber::with_default(subscriber, || {
        let staging = StagingArea::at(temp_dir.path().join("staging")).unwrap();
        std::fs::remove_dir_all(staging.root()).unwrap();
        drop(staging);
    });

    assert_eq!(warnings.count(), 1);
}

#[test]
fn StagingArea___at___rejects_existing_directory() {
    let temp_dir = TempDir::new().unwrap();

    let result = StagingArea::at(temp_dir.path());

    assert!(matches!(result, Err(PipelineError::Config(_))));
}
