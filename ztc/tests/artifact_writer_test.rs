// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scenario 9 (§8): the artifact writer materializes a manifest set onto
//! disk and refuses a second write to a path it has already written in the
//! same render, the signal that two adapters collided on one output path.

use std::path::PathBuf;

use ztc::render::artifact_writer::ArtifactWriter;

#[tokio::test]
async fn writes_every_manifest_under_the_workspace_root() {
    let workspace = tempfile::tempdir().unwrap();
    let manifests = vec![
        (PathBuf::from("generated.new/foundation/hetzner/main.tf"), b"resource \"x\" {}".to_vec()),
        (PathBuf::from("generated.new/networking/cilium/values.yaml"), b"cluster: {}".to_vec()),
    ];

    let mut writer = ArtifactWriter::new();
    writer.write_all(workspace.path(), &manifests).await.unwrap();

    for (path, contents) in &manifests {
        let written = tokio::fs::read(workspace.path().join(path)).await.unwrap();
        assert_eq!(&written, contents);
    }
}

#[tokio::test]
async fn rejects_a_duplicate_path_within_one_call() {
    let workspace = tempfile::tempdir().unwrap();
    let manifests = vec![
        (PathBuf::from("generated.new/foundation/hetzner/main.tf"), b"first".to_vec()),
        (PathBuf::from("generated.new/foundation/hetzner/main.tf"), b"second".to_vec()),
    ];

    let mut writer = ArtifactWriter::new();
    let err = writer.write_all(workspace.path(), &manifests).await.unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[tokio::test]
async fn rejects_a_duplicate_path_across_calls_on_the_same_writer() {
    let workspace = tempfile::tempdir().unwrap();
    let mut writer = ArtifactWriter::new();

    writer
        .write_all(workspace.path(), &[(PathBuf::from("generated.new/a.yaml"), b"one".to_vec())])
        .await
        .unwrap();

    let err = writer
        .write_all(workspace.path(), &[(PathBuf::from("generated.new/a.yaml"), b"two".to_vec())])
        .await
        .unwrap_err();
    assert!(err.to_string().contains("duplicate"));
}

#[tokio::test]
async fn a_fresh_writer_does_not_remember_a_prior_writers_paths() {
    let workspace = tempfile::tempdir().unwrap();
    let manifest = vec![(PathBuf::from("generated.new/a.yaml"), b"one".to_vec())];

    ArtifactWriter::new().write_all(workspace.path(), &manifest).await.unwrap();
    ArtifactWriter::new().write_all(workspace.path(), &manifest).await.unwrap();
}
