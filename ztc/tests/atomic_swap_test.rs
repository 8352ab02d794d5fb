// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scenario 6 (§8): the atomic swap promotes a staged `generated.new` tree,
//! cleans up a stale `generated.old` left over from an interrupted prior
//! swap, and `discard_failed_render` leaves an existing live tree alone.

use ztc::render::atomic_swap;

#[tokio::test]
async fn swap_promotes_staging_tree_when_no_live_tree_exists() {
    let root = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(root.path().join("generated.new")).await.unwrap();
    tokio::fs::write(root.path().join("generated.new/pipeline.yaml"), b"stages: []").await.unwrap();

    atomic_swap::swap(root.path()).await.unwrap();

    assert!(root.path().join("generated/pipeline.yaml").exists());
    assert!(!root.path().join("generated.new").exists());
}

#[tokio::test]
async fn swap_replaces_an_existing_live_tree() {
    let root = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(root.path().join("generated")).await.unwrap();
    tokio::fs::write(root.path().join("generated/pipeline.yaml"), b"old").await.unwrap();
    tokio::fs::create_dir_all(root.path().join("generated.new")).await.unwrap();
    tokio::fs::write(root.path().join("generated.new/pipeline.yaml"), b"new").await.unwrap();

    atomic_swap::swap(root.path()).await.unwrap();

    let contents = tokio::fs::read_to_string(root.path().join("generated/pipeline.yaml")).await.unwrap();
    assert_eq!(contents, "new");
    assert!(!root.path().join("generated.new").exists());
    assert!(!root.path().join("generated.old").exists());
}

#[tokio::test]
async fn swap_cleans_up_a_stale_old_tree_from_an_interrupted_prior_swap() {
    let root = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(root.path().join("generated")).await.unwrap();
    tokio::fs::create_dir_all(root.path().join("generated.old")).await.unwrap();
    tokio::fs::write(root.path().join("generated.old/stale.yaml"), b"leftover").await.unwrap();
    tokio::fs::create_dir_all(root.path().join("generated.new")).await.unwrap();

    atomic_swap::swap(root.path()).await.unwrap();

    assert!(!root.path().join("generated.old").exists());
}

#[tokio::test]
async fn swap_without_a_staged_tree_is_an_error() {
    let root = tempfile::tempdir().unwrap();
    let err = atomic_swap::swap(root.path()).await.unwrap_err();
    assert!(err.to_string().contains("does not exist"));
}

#[tokio::test]
async fn discard_failed_render_removes_only_the_staging_tree() {
    let root = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(root.path().join("generated")).await.unwrap();
    tokio::fs::write(root.path().join("generated/pipeline.yaml"), b"live").await.unwrap();
    tokio::fs::create_dir_all(root.path().join("generated.new")).await.unwrap();
    tokio::fs::write(root.path().join("generated.new/pipeline.yaml"), b"half-rendered").await.unwrap();

    atomic_swap::discard_failed_render(root.path()).await.unwrap();

    assert!(!root.path().join("generated.new").exists());
    let contents = tokio::fs::read_to_string(root.path().join("generated/pipeline.yaml")).await.unwrap();
    assert_eq!(contents, "live");
}
