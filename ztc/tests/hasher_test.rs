// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Scenario 5 (§8): the streaming hasher's tree walk and combination are
//! deterministic regardless of write order, and `platform_hash` is a pure
//! function of a `PlatformConfig`'s contents.

use indexmap::IndexMap;
use serde_json::json;
use ztc::render::hasher;
use ztc_domain::{PlatformConfig, PlatformMetadata};

fn sample_config() -> PlatformConfig {
    let mut adapters = IndexMap::new();
    adapters.insert("hetzner".to_string(), json!({"provider": "hetzner", "region": "fsn1"}));
    adapters.insert("talos".to_string(), json!({"version": "1.8"}));
    PlatformConfig {
        version: "1".to_string(),
        platform: PlatformMetadata {
            organization: "acme".to_string(),
            app_name: "edge".to_string(),
        },
        adapters,
    }
}

#[tokio::test]
async fn hash_tree_is_independent_of_write_order() {
    let first = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(first.path().join("foundation/hetzner")).await.unwrap();
    tokio::fs::write(first.path().join("foundation/hetzner/a.yaml"), b"aaa").await.unwrap();
    tokio::fs::write(first.path().join("foundation/hetzner/b.yaml"), b"bbb").await.unwrap();

    let second = tempfile::tempdir().unwrap();
    tokio::fs::create_dir_all(second.path().join("foundation/hetzner")).await.unwrap();
    tokio::fs::write(second.path().join("foundation/hetzner/b.yaml"), b"bbb").await.unwrap();
    tokio::fs::write(second.path().join("foundation/hetzner/a.yaml"), b"aaa").await.unwrap();

    let first_entries = hasher::hash_tree(first.path()).await.unwrap();
    let second_entries = hasher::hash_tree(second.path()).await.unwrap();
    assert_eq!(first_entries, second_entries);

    let first_hash = hasher::combine_artifacts_hash(&first_entries);
    let second_hash = hasher::combine_artifacts_hash(&second_entries);
    assert_eq!(first_hash, second_hash);
}

#[tokio::test]
async fn hash_tree_changes_when_a_file_changes() {
    let dir = tempfile::tempdir().unwrap();
    tokio::fs::write(dir.path().join("manifest.yaml"), b"v1").await.unwrap();
    let before = hasher::combine_artifacts_hash(&hasher::hash_tree(dir.path()).await.unwrap());

    tokio::fs::write(dir.path().join("manifest.yaml"), b"v2").await.unwrap();
    let after = hasher::combine_artifacts_hash(&hasher::hash_tree(dir.path()).await.unwrap());

    assert_ne!(before, after);
}

#[test]
fn platform_hash_ignores_map_insertion_order() {
    let mut reordered = sample_config();
    let mut adapters = IndexMap::new();
    adapters.insert("talos".to_string(), reordered.adapters.get("talos").cloned().unwrap());
    adapters.insert("hetzner".to_string(), reordered.adapters.get("hetzner").cloned().unwrap());
    reordered.adapters = adapters;

    let original_hash = hasher::platform_hash(&sample_config()).unwrap();
    let reordered_hash = hasher::platform_hash(&reordered).unwrap();
    assert_eq!(original_hash, reordered_hash);
}

#[test]
fn platform_hash_changes_with_adapter_config() {
    let base = hasher::platform_hash(&sample_config()).unwrap();

    let mut changed = sample_config();
    changed.adapters.insert("hetzner".to_string(), json!({"provider": "hetzner", "region": "nbg1"}));
    let changed_hash = hasher::platform_hash(&changed).unwrap();

    assert_ne!(base, changed_hash);
}
