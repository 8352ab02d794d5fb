// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Streaming Hasher (C9, I/O half)
//!
//! Computes `artifacts_hash` and `platform_hash` by streaming file contents
//! in 64 KiB chunks, the same incremental-hashing idiom the teacher's
//! `ChecksumProcessor` uses for its own SHA-256 pipeline. Nothing here holds
//! a whole file in memory at once.

use std::path::{Path, PathBuf};

use sha2::{Digest, Sha256};
use tokio::io::AsyncReadExt;
use ztc_domain::ZtcError;

pub const CHUNK_SIZE: usize = 64 * 1024;

/// Hashes a single file's contents in 64 KiB chunks, returning the hex
/// digest.
pub async fn hash_file(path: &Path) -> Result<String, ZtcError> {
    let mut file = tokio::fs::File::open(path).await?;
    let mut hasher = Sha256::new();
    let mut buffer = vec![0u8; CHUNK_SIZE];

    loop {
        let read = file.read(&mut buffer).await?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(hex::encode(hasher.finalize()))
}

/// Walks `root` recursively, hashing every regular file, and returns
/// `(relative_path, content_hash)` pairs sorted by path. Sorting here (not
/// just combining later) keeps the walk itself deterministic regardless of
/// the underlying filesystem's directory iteration order.
pub async fn hash_tree(root: &Path) -> Result<Vec<(PathBuf, String)>, ZtcError> {
    let mut entries = Vec::new();
    walk(root, root, &mut entries).await?;
    entries.sort_by(|a, b| a.0.cmp(&b.0));
    Ok(entries)
}

fn walk<'a>(
    root: &'a Path,
    dir: &'a Path,
    entries: &'a mut Vec<(PathBuf, String)>,
) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<(), ZtcError>> + Send + 'a>> {
    Box::pin(async move {
        let mut read_dir = tokio::fs::read_dir(dir).await?;
        while let Some(entry) = read_dir.next_entry().await? {
            let path = entry.path();
            let file_type = entry.file_type().await?;
            if file_type.is_dir() {
                walk(root, &path, entries).await?;
            } else if file_type.is_file() {
                let digest = hash_file(&path).await?;
                let relative = path
                    .strip_prefix(root)
                    .expect("walked path is always under root")
                    .to_path_buf();
                entries.push((relative, digest));
            }
        }
        Ok(())
    })
}

/// Combines a sorted list of `(path, digest)` pairs into the single
/// `artifacts_hash`, delegating the order-independent combination math to
/// `ztc_domain::lock::combine`.
pub fn combine_artifacts_hash(entries: &[(PathBuf, String)]) -> String {
    let combined: Vec<String> = entries
        .iter()
        .map(|(path, digest)| format!("{}:{}", path.to_string_lossy(), digest))
        .collect();
    ztc_domain::lock::combine(&combined)
}

/// Canonicalizes `platform.yaml`'s validated contents (keys sorted via
/// `serde_json`'s `BTreeMap`-backed map, no whitespace) and hashes the
/// result. Any host- or time-dependent field (there are none in
/// `PlatformConfig` itself) would need to be excluded before calling this.
pub fn platform_hash(config: &ztc_domain::PlatformConfig) -> Result<String, ZtcError> {
    let canonical = canonical_json(config)?;
    let mut hasher = Sha256::new();
    hasher.update(canonical.as_bytes());
    Ok(hex::encode(hasher.finalize()))
}

fn canonical_json(config: &ztc_domain::PlatformConfig) -> Result<String, ZtcError> {
    let value = serde_json::to_value(config).map_err(|e| ZtcError::Internal(e.to_string()))?;
    let sorted = sort_keys(value);
    serde_json::to_string(&sorted).map_err(|e| ZtcError::Internal(e.to_string()))
}

fn sort_keys(value: serde_json::Value) -> serde_json::Value {
    match value {
        serde_json::Value::Object(map) => {
            let sorted: std::collections::BTreeMap<String, serde_json::Value> =
                map.into_iter().map(|(k, v)| (k, sort_keys(v))).collect();
            serde_json::to_value(sorted).expect("BTreeMap round-trips through serde_json")
        }
        serde_json::Value::Array(items) => serde_json::Value::Array(items.into_iter().map(sort_keys).collect()),
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn hash_tree_is_sorted_and_deterministic() {
        let dir = tempfile::tempdir().unwrap();
        tokio::fs::create_dir_all(dir.path().join("b")).await.unwrap();
        tokio::fs::write(dir.path().join("b/file.txt"), b"hello").await.unwrap();
        tokio::fs::write(dir.path().join("a.txt"), b"world").await.unwrap();

        let entries = hash_tree(dir.path()).await.unwrap();
        let paths: Vec<&Path> = entries.iter().map(|(p, _)| p.as_path()).collect();
        assert_eq!(paths, vec![Path::new("a.txt"), Path::new("b/file.txt")]);
    }

    #[tokio::test]
    async fn hash_file_changes_when_contents_change() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("file.txt");
        tokio::fs::write(&path, b"one").await.unwrap();
        let first = hash_file(&path).await.unwrap();
        tokio::fs::write(&path, b"two").await.unwrap();
        let second = hash_file(&path).await.unwrap();
        assert_ne!(first, second);
    }

    #[test]
    fn platform_hash_is_stable_for_equivalent_configs() {
        use indexmap::IndexMap;

        let mut forward = IndexMap::new();
        forward.insert("hetzner".to_string(), serde_json::json!({ "region": "fsn1" }));
        forward.insert("talos".to_string(), serde_json::json!({ "version": "1.8" }));

        let mut reversed = IndexMap::new();
        reversed.insert("talos".to_string(), serde_json::json!({ "version": "1.8" }));
        reversed.insert("hetzner".to_string(), serde_json::json!({ "region": "fsn1" }));

        let platform = ztc_domain::PlatformMetadata {
            organization: "acme".to_string(),
            app_name: "edge".to_string(),
        };
        let a = platform_hash(&ztc_domain::PlatformConfig {
            version: "1".to_string(),
            platform: platform.clone(),
            adapters: forward,
        })
        .unwrap();
        let b = platform_hash(&ztc_domain::PlatformConfig {
            version: "1".to_string(),
            platform,
            adapters: reversed,
        })
        .unwrap();
        assert_eq!(a, b);
    }
}
