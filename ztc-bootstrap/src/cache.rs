// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Stage Cache
//!
//! `<workspace>/stage-cache.json`, mapping `cache_key → {completed_at,
//! exit_code}` (§4.13 step 1, P7). Updated atomically (write temp, rename)
//! so a crash mid-write never leaves a corrupt cache — the executor is the
//! sole writer (§4.13's concurrency contract).

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum CacheError {
    #[error("I/O error reading/writing stage cache: {0}")]
    Io(#[from] io::Error),

    #[error("malformed stage cache JSON: {0}")]
    Malformed(#[from] serde_json::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub completed_at: DateTime<Utc>,
    pub exit_code: i32,
}

impl CacheEntry {
    pub fn is_success(&self) -> bool {
        self.exit_code == 0
    }
}

/// In-memory view of the stage cache, backed by a JSON file.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct StageCache {
    entries: BTreeMap<String, CacheEntry>,
}

impl StageCache {
    /// Loads the cache from `path`, or returns an empty cache if the file
    /// doesn't exist yet (first run).
    pub fn load(path: &Path) -> Result<Self, CacheError> {
        match std::fs::read(path) {
            Ok(raw) => Ok(serde_json::from_slice(&raw)?),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(Self::default()),
            Err(e) => Err(e.into()),
        }
    }

    /// True if `cache_key` has a recorded successful completion.
    pub fn is_cached_success(&self, cache_key: &str) -> bool {
        self.entries.get(cache_key).is_some_and(CacheEntry::is_success)
    }

    pub fn entry(&self, cache_key: &str) -> Option<&CacheEntry> {
        self.entries.get(cache_key)
    }

    /// Records a stage's outcome and persists the cache atomically
    /// (write `<path>.tmp`, then rename over `path`).
    pub fn record(&mut self, path: &Path, cache_key: &str, exit_code: i32, completed_at: DateTime<Utc>) -> Result<(), CacheError> {
        self.entries.insert(
            cache_key.to_string(),
            CacheEntry { completed_at, exit_code },
        );
        self.persist(path)
    }

    fn persist(&self, path: &Path) -> Result<(), CacheError> {
        let tmp_path: PathBuf = path.with_extension("tmp");
        let serialized = serde_json::to_vec_pretty(self)?;
        std::fs::write(&tmp_path, serialized)?;
        std::fs::rename(&tmp_path, path)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn load_of_a_missing_file_is_an_empty_cache() {
        let dir = tempfile::tempdir().unwrap();
        let cache = StageCache::load(&dir.path().join("stage-cache.json")).unwrap();
        assert!(!cache.is_cached_success("anything"));
    }

    #[test]
    fn record_then_reload_reports_cached_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage-cache.json");

        let mut cache = StageCache::default();
        cache
            .record(&path, "hetzner-provision", 0, DateTime::<Utc>::from_timestamp(0, 0).unwrap())
            .unwrap();

        let reloaded = StageCache::load(&path).unwrap();
        assert!(reloaded.is_cached_success("hetzner-provision"));
    }

    #[test]
    fn nonzero_exit_code_is_not_a_cached_success() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage-cache.json");

        let mut cache = StageCache::default();
        cache
            .record(&path, "cilium-install", 1, DateTime::<Utc>::from_timestamp(0, 0).unwrap())
            .unwrap();

        assert!(!cache.is_cached_success("cilium-install"));
        assert_eq!(cache.entry("cilium-install").unwrap().exit_code, 1);
    }

    #[test]
    fn persist_leaves_no_tmp_file_behind() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stage-cache.json");

        let mut cache = StageCache::default();
        cache
            .record(&path, "talos-bootstrap", 0, DateTime::<Utc>::from_timestamp(0, 0).unwrap())
            .unwrap();

        assert!(!path.with_extension("tmp").exists());
        assert!(path.exists());
    }
}
