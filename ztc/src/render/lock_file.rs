// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Lock File (C9, I/O half)
//!
//! Reads and writes `platform/lock.json`. The hash-combination and drift
//! comparison math lives in `ztc_domain::lock`; this module owns only the
//! serialization shape and the filesystem round-trip.

use std::collections::BTreeMap;
use std::path::Path;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use ztc_domain::{Capability, DriftKind, LockSnapshot, ZtcError};

/// One adapter's recorded identity in the lock file, used purely for
/// diagnostics — drift detection itself only looks at the two combined
/// hashes.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockedAdapter {
    pub version: String,
    pub phase: String,
    pub provides: Vec<String>,
    pub requires: Vec<String>,
}

/// The full contents of `platform/lock.json`.
///
/// `rendered_adapters` records the subset actually rendered by `--partial`
/// runs (Open Question (b): partial renders still produce a lock file,
/// scoped to what they rendered); a full render sets it to every selected
/// adapter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockRecord {
    pub engine_version: String,
    pub platform_hash: String,
    pub artifacts_hash: String,
    /// Excluded from both hashes — timestamps are host/time-dependent (§4.9).
    pub generated_at: DateTime<Utc>,
    pub adapters: BTreeMap<String, LockedAdapter>,
    pub rendered_adapters: Vec<String>,
}

impl LockRecord {
    pub fn snapshot(&self) -> LockSnapshot {
        LockSnapshot {
            engine_version: self.engine_version.clone(),
            platform_hash: self.platform_hash.clone(),
            artifacts_hash: self.artifacts_hash.clone(),
        }
    }
}

pub async fn write(path: &Path, record: &LockRecord) -> Result<(), ZtcError> {
    let json = serde_json::to_vec_pretty(record).map_err(|e| ZtcError::Internal(e.to_string()))?;
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    tokio::fs::write(path, json).await?;
    Ok(())
}

pub async fn read(path: &Path) -> Result<LockRecord, ZtcError> {
    let bytes = tokio::fs::read(path).await?;
    serde_json::from_slice(&bytes).map_err(|e| ZtcError::ConfigInvalid(format!("malformed lock file: {e}")))
}

/// Recomputes live hashes and compares them against `record`, returning
/// every kind of drift found.
pub async fn validate(
    record: &LockRecord,
    live_platform_hash: &str,
    live_artifacts_hash: &str,
    running_version: &str,
) -> Result<Vec<DriftKind>, ZtcError> {
    ztc_domain::validate_lock(&record.snapshot(), live_platform_hash, live_artifacts_hash, running_version)
}

pub fn capability_names(capabilities: &[Capability]) -> Vec<String> {
    capabilities.iter().map(|c| c.to_string()).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_record() -> LockRecord {
        LockRecord {
            engine_version: "1.0.0".to_string(),
            platform_hash: "ph".to_string(),
            artifacts_hash: "ah".to_string(),
            generated_at: DateTime::<Utc>::from_timestamp(0, 0).unwrap(),
            adapters: BTreeMap::new(),
            rendered_adapters: vec!["hetzner".to_string()],
        }
    }

    #[tokio::test]
    async fn write_then_read_round_trips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform/lock.json");
        let record = sample_record();
        write(&path, &record).await.unwrap();
        let loaded = read(&path).await.unwrap();
        assert_eq!(loaded, record);
    }

    #[tokio::test]
    async fn validate_detects_no_drift_when_unchanged() {
        let record = sample_record();
        let drift = validate(&record, "ph", "ah", "1.0.0").await.unwrap();
        assert!(drift.is_empty());
    }
}
