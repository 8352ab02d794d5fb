// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Lock File Invariants
//!
//! Pure hash-combination math for the render lock file (§4.9). The actual
//! file I/O and streaming chunk-hashing live in the `ztc` crate's
//! `render::hasher`/`render::lock_file` modules; this module owns only the
//! parts that are pure functions of already-computed digests, so they can be
//! unit- and property-tested without touching a filesystem.

use serde::{Deserialize, Serialize};

use crate::error::ZtcError;

/// SHA-256 digests are combined by hashing their concatenated hex strings in
/// a fixed, sorted order — this is what makes `combine` order-independent:
/// callers may pass inputs in any order and get the same digest back, which
/// matters because the set of rendered artifact paths has no a priori order
/// until `BTreeMap` imposes one.
pub fn combine(digests: &[String]) -> String {
    let mut sorted: Vec<&str> = digests.iter().map(String::as_str).collect();
    sorted.sort_unstable();
    let mut hasher = Sha256Writer::new();
    for digest in sorted {
        hasher.update(digest.as_bytes());
    }
    hasher.finish_hex()
}

/// Thin wrapper so this module does not need to depend on `sha2` for more
/// than the two operations it actually performs; kept separate from
/// `render::hasher`'s streaming chunk reader, which is I/O-bound and lives
/// in the application crate.
struct Sha256Writer {
    hasher: sha2::Sha256,
}

impl Sha256Writer {
    fn new() -> Self {
        use sha2::Digest;
        Self {
            hasher: sha2::Sha256::new(),
        }
    }

    fn update(&mut self, bytes: &[u8]) {
        use sha2::Digest;
        self.hasher.update(bytes);
    }

    fn finish_hex(self) -> String {
        use sha2::Digest;
        hex::encode(self.hasher.finalize())
    }
}

/// The recorded state a lock file captures at render time.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LockSnapshot {
    pub engine_version: String,
    pub platform_hash: String,
    pub artifacts_hash: String,
}

/// What changed between a lock file and the live state it is being checked
/// against. Named so the CLI can report precisely which of the three things
/// drifted, rather than a single generic "out of date" message.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DriftKind {
    PlatformModified,
    ArtifactsModified,
    EngineMismatch,
}

/// Compares a recorded lock snapshot against freshly computed live hashes
/// and the running engine's version, returning every kind of drift found
/// (not just the first).
///
/// Engine version is checked with ordinary string inequality against
/// `running_version`, except the specific case of the lock naming a
/// strictly newer engine version than the one running now, which is its own
/// error variant ([`ZtcError::EngineVersionTooNew`]) rather than a generic
/// drift, per the specification's Open Question (a): refusing to proceed is
/// safer than rendering with semantics an older engine cannot guarantee.
pub fn validate(
    lock: &LockSnapshot,
    live_platform_hash: &str,
    live_artifacts_hash: &str,
    running_version: &str,
) -> Result<Vec<DriftKind>, ZtcError> {
    if is_newer(&lock.engine_version, running_version) {
        return Err(ZtcError::EngineVersionTooNew {
            lock_version: lock.engine_version.clone(),
            running_version: running_version.to_string(),
        });
    }

    let mut drift = Vec::new();
    if lock.engine_version != running_version {
        drift.push(DriftKind::EngineMismatch);
    }
    if lock.platform_hash != live_platform_hash {
        drift.push(DriftKind::PlatformModified);
    }
    if lock.artifacts_hash != live_artifacts_hash {
        drift.push(DriftKind::ArtifactsModified);
    }
    Ok(drift)
}

/// Compares two `MAJOR.MINOR.PATCH` version strings, treating any
/// unparseable component as `0`. Good enough for the engine's own
/// self-versioning; it is never exposed to adapter-supplied version
/// strings.
fn is_newer(lock_version: &str, running_version: &str) -> bool {
    parse_semver(lock_version) > parse_semver(running_version)
}

fn parse_semver(version: &str) -> (u64, u64, u64) {
    let mut parts = version.split('.').map(|p| p.parse::<u64>().unwrap_or(0));
    (
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
        parts.next().unwrap_or(0),
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn combine_is_order_independent() {
        let a = combine(&["aa".to_string(), "bb".to_string()]);
        let b = combine(&["bb".to_string(), "aa".to_string()]);
        assert_eq!(a, b);
    }

    #[test]
    fn combine_changes_when_inputs_change() {
        let a = combine(&["aa".to_string()]);
        let b = combine(&["ab".to_string()]);
        assert_ne!(a, b);
    }

    #[test]
    fn matching_snapshot_has_no_drift() {
        let lock = LockSnapshot {
            engine_version: "1.2.0".to_string(),
            platform_hash: "ph".to_string(),
            artifacts_hash: "ah".to_string(),
        };
        let drift = validate(&lock, "ph", "ah", "1.2.0").unwrap();
        assert!(drift.is_empty());
    }

    #[test]
    fn platform_drift_is_detected() {
        let lock = LockSnapshot {
            engine_version: "1.2.0".to_string(),
            platform_hash: "ph-old".to_string(),
            artifacts_hash: "ah".to_string(),
        };
        let drift = validate(&lock, "ph-new", "ah", "1.2.0").unwrap();
        assert_eq!(drift, vec![DriftKind::PlatformModified]);
    }

    #[test]
    fn artifacts_drift_is_detected() {
        let lock = LockSnapshot {
            engine_version: "1.2.0".to_string(),
            platform_hash: "ph".to_string(),
            artifacts_hash: "ah-old".to_string(),
        };
        let drift = validate(&lock, "ph", "ah-new", "1.2.0").unwrap();
        assert_eq!(drift, vec![DriftKind::ArtifactsModified]);
    }

    #[test]
    fn older_running_engine_reports_specific_error() {
        let lock = LockSnapshot {
            engine_version: "2.0.0".to_string(),
            platform_hash: "ph".to_string(),
            artifacts_hash: "ah".to_string(),
        };
        let err = validate(&lock, "ph", "ah", "1.9.0").unwrap_err();
        assert!(matches!(err, ZtcError::EngineVersionTooNew { .. }));
    }

    #[test]
    fn newer_running_engine_is_an_engine_mismatch_not_an_error() {
        let lock = LockSnapshot {
            engine_version: "1.0.0".to_string(),
            platform_hash: "ph".to_string(),
            artifacts_hash: "ah".to_string(),
        };
        let drift = validate(&lock, "ph", "ah", "1.1.0").unwrap();
        assert_eq!(drift, vec![DriftKind::EngineMismatch]);
    }
}
