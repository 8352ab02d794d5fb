// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Error Taxonomy
//!
//! `ZtcError` is the single error type shared by every layer of the engine.
//! Each variant corresponds to one of the language-neutral error kinds named
//! in the specification: resolver failures, render failures, hash mismatches,
//! and bootstrap stage failures all surface through this type so that the
//! bootstrap layer can map them to a stable process exit code.
//!
//! Recoverable variants carry a `remediation` hint that the CLI prints
//! alongside the error message.

use std::fmt;

/// Every error kind the engine can produce, from config parsing through
/// bootstrap execution.
#[derive(Debug, thiserror::Error)]
pub enum ZtcError {
    #[error("invalid platform configuration: {0}")]
    ConfigInvalid(String),

    #[error("adapter not found: {0}")]
    AdapterNotFound(String),

    #[error("duplicate adapter registered: {0}")]
    DuplicateAdapter(String),

    #[error("no adapter provides capability {capability:?} required by {consumer}")]
    MissingCapability { consumer: String, capability: String },

    #[error("capability {capability:?} is provided by both {first} and {second}")]
    DuplicateProvider {
        capability: String,
        first: String,
        second: String,
    },

    #[error("circular dependency among adapters: {}", .cycle.join(" -> "))]
    CircularDependency { cycle: Vec<String> },

    #[error("adapter {consumer} requires capability {capability:?} from a later phase (provided by {provider})")]
    PhaseViolation {
        consumer: String,
        provider: String,
        capability: String,
    },

    #[error("adapter {adapter} failed to render: {reason}")]
    RenderFailure { adapter: String, reason: String },

    #[error("adapter {adapter} produced an invalid payload for capability {capability:?}: {violation}")]
    OutputSchemaViolation {
        adapter: String,
        capability: String,
        violation: String,
    },

    #[error("adapter {adapter} emitted a manifest path outside its namespace: {path}")]
    PathViolation { adapter: String, path: String },

    #[error("duplicate stage name(s) in pipeline: {}", .names.join(", "))]
    StageNameCollision { names: Vec<String> },

    #[error("platform config hash mismatch: configuration was modified since render")]
    HashMismatchPlatform,

    #[error("artifact hash mismatch: generated tree was modified since render")]
    HashMismatchArtifacts,

    #[error("lock file was generated by engine version {lock_version}, newer than running engine {running_version}")]
    EngineVersionTooNew {
        lock_version: String,
        running_version: String,
    },

    #[error("runtime dependency not found on PATH: {0}")]
    RuntimeDependencyMissing(String),

    #[error("stage {stage} timed out waiting on its barrier")]
    BarrierTimeout { stage: String },

    #[error("stage {stage} exited with status {exit_code}")]
    ScriptFailed { stage: String, exit_code: i32 },

    #[error("operation cancelled")]
    Cancelled,

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error("internal invariant violated: {0}")]
    Internal(String),
}

impl ZtcError {
    /// A human-actionable suggestion for the recoverable error kinds named
    /// in the specification. Returns `None` for errors that have no
    /// meaningful remediation beyond reading the message.
    pub fn remediation(&self) -> Option<&'static str> {
        match self {
            ZtcError::MissingCapability { .. } => {
                Some("add an adapter to `platform.yaml` that provides the missing capability")
            }
            ZtcError::RuntimeDependencyMissing(_) => {
                Some("install the missing tool and ensure it is on PATH, then re-run")
            }
            ZtcError::HashMismatchPlatform => {
                Some("re-run `ztc render` to regenerate the lock file for the current configuration")
            }
            ZtcError::HashMismatchArtifacts => {
                Some("the generated tree was edited by hand; re-run `ztc render` instead of editing generated files")
            }
            ZtcError::EngineVersionTooNew { .. } => {
                Some("upgrade the ztc binary to at least the engine version recorded in the lock file")
            }
            ZtcError::BarrierTimeout { .. } => {
                Some("verify the expected host/cluster readiness signal and re-run `ztc bootstrap`")
            }
            _ => None,
        }
    }

    /// True when this error reflects a user/config mistake rather than an
    /// internal engine fault, used by the bootstrap layer's exit-code map.
    pub fn is_config_error(&self) -> bool {
        matches!(
            self,
            ZtcError::ConfigInvalid(_)
                | ZtcError::AdapterNotFound(_)
                | ZtcError::DuplicateAdapter(_)
                | ZtcError::MissingCapability { .. }
                | ZtcError::DuplicateProvider { .. }
                | ZtcError::CircularDependency { .. }
                | ZtcError::PhaseViolation { .. }
        )
    }
}

/// A structured schema-violation entry, used by [`crate::capability::CapabilityRegistry::validate`]
/// to report exactly where a capability payload diverged from its schema.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Violation {
    pub pointer: String,
    pub expected: String,
    pub actual: String,
}

impl fmt::Display for Violation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: expected {}, got {}",
            self.pointer, self.expected, self.actual
        )
    }
}
