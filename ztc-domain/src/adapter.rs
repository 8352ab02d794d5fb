// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Adapter Data Model
//!
//! Defines the immutable shapes that flow between the resolver, the render
//! pipeline, and the bootstrap executor: [`AdapterDescriptor`] (static
//! metadata), [`ScriptReference`] and [`PipelineStage`] (what the bootstrap
//! executor eventually runs), and [`AdapterOutput`] (what a `render` call
//! produces). The [`Adapter`] trait itself is the contract every built-in
//! adapter implements; this crate only defines the contract; concrete
//! adapters live in the `ztc` crate's adapter registry.

use std::collections::BTreeMap;
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::capability::Capability;
use crate::context::ContextSnapshot;
use crate::error::ZtcError;

/// Coarse-grained, totally ordered execution bucket. Capabilities may only
/// flow from an earlier phase to an equal-or-later one; the resolver
/// rejects edges that point backward (`PhaseViolation`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Phase {
    Foundation,
    Networking,
    Platform,
    Services,
}

impl Phase {
    pub const ALL: [Phase; 4] = [Phase::Foundation, Phase::Networking, Phase::Platform, Phase::Services];

    pub fn as_str(&self) -> &'static str {
        match self {
            Phase::Foundation => "foundation",
            Phase::Networking => "networking",
            Phase::Platform => "platform",
            Phase::Services => "services",
        }
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Immutable, build-time metadata for one adapter.
///
/// Loaded once when the adapter registry is constructed and never mutated
/// afterward; the resolver operates entirely over slices of this type.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AdapterDescriptor {
    pub name: &'static str,
    pub display_name: &'static str,
    pub version: &'static str,
    pub phase: Phase,
    pub selection_group: &'static str,
    pub provides: Vec<Capability>,
    pub requires: Vec<Capability>,
    pub supported_versions: Vec<&'static str>,
    pub default_version: &'static str,
}

/// A logical identity for an embedded script: which package tree it lives
/// under, which file within that tree, and the JSON context payload the
/// bootstrap executor will hand it at execution time.
///
/// `package_path` and `resource_name` together must resolve to a file in the
/// adapter's embedded script tree; the adapter registry validates this
/// statically at startup (§4.2).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScriptReference {
    pub package_path: String,
    pub resource_name: String,
    pub context: Value,
}

impl ScriptReference {
    pub fn new(package_path: impl Into<String>, resource_name: impl Into<String>, context: Value) -> Self {
        Self {
            package_path: package_path.into(),
            resource_name: resource_name.into(),
            context,
        }
    }

    /// The relative path within the adapter's embedded tree, e.g.
    /// `bootstrap/install.sh`.
    pub fn relative_path(&self) -> PathBuf {
        PathBuf::from(&self.package_path).join(&self.resource_name)
    }
}

/// Which of the four buckets a stage was declared in (§4.8). Determines the
/// stage's position in the linear pipeline document.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum StageBucket {
    PreWork,
    Bootstrap,
    PostWork,
    Validation,
}

impl StageBucket {
    /// Ordering rank used by the pipeline generator to lay buckets out in
    /// the order pre-work, bootstrap, post-work, validation.
    pub fn rank(&self) -> u8 {
        match self {
            StageBucket::PreWork => 0,
            StageBucket::Bootstrap => 1,
            StageBucket::PostWork => 2,
            StageBucket::Validation => 3,
        }
    }
}

/// A precondition the bootstrap executor waits on before running a stage.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Barrier {
    None,
    Local,
    RescueReady,
    ClusterInstalled,
    ClusterAccessible,
    CniReady,
    GitopsReady,
}

impl Barrier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Barrier::None => "none",
            Barrier::Local => "local",
            Barrier::RescueReady => "rescue-ready",
            Barrier::ClusterInstalled => "cluster-installed",
            Barrier::ClusterAccessible => "cluster-accessible",
            Barrier::CniReady => "cni-ready",
            Barrier::GitopsReady => "gitops-ready",
        }
    }
}

/// Retry policy for a stage: exponential backoff with jitter, bounded by a
/// maximum attempt count. Validation stages get [`RetryPolicy::validation`]
/// (one attempt, no retry — Open Question (c) in the spec, resolved "no");
/// every other stage defaults to [`RetryPolicy::bootstrap_default`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub base_backoff: Duration,
}

impl RetryPolicy {
    pub fn bootstrap_default() -> Self {
        Self {
            max_attempts: 3,
            base_backoff: Duration::from_secs(2),
        }
    }

    pub fn validation() -> Self {
        Self {
            max_attempts: 1,
            base_backoff: Duration::from_secs(0),
        }
    }
}

/// One entry in the emitted pipeline document (§4.8, §6).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PipelineStage {
    pub name: String,
    pub adapter: String,
    pub bucket: StageBucket,
    pub description: String,
    pub script: ScriptReference,
    pub cache_key: Option<String>,
    pub barrier: Barrier,
    pub retry_policy: RetryPolicy,
}

/// What one adapter's `render` call produces: manifests to materialize,
/// typed capability payloads to publish into the context, and the stages it
/// contributes to the bootstrap pipeline.
#[derive(Debug, Clone, Default)]
pub struct AdapterOutput {
    pub manifests: BTreeMap<PathBuf, Vec<u8>>,
    pub capability_data: BTreeMap<Capability, Value>,
    pub stages: Vec<PipelineStage>,
}

impl AdapterOutput {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_manifest(mut self, path: impl Into<PathBuf>, contents: impl Into<Vec<u8>>) -> Self {
        self.manifests.insert(path.into(), contents.into());
        self
    }

    pub fn with_capability(mut self, capability: Capability, payload: Value) -> Self {
        self.capability_data.insert(capability, payload);
        self
    }

    pub fn with_stage(mut self, stage: PipelineStage) -> Self {
        self.stages.push(stage);
        self
    }
}

/// The contract every adapter implements. `render` is synchronous and
/// CPU-bound by design (domain traits are synchronous; the execution host in
/// the application layer wraps the call with an async timeout, per the
/// "domain is synchronous, async is infrastructure" rule this engine follows
/// throughout).
pub trait Adapter: Send + Sync {
    fn metadata(&self) -> &AdapterDescriptor;

    /// JSON Schema-shaped description of the user config this adapter
    /// accepts; used to validate `platform.yaml`'s entry for this adapter
    /// before render begins.
    fn input_schema(&self) -> &Value;

    /// Pure function over the read-only snapshot of prior adapters'
    /// outputs. Must not perform file I/O; may only consult `snapshot` and
    /// its own validated configuration.
    fn render(&self, config: &Value, snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError>;

    fn pre_work_scripts(&self) -> Vec<ScriptReference> {
        Vec::new()
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        Vec::new()
    }

    fn post_work_scripts(&self) -> Vec<ScriptReference> {
        Vec::new()
    }

    fn validation_scripts(&self) -> Vec<ScriptReference> {
        Vec::new()
    }
}
