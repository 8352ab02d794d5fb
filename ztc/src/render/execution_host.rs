// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Adapter Execution Host (C6)
//!
//! Drives one adapter through the render contract: capture a snapshot,
//! invoke `render` under a timeout, validate everything it returned, append
//! its capability payloads to the mutable context, and hand manifests/stages
//! downstream to the artifact writer and pipeline generator.
//!
//! `Adapter::render` is synchronous and CPU-bound by contract (§4.2); this
//! host runs it on a blocking thread via `tokio::task::spawn_blocking` and
//! races it against a timeout, mirroring the "domain is synchronous, async
//! is infrastructure" split the teacher crate follows throughout its
//! service layer.

use std::path::{Component, Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use ztc_domain::{
    Adapter, AdapterOutput, Capability, CapabilityRegistry, ContextSnapshot, PlatformContext,
    ZtcError,
};

pub const DEFAULT_RENDER_TIMEOUT: Duration = Duration::from_secs(60);

/// What one adapter contributed, with its manifest paths already resolved to
/// their full location under `generated/<phase>/<adapter>/…`.
pub struct ExecutedAdapter {
    pub adapter_name: String,
    pub manifests: Vec<(PathBuf, Vec<u8>)>,
    pub stages: Vec<ztc_domain::PipelineStage>,
}

pub struct ExecutionHost {
    registry: Arc<CapabilityRegistry>,
    timeout: Duration,
}

impl ExecutionHost {
    pub fn new(registry: Arc<CapabilityRegistry>) -> Self {
        Self {
            registry,
            timeout: DEFAULT_RENDER_TIMEOUT,
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Runs one adapter to completion: snapshot, render-with-timeout,
    /// validate, append to context.
    pub async fn execute(
        &self,
        adapter: Arc<dyn Adapter>,
        config: serde_json::Value,
        phase_dir: &str,
        context: &mut PlatformContext,
    ) -> Result<ExecutedAdapter, ZtcError> {
        let name = adapter.metadata().name.to_string();
        let snapshot = context.snapshot();

        let output = self.render_with_timeout(adapter.clone(), config, snapshot).await?;

        self.validate_capabilities(&name, adapter.as_ref(), &output)?;
        let manifests = self.validate_and_resolve_paths(&name, phase_dir, &output)?;

        context.append(output.capability_data.clone());

        Ok(ExecutedAdapter {
            adapter_name: name,
            manifests,
            stages: output.stages,
        })
    }

    async fn render_with_timeout(
        &self,
        adapter: Arc<dyn Adapter>,
        config: serde_json::Value,
        snapshot: ContextSnapshot,
    ) -> Result<AdapterOutput, ZtcError> {
        let name = adapter.metadata().name.to_string();
        let render = tokio::task::spawn_blocking(move || adapter.render(&config, &snapshot));

        match tokio::time::timeout(self.timeout, render).await {
            Ok(Ok(result)) => result,
            Ok(Err(join_error)) => Err(ZtcError::RenderFailure {
                adapter: name,
                reason: format!("render task panicked: {join_error}"),
            }),
            Err(_elapsed) => Err(ZtcError::RenderFailure {
                adapter: name,
                reason: format!("render exceeded the {:?} timeout", self.timeout),
            }),
        }
    }

    fn validate_capabilities(
        &self,
        adapter_name: &str,
        adapter: &dyn Adapter,
        output: &AdapterOutput,
    ) -> Result<(), ZtcError> {
        let provides = &adapter.metadata().provides;
        for (capability, payload) in &output.capability_data {
            if !provides.contains(capability) {
                return Err(ZtcError::OutputSchemaViolation {
                    adapter: adapter_name.to_string(),
                    capability: capability.to_string(),
                    violation: "capability not declared in this adapter's `provides`".to_string(),
                });
            }
            if let Err(violations) = self.registry.validate(*capability, payload) {
                let joined = violations
                    .iter()
                    .map(|v| v.to_string())
                    .collect::<Vec<_>>()
                    .join("; ");
                return Err(ZtcError::OutputSchemaViolation {
                    adapter: adapter_name.to_string(),
                    capability: capability.to_string(),
                    violation: joined,
                });
            }
        }
        Ok(())
    }

    fn validate_and_resolve_paths(
        &self,
        adapter_name: &str,
        phase_dir: &str,
        output: &AdapterOutput,
    ) -> Result<Vec<(PathBuf, Vec<u8>)>, ZtcError> {
        let mut resolved = Vec::with_capacity(output.manifests.len());
        for (relative_path, contents) in &output.manifests {
            let normalized = normalize_relative(relative_path).ok_or_else(|| ZtcError::PathViolation {
                adapter: adapter_name.to_string(),
                path: relative_path.display().to_string(),
            })?;
            let full_path = Path::new("generated").join(phase_dir).join(adapter_name).join(normalized);
            resolved.push((full_path, contents.clone()));
        }
        Ok(resolved)
    }
}

/// Rejects absolute paths and any `..` component; returns the normalized
/// relative path otherwise. This is the sole gate for P9 (path containment).
fn normalize_relative(path: &Path) -> Option<PathBuf> {
    let mut normalized = PathBuf::new();
    for component in path.components() {
        match component {
            Component::Normal(part) => normalized.push(part),
            Component::CurDir => {}
            Component::ParentDir | Component::RootDir | Component::Prefix(_) => return None,
        }
    }
    if normalized.as_os_str().is_empty() {
        return None;
    }
    Some(normalized)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn normalize_accepts_plain_relative_paths() {
        assert_eq!(
            normalize_relative(Path::new("namespace.yaml")),
            Some(PathBuf::from("namespace.yaml"))
        );
        assert_eq!(
            normalize_relative(Path::new("nested/file.yaml")),
            Some(PathBuf::from("nested/file.yaml"))
        );
    }

    #[test]
    fn normalize_rejects_parent_dir_escapes() {
        assert_eq!(normalize_relative(Path::new("../escape.yaml")), None);
        assert_eq!(normalize_relative(Path::new("a/../../escape.yaml")), None);
    }

    #[test]
    fn normalize_rejects_absolute_paths() {
        assert_eq!(normalize_relative(Path::new("/etc/passwd")), None);
    }

    #[tokio::test]
    async fn execute_runs_an_adapter_and_appends_its_capability() {
        let host = ExecutionHost::new(Arc::new(CapabilityRegistry::new()));
        let adapter: Arc<dyn Adapter> = crate::adapters::builtin::all()
            .into_iter()
            .find(|a| a.metadata().name == "hetzner")
            .unwrap();
        let mut context = PlatformContext::new();

        let executed = host
            .execute(
                adapter,
                serde_json::json!({ "provider": "hetzner", "region": "fsn1" }),
                "foundation",
                &mut context,
            )
            .await
            .unwrap();

        assert_eq!(executed.adapter_name, "hetzner");
        assert_eq!(executed.manifests.len(), 1);
        assert_eq!(executed.manifests[0].0, PathBuf::from("generated/foundation/hetzner/namespace.yaml"));
        assert!(context.snapshot().get_capability(Capability::CloudInfrastructure).is_some());
    }
}
