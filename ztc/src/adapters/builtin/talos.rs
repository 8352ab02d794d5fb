// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Talos Linux adapter: installs the immutable OS and bootstraps the
//! Kubernetes control plane, publishing [`Capability::KubernetesApi`].

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use ztc_domain::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Capability, ContextSnapshot, Phase,
    PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError,
};

pub static SCRIPTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/scripts/talos");

pub struct TalosAdapter {
    descriptor: AdapterDescriptor,
    input_schema: Value,
}

impl TalosAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor {
                name: "talos",
                display_name: "Talos Linux",
                version: "1.0.0",
                phase: Phase::Foundation,
                selection_group: "os",
                provides: vec![Capability::KubernetesApi],
                requires: vec![Capability::CloudInfrastructure],
                supported_versions: vec!["1.7", "1.8"],
                default_version: "1.8",
            },
            input_schema: json!({
                "type": "object",
                "required": ["version"],
                "properties": { "version": { "type": "string" } },
            }),
        }
    }
}

impl Default for TalosAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for TalosAdapter {
    fn metadata(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    fn render(&self, config: &Value, snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError> {
        let cloud = snapshot
            .get_capability(Capability::CloudInfrastructure)
            .ok_or_else(|| ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "no cloud-infrastructure capability in snapshot".to_string(),
            })?;
        let region = cloud.get("region").and_then(Value::as_str).unwrap_or("unknown");

        let version = config
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(self.descriptor.default_version);

        let endpoint = "https://10.0.0.1:6443".to_string();

        let manifest = format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: talos-cluster-info\n  labels:\n    ztc.io/adapter: talos\ndata:\n  region: {region}\n  version: {version}\n"
        );

        let stage = PipelineStage {
            name: "talos-bootstrap".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Bootstrap,
            description: "Install Talos Linux and bootstrap the control plane".to_string(),
            script: ScriptReference::new(
                "talos",
                "bootstrap/install.sh",
                json!({ "version": version, "endpoint": endpoint }),
            ),
            cache_key: Some("talos-bootstrap".to_string()),
            barrier: Barrier::RescueReady,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        Ok(AdapterOutput::new()
            .with_manifest(PathBuf::from("cluster-info.yaml"), manifest.into_bytes())
            .with_capability(
                Capability::KubernetesApi,
                json!({ "endpoint": endpoint, "version": version }),
            )
            .with_stage(stage))
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("talos", "bootstrap/install.sh", Value::Null)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztc_domain::PlatformContext;

    #[test]
    fn render_requires_cloud_infrastructure_in_snapshot() {
        let adapter = TalosAdapter::new();
        let snapshot = PlatformContext::new().snapshot();
        let err = adapter.render(&json!({}), &snapshot).unwrap_err();
        assert!(matches!(err, ZtcError::RenderFailure { .. }));
    }

    #[test]
    fn render_publishes_kubernetes_api_using_prior_region() {
        let adapter = TalosAdapter::new();
        let mut context = PlatformContext::new();
        context.append([(Capability::CloudInfrastructure, json!({ "provider": "hetzner", "region": "fsn1" }))]);
        let snapshot = context.snapshot();

        let output = adapter.render(&json!({ "version": "1.8" }), &snapshot).unwrap();
        let published = output.capability_data.get(&Capability::KubernetesApi).unwrap();
        assert_eq!(published["version"], "1.8");
    }
}
