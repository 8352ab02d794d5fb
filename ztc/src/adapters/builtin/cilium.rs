// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Cilium CNI adapter: installs the cluster network plugin and
//! publishes [`Capability::CniArtifacts`].

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use ztc_domain::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Capability, ContextSnapshot, Phase,
    PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError,
};

pub static SCRIPTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/scripts/cilium");

pub struct CiliumAdapter {
    descriptor: AdapterDescriptor,
    input_schema: Value,
}

impl CiliumAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor {
                name: "cilium",
                display_name: "Cilium",
                version: "1.0.0",
                phase: Phase::Networking,
                selection_group: "cni",
                provides: vec![Capability::CniArtifacts],
                requires: vec![Capability::KubernetesApi],
                supported_versions: vec!["1.15", "1.16"],
                default_version: "1.16",
            },
            input_schema: json!({
                "type": "object",
                "properties": { "version": { "type": "string" } },
            }),
        }
    }
}

impl Default for CiliumAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for CiliumAdapter {
    fn metadata(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    fn render(&self, config: &Value, snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError> {
        let api = snapshot
            .get_capability(Capability::KubernetesApi)
            .ok_or_else(|| ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "no kubernetes-api capability in snapshot".to_string(),
            })?;
        let endpoint = api.get("endpoint").and_then(Value::as_str).unwrap_or("unknown");

        let version = config
            .get("version")
            .and_then(Value::as_str)
            .unwrap_or(self.descriptor.default_version)
            .to_string();

        let manifest = format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: cilium-config\n  labels:\n    ztc.io/adapter: cilium\ndata:\n  cluster-endpoint: {endpoint}\n  plugin: cilium\n"
        );

        let install_stage = PipelineStage {
            name: "cilium-install".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Bootstrap,
            description: "Install the Cilium CNI plugin".to_string(),
            script: ScriptReference::new("cilium", "bootstrap/install.sh", json!({ "version": version })),
            cache_key: Some("cilium-install".to_string()),
            barrier: Barrier::ClusterInstalled,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        let readiness_stage = PipelineStage {
            name: "cilium-wait-ready".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::PostWork,
            description: "Wait for Cilium's readiness checks to pass".to_string(),
            script: ScriptReference::new("cilium", "post-work/wait-ready.sh", Value::Null),
            cache_key: Some("cilium-wait-ready".to_string()),
            barrier: Barrier::CniReady,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        let validate_stage = PipelineStage {
            name: "cilium-validate".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Validation,
            description: "Confirm Cilium connectivity checks pass".to_string(),
            script: ScriptReference::new("cilium", "bootstrap/connectivity-test.sh", Value::Null),
            cache_key: None,
            barrier: Barrier::CniReady,
            retry_policy: RetryPolicy::validation(),
        };

        Ok(AdapterOutput::new()
            .with_manifest(PathBuf::from("configmap.yaml"), manifest.into_bytes())
            .with_capability(Capability::CniArtifacts, json!({ "plugin": "cilium" }))
            .with_stage(install_stage)
            .with_stage(readiness_stage)
            .with_stage(validate_stage))
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        vec![
            ScriptReference::new("cilium", "bootstrap/install.sh", Value::Null),
            ScriptReference::new("cilium", "bootstrap/connectivity-test.sh", Value::Null),
        ]
    }

    fn post_work_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("cilium", "post-work/wait-ready.sh", Value::Null)]
    }

    fn validation_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("cilium", "bootstrap/connectivity-test.sh", Value::Null)]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ztc_domain::PlatformContext;

    #[test]
    fn render_contributes_one_stage_per_bucket_used() {
        let adapter = CiliumAdapter::new();
        let mut context = PlatformContext::new();
        context.append([(Capability::KubernetesApi, json!({ "endpoint": "https://10.0.0.1:6443", "version": "1.8" }))]);
        let snapshot = context.snapshot();

        let output = adapter.render(&json!({}), &snapshot).unwrap();
        assert_eq!(output.stages.len(), 3);
        assert!(output.stages.iter().any(|s| s.bucket == ztc_domain::StageBucket::Validation));
    }
}
