// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The SOPS secrets adapter: wires up the secrets controller and publishes
//! [`Capability::SecretsSops`]. The encryption primitives themselves are an
//! external collaborator (§1 Deliberately out of scope); this adapter only
//! installs and configures the controller that consumes already-encrypted
//! secrets at cluster apply time.

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use ztc_domain::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Capability, ContextSnapshot, Phase,
    PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError,
};

pub static SCRIPTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/scripts/sops");

pub struct SopsAdapter {
    descriptor: AdapterDescriptor,
    input_schema: Value,
}

impl SopsAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor {
                name: "sops",
                display_name: "SOPS Secrets",
                version: "1.0.0",
                phase: Phase::Services,
                selection_group: "secrets",
                provides: vec![Capability::SecretsSops],
                requires: vec![Capability::KubernetesApi],
                supported_versions: vec!["1.0.0"],
                default_version: "1.0.0",
            },
            input_schema: json!({
                "type": "object",
                "required": ["key_backend"],
                "properties": { "key_backend": { "type": "string" } },
            }),
        }
    }
}

impl Default for SopsAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for SopsAdapter {
    fn metadata(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    fn render(&self, config: &Value, snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError> {
        if snapshot.get_capability(Capability::KubernetesApi).is_none() {
            return Err(ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "no kubernetes-api capability in snapshot".to_string(),
            });
        }

        let key_backend = config
            .get("key_backend")
            .and_then(Value::as_str)
            .ok_or_else(|| ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "missing \"key_backend\" in adapter config".to_string(),
            })?;

        let manifest = format!(
            "apiVersion: v1\nkind: ConfigMap\nmetadata:\n  name: sops-config\n  labels:\n    ztc.io/adapter: sops\ndata:\n  key_backend: {key_backend}\n"
        );

        let stage = PipelineStage {
            name: "sops-install".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Bootstrap,
            description: "Install the SOPS secrets controller".to_string(),
            script: ScriptReference::new(
                "sops",
                "bootstrap/install.sh",
                json!({ "key_backend": key_backend }),
            ),
            cache_key: Some("sops-install".to_string()),
            barrier: Barrier::ClusterAccessible,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        Ok(AdapterOutput::new()
            .with_manifest(PathBuf::from("configmap.yaml"), manifest.into_bytes())
            .with_capability(Capability::SecretsSops, json!({ "key_backend": key_backend }))
            .with_stage(stage))
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("sops", "bootstrap/install.sh", Value::Null)]
    }
}
