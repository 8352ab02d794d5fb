// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Hetzner Cloud adapter: provisions the bare-metal/cloud foundation and
//! publishes [`Capability::CloudInfrastructure`].

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use ztc_domain::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Capability, ContextSnapshot, Phase,
    PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError,
};

pub static SCRIPTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/scripts/hetzner");

pub struct HetznerAdapter {
    descriptor: AdapterDescriptor,
    input_schema: Value,
}

impl HetznerAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor {
                name: "hetzner",
                display_name: "Hetzner Cloud",
                version: "1.0.0",
                phase: Phase::Foundation,
                selection_group: "cloud",
                provides: vec![Capability::CloudInfrastructure],
                requires: vec![],
                supported_versions: vec!["1.0.0"],
                default_version: "1.0.0",
            },
            input_schema: json!({
                "type": "object",
                "required": ["provider", "region"],
                "properties": {
                    "provider": { "type": "string" },
                    "region": { "type": "string" },
                },
            }),
        }
    }
}

impl Default for HetznerAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for HetznerAdapter {
    fn metadata(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    fn render(&self, config: &Value, _snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError> {
        let region = config
            .get("region")
            .and_then(Value::as_str)
            .ok_or_else(|| ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "missing \"region\" in adapter config".to_string(),
            })?;

        let manifest = format!(
            "apiVersion: v1\nkind: Namespace\nmetadata:\n  name: hetzner-system\n  labels:\n    ztc.io/adapter: hetzner\n    ztc.io/region: {region}\n"
        );

        let stage = PipelineStage {
            name: "hetzner-provision".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Bootstrap,
            description: "Provision Hetzner Cloud servers for the bare-metal foundation".to_string(),
            script: ScriptReference::new("hetzner", "bootstrap/provision.sh", json!({ "region": region })),
            cache_key: Some("hetzner-provision".to_string()),
            barrier: Barrier::Local,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        Ok(AdapterOutput::new()
            .with_manifest(PathBuf::from("namespace.yaml"), manifest.into_bytes())
            .with_capability(
                Capability::CloudInfrastructure,
                json!({ "provider": "hetzner", "region": region }),
            )
            .with_stage(stage))
    }

    fn pre_work_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("hetzner", "pre-work/verify-token.sh", Value::Null)]
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("hetzner", "bootstrap/provision.sh", Value::Null)]
    }
}
