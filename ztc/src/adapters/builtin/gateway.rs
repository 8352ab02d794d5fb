// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! The Gateway API adapter: installs an ingress Gateway implementation and
//! publishes [`Capability::GatewayApi`].

use std::path::PathBuf;

use include_dir::{include_dir, Dir};
use serde_json::{json, Value};
use ztc_domain::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Capability, ContextSnapshot, Phase,
    PipelineStage, RetryPolicy, ScriptReference, StageBucket, ZtcError,
};

use crate::render::TemplateEnvironment;

pub static SCRIPTS: Dir<'static> = include_dir!("$CARGO_MANIFEST_DIR/scripts/gateway");

const GATEWAY_CLASS_TEMPLATE: &str = "apiVersion: gateway.networking.k8s.io/v1\nkind: GatewayClass\nmetadata:\n  name: {{class}}\nspec:\n  controllerName: ztc.io/{{class}}-controller\n";

pub struct GatewayAdapter {
    descriptor: AdapterDescriptor,
    input_schema: Value,
}

impl GatewayAdapter {
    pub fn new() -> Self {
        Self {
            descriptor: AdapterDescriptor {
                name: "gateway",
                display_name: "Gateway API",
                version: "1.0.0",
                phase: Phase::Platform,
                selection_group: "ingress",
                provides: vec![Capability::GatewayApi],
                requires: vec![Capability::CniArtifacts],
                supported_versions: vec!["1.0.0"],
                default_version: "1.0.0",
            },
            input_schema: json!({
                "type": "object",
                "required": ["class"],
                "properties": { "class": { "type": "string" } },
            }),
        }
    }
}

impl Default for GatewayAdapter {
    fn default() -> Self {
        Self::new()
    }
}

impl Adapter for GatewayAdapter {
    fn metadata(&self) -> &AdapterDescriptor {
        &self.descriptor
    }

    fn input_schema(&self) -> &Value {
        &self.input_schema
    }

    fn render(&self, config: &Value, snapshot: &ContextSnapshot) -> Result<AdapterOutput, ZtcError> {
        if snapshot.get_capability(Capability::CniArtifacts).is_none() {
            return Err(ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "no cni-artifacts capability in snapshot".to_string(),
            });
        }

        let class = config
            .get("class")
            .and_then(Value::as_str)
            .ok_or_else(|| ZtcError::RenderFailure {
                adapter: self.descriptor.name.to_string(),
                reason: "missing \"class\" in adapter config".to_string(),
            })?;

        let mut templates = TemplateEnvironment::new();
        templates.register("gateway", "gatewayclass", GATEWAY_CLASS_TEMPLATE)?;
        let manifest = templates.render("gateway", "gatewayclass", &json!({ "class": class }))?;

        let stage = PipelineStage {
            name: "gateway-install".to_string(),
            adapter: self.descriptor.name.to_string(),
            bucket: StageBucket::Bootstrap,
            description: "Install the Gateway API controller".to_string(),
            script: ScriptReference::new("gateway", "bootstrap/install.sh", json!({ "class": class })),
            cache_key: Some("gateway-install".to_string()),
            barrier: Barrier::ClusterAccessible,
            retry_policy: RetryPolicy::bootstrap_default(),
        };

        Ok(AdapterOutput::new()
            .with_manifest(PathBuf::from("gatewayclass.yaml"), manifest.into_bytes())
            .with_capability(Capability::GatewayApi, json!({ "class": class }))
            .with_stage(stage))
    }

    fn bootstrap_scripts(&self) -> Vec<ScriptReference> {
        vec![ScriptReference::new("gateway", "bootstrap/install.sh", Value::Null)]
    }
}
