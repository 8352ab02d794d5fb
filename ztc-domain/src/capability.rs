// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Capability Registry & Schemas
//!
//! A capability is a named contract between adapters: one adapter *provides*
//! it, any number of later-phase adapters may *require* it. The set of valid
//! capability identifiers is closed (an enum, not an open string) so that
//! adding a new one that no adapter schema recognizes is caught by the
//! compiler's exhaustiveness check on [`CapabilityRegistry::schema`], rather
//! than surfacing at runtime.
//!
//! Schemas here are intentionally small: a capability payload is validated
//! structurally (required fields present, coarse type match) rather than
//! against full JSON Schema. That is enough to satisfy the violation-list
//! contract the specification asks for without pulling in a schema engine
//! for a handful of fixed, engine-authored shapes.

use serde_json::Value;
use std::fmt;

use crate::error::Violation;

/// The closed set of capability identifiers adapters can provide or require.
///
/// This list is expected to grow only at build time, alongside new
/// adapters; it is not discovered at runtime.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize, serde::Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum Capability {
    CloudInfrastructure,
    KubernetesApi,
    CniArtifacts,
    GatewayApi,
    Gitops,
    SecretsSops,
    DnsRecords,
    TlsCertificates,
}

impl Capability {
    /// All capabilities known to the engine, in a stable order — used to
    /// build the schema table and to enumerate capabilities in diagnostics.
    pub const ALL: &'static [Capability] = &[
        Capability::CloudInfrastructure,
        Capability::KubernetesApi,
        Capability::CniArtifacts,
        Capability::GatewayApi,
        Capability::Gitops,
        Capability::SecretsSops,
        Capability::DnsRecords,
        Capability::TlsCertificates,
    ];

    /// The wire identifier used in manifests, lock files, and diagnostics.
    pub fn as_str(&self) -> &'static str {
        match self {
            Capability::CloudInfrastructure => "cloud-infrastructure",
            Capability::KubernetesApi => "kubernetes-api",
            Capability::CniArtifacts => "cni-artifacts",
            Capability::GatewayApi => "gateway-api",
            Capability::Gitops => "gitops",
            Capability::SecretsSops => "secrets-sops",
            Capability::DnsRecords => "dns-records",
            Capability::TlsCertificates => "tls-certificates",
        }
    }
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A coarse JSON type tag used by [`Schema`] field declarations.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FieldType {
    String,
    Number,
    Bool,
    Object,
    Array,
}

impl FieldType {
    fn matches(&self, value: &Value) -> bool {
        match self {
            FieldType::String => value.is_string(),
            FieldType::Number => value.is_number(),
            FieldType::Bool => value.is_boolean(),
            FieldType::Object => value.is_object(),
            FieldType::Array => value.is_array(),
        }
    }

    fn label(&self) -> &'static str {
        match self {
            FieldType::String => "string",
            FieldType::Number => "number",
            FieldType::Bool => "bool",
            FieldType::Object => "object",
            FieldType::Array => "array",
        }
    }
}

/// A required field in a capability payload: its JSON Pointer-style path
/// (relative to the payload root, e.g. `/endpoint`) and expected type.
#[derive(Debug, Clone)]
pub struct FieldSpec {
    pub pointer: &'static str,
    pub field_type: FieldType,
}

/// The schema a capability's payload must satisfy.
///
/// Validation is structural and shallow by design: every [`FieldSpec`] must
/// be present at the top level of the payload and match its declared type.
/// This is sufficient for the fixed, engine-authored capability payloads;
/// adapters that need deeper validation of their own *input* configuration
/// use their own `input_schema()` (see [`crate::adapter::Adapter`]), which is
/// a separate, per-adapter concern.
#[derive(Debug, Clone)]
pub struct Schema {
    pub capability: Capability,
    pub required_fields: &'static [FieldSpec],
}

impl Schema {
    /// Validates `payload` against this schema, returning every violation
    /// found rather than stopping at the first one.
    pub fn validate(&self, payload: &Value) -> Vec<Violation> {
        let mut violations = Vec::new();
        let Some(object) = payload.as_object() else {
            violations.push(Violation {
                pointer: "/".to_string(),
                expected: "object".to_string(),
                actual: json_type_name(payload).to_string(),
            });
            return violations;
        };

        for field in self.required_fields {
            let key = field.pointer.trim_start_matches('/');
            match object.get(key) {
                None => violations.push(Violation {
                    pointer: field.pointer.to_string(),
                    expected: field.field_type.label().to_string(),
                    actual: "missing".to_string(),
                }),
                Some(value) if !field.field_type.matches(value) => violations.push(Violation {
                    pointer: field.pointer.to_string(),
                    expected: field.field_type.label().to_string(),
                    actual: json_type_name(value).to_string(),
                }),
                Some(_) => {}
            }
        }
        violations
    }
}

fn json_type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "bool",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}

/// The process-global, read-only table of capability schemas.
///
/// Built once via [`CapabilityRegistry::new`] (cheap: a handful of static
/// table entries) and then shared behind an `Arc` or simply re-constructed,
/// since it owns no heap state beyond the table itself.
pub struct CapabilityRegistry {
    schemas: Vec<Schema>,
}

impl CapabilityRegistry {
    /// Builds the registry. The match in [`schema_for`] is exhaustive over
    /// [`Capability`], so a capability added to the enum without a
    /// corresponding arm fails to compile — the build-time guarantee the
    /// specification asks for.
    pub fn new() -> Self {
        let schemas = Capability::ALL.iter().map(|c| schema_for(*c)).collect();
        Self { schemas }
    }

    /// Looks up the schema for a capability. Always succeeds: every
    /// capability in [`Capability::ALL`] has an entry by construction.
    pub fn lookup(&self, capability: Capability) -> &Schema {
        self.schemas
            .iter()
            .find(|s| s.capability == capability)
            .expect("every Capability has a schema by construction")
    }

    /// Validates `payload` against `capability`'s schema.
    pub fn validate(&self, capability: Capability, payload: &Value) -> Result<(), Vec<Violation>> {
        let violations = self.lookup(capability).validate(payload);
        if violations.is_empty() {
            Ok(())
        } else {
            Err(violations)
        }
    }
}

impl Default for CapabilityRegistry {
    fn default() -> Self {
        Self::new()
    }
}

fn schema_for(capability: Capability) -> Schema {
    const STRING: FieldType = FieldType::String;
    const OBJECT: FieldType = FieldType::Object;

    let required_fields: &'static [FieldSpec] = match capability {
        Capability::CloudInfrastructure => &[
            FieldSpec { pointer: "/provider", field_type: STRING },
            FieldSpec { pointer: "/region", field_type: STRING },
        ],
        Capability::KubernetesApi => &[
            FieldSpec { pointer: "/endpoint", field_type: STRING },
            FieldSpec { pointer: "/version", field_type: STRING },
        ],
        Capability::CniArtifacts => &[FieldSpec { pointer: "/plugin", field_type: STRING }],
        Capability::GatewayApi => &[FieldSpec { pointer: "/class", field_type: STRING }],
        Capability::Gitops => &[
            FieldSpec { pointer: "/repository", field_type: STRING },
            FieldSpec { pointer: "/branch", field_type: STRING },
        ],
        Capability::SecretsSops => &[FieldSpec { pointer: "/key_backend", field_type: STRING }],
        Capability::DnsRecords => &[FieldSpec { pointer: "/zone", field_type: STRING }],
        Capability::TlsCertificates => &[FieldSpec { pointer: "/issuer", field_type: OBJECT }],
    };

    Schema {
        capability,
        required_fields,
    }
}
