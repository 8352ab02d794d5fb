// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Configuration Loading
//!
//! Reads `platform.yaml` (§6) into a validated [`PlatformConfig`], layering
//! `ZTC_*` environment variables over the file via the `config` crate so an
//! operator can override `platform.organization`/`platform.app_name` (e.g.
//! `ZTC_PLATFORM__ORGANIZATION=acme`, double underscore between nested path
//! segments) without editing the file — useful in CI where the same
//! `platform.yaml` renders for several environments.
//!
//! Each adapter's own slice of `adapters` is deliberately left opaque here
//! (§4.2); [`validate_adapter_input`] checks it against the adapter's
//! `input_schema()` at the point the adapter is about to run, using a
//! structural subset of JSON Schema (`type`, `required`, `properties.*.type`)
//! — enough for the built-in adapters' flat, shallow schemas without
//! pulling in a full JSON Schema validator crate.

use std::path::Path;

use serde_json::Value;
use thiserror::Error;
use ztc_domain::PlatformConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("platform config not found at {path}")]
    NotFound { path: String },

    #[error("failed to load platform config: {0}")]
    Load(#[from] config::ConfigError),

    #[error("adapter '{adapter}' config is invalid: {violations}")]
    AdapterInputInvalid { adapter: String, violations: String },
}

/// Loads and validates `platform.yaml` at `path`, overlaying any `ZTC_`
/// prefixed environment variables (double-underscore separated for nested
/// fields, per the `config` crate's `Environment` source convention).
pub fn load_platform_config(path: &Path) -> Result<PlatformConfig, ConfigError> {
    if !path.exists() {
        return Err(ConfigError::NotFound {
            path: path.display().to_string(),
        });
    }

    let built = config::Config::builder()
        .add_source(config::File::from(path.to_path_buf()))
        .add_source(config::Environment::with_prefix("ZTC").separator("__"))
        .build()?;

    Ok(built.try_deserialize::<PlatformConfig>()?)
}

/// Validates `config` against `schema`, a JSON-Schema-shaped document with
/// `type: "object"`, an optional `required` array, and `properties` mapping
/// field name to `{"type": "..."}`. Every built-in adapter's `input_schema()`
/// fits this shape (§4.2); richer schemas (nested objects, enums, patterns)
/// are out of scope — an adapter needing more validates further in its own
/// `render()`.
pub fn validate_adapter_input(adapter: &str, schema: &Value, config: &Value) -> Result<(), ConfigError> {
    let violations = structural_violations(schema, config);
    if violations.is_empty() {
        Ok(())
    } else {
        Err(ConfigError::AdapterInputInvalid {
            adapter: adapter.to_string(),
            violations: violations.join("; "),
        })
    }
}

fn structural_violations(schema: &Value, config: &Value) -> Vec<String> {
    let mut violations = Vec::new();

    if !config.is_object() {
        violations.push(format!("expected an object, got {}", type_name(config)));
        return violations;
    }

    let Some(required) = schema.get("required").and_then(Value::as_array) else {
        return check_property_types(schema, config, violations);
    };

    for field in required {
        let Some(field) = field.as_str() else { continue };
        if config.get(field).is_none() {
            violations.push(format!("missing required field '{field}'"));
        }
    }

    check_property_types(schema, config, violations)
}

fn check_property_types(schema: &Value, config: &Value, mut violations: Vec<String>) -> Vec<String> {
    let Some(properties) = schema.get("properties").and_then(Value::as_object) else {
        return violations;
    };

    for (field, spec) in properties {
        let Some(value) = config.get(field) else {
            continue;
        };
        let Some(expected) = spec.get("type").and_then(Value::as_str) else {
            continue;
        };
        if !matches_json_type(expected, value) {
            violations.push(format!(
                "field '{field}' expected type '{expected}', got {}",
                type_name(value)
            ));
        }
    }

    violations
}

fn matches_json_type(expected: &str, value: &Value) -> bool {
    match expected {
        "string" => value.is_string(),
        "number" => value.is_number(),
        "integer" => value.is_i64() || value.is_u64(),
        "boolean" => value.is_boolean(),
        "object" => value.is_object(),
        "array" => value.is_array(),
        "null" => value.is_null(),
        _ => true,
    }
}

fn type_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "boolean",
        Value::Number(_) => "number",
        Value::String(_) => "string",
        Value::Array(_) => "array",
        Value::Object(_) => "object",
    }
}
