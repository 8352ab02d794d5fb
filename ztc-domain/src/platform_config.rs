// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Platform Configuration
//!
//! The validated, in-memory form of `platform.yaml` (§6). Adapter entries
//! are kept opaque (`serde_json::Value`) at this layer — each adapter
//! validates its own slice against its `input_schema()`; the engine never
//! interprets adapter configuration itself.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// Organization- and application-level metadata, carried through to the
/// lock file but otherwise opaque to the engine.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PlatformMetadata {
    pub organization: String,
    pub app_name: String,
}

/// The validated contents of `platform.yaml`.
///
/// `adapters` is an [`IndexMap`] rather than a `HashMap` so the document's
/// declared order survives round-trips for diagnostics (e.g. "adapters
/// listed but not selected by any entry"); the *execution* order is always
/// the resolver's output, never this map's iteration order.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlatformConfig {
    pub version: String,
    pub platform: PlatformMetadata,
    pub adapters: IndexMap<String, Value>,
}

impl PlatformConfig {
    /// The adapter config for `name`, or `None` if the operator did not
    /// select it.
    pub fn adapter_config(&self, name: &str) -> Option<&Value> {
        self.adapters.get(name)
    }

    /// The selected adapter names, in the order the operator declared them.
    pub fn selected_adapters(&self) -> impl Iterator<Item = &str> {
        self.adapters.keys().map(String::as_str)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn adapter_config_looks_up_by_name() {
        let mut adapters = IndexMap::new();
        adapters.insert("hetzner".to_string(), json!({"region": "fsn1"}));
        let config = PlatformConfig {
            version: "1".to_string(),
            platform: PlatformMetadata {
                organization: "acme".to_string(),
                app_name: "edge".to_string(),
            },
            adapters,
        };
        assert_eq!(config.adapter_config("hetzner"), Some(&json!({"region": "fsn1"})));
        assert_eq!(config.adapter_config("missing"), None);
    }

    #[test]
    fn selected_adapters_preserves_declaration_order() {
        let mut adapters = IndexMap::new();
        adapters.insert("cilium".to_string(), json!({}));
        adapters.insert("hetzner".to_string(), json!({}));
        let config = PlatformConfig {
            version: "1".to_string(),
            platform: PlatformMetadata {
                organization: "acme".to_string(),
                app_name: "edge".to_string(),
            },
            adapters,
        };
        assert_eq!(config.selected_adapters().collect::<Vec<_>>(), vec!["cilium", "hetzner"]);
    }
}
