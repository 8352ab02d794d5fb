// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Context & Snapshot
//!
//! [`PlatformContext`] is the mutable store the render pipeline owns and
//! appends to after each adapter's output is validated. [`ContextSnapshot`]
//! is the read-only view handed to the *next* adapter's `render` call: it is
//! captured by cloning two `Arc`s, not the underlying data, so appending to
//! the context afterward can never retroactively change a snapshot an
//! adapter already holds (P4 in the specification's testable properties).

use std::sync::Arc;

use serde_json::Value;

use crate::capability::Capability;

/// An immutable view over every capability payload published so far and
/// every adapter's validated configuration.
///
/// Cloning a `ContextSnapshot` is O(1): it clones two `Arc<Vec<_>>`s. Once
/// constructed, the data it points at is never mutated — [`PlatformContext::append`]
/// builds a *new* backing vector rather than mutating the one a live
/// snapshot might be holding.
#[derive(Debug, Clone)]
pub struct ContextSnapshot {
    capabilities: Arc<Vec<(Capability, Value)>>,
    configs: Arc<Vec<(String, Value)>>,
}

impl ContextSnapshot {
    /// The most recently published payload for `capability`, if any adapter
    /// preceding the snapshot's creation provided it. Capabilities are
    /// unique producers, so "most recent" and "unique" coincide in any
    /// valid plan; this still picks the last entry defensively in case a
    /// caller constructs a snapshot outside the normal render pipeline.
    pub fn get_capability(&self, capability: Capability) -> Option<&Value> {
        self.capabilities
            .iter()
            .rev()
            .find(|(cap, _)| *cap == capability)
            .map(|(_, payload)| payload)
    }

    /// The raw validated configuration for `adapter_name`, if it was
    /// selected in the platform config.
    pub fn get_config(&self, adapter_name: &str) -> Option<&Value> {
        self.configs
            .iter()
            .find(|(name, _)| name == adapter_name)
            .map(|(_, value)| value)
    }

    /// Every capability published so far, in publication order. Used by
    /// diagnostics and by adapters that legitimately consume more than one
    /// capability.
    pub fn capabilities(&self) -> impl Iterator<Item = (Capability, &Value)> {
        self.capabilities.iter().map(|(cap, v)| (*cap, v))
    }
}

/// The mutable store the render pipeline owns for the duration of one
/// render. Adapters never see this type directly — only the
/// [`ContextSnapshot`] captured just before their `render` call.
#[derive(Debug, Default)]
pub struct PlatformContext {
    capabilities: Vec<(Capability, Value)>,
    configs: Vec<(String, Value)>,
}

impl PlatformContext {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seeds the context with every selected adapter's validated
    /// configuration, before any adapter has rendered.
    pub fn with_configs(configs: Vec<(String, Value)>) -> Self {
        Self {
            capabilities: Vec::new(),
            configs,
        }
    }

    /// Captures an immutable view of the context as it stands right now.
    /// Cheap: clones two `Arc`s over the current backing vectors.
    pub fn snapshot(&self) -> ContextSnapshot {
        ContextSnapshot {
            capabilities: Arc::new(self.capabilities.clone()),
            configs: Arc::new(self.configs.clone()),
        }
    }

    /// Publishes an adapter's validated capability payloads. Called by the
    /// execution host only after [`crate::capability::CapabilityRegistry::validate`]
    /// has accepted every entry.
    pub fn append(&mut self, payloads: impl IntoIterator<Item = (Capability, Value)>) {
        self.capabilities.extend(payloads);
    }
}
