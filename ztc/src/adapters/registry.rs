// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Adapter Registry (C2)
//!
//! Discovers the built-in adapters, guarantees name uniqueness, and
//! statically validates that every script reference an adapter declares
//! resolves to an embedded file before the engine ever attempts a render.
//! Adapters are compiled in; there is no runtime plugin loading (§1
//! Non-goals), so "discovery" here means iterating a fixed, build-time list.

use std::collections::BTreeMap;
use std::sync::Arc;

use parking_lot::RwLock;
use ztc_domain::{Adapter, AdapterDescriptor, ZtcError};

/// Holds every built-in adapter, keyed by name. Built once per invocation
/// (§3 Lifecycles) and read-only afterward; the inner `RwLock` exists only
/// because `Adapter` trait objects are looked up from async call sites that
/// also hold a `ContextSnapshot`, mirroring the teacher's interior-mutability
/// pattern for shared runtime state rather than because this registry is
/// ever actually mutated after construction.
pub struct AdapterRegistry {
    adapters: RwLock<BTreeMap<&'static str, Arc<dyn Adapter>>>,
}

impl AdapterRegistry {
    /// Registers every built-in adapter and validates each one's script
    /// references against its embedded tree. Fails fast with
    /// `DuplicateAdapter` or a missing-resource error rather than
    /// discovering either at render time.
    pub fn discover() -> Result<Self, ZtcError> {
        let registry = Self {
            adapters: RwLock::new(BTreeMap::new()),
        };
        for adapter in crate::adapters::builtin::all() {
            registry.register(adapter)?;
        }
        Ok(registry)
    }

    fn register(&self, adapter: Arc<dyn Adapter>) -> Result<(), ZtcError> {
        let name = adapter.metadata().name;
        validate_script_references(adapter.as_ref())?;

        let mut adapters = self.adapters.write();
        if adapters.contains_key(name) {
            return Err(ZtcError::DuplicateAdapter(name.to_string()));
        }
        adapters.insert(name, adapter);
        Ok(())
    }

    pub fn get(&self, name: &str) -> Result<Arc<dyn Adapter>, ZtcError> {
        self.adapters
            .read()
            .get(name)
            .cloned()
            .ok_or_else(|| ZtcError::AdapterNotFound(name.to_string()))
    }

    pub fn descriptors(&self, names: &[String]) -> Result<Vec<AdapterDescriptor>, ZtcError> {
        names
            .iter()
            .map(|name| self.get(name).map(|a| a.metadata().clone()))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.adapters.read().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Confirms every script reference an adapter can produce resolves to a
/// real file in its embedded tree. Called once at registration time so a
/// packaging mistake (an adapter referencing a script that was never
/// embedded) surfaces at startup rather than mid-render.
fn validate_script_references(adapter: &dyn Adapter) -> Result<(), ZtcError> {
    let name = adapter.metadata().name;
    let all_scripts = adapter
        .pre_work_scripts()
        .into_iter()
        .chain(adapter.bootstrap_scripts())
        .chain(adapter.post_work_scripts())
        .chain(adapter.validation_scripts());

    for script in all_scripts {
        if crate::adapters::builtin::resolve_script(name, &script.relative_path()).is_none() {
            return Err(ZtcError::Internal(format!(
                "adapter {name} declares script {} with no embedded resource",
                script.relative_path().display()
            )));
        }
    }
    Ok(())
}
