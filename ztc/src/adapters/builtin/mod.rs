// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Built-in adapter implementations. Each adapter embeds its own script tree
//! via `include_dir!` so the binary is fully self-contained — no runtime
//! plugin loading, per the engine's Non-goals.

mod cilium;
mod gateway;
mod hetzner;
mod sops;
mod talos;

use std::path::Path;
use std::sync::Arc;

use include_dir::Dir;
use ztc_domain::Adapter;

/// Every built-in adapter, in no particular order — the resolver is
/// responsible for ordering, not this list.
pub fn all() -> Vec<Arc<dyn Adapter>> {
    vec![
        Arc::new(hetzner::HetznerAdapter::new()),
        Arc::new(talos::TalosAdapter::new()),
        Arc::new(cilium::CiliumAdapter::new()),
        Arc::new(gateway::GatewayAdapter::new()),
        Arc::new(sops::SopsAdapter::new()),
    ]
}

/// The embedded script tree for each built-in adapter, keyed by adapter
/// name. Used both by [`crate::adapters::registry::AdapterRegistry`] for
/// static validation and by the script extractor to materialize files into
/// the bootstrap workspace.
fn tree_for(name: &str) -> Option<&'static Dir<'static>> {
    match name {
        "hetzner" => Some(&hetzner::SCRIPTS),
        "talos" => Some(&talos::SCRIPTS),
        "cilium" => Some(&cilium::SCRIPTS),
        "gateway" => Some(&gateway::SCRIPTS),
        "sops" => Some(&sops::SCRIPTS),
        _ => None,
    }
}

/// Resolves `relative_path` within `adapter_name`'s embedded tree, returning
/// the file's contents if it exists.
///
/// `relative_path` comes from [`ztc_domain::ScriptReference::relative_path`],
/// which is `package_path.join(resource_name)`; every built-in adapter sets
/// its own name as `package_path`, so that leading component is stripped
/// here before the lookup — `tree_for` already roots each `Dir` at that
/// adapter's own script directory.
pub fn resolve_script(adapter_name: &str, relative_path: &Path) -> Option<&'static [u8]> {
    let tree = tree_for(adapter_name)?;
    let within_tree = relative_path.strip_prefix(adapter_name).unwrap_or(relative_path);
    tree.get_file(within_tree).map(|f| f.contents())
}
