// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Render Use Case
//!
//! The central orchestration of the engine: loads `platform.yaml`, resolves
//! the adapter render order, runs every adapter through the
//! [`ExecutionHost`](crate::render::ExecutionHost), writes the results into
//! a staging tree (`generated.new/`), and — unless `--debug` keeps the
//! staging tree around for inspection — promotes it live with the atomic
//! swap (§4.10) and writes the lock file (§4.9).
//!
//! ## `--partial`
//!
//! Every selected adapter is always re-rendered so the capability context
//! stays consistent (`Adapter::render` is a pure, synchronous function —
//! re-running it costs nothing resembling real infrastructure work). What
//! `--partial` restricts is which adapters' manifests are considered fresh:
//! adapters outside the list have their existing live subtree copied forward
//! into the staging tree unchanged, rather than overwritten, and only the
//! partial subset is recorded in `LockRecord::rendered_adapters` (Open
//! Question (b), §9).

use std::collections::HashSet;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context, Result};
use chrono::Utc;
use tracing::{info, warn};
use ztc_domain::{resolve, AdapterDescriptor, CapabilityRegistry, Capability, PlatformContext, ZtcError};

use crate::adapters::registry::AdapterRegistry;
use crate::infrastructure::config::{load_platform_config, validate_adapter_input};
use crate::render::execution_host::ExecutedAdapter;
use crate::render::{hasher, lock_file, pipeline_generator, ExecutionHost};
use crate::render::atomic_swap;
use crate::render::artifact_writer::ArtifactWriter;

pub struct RenderUseCase;

impl RenderUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, platform_root: PathBuf, debug: bool, partial: Vec<String>) -> Result<()> {
        info!("Rendering platform at {}", platform_root.display());
        let result = self.try_render(&platform_root, debug, &partial).await;
        if result.is_err() {
            atomic_swap::discard_failed_render(&platform_root)
                .await
                .context("discarding failed render's staging tree")?;
        }
        result
    }

    async fn try_render(&self, platform_root: &Path, debug: bool, partial: &[String]) -> Result<()> {
        let config_path = platform_root.join("platform.yaml");
        let config = load_platform_config(&config_path)?;

        let registry = AdapterRegistry::discover()?;
        let capability_registry = Arc::new(CapabilityRegistry::new());
        let host = ExecutionHost::new(capability_registry.clone());

        let selected: Vec<String> = config.selected_adapters().map(String::from).collect();
        let descriptors = registry.descriptors(&selected)?;
        let plan = resolve(&descriptors)?;

        let render_set: HashSet<String> = if partial.is_empty() {
            selected.iter().cloned().collect()
        } else {
            for name in partial {
                if !selected.contains(name) {
                    bail!("--partial names '{name}', which is not selected in platform.yaml");
                }
            }
            partial.iter().cloned().collect()
        };

        let configs: Vec<(String, serde_json::Value)> = selected
            .iter()
            .map(|name| (name.clone(), config.adapter_config(name).cloned().unwrap_or(serde_json::Value::Null)))
            .collect();
        let mut context = PlatformContext::with_configs(configs);

        let mut executed: Vec<ExecutedAdapter> = Vec::with_capacity(plan.order.len());
        for name in &plan.order {
            let descriptor = find_descriptor(&descriptors, name)?;
            let adapter = registry.get(name)?;
            let adapter_config = config.adapter_config(name).cloned().unwrap_or(serde_json::Value::Null);
            validate_adapter_input(name, adapter.input_schema(), &adapter_config)
                .map_err(|e| anyhow::anyhow!(e.to_string()))?;

            info!(adapter = %name, phase = %descriptor.phase.as_str(), "rendering adapter");
            let result = host
                .execute(adapter, adapter_config, descriptor.phase.as_str(), &mut context)
                .await
                .with_context(|| format!("rendering adapter '{name}'"))?;
            executed.push(result);
        }

        let new_manifests: Vec<(PathBuf, Vec<u8>)> = executed
            .iter()
            .filter(|e| render_set.contains(&e.adapter_name))
            .flat_map(|e| e.manifests.iter().cloned())
            .map(|(path, bytes)| (remap_to_staging(&path), bytes))
            .collect();

        let mut writer = ArtifactWriter::new();
        writer.write_all(platform_root, &new_manifests).await?;

        for descriptor in &descriptors {
            if render_set.contains(descriptor.name) {
                continue;
            }
            copy_forward_adapter(platform_root, descriptor).await?;
        }

        let per_adapter_stages: Vec<_> = executed.iter().map(|e| e.stages.clone()).collect();
        let pipeline = pipeline_generator::generate(per_adapter_stages)?;
        write_pipeline_yaml(platform_root, &pipeline).await?;

        if debug {
            println!(
                "🔍 Debug render staged at {} (live tree left untouched)",
                platform_root.join("generated.new").display()
            );
            return Ok(());
        }

        let staging_root = platform_root.join("generated.new");
        let artifacts_hash = combine_tree_hash(&staging_root).await?;
        let platform_hash = hasher::platform_hash(&config)?;

        let adapters = descriptors
            .iter()
            .map(|d| {
                (
                    d.name.to_string(),
                    lock_file::LockedAdapter {
                        version: d.version.to_string(),
                        phase: d.phase.as_str().to_string(),
                        provides: capability_names(&d.provides),
                        requires: capability_names(&d.requires),
                    },
                )
            })
            .collect();

        let record = lock_file::LockRecord {
            engine_version: env!("CARGO_PKG_VERSION").to_string(),
            platform_hash,
            artifacts_hash,
            generated_at: Utc::now(),
            adapters,
            rendered_adapters: render_set.into_iter().collect(),
        };

        atomic_swap::swap(platform_root).await?;
        lock_file::write(&platform_root.join("lock.json"), &record).await?;

        println!("✅ Rendered {} adapter(s) to {}", selected.len(), platform_root.join("generated").display());
        Ok(())
    }
}

impl Default for RenderUseCase {
    fn default() -> Self {
        Self::new()
    }
}

fn find_descriptor<'a>(descriptors: &'a [AdapterDescriptor], name: &str) -> Result<&'a AdapterDescriptor> {
    descriptors
        .iter()
        .find(|d| d.name == name)
        .ok_or_else(|| anyhow::anyhow!(ZtcError::AdapterNotFound(name.to_string())))
}

fn capability_names(capabilities: &[Capability]) -> Vec<String> {
    capabilities.iter().map(|c| c.to_string()).collect()
}

/// Rewrites a manifest path's leading `generated/` component to
/// `generated.new/`, the staging tree the atomic swap promotes.
fn remap_to_staging(path: &Path) -> PathBuf {
    let mut components = path.components();
    match components.next() {
        Some(std::path::Component::Normal(first)) if first == "generated" => {
            PathBuf::from("generated.new").join(components.as_path())
        }
        _ => PathBuf::from("generated.new").join(path),
    }
}

async fn copy_forward_adapter(platform_root: &Path, descriptor: &AdapterDescriptor) -> Result<()> {
    let relative = Path::new("generated").join(descriptor.phase.as_str()).join(descriptor.name);
    let source = platform_root.join(&relative);
    if !source.exists() {
        return Ok(());
    }
    let dest = platform_root.join("generated.new").join(
        Path::new(descriptor.phase.as_str()).join(descriptor.name),
    );
    copy_dir_recursive(&source, &dest).await
}

fn copy_dir_recursive<'a>(source: &'a Path, dest: &'a Path) -> std::pin::Pin<Box<dyn std::future::Future<Output = Result<()>> + Send + 'a>> {
    Box::pin(async move {
        tokio::fs::create_dir_all(dest).await?;
        let mut entries = tokio::fs::read_dir(source).await?;
        while let Some(entry) = entries.next_entry().await? {
            let entry_path = entry.path();
            let dest_path = dest.join(entry.file_name());
            if entry.file_type().await?.is_dir() {
                copy_dir_recursive(&entry_path, &dest_path).await?;
            } else {
                tokio::fs::copy(&entry_path, &dest_path).await?;
            }
        }
        Ok(())
    })
}

async fn write_pipeline_yaml(platform_root: &Path, pipeline: &[ztc_domain::PipelineStage]) -> Result<()> {
    let path = platform_root.join("generated.new").join("pipeline.yaml");
    if let Some(parent) = path.parent() {
        tokio::fs::create_dir_all(parent).await?;
    }
    let yaml = serde_yaml::to_string(pipeline).context("serializing pipeline.yaml")?;
    tokio::fs::write(&path, yaml).await.context("writing pipeline.yaml")?;
    Ok(())
}

async fn combine_tree_hash(root: &Path) -> Result<String> {
    let entries = hasher::hash_tree(root).await?;
    Ok(hasher::combine_artifacts_hash(&entries))
}
