// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Use Case
//!
//! Replays `generated/pipeline.yaml` against a freshly extracted secure
//! workspace (§4.11–§4.13): resolves every stage's embedded script, extracts
//! it, then hands the pipeline to [`BootstrapExecutor`]. Listens for
//! SIGTERM/SIGINT/SIGHUP concurrently with the run so a signal cancels the
//! in-flight stage cleanly rather than leaving a half-written cache entry
//! (P8).
//!
//! `--env` names an environment profile (`environments/<env>.yaml` under the
//! platform root) mapping barrier names to the shell command that probes
//! them; an unconfigured or absent profile falls back to
//! [`AlwaysReadyProbe`], since the concrete barrier checks (did the rescue
//! system come up, is the cluster API reachable) are inherently
//! environment-specific and outside this engine's own knowledge.

use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use tracing::info;
use ztc_domain::{Barrier, PipelineStage};

use ztc_bootstrap::barrier::{AlwaysReadyProbe, BarrierProbe, CommandBarrierProbe};
use ztc_bootstrap::extractor::{ScriptExtractor, StageScript};
use ztc_bootstrap::platform::create_platform;
use ztc_bootstrap::shutdown::ShutdownCoordinator;
use ztc_bootstrap::signals::create_signal_handler;
use ztc_bootstrap::workspace::SecureWorkspace;
use ztc_bootstrap::executor::{BootstrapExecutor, StageOutcome};

use crate::adapters::builtin::resolve_script;

const SHUTDOWN_GRACE_PERIOD: Duration = Duration::from_secs(10);

pub struct BootstrapUseCase;

impl BootstrapUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, platform_root: PathBuf, env: Option<String>, skip_cache: bool) -> Result<()> {
        info!("Bootstrapping platform at {}", platform_root.display());

        let pipeline_path = platform_root.join("generated").join("pipeline.yaml");
        let pipeline_yaml = tokio::fs::read_to_string(&pipeline_path)
            .await
            .with_context(|| format!("reading {} — run `ztc render` first", pipeline_path.display()))?;
        let pipeline: Vec<PipelineStage> =
            serde_yaml::from_str(&pipeline_yaml).context("parsing pipeline.yaml")?;

        let scripts = resolve_stage_scripts(&pipeline)?;

        let platform = create_platform();
        let preserve = std::env::var("ZTC_DEBUG").is_ok();
        let workspace = SecureWorkspace::create(platform.as_ref(), preserve)
            .map_err(|e| anyhow::anyhow!("creating secure workspace: {e}"))?;

        let manifest = ScriptExtractor::extract(&workspace, platform.as_ref(), &scripts)
            .map_err(|e| anyhow::anyhow!("extracting bootstrap scripts: {e}"))?;

        let probe = load_barrier_probe(&platform_root, env.as_deref()).await;

        let coordinator = Arc::new(ShutdownCoordinator::new(SHUTDOWN_GRACE_PERIOD));
        let signal_handler = create_signal_handler();
        let signal_coordinator = coordinator.clone();
        let signal_task = tokio::spawn(async move {
            signal_handler
                .wait_for_signal(Box::new(move || signal_coordinator.initiate_shutdown()))
                .await;
        });

        let executor = BootstrapExecutor::new(
            &workspace,
            platform.as_ref(),
            probe.as_ref(),
            &manifest,
            coordinator.token(),
            skip_cache,
        );

        let outcomes = executor.run(&pipeline).await?;
        signal_task.abort();

        let cancelled = outcomes.iter().any(|(_, outcome)| *outcome == StageOutcome::Cancelled);
        for (name, outcome) in &outcomes {
            let marker = match outcome {
                StageOutcome::Succeeded => "✅",
                StageOutcome::SkippedCached => "⏭️ ",
                StageOutcome::Cancelled => "🛑",
            };
            println!("{marker} {name}");
        }

        if cancelled {
            return Err(ztc_domain::ZtcError::Cancelled.into());
        }

        println!("✅ Bootstrap complete ({} stage(s))", outcomes.len());
        Ok(())
    }
}

impl Default for BootstrapUseCase {
    fn default() -> Self {
        Self::new()
    }
}

/// Resolves each pipeline stage's script reference against the built-in
/// adapters' embedded trees. The extractor's own `relative_path` is the path
/// *within* the adapter's tree (`script.resource_name`, e.g.
/// `bootstrap/install.sh`); the adapter-prefixed form
/// (`script.relative_path()`, e.g. `talos/bootstrap/install.sh`) is only
/// what `resolve_script` needs to find the embedded bytes.
fn resolve_stage_scripts(pipeline: &[PipelineStage]) -> Result<Vec<StageScript>> {
    pipeline
        .iter()
        .map(|stage| {
            let prefixed = stage.script.relative_path();
            let contents = resolve_script(&stage.adapter, &prefixed).ok_or_else(|| {
                anyhow::anyhow!(
                    "stage '{}' references {} with no embedded script",
                    stage.name,
                    prefixed.display()
                )
            })?;
            Ok(StageScript {
                stage: stage.name.clone(),
                adapter: stage.adapter.clone(),
                relative_path: PathBuf::from(&stage.script.resource_name),
                contents,
            })
        })
        .collect()
}

async fn load_barrier_probe(platform_root: &Path, env: Option<&str>) -> Box<dyn BarrierProbe> {
    let Some(env) = env else {
        return Box::new(AlwaysReadyProbe);
    };

    let profile_path = platform_root.join("environments").join(format!("{env}.yaml"));
    let Ok(raw) = tokio::fs::read_to_string(&profile_path).await else {
        return Box::new(AlwaysReadyProbe);
    };
    let Ok(commands) = serde_yaml::from_str::<std::collections::BTreeMap<String, String>>(&raw) else {
        return Box::new(AlwaysReadyProbe);
    };

    let mapped: Vec<(Barrier, String)> = commands
        .into_iter()
        .filter_map(|(name, command)| barrier_from_str(&name).map(|barrier| (barrier, command)))
        .collect();

    Box::new(CommandBarrierProbe::new(mapped))
}

fn barrier_from_str(name: &str) -> Option<Barrier> {
    [
        Barrier::None,
        Barrier::Local,
        Barrier::RescueReady,
        Barrier::ClusterInstalled,
        Barrier::ClusterAccessible,
        Barrier::CniReady,
        Barrier::GitopsReady,
    ]
    .into_iter()
    .find(|barrier| barrier.as_str() == name)
}
