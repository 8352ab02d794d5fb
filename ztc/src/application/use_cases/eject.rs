// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Eject Use Case
//!
//! Extracts the rendered pipeline into a standalone tree an operator can
//! read and run without this engine at all: `<output>/scripts/<adapter>/…`,
//! `<output>/pipeline.yaml`, and a `<output>/README.md` walking through the
//! stage order by hand. This intentionally does *not* write through
//! `generated.new`/the atomic swap (§9, layout decisions) — eject is a
//! one-shot extraction for an operator working outside ZTC, and routing it
//! through the live tree's swap machinery would fight that tree's
//! atomicity guarantee for no benefit.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use ztc_domain::PipelineStage;

use crate::adapters::builtin::resolve_script;

pub struct EjectUseCase;

impl EjectUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, platform_root: PathBuf, output: PathBuf) -> Result<()> {
        info!("Ejecting platform at {} to {}", platform_root.display(), output.display());

        let pipeline_path = platform_root.join("generated").join("pipeline.yaml");
        let pipeline_yaml = tokio::fs::read_to_string(&pipeline_path)
            .await
            .with_context(|| format!("reading {} — run `ztc render` first", pipeline_path.display()))?;
        let pipeline: Vec<PipelineStage> =
            serde_yaml::from_str(&pipeline_yaml).context("parsing pipeline.yaml")?;

        tokio::fs::create_dir_all(&output)
            .await
            .with_context(|| format!("creating output directory {}", output.display()))?;

        for stage in &pipeline {
            let prefixed = stage.script.relative_path();
            let contents = resolve_script(&stage.adapter, &prefixed).ok_or_else(|| {
                anyhow::anyhow!("stage '{}' references {} with no embedded script", stage.name, prefixed.display())
            })?;

            let dest = output.join("scripts").join(&stage.adapter).join(&stage.script.resource_name);
            if let Some(parent) = dest.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&dest, contents).await.with_context(|| format!("writing {}", dest.display()))?;
            #[cfg(unix)]
            {
                use std::os::unix::fs::PermissionsExt;
                tokio::fs::set_permissions(&dest, std::fs::Permissions::from_mode(0o755)).await?;
            }
        }

        tokio::fs::write(output.join("pipeline.yaml"), &pipeline_yaml)
            .await
            .context("writing pipeline.yaml")?;

        let readme = render_readme(&pipeline);
        tokio::fs::write(output.join("README.md"), readme)
            .await
            .context("writing README.md")?;

        println!("✅ Ejected {} stage(s) to {}", pipeline.len(), output.display());
        Ok(())
    }
}

impl Default for EjectUseCase {
    fn default() -> Self {
        Self::new()
    }
}

fn render_readme(pipeline: &[PipelineStage]) -> String {
    let mut out = String::new();
    out.push_str("# Ejected ZTC Pipeline\n\n");
    out.push_str(
        "This tree was extracted with `ztc eject` and runs independently of the ztc \
         binary. Scripts are under `scripts/<adapter>/`; run them in the order below, \
         each with its stage's JSON context available via the `ZTC_CONTEXT_FILE` \
         environment variable if it needs one.\n\n",
    );
    out.push_str("## Stage order\n\n");
    for (index, stage) in pipeline.iter().enumerate() {
        out.push_str(&format!(
            "{}. **{}** ({}, barrier: {}) — `scripts/{}/{}`\n",
            index + 1,
            stage.name,
            stage.adapter,
            stage.barrier.as_str(),
            stage.adapter,
            stage.script.resource_name,
        ));
        if !stage.description.is_empty() {
            out.push_str(&format!("   {}\n", stage.description));
        }
    }
    out
}
