// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Init Use Case
//!
//! Scaffolds a new `platform.yaml` at the platform root (§6). Never
//! overwrites an existing file — an operator who runs `ztc init` twice by
//! mistake should not lose their edits.

use std::path::PathBuf;

use anyhow::{bail, Context, Result};
use tracing::info;

const SKELETON: &str = r#"version: "1"
platform:
  organization: "example"
  app_name: "edge"
adapters:
  hetzner:
    provider: "hetzner"
    region: "fsn1"
  talos:
    version: "1.8"
  cilium:
    version: "1.16"
  gateway:
    class: "cilium"
  sops:
    key_backend: "age"
"#;

pub struct InitUseCase;

impl InitUseCase {
    pub fn new() -> Self {
        Self
    }

    /// Writes `platform.yaml` under `platform_root`. Fails if the file
    /// already exists.
    pub async fn execute(&self, platform_root: PathBuf) -> Result<()> {
        let path = platform_root.join("platform.yaml");
        info!("Initializing platform config at {}", path.display());

        if path.exists() {
            bail!(
                "{} already exists; remove it first if you want to re-scaffold",
                path.display()
            );
        }

        tokio::fs::create_dir_all(&platform_root)
            .await
            .with_context(|| format!("creating platform root {}", platform_root.display()))?;
        tokio::fs::write(&path, SKELETON)
            .await
            .with_context(|| format!("writing {}", path.display()))?;

        println!("✅ Wrote {}", path.display());
        println!("   Edit it, then run `ztc render` to generate the artifact tree.");
        Ok(())
    }
}

impl Default for InitUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_skeleton_when_absent() {
        let dir = tempfile::tempdir().unwrap();
        InitUseCase::new().execute(dir.path().to_path_buf()).await.unwrap();
        let contents = tokio::fs::read_to_string(dir.path().join("platform.yaml")).await.unwrap();
        assert!(contents.contains("organization"));
    }

    #[tokio::test]
    async fn refuses_to_overwrite() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("platform.yaml");
        tokio::fs::write(&path, "custom: true\n").await.unwrap();

        let err = InitUseCase::new().execute(dir.path().to_path_buf()).await.unwrap_err();
        assert!(err.to_string().contains("already exists"));
        let contents = tokio::fs::read_to_string(&path).await.unwrap();
        assert_eq!(contents, "custom: true\n");
    }
}
