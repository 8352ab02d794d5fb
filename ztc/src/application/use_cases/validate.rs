// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Validate Use Case
//!
//! Detects drift (§4.9, §6 exit code 2) between `lock.json` and the live
//! `platform.yaml`/`generated/` tree without rendering anything. An engine
//! version newer than the one recorded in the lock is its own error
//! ([`ZtcError::EngineVersionTooNew`], Open Question (a), §9); a lock naming
//! an *older* engine is only reported, never rejected.

use std::path::PathBuf;

use anyhow::{Context, Result};
use tracing::info;
use ztc_domain::{DriftKind, ZtcError};

use crate::infrastructure::config::load_platform_config;
use crate::render::{hasher, lock_file};

pub struct ValidateUseCase;

impl ValidateUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self, platform_root: PathBuf) -> Result<()> {
        info!("Validating platform at {}", platform_root.display());

        let record = lock_file::read(&platform_root.join("lock.json"))
            .await
            .context("reading lock.json — has `ztc render` ever been run?")?;

        let config = load_platform_config(&platform_root.join("platform.yaml"))?;
        let live_platform_hash = hasher::platform_hash(&config)?;
        let live_artifacts_hash = {
            let entries = hasher::hash_tree(&platform_root.join("generated")).await?;
            hasher::combine_artifacts_hash(&entries)
        };

        let drift = lock_file::validate(
            &record,
            &live_platform_hash,
            &live_artifacts_hash,
            env!("CARGO_PKG_VERSION"),
        )
        .await?;

        if drift.is_empty() {
            println!("✅ No drift detected");
            return Ok(());
        }

        for kind in &drift {
            match kind {
                DriftKind::PlatformModified => {
                    println!("⚠️  platform.yaml has changed since the last render");
                }
                DriftKind::ArtifactsModified => {
                    println!("⚠️  generated/ has been modified since the last render");
                }
                DriftKind::EngineMismatch => {
                    println!("⚠️  lock.json was written by a different engine version");
                }
            }
        }

        if drift.contains(&DriftKind::PlatformModified) {
            return Err(ZtcError::HashMismatchPlatform.into());
        }
        if drift.contains(&DriftKind::ArtifactsModified) {
            return Err(ZtcError::HashMismatchArtifacts.into());
        }

        // Only an engine mismatch was found; that is informational, not fatal.
        Ok(())
    }
}

impl Default for ValidateUseCase {
    fn default() -> Self {
        Self::new()
    }
}
