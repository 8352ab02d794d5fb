// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Reclaims orphaned secure workspaces left behind by bootstrap runs that
//! never cleaned up after themselves (crashed, killed, or ran with
//! `ZTC_DEBUG` set) — a thin driver over [`ztc_bootstrap::vacuum::vacuum`].

use anyhow::Result;
use tracing::info;
use ztc_bootstrap::platform::create_platform;
use ztc_bootstrap::vacuum::{vacuum, DEFAULT_AGE_THRESHOLD};

pub struct VacuumUseCase;

impl VacuumUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        let platform = create_platform();
        let temp_root = platform.temp_dir();
        info!("Vacuuming orphaned workspaces under {}", temp_root.display());

        let report = tokio::task::spawn_blocking(move || vacuum(&temp_root, DEFAULT_AGE_THRESHOLD))
            .await
            .map_err(|e| anyhow::anyhow!("vacuum task panicked: {e}"))??;

        println!("🧹 Removed {} orphaned workspace(s)", report.removed.len());
        for path in &report.removed {
            println!("   - {}", path.display());
        }
        if !report.retained.is_empty() {
            println!("   {} workspace(s) still active or too young to reclaim", report.retained.len());
        }
        Ok(())
    }
}

impl Default for VacuumUseCase {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn runs_without_error_against_an_empty_cache_root() {
        let dir = tempfile::tempdir().unwrap();
        std::env::set_var("ZTC_CACHE_DIR", dir.path());
        let result = VacuumUseCase::new().execute().await;
        std::env::remove_var("ZTC_CACHE_DIR");
        result.unwrap();
    }
}
