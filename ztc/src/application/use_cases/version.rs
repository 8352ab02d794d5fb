// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Prints the engine version and the version of every built-in adapter.

use anyhow::Result;

use crate::adapters::builtin;

pub struct VersionUseCase;

impl VersionUseCase {
    pub fn new() -> Self {
        Self
    }

    pub async fn execute(&self) -> Result<()> {
        println!("ztc {}", env!("CARGO_PKG_VERSION"));
        println!("adapters:");
        for adapter in builtin::all() {
            let descriptor = adapter.metadata();
            println!(
                "  {:<10} {:<8} ({})",
                descriptor.name, descriptor.version, descriptor.display_name
            );
        }
        Ok(())
    }
}

impl Default for VersionUseCase {
    fn default() -> Self {
        Self::new()
    }
}
