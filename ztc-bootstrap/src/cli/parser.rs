// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # CLI Parser
//!
//! Command-line interface parsing using clap (§6's abstract CLI surface).
//! Security validation happens in [`super::validator`] after parsing.

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug, Clone)]
#[command(name = "ztc")]
#[command(about = concat!("ZTC bare-metal Kubernetes bootstrap engine v", env!("CARGO_PKG_VERSION")))]
#[command(version)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Enable verbose logging
    #[arg(short, long)]
    pub verbose: bool,

    /// Platform root directory (holds platform.yaml, platform/lock.json,
    /// platform/generated/). Defaults to the current directory.
    #[arg(short, long)]
    pub platform_root: Option<PathBuf>,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Commands {
    /// Interactively build platform.yaml
    Init,

    /// Render adapters to generated/ and write the lock file
    Render {
        /// Emit the extracted script tree under generated/debug/scripts/
        #[arg(long)]
        debug: bool,

        /// Render only the named adapters, comma-separated
        #[arg(long, value_delimiter = ',')]
        partial: Vec<String>,
    },

    /// Check the lock file against the live generated tree
    Validate,

    /// Execute the rendered pipeline
    Bootstrap {
        /// Name of the environment profile to run
        #[arg(long)]
        env: Option<String>,

        /// Ignore the stage cache and re-run every stage
        #[arg(long)]
        skip_cache: bool,
    },

    /// Extract scripts, pipeline, and a README for manual execution
    Eject {
        /// Destination directory; defaults to ./ejected
        #[arg(long)]
        output: Option<PathBuf>,
    },

    /// Reclaim orphaned secure workspaces
    Vacuum,

    /// Print engine and adapter versions
    Version,
}

/// Entry point for CLI parsing. Clap exits the process with a usage message
/// if parsing fails.
pub fn parse_cli() -> Cli {
    Cli::parse()
}
