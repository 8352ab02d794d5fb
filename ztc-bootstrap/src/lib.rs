// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Bootstrap Module
//!
//! Sits outside the engine's composition/application layers (in the `ztc`
//! crate) and owns everything that must run before or below them:
//!
//! - **Entry point** - CLI parsing and validation
//! - **Platform abstraction** - OS-specific operations (POSIX vs Windows)
//! - **Signal handling** - graceful shutdown (SIGTERM, SIGINT, SIGHUP)
//! - **Secure workspace** - the per-run scratch directory stage execution
//!   happens in
//! - **Script extraction** - copying embedded script trees into that
//!   workspace
//! - **Stage execution** - the bootstrap pipeline's state machine, barrier
//!   waits, retries, and cancellation
//! - **Vacuum** - reclaiming orphaned workspaces from prior runs
//! - **Exit codes** - the stable process exit code table (§6)
//!
//! `ztc` depends on this crate (for its CLI surface and its executor) and on
//! `ztc-domain` (for the shared data model); this crate depends only on
//! `ztc-domain`, so there is no cycle.
//!
//! ## Usage
//!
//! ```no_run
//! use ztc_bootstrap::{bootstrap_cli, ExitCode};
//!
//! #[tokio::main]
//! async fn main() -> std::process::ExitCode {
//!     let validated_cli = match bootstrap_cli() {
//!         Ok(cli) => cli,
//!         Err(e) => {
//!             eprintln!("{e}");
//!             return std::process::ExitCode::from(ExitCode::ConfigError.code() as u8);
//!         }
//!     };
//!
//!     let _ = validated_cli;
//!     std::process::ExitCode::from(ExitCode::Success.code() as u8)
//! }
//! ```

pub mod barrier;
pub mod cache;
pub mod cli;
pub mod exit_code;
pub mod executor;
pub mod extractor;
pub mod logger;
pub mod platform;
pub mod shutdown;
pub mod signals;
pub mod vacuum;
pub mod workspace;

pub use cli::{parse_and_validate, ValidatedCli, ValidatedCommand};
pub use exit_code::{map_error_to_exit_code, ExitCode};

/// Parses and validates CLI arguments; this is the bootstrap layer's
/// entry point into the rest of the engine. Clap handles `--help` and
/// `--version` itself and exits the process for those.
pub fn bootstrap_cli() -> Result<ValidatedCli, cli::ParseError> {
    cli::parse_and_validate()
}
