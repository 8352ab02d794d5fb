// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Logging Setup
//!
//! Installs the process-wide [`tracing`] subscriber. Two output shapes are
//! supported: human-readable for an operator's terminal, and line-delimited
//! JSON for CI/log-aggregation pipelines, selected by `ZTC_LOG_FORMAT=json`.
//! The level filter honors `RUST_LOG` first (the usual `tracing` convention)
//! and otherwise defaults to `info`, or `debug` when `--verbose` is passed.

use tracing_subscriber::layer::SubscriberExt;
use tracing_subscriber::util::SubscriberInitExt;
use tracing_subscriber::{fmt, EnvFilter, Layer, Registry};

/// Installs the global subscriber. Safe to call at most once per process;
/// `main` is the only caller.
pub fn init_logging(verbose: bool) -> anyhow::Result<()> {
    let default_level = if verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let json_format = std::env::var("ZTC_LOG_FORMAT")
        .map(|v| v.eq_ignore_ascii_case("json"))
        .unwrap_or(false);

    let fmt_layer: Box<dyn Layer<Registry> + Send + Sync> = if json_format {
        Box::new(fmt::layer().json().with_target(true))
    } else {
        Box::new(fmt::layer().with_target(false).without_time())
    };

    Registry::default()
        .with(filter)
        .with(fmt_layer)
        .try_init()
        .map_err(|err| anyhow::anyhow!("failed to install logging subscriber: {err}"))
}
