// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Infrastructure Layer
//!
//! The outer ring: platform configuration loading and the process-wide
//! logging setup. Everything in [`crate::application`] depends on this
//! layer; this layer depends on nothing above it.

pub mod config;
pub mod logging;

pub use config::{load_platform_config, validate_adapter_input, ConfigError};
pub use logging::init_logging;
