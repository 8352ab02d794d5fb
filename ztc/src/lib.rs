// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ZTC Composition Engine
//!
//! Wires the pure domain model (`ztc-domain`) and the bootstrap layer
//! (`ztc-bootstrap`) together into the engine a user actually runs: adapter
//! registry and built-ins, the render pipeline, and the use cases the CLI
//! dispatches into.

pub mod adapters;
pub mod application;
pub mod capability;
pub mod infrastructure;
pub mod render;
