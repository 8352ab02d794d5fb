// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Application Layer
//!
//! One use case per CLI command (§6). Each use case owns the orchestration
//! for its command — loading configuration, driving the domain and render
//! layers, reporting progress — and is the only layer `main` talks to.

pub mod use_cases;
