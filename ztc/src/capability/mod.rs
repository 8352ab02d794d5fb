// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! Re-exports of the pure capability model from `ztc-domain`. Application
//! code imports capability types through here rather than reaching into
//! `ztc_domain` directly, so the composition crate has one seam to adjust if
//! the domain crate's module layout ever changes.

pub use ztc_domain::{Capability, CapabilityRegistry, FieldSpec, FieldType, Schema, Violation};
