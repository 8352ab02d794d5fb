// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ztc-domain
//!
//! The pure layer of the bare-metal Kubernetes bootstrap composition engine:
//! capability identifiers and their schemas, the adapter contract, the
//! snapshot-based render context, the dependency resolver, and the lock
//! file's hash-combination invariants.
//!
//! Nothing in this crate performs I/O, spawns a process, or depends on an
//! async runtime. Every type here is deterministic and testable in
//! isolation; the `ztc` crate wires these pure pieces to the filesystem,
//! embedded scripts, and the template engine, and `ztc-bootstrap` wires the
//! resulting pipeline to process execution.

pub mod adapter;
pub mod capability;
pub mod context;
pub mod error;
pub mod lock;
pub mod platform_config;
pub mod resolver;

pub use adapter::{
    Adapter, AdapterDescriptor, AdapterOutput, Barrier, Phase, PipelineStage, RetryPolicy,
    ScriptReference, StageBucket,
};
pub use capability::{Capability, CapabilityRegistry, FieldSpec, FieldType, Schema};
pub use context::{ContextSnapshot, PlatformContext};
pub use error::{Violation, ZtcError};
pub use lock::{validate as validate_lock, DriftKind, LockSnapshot};
pub use platform_config::{PlatformConfig, PlatformMetadata};
pub use resolver::{resolve, ResolvedPlan};
