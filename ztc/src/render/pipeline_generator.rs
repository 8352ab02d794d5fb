// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Pipeline Generator (C8)
//!
//! Aggregates every adapter's declared stages into the single linear
//! pipeline document the bootstrap executor later replays: pre-work stages
//! of all adapters (in plan order), then bootstrap stages, then post-work,
//! then validation. Within a bucket, adapter plan order is preserved —
//! the generator does not itself reorder anything.

use ztc_domain::{PipelineStage, StageBucket, ZtcError};

/// Concatenates `per_adapter_stages` (already in plan order) into the
/// four-bucket pipeline document, and rejects duplicate stage names.
pub fn generate(per_adapter_stages: Vec<Vec<PipelineStage>>) -> Result<Vec<PipelineStage>, ZtcError> {
    let mut all: Vec<PipelineStage> = per_adapter_stages.into_iter().flatten().collect();
    all.sort_by_key(|stage| stage.bucket.rank());
    // `sort_by_key` is stable, so stages within a bucket keep the relative
    // order they arrived in (adapter plan order, since flatten preserves it).

    let mut seen = std::collections::BTreeSet::new();
    let mut duplicates = Vec::new();
    for stage in &all {
        if !seen.insert(stage.name.clone()) {
            duplicates.push(stage.name.clone());
        }
    }
    if !duplicates.is_empty() {
        return Err(ZtcError::StageNameCollision { names: duplicates });
    }

    Ok(all)
}
