// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Script Extractor
//!
//! Copies every embedded script referenced by a stage into the secure
//! workspace (§4.12). The relative layout within each adapter's script
//! package is preserved under `scripts/<adapter>/…` so that a script can
//! source a sibling helper by relative path. Extracted scripts are marked
//! executable by the owner only, and a runtime manifest (stage name →
//! absolute script path) is written for the bootstrap executor to consume.
//!
//! The extractor does not know how to locate an adapter's embedded script
//! tree — that lives above this crate, in the adapter registry — so the
//! caller supplies the resolved bytes per stage via [`StageScript`].

use std::collections::BTreeMap;
use std::io;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::platform::Platform;
use crate::workspace::SecureWorkspace;

#[derive(Debug, Error)]
pub enum ExtractError {
    #[error("I/O error extracting script {0}: {1}")]
    Io(PathBuf, io::Error),

    #[error("platform error marking script executable: {0}")]
    Platform(#[from] crate::platform::PlatformError),

    #[error("duplicate stage name in script manifest: {0}")]
    DuplicateStage(String),
}

/// One script a stage needs, resolved by the caller from an adapter's
/// embedded tree.
#[derive(Debug, Clone)]
pub struct StageScript {
    pub stage: String,
    pub adapter: String,
    pub relative_path: PathBuf,
    pub contents: &'static [u8],
}

/// Stage name → absolute extracted script path, persisted alongside the
/// workspace for the executor to read back on resume.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct RuntimeManifest {
    entries: BTreeMap<String, PathBuf>,
}

impl RuntimeManifest {
    pub fn script_path(&self, stage: &str) -> Option<&Path> {
        self.entries.get(stage).map(PathBuf::as_path)
    }

    pub fn stages(&self) -> impl Iterator<Item = &str> {
        self.entries.keys().map(String::as_str)
    }
}

pub struct ScriptExtractor;

impl ScriptExtractor {
    /// Extracts every script into `<workspace>/scripts/<adapter>/<relative>`,
    /// marks each executable by the owner, and writes the runtime manifest
    /// to `<workspace>/runtime-manifest.json`.
    pub fn extract(
        workspace: &SecureWorkspace,
        platform: &dyn Platform,
        scripts: &[StageScript],
    ) -> Result<RuntimeManifest, ExtractError> {
        let mut manifest = RuntimeManifest::default();

        for script in scripts {
            if manifest.entries.contains_key(&script.stage) {
                return Err(ExtractError::DuplicateStage(script.stage.clone()));
            }

            let dest = workspace
                .root()
                .join("scripts")
                .join(&script.adapter)
                .join(&script.relative_path);

            if let Some(parent) = dest.parent() {
                std::fs::create_dir_all(parent).map_err(|e| ExtractError::Io(dest.clone(), e))?;
            }

            std::fs::write(&dest, script.contents).map_err(|e| ExtractError::Io(dest.clone(), e))?;
            platform.set_owner_executable(&dest)?;

            manifest.entries.insert(script.stage.clone(), dest);
        }

        let manifest_json =
            serde_json::to_vec_pretty(&manifest).map_err(|e| ExtractError::Io(workspace.runtime_manifest_path(), io::Error::other(e)))?;
        std::fs::write(workspace.runtime_manifest_path(), manifest_json)
            .map_err(|e| ExtractError::Io(workspace.runtime_manifest_path(), e))?;

        Ok(manifest)
    }
}
