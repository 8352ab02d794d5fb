// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Artifact Writer (C7)
//!
//! Materializes manifest maps into a workspace directory tree — never the
//! live output tree directly; the atomic swap (C10) is what makes a
//! workspace live. Duplicate writes to the same path within a single render
//! are rejected rather than silently overwritten, since two adapters
//! emitting the same path is almost always a packaging mistake.

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use ztc_domain::ZtcError;

#[derive(Debug, Default)]
pub struct ArtifactWriter {
    written: BTreeMap<PathBuf, ()>,
}

impl ArtifactWriter {
    pub fn new() -> Self {
        Self::default()
    }

    /// Writes every `(relative_path, contents)` pair under `workspace_root`,
    /// failing if any path was already written by an earlier call in this
    /// writer's lifetime.
    pub async fn write_all(
        &mut self,
        workspace_root: &Path,
        manifests: &[(PathBuf, Vec<u8>)],
    ) -> Result<(), ZtcError> {
        for (relative_path, contents) in manifests {
            if self.written.insert(relative_path.clone(), ()).is_some() {
                return Err(ZtcError::Internal(format!(
                    "duplicate manifest write to {}",
                    relative_path.display()
                )));
            }

            let full_path = workspace_root.join(relative_path);
            if let Some(parent) = full_path.parent() {
                tokio::fs::create_dir_all(parent).await?;
            }
            tokio::fs::write(&full_path, contents).await?;
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn writes_files_under_the_workspace_root() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new();
        writer
            .write_all(
                dir.path(),
                &[(PathBuf::from("generated/foundation/hetzner/namespace.yaml"), b"content".to_vec())],
            )
            .await
            .unwrap();

        let written = tokio::fs::read(dir.path().join("generated/foundation/hetzner/namespace.yaml"))
            .await
            .unwrap();
        assert_eq!(written, b"content");
    }

    #[tokio::test]
    async fn duplicate_write_to_the_same_path_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let mut writer = ArtifactWriter::new();
        let path = PathBuf::from("generated/foundation/hetzner/namespace.yaml");
        writer.write_all(dir.path(), &[(path.clone(), b"a".to_vec())]).await.unwrap();
        let err = writer.write_all(dir.path(), &[(path, b"b".to_vec())]).await.unwrap_err();
        assert!(matches!(err, ZtcError::Internal(_)));
    }
}
