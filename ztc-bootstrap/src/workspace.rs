// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Secure Workspace
//!
//! Creates and tears down the per-run scratch directory (§4.11) that holds
//! extracted scripts, per-stage context files, per-stage logs, the stage
//! cache, and the runtime manifest. The directory is named
//! `ztc-secure-<uuid>`, created owner-only, and removed unconditionally on
//! drop unless `ZTC_DEBUG` (or `--debug`) asked it to be preserved.
//!
//! A lock file (`fs2` advisory lock) enforces that at most one executor runs
//! against a workspace at a time (§4.13's single-writer contract).

use std::fs::{File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use fs2::FileExt;
use thiserror::Error;
use uuid::Uuid;

use crate::platform::Platform;

#[derive(Debug, Error)]
pub enum WorkspaceError {
    #[error("I/O error preparing secure workspace: {0}")]
    Io(#[from] io::Error),

    #[error("platform error preparing secure workspace: {0}")]
    Platform(#[from] crate::platform::PlatformError),

    #[error("workspace {0} is already locked by another executor")]
    AlreadyLocked(PathBuf),
}

/// An owner-only scratch directory, cleaned up unless `preserve` is set.
pub struct SecureWorkspace {
    root: PathBuf,
    lock_file: File,
    preserve: bool,
}

impl SecureWorkspace {
    /// Creates `<temp_root>/ztc-secure-<uuid>` with owner-only permissions,
    /// its `ctx/` and `logs/` subdirectories, and acquires the single-writer
    /// lock. `preserve` keeps the directory around after drop for debugging.
    pub fn create(platform: &dyn Platform, preserve: bool) -> Result<Self, WorkspaceError> {
        let root = platform.temp_dir().join(format!("ztc-secure-{}", Uuid::new_v4()));
        std::fs::create_dir_all(&root)?;
        platform.set_owner_only_permissions(&root)?;

        for sub in ["ctx", "logs"] {
            std::fs::create_dir_all(root.join(sub))?;
        }

        let lock_path = root.join(".lock");
        let lock_file = OpenOptions::new().create(true).write(true).open(&lock_path)?;
        lock_file
            .try_lock_exclusive()
            .map_err(|_| WorkspaceError::AlreadyLocked(root.clone()))?;

        std::fs::write(root.join(".pid"), std::process::id().to_string())?;

        Ok(Self { root, lock_file, preserve })
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn ctx_dir(&self) -> PathBuf {
        self.root.join("ctx")
    }

    pub fn logs_dir(&self) -> PathBuf {
        self.root.join("logs")
    }

    pub fn stage_cache_path(&self) -> PathBuf {
        self.root.join("stage-cache.json")
    }

    pub fn runtime_manifest_path(&self) -> PathBuf {
        self.root.join("runtime-manifest.json")
    }

    /// Removes the workspace tree now, regardless of `preserve`. Safe to
    /// call more than once (reentrant cleanup for double signal delivery).
    pub fn cleanup_now(&self) {
        if self.root.exists() {
            let _ = std::fs::remove_dir_all(&self.root);
        }
    }
}

impl Drop for SecureWorkspace {
    fn drop(&mut self) {
        let _ = fs2::FileExt::unlock(&self.lock_file);
        if !self.preserve {
            self.cleanup_now();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::platform::create_platform;

    #[test]
    fn create_makes_an_owner_only_directory_with_ctx_and_logs() {
        let platform = create_platform();
        let ws = SecureWorkspace::create(platform.as_ref(), false).unwrap();
        assert!(ws.root().exists());
        assert!(ws.ctx_dir().exists());
        assert!(ws.logs_dir().exists());
    }

    #[test]
    fn drop_without_preserve_removes_the_tree() {
        let platform = create_platform();
        let root = {
            let ws = SecureWorkspace::create(platform.as_ref(), false).unwrap();
            ws.root().to_path_buf()
        };
        assert!(!root.exists());
    }

    #[test]
    fn drop_with_preserve_keeps_the_tree() {
        let platform = create_platform();
        let root = {
            let ws = SecureWorkspace::create(platform.as_ref(), true).unwrap();
            ws.root().to_path_buf()
        };
        assert!(root.exists());
        std::fs::remove_dir_all(&root).unwrap();
    }

    #[test]
    fn cleanup_now_is_safe_to_call_twice() {
        let platform = create_platform();
        let ws = SecureWorkspace::create(platform.as_ref(), true).unwrap();
        ws.cleanup_now();
        ws.cleanup_now();
    }
}
