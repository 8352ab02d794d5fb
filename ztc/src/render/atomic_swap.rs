// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Atomic Swap (C10)
//!
//! Replaces the live `generated/` tree with a freshly rendered
//! `generated.new/` in one step: rename the live tree out of the way,
//! rename the new tree into place, then remove the old tree. Every rename
//! is an `std::fs::rename`, which is atomic only within a single filesystem
//! — §9 calls this requirement out explicitly, so [`swap`] checks the two
//! paths share a device before attempting anything.

use std::path::Path;

use ztc_domain::ZtcError;

const LIVE_DIR: &str = "generated";
const NEW_SUFFIX: &str = "generated.new";
const OLD_SUFFIX: &str = "generated.old";

/// Replaces `<platform_root>/generated` with `<platform_root>/generated.new`.
///
/// On success, `generated.new` no longer exists (it has become `generated`)
/// and any prior `generated.old` left over from an interrupted run is
/// removed first. On any failure partway through the rename sequence, the
/// live name is left pointing at exactly one complete tree — never a mix —
/// by construction: each `rename` is a single atomic syscall, and the only
/// way to fail between them is a second failure immediately after the
/// first succeeds, which still leaves `generated` resolvable (to the old or
/// new tree, in that order).
pub async fn swap(platform_root: &Path) -> Result<(), ZtcError> {
    let live = platform_root.join(LIVE_DIR);
    let new = platform_root.join(NEW_SUFFIX);
    let old = platform_root.join(OLD_SUFFIX);

    if !new.exists() {
        return Err(ZtcError::Internal(format!("{} does not exist; nothing to swap in", new.display())));
    }

    assert_same_filesystem(&platform_root.to_path_buf(), &new)?;

    if old.exists() {
        tokio::fs::remove_dir_all(&old).await?;
    }

    if live.exists() {
        tokio::fs::rename(&live, &old).await?;
    }
    tokio::fs::rename(&new, &live).await?;
    if old.exists() {
        tokio::fs::remove_dir_all(&old).await?;
    }
    Ok(())
}

/// Discards a failed render's workspace, leaving the live tree untouched.
/// Debug mode skips this call entirely and preserves `generated.new/`.
pub async fn discard_failed_render(platform_root: &Path) -> Result<(), ZtcError> {
    let new = platform_root.join(NEW_SUFFIX);
    if new.exists() {
        tokio::fs::remove_dir_all(&new).await?;
    }
    Ok(())
}

/// Platform-specific same-device check, delegated to the bootstrap crate's
/// `Platform` abstraction so this module stays free of `#[cfg(unix)]`
/// branches of its own.
fn assert_same_filesystem(root: &std::path::PathBuf, new: &Path) -> Result<(), ZtcError> {
    if !ztc_bootstrap::platform::same_filesystem(root, new)? {
        return Err(ZtcError::ConfigInvalid(format!(
            "{} and {} are on different filesystems; atomic rename requires the same device",
            root.display(),
            new.display()
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn write_marker(dir: &Path, value: &str) {
        tokio::fs::create_dir_all(dir).await.unwrap();
        tokio::fs::write(dir.join("marker.txt"), value).await.unwrap();
    }

    #[tokio::test]
    async fn first_swap_promotes_new_tree_with_no_prior_live_tree() {
        let root = tempfile::tempdir().unwrap();
        write_marker(&root.path().join(NEW_SUFFIX), "new").await;

        swap(root.path()).await.unwrap();

        let contents = tokio::fs::read_to_string(root.path().join(LIVE_DIR).join("marker.txt")).await.unwrap();
        assert_eq!(contents, "new");
        assert!(!root.path().join(NEW_SUFFIX).exists());
        assert!(!root.path().join(OLD_SUFFIX).exists());
    }

    #[tokio::test]
    async fn second_swap_replaces_live_tree_and_cleans_up_old() {
        let root = tempfile::tempdir().unwrap();
        write_marker(&root.path().join(LIVE_DIR), "first").await;
        write_marker(&root.path().join(NEW_SUFFIX), "second").await;

        swap(root.path()).await.unwrap();

        let contents = tokio::fs::read_to_string(root.path().join(LIVE_DIR).join("marker.txt")).await.unwrap();
        assert_eq!(contents, "second");
        assert!(!root.path().join(OLD_SUFFIX).exists());
    }

    #[tokio::test]
    async fn discard_failed_render_removes_only_the_new_tree() {
        let root = tempfile::tempdir().unwrap();
        write_marker(&root.path().join(LIVE_DIR), "live").await;
        write_marker(&root.path().join(NEW_SUFFIX), "aborted").await;

        discard_failed_render(root.path()).await.unwrap();

        assert!(root.path().join(LIVE_DIR).exists());
        assert!(!root.path().join(NEW_SUFFIX).exists());
    }
}
