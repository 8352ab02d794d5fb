// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! POSIX implementation of [`super::Platform`].

use std::os::unix::fs::PermissionsExt;
use std::path::{Path, PathBuf};

use super::{cache_root, Platform, PlatformError};

pub struct UnixPlatform;

impl UnixPlatform {
    pub fn new() -> Self {
        Self
    }
}

impl Default for UnixPlatform {
    fn default() -> Self {
        Self::new()
    }
}

impl Platform for UnixPlatform {
    fn temp_dir(&self) -> PathBuf {
        cache_root()
    }

    fn set_owner_only_permissions(&self, path: &Path) -> Result<(), PlatformError> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
        Ok(())
    }

    fn set_owner_executable(&self, path: &Path) -> Result<(), PlatformError> {
        std::fs::set_permissions(path, std::fs::Permissions::from_mode(0o700))?;
        Ok(())
    }

    fn is_executable(&self, path: &Path) -> bool {
        std::fs::metadata(path)
            .map(|meta| meta.permissions().mode() & 0o100 != 0)
            .unwrap_or(false)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn set_owner_only_permissions_restricts_to_owner() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let platform = UnixPlatform::new();
        platform.set_owner_only_permissions(file.path()).unwrap();
        let mode = std::fs::metadata(file.path()).unwrap().permissions().mode();
        assert_eq!(mode & 0o777, 0o700);
    }

    #[test]
    fn set_owner_executable_marks_the_file_executable() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let platform = UnixPlatform::new();
        platform.set_owner_executable(file.path()).unwrap();
        assert!(platform.is_executable(file.path()));
    }
}
