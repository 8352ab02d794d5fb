// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Vacuum
//!
//! Reclaims orphaned `ztc-secure-*` workspaces (§4.14): directories older
//! than an age threshold whose owning process (recorded in `.pid` at
//! workspace creation, [`crate::workspace::SecureWorkspace::create`]) no
//! longer exists. A workspace younger than the threshold is exempt even if
//! its process has already exited, so a run that just finished isn't raced.

use std::path::{Path, PathBuf};
use std::time::{Duration, SystemTime};

use sysinfo::{Pid, System};
use thiserror::Error;

/// Default age threshold before an orphaned workspace is eligible for
/// reclamation.
pub const DEFAULT_AGE_THRESHOLD: Duration = Duration::from_secs(60 * 60);

#[derive(Debug, Error)]
pub enum VacuumError {
    #[error("I/O error scanning temp root {0}: {1}")]
    Io(PathBuf, std::io::Error),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VacuumReport {
    pub removed: Vec<PathBuf>,
    pub retained: Vec<PathBuf>,
}

/// Scans `temp_root` for `ztc-secure-*` directories and removes the ones
/// that are both older than `age_threshold` and whose owning process (per
/// `.pid`) is no longer running.
pub fn vacuum(temp_root: &Path, age_threshold: Duration) -> Result<VacuumReport, VacuumError> {
    let mut system = System::new_all();
    system.refresh_all();

    let mut report = VacuumReport {
        removed: Vec::new(),
        retained: Vec::new(),
    };

    let entries = match std::fs::read_dir(temp_root) {
        Ok(entries) => entries,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(report),
        Err(e) => return Err(VacuumError::Io(temp_root.to_path_buf(), e)),
    };

    for entry in entries {
        let entry = entry.map_err(|e| VacuumError::Io(temp_root.to_path_buf(), e))?;
        let path = entry.path();

        let Some(name) = path.file_name().and_then(|n| n.to_str()) else {
            continue;
        };
        if !name.starts_with("ztc-secure-") || !path.is_dir() {
            continue;
        }

        if is_reclaimable(&path, age_threshold, &system) {
            if std::fs::remove_dir_all(&path).is_ok() {
                report.removed.push(path);
            } else {
                report.retained.push(path);
            }
        } else {
            report.retained.push(path);
        }
    }

    Ok(report)
}

fn is_reclaimable(path: &Path, age_threshold: Duration, system: &System) -> bool {
    let Ok(metadata) = std::fs::metadata(path) else {
        return false;
    };
    let Ok(modified) = metadata.modified() else {
        return false;
    };
    let Ok(age) = SystemTime::now().duration_since(modified) else {
        return false;
    };
    if age < age_threshold {
        return false;
    }

    match std::fs::read_to_string(path.join(".pid")).ok().and_then(|s| s.trim().parse::<u32>().ok()) {
        Some(pid) => system.process(Pid::from_u32(pid)).is_none(),
        None => true,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration as StdDuration;

    fn touch_workspace(root: &Path, name: &str, pid: Option<u32>, age: StdDuration) -> PathBuf {
        let dir = root.join(name);
        std::fs::create_dir_all(&dir).unwrap();
        if let Some(pid) = pid {
            std::fs::write(dir.join(".pid"), pid.to_string()).unwrap();
        }
        let old_time = SystemTime::now() - age;
        let ft = filetime::FileTime::from_system_time(old_time);
        let _ = filetime::set_file_mtime(&dir, ft);
        dir
    }

    #[test]
    fn ignores_directories_not_matching_the_prefix() {
        let root = tempfile::tempdir().unwrap();
        std::fs::create_dir_all(root.path().join("not-ztc")).unwrap();

        let report = vacuum(root.path(), StdDuration::from_secs(0)).unwrap();
        assert!(report.removed.is_empty());
        assert!(report.retained.is_empty());
    }

    #[test]
    fn retains_a_workspace_younger_than_the_threshold() {
        let root = tempfile::tempdir().unwrap();
        touch_workspace(root.path(), "ztc-secure-fresh", None, StdDuration::from_secs(0));

        let report = vacuum(root.path(), DEFAULT_AGE_THRESHOLD).unwrap();
        assert_eq!(report.removed.len(), 0);
        assert_eq!(report.retained.len(), 1);
    }

    #[test]
    fn reclaims_an_old_workspace_with_no_pid_file() {
        let root = tempfile::tempdir().unwrap();
        touch_workspace(root.path(), "ztc-secure-orphan", None, StdDuration::from_secs(3 * 60 * 60));

        let report = vacuum(root.path(), DEFAULT_AGE_THRESHOLD).unwrap();
        assert_eq!(report.removed.len(), 1);
    }

    #[test]
    fn retains_an_old_workspace_whose_process_is_still_running() {
        let root = tempfile::tempdir().unwrap();
        let current_pid = std::process::id();
        touch_workspace(root.path(), "ztc-secure-alive", Some(current_pid), StdDuration::from_secs(3 * 60 * 60));

        let report = vacuum(root.path(), DEFAULT_AGE_THRESHOLD).unwrap();
        assert_eq!(report.removed.len(), 0);
        assert_eq!(report.retained.len(), 1);
    }
}
