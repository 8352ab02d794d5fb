// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Process Exit Codes
//!
//! The engine's process exit code is the last thing the operator (or a CI
//! pipeline) sees; §6 fixes its meaning so scripting against it is
//! reliable across versions.

use ztc_domain::ZtcError;

/// The six exit codes the engine ever returns.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum ExitCode {
    Success = 0,
    ConfigError = 1,
    DriftDetected = 2,
    StageFailure = 3,
    MissingRuntimeDependency = 4,
    Cancelled = 5,
}

impl ExitCode {
    pub fn code(self) -> i32 {
        self as i32
    }
}

impl From<ExitCode> for i32 {
    fn from(value: ExitCode) -> Self {
        value.code()
    }
}

/// Maps an engine error to the exit code §6 assigns it. Drift is handled by
/// its own call site (`validate` returns drift kinds, not an error), so this
/// mapping only covers the `Result::Err` path.
pub fn map_error_to_exit_code(error: &ZtcError) -> ExitCode {
    match error {
        ZtcError::Cancelled => ExitCode::Cancelled,
        ZtcError::RuntimeDependencyMissing(_) => ExitCode::MissingRuntimeDependency,
        ZtcError::ScriptFailed { .. } | ZtcError::BarrierTimeout { .. } => ExitCode::StageFailure,
        ZtcError::HashMismatchPlatform | ZtcError::HashMismatchArtifacts => ExitCode::DriftDetected,
        _ if error.is_config_error() => ExitCode::ConfigError,
        _ => ExitCode::ConfigError,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cancelled_maps_to_five() {
        assert_eq!(map_error_to_exit_code(&ZtcError::Cancelled).code(), 5);
    }

    #[test]
    fn missing_runtime_dependency_maps_to_four() {
        let err = ZtcError::RuntimeDependencyMissing("talosctl".to_string());
        assert_eq!(map_error_to_exit_code(&err).code(), 4);
    }

    #[test]
    fn script_failed_maps_to_three() {
        let err = ZtcError::ScriptFailed {
            stage: "cilium-install".to_string(),
            exit_code: 1,
        };
        assert_eq!(map_error_to_exit_code(&err).code(), 3);
    }

    #[test]
    fn hash_mismatch_maps_to_two() {
        assert_eq!(map_error_to_exit_code(&ZtcError::HashMismatchPlatform).code(), 2);
    }

    #[test]
    fn config_error_maps_to_one() {
        let err = ZtcError::ConfigInvalid("bad yaml".to_string());
        assert_eq!(map_error_to_exit_code(&err).code(), 1);
    }
}
