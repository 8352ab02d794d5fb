// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # ztc
//!
//! Entry point: parses and security-validates the CLI (`ztc_bootstrap`),
//! initializes logging, dispatches the validated command to its use case,
//! and maps any error back onto the stable exit code table (§6).

use std::process::ExitCode as ProcessExitCode;

use tracing::error;
use ztc::application::use_cases::{
    BootstrapUseCase, EjectUseCase, InitUseCase, RenderUseCase, ValidateUseCase, VacuumUseCase,
    VersionUseCase,
};
use ztc::infrastructure::init_logging;
use ztc_bootstrap::{bootstrap_cli, map_error_to_exit_code, ExitCode, ValidatedCommand};

#[tokio::main]
async fn main() -> ProcessExitCode {
    let validated_cli = match bootstrap_cli() {
        Ok(cli) => cli,
        Err(e) => {
            eprintln!("ztc: {e}");
            return to_process_code(ExitCode::ConfigError);
        }
    };

    if let Err(e) = init_logging(validated_cli.verbose) {
        eprintln!("ztc: failed to initialize logging: {e}");
        return to_process_code(ExitCode::ConfigError);
    }

    let result = match validated_cli.command {
        ValidatedCommand::Init => InitUseCase::new().execute(validated_cli.platform_root).await,
        ValidatedCommand::Render { debug, partial } => {
            RenderUseCase::new().execute(validated_cli.platform_root, debug, partial).await
        }
        ValidatedCommand::Validate => ValidateUseCase::new().execute(validated_cli.platform_root).await,
        ValidatedCommand::Bootstrap { env, skip_cache } => {
            BootstrapUseCase::new().execute(validated_cli.platform_root, env, skip_cache).await
        }
        ValidatedCommand::Eject { output } => {
            EjectUseCase::new().execute(validated_cli.platform_root, output).await
        }
        ValidatedCommand::Vacuum => VacuumUseCase::new().execute().await,
        ValidatedCommand::Version => VersionUseCase::new().execute().await,
    };

    match result {
        Ok(()) => to_process_code(ExitCode::Success),
        Err(e) => {
            error!("{e:#}");
            eprintln!("ztc: {e}");
            let exit_code = e
                .downcast_ref::<ztc_domain::ZtcError>()
                .map(map_error_to_exit_code)
                .unwrap_or(ExitCode::ConfigError);
            to_process_code(exit_code)
        }
    }
}

fn to_process_code(code: ExitCode) -> ProcessExitCode {
    ProcessExitCode::from(code.code() as u8)
}
