// /////////////////////////////////////////////////////////////////////////////
// ZTC
// Copyright (c) 2025 ZTC Contributors
// SPDX-License-Identifier: BSD-3-Clause
// See LICENSE file in the project root.
// /////////////////////////////////////////////////////////////////////////////

//! # Command-Line Interface Module
//!
//! ```text
//! ┌─────────────────────────────────────┐
//! │  1. parser::parse_cli()             │  clap parsing
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  2. validate_cli()                  │  security validation
//! └─────────────────┬───────────────────┘
//!                   ↓
//! ┌─────────────────────────────────────┐
//! │  3. ValidatedCli                    │  safe, validated arguments
//! └─────────────────────────────────────┘
//! ```

pub mod parser;
pub mod validator;

pub use parser::{parse_cli, Cli, Commands};
pub use validator::{ParseError, SecureArgParser};

use std::path::PathBuf;

/// CLI arguments after security validation: paths are canonicalized where
/// they must already exist, and every string has been checked for shell
/// metacharacters.
#[derive(Debug, Clone)]
pub struct ValidatedCli {
    pub command: ValidatedCommand,
    pub verbose: bool,
    pub platform_root: PathBuf,
}

#[derive(Debug, Clone)]
pub enum ValidatedCommand {
    Init,
    Render {
        debug: bool,
        partial: Vec<String>,
    },
    Validate,
    Bootstrap {
        env: Option<String>,
        skip_cache: bool,
    },
    Eject {
        output: PathBuf,
    },
    Vacuum,
    Version,
}

/// Parses and validates CLI arguments in one call.
pub fn parse_and_validate() -> Result<ValidatedCli, ParseError> {
    let cli = parse_cli();
    validate_cli(cli)
}

fn validate_cli(cli: Cli) -> Result<ValidatedCli, ParseError> {
    let platform_root = match cli.platform_root {
        Some(path) => {
            SecureArgParser::validate_argument(&path.to_string_lossy())?;
            path
        }
        None => std::env::current_dir().map_err(|e| ParseError::InvalidPath(e.to_string()))?,
    };

    let command = match cli.command {
        Commands::Init => ValidatedCommand::Init,
        Commands::Render { debug, partial } => {
            for name in &partial {
                SecureArgParser::validate_argument(name)?;
            }
            ValidatedCommand::Render { debug, partial }
        }
        Commands::Validate => ValidatedCommand::Validate,
        Commands::Bootstrap { env, skip_cache } => {
            if let Some(ref name) = env {
                SecureArgParser::validate_argument(name)?;
            }
            ValidatedCommand::Bootstrap { env, skip_cache }
        }
        Commands::Eject { output } => {
            let output = match output {
                Some(path) => SecureArgParser::validate_future_path(&path.to_string_lossy())?,
                None => PathBuf::from("ejected"),
            };
            ValidatedCommand::Eject { output }
        }
        Commands::Vacuum => ValidatedCommand::Vacuum,
        Commands::Version => ValidatedCommand::Version,
    };

    Ok(ValidatedCli {
        command,
        verbose: cli.verbose,
        platform_root,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn cli_with(command: Commands) -> Cli {
        Cli {
            command,
            verbose: false,
            platform_root: None,
        }
    }

    #[test]
    fn render_with_partial_adapter_list_validates() {
        let cli = cli_with(Commands::Render {
            debug: false,
            partial: vec!["hetzner".to_string(), "talos".to_string()],
        });
        let validated = validate_cli(cli).unwrap();
        match validated.command {
            ValidatedCommand::Render { partial, .. } => {
                assert_eq!(partial, vec!["hetzner", "talos"]);
            }
            _ => panic!("expected Render"),
        }
    }

    #[test]
    fn render_rejects_dangerous_partial_name() {
        let cli = cli_with(Commands::Render {
            debug: false,
            partial: vec!["../escape".to_string()],
        });
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn eject_defaults_output_to_ejected() {
        let cli = cli_with(Commands::Eject { output: None });
        let validated = validate_cli(cli).unwrap();
        match validated.command {
            ValidatedCommand::Eject { output } => assert_eq!(output, PathBuf::from("ejected")),
            _ => panic!("expected Eject"),
        }
    }

    #[test]
    fn bootstrap_rejects_dangerous_env_name() {
        let cli = cli_with(Commands::Bootstrap {
            env: Some("prod; rm -rf /".to_string()),
            skip_cache: false,
        });
        assert!(validate_cli(cli).is_err());
    }

    #[test]
    fn platform_root_defaults_to_current_directory() {
        let cli = cli_with(Commands::Version);
        let validated = validate_cli(cli).unwrap();
        assert_eq!(validated.platform_root, std::env::current_dir().unwrap());
    }
}
