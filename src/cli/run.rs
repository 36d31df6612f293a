//! CLI entry point and dispatch logic
//!
//! This module owns the `run()` function which:
//! - Parses CLI arguments
//! - Builds CliArgs and discovers Config
//! - Dispatches to command handlers
//! - Handles all error output

use clap::Parser;
use tracing::debug;

use super::args::{Cli, Commands};
use super::commands::{self, RunOptions};

use crate::logging::init_tracing;
use crate::{CliArgs, Config, ConfigError, ConfigSource, ExitCode, NantError};

/// Main CLI execution function.
///
/// This function handles ALL output including errors. It returns `Result<(), ExitCode>`:
/// - On success: returns `Ok(())` after printing any output
/// - On error: prints the error for the user, returns `Err(ExitCode)`
///
/// main.rs only calls `std::process::exit(code.as_i32())` on error - it does NOT print.
pub fn run() -> Result<(), ExitCode> {
    let cli = Cli::parse();

    if let Err(e) = init_tracing(cli.verbose) {
        eprintln!("Warning: failed to initialize logging: {e}");
    }

    // check-home validates a directory and needs no configuration
    if let Commands::CheckHome { dir } = &cli.command {
        return into_result(commands::execute_check_home_command(dir));
    }

    let mut cli_args = CliArgs {
        config_path: cli.config.clone(),
        ..CliArgs::default()
    };
    let mut definitions: &[(String, String)] = &[];
    if let Commands::Run {
        installation,
        build_file,
        targets,
        properties,
        define,
        workdir,
        platform,
        ..
    } = &cli.command
    {
        cli_args.installation = installation.clone();
        cli_args.build_file = build_file.clone();
        cli_args.targets = targets.clone();
        cli_args.properties = properties.clone();
        definitions = define.as_slice();
        cli_args.working_dir = workdir.clone();
        cli_args.platform = platform.as_platform();
    }

    let mut config = match Config::discover(&cli_args) {
        Ok(config) => config,
        Err(err) => return Err(report_error(err)),
    };
    // -D goes on top of the effective properties, wherever they came from
    if !definitions.is_empty() {
        config.job.properties =
            commands::merge_definitions(config.job.properties.as_deref(), definitions);
        config
            .source_attribution
            .insert("properties".to_string(), ConfigSource::Cli);
    }
    debug!(
        config_path = ?config.config_path,
        installations = config.installations.len(),
        "Configuration loaded"
    );

    let result = match cli.command {
        Commands::Run {
            vars,
            env,
            dry_run,
            json,
            ..
        } => commands::execute_run_command(
            &config,
            &RunOptions {
                vars,
                env,
                dry_run,
                json,
            },
        ),
        Commands::Installations { json } => commands::execute_installations_command(&config, json),
        Commands::Config { json } => commands::execute_config_command(&config, json),
        Commands::CheckHome { .. } => Ok(ExitCode::SUCCESS),
    };

    into_result(result)
}

fn into_result(result: anyhow::Result<ExitCode>) -> Result<(), ExitCode> {
    match result {
        Ok(ExitCode::SUCCESS) => Ok(()),
        Ok(code) => Err(code),
        Err(err) => Err(report_error(err)),
    }
}

/// Print `err` for the user and pick the exit code.
fn report_error(err: anyhow::Error) -> ExitCode {
    let err = match err.downcast::<NantError>() {
        Ok(nant_error) => return print_nant_error(&nant_error),
        Err(other) => other,
    };
    let err = match err.downcast::<ConfigError>() {
        Ok(config_error) => return print_nant_error(&config_error.into()),
        Err(other) => other,
    };

    eprintln!("✗ Unexpected error: {err:#}");
    eprintln!("\n  Run with --verbose for more detailed output");
    ExitCode::INTERNAL
}

fn print_nant_error(err: &NantError) -> ExitCode {
    eprint!("{}", err.display_for_user());
    err.to_exit_code()
}
