//! Run command implementation
//!
//! Handles `nantrun run`, `nantrun run --dry-run` and their `--json` forms.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;
use std::env;
use std::io::{self, Write};
use std::time::Instant;
use tracing::info;

use crate::{
    AbortHandle, BuildEnvironment, BuildInvocation, BuildOutcome, Config, ConfigError,
    ExecutionContext, ExitCode, LocalContext, NantError, Platform, UserFriendlyError,
    VariableResolver,
};

/// Options of `nantrun run` that are not job configuration
#[derive(Debug, Clone, Default)]
pub struct RunOptions {
    pub vars: Vec<(String, String)>,
    pub env: Vec<(String, String)>,
    pub dry_run: bool,
    pub json: bool,
}

/// JSON output of `run --dry-run --json`
#[derive(Debug, Serialize)]
struct DryRunOutput<'a> {
    platform: Platform,
    installation: Option<&'a str>,
    command: &'a [String],
    working_dir: String,
    env: BTreeMap<&'a str, &'a str>,
}

/// JSON output of `run --json`
#[derive(Debug, Serialize)]
struct RunSummary<'a> {
    outcome: &'static str,
    success: bool,
    exit_code: Option<i32>,
    installation: Option<&'a str>,
    working_dir: String,
    duration_ms: u128,
    error: Option<String>,
}

fn outcome_label(outcome: &BuildOutcome) -> &'static str {
    match outcome {
        BuildOutcome::Succeeded => "succeeded",
        BuildOutcome::Failed { .. } => "failed",
        BuildOutcome::Aborted => "aborted",
        BuildOutcome::NotStarted(_) => "not_started",
        BuildOutcome::LaunchFailed(_) => "launch_failed",
    }
}

/// Execute the run command
pub fn execute_run_command(config: &Config, options: &RunOptions) -> Result<ExitCode> {
    let platform = config.job.platform.unwrap_or_else(Platform::current);
    if platform != Platform::current() && !options.dry_run {
        return Err(NantError::from(ConfigError::InvalidValue {
            key: "platform".to_string(),
            value: format!("{platform} commands cannot run on this machine, use --dry-run to preview"),
        })
        .into());
    }

    let ctx = LocalContext::new().platform_override(platform);
    let installations = config.installations();
    let invocation = BuildInvocation::from_job(&config.job);

    let working_dir = match &config.job.working_dir {
        Some(dir) => dir.clone(),
        None => env::current_dir().context("Failed to get current directory")?,
    };
    let variables: VariableResolver = options.vars.iter().cloned().collect();
    let environment = options
        .env
        .iter()
        .fold(BuildEnvironment::new(&working_dir).variables(variables), |environment, (k, v)| {
            environment.env(k, v)
        });

    if options.dry_run {
        return dry_run(&invocation, &ctx, config, &environment, options.json);
    }

    info!(
        installation = invocation.installation_name().unwrap_or("<path>"),
        working_dir = %working_dir.display(),
        "Running NAnt"
    );

    let started = Instant::now();
    let outcome = if options.json {
        let mut log = io::stderr().lock();
        invocation.perform(&ctx, &installations, &environment, &mut log, &AbortHandle::new())
    } else {
        let mut log = io::stdout().lock();
        let outcome =
            invocation.perform(&ctx, &installations, &environment, &mut log, &AbortHandle::new());
        log.flush().context("Failed to flush build log")?;
        outcome
    };
    let duration_ms = started.elapsed().as_millis();

    let code = outcome.exit_code();
    let label = outcome_label(&outcome);
    let process_exit = match &outcome {
        BuildOutcome::Succeeded => Some(0),
        BuildOutcome::Failed { exit_code } => *exit_code,
        _ => None,
    };
    let error = outcome.into_error();

    if options.json {
        let summary = RunSummary {
            outcome: label,
            success: error.is_none(),
            exit_code: process_exit,
            installation: invocation.installation_name(),
            working_dir: working_dir.display().to_string(),
            duration_ms,
            error: error.as_ref().map(|e| e.user_message()),
        };
        let json = serde_json::to_string_pretty(&summary).context("Failed to emit run JSON")?;
        println!("{json}");
    } else if let Some(error) = &error {
        eprintln!("✗ {}", error.user_message());
    } else {
        eprintln!("✓ Build succeeded");
    }

    Ok(code)
}

fn dry_run(
    invocation: &BuildInvocation,
    ctx: &LocalContext,
    config: &Config,
    environment: &BuildEnvironment,
    json: bool,
) -> Result<ExitCode> {
    let installations = config.installations();
    if let Some(name) = invocation.unresolved_installation(&installations) {
        eprintln!("Warning: NAnt installation '{name}' is not configured, using PATH");
    }

    let platform = ctx.platform();
    let args = invocation
        .command_line(ctx, &installations, &environment.variables)
        .map_err(NantError::from)?;

    if json {
        let output = DryRunOutput {
            platform,
            installation: invocation
                .installation(&installations)
                .map(|installation| installation.name.as_str()),
            command: args.as_slice(),
            working_dir: environment.working_dir.display().to_string(),
            env: environment
                .env
                .iter()
                .map(|(k, v)| (k.as_str(), v.as_str()))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to emit dry-run JSON")?;
        println!("{json}");
    } else {
        println!("{}", args.display_for(platform));
    }

    Ok(ExitCode::SUCCESS)
}
