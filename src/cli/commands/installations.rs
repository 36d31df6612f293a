//! Installations command implementation
//!
//! Handles `nantrun installations` and `nantrun installations --json`.

use anyhow::{Context, Result};
use serde::Serialize;

use crate::{
    Config, ExecutionContext, ExitCode, Installation, LocalContext, Platform, check_home,
    executable_name, installation_exists,
};

/// One row of the installation listing
#[derive(Debug, Serialize)]
struct InstallationStatus<'a> {
    name: &'a str,
    home: String,
    executable: String,
    executable_exists: bool,
    home_valid: bool,
    /// An earlier entry has the same name and wins resolution
    shadowed: bool,
}

fn describe<'a>(
    ctx: &dyn ExecutionContext,
    installation: &'a Installation,
    earlier: &[Installation],
) -> InstallationStatus<'a> {
    InstallationStatus {
        name: &installation.name,
        home: installation.home.display().to_string(),
        executable: installation
            .executable_file(ctx.platform())
            .display()
            .to_string(),
        executable_exists: installation_exists(ctx, installation),
        home_valid: check_home(&installation.home).is_ok(),
        shadowed: earlier.iter().any(|other| other.name == installation.name),
    }
}

/// Execute the installations command
pub fn execute_installations_command(config: &Config, json: bool) -> Result<ExitCode> {
    let ctx = LocalContext::new();
    let statuses: Vec<InstallationStatus<'_>> = config
        .installations
        .iter()
        .enumerate()
        .map(|(i, installation)| describe(&ctx, installation, &config.installations[..i]))
        .collect();

    if json {
        let output =
            serde_json::to_string_pretty(&statuses).context("Failed to emit installations JSON")?;
        println!("{output}");
        return Ok(ExitCode::SUCCESS);
    }

    if statuses.is_empty() {
        println!("No NAnt installations configured");
        match &config.config_path {
            Some(path) => println!("  Config file: {}", path.display()),
            None => println!("  Add [[installations]] entries to .nantrun/config.toml"),
        }
        println!(
            "  Builds without an installation use {} from PATH",
            executable_name(Platform::current())
        );
        return Ok(ExitCode::SUCCESS);
    }

    println!("NAnt installations:");
    for status in &statuses {
        let mark = if status.executable_exists { "✓" } else { "✗" };
        println!("  {mark} {} ({})", status.name, status.home);
        println!("      executable: {}", status.executable);
        if !status.home_valid {
            println!("      warning: home does not contain bin/NAnt.exe");
        }
        if status.shadowed {
            println!("      warning: shadowed by an earlier installation with the same name");
        }
    }

    Ok(ExitCode::SUCCESS)
}
