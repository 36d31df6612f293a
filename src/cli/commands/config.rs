//! Config command implementation
//!
//! Handles `nantrun config` and `nantrun config --json`.

use anyhow::{Context, Result};
use serde::Serialize;
use std::collections::BTreeMap;

use crate::{Config, ExitCode, Installation};

#[derive(Debug, Serialize)]
struct ConfigValue {
    value: String,
    source: String,
}

#[derive(Debug, Serialize)]
struct ConfigOutput<'a> {
    config_path: Option<String>,
    installations: &'a [Installation],
    job: BTreeMap<String, ConfigValue>,
}

/// Execute the config command
pub fn execute_config_command(config: &Config, json: bool) -> Result<ExitCode> {
    let effective = config.effective_config();

    if json {
        let output = ConfigOutput {
            config_path: config.config_path.as_ref().map(|p| p.display().to_string()),
            installations: &config.installations,
            job: effective
                .into_iter()
                .map(|(key, (value, source))| (key, ConfigValue { value, source }))
                .collect(),
        };
        let json = serde_json::to_string_pretty(&output).context("Failed to emit config JSON")?;
        println!("{json}");
        return Ok(ExitCode::SUCCESS);
    }

    match &config.config_path {
        Some(path) => println!("Config file: {}", path.display()),
        None => println!("Config file: none (using defaults)"),
    }

    println!("\nInstallations:");
    if config.installations.is_empty() {
        println!("  (none)");
    }
    for installation in &config.installations {
        println!("  {} = {}", installation.name, installation.home.display());
    }

    println!("\nJob:");
    if effective.is_empty() {
        println!("  (nothing set)");
    }
    for (key, (value, source)) in &effective {
        if value.contains('\n') {
            println!("  {key} [{source}]:");
            for line in value.lines() {
                println!("    {line}");
            }
        } else {
            println!("  {key} = {value} [{source}]");
        }
    }

    Ok(ExitCode::SUCCESS)
}
