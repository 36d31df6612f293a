//! CLI argument definitions and parsing structures
//!
//! This module defines the command-line interface structure using clap,
//! including the main `Cli` struct and all subcommand enums.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::Platform;

/// nantrun - run NAnt builds with configured installations
#[derive(Parser)]
#[command(name = "nantrun")]
#[command(about = "Run NAnt builds from CI jobs with configured installations")]
#[command(long_about = r#"
nantrun builds NAnt's command line from a build file, a target list and
property definitions, runs it in the job's working directory and exits with
the build's result.

EXAMPLES:
  # Run the default target of the build file NAnt finds itself
  nantrun run

  # Run two targets of a specific build file with a named installation
  nantrun run --build-file default.build --targets "clean build" --installation nant-0.92

  # Pass properties, substituting build variables into their values
  nantrun run -D configuration=Release -D version=1.0.\$BUILD_NUMBER --var BUILD_NUMBER=42

  # Show the Windows command line without running anything
  nantrun run --platform windows --dry-run

  # List installations and check a home directory
  nantrun installations
  nantrun check-home /opt/nant-0.92

CONFIGURATION:
  Configuration is loaded with precedence: CLI flags > config file > defaults
  The config file is --config, then $NANTRUN_CONFIG, then the first
  .nantrun/config.toml found upward from the current directory, then
  nantrun/config.toml in the user config directory.

EXIT CODES:
  0 build succeeded, 1 build failed, 2 invalid arguments,
  3 configuration error, 70 NAnt could not be launched
"#)]
#[command(version)]
pub struct Cli {
    /// Path to configuration file (overrides discovery)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

/// Platform selection for `run`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum PlatformArg {
    /// Platform of this machine, unless the config file says otherwise
    #[default]
    Auto,
    Unix,
    Windows,
}

impl PlatformArg {
    /// `None` for `auto`, leaving the decision to the config file.
    #[must_use]
    pub const fn as_platform(self) -> Option<Platform> {
        match self {
            Self::Auto => None,
            Self::Unix => Some(Platform::Unix),
            Self::Windows => Some(Platform::Windows),
        }
    }
}

#[derive(Subcommand)]
pub enum Commands {
    /// Build and run the NAnt command for the configured job
    Run {
        /// Name of the configured NAnt installation to use
        #[arg(long)]
        installation: Option<String>,

        /// Build file passed to NAnt with -buildfile:
        #[arg(long)]
        build_file: Option<String>,

        /// Whitespace separated targets
        #[arg(long)]
        targets: Option<String>,

        /// Property definitions in Java properties format
        #[arg(long)]
        properties: Option<String>,

        /// Define a property, overriding --properties and the config file
        #[arg(short = 'D', value_name = "KEY=VALUE", value_parser = parse_key_val)]
        define: Vec<(String, String)>,

        /// Build variable substituted into property values as $KEY or ${KEY}
        #[arg(long = "var", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        vars: Vec<(String, String)>,

        /// Environment variable set for NAnt
        #[arg(long = "env", value_name = "KEY=VALUE", value_parser = parse_key_val)]
        env: Vec<(String, String)>,

        /// Directory to run NAnt in (default: current directory)
        #[arg(long)]
        workdir: Option<PathBuf>,

        /// Platform to build the command line for
        #[arg(long, value_enum, default_value_t = PlatformArg::Auto)]
        platform: PlatformArg,

        /// Print the command line instead of running it
        #[arg(long)]
        dry_run: bool,

        /// Output a JSON summary on stdout (the build log goes to stderr)
        #[arg(long)]
        json: bool,
    },

    /// List configured installations and whether their executable exists
    Installations {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },

    /// Check that a directory is a NAnt installation home
    CheckHome {
        /// Directory to check
        dir: PathBuf,
    },

    /// Show the effective job configuration and where each value came from
    Config {
        /// Output as JSON
        #[arg(long)]
        json: bool,
    },
}

/// Parse a `KEY=VALUE` argument.
fn parse_key_val(s: &str) -> Result<(String, String), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("invalid KEY=VALUE: no `=` found in `{s}`"))?;
    if key.is_empty() {
        return Err(format!("invalid KEY=VALUE: empty key in `{s}`"));
    }
    Ok((key.to_string(), value.to_string()))
}

/// Build the clap Command for documentation and testing
pub fn build_cli() -> clap::Command {
    <Cli as clap::CommandFactory>::command()
}
