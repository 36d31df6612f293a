use anyhow::{Context, Result};
use nantrun_utils::error::ConfigError;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::env;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::installation::Installation;
use crate::validation::check_home;

use super::{CliArgs, Config, ConfigSource, JobConfig};

/// Directory searched for upward from the working directory
pub const CONFIG_DIR_NAME: &str = ".nantrun";

/// File name inside [`CONFIG_DIR_NAME`] and the user config directory
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Environment variable naming an explicit config file
pub const CONFIG_ENV_VAR: &str = "NANTRUN_CONFIG";

const JOB_KEYS: [&str; 6] = [
    "build_file",
    "installation",
    "targets",
    "properties",
    "working_dir",
    "platform",
];

/// TOML configuration file structure
#[derive(Debug, Default, Deserialize, Serialize)]
struct TomlConfig {
    #[serde(default)]
    installations: Vec<Installation>,
    job: Option<JobConfig>,
}

/// Overwrite `slot` when `value` is set, recording where it came from.
fn apply<T>(
    slot: &mut Option<T>,
    value: Option<T>,
    key: &str,
    source: &ConfigSource,
    attribution: &mut HashMap<String, ConfigSource>,
) {
    if value.is_some() {
        *slot = value;
        attribution.insert(key.to_string(), source.clone());
    }
}

impl Config {
    /// Discover and load configuration with precedence: CLI > file > defaults
    ///
    /// The config file is, in order: `--config`, `$NANTRUN_CONFIG`, the first
    /// `.nantrun/config.toml` found upward from the current directory, then
    /// `<user config dir>/nantrun/config.toml`.
    pub fn discover(cli_args: &CliArgs) -> Result<Self> {
        let start_dir = env::current_dir().context("Failed to get current directory")?;
        let env_path = env::var_os(CONFIG_ENV_VAR)
            .filter(|value| !value.is_empty())
            .map(PathBuf::from);
        let user_path = dirs::config_dir().map(|dir| dir.join("nantrun").join(CONFIG_FILE_NAME));
        Self::discover_with(&start_dir, cli_args, env_path, user_path)
    }

    /// Discover and load configuration starting from a specific directory
    ///
    /// This is the path-driven variant used by tests to avoid process-global state:
    /// neither the environment variable nor the user config directory is consulted.
    pub fn discover_from(start_dir: &Path, cli_args: &CliArgs) -> Result<Self> {
        Self::discover_with(start_dir, cli_args, None, None)
    }

    fn discover_with(
        start_dir: &Path,
        cli_args: &CliArgs,
        env_path: Option<PathBuf>,
        user_path: Option<PathBuf>,
    ) -> Result<Self> {
        let explicit = cli_args.config_path.clone().or(env_path);
        let config_path = match explicit {
            Some(path) => {
                if !path.is_file() {
                    return Err(ConfigError::NotFound {
                        path: path.display().to_string(),
                    }
                    .into());
                }
                Some(path)
            }
            None => Self::discover_config_file_from(start_dir)
                .or_else(|| user_path.filter(|path| path.is_file())),
        };

        let mut source_attribution = HashMap::new();
        for key in JOB_KEYS {
            source_attribution.insert(key.to_string(), ConfigSource::Defaults);
        }

        let mut job = JobConfig::default();
        let mut installations = Vec::new();

        if let Some(path) = &config_path {
            debug!(path = %path.display(), "Loading config file");
            let file_config = Self::load_config_file(path)?;
            let source = ConfigSource::ConfigFile(path.clone());

            installations = Self::vet_installations(file_config.installations);

            if let Some(file_job) = file_config.job {
                let attribution = &mut source_attribution;
                apply(&mut job.build_file, file_job.build_file, "build_file", &source, attribution);
                apply(&mut job.installation, file_job.installation, "installation", &source, attribution);
                apply(&mut job.targets, file_job.targets, "targets", &source, attribution);
                apply(&mut job.properties, file_job.properties, "properties", &source, attribution);
                apply(&mut job.working_dir, file_job.working_dir, "working_dir", &source, attribution);
                apply(&mut job.platform, file_job.platform, "platform", &source, attribution);
            }
        }

        let cli = ConfigSource::Cli;
        let attribution = &mut source_attribution;
        apply(&mut job.build_file, cli_args.build_file.clone(), "build_file", &cli, attribution);
        apply(&mut job.installation, cli_args.installation.clone(), "installation", &cli, attribution);
        apply(&mut job.targets, cli_args.targets.clone(), "targets", &cli, attribution);
        apply(&mut job.properties, cli_args.properties.clone(), "properties", &cli, attribution);
        apply(&mut job.working_dir, cli_args.working_dir.clone(), "working_dir", &cli, attribution);
        apply(&mut job.platform, cli_args.platform, "platform", &cli, attribution);

        Ok(Config {
            installations,
            job,
            config_path,
            source_attribution,
        })
    }

    /// Search upward from `start_dir` for `.nantrun/config.toml`
    ///
    /// Stops at the filesystem root or at a repository root (`.git`, `.hg`, `.svn`).
    #[must_use]
    pub fn discover_config_file_from(start_dir: &Path) -> Option<PathBuf> {
        let mut current_dir = start_dir;

        loop {
            let config_path = current_dir.join(CONFIG_DIR_NAME).join(CONFIG_FILE_NAME);
            if config_path.is_file() {
                return Some(config_path);
            }

            if current_dir.join(".git").exists()
                || current_dir.join(".hg").exists()
                || current_dir.join(".svn").exists()
            {
                return None;
            }

            current_dir = current_dir.parent()?;
        }
    }

    /// Load configuration from TOML file
    fn load_config_file(path: &Path) -> Result<TomlConfig> {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("Failed to read config file {}", path.display()))?;
        let config: TomlConfig = toml::from_str(&content).map_err(|e| ConfigError::InvalidFile {
            path: path.display().to_string(),
            reason: e.message().to_string(),
        })?;
        Ok(config)
    }

    /// Drop incomplete entries and warn about suspicious ones.
    ///
    /// A home that fails [`check_home`] is kept: it may be valid on the machine
    /// that eventually runs the build.
    fn vet_installations(installations: Vec<Installation>) -> Vec<Installation> {
        let mut kept: Vec<Installation> = Vec::with_capacity(installations.len());

        for installation in installations {
            if installation.name.is_empty() || installation.home.as_os_str().is_empty() {
                warn!(
                    name = %installation.name,
                    home = %installation.home.display(),
                    "Ignoring installation without name or home"
                );
                continue;
            }
            if kept.iter().any(|other| other.name == installation.name) {
                warn!(
                    name = %installation.name,
                    "Duplicate installation name; the first entry is used"
                );
            }
            if let Err(e) = check_home(&installation.home) {
                warn!(name = %installation.name, error = %e, "Installation home looks invalid");
            }
            kept.push(installation);
        }

        kept
    }
}
