use nantrun_runner::Platform;
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::path::PathBuf;

use crate::installation::Installation;
use crate::registry::{InstallationRegistry, Installations};

/// Per-job NAnt settings, as found under `[job]` in the config file.
///
/// Every field is optional; unset fields fall back to NAnt's own behavior
/// (default build file discovery, default target, `nant` on `PATH`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct JobConfig {
    /// Build file passed as `-buildfile:`
    pub build_file: Option<String>,
    /// Name of the installation to use
    pub installation: Option<String>,
    /// Whitespace separated list of targets
    pub targets: Option<String>,
    /// Property definitions in Java properties format
    pub properties: Option<String>,
    /// Directory the build runs in
    pub working_dir: Option<PathBuf>,
    /// Platform override, mainly for `--dry-run` previews
    pub platform: Option<Platform>,
}

/// Values supplied on the command line, overriding the config file.
#[derive(Debug, Clone, Default)]
pub struct CliArgs {
    pub config_path: Option<PathBuf>,
    pub build_file: Option<String>,
    pub installation: Option<String>,
    pub targets: Option<String>,
    pub properties: Option<String>,
    pub working_dir: Option<PathBuf>,
    pub platform: Option<Platform>,
}

/// Where an effective configuration value came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigSource {
    Cli,
    ConfigFile(PathBuf),
    Defaults,
}

impl std::fmt::Display for ConfigSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Cli => write!(f, "CLI"),
            Self::ConfigFile(path) => write!(f, "config file ({})", path.display()),
            Self::Defaults => write!(f, "defaults"),
        }
    }
}

/// Effective configuration after discovery and CLI overrides.
///
/// # Example
///
/// ```rust,no_run
/// use nantrun_config::{CliArgs, Config};
///
/// let config = Config::discover(&CliArgs::default())?;
/// for installation in &config.installations {
///     println!("{} -> {}", installation.name, installation.home.display());
/// }
/// # Ok::<(), anyhow::Error>(())
/// ```
#[derive(Debug, Clone, Default)]
pub struct Config {
    /// Installations in file order
    pub installations: Vec<Installation>,
    /// Merged job settings
    pub job: JobConfig,
    /// Config file that was loaded, if any
    pub config_path: Option<PathBuf>,
    /// Source of each job setting, keyed by field name
    pub source_attribution: HashMap<String, ConfigSource>,
}

impl Config {
    /// Immutable installation snapshot for one invocation.
    #[must_use]
    pub fn installations(&self) -> Installations {
        Installations::new(self.installations.clone())
    }

    /// Registry seeded with the configured installations.
    #[must_use]
    pub fn registry(&self) -> InstallationRegistry {
        InstallationRegistry::new(self.installations.clone())
    }
}
