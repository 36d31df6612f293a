use std::fmt;
use std::io;
use std::path::PathBuf;
use thiserror::Error;

pub use nantrun_runner::RunnerError;

use crate::exit_codes::ExitCode;

/// Library-level error type with user-friendly reporting.
///
/// # Error Categories
///
/// | Category | Description |
/// |----------|-------------|
/// | `Config` | Configuration file, installation, or CLI argument errors |
/// | `Build` | Command construction and build outcome errors |
/// | `Runner` | Process launch errors |
///
/// # Exit Code Mapping
///
/// | Exit Code | Error Type |
/// |-----------|------------|
/// | 1 | Build failed (nonzero exit, abort, missing executable) |
/// | 3 | Configuration errors |
/// | 70 | Process could not be launched |
///
/// Library code returns `NantError` and does NOT call `std::process::exit()`.
#[derive(Error, Debug)]
pub enum NantError {
    #[error("Configuration error: {0}")]
    Config(#[from] ConfigError),

    #[error("Build error: {0}")]
    Build(#[from] BuildError),

    #[error("Runner error: {0}")]
    Runner(#[from] RunnerError),

    #[error("IO error: {0}")]
    Io(#[from] io::Error),
}

/// Configuration loading and validation errors
#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Invalid configuration file {path}: {reason}")]
    InvalidFile { path: String, reason: String },

    #[error("Configuration file not found at {path}")]
    NotFound { path: String },

    #[error("Invalid configuration value for {key}: {value}")]
    InvalidValue { key: String, value: String },

    #[error("{home} is not a directory")]
    HomeNotDirectory { home: String },

    #[error("{home} is not a NAnt installation directory")]
    NotAnInstallation { home: String },
}

/// Errors raised while preparing or interpreting a NAnt invocation
#[derive(Error, Debug)]
pub enum BuildError {
    #[error("{} doesn't exist", path.display())]
    ExecutableMissing { installation: String, path: PathBuf },

    #[error("Invalid property definitions: {reason}")]
    InvalidProperties { reason: String },

    #[error("NAnt exited with {}", describe_exit(*exit_code))]
    ProcessFailed { exit_code: Option<i32> },

    #[error("Build aborted")]
    Aborted,
}

fn describe_exit(code: Option<i32>) -> String {
    match code {
        Some(code) => format!("code {code}"),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

/// Trait for providing user-friendly error reporting with context and suggestions
pub trait UserFriendlyError {
    /// Get a user-friendly error message
    fn user_message(&self) -> String;

    /// Get contextual information about the error
    fn context(&self) -> Option<String>;

    /// Get suggested actions to resolve the error
    fn suggestions(&self) -> Vec<String>;

    /// Get the error category for grouping similar errors
    fn category(&self) -> ErrorCategory;
}

/// Categories of errors for better organization and handling
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    BuildExecution,
    ProcessLaunch,
    FileSystem,
}

impl fmt::Display for ErrorCategory {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Configuration => write!(f, "Configuration"),
            Self::BuildExecution => write!(f, "Build Execution"),
            Self::ProcessLaunch => write!(f, "Process Launch"),
            Self::FileSystem => write!(f, "File System"),
        }
    }
}

impl UserFriendlyError for ConfigError {
    fn user_message(&self) -> String {
        match self {
            Self::InvalidFile { path, reason } => {
                format!("Configuration file {path} has invalid format: {reason}")
            }
            Self::NotFound { path } => format!("Configuration file not found: {path}"),
            Self::InvalidValue { key, value } => {
                format!("Configuration '{key}' has invalid value: {value}")
            }
            Self::HomeNotDirectory { home } => format!("{home} is not a directory"),
            Self::NotAnInstallation { home } => {
                format!("{home} is not a NAnt installation directory")
            }
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::InvalidFile { .. } => Some(
                "Configuration files must be valid TOML with [[installations]] and [job] sections."
                    .to_string(),
            ),
            Self::NotFound { .. } => Some(
                "nantrun searches for .nantrun/config.toml starting from the current directory upward."
                    .to_string(),
            ),
            Self::InvalidValue { .. } => None,
            Self::HomeNotDirectory { .. } | Self::NotAnInstallation { .. } => Some(
                "A NAnt home directory must contain bin/NAnt.exe.".to_string(),
            ),
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::InvalidFile { .. } => vec![
                "Check the TOML syntax using a TOML validator".to_string(),
                "Each [[installations]] entry needs both 'name' and 'home'".to_string(),
            ],
            Self::NotFound { path } => vec![
                format!("Create {path} or pass --config with an existing file"),
                "Unset NANTRUN_CONFIG if it points to a removed file".to_string(),
            ],
            Self::InvalidValue { key, .. } => vec![format!("Check the value given for '{key}'")],
            Self::HomeNotDirectory { .. } | Self::NotAnInstallation { .. } => vec![
                "Point 'home' at the directory that contains the bin/ folder".to_string(),
                "Leave the installation unset to use nant from PATH".to_string(),
            ],
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::Configuration
    }
}

impl UserFriendlyError for BuildError {
    fn user_message(&self) -> String {
        match self {
            Self::ExecutableMissing { installation, path } => format!(
                "NAnt installation '{installation}' has no executable at {}",
                path.display()
            ),
            other => other.to_string(),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::ExecutableMissing { .. } => Some(
                "The executable is checked on the machine that runs the build, right before launch."
                    .to_string(),
            ),
            Self::InvalidProperties { .. } => Some(
                "Properties use Java properties syntax: one key=value per line.".to_string(),
            ),
            Self::ProcessFailed { .. } | Self::Aborted => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::ExecutableMissing { .. } => vec![
                "Check that the installation home is correct for this machine".to_string(),
                "Run 'nantrun installations' to see which installations resolve".to_string(),
            ],
            Self::InvalidProperties { .. } => {
                vec!["Check backslash escapes such as \\uXXXX in property values".to_string()]
            }
            Self::ProcessFailed { .. } => {
                vec!["Review the NAnt output above for the failing target".to_string()]
            }
            Self::Aborted => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::ExecutableMissing { .. } => ErrorCategory::FileSystem,
            Self::InvalidProperties { .. } => ErrorCategory::Configuration,
            Self::ProcessFailed { .. } | Self::Aborted => ErrorCategory::BuildExecution,
        }
    }
}

impl UserFriendlyError for RunnerError {
    fn user_message(&self) -> String {
        self.to_string()
    }

    fn context(&self) -> Option<String> {
        if self.is_not_found() {
            Some("Without a configured installation, nant is looked up on PATH.".to_string())
        } else {
            None
        }
    }

    fn suggestions(&self) -> Vec<String> {
        if self.is_not_found() {
            vec![
                "Install NAnt or add its bin directory to PATH".to_string(),
                "Configure an installation and select it with --installation".to_string(),
            ]
        } else {
            vec!["Check permissions on the executable and working directory".to_string()]
        }
    }

    fn category(&self) -> ErrorCategory {
        ErrorCategory::ProcessLaunch
    }
}

impl UserFriendlyError for NantError {
    fn user_message(&self) -> String {
        match self {
            Self::Config(e) => e.user_message(),
            Self::Build(e) => e.user_message(),
            Self::Runner(e) => e.user_message(),
            Self::Io(e) => format!("I/O failure: {e}"),
        }
    }

    fn context(&self) -> Option<String> {
        match self {
            Self::Config(e) => e.context(),
            Self::Build(e) => e.context(),
            Self::Runner(e) => e.context(),
            Self::Io(_) => None,
        }
    }

    fn suggestions(&self) -> Vec<String> {
        match self {
            Self::Config(e) => e.suggestions(),
            Self::Build(e) => e.suggestions(),
            Self::Runner(e) => e.suggestions(),
            Self::Io(_) => Vec::new(),
        }
    }

    fn category(&self) -> ErrorCategory {
        match self {
            Self::Config(e) => e.category(),
            Self::Build(e) => e.category(),
            Self::Runner(e) => e.category(),
            Self::Io(_) => ErrorCategory::FileSystem,
        }
    }
}

impl NantError {
    /// Get a user-friendly error message with context and actionable suggestions.
    ///
    /// ```text
    /// Error: <user message>
    ///
    /// Context: <context if available>
    ///
    /// Suggestions:
    ///   • <suggestion 1>
    /// ```
    #[must_use]
    pub fn display_for_user(&self) -> String {
        let mut output = format!("Error: {}\n", self.user_message());

        if let Some(ctx) = self.context() {
            output.push_str(&format!("\nContext: {ctx}\n"));
        }

        let suggestions = self.suggestions();
        if !suggestions.is_empty() {
            output.push_str("\nSuggestions:\n");
            for suggestion in suggestions {
                output.push_str(&format!("  • {suggestion}\n"));
            }
        }

        output
    }

    /// Map the error to the CLI exit code.
    #[must_use]
    pub fn to_exit_code(&self) -> ExitCode {
        match self {
            Self::Config(_) => ExitCode::CONFIG,
            Self::Build(_) => ExitCode::BUILD_FAILED,
            Self::Runner(_) => ExitCode::LAUNCH_FAILED,
            Self::Io(_) => ExitCode::INTERNAL,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_executable_missing_message_matches_build_log_wording() {
        let err = BuildError::ExecutableMissing {
            installation: "nant-0.92".to_string(),
            path: PathBuf::from("/opt/nant/bin/nant"),
        };
        assert_eq!(err.to_string(), "/opt/nant/bin/nant doesn't exist");
        assert!(err.user_message().contains("nant-0.92"));
        assert_eq!(err.category(), ErrorCategory::FileSystem);
    }

    #[test]
    fn test_process_failed_describes_signal() {
        let err = BuildError::ProcessFailed { exit_code: None };
        assert!(err.to_string().contains("terminated by signal"));
        let err = BuildError::ProcessFailed { exit_code: Some(3) };
        assert_eq!(err.to_string(), "NAnt exited with code 3");
    }

    #[test]
    fn test_exit_code_mapping() {
        let config: NantError = ConfigError::NotFound {
            path: "x".to_string(),
        }
        .into();
        assert_eq!(config.to_exit_code(), ExitCode::CONFIG);

        let build: NantError = BuildError::Aborted.into();
        assert_eq!(build.to_exit_code(), ExitCode::BUILD_FAILED);

        let runner: NantError = RunnerError::LaunchFailed {
            program: "nant".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        }
        .into();
        assert_eq!(runner.to_exit_code(), ExitCode::LAUNCH_FAILED);
    }

    #[test]
    fn test_display_for_user_includes_suggestions() {
        let err: NantError = ConfigError::NotAnInstallation {
            home: "/tmp/empty".to_string(),
        }
        .into();
        let message = err.display_for_user();
        assert!(message.starts_with("Error: /tmp/empty is not a NAnt installation directory"));
        assert!(message.contains("Context: A NAnt home directory must contain bin/NAnt.exe."));
        assert!(message.contains("Suggestions:"));
    }

    #[test]
    fn test_runner_not_found_suggests_path() {
        let err = RunnerError::LaunchFailed {
            program: "nant".to_string(),
            source: io::Error::from(io::ErrorKind::NotFound),
        };
        assert!(err.suggestions().iter().any(|s| s.contains("PATH")));
    }
}
