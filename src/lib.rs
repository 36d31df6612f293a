//! nantrun - run NAnt builds from CI jobs
//!
//! A build step is a build file, a list of targets, some `-D:` property
//! definitions and optionally the name of a configured NAnt installation.
//! nantrun turns that into NAnt's command line, runs it in the job's working
//! directory and reports success or failure.
//!
//! # Quick Start (CLI)
//!
//! ```bash
//! # Run targets with nant from PATH
//! nantrun run --build-file default.build --targets "clean build"
//!
//! # Preview the Windows command line from any machine
//! nantrun run --targets test --platform windows --dry-run
//!
//! # List configured installations and whether they resolve
//! nantrun installations
//! ```
//!
//! # Quick Start (Library)
//!
//! ```rust,no_run
//! use nantrun::{AbortHandle, BuildEnvironment, BuildInvocation, Installation, Installations, LocalContext};
//!
//! let installations = Installations::new(vec![Installation::new("nant-0.92", "/opt/nant-0.92")]);
//! let invocation = BuildInvocation::new(Some("default.build"), Some("nant-0.92"), Some("build"), None);
//!
//! let mut log = std::io::stdout();
//! let outcome = invocation.perform(
//!     &LocalContext::new(),
//!     &installations,
//!     &BuildEnvironment::new("."),
//!     &mut log,
//!     &AbortHandle::new(),
//! );
//! std::process::exit(outcome.exit_code().as_i32());
//! ```

// ============================================================================
// Stable Public API
// ============================================================================

pub use nantrun_config::{
    CliArgs, Config, ConfigSource, Installation, InstallationRegistry, Installations, JobConfig,
    check_home, executable_file, executable_name, installations_from_form,
};
pub use nantrun_engine::{
    ArgumentList, BuildEnvironment, BuildInvocation, BuildOutcome, CommandBuilder,
    ExecutionContext, LocalContext, VariableResolver, installation_exists, normalize_targets,
    parse_properties, replace_macro,
};
pub use nantrun_runner::{
    AbortHandle, CommandSpec, NativeRunner, Platform, ProcessExit, ProcessRunner, RunnerError,
};
pub use nantrun_utils::error::{BuildError, ConfigError, NantError, UserFriendlyError};
pub use nantrun_utils::exit_codes::ExitCode;

// ============================================================================
// Internal Modules
// ============================================================================

pub mod cli;

#[doc(hidden)]
pub use nantrun_utils::logging;
