//! One NAnt build step: resolve, build the command line, launch, report

use nantrun_config::{Installation, Installations, JobConfig};
use nantrun_runner::{AbortHandle, CommandSpec, RunnerError};
use nantrun_utils::error::{BuildError, NantError};
use nantrun_utils::exit_codes::ExitCode;
use nantrun_utils::logging::{invocation_span, log_build_complete};
use std::collections::HashMap;
use std::error::Error as _;
use std::io::Write;
use std::path::PathBuf;
use std::time::Instant;
use tracing::{debug, error, warn};

use crate::command::{ArgumentList, CommandBuilder};
use crate::context::ExecutionContext;
use crate::variables::VariableResolver;

/// Where and with what environment a build runs.
#[derive(Debug, Clone, Default)]
pub struct BuildEnvironment {
    /// Directory NAnt is started in
    pub working_dir: PathBuf,
    /// Overrides merged over the inherited environment
    pub env: HashMap<String, String>,
    /// Values substituted into property definitions
    pub variables: VariableResolver,
}

impl BuildEnvironment {
    #[must_use]
    pub fn new(working_dir: impl Into<PathBuf>) -> Self {
        Self {
            working_dir: working_dir.into(),
            ..Self::default()
        }
    }

    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: VariableResolver) -> Self {
        self.variables = variables;
        self
    }
}

/// How a build step ended.
#[derive(Debug)]
pub enum BuildOutcome {
    /// NAnt exited with code 0
    Succeeded,
    /// NAnt exited on its own with anything but 0
    Failed { exit_code: Option<i32> },
    /// The build was cut short through the abort handle
    Aborted,
    /// The command line could not be built, nothing was launched
    NotStarted(BuildError),
    /// The process could not be launched
    LaunchFailed(RunnerError),
}

impl BuildOutcome {
    #[must_use]
    pub fn success(&self) -> bool {
        matches!(self, Self::Succeeded)
    }

    /// CLI exit code for this outcome.
    #[must_use]
    pub fn exit_code(&self) -> ExitCode {
        match self {
            Self::Succeeded => ExitCode::SUCCESS,
            Self::Failed { .. } | Self::Aborted | Self::NotStarted(_) => ExitCode::BUILD_FAILED,
            Self::LaunchFailed(_) => ExitCode::LAUNCH_FAILED,
        }
    }

    /// The failure as an error, `None` on success.
    #[must_use]
    pub fn into_error(self) -> Option<NantError> {
        match self {
            Self::Succeeded => None,
            Self::Failed { exit_code } => Some(BuildError::ProcessFailed { exit_code }.into()),
            Self::Aborted => Some(BuildError::Aborted.into()),
            Self::NotStarted(e) => Some(e.into()),
            Self::LaunchFailed(e) => Some(e.into()),
        }
    }
}

/// A configured NAnt build step.
///
/// Immutable once created. Blank build file and targets normalize to `""`,
/// and blank properties to `None`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct BuildInvocation {
    build_file: String,
    installation_name: Option<String>,
    targets: String,
    properties: Option<String>,
}

fn non_blank(value: Option<&str>) -> Option<&str> {
    value.filter(|v| !v.trim().is_empty())
}

impl BuildInvocation {
    #[must_use]
    pub fn new(
        build_file: Option<&str>,
        installation_name: Option<&str>,
        targets: Option<&str>,
        properties: Option<&str>,
    ) -> Self {
        Self {
            build_file: non_blank(build_file).unwrap_or_default().to_string(),
            installation_name: non_blank(installation_name).map(str::to_string),
            targets: non_blank(targets).unwrap_or_default().to_string(),
            properties: non_blank(properties).map(|p| p.trim().to_string()),
        }
    }

    #[must_use]
    pub fn from_job(job: &JobConfig) -> Self {
        Self::new(
            job.build_file.as_deref(),
            job.installation.as_deref(),
            job.targets.as_deref(),
            job.properties.as_deref(),
        )
    }

    #[must_use]
    pub fn build_file(&self) -> &str {
        &self.build_file
    }

    #[must_use]
    pub fn installation_name(&self) -> Option<&str> {
        self.installation_name.as_deref()
    }

    #[must_use]
    pub fn targets(&self) -> &str {
        &self.targets
    }

    #[must_use]
    pub fn properties(&self) -> Option<&str> {
        self.properties.as_deref()
    }

    /// The configured installation, or `None` to use `nant` from `PATH`.
    ///
    /// A name that is not configured resolves to `None` as well.
    #[must_use]
    pub fn installation<'a>(&self, installations: &'a Installations) -> Option<&'a Installation> {
        installations.resolve(self.installation_name.as_deref()?)
    }

    /// The requested installation name when nothing by that name is configured.
    #[must_use]
    pub fn unresolved_installation(&self, installations: &Installations) -> Option<&str> {
        self.installation_name()
            .filter(|name| installations.resolve(name).is_none())
    }

    /// Argument list for this step on the context's machine.
    pub fn command_line(
        &self,
        ctx: &dyn ExecutionContext,
        installations: &Installations,
        variables: &VariableResolver,
    ) -> Result<ArgumentList, BuildError> {
        CommandBuilder::new()
            .installation(self.installation(installations))
            .build_file(&self.build_file)
            .targets(&self.targets)
            .properties(self.properties.as_deref())
            .variables(variables)
            .build(ctx)
    }

    /// Launchable command for this step with the environment applied.
    pub fn command_spec(
        &self,
        ctx: &dyn ExecutionContext,
        installations: &Installations,
        env: &BuildEnvironment,
    ) -> Result<CommandSpec, BuildError> {
        let args = self.command_line(ctx, installations, &env.variables)?;
        Ok(to_spec(&args, ctx, env))
    }

    /// Run the step to completion.
    ///
    /// Everything a user should see (the command echo, NAnt's output and any
    /// failure) goes to `sink`. Failures of every kind come back as a
    /// [`BuildOutcome`]; this never panics or returns an error.
    pub fn perform(
        &self,
        ctx: &dyn ExecutionContext,
        installations: &Installations,
        env: &BuildEnvironment,
        sink: &mut dyn Write,
        abort: &AbortHandle,
    ) -> BuildOutcome {
        let platform = ctx.platform();
        let span = invocation_span(self.installation_name(), platform.as_str());
        let _guard = span.enter();
        let started = Instant::now();

        if let Some(name) = self.unresolved_installation(installations) {
            warn!(installation = %name, "Installation is not configured, using nant from PATH");
            let _ = writeln!(
                sink,
                "WARNING: NAnt installation '{name}' is not configured, using {} from PATH",
                nantrun_config::executable_name(platform)
            );
        }

        let args = match self.command_line(ctx, installations, &env.variables) {
            Ok(args) => args,
            Err(e) => {
                error!(error = %e, "Could not build NAnt command line");
                let _ = writeln!(sink, "{e}");
                return BuildOutcome::NotStarted(e);
            }
        };

        let spec = to_spec(&args, ctx, env);
        let _ = writeln!(sink, "Executing command: {}", args.display_for(platform));
        debug!(program = %spec.program_display(), cwd = %env.working_dir.display(), "Launching NAnt");

        let outcome = match ctx.run(&spec, sink, abort) {
            Ok(exit) if exit.aborted => BuildOutcome::Aborted,
            Ok(exit) if exit.success() => BuildOutcome::Succeeded,
            Ok(exit) => BuildOutcome::Failed {
                exit_code: exit.exit_code,
            },
            Err(e) => {
                report_launch_failure(&e, ctx, sink);
                BuildOutcome::LaunchFailed(e)
            }
        };

        let exit_code = match &outcome {
            BuildOutcome::Succeeded => Some(0),
            BuildOutcome::Failed { exit_code } => *exit_code,
            _ => None,
        };
        log_build_complete(outcome.success(), exit_code, started.elapsed().as_millis());
        outcome
    }
}

fn to_spec(args: &ArgumentList, ctx: &dyn ExecutionContext, env: &BuildEnvironment) -> CommandSpec {
    // The executable token is always present, so the list is never empty
    let spec = args
        .to_command_spec(ctx.platform())
        .unwrap_or_default()
        .cwd(&env.working_dir);
    if env.env.is_empty() {
        spec
    } else {
        spec.envs(&env.env)
    }
}

fn report_launch_failure(err: &RunnerError, ctx: &dyn ExecutionContext, sink: &mut dyn Write) {
    error!(error = %err, "NAnt could not be launched");
    let _ = writeln!(sink, "FATAL: command execution failed");
    let _ = writeln!(sink, "{err}");

    let mut cause = err.source();
    while let Some(inner) = cause {
        let _ = writeln!(sink, "Caused by: {inner}");
        cause = inner.source();
    }

    if err.is_not_found() {
        let exe = nantrun_config::executable_name(ctx.platform());
        let _ = match ctx.which(exe) {
            Some(path) => writeln!(sink, "{exe} on PATH resolves to {}", path.display()),
            None => writeln!(sink, "{exe} was not found on PATH"),
        };
        let _ = writeln!(
            sink,
            "Check that the NAnt installation is configured for this machine, or that nant is on PATH"
        );
    }
}
