//! Where a build runs: file checks and process launch

use nantrun_config::Installation;
use nantrun_runner::{
    AbortHandle, CommandSpec, NativeRunner, Platform, ProcessExit, ProcessRunner, RunnerError,
};
use std::io::Write;
use std::path::{Path, PathBuf};

/// The machine a build executes on.
///
/// The executable check and the launch must happen on the same machine, so
/// both go through this trait. [`LocalContext`] is the in-process
/// implementation; a remote agent would provide its own.
pub trait ExecutionContext {
    /// Platform family of the machine, deciding executable names and wrapping.
    fn platform(&self) -> Platform;

    /// Whether `path` exists on the machine.
    fn exists(&self, path: &Path) -> bool;

    /// Run `cmd` to completion, streaming output to `sink`.
    fn run(
        &self,
        cmd: &CommandSpec,
        sink: &mut dyn Write,
        abort: &AbortHandle,
    ) -> Result<ProcessExit, RunnerError>;

    /// Best-effort `PATH` lookup, reported when NAnt cannot be launched.
    fn which(&self, _program: &str) -> Option<PathBuf> {
        None
    }
}

/// Runs builds on the current machine.
#[derive(Debug, Clone, Copy)]
pub struct LocalContext<R = NativeRunner> {
    runner: R,
    platform: Platform,
}

impl LocalContext {
    /// Local context for the current platform.
    #[must_use]
    pub fn new() -> Self {
        Self::with_runner(NativeRunner::new())
    }
}

impl Default for LocalContext {
    fn default() -> Self {
        Self::new()
    }
}

impl<R: ProcessRunner> LocalContext<R> {
    #[must_use]
    pub fn with_runner(runner: R) -> Self {
        Self {
            runner,
            platform: Platform::current(),
        }
    }

    /// Pretend to be another platform. Useful for previewing a Windows
    /// command line from a Unix machine.
    #[must_use]
    pub fn platform_override(mut self, platform: Platform) -> Self {
        self.platform = platform;
        self
    }
}

impl<R: ProcessRunner> ExecutionContext for LocalContext<R> {
    fn platform(&self) -> Platform {
        self.platform
    }

    fn exists(&self, path: &Path) -> bool {
        path.exists()
    }

    fn run(
        &self,
        cmd: &CommandSpec,
        sink: &mut dyn Write,
        abort: &AbortHandle,
    ) -> Result<ProcessExit, RunnerError> {
        self.runner.run(cmd, sink, abort)
    }

    fn which(&self, program: &str) -> Option<PathBuf> {
        which::which(program).ok()
    }
}

/// Whether `installation` provides an executable on the context's platform.
#[must_use]
pub fn installation_exists(ctx: &dyn ExecutionContext, installation: &Installation) -> bool {
    ctx.exists(&installation.executable_file(ctx.platform()))
}
