use crate::error::RunnerError;
use std::io::Write;
use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};

use super::CommandSpec;

// ============================================================================
// ProcessRunner Trait - Blocking Process Execution Interface
// ============================================================================

/// Result of a process that was launched and ran to completion (or was aborted).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ProcessExit {
    /// Exit code from the process (None if terminated by signal)
    pub exit_code: Option<i32>,
    /// Whether the run was cut short through an [`AbortHandle`]
    pub aborted: bool,
}

impl ProcessExit {
    #[must_use]
    pub const fn new(exit_code: Option<i32>, aborted: bool) -> Self {
        Self { exit_code, aborted }
    }

    /// Shorthand for a process that exited on its own with `code`.
    #[must_use]
    pub const fn exited(code: i32) -> Self {
        Self::new(Some(code), false)
    }

    /// Check if the process exited successfully (exit code exactly 0).
    #[must_use]
    pub fn success(&self) -> bool {
        self.exit_code == Some(0) && !self.aborted
    }
}

/// Shared flag used by a host to abort a running build.
///
/// Clones share the same flag. Once set it stays set.
#[derive(Debug, Clone, Default)]
pub struct AbortHandle {
    flag: Arc<AtomicBool>,
}

impl AbortHandle {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Request termination of whatever process is running under this handle.
    pub fn abort(&self) {
        self.flag.store(true, Ordering::SeqCst);
    }

    #[must_use]
    pub fn is_aborted(&self) -> bool {
        self.flag.load(Ordering::SeqCst)
    }
}

/// Trait for process execution.
///
/// Implementations block the calling thread until the child exits, streaming
/// its combined stdout/stderr into `sink` as it is produced.
///
/// # Returns
///
/// * `Ok(ProcessExit)` - The process ran (possibly with a non-zero exit code)
/// * `Err(RunnerError)` - The process could not be launched or waited on
pub trait ProcessRunner {
    fn run(
        &self,
        cmd: &CommandSpec,
        sink: &mut dyn Write,
        abort: &AbortHandle,
    ) -> Result<ProcessExit, RunnerError>;
}
