//! Error types for runner module

use std::io;
use thiserror::Error;

/// Process execution errors
///
/// A nonzero exit code is not an error; it is reported through
/// [`ProcessExit`](crate::ProcessExit).
#[derive(Error, Debug)]
pub enum RunnerError {
    #[error("Failed to launch '{program}': {source}")]
    LaunchFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Failed to wait for process '{program}': {source}")]
    WaitFailed {
        program: String,
        #[source]
        source: io::Error,
    },

    #[error("Empty command line")]
    EmptyCommand,
}

impl RunnerError {
    /// Whether the failure means the executable could not be found.
    #[must_use]
    pub fn is_not_found(&self) -> bool {
        matches!(
            self,
            Self::LaunchFailed { source, .. } if source.kind() == io::ErrorKind::NotFound
        )
    }
}
