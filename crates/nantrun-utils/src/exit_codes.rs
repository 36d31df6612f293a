//! Exit code constants for nantrun.
//!
//! # Exit Code Table
//!
//! | Code | Constant | Description |
//! |------|----------|-------------|
//! | 0 | `SUCCESS` | NAnt exited with code 0 |
//! | 1 | `BUILD_FAILED` | NAnt failed, was aborted, or its executable is missing |
//! | 1 | `INTERNAL` | General/internal failure |
//! | 2 | `CLI_ARGS` | Invalid CLI arguments |
//! | 3 | `CONFIG` | Configuration file or installation home invalid |
//! | 70 | `LAUNCH_FAILED` | The process could not be started |

/// Exit codes matching the documented exit code table.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ExitCode(i32);

impl ExitCode {
    /// Success - the build completed with exit code 0
    pub const SUCCESS: ExitCode = ExitCode(0);

    /// Build failed - nonzero exit, abort, or missing executable
    pub const BUILD_FAILED: ExitCode = ExitCode(1);

    /// Internal error - general failure
    pub const INTERNAL: ExitCode = ExitCode(1);

    /// CLI arguments error - invalid or missing command-line arguments
    pub const CLI_ARGS: ExitCode = ExitCode(2);

    /// Configuration error - unreadable config or invalid installation home
    pub const CONFIG: ExitCode = ExitCode(3);

    /// Launch failure - the operating system refused to start the process
    pub const LAUNCH_FAILED: ExitCode = ExitCode(70);

    /// Get the numeric exit code value.
    ///
    /// Use this with `std::process::exit()`.
    #[must_use]
    pub const fn as_i32(self) -> i32 {
        self.0
    }

    /// Create an ExitCode from a raw i32 value.
    #[must_use]
    pub const fn from_i32(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<i32> for ExitCode {
    fn from(code: i32) -> Self {
        ExitCode(code)
    }
}

impl From<ExitCode> for i32 {
    fn from(code: ExitCode) -> Self {
        code.0
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_exit_code_values_are_stable() {
        assert_eq!(ExitCode::SUCCESS.as_i32(), 0);
        assert_eq!(ExitCode::BUILD_FAILED.as_i32(), 1);
        assert_eq!(ExitCode::CLI_ARGS.as_i32(), 2);
        assert_eq!(ExitCode::CONFIG.as_i32(), 3);
        assert_eq!(ExitCode::LAUNCH_FAILED.as_i32(), 70);
    }

    #[test]
    fn test_exit_code_conversions() {
        assert_eq!(ExitCode::from(3), ExitCode::CONFIG);
        assert_eq!(i32::from(ExitCode::LAUNCH_FAILED), 70);
        assert_eq!(ExitCode::from_i32(0), ExitCode::SUCCESS);
    }
}
