//! Process execution for NAnt invocations
//!
//! Provides argv-style command specifications, a blocking process runner that
//! streams combined output to a build log, and a cross-thread abort handle.
//!
//! # Security Model
//!
//! All process execution goes through [`CommandSpec`] to ensure argv-style invocation.
//! The only exception is the Windows `cmd.exe /C` wrapper, whose final argument is
//! pre-quoted by the caller and marked verbatim so it reaches `CreateProcess` unchanged.

pub mod command_spec;
pub mod error;
pub mod native;
pub mod process;
pub mod types;

pub use command_spec::CommandSpec;
pub use error::RunnerError;
pub use native::NativeRunner;
pub use process::{AbortHandle, ProcessExit, ProcessRunner};
pub use types::Platform;
