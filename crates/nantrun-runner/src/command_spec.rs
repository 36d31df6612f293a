use std::collections::HashMap;
use std::ffi::OsString;
use std::path::PathBuf;
use std::process::Command;

// ============================================================================
// CommandSpec - Process Execution Specification
// ============================================================================

/// Specification for a command to execute.
///
/// Arguments are kept as discrete elements and handed to the OS argv-style.
/// Environment entries are overrides layered on top of the inherited
/// environment of the current process.
///
/// # Verbatim arguments
///
/// On Windows the `cmd.exe /C` wrapper needs its final argument to reach
/// `CreateProcess` exactly as quoted by the caller. Setting
/// [`verbatim`](Self::verbatim) makes [`to_command`](Self::to_command) use
/// `raw_arg` there. It has no effect on other platforms.
///
/// # Example
///
/// ```rust
/// use nantrun_runner::CommandSpec;
/// use std::ffi::OsString;
///
/// let cmd = CommandSpec::new("nant")
///     .arg("-buildfile:default.build")
///     .arg("compile")
///     .cwd("/path/to/workspace");
///
/// assert_eq!(cmd.program, OsString::from("nant"));
/// assert_eq!(cmd.args.len(), 2);
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandSpec {
    /// The program to execute
    pub program: OsString,
    /// Arguments as discrete elements
    pub args: Vec<OsString>,
    /// Optional working directory
    pub cwd: Option<PathBuf>,
    /// Optional environment overrides
    pub env: Option<HashMap<OsString, OsString>>,
    /// Pass arguments without OS-level re-quoting (Windows only)
    pub verbatim: bool,
}

impl CommandSpec {
    /// Create a new `CommandSpec` with the given program.
    #[must_use]
    pub fn new(program: impl Into<OsString>) -> Self {
        Self {
            program: program.into(),
            ..Self::default()
        }
    }

    /// Create a `CommandSpec` from a full argument vector.
    ///
    /// The first element is the program. Returns `None` for an empty vector.
    #[must_use]
    pub fn from_argv<I, S>(argv: I) -> Option<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        let mut iter = argv.into_iter();
        let program = iter.next()?;
        Some(Self::new(program).args(iter))
    }

    /// Add a single argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl Into<OsString>) -> Self {
        self.args.push(arg.into());
        self
    }

    /// Add multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<OsString>,
    {
        self.args.extend(args.into_iter().map(Into::into));
        self
    }

    /// Set the working directory for the command.
    #[must_use]
    pub fn cwd(mut self, cwd: impl Into<PathBuf>) -> Self {
        self.cwd = Some(cwd.into());
        self
    }

    /// Set an environment variable for the command.
    #[must_use]
    pub fn env(mut self, key: impl Into<OsString>, value: impl Into<OsString>) -> Self {
        self.env
            .get_or_insert_with(HashMap::new)
            .insert(key.into(), value.into());
        self
    }

    /// Set multiple environment variables for the command.
    #[must_use]
    pub fn envs<I, K, V>(mut self, envs: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<OsString>,
        V: Into<OsString>,
    {
        let env_map = self.env.get_or_insert_with(HashMap::new);
        for (key, value) in envs {
            env_map.insert(key.into(), value.into());
        }
        self
    }

    /// Mark the arguments as already quoted for the target platform.
    #[must_use]
    pub fn verbatim(mut self, verbatim: bool) -> Self {
        self.verbatim = verbatim;
        self
    }

    /// Program name as a lossy UTF-8 string, for logging.
    #[must_use]
    pub fn program_display(&self) -> String {
        self.program.to_string_lossy().into_owned()
    }

    /// Convert this `CommandSpec` into a `std::process::Command`.
    #[must_use]
    pub fn to_command(&self) -> Command {
        let mut cmd = Command::new(&self.program);

        #[cfg(windows)]
        {
            if self.verbatim {
                use std::os::windows::process::CommandExt;
                for arg in &self.args {
                    cmd.raw_arg(arg);
                }
            } else {
                cmd.args(&self.args);
            }
        }

        #[cfg(not(windows))]
        cmd.args(&self.args);

        if let Some(ref cwd) = self.cwd {
            cmd.current_dir(cwd);
        }

        if let Some(ref env) = self.env {
            for (key, value) in env {
                cmd.env(key, value);
            }
        }

        cmd
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_command_spec_new() {
        let cmd = CommandSpec::new("nant");
        assert_eq!(cmd.program, OsString::from("nant"));
        assert!(cmd.args.is_empty());
        assert!(cmd.cwd.is_none());
        assert!(cmd.env.is_none());
        assert!(!cmd.verbatim);
    }

    #[test]
    fn test_command_spec_from_argv() {
        let cmd = CommandSpec::from_argv(["nant", "-buildfile:a.build", "compile"]).unwrap();
        assert_eq!(cmd.program, OsString::from("nant"));
        assert_eq!(
            cmd.args,
            vec![OsString::from("-buildfile:a.build"), OsString::from("compile")]
        );
    }

    #[test]
    fn test_command_spec_from_empty_argv() {
        let empty: Vec<String> = Vec::new();
        assert!(CommandSpec::from_argv(empty).is_none());
    }

    #[test]
    fn test_command_spec_builder_chain() {
        let cmd = CommandSpec::new("nant")
            .arg("-D:a=1")
            .args(["compile", "test"])
            .cwd("/workspace")
            .env("NANT_HOME", "/opt/nant")
            .envs([("CONFIGURATION", "Release")]);

        assert_eq!(cmd.args.len(), 3);
        assert_eq!(cmd.cwd, Some(PathBuf::from("/workspace")));
        let env = cmd.env.as_ref().unwrap();
        assert_eq!(env.len(), 2);
        assert_eq!(
            env.get(&OsString::from("NANT_HOME")),
            Some(&OsString::from("/opt/nant"))
        );
    }

    #[test]
    fn test_command_spec_env_override_last_wins() {
        let cmd = CommandSpec::new("nant").env("A", "1").envs([("A", "2")]);
        let env = cmd.env.as_ref().unwrap();
        assert_eq!(env.get(&OsString::from("A")), Some(&OsString::from("2")));
    }

    #[test]
    fn test_command_spec_shell_metacharacters_preserved() {
        let cmd = CommandSpec::new("nant")
            .arg("-D:path=$(pwd)")
            .arg("a&&b")
            .arg("%ERRORLEVEL%");

        assert_eq!(cmd.args[0], OsString::from("-D:path=$(pwd)"));
        assert_eq!(cmd.args[1], OsString::from("a&&b"));
        assert_eq!(cmd.args[2], OsString::from("%ERRORLEVEL%"));
    }

    #[test]
    fn test_command_spec_program_display() {
        let cmd = CommandSpec::new("/opt/nant/bin/nant");
        assert_eq!(cmd.program_display(), "/opt/nant/bin/nant");
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Argv-style construction keeps every argument as one element
            #[test]
            fn prop_from_argv_preserves_arguments(
                argv in proptest::collection::vec("\\PC*", 1..10)
            ) {
                let cmd = CommandSpec::from_argv(&argv).unwrap();
                prop_assert_eq!(&cmd.program, &OsString::from(&argv[0]));
                prop_assert_eq!(cmd.args.len(), argv.len() - 1);
                for (arg, expected) in cmd.args.iter().zip(&argv[1..]) {
                    prop_assert_eq!(arg, &OsString::from(expected));
                }
            }
        }
    }
}
