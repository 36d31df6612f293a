//! NAnt command line construction
//!
//! The produced argument list mirrors NAnt's command-line contract:
//!
//! ```text
//! <exe> [-buildfile:<path>] [-D:<key>=<value>]... [target]...
//! ```
//!
//! On Windows the list is then wrapped as
//! `cmd.exe /C "<quoted command> && exit %ERRORLEVEL%"` so the exit code of
//! NAnt is what the launcher sees.

use nantrun_config::{Installation, executable_name};
use nantrun_runner::{CommandSpec, Platform};
use nantrun_utils::error::BuildError;
use once_cell::sync::Lazy;
use regex::Regex;
use std::fmt;
use tracing::debug;

use crate::context::ExecutionContext;
use crate::properties::parse_properties;
use crate::variables::{VariableResolver, replace_macro};

static LINE_BREAKS: Lazy<Regex> = Lazy::new(|| Regex::new(r"[\t\r\n]+").unwrap());

/// Collapse tab/CR/LF runs into single spaces and trim.
#[must_use]
pub fn normalize_targets(targets: &str) -> String {
    LINE_BREAKS.replace_all(targets, " ").trim().to_string()
}

// ============================================================================
// ArgumentList
// ============================================================================

/// Ordered command-line tokens, program first.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgumentList {
    args: Vec<String>,
}

impl ArgumentList {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, arg: impl Into<String>) -> &mut Self {
        self.args.push(arg.into());
        self
    }

    /// Append each whitespace separated token of `text`.
    pub fn add_tokenized(&mut self, text: &str) -> &mut Self {
        self.args.extend(text.split_whitespace().map(str::to_string));
        self
    }

    /// Append `<prefix><key>=<value>` for every entry of a Java properties
    /// string, with build variables substituted into the values.
    pub fn add_key_value_pairs_from_property_string(
        &mut self,
        prefix: &str,
        properties: Option<&str>,
        variables: &VariableResolver,
    ) -> Result<&mut Self, BuildError> {
        let Some(properties) = properties else {
            return Ok(self);
        };
        for (key, value) in parse_properties(properties)? {
            let value = replace_macro(&value, variables);
            self.args.push(format!("{prefix}{key}={value}"));
        }
        Ok(self)
    }

    #[must_use]
    pub fn as_slice(&self) -> &[String] {
        &self.args
    }

    #[must_use]
    pub fn into_vec(self) -> Vec<String> {
        self.args
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.args.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.args.is_empty()
    }

    /// Join into one string, double-quoting tokens that are empty or
    /// contain whitespace.
    #[must_use]
    pub fn to_string_with_quote(&self) -> String {
        let mut buf = String::new();
        for arg in &self.args {
            if !buf.is_empty() {
                buf.push(' ');
            }
            if arg.is_empty() || arg.contains([' ', '\t']) {
                buf.push('"');
                buf.push_str(arg);
                buf.push('"');
            } else {
                buf.push_str(arg);
            }
        }
        buf
    }

    /// Command line as echoed to the build log on `platform`.
    ///
    /// The Windows wrapper is already quoted, so it is joined as is.
    #[must_use]
    pub fn display_for(&self, platform: Platform) -> String {
        if platform.is_unix() {
            self.to_string_with_quote()
        } else {
            self.args.join(" ")
        }
    }

    /// Wrap for `cmd.exe` so the exit code reaches the launcher.
    ///
    /// Produces `["cmd.exe", "/C", "\"<quoted command> && exit %ERRORLEVEL%\""]`.
    #[must_use]
    pub fn wrap_for_cmd(&self) -> Self {
        let mut inner = self.clone();
        inner.add("&&").add("exit").add("%ERRORLEVEL%");

        let mut wrapped = Self::new();
        wrapped
            .add("cmd.exe")
            .add("/C")
            .add(format!("\"{}\"", inner.to_string_with_quote()));
        wrapped
    }

    /// Convert to a [`CommandSpec`] for `platform`.
    ///
    /// On Windows the arguments are marked verbatim because the wrapper has
    /// already quoted them. Returns `None` for an empty list.
    #[must_use]
    pub fn to_command_spec(&self, platform: Platform) -> Option<CommandSpec> {
        CommandSpec::from_argv(&self.args).map(|spec| spec.verbatim(!platform.is_unix()))
    }
}

impl fmt::Display for ArgumentList {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_string_with_quote())
    }
}

impl From<ArgumentList> for Vec<String> {
    fn from(list: ArgumentList) -> Self {
        list.args
    }
}

// ============================================================================
// CommandBuilder
// ============================================================================

/// Builds the NAnt argument list for one invocation.
///
/// # Example
///
/// ```rust
/// use nantrun_engine::{CommandBuilder, LocalContext};
/// use nantrun_runner::Platform;
///
/// let ctx = LocalContext::new().platform_override(Platform::Unix);
/// let args = CommandBuilder::new()
///     .build_file("build.xml")
///     .targets("compile test")
///     .properties(Some("a=1"))
///     .build(&ctx)
///     .unwrap();
///
/// assert_eq!(
///     args.as_slice(),
///     ["nant", "-buildfile:build.xml", "-D:a=1", "compile", "test"]
/// );
/// ```
#[derive(Debug, Clone, Default)]
pub struct CommandBuilder<'a> {
    installation: Option<&'a Installation>,
    build_file: &'a str,
    targets: &'a str,
    properties: Option<&'a str>,
    variables: Option<&'a VariableResolver>,
}

impl<'a> CommandBuilder<'a> {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Installation to run; `None` uses the bare executable name from `PATH`.
    #[must_use]
    pub fn installation(mut self, installation: Option<&'a Installation>) -> Self {
        self.installation = installation;
        self
    }

    #[must_use]
    pub fn build_file(mut self, build_file: &'a str) -> Self {
        self.build_file = build_file;
        self
    }

    #[must_use]
    pub fn targets(mut self, targets: &'a str) -> Self {
        self.targets = targets;
        self
    }

    #[must_use]
    pub fn properties(mut self, properties: Option<&'a str>) -> Self {
        self.properties = properties;
        self
    }

    #[must_use]
    pub fn variables(mut self, variables: &'a VariableResolver) -> Self {
        self.variables = Some(variables);
        self
    }

    /// Produce the argument list for the context's platform.
    ///
    /// # Errors
    ///
    /// [`BuildError::ExecutableMissing`] if the installation has no executable
    /// on the context's machine, [`BuildError::InvalidProperties`] if the
    /// property string cannot be parsed.
    pub fn build(&self, ctx: &dyn ExecutionContext) -> Result<ArgumentList, BuildError> {
        let platform = ctx.platform();
        let mut args = ArgumentList::new();

        args.add(resolve_executable(self.installation, ctx)?);

        // Without a build file NAnt searches the working directory for *.build
        if !self.build_file.trim().is_empty() {
            args.add(format!("-buildfile:{}", self.build_file));
        }

        let empty = VariableResolver::default();
        let variables = self.variables.unwrap_or(&empty);
        args.add_key_value_pairs_from_property_string("-D:", self.properties, variables)?;

        let targets = normalize_targets(self.targets);
        if !targets.is_empty() {
            args.add_tokenized(&targets);
        }

        if platform.is_unix() {
            Ok(args)
        } else {
            Ok(args.wrap_for_cmd())
        }
    }
}

/// First token of the command line.
fn resolve_executable(
    installation: Option<&Installation>,
    ctx: &dyn ExecutionContext,
) -> Result<String, BuildError> {
    let platform = ctx.platform();
    let Some(installation) = installation else {
        return Ok(executable_name(platform).to_string());
    };

    let exe = installation.executable_file(platform);
    if ctx.exists(&exe) {
        debug!(installation = %installation.name, path = %exe.display(), "Resolved NAnt executable");
        Ok(exe.display().to_string())
    } else {
        Err(BuildError::ExecutableMissing {
            installation: installation.name.clone(),
            path: exe,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use nantrun_runner::{AbortHandle, ProcessExit, RunnerError};
    use std::collections::HashSet;
    use std::io::Write;
    use std::path::{Path, PathBuf};

    /// Context that never runs anything and knows a fixed set of files.
    struct StubContext {
        platform: Platform,
        files: HashSet<PathBuf>,
    }

    impl StubContext {
        fn new(platform: Platform) -> Self {
            Self {
                platform,
                files: HashSet::new(),
            }
        }

        fn with_file(mut self, path: PathBuf) -> Self {
            self.files.insert(path);
            self
        }
    }

    impl ExecutionContext for StubContext {
        fn platform(&self) -> Platform {
            self.platform
        }

        fn exists(&self, path: &Path) -> bool {
            self.files.contains(path)
        }

        fn run(
            &self,
            _cmd: &CommandSpec,
            _sink: &mut dyn Write,
            _abort: &AbortHandle,
        ) -> Result<ProcessExit, RunnerError> {
            unreachable!("command tests never launch")
        }
    }

    fn unix() -> StubContext {
        StubContext::new(Platform::Unix)
    }

    #[test]
    fn test_bare_command() {
        let args = CommandBuilder::new().build(&unix()).unwrap();
        assert_eq!(args.as_slice(), ["nant"]);
    }

    #[test]
    fn test_full_command() {
        let args = CommandBuilder::new()
            .build_file("build.xml")
            .targets("compile test")
            .properties(Some("a=1"))
            .build(&unix())
            .unwrap();
        assert_eq!(
            args.as_slice(),
            ["nant", "-buildfile:build.xml", "-D:a=1", "compile", "test"]
        );
    }

    #[test]
    fn test_whitespace_only_fields_are_omitted() {
        let args = CommandBuilder::new()
            .build_file("   ")
            .targets(" \n\t ")
            .properties(Some("\n"))
            .build(&unix())
            .unwrap();
        assert_eq!(args.as_slice(), ["nant"]);
    }

    #[test]
    fn test_target_normalization() {
        assert_eq!(normalize_targets("compile\n\ttest"), "compile test");
        assert_eq!(normalize_targets("\r\nclean\r\n"), "clean");

        let args = CommandBuilder::new()
            .targets("compile\n\ttest")
            .build(&unix())
            .unwrap();
        assert_eq!(args.as_slice(), ["nant", "compile", "test"]);
    }

    #[test]
    fn test_properties_with_variables() {
        let variables = VariableResolver::new().with("BUILD_NUMBER", "17");
        let args = CommandBuilder::new()
            .properties(Some("version=1.0.$BUILD_NUMBER\nconfiguration=Release"))
            .variables(&variables)
            .build(&unix())
            .unwrap();
        assert_eq!(
            args.as_slice(),
            ["nant", "-D:version=1.0.17", "-D:configuration=Release"]
        );
    }

    #[test]
    fn test_invalid_properties_fail() {
        let err = CommandBuilder::new()
            .properties(Some("a=\\u00"))
            .build(&unix())
            .unwrap_err();
        assert!(matches!(err, BuildError::InvalidProperties { .. }));
    }

    #[test]
    fn test_installation_executable_unix() {
        let installation = Installation::new("nant-0.92", "/opt/nant");
        let exe = PathBuf::from("/opt/nant/bin/nant");
        let ctx = unix().with_file(exe.clone());

        let args = CommandBuilder::new()
            .installation(Some(&installation))
            .targets("build")
            .build(&ctx)
            .unwrap();
        assert_eq!(args.as_slice(), [exe.display().to_string(), "build".to_string()]);
    }

    #[test]
    fn test_installation_executable_missing() {
        let installation = Installation::new("nant-0.92", "/opt/nant");
        let err = CommandBuilder::new()
            .installation(Some(&installation))
            .build(&unix())
            .unwrap_err();
        match err {
            BuildError::ExecutableMissing { installation, path } => {
                assert_eq!(installation, "nant-0.92");
                assert_eq!(path, PathBuf::from("/opt/nant/bin/nant"));
            }
            other => panic!("Expected ExecutableMissing, got {other:?}"),
        }
    }

    #[test]
    fn test_windows_wrapping() {
        let ctx = StubContext::new(Platform::Windows);
        let args = CommandBuilder::new()
            .build_file("build.xml")
            .targets("compile test")
            .properties(Some("a=1"))
            .build(&ctx)
            .unwrap();
        assert_eq!(
            args.as_slice(),
            [
                "cmd.exe",
                "/C",
                "\"NAnt.exe -buildfile:build.xml -D:a=1 compile test && exit %ERRORLEVEL%\""
            ]
        );
    }

    #[test]
    fn test_windows_wrapping_quotes_tokens_with_spaces() {
        let ctx = StubContext::new(Platform::Windows);
        let args = CommandBuilder::new()
            .build_file("My Project\\default.build")
            .build(&ctx)
            .unwrap();
        assert_eq!(
            args.as_slice()[2],
            "\"NAnt.exe \"-buildfile:My Project\\default.build\" && exit %ERRORLEVEL%\""
        );
    }

    #[test]
    fn test_windows_installation_executable() {
        let installation = Installation::new("nant", "C:\\nant");
        let exe = installation.executable_file(Platform::Windows);
        let ctx = StubContext::new(Platform::Windows).with_file(exe.clone());

        let args = CommandBuilder::new()
            .installation(Some(&installation))
            .build(&ctx)
            .unwrap();
        assert_eq!(
            args.as_slice()[2],
            format!("\"{} && exit %ERRORLEVEL%\"", exe.display())
        );
    }

    #[test]
    fn test_to_string_with_quote() {
        let mut args = ArgumentList::new();
        args.add("nant").add("").add("a b").add("-D:x=1");
        assert_eq!(args.to_string_with_quote(), "nant \"\" \"a b\" -D:x=1");
        assert_eq!(args.to_string(), args.to_string_with_quote());
    }

    #[test]
    fn test_to_command_spec() {
        let mut args = ArgumentList::new();
        args.add("nant").add("build");

        let spec = args.to_command_spec(Platform::Unix).unwrap();
        assert_eq!(spec.program_display(), "nant");
        assert_eq!(spec.args.len(), 1);
        assert!(!spec.verbatim);

        assert!(args.to_command_spec(Platform::Windows).unwrap().verbatim);
        assert!(ArgumentList::new().to_command_spec(Platform::Unix).is_none());
    }

    mod properties {
        use super::*;
        use proptest::prelude::*;

        proptest! {
            /// Quoting only wraps empty tokens and tokens with blanks
            #[test]
            fn prop_quote_only_when_needed(
                tokens in proptest::collection::vec("[a-z:=./-]{0,6}( [a-z]{1,3})?", 1..6)
            ) {
                let mut args = ArgumentList::new();
                for token in &tokens {
                    args.add(token.clone());
                }
                let expected: Vec<String> = tokens
                    .iter()
                    .map(|t| if t.is_empty() || t.contains(' ') { format!("\"{t}\"") } else { t.clone() })
                    .collect();
                prop_assert_eq!(args.to_string_with_quote(), expected.join(" "));
            }
        }
    }
}
