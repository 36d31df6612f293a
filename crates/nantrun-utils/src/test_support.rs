//! Fake NAnt installations for tests.
//!
//! A fake home has a `bin/` directory holding a shell script named `nant`
//! (executable on Unix) and a placeholder `NAnt.exe`, which is what the
//! installation home check looks for.

use std::fs;
use std::io;
use std::path::{Path, PathBuf};
use tempfile::TempDir;

/// Script that echoes each argument on its own `ARG:` line and the working
/// directory on a `PWD:` line, then exits with `$NANT_FAKE_EXIT` (default 0).
pub const ECHO_ARGS_SCRIPT: &str = r#"#!/bin/sh
echo "PWD:$(pwd)"
for a in "$@"; do
  echo "ARG:$a"
done
echo "BUILD FINISHED" >&2
exit "${NANT_FAKE_EXIT:-0}"
"#;

/// A temporary NAnt home directory removed on drop.
pub struct FakeNantHome {
    dir: TempDir,
}

impl FakeNantHome {
    /// Home with `bin/nant` running [`ECHO_ARGS_SCRIPT`].
    pub fn new() -> io::Result<Self> {
        Self::with_script(ECHO_ARGS_SCRIPT)
    }

    /// Home with `bin/nant` running `script`.
    pub fn with_script(script: &str) -> io::Result<Self> {
        let dir = tempfile::tempdir()?;
        let bin = dir.path().join("bin");
        fs::create_dir_all(&bin)?;

        let nant = bin.join("nant");
        fs::write(&nant, script)?;
        #[cfg(unix)]
        {
            use std::os::unix::fs::PermissionsExt;
            fs::set_permissions(&nant, fs::Permissions::from_mode(0o755))?;
        }
        fs::write(bin.join("NAnt.exe"), b"MZ")?;

        Ok(Self { dir })
    }

    /// Home directory without any `bin/` content.
    pub fn empty() -> io::Result<Self> {
        Ok(Self {
            dir: tempfile::tempdir()?,
        })
    }

    #[must_use]
    pub fn home(&self) -> &Path {
        self.dir.path()
    }

    /// `home/bin/nant`
    #[must_use]
    pub fn unix_executable(&self) -> PathBuf {
        self.dir.path().join("bin").join("nant")
    }
}

/// Parse the `ARG:` lines written by [`ECHO_ARGS_SCRIPT`].
#[must_use]
pub fn echoed_args(log: &str) -> Vec<String> {
    log.lines()
        .filter_map(|line| line.strip_prefix("ARG:"))
        .map(str::to_string)
        .collect()
}
