//! NAnt installations and executable naming

use nantrun_runner::Platform;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// The default name of the NAnt executable on Windows platforms
pub const NANT_EXECUTABLE_WINDOWS: &str = "NAnt.exe";

/// The default name of the NAnt executable on Unix-based platforms
pub const NANT_EXECUTABLE_UNIX: &str = "nant";

/// Executable name NAnt is installed under on `platform`.
#[must_use]
pub const fn executable_name(platform: Platform) -> &'static str {
    match platform {
        Platform::Windows => NANT_EXECUTABLE_WINDOWS,
        Platform::Unix => NANT_EXECUTABLE_UNIX,
    }
}

/// `<home>/bin/<executable_name(platform)>`
#[must_use]
pub fn executable_file(home: &Path, platform: Platform) -> PathBuf {
    home.join("bin").join(executable_name(platform))
}

/// A named, locally-installed copy of NAnt.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Installation {
    /// Human readable display name
    pub name: String,
    /// Install directory
    pub home: PathBuf,
}

impl Installation {
    #[must_use]
    pub fn new(name: impl Into<String>, home: impl Into<PathBuf>) -> Self {
        Self {
            name: name.into(),
            home: home.into(),
        }
    }

    /// Path of the executable this installation provides on `platform`.
    #[must_use]
    pub fn executable_file(&self, platform: Platform) -> PathBuf {
        executable_file(&self.home, platform)
    }
}
