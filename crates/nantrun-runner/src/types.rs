//! Types used by the runner module

use serde::{Deserialize, Serialize};

/// Platform family of the machine that launches the build.
///
/// Decides the executable name and whether the command line must be wrapped
/// in `cmd.exe`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Platform {
    /// Linux, macOS and other Unix-likes
    Unix,
    /// Windows-style platforms
    Windows,
}

impl Platform {
    /// Platform this binary was compiled for.
    #[must_use]
    pub const fn current() -> Self {
        if cfg!(windows) { Self::Windows } else { Self::Unix }
    }

    #[must_use]
    pub const fn is_unix(self) -> bool {
        matches!(self, Self::Unix)
    }

    /// Convert platform to string representation.
    #[must_use]
    pub const fn as_str(&self) -> &'static str {
        match self {
            Self::Unix => "unix",
            Self::Windows => "windows",
        }
    }
}

impl std::fmt::Display for Platform {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for Platform {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "unix" | "linux" | "macos" => Ok(Self::Unix),
            "windows" | "win" => Ok(Self::Windows),
            other => Err(format!("unknown platform '{other}' (expected unix or windows)")),
        }
    }
}
