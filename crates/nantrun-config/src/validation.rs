//! Installation home validation

use nantrun_utils::error::ConfigError;
use std::path::Path;

/// Check that `home` looks like a NAnt installation.
///
/// Succeeds only if `home` is an existing directory containing `bin/NAnt.exe`.
/// The check is the same on every platform because NAnt distributions ship
/// `NAnt.exe` even where it is launched through a `nant` wrapper.
pub fn check_home(home: &Path) -> Result<(), ConfigError> {
    if !home.is_dir() {
        return Err(ConfigError::HomeNotDirectory {
            home: home.display().to_string(),
        });
    }

    if !home.join("bin").join("NAnt.exe").exists() {
        return Err(ConfigError::NotAnInstallation {
            home: home.display().to_string(),
        });
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use nantrun_utils::test_support::FakeNantHome;

    #[test]
    fn test_valid_home() {
        let home = FakeNantHome::new().unwrap();
        assert!(check_home(home.home()).is_ok());
    }

    #[test]
    fn test_missing_directory() {
        let home = FakeNantHome::empty().unwrap();
        let missing = home.home().join("does-not-exist");
        let err = check_home(&missing).unwrap_err();
        assert!(matches!(err, ConfigError::HomeNotDirectory { .. }));
        assert!(err.to_string().ends_with("is not a directory"));
    }

    #[test]
    fn test_file_instead_of_directory() {
        let home = FakeNantHome::new().unwrap();
        let err = check_home(&home.unix_executable()).unwrap_err();
        assert!(matches!(err, ConfigError::HomeNotDirectory { .. }));
    }

    #[test]
    fn test_directory_without_executable() {
        let home = FakeNantHome::empty().unwrap();
        let err = check_home(home.home()).unwrap_err();
        assert!(matches!(err, ConfigError::NotAnInstallation { .. }));
        assert!(err.to_string().contains("is not a NAnt installation directory"));
    }
}
