//! Check-home command implementation
//!
//! Handles `nantrun check-home <DIR>`.

use anyhow::Result;
use std::path::Path;

use crate::{ExitCode, NantError, check_home};

/// Execute the check-home command
pub fn execute_check_home_command(dir: &Path) -> Result<ExitCode> {
    check_home(dir).map_err(NantError::from)?;
    println!("✓ {} is a NAnt installation directory", dir.display());
    Ok(ExitCode::SUCCESS)
}
