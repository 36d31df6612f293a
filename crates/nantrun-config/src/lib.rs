//! Configuration for nantrun
//!
//! Holds the named NAnt installations, discovers and loads the TOML
//! configuration file, and validates installation home directories.
//!
//! Precedence for per-job settings is CLI > config file > defaults. The
//! installation list always comes from the config file (or a form import).

mod discovery;
pub mod form;
pub mod installation;
mod model;
pub mod registry;
mod sources;
pub mod validation;

pub use discovery::{CONFIG_DIR_NAME, CONFIG_ENV_VAR, CONFIG_FILE_NAME};
pub use form::installations_from_form;
pub use installation::{
    Installation, NANT_EXECUTABLE_UNIX, NANT_EXECUTABLE_WINDOWS, executable_file, executable_name,
};
pub use model::{CliArgs, Config, ConfigSource, JobConfig};
pub use registry::{InstallationRegistry, Installations};
pub use validation::check_home;
