//! NAnt command construction and build invocation
//!
//! Turns a job's build file, target list and property definitions into the
//! argument list NAnt expects, then runs it through an [`ExecutionContext`]
//! and reports the outcome.
//!
//! ```rust,no_run
//! use nantrun_config::Installations;
//! use nantrun_engine::{BuildEnvironment, BuildInvocation, LocalContext};
//! use nantrun_runner::AbortHandle;
//!
//! let invocation = BuildInvocation::new(Some("default.build"), None, Some("clean build"), None);
//! let env = BuildEnvironment::new("/path/to/workspace");
//! let mut log = std::io::stdout();
//!
//! let outcome = invocation.perform(
//!     &LocalContext::new(),
//!     &Installations::default(),
//!     &env,
//!     &mut log,
//!     &AbortHandle::new(),
//! );
//! println!("success: {}", outcome.success());
//! ```

pub mod command;
pub mod context;
pub mod invocation;
pub mod properties;
pub mod variables;

pub use command::{ArgumentList, CommandBuilder, normalize_targets};
pub use context::{ExecutionContext, LocalContext, installation_exists};
pub use invocation::{BuildEnvironment, BuildInvocation, BuildOutcome};
pub use properties::parse_properties;
pub use variables::{VariableResolver, replace_macro};
