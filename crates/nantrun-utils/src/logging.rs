//! Logging infrastructure for nantrun
//!
//! Diagnostics go through `tracing` to stderr. The build log (what NAnt
//! prints, plus the `Executing command:` echo) is a separate writer owned by
//! the caller, so stdout stays a clean transcript of the build.

use tracing::{Level, info, span, warn};
use tracing_subscriber::{
    EnvFilter,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

/// Initialize tracing subscriber for structured logging
///
/// `RUST_LOG` takes precedence; otherwise verbose mode enables debug output
/// for the nantrun crates.
pub fn init_tracing(verbose: bool) -> Result<(), Box<dyn std::error::Error>> {
    let env_filter = EnvFilter::try_from_default_env()
        .or_else(|_| {
            if verbose {
                EnvFilter::try_new(
                    "nantrun=debug,nantrun_engine=debug,nantrun_runner=debug,nantrun_config=debug,info",
                )
            } else {
                EnvFilter::try_new("warn")
            }
        })
        .unwrap_or_else(|_| EnvFilter::new("warn"));

    if verbose {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(true)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .with_span_events(FmtSpan::CLOSE)
                    .compact(),
            )
            .try_init()?;
    } else {
        tracing_subscriber::registry()
            .with(env_filter)
            .with(
                fmt::layer()
                    .with_writer(std::io::stderr)
                    .with_target(false)
                    .with_thread_ids(false)
                    .with_thread_names(false)
                    .with_line_number(false)
                    .with_file(false)
                    .compact(),
            )
            .try_init()?;
    }

    Ok(())
}

/// Create a span covering one NAnt invocation
pub fn invocation_span(installation: Option<&str>, platform: &str) -> tracing::Span {
    span!(
        Level::INFO,
        "nant_invocation",
        installation = installation.unwrap_or("<path>"),
        platform = %platform,
    )
}

/// Log the outcome of an invocation with its duration
pub fn log_build_complete(success: bool, exit_code: Option<i32>, duration_ms: u128) {
    if success {
        info!(exit_code = ?exit_code, duration_ms = %duration_ms, "NAnt build succeeded");
    } else {
        warn!(exit_code = ?exit_code, duration_ms = %duration_ms, "NAnt build failed");
    }
}
