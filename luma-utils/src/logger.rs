//! Logging bootstrap.
//!
//! The library crates only talk to the `log` facade. Binaries call [`init`] once, which installs a
//! `tracing-subscriber` formatter and bridges `log` records into it.

use tracing_subscriber::EnvFilter;

/// Error returned when a global logger was already installed.
pub type LoggerError = Box<dyn std::error::Error + Send + Sync>;

/// Installs the global subscriber. `RUST_LOG` takes precedence over `default_directive`.
pub fn init(default_directive: &str) -> Result<(), LoggerError> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_directive));

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init()?;

    log::debug!("Logger initialized with default directive `{default_directive}`");
    Ok(())
}
