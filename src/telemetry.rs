//! Structured logging bootstrap.

use thiserror::Error;
use tracing_subscriber::EnvFilter;
use tracing_subscriber::filter::ParseError;

/// Errors raised while installing the global subscriber.
#[derive(Debug, Error)]
pub enum TelemetryError {
    /// The filter directives do not parse.
    #[error("invalid log filter: {0}")]
    Filter(#[from] ParseError),

    /// A global subscriber is already installed.
    #[error("failed to install log subscriber: {0}")]
    Install(#[source] Box<dyn std::error::Error + Send + Sync>),
}

/// Installs a formatting subscriber filtered by `directives`.
///
/// # Errors
///
/// Returns [`TelemetryError::Filter`] when `directives` do not parse and
/// [`TelemetryError::Install`] when a global subscriber already exists.
pub fn init(directives: &str) -> Result<(), TelemetryError> {
    let filter = EnvFilter::try_new(directives)?;
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(true)
        .try_init()
        .map_err(TelemetryError::Install)
}
