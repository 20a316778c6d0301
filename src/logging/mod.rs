// Logging module for structured logging using the tracing crate

use std::error::Error;
use std::str::FromStr;

use tracing_subscriber::EnvFilter;

use crate::constants::{DEFAULT_LOG_FILTER, TOKEN_LOG_PREFIX_LEN};

/// Output format for log events
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum LogFormat {
    /// One JSON object per event, for log aggregation systems
    #[default]
    Json,
    /// Human-readable lines for local runs
    Pretty,
}

impl FromStr for LogFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "json" => Ok(LogFormat::Json),
            "pretty" | "text" => Ok(LogFormat::Pretty),
            other => Err(format!("Unknown log format '{}'", other)),
        }
    }
}

/// Initialize the tracing subscriber for structured logging
///
/// The subscriber is configured with:
/// - JSON or human-readable formatting
/// - Filtering from `RUST_LOG`, falling back to `info`
/// - Output to stderr, since stdout carries verification responses
///
/// # Errors
///
/// Returns an error if a global subscriber has already been installed.
///
/// # Examples
///
/// ```
/// use unsecured_jwt_info::logging::{init_subscriber, LogFormat};
///
/// init_subscriber(LogFormat::Json).ok();
/// tracing::info!("verifier started");
/// ```
pub fn init_subscriber(format: LogFormat) -> Result<(), Box<dyn Error + Send + Sync>> {
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(DEFAULT_LOG_FILTER));

    let builder = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(std::io::stderr);

    match format {
        LogFormat::Json => builder.json().try_init(),
        LogFormat::Pretty => builder.try_init(),
    }
}

/// Shorten a bearer token for log output.
///
/// Keeps a short prefix so operators can correlate requests without the
/// full credential ever reaching the logs.
pub fn redact_token(token: &str) -> String {
    let prefix: String = token.chars().take(TOKEN_LOG_PREFIX_LEN).collect();
    if prefix.len() < token.len() {
        format!("{}...({} bytes)", prefix, token.len())
    } else {
        prefix
    }
}
