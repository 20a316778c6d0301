// Error types module

use thiserror::Error;

/// Crate-level error type for everything outside the verification outcome
///
/// Verification results are never errors; they are reported as a
/// [`VerificationStatus`](crate::auth::VerificationStatus). This type covers
/// startup and transport faults only.
#[derive(Debug, Error)]
pub enum Error {
    /// Configuration errors (invalid YAML, missing env vars, bad CLI values)
    #[error("Configuration error: {0}")]
    Config(String),

    /// Reading requests or writing responses failed
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// A response could not be encoded for the host
    #[error("Protocol error: {0}")]
    Protocol(String),
}

pub type Result<T> = std::result::Result<T, Error>;
