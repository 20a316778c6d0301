// Constants module - centralized default values for configuration
//
// This module defines all default values used throughout the codebase.

// =============================================================================
// Verification defaults
// =============================================================================

/// Default tolerance applied to both `iat` and `exp` bounds, in seconds
pub const DEFAULT_CLOCK_SKEW_SECS: u64 = 60;

/// Algorithm name for unsecured JWTs. Not rejected unless the allow-list omits it.
pub const ALGORITHM_NONE: &str = "none";

// =============================================================================
// Issuer certs endpoint defaults
// =============================================================================

/// Path appended to the issuer URL to reach its JSON Web Key Set
pub const CERTS_SUBPATH: &str = "protocol/openid-connect/certs";

/// Default HTTP timeout for fetching the issuer key set, in seconds
pub const DEFAULT_CERTS_TIMEOUT_SECS: u64 = 30;

// =============================================================================
// Logging defaults
// =============================================================================

/// Filter directive used when `RUST_LOG` is unset
pub const DEFAULT_LOG_FILTER: &str = "info";

/// Number of leading token characters included in log lines
pub const TOKEN_LOG_PREFIX_LEN: usize = 12;
