// Authentication module
//
// Verifies unsecured bearer JWTs: structure, allow-lists and validity window.
// Signatures are NOT checked. The issuer certificate is resolved when the
// token names an issuer, but it is only logged, so a token with a forged or
// missing signature still verifies as `Ok` when its shape and timing are valid.

pub mod jwks;
pub mod jwks_client;
pub mod token;

use std::collections::HashSet;
use std::fmt;
use std::sync::Arc;

use serde::{Deserialize, Serialize};

use crate::constants::DEFAULT_CLOCK_SKEW_SECS;
use crate::logging::redact_token;
use jwks_client::KeyResolver;
use token::{ClaimSet, Header};

/// Terminal result of a verification call.
///
/// The numeric codes are part of the host protocol and must not change.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(i32)]
pub enum VerificationStatus {
    Ok = 0,
    EmptyToken = 1,
    ParseFailed = 2,
    WrongAlgorithm = 3,
    Unauthorized = 4,
    NoIssueTime = 5,
    NoExpirationTime = 6,
    TooEarly = 7,
    Expired = 8,
}

impl VerificationStatus {
    /// Wire code sent to the host
    pub fn code(self) -> i32 {
        self as i32
    }

    pub fn is_ok(self) -> bool {
        self == VerificationStatus::Ok
    }

    /// Map a wire code back to a status
    pub fn from_code(code: i32) -> Option<Self> {
        let status = match code {
            0 => VerificationStatus::Ok,
            1 => VerificationStatus::EmptyToken,
            2 => VerificationStatus::ParseFailed,
            3 => VerificationStatus::WrongAlgorithm,
            4 => VerificationStatus::Unauthorized,
            5 => VerificationStatus::NoIssueTime,
            6 => VerificationStatus::NoExpirationTime,
            7 => VerificationStatus::TooEarly,
            8 => VerificationStatus::Expired,
            _ => return None,
        };
        Some(status)
    }
}

impl fmt::Display for VerificationStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            VerificationStatus::Ok => "ok",
            VerificationStatus::EmptyToken => "empty token",
            VerificationStatus::ParseFailed => "parse JWT failed",
            VerificationStatus::WrongAlgorithm => "wrong algorithm",
            VerificationStatus::Unauthorized => "unauthorized",
            VerificationStatus::NoIssueTime => "no issue time in token",
            VerificationStatus::NoExpirationTime => "no expiration time in token",
            VerificationStatus::TooEarly => "token too early",
            VerificationStatus::Expired => "token expired",
        };
        f.write_str(name)
    }
}

/// Request sent by the host for each client token
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyRequest {
    #[serde(default)]
    pub token: String,
}

/// Response returned to the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct VerifyResponse {
    pub success: bool,
    pub status: i32,
}

impl From<VerificationStatus> for VerifyResponse {
    fn from(status: VerificationStatus) -> Self {
        Self {
            success: status.is_ok(),
            status: status.code(),
        }
    }
}

/// Allow-lists and clock tolerance for the verifier.
///
/// An empty allow-list places no restriction on that dimension.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct VerifierConfig {
    pub allowed_subjects: HashSet<String>,
    pub allowed_algorithms: HashSet<String>,
    /// Applied to both the `iat` and `exp` bound
    pub clock_skew_secs: i64,
}

impl Default for VerifierConfig {
    fn default() -> Self {
        Self {
            allowed_subjects: HashSet::new(),
            allowed_algorithms: HashSet::new(),
            clock_skew_secs: DEFAULT_CLOCK_SKEW_SECS as i64,
        }
    }
}

impl VerifierConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn allow_subject(mut self, subject: impl Into<String>) -> Self {
        self.allowed_subjects.insert(subject.into());
        self
    }

    pub fn allow_algorithm(mut self, algorithm: impl Into<String>) -> Self {
        self.allowed_algorithms.insert(algorithm.into());
        self
    }

    pub fn with_clock_skew_secs(mut self, secs: i64) -> Self {
        self.clock_skew_secs = secs;
        self
    }

    fn algorithm_allowed(&self, algorithm: &str) -> bool {
        self.allowed_algorithms.is_empty() || self.allowed_algorithms.contains(algorithm)
    }

    fn subject_allowed(&self, subject: &str) -> bool {
        self.allowed_subjects.is_empty() || self.allowed_subjects.contains(subject)
    }
}

/// Token verifier shared by all requests.
///
/// Holds only read-only state, so one instance behind an `Arc` serves
/// concurrent calls.
#[derive(Clone)]
pub struct Verifier {
    config: VerifierConfig,
    resolver: Option<Arc<dyn KeyResolver>>,
}

impl fmt::Debug for Verifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Verifier")
            .field("config", &self.config)
            .field("resolver", &self.resolver.is_some())
            .finish()
    }
}

impl Verifier {
    /// Create a verifier that never contacts an issuer
    pub fn new(config: VerifierConfig) -> Self {
        Self {
            config,
            resolver: None,
        }
    }

    /// Resolve issuer certificates through `resolver` during verification
    pub fn with_resolver(mut self, resolver: Arc<dyn KeyResolver>) -> Self {
        self.resolver = Some(resolver);
        self
    }

    pub fn config(&self) -> &VerifierConfig {
        &self.config
    }

    /// Verify `token` against the current wall clock
    pub async fn verify(&self, token: &str) -> VerificationStatus {
        self.verify_at(token, chrono::Utc::now().timestamp()).await
    }

    /// Verify `token` as of `now` (Unix seconds).
    ///
    /// Checks run in a fixed order and stop at the first failure, so the
    /// reported status is always the earliest failing check.
    pub async fn verify_at(&self, token: &str, now: i64) -> VerificationStatus {
        tracing::debug!(token = %redact_token(token), "Verifying token");

        if token.is_empty() {
            return VerificationStatus::EmptyToken;
        }

        let (header, claims) = match token::decode(token) {
            Ok(decoded) => decoded,
            Err(e) => {
                tracing::debug!(error = %e, "Failed to decode token");
                return VerificationStatus::ParseFailed;
            }
        };

        if let Some(status) = check_policy(&self.config, &header, &claims) {
            return status;
        }

        self.resolve_issuer_certificate(&header, &claims).await;

        check_validity_window(&claims, now, self.config.clock_skew_secs)
    }

    /// Host entry point: one request in, one response out
    pub async fn handle(&self, request: &VerifyRequest) -> VerifyResponse {
        let status = self.verify(&request.token).await;
        tracing::info!(status = status.code(), result = %status, "Token verified");
        status.into()
    }

    // Best-effort lookup; the outcome never changes the verification status.
    async fn resolve_issuer_certificate(&self, header: &Header, claims: &ClaimSet) {
        let issuer = match claims.issuer.as_deref() {
            Some(iss) if !iss.is_empty() => iss,
            _ => {
                tracing::debug!("Issuer URL is empty, skipping certificate lookup");
                return;
            }
        };

        let Some(resolver) = &self.resolver else {
            tracing::debug!(issuer, "No key resolver configured, skipping certificate lookup");
            return;
        };

        tracing::debug!(issuer, "Retrieving validation certificate");

        match resolver
            .resolve_certificate(issuer, header.key_id.as_deref())
            .await
        {
            Ok(resolved) => {
                tracing::debug!(
                    issuer,
                    kid = %resolved.key_id,
                    certificate_len = resolved.certificate.len(),
                    "Validation certificate resolved"
                );
            }
            Err(e) => {
                tracing::warn!(issuer, error = %e, "Failed to get validation certificate");
            }
        }
    }
}

/// Allow-list and required-claim checks, in order
fn check_policy(
    config: &VerifierConfig,
    header: &Header,
    claims: &ClaimSet,
) -> Option<VerificationStatus> {
    if !config.algorithm_allowed(&header.algorithm) {
        return Some(VerificationStatus::WrongAlgorithm);
    }

    if !config.subject_allowed(claims.subject.as_deref().unwrap_or_default()) {
        return Some(VerificationStatus::Unauthorized);
    }

    if !matches!(claims.issued_at, Some(iat) if iat >= 1.0) {
        return Some(VerificationStatus::NoIssueTime);
    }

    if !matches!(claims.expires_at, Some(exp) if exp >= 1.0) {
        return Some(VerificationStatus::NoExpirationTime);
    }

    None
}

/// Compare `now` against `[iat - skew, exp + skew]`, in whole seconds
fn check_validity_window(claims: &ClaimSet, now: i64, skew_secs: i64) -> VerificationStatus {
    let earliest = claims
        .issued_at_secs()
        .unwrap_or_default()
        .saturating_sub(skew_secs);
    let latest = claims
        .expires_at_secs()
        .unwrap_or_default()
        .saturating_add(skew_secs);

    if now < earliest {
        return VerificationStatus::TooEarly;
    }
    if now > latest {
        return VerificationStatus::Expired;
    }
    VerificationStatus::Ok
}
