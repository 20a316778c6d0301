//! Client for an issuer's certs endpoint
//!
//! Fetches the JSON Web Key Set published at
//! `<issuer>/protocol/openid-connect/certs` and selects the validation
//! certificate for a token. Every call goes to the network; nothing is cached.

use std::collections::HashMap;
use std::time::Duration;

use async_trait::async_trait;
use thiserror::Error;
use url::Url;

use super::jwks::{Jwks, ResolvedCertificate};
use crate::constants::{CERTS_SUBPATH, DEFAULT_CERTS_TIMEOUT_SECS};

/// Error type for key resolution
#[derive(Debug, Error)]
pub enum FetchError {
    /// The issuer claim is not a usable URL
    #[error("invalid issuer URL '{0}'")]
    InvalidUrl(String),

    /// Connection or transport failure
    #[error("request failed: {0}")]
    Request(String),

    /// No response within the configured timeout
    #[error("request timed out")]
    Timeout,

    /// Issuer answered with a non-2xx status
    #[error("HTTP {0} response")]
    Status(u16),

    /// Response body is not a key set
    #[error("invalid key set: {0}")]
    Parse(String),

    /// Key set contains no keys
    #[error("key set contains no keys")]
    EmptyKeySet,

    /// No key carries the requested `kid`
    #[error("no key with ID '{0}' found")]
    KeyNotFound(String),

    /// Selected key has no X.509 certificate chain
    #[error("key '{0}' contains no X.509 certificates")]
    MissingCertificate(String),
}

impl From<reqwest::Error> for FetchError {
    fn from(e: reqwest::Error) -> Self {
        if e.is_timeout() {
            FetchError::Timeout
        } else if e.is_decode() {
            FetchError::Parse(e.to_string())
        } else if let Some(status) = e.status() {
            FetchError::Status(status.as_u16())
        } else {
            FetchError::Request(e.to_string())
        }
    }
}

/// Resolves the validation certificate for an issuer.
///
/// The verifier only depends on this trait, so hosts can swap the HTTP
/// client for a fixed key set or a test double.
#[async_trait]
pub trait KeyResolver: Send + Sync {
    /// Fetch the issuer key set and select a certificate, optionally by `kid`.
    async fn resolve_certificate(
        &self,
        issuer: &str,
        kid: Option<&str>,
    ) -> Result<ResolvedCertificate, FetchError>;
}

/// Certs client configuration
#[derive(Debug, Clone)]
pub struct CertsClientConfig {
    /// HTTP request timeout (in seconds)
    pub timeout_secs: u64,
    /// Issuer host names to replace before the request is sent
    pub host_aliases: HashMap<String, String>,
}

impl Default for CertsClientConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_CERTS_TIMEOUT_SECS,
            host_aliases: HashMap::new(),
        }
    }
}

/// HTTP implementation of [`KeyResolver`]
#[derive(Debug, Clone)]
pub struct CertsClient {
    config: CertsClientConfig,
    http: reqwest::Client,
}

impl CertsClient {
    /// Create a new certs client with the given configuration
    pub fn new(config: CertsClientConfig) -> Result<Self, FetchError> {
        let http = reqwest::Client::builder()
            .timeout(Duration::from_secs(config.timeout_secs))
            .build()
            .map_err(|e| FetchError::Request(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self { config, http })
    }

    /// Get the client configuration
    pub fn config(&self) -> &CertsClientConfig {
        &self.config
    }

    /// Build the key set URL for an issuer, applying host aliases.
    pub fn certs_url(&self, issuer: &str) -> Result<Url, FetchError> {
        let mut url =
            Url::parse(issuer.trim()).map_err(|_| FetchError::InvalidUrl(issuer.to_string()))?;

        let alias = url
            .host_str()
            .and_then(|host| self.config.host_aliases.get(host))
            .cloned();
        if let Some(alias) = alias {
            url.set_host(Some(&alias))
                .map_err(|_| FetchError::InvalidUrl(issuer.to_string()))?;
        }

        url.set_query(None);
        url.set_fragment(None);
        url.path_segments_mut()
            .map_err(|_| FetchError::InvalidUrl(issuer.to_string()))?
            .pop_if_empty()
            .extend(CERTS_SUBPATH.split('/'));

        Ok(url)
    }

    /// Fetch and parse the issuer key set
    pub async fn fetch_jwks(&self, issuer: &str) -> Result<Jwks, FetchError> {
        let url = self.certs_url(issuer)?;

        tracing::debug!(url = %url, "Fetching issuer key set");

        let response = self
            .http
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(FetchError::Status(response.status().as_u16()));
        }

        let body = response.bytes().await?;
        let jwks: Jwks =
            serde_json::from_slice(&body).map_err(|e| FetchError::Parse(e.to_string()))?;

        tracing::debug!(keys = jwks.keys.len(), "Issuer key set fetched");

        Ok(jwks)
    }
}

#[async_trait]
impl KeyResolver for CertsClient {
    async fn resolve_certificate(
        &self,
        issuer: &str,
        kid: Option<&str>,
    ) -> Result<ResolvedCertificate, FetchError> {
        let jwks = self.fetch_jwks(issuer).await?;
        jwks.select_certificate(kid)
    }
}
