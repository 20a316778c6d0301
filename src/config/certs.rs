//! Issuer certs endpoint configuration.
//!
//! Controls how the verifier reaches `<issuer>/protocol/openid-connect/certs`:
//! - `timeout_secs` bounds each fetch
//! - `host_aliases` replaces issuer host names before the request is sent,
//!   e.g. `localhost: host.docker.internal` when the verifier runs in a
//!   container but tokens are minted against a host-local identity provider
//!
//! No host name is rewritten unless it is listed here.

use std::collections::HashMap;

use serde::{Deserialize, Serialize};

use crate::auth::jwks_client::CertsClientConfig;
use crate::constants::DEFAULT_CERTS_TIMEOUT_SECS;

fn default_certs_timeout() -> u64 {
    DEFAULT_CERTS_TIMEOUT_SECS
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CertsConfig {
    /// HTTP timeout for fetching the key set (default: 30)
    #[serde(default = "default_certs_timeout")]
    pub timeout_secs: u64,
    /// Issuer host name -> replacement host name
    #[serde(default)]
    pub host_aliases: HashMap<String, String>,
}

impl Default for CertsConfig {
    fn default() -> Self {
        Self {
            timeout_secs: DEFAULT_CERTS_TIMEOUT_SECS,
            host_aliases: HashMap::new(),
        }
    }
}

impl CertsConfig {
    pub fn to_client_config(&self) -> CertsClientConfig {
        CertsClientConfig {
            timeout_secs: self.timeout_secs,
            host_aliases: self.host_aliases.clone(),
        }
    }
}

/// Parse a `FROM=TO` host alias as given on the command line
pub fn parse_host_alias(value: &str) -> Result<(String, String), String> {
    let (from, to) = value
        .split_once('=')
        .ok_or_else(|| format!("Host alias '{}' must have the form FROM=TO", value))?;

    let (from, to) = (from.trim(), to.trim());
    if from.is_empty() || to.is_empty() {
        return Err(format!(
            "Host alias '{}' has an empty host name on one side",
            value
        ));
    }

    Ok((from.to_string(), to.to_string()))
}
