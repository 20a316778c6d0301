//! JWKS (JSON Web Key Set) support
//!
//! Types for the key set served by an issuer's certs endpoint, and the
//! key selection rules used when resolving a validation certificate.

use serde::{Deserialize, Serialize};

use super::jwks_client::FetchError;

/// JSON Web Key Set (JWKS) - a set of JWK keys
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Jwks {
    /// The keys in the JWKS, in the order the issuer returned them
    #[serde(default)]
    pub keys: Vec<JwkKey>,
}

impl Jwks {
    /// Find a key by its Key ID (kid)
    pub fn find_key_by_kid(&self, kid: &str) -> Option<&JwkKey> {
        self.keys.iter().find(|k| k.kid == kid)
    }

    /// Pick the key used for validation.
    ///
    /// With a `kid` hint the key must match exactly; without one the first
    /// key in the set is used.
    pub fn select_key(&self, kid: Option<&str>) -> Result<&JwkKey, FetchError> {
        if self.keys.is_empty() {
            return Err(FetchError::EmptyKeySet);
        }

        match kid {
            Some(kid) => self
                .find_key_by_kid(kid)
                .ok_or_else(|| FetchError::KeyNotFound(kid.to_string())),
            None => Ok(&self.keys[0]),
        }
    }

    /// Select a key and return the first entry of its certificate chain.
    pub fn select_certificate(&self, kid: Option<&str>) -> Result<ResolvedCertificate, FetchError> {
        let key = self.select_key(kid)?;
        let certificate = key
            .first_certificate()
            .ok_or_else(|| FetchError::MissingCertificate(key.kid.clone()))?;

        Ok(ResolvedCertificate {
            certificate: certificate.to_string(),
            key_id: key.kid.clone(),
        })
    }
}

/// JSON Web Key (JWK) - a single key in a JWKS
///
/// Fields the issuer leaves out decode as empty values.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct JwkKey {
    /// Key ID - unique identifier for the key
    pub kid: String,

    /// Key Type (e.g., "RSA", "EC")
    pub kty: String,

    /// Algorithm intended for use with the key (e.g., "RS256")
    pub alg: String,

    /// Public Key Use ("sig" for signature, "enc" for encryption)
    #[serde(rename = "use")]
    pub key_use: String,

    /// RSA modulus (base64url-encoded)
    pub n: String,

    /// RSA public exponent (base64url-encoded)
    pub e: String,

    /// X.509 certificate chain, leaf first (base64 DER)
    pub x5c: Vec<String>,

    /// X.509 certificate SHA-1 thumbprint
    pub x5t: String,

    /// X.509 certificate SHA-256 thumbprint
    #[serde(rename = "x5t#S256")]
    pub x5t_s256: String,
}

impl JwkKey {
    /// Leaf certificate of the chain, if any
    pub fn first_certificate(&self) -> Option<&str> {
        self.x5c.first().map(String::as_str)
    }
}

/// Certificate chosen for a token, together with the key it came from
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedCertificate {
    /// First `x5c` entry of the selected key
    pub certificate: String,
    /// `kid` of the selected key; empty if the issuer did not set one
    pub key_id: String,
}
