//! Compact JWT decoding
//!
//! Splits a `header.payload[.signature]` string and base64url-decodes the
//! first two segments into typed structures. This is a purely structural
//! step: the signature segment is never read and nothing is verified.

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use serde::{Deserialize, Deserializer, Serialize};
use thiserror::Error;

/// Error type for token decoding
#[derive(Debug, Error)]
pub enum DecodeError {
    /// Fewer than two `.`-separated segments
    #[error("invalid token: expected at least 2 segments, found {0}")]
    MissingSegments(usize),

    /// A segment is not unpadded URL-safe base64
    #[error("invalid base64 in {segment} segment: {source}")]
    Base64 {
        segment: &'static str,
        #[source]
        source: base64::DecodeError,
    },

    /// A decoded segment is not the expected JSON object
    #[error("invalid JSON in {segment} segment: {source}")]
    Json {
        segment: &'static str,
        #[source]
        source: serde_json::Error,
    },
}

/// JOSE header fields this verifier looks at
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Header {
    /// Signing algorithm; empty when the header omits it
    #[serde(rename = "alg", default)]
    pub algorithm: String,

    /// Key ID used to pick a key from the issuer key set. A non-string
    /// `kid` is treated as absent rather than failing the decode.
    #[serde(
        rename = "kid",
        default,
        deserialize_with = "string_or_none",
        skip_serializing_if = "Option::is_none"
    )]
    pub key_id: Option<String>,
}

fn string_or_none<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    let value = Option::<serde_json::Value>::deserialize(deserializer)?;
    Ok(match value {
        Some(serde_json::Value::String(s)) => Some(s),
        _ => None,
    })
}

/// Registered claims plus everything else the payload carries.
///
/// Some clients send `iat`/`exp` as floats, so timestamps are `f64`.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ClaimSet {
    #[serde(rename = "sub", default, skip_serializing_if = "Option::is_none")]
    pub subject: Option<String>,

    #[serde(rename = "iat", default, skip_serializing_if = "Option::is_none")]
    pub issued_at: Option<f64>,

    #[serde(rename = "exp", default, skip_serializing_if = "Option::is_none")]
    pub expires_at: Option<f64>,

    #[serde(rename = "iss", default, skip_serializing_if = "Option::is_none")]
    pub issuer: Option<String>,

    #[serde(flatten)]
    pub other_claims: serde_json::Map<String, serde_json::Value>,
}

impl ClaimSet {
    /// `iat` truncated to whole seconds, if present
    pub fn issued_at_secs(&self) -> Option<i64> {
        self.issued_at.map(|t| t as i64)
    }

    /// `exp` truncated to whole seconds, if present
    pub fn expires_at_secs(&self) -> Option<i64> {
        self.expires_at.map(|t| t as i64)
    }
}

/// Decode the header and claim set of a compact JWT.
pub fn decode(token: &str) -> Result<(Header, ClaimSet), DecodeError> {
    let segments: Vec<&str> = token.split('.').collect();
    if segments.len() < 2 {
        return Err(DecodeError::MissingSegments(segments.len()));
    }

    let header: Header = decode_segment(segments[0], "header")?;
    let claims: ClaimSet = decode_segment(segments[1], "payload")?;

    Ok((header, claims))
}

fn decode_segment<T: serde::de::DeserializeOwned>(
    segment: &str,
    name: &'static str,
) -> Result<T, DecodeError> {
    let bytes = URL_SAFE_NO_PAD
        .decode(segment)
        .map_err(|source| DecodeError::Base64 {
            segment: name,
            source,
        })?;

    serde_json::from_slice(&bytes).map_err(|source| DecodeError::Json {
        segment: name,
        source,
    })
}
