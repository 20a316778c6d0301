// Shared helpers for building tokens in tests
#![allow(dead_code)]

use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use base64::Engine as _;
use jsonwebtoken::{encode, Algorithm, EncodingKey, Header};
use serde_json::Value;

pub const NOW: i64 = 1_750_000_000;

/// Encode arbitrary header/claims JSON without a signature segment
pub fn unsigned_token(header: &Value, claims: &Value) -> String {
    format!(
        "{}.{}",
        URL_SAFE_NO_PAD.encode(header.to_string()),
        URL_SAFE_NO_PAD.encode(claims.to_string())
    )
}

/// Mint an HS256-signed token, as a real client library would send it
pub fn signed_token(claims: &Value, kid: Option<&str>) -> String {
    let mut header = Header::new(Algorithm::HS256);
    header.kid = kid.map(str::to_string);
    encode(&header, claims, &EncodingKey::from_secret(b"test-secret"))
        .expect("Failed to generate JWT")
}
