// End-to-end verification with the HTTP key resolver
//
// The certificate lookup is best-effort: these tests confirm it reaches the
// issuer when it should and never alters the verification status.

use std::sync::Arc;

use serde_json::json;
use unsecured_jwt_info::auth::jwks_client::{CertsClient, CertsClientConfig};
use unsecured_jwt_info::auth::{VerificationStatus, Verifier, VerifierConfig};
use wiremock::matchers::{method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

use crate::common::{signed_token, NOW};

const CERTS_PATH: &str = "/realms/kafka/protocol/openid-connect/certs";

fn verifier() -> Verifier {
    let client = CertsClient::new(CertsClientConfig {
        timeout_secs: 2,
        ..Default::default()
    })
    .unwrap();
    Verifier::new(VerifierConfig::default()).with_resolver(Arc::new(client))
}

#[tokio::test]
async fn test_issuer_certs_fetched_once_per_verification() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CERTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{"kid": "k1", "kty": "RSA", "x5c": ["MIIC-k1"]}]
        })))
        .expect(2)
        .mount(&server)
        .await;

    let token = signed_token(
        &json!({
            "sub": "alice",
            "iat": NOW - 10,
            "exp": NOW + 3600,
            "iss": format!("{}/realms/kafka", server.uri())
        }),
        Some("k1"),
    );

    let verifier = verifier();
    assert_eq!(verifier.verify_at(&token, NOW).await, VerificationStatus::Ok);
    assert_eq!(verifier.verify_at(&token, NOW).await, VerificationStatus::Ok);
    // Mock expectations are verified when `server` drops
}

#[tokio::test]
async fn test_issuer_failure_still_ok() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CERTS_PATH))
        .respond_with(ResponseTemplate::new(500))
        .expect(1)
        .mount(&server)
        .await;

    let token = signed_token(
        &json!({
            "sub": "alice",
            "iat": NOW - 10,
            "exp": NOW + 3600,
            "iss": format!("{}/realms/kafka", server.uri())
        }),
        None,
    );

    assert_eq!(
        verifier().verify_at(&token, NOW).await,
        VerificationStatus::Ok
    );
}

#[tokio::test]
async fn test_kid_missing_from_issuer_still_expired() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path(CERTS_PATH))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({
            "keys": [{"kid": "k1", "kty": "RSA", "x5c": ["MIIC-k1"]}]
        })))
        .mount(&server)
        .await;

    let token = signed_token(
        &json!({
            "sub": "alice",
            "iat": NOW - 7200,
            "exp": NOW - 90,
            "iss": format!("{}/realms/kafka", server.uri())
        }),
        Some("rotated"),
    );

    assert_eq!(
        verifier().verify_at(&token, NOW).await,
        VerificationStatus::Expired
    );
}

#[tokio::test]
async fn test_unreachable_and_invalid_issuers_still_ok() {
    let issuers = [
        "http://127.0.0.1:1/realms/kafka",
        "not-a-url",
        "urn:example:issuer",
    ];

    let verifier = verifier();
    for iss in issuers {
        let token = signed_token(
            &json!({"sub": "alice", "iat": NOW - 10, "exp": NOW + 3600, "iss": iss}),
            None,
        );
        assert_eq!(
            verifier.verify_at(&token, NOW).await,
            VerificationStatus::Ok,
            "issuer: {}",
            iss
        );
    }
}
