// Line protocol tests over an in-memory duplex stream

use std::sync::Arc;

use serde_json::json;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use unsecured_jwt_info::auth::{VerificationStatus, Verifier, VerifierConfig, VerifyResponse};
use unsecured_jwt_info::server::serve;

use crate::common::signed_token;

#[tokio::test]
async fn test_serves_requests_until_input_closes() {
    let verifier = Arc::new(Verifier::new(VerifierConfig::new().allow_subject("alice")));

    let (mut client_in, server_in) = tokio::io::duplex(4096);
    let (server_out, client_out) = tokio::io::duplex(4096);

    let handle = tokio::spawn(serve(verifier, BufReader::new(server_in), server_out));

    let now = chrono::Utc::now().timestamp();
    let alice = signed_token(&json!({"sub": "alice", "iat": now - 10, "exp": now + 3600}), None);
    let bob = signed_token(&json!({"sub": "bob", "iat": now - 10, "exp": now + 3600}), None);

    let input = format!(
        "{}\n{}\n{}\n",
        json!({"token": alice}),
        json!({"token": bob}),
        json!({"token": ""})
    );
    client_in.write_all(input.as_bytes()).await.unwrap();
    drop(client_in);

    let stats = handle.await.unwrap().unwrap();
    assert_eq!(stats.requests, 3);
    assert_eq!(stats.accepted, 1);
    assert_eq!(stats.malformed, 0);

    let mut lines = BufReader::new(client_out).lines();
    let mut responses = Vec::new();
    while let Some(line) = lines.next_line().await.unwrap() {
        responses.push(serde_json::from_str::<VerifyResponse>(&line).unwrap());
    }

    assert_eq!(
        responses,
        vec![
            VerifyResponse {
                success: true,
                status: 0
            },
            VerifyResponse {
                success: false,
                status: 4
            },
            VerifyResponse {
                success: false,
                status: 1
            },
        ]
    );
}

#[tokio::test]
async fn test_request_without_token_field_is_empty_token() {
    let verifier = Arc::new(Verifier::new(VerifierConfig::default()));
    let mut output = Vec::new();

    serve(verifier, BufReader::new(&b"{}\n"[..]), &mut output)
        .await
        .unwrap();

    let response: VerifyResponse =
        serde_json::from_str(String::from_utf8(output).unwrap().trim()).unwrap();
    assert_eq!(
        VerificationStatus::from_code(response.status),
        Some(VerificationStatus::EmptyToken)
    );
    assert!(!response.success);
}
