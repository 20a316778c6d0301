// Configuration tests through the public API

use serde_json::json;
use unsecured_jwt_info::auth::{VerificationStatus, Verifier};
use unsecured_jwt_info::config::{Config, ConfigOverrides};

use crate::common::{unsigned_token, NOW};

#[test]
fn test_can_deserialize_minimal_valid_yaml_config() {
    let yaml = r#"
allowed_subjects: []
"#;
    let config: Config = serde_yaml::from_str(yaml).expect("Failed to deserialize YAML");
    assert!(config.allowed_subjects.is_empty());
    assert!(config.allowed_algorithms.is_empty());
    assert_eq!(config.clock_skew_secs, 60);
}

#[test]
fn test_unknown_yaml_shape_is_rejected() {
    let yaml = r#"
allowed_subjects: "alice"
"#;
    assert!(Config::from_yaml_with_env(yaml).is_err());
}

#[tokio::test]
async fn test_loaded_config_drives_verifier() {
    let mut config = Config::from_yaml_with_env(
        r#"
allowed_subjects: ["alice"]
allowed_algorithms: ["RS256"]
clock_skew_secs: 0
"#,
    )
    .unwrap();
    config.apply_overrides(ConfigOverrides {
        allowed_subjects: vec!["bob".to_string()],
        ..Default::default()
    });
    config.validate().unwrap();

    let verifier = Verifier::new(config.verifier_config());
    assert_eq!(verifier.config().clock_skew_secs, 0);
    assert!(verifier.config().allowed_subjects.contains("bob"));
    assert!(verifier.config().allowed_algorithms.contains("RS256"));

    let bob = unsigned_token(
        &json!({"alg": "RS256"}),
        &json!({"sub": "bob", "iat": NOW - 10, "exp": NOW + 60}),
    );
    assert_eq!(verifier.verify_at(&bob, NOW).await, VerificationStatus::Ok);

    let carol = unsigned_token(
        &json!({"alg": "RS256"}),
        &json!({"sub": "carol", "iat": NOW - 10, "exp": NOW + 60}),
    );
    assert_eq!(
        verifier.verify_at(&carol, NOW).await,
        VerificationStatus::Unauthorized
    );

    // Zero skew: one second past exp is already expired
    let just_expired = unsigned_token(
        &json!({"alg": "RS256"}),
        &json!({"sub": "alice", "iat": NOW - 10, "exp": NOW - 1}),
    );
    assert_eq!(
        verifier.verify_at(&just_expired, NOW).await,
        VerificationStatus::Expired
    );
}
