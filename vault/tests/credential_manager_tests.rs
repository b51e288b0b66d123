//! Credential and lease operations against a mock Vault server.

use secrecy::ExposeSecret;
use std::{sync::Arc, time::Duration};
use vault_dbcreds::{
    CredentialManager, LeaseId, MountPath, RoleManager, RoleName, VaultClient, VaultConfig, VaultError,
};
use wiremock::matchers::{body_json, header, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

const TOKEN: &str = "s.test-token";
const LEASE: &str = "database/creds/test/33b022a7-7d50-4622-a74e-9c468d1d6e38";

fn manager(server: &MockServer) -> CredentialManager {
    let client = VaultClient::new(VaultConfig::new(server.uri(), TOKEN)).unwrap();
    CredentialManager::new(Arc::new(client), MountPath::new("database").unwrap())
}

fn lease() -> LeaseId {
    LeaseId::new(LEASE).unwrap()
}

#[tokio::test]
async fn revoke_lease_successful() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/revoke"))
        .and(header("X-Vault-Token", TOKEN))
        .and(body_json(serde_json::json!({ "lease_id": LEASE })))
        .respond_with(ResponseTemplate::new(204))
        .expect(1)
        .mount(&server)
        .await;

    manager(&server).revoke_lease(&lease()).await.unwrap();
}

#[tokio::test]
async fn revoke_lease_rejected() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/revoke"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errors":["invalid lease ID"]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = manager(&server).revoke_lease(&lease()).await.unwrap_err();
    match err {
        VaultError::Backend { status, body } => {
            assert_eq!(status.as_u16(), 400);
            assert!(body.contains("invalid lease ID"));
        }
        other => panic!("expected backend error, got {other:?}"),
    }
}

#[tokio::test]
async fn revoke_lease_unauthorized_is_not_retryable() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/revoke"))
        .respond_with(ResponseTemplate::new(403).set_body_string("permission denied"))
        .mount(&server)
        .await;

    let err = manager(&server).revoke_lease(&lease()).await.unwrap_err();
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn get_credentials_returns_lease() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/database/creds/test"))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "request_id": "2c3d1f7e",
            "lease_id": LEASE,
            "lease_duration": 3600,
            "renewable": true,
            "data": {
                "username": "v-token-test-8aQ1",
                "password": "A1a-s3cr3t"
            },
            "warnings": null
        })))
        .mount(&server)
        .await;

    let creds = manager(&server)
        .get_credentials(&RoleName::new("test").unwrap())
        .await
        .unwrap();

    assert_eq!(creds.username, "v-token-test-8aQ1");
    assert_eq!(creds.password.expose_secret(), "A1a-s3cr3t");
    assert_eq!(creds.lease_id, lease());
    assert_eq!(creds.lease_duration, Duration::from_secs(3600));
    assert!(creds.renewable);
}

#[tokio::test]
async fn get_credentials_encodes_role_name() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/database/creds/..%2F..%2Fsys%2Fmounts"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errors":["unknown role"]}"#),
        )
        .expect(1)
        .mount(&server)
        .await;

    let err = manager(&server)
        .get_credentials(&RoleName::new("../../sys/mounts").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn get_credentials_unknown_role() {
    let server = MockServer::start().await;
    Mock::given(method("GET"))
        .and(path("/v1/database/creds/nope"))
        .respond_with(
            ResponseTemplate::new(400).set_body_string(r#"{"errors":["unknown role: nope"]}"#),
        )
        .mount(&server)
        .await;

    let err = manager(&server)
        .get_credentials(&RoleName::new("nope").unwrap())
        .await
        .unwrap_err();
    assert_eq!(err.status().map(|s| s.as_u16()), Some(400));
}

#[tokio::test]
async fn renew_lease_returns_granted_ttl() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/renew"))
        .and(body_json(serde_json::json!({ "lease_id": LEASE, "increment": 600 })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "lease_id": LEASE,
            "lease_duration": 300,
            "renewable": true
        })))
        .mount(&server)
        .await;

    let ttl = manager(&server)
        .renew_lease(&lease(), Duration::from_secs(600))
        .await
        .unwrap();
    assert_eq!(ttl, Duration::from_secs(300));
}

#[tokio::test]
async fn lookup_and_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/lookup"))
        .and(body_json(serde_json::json!({ "lease_id": LEASE })))
        .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
            "data": {
                "id": LEASE,
                "issue_time": "2024-05-01T12:00:00.000000Z",
                "expire_time": "2024-05-01T13:00:00.000000Z",
                "last_renewal": null,
                "renewable": true,
                "ttl": 1800
            }
        })))
        .mount(&server)
        .await;

    let credentials = manager(&server);
    let info = credentials.lookup_lease(&lease()).await.unwrap();
    assert_eq!(info.id, LEASE);
    assert_eq!(info.ttl, 1800);
    assert!(!credentials.is_lease_expired(&lease()).await.unwrap());
}

#[tokio::test]
async fn invalid_lease_counts_as_expired() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/lookup"))
        .respond_with(ResponseTemplate::new(400).set_body_string(r#"{"errors":["invalid lease"]}"#))
        .mount(&server)
        .await;

    assert!(manager(&server).is_lease_expired(&lease()).await.unwrap());
}

#[tokio::test]
async fn lookup_failure_is_not_expiry() {
    let server = MockServer::start().await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/lookup"))
        .respond_with(ResponseTemplate::new(503).set_body_string("Vault is sealed"))
        .mount(&server)
        .await;

    let err = manager(&server).is_lease_expired(&lease()).await.unwrap_err();
    assert!(err.is_retryable());
}

#[tokio::test]
async fn managers_share_one_client() {
    let server = MockServer::start().await;
    Mock::given(method("DELETE"))
        .and(path("/v1/database/roles/test"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;
    Mock::given(method("PUT"))
        .and(path("/v1/sys/leases/revoke"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&server)
        .await;

    let client = Arc::new(VaultClient::new(VaultConfig::new(server.uri(), TOKEN)).unwrap());
    let mount = MountPath::new("database").unwrap();
    let roles = RoleManager::new(Arc::clone(&client), mount.clone());
    let credentials = CredentialManager::new(Arc::clone(&client), mount);

    let role_name = RoleName::new("test").unwrap();
    let lease_id = lease();
    let (deleted, revoked) = tokio::join!(
        roles.delete_role(&role_name),
        credentials.revoke_lease(&lease_id),
    );
    deleted.unwrap();
    revoked.unwrap();

    drop(roles);
    drop(credentials);
    assert_eq!(Arc::strong_count(&client), 1);
}

/// Revokes a real lease when pointed at a live Vault.
///
/// Run with `cargo test -- --ignored` and `VAULT_ADDR`, `VAULT_TOKEN` and
/// `VAULT_TEST_LEASE_ID` set.
#[tokio::test]
#[ignore = "needs a live Vault: VAULT_ADDR, VAULT_TOKEN, VAULT_TEST_LEASE_ID"]
async fn revoke_lease_live() {
    let lease_id = std::env::var("VAULT_TEST_LEASE_ID").expect("VAULT_TEST_LEASE_ID not set");
    let config = VaultConfig::from_env().expect("VAULT_ADDR/VAULT_TOKEN not usable");

    let client = VaultClient::new(config.with_tls_skip_verify(true)).unwrap();
    let credentials = CredentialManager::new(Arc::new(client), MountPath::new("database").unwrap());

    credentials
        .revoke_lease(&LeaseId::new(lease_id).unwrap())
        .await
        .unwrap();
}
