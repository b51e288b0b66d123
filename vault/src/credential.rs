//! Credential issuance and lease lifecycle.

use crate::{
    client::VaultClient,
    error::{VaultError, VaultResult},
    ids::{LeaseId, MountPath, RoleName},
    secrets::{DatabaseCredentials, DatabaseCredsData, LeaseInfo, RenewResponse, SecretResponse},
};
use reqwest::{Method, StatusCode};
use secrecy::SecretString;
use std::{sync::Arc, time::Duration};
use tracing::{debug, info, instrument};

const REVOKE_PATH: &str = "sys/leases/revoke";
const RENEW_PATH: &str = "sys/leases/renew";
const LOOKUP_PATH: &str = "sys/leases/lookup";

/// Issues database credentials and manages their leases.
///
/// Which credentials belong to which lease is tracked by Vault and the
/// caller, never here.
#[derive(Debug, Clone)]
pub struct CredentialManager {
    mount: MountPath,
    client: Arc<VaultClient>,
}

impl CredentialManager {
    /// Create a manager for the given mount.
    #[must_use]
    pub const fn new(client: Arc<VaultClient>, mount: MountPath) -> Self {
        Self { mount, client }
    }

    /// Mount this manager operates on.
    #[must_use]
    pub const fn mount_path(&self) -> &MountPath {
        &self.mount
    }

    /// Generate credentials under a role.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`] if Vault refuses, [`VaultError::InvalidInput`]
    /// if the response carries no lease id.
    #[instrument(skip(self), fields(mount = %self.mount))]
    pub async fn get_credentials(&self, role: &RoleName) -> VaultResult<DatabaseCredentials> {
        let path = self.mount.join(&format!("creds/{}", role.path_segment()));
        let response: SecretResponse<DatabaseCredsData> =
            self.client.request(Method::GET, &path, None).await?;

        let lease_id = LeaseId::new(response.lease_id)?;
        debug!(lease_id = %lease_id, ttl_secs = response.lease_duration, "Issued database credentials");

        Ok(DatabaseCredentials {
            username: response.data.username,
            password: SecretString::from(response.data.password),
            lease_id,
            lease_duration: Duration::from_secs(response.lease_duration),
            renewable: response.renewable,
        })
    }

    /// Revoke a lease, invalidating its credentials immediately.
    ///
    /// One request, no retry.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`] if Vault rejects the revocation,
    /// [`VaultError::Transport`] if it could not be reached.
    #[instrument(skip(self))]
    pub async fn revoke_lease(&self, lease_id: &LeaseId) -> VaultResult<()> {
        let body = serde_json::json!({ "lease_id": lease_id.as_str() });
        self.client.send(Method::PUT, REVOKE_PATH, Some(&body)).await?;
        info!("Revoked lease");
        Ok(())
    }

    /// Extend a lease by `increment`, returning the TTL Vault granted.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`] if the lease is unknown or not renewable.
    #[instrument(skip(self))]
    pub async fn renew_lease(&self, lease_id: &LeaseId, increment: Duration) -> VaultResult<Duration> {
        let body = serde_json::json!({
            "lease_id": lease_id.as_str(),
            "increment": increment.as_secs()
        });
        let response: RenewResponse = self.client.request(Method::PUT, RENEW_PATH, Some(&body)).await?;
        debug!(ttl_secs = response.lease_duration, "Renewed lease");
        Ok(Duration::from_secs(response.lease_duration))
    }

    /// Look up a lease.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`] with status 400 if Vault does not know the
    /// lease.
    #[instrument(skip(self))]
    pub async fn lookup_lease(&self, lease_id: &LeaseId) -> VaultResult<LeaseInfo> {
        let body = serde_json::json!({ "lease_id": lease_id.as_str() });
        let response: SecretResponse<LeaseInfo> =
            self.client.request(Method::PUT, LOOKUP_PATH, Some(&body)).await?;
        Ok(response.data)
    }

    /// Check whether a lease is gone or out of time.
    ///
    /// Vault reports revoked and expired leases alike as an invalid lease,
    /// so both count as expired.
    ///
    /// # Errors
    ///
    /// Any lookup failure other than an invalid lease.
    #[instrument(skip(self))]
    pub async fn is_lease_expired(&self, lease_id: &LeaseId) -> VaultResult<bool> {
        match self.lookup_lease(lease_id).await {
            Ok(info) => Ok(info.is_expired()),
            Err(VaultError::Backend { status, body })
                if status == StatusCode::BAD_REQUEST && body.contains("invalid lease") =>
            {
                debug!("Lease unknown to Vault");
                Ok(true)
            }
            Err(e) => Err(e),
        }
    }
}
