//! Role lifecycle on a database secrets engine mount.

use crate::{
    client::VaultClient,
    error::VaultResult,
    ids::{MountPath, RoleName},
    secrets::{ListData, RoleDefinition, SecretResponse},
};
use reqwest::Method;
use std::sync::Arc;
use tracing::{debug, info, instrument};

/// Manages roles under `<mount>/roles/`.
///
/// Holds a shared handle to the transport; dropping the manager never tears
/// the client down.
#[derive(Debug, Clone)]
pub struct RoleManager {
    mount: MountPath,
    client: Arc<VaultClient>,
}

impl RoleManager {
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

    fn role_path(&self, name: &RoleName) -> String {
        self.mount.join(&format!("roles/{}", name.path_segment()))
    }

    /// Delete a role.
    ///
    /// Existence is not checked locally; whatever Vault answers is returned.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`](crate::VaultError::Backend) with Vault's
    /// status and body on any non-2xx response.
    #[instrument(skip(self), fields(mount = %self.mount))]
    pub async fn delete_role(&self, name: &RoleName) -> VaultResult<()> {
        self.client
            .send(Method::DELETE, &self.role_path(name), None)
            .await?;
        info!(role = %name, "Deleted database role");
        Ok(())
    }

    /// Create or overwrite a role.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`](crate::VaultError::Backend) if Vault rejects
    /// the definition.
    #[instrument(skip(self, definition), fields(mount = %self.mount, db_name = %definition.db_name))]
    pub async fn create_role(&self, name: &RoleName, definition: &RoleDefinition) -> VaultResult<()> {
        let body = serde_json::to_value(definition)?;
        self.client
            .send(Method::POST, &self.role_path(name), Some(&body))
            .await?;
        info!(role = %name, "Wrote database role");
        Ok(())
    }

    /// Read a role definition.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`](crate::VaultError::Backend) with status 404
    /// if the role does not exist.
    #[instrument(skip(self), fields(mount = %self.mount))]
    pub async fn read_role(&self, name: &RoleName) -> VaultResult<RoleDefinition> {
        let response: SecretResponse<RoleDefinition> = self
            .client
            .request(Method::GET, &self.role_path(name), None)
            .await?;
        Ok(response.data)
    }

    /// List role names on the mount.
    ///
    /// Vault answers 404 when there are no roles; that is an empty list here.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`](crate::VaultError::Backend) on any other
    /// non-2xx response.
    #[instrument(skip(self), fields(mount = %self.mount))]
    pub async fn list_roles(&self) -> VaultResult<Vec<String>> {
        let path = self.mount.join("roles?list=true");
        match self
            .client
            .request::<SecretResponse<ListData>>(Method::GET, &path, None)
            .await
        {
            Ok(response) => Ok(response.data.keys),
            Err(e) if e.is_not_found() => {
                debug!("No roles on mount");
                Ok(Vec::new())
            }
            Err(e) => Err(e),
        }
    }
}
