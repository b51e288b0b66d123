//! HashiCorp Vault database secrets engine client.
//!
//! Two facades share one authenticated [`VaultClient`]:
//! - [`RoleManager`] creates, reads, lists and deletes roles on a mount
//! - [`CredentialManager`] issues credentials and revokes, renews or looks
//!   up their leases
//!
//! ```no_run
//! use std::sync::Arc;
//! use vault_dbcreds::{CredentialManager, LeaseId, MountPath, RoleManager, RoleName, VaultClient, VaultConfig};
//!
//! # async fn run() -> vault_dbcreds::VaultResult<()> {
//! let client = Arc::new(VaultClient::new(VaultConfig::from_env()?)?);
//! let mount = MountPath::new("database")?;
//!
//! RoleManager::new(Arc::clone(&client), mount.clone())
//!     .delete_role(&RoleName::new("readonly")?)
//!     .await?;
//! CredentialManager::new(client, mount)
//!     .revoke_lease(&LeaseId::new("database/creds/readonly/2f6a614c")?)
//!     .await?;
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod config;
pub mod credential;
pub mod error;
pub mod ids;
pub mod role;
pub mod secrets;
pub mod telemetry;

pub use client::{VaultClient, VaultResponse};
pub use config::VaultConfig;
pub use credential::CredentialManager;
pub use error::{VaultError, VaultResult};
pub use ids::{LeaseId, MountPath, RoleName};
pub use role::RoleManager;
pub use secrets::{DatabaseCredentials, LeaseInfo, RoleDefinition};
pub use telemetry::{TracingConfig, init_tracing};
