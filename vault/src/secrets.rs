//! Wire types for the database secrets engine and the lease endpoints.

use crate::ids::LeaseId;
use chrono::{DateTime, Utc};
use secrecy::SecretString;
use serde::{Deserialize, Serialize};
use std::time::Duration;

/// Standard Vault response envelope.
#[derive(Debug, Deserialize)]
pub struct SecretResponse<T> {
    #[serde(default)]
    pub lease_id: String,
    #[serde(default)]
    pub lease_duration: u64,
    #[serde(default)]
    pub renewable: bool,
    pub data: T,
}

/// Role configuration on a database secrets engine.
///
/// TTLs are in seconds; zero means "use the mount default".
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RoleDefinition {
    /// Connection configured under `<mount>/config/<db_name>`
    pub db_name: String,
    /// Statements run to create the database user
    #[serde(default)]
    pub creation_statements: Vec<String>,
    /// Statements run when the lease is revoked
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub revocation_statements: Vec<String>,
    /// Statements run if user creation fails halfway
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub rollback_statements: Vec<String>,
    /// Statements run when the lease is renewed
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub renew_statements: Vec<String>,
    /// Default lease TTL in seconds
    #[serde(default)]
    pub default_ttl: u64,
    /// Maximum lease TTL in seconds
    #[serde(default)]
    pub max_ttl: u64,
}

impl RoleDefinition {
    /// Role for the given connection with a single creation statement.
    #[must_use]
    pub fn new(db_name: impl Into<String>, creation_statement: impl Into<String>) -> Self {
        Self {
            db_name: db_name.into(),
            creation_statements: vec![creation_statement.into()],
            ..Default::default()
        }
    }

    /// Set default and maximum TTL.
    #[must_use]
    pub const fn with_ttl(mut self, default_ttl: Duration, max_ttl: Duration) -> Self {
        self.default_ttl = default_ttl.as_secs();
        self.max_ttl = max_ttl.as_secs();
        self
    }

    /// Set revocation statements.
    #[must_use]
    pub fn with_revocation_statements(mut self, statements: Vec<String>) -> Self {
        self.revocation_statements = statements;
        self
    }
}

/// `LIST` payload.
#[derive(Debug, Deserialize)]
pub struct ListData {
    #[serde(default)]
    pub keys: Vec<String>,
}

/// `<mount>/creds/<role>` payload.
#[derive(Debug, Deserialize)]
pub struct DatabaseCredsData {
    pub username: String,
    pub password: String,
}

/// `sys/leases/renew` response.
#[derive(Debug, Deserialize)]
pub struct RenewResponse {
    pub lease_duration: u64,
}

/// Lease state as reported by `sys/leases/lookup`.
#[derive(Debug, Clone, Deserialize)]
pub struct LeaseInfo {
    /// Lease id
    pub id: String,
    /// When the lease was issued
    pub issue_time: DateTime<Utc>,
    /// When the lease expires, absent for non-expiring leases
    pub expire_time: Option<DateTime<Utc>>,
    /// Last renewal, absent if never renewed
    pub last_renewal: Option<DateTime<Utc>>,
    /// Whether the lease can be renewed
    #[serde(default)]
    pub renewable: bool,
    /// Remaining seconds
    #[serde(default)]
    pub ttl: i64,
}

impl LeaseInfo {
    /// Check if the lease has no time left.
    #[must_use]
    pub const fn is_expired(&self) -> bool {
        self.ttl <= 0 && self.expire_time.is_some()
    }
}

/// Dynamic database credentials with lease information.
#[derive(Debug, Clone)]
pub struct DatabaseCredentials {
    /// Generated database user
    pub username: String,
    /// Generated password
    pub password: SecretString,
    /// Lease to renew or revoke these credentials with
    pub lease_id: LeaseId,
    /// Lease TTL at issue time
    pub lease_duration: Duration,
    /// Whether the lease can be renewed
    pub renewable: bool,
}

impl DatabaseCredentials {
    /// Check if credentials should be renewed (at 80% of TTL).
    #[must_use]
    pub fn should_renew(&self, elapsed: Duration) -> bool {
        let threshold = self.lease_duration.as_secs_f64() * 0.8;
        elapsed.as_secs_f64() >= threshold
    }
}
