//! Vault client configuration.
//!
//! Reads the same environment variables as the Vault CLI so a process
//! configured for `vault` works unchanged.

use crate::error::{VaultError, VaultResult};
use secrecy::{ExposeSecret, SecretString};
use std::{path::PathBuf, time::Duration};
use url::Url;

/// Vault server address variable.
pub const ENV_VAULT_ADDR: &str = "VAULT_ADDR";
/// Client token variable.
pub const ENV_VAULT_TOKEN: &str = "VAULT_TOKEN";
/// Enterprise namespace variable.
pub const ENV_VAULT_NAMESPACE: &str = "VAULT_NAMESPACE";
/// Disable TLS verification variable.
pub const ENV_VAULT_SKIP_VERIFY: &str = "VAULT_SKIP_VERIFY";
/// PEM CA bundle path variable.
pub const ENV_VAULT_CACERT: &str = "VAULT_CACERT";
/// Request timeout variable, in seconds.
pub const ENV_VAULT_CLIENT_TIMEOUT: &str = "VAULT_CLIENT_TIMEOUT";

const DEFAULT_ADDR: &str = "https://127.0.0.1:8200";

/// Vault client configuration.
#[derive(Debug, Clone)]
pub struct VaultConfig {
    /// Vault server address
    pub addr: String,
    /// Client token sent as `X-Vault-Token`
    pub token: SecretString,
    /// Namespace sent as `X-Vault-Namespace`
    pub namespace: Option<String>,
    /// Request timeout
    pub timeout: Duration,
    /// Connection timeout
    pub connect_timeout: Duration,
    /// Accept any server certificate
    pub tls_skip_verify: bool,
    /// Extra PEM CA bundle to trust
    pub ca_cert: Option<PathBuf>,
    /// User agent string
    pub user_agent: String,
}

impl Default for VaultConfig {
    fn default() -> Self {
        Self {
            addr: DEFAULT_ADDR.to_string(),
            token: SecretString::from(String::new()),
            namespace: None,
            timeout: Duration::from_secs(60),
            connect_timeout: Duration::from_secs(10),
            tls_skip_verify: false,
            ca_cert: None,
            user_agent: format!("vault-dbcreds/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl VaultConfig {
    /// Create a new configuration.
    #[must_use]
    pub fn new(addr: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            addr: addr.into(),
            token: SecretString::from(token.into()),
            ..Default::default()
        }
    }

    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] when a variable cannot be parsed
    /// or the resulting configuration fails [`VaultConfig::validate`].
    pub fn from_env() -> VaultResult<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration from an arbitrary key lookup.
    ///
    /// # Errors
    ///
    /// Same as [`VaultConfig::from_env`].
    pub fn from_lookup<F>(lookup: F) -> VaultResult<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        let var = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());

        if let Some(addr) = var(ENV_VAULT_ADDR) {
            config.addr = addr;
        }
        if let Some(token) = var(ENV_VAULT_TOKEN) {
            config.token = SecretString::from(token.trim().to_string());
        }
        config.namespace = var(ENV_VAULT_NAMESPACE);
        if let Some(raw) = var(ENV_VAULT_SKIP_VERIFY) {
            config.tls_skip_verify = parse_bool(&raw).ok_or_else(|| {
                VaultError::invalid_config(format!("{ENV_VAULT_SKIP_VERIFY}: not a boolean: {raw}"))
            })?;
        }
        config.ca_cert = var(ENV_VAULT_CACERT).map(PathBuf::from);
        if let Some(raw) = var(ENV_VAULT_CLIENT_TIMEOUT) {
            config.timeout = parse_timeout(&raw).ok_or_else(|| {
                VaultError::invalid_config(format!("{ENV_VAULT_CLIENT_TIMEOUT}: not a duration: {raw}"))
            })?;
        }

        config.validate()?;
        Ok(config)
    }

    /// Check that the configuration can produce a working client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] for a non-HTTP(S) address or an
    /// empty token.
    pub fn validate(&self) -> VaultResult<()> {
        self.base_url()?;
        if self.token.expose_secret().is_empty() {
            return Err(VaultError::invalid_config("token is empty"));
        }
        if self.timeout.is_zero() {
            return Err(VaultError::invalid_config("timeout must be greater than zero"));
        }
        Ok(())
    }

    /// Parsed server address, without a trailing slash.
    pub(crate) fn base_url(&self) -> VaultResult<Url> {
        let url = Url::parse(self.addr.trim_end_matches('/'))
            .map_err(|e| VaultError::invalid_config(format!("address {:?}: {e}", self.addr)))?;
        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(VaultError::invalid_config(format!(
                "address {:?}: unsupported scheme {other}",
                self.addr
            ))),
        }
    }

    /// Set the namespace.
    #[must_use]
    pub fn with_namespace(mut self, namespace: impl Into<String>) -> Self {
        self.namespace = Some(namespace.into());
        self
    }

    /// Set request timeout.
    #[must_use]
    pub const fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Disable TLS certificate verification.
    #[must_use]
    pub const fn with_tls_skip_verify(mut self, skip: bool) -> Self {
        self.tls_skip_verify = skip;
        self
    }

    /// Trust an additional PEM CA bundle.
    #[must_use]
    pub fn with_ca_cert(mut self, path: impl Into<PathBuf>) -> Self {
        self.ca_cert = Some(path.into());
        self
    }
}

fn parse_bool(raw: &str) -> Option<bool> {
    match raw.trim() {
        "1" | "t" | "T" | "true" | "TRUE" | "True" => Some(true),
        "0" | "f" | "F" | "false" | "FALSE" | "False" => Some(false),
        _ => None,
    }
}

// Accepts "30" or "30s".
fn parse_timeout(raw: &str) -> Option<Duration> {
    let raw = raw.trim();
    let secs = raw.strip_suffix('s').unwrap_or(raw);
    secs.parse::<u64>().ok().map(Duration::from_secs)
}
