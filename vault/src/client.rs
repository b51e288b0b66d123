//! Authenticated Vault HTTP transport.
//!
//! [`VaultClient`] is built once by its owner and handed to the managers as
//! an `Arc`. It knows how to reach Vault and which token to present; it knows
//! nothing about roles or leases.

use crate::{
    config::VaultConfig,
    error::{VaultError, VaultResult},
};
use reqwest::{
    Certificate, Client, Method, StatusCode,
    header::{HeaderMap, HeaderValue},
};
use secrecy::ExposeSecret;
use serde::de::DeserializeOwned;
use tracing::{debug, instrument, warn};

const TOKEN_HEADER: &str = "x-vault-token";
const NAMESPACE_HEADER: &str = "x-vault-namespace";

/// Raw outcome of a successful Vault request.
#[derive(Debug, Clone)]
pub struct VaultResponse {
    /// HTTP status (always 2xx)
    pub status: StatusCode,
    /// Response body, possibly empty (Vault answers 204 for most writes)
    pub body: String,
}

impl VaultResponse {
    /// Decode the body as JSON.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::Serialization`] if the body does not match `T`.
    pub fn json<T: DeserializeOwned>(&self) -> VaultResult<T> {
        serde_json::from_str(&self.body).map_err(VaultError::from)
    }
}

/// Vault client with a pre-configured token and TLS policy.
#[derive(Debug, Clone)]
pub struct VaultClient {
    base_url: String,
    http: Client,
}

impl VaultClient {
    /// Create a new Vault client.
    ///
    /// # Errors
    ///
    /// Returns [`VaultError::InvalidConfig`] if the configuration does not
    /// validate or the CA bundle cannot be loaded, and
    /// [`VaultError::Transport`] if the HTTP stack fails to initialize.
    pub fn new(config: VaultConfig) -> VaultResult<Self> {
        config.validate()?;
        let base_url = config.base_url()?.as_str().trim_end_matches('/').to_string();

        let mut headers = HeaderMap::new();
        let mut token = HeaderValue::from_str(config.token.expose_secret())
            .map_err(|_| VaultError::invalid_config("token contains invalid header characters"))?;
        token.set_sensitive(true);
        headers.insert(TOKEN_HEADER, token);
        if let Some(namespace) = &config.namespace {
            let value = HeaderValue::from_str(namespace).map_err(|_| {
                VaultError::invalid_config("namespace contains invalid header characters")
            })?;
            headers.insert(NAMESPACE_HEADER, value);
        }

        let mut builder = Client::builder()
            .timeout(config.timeout)
            .connect_timeout(config.connect_timeout)
            .user_agent(&config.user_agent)
            .default_headers(headers)
            .use_rustls_tls()
            .danger_accept_invalid_certs(config.tls_skip_verify);

        if let Some(path) = &config.ca_cert {
            let pem = std::fs::read(path).map_err(|e| {
                VaultError::invalid_config(format!("CA bundle {}: {e}", path.display()))
            })?;
            let cert = Certificate::from_pem(&pem).map_err(|e| {
                VaultError::invalid_config(format!("CA bundle {}: {e}", path.display()))
            })?;
            builder = builder.add_root_certificate(cert);
        }

        let http = builder.build()?;
        debug!(addr = %base_url, "Vault client ready");

        Ok(Self { base_url, http })
    }

    /// Server address this client talks to.
    #[must_use]
    pub fn address(&self) -> &str {
        &self.base_url
    }

    /// Send one request to `<addr>/v1/<path>` and classify the status.
    ///
    /// Any non-2xx status becomes [`VaultError::Backend`] with the body kept
    /// verbatim.
    ///
    /// # Errors
    ///
    /// [`VaultError::Backend`] on rejection, [`VaultError::Transport`] when no
    /// response was received.
    #[instrument(skip(self, body))]
    pub async fn send(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> VaultResult<VaultResponse> {
        let url = format!("{}/v1/{}", self.base_url, path.trim_start_matches('/'));
        debug!(%url, "Sending Vault request");

        let mut request = self.http.request(method, &url);
        if let Some(b) = body {
            request = request.json(b);
        }

        let response = request.send().await?;
        let status = response.status();
        let text = response.text().await?;

        if !status.is_success() {
            warn!(path, %status, "Vault rejected request");
            return Err(VaultError::backend(status, text));
        }

        Ok(VaultResponse { status, body: text })
    }

    /// Send a request and decode the JSON response.
    ///
    /// # Errors
    ///
    /// Same as [`VaultClient::send`], plus [`VaultError::Serialization`].
    pub async fn request<T: DeserializeOwned>(
        &self,
        method: Method,
        path: &str,
        body: Option<&serde_json::Value>,
    ) -> VaultResult<T> {
        self.send(method, path, body).await?.json()
    }
}
