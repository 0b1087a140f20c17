//! Client configuration.
//!
//! Built from the provider block, where `WAYPOINT_ADDR` and `WAYPOINT_TOKEN`
//! fill in attributes left unset.

use std::time::Duration;

use url::Url;

use crate::error::{ClientError, ClientResult};

/// Address used when none is configured
pub const DEFAULT_ADDRESS: &str = "https://localhost:9702";

/// Default HTTP request timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

/// Configuration for the Waypoint API client.
#[derive(Clone)]
pub struct ClientConfig {
    /// Server address, with or without scheme.
    pub address: String,

    /// Token sent as a bearer credential on every request.
    pub token: String,

    /// Skip TLS certificate verification.
    pub tls_skip_verify: bool,

    /// HTTP request timeout.
    pub timeout: Duration,
}

impl Default for ClientConfig {
    fn default() -> Self {
        Self {
            address: DEFAULT_ADDRESS.to_string(),
            token: String::new(),
            tls_skip_verify: false,
            timeout: DEFAULT_TIMEOUT,
        }
    }
}

impl std::fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("ClientConfig")
            .field("address", &self.address)
            .field("token", &"<redacted>")
            .field("tls_skip_verify", &self.tls_skip_verify)
            .field("timeout", &self.timeout)
            .finish()
    }
}

impl ClientConfig {
    pub fn new(address: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            address: address.into(),
            token: token.into(),
            ..Self::default()
        }
    }

    pub fn with_tls_skip_verify(mut self, skip: bool) -> Self {
        self.tls_skip_verify = skip;
        self
    }

    /// Base URL of the server API.
    ///
    /// An address without scheme is served over HTTPS.
    pub fn base_url(&self) -> ClientResult<Url> {
        let address = self.address.trim();
        let address = if address.is_empty() {
            DEFAULT_ADDRESS.to_string()
        } else if address.contains("://") {
            address.to_string()
        } else {
            format!("https://{}", address)
        };

        let url = Url::parse(&address).map_err(|e| ClientError::InvalidAddress {
            address: self.address.clone(),
            reason: e.to_string(),
        })?;

        match url.scheme() {
            "http" | "https" => Ok(url),
            other => Err(ClientError::InvalidAddress {
                address: self.address.clone(),
                reason: format!("unsupported scheme '{}'", other),
            }),
        }
    }
}
