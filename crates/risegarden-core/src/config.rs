// ── Runtime connection configuration ──
//
// Describes *how* to talk to the service: where, with which account,
// and with what transport settings. Never touches disk; the config
// crate (or the embedding application) builds one and hands it in.

use std::time::Duration;

use url::Url;

use risegarden_api::transport::DEFAULT_TIMEOUT;
use risegarden_api::{Credentials, DEFAULT_BASE_URL, TlsMode, TransportConfig};

use crate::error::CoreError;

/// Configuration for one account session.
#[derive(Debug, Clone)]
pub struct ClientConfig {
    /// Versioned API base URL (e.g. `https://prod-api.risegds.com/v2`).
    pub base_url: Url,
    /// Credentials for the first (lazy) login. `None` means the caller
    /// logs in explicitly.
    pub credentials: Option<Credentials>,
    /// Per-request timeout.
    pub timeout: Duration,
    /// TLS verification strategy.
    pub tls: TlsMode,
}

impl ClientConfig {
    /// Production defaults with the given account.
    pub fn with_credentials(credentials: Credentials) -> Result<Self, CoreError> {
        Ok(Self {
            credentials: Some(credentials),
            ..Self::production()?
        })
    }

    /// Production endpoint, no credentials, default transport.
    pub fn production() -> Result<Self, CoreError> {
        let base_url = Url::parse(DEFAULT_BASE_URL).map_err(|e| CoreError::Config {
            message: format!("invalid base URL: {e}"),
        })?;
        Ok(Self {
            base_url,
            credentials: None,
            timeout: DEFAULT_TIMEOUT,
            tls: TlsMode::default(),
        })
    }

    /// Transport settings derived from this config.
    pub fn transport(&self) -> TransportConfig {
        TransportConfig {
            tls: self.tls.clone(),
            timeout: self.timeout,
            ..TransportConfig::default()
        }
    }
}
