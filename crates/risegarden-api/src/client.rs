// Request gateway
//
// Wraps `reqwest::Client` with base-URL construction, bearer injection,
// the fixed per-request timeout, and response normalization into
// `(status, json body)`. Session handling lives in `session.rs` and the
// garden endpoints in `gardens.rs`, both as inherent methods on
// `RiseClient`, to keep this module focused on transport mechanics.

use std::time::Duration;

use reqwest::header::{AUTHORIZATION, HeaderValue};
use reqwest::{Method, StatusCode};
use secrecy::{ExposeSecret, SecretString};
use serde::Serialize;
use serde::de::DeserializeOwned;
use serde_json::Value;
use tokio::sync::Mutex;
use tracing::{debug, trace};
use url::Url;

use crate::auth::Credentials;
use crate::error::Error;
use crate::models::TokenResponse;
use crate::session::SessionState;
use crate::transport::{DEFAULT_TIMEOUT, TransportConfig};

/// Production API host, including the version prefix.
pub const DEFAULT_BASE_URL: &str = "https://prod-api.risegds.com/v2";

pub(crate) const LOGIN_PATH: &str = "/auth/login";
pub(crate) const REFRESH_PATH: &str = "/auth/refresh_token";

const BODY_PREVIEW_CHARS: usize = 200;

/// How a call relates to the session.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestKind {
    /// Ordinary API call: the session is validated (and refreshed or
    /// re-established if needed) before the request goes out.
    Authenticated,
    /// Login and refresh themselves. Never validates the session, so the
    /// session code can call through the gateway without recursing.
    Bootstrap,
}

/// A normalized service response: status code plus decoded JSON body.
///
/// The gateway does not interpret the status; callers decide what
/// counts as success.
#[derive(Debug, Clone, PartialEq)]
pub struct ApiResponse {
    pub status: StatusCode,
    pub body: Value,
}

impl ApiResponse {
    pub fn is_success(&self) -> bool {
        self.status.is_success()
    }

    /// Decode the body into `T` regardless of status.
    pub fn decode<T: DeserializeOwned>(self) -> Result<T, Error> {
        let raw = self.body.to_string();
        serde_json::from_value(self.body).map_err(|e| Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(&raw)),
            body: raw,
        })
    }

    /// Decode a successful body, or turn a non-success status into
    /// `Error::Rejected`.
    pub fn into_result<T: DeserializeOwned>(self) -> Result<T, Error> {
        if !self.is_success() {
            return Err(Error::Rejected {
                status: self.status.as_u16(),
                message: self.error_message(),
            });
        }
        self.decode()
    }

    /// Like [`into_result`](Self::into_result) but discards the body.
    pub fn into_empty(self) -> Result<(), Error> {
        if self.is_success() {
            Ok(())
        } else {
            Err(Error::Rejected {
                status: self.status.as_u16(),
                message: self.error_message(),
            })
        }
    }

    /// Decode a login/refresh answer; a non-success status is an
    /// authentication failure rather than a rejected request.
    pub(crate) fn into_token(self) -> Result<TokenResponse, Error> {
        if !self.is_success() {
            return Err(Error::Authentication {
                status: Some(self.status.as_u16()),
                message: self.error_message(),
            });
        }
        self.decode()
    }

    /// Best-effort human message from an error body.
    fn error_message(&self) -> String {
        let detail = match &self.body {
            Value::Object(map) => map
                .get("message")
                .or_else(|| map.get("error"))
                .and_then(Value::as_str)
                .map(String::from),
            Value::String(s) if !s.is_empty() => Some(preview(s)),
            _ => None,
        };
        detail.unwrap_or_else(|| self.status.to_string())
    }
}

/// Async client for one Rise Garden account.
///
/// Each instance is an independent session: it owns the credentials and
/// token state, so several accounts can be used side by side in one
/// process.
pub struct RiseClient {
    http: reqwest::Client,
    base_url: Url,
    timeout: Duration,
    pub(crate) session: Mutex<SessionState>,
}

impl RiseClient {
    // ── Constructors ─────────────────────────────────────────────────

    /// Build a client from a base URL and transport config.
    pub fn new(base_url: Url, transport: &TransportConfig) -> Result<Self, Error> {
        let http = transport.build_client()?;
        Ok(Self {
            http,
            base_url,
            timeout: transport.timeout,
            session: Mutex::new(SessionState::default()),
        })
    }

    /// Build a client against the production API with default transport.
    pub fn production() -> Result<Self, Error> {
        Self::new(Url::parse(DEFAULT_BASE_URL)?, &TransportConfig::default())
    }

    /// Wrap an existing `reqwest::Client`.
    pub fn with_client(http: reqwest::Client, base_url: Url) -> Self {
        Self {
            http,
            base_url,
            timeout: DEFAULT_TIMEOUT,
            session: Mutex::new(SessionState::default()),
        }
    }

    /// Override the per-request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Seed the stored credentials without contacting the service. The
    /// first authenticated request performs the login.
    pub fn with_credentials(mut self, credentials: Credentials) -> Self {
        self.session.get_mut().credentials = Some(credentials);
        self
    }

    pub fn base_url(&self) -> &Url {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    // ── Gateway ──────────────────────────────────────────────────────

    /// Send a request and return the status plus decoded body.
    ///
    /// `Authenticated` calls validate the session first and fail with
    /// `Error::SessionInvalid` if no usable token can be obtained.
    pub async fn send<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        endpoint: &str,
        body: Option<&B>,
        kind: RequestKind,
    ) -> Result<ApiResponse, Error> {
        let bearer = match kind {
            RequestKind::Authenticated => Some(self.ensure_valid().await?),
            RequestKind::Bootstrap => self.session.lock().await.token.access_token().cloned(),
        };
        self.dispatch(method, endpoint, bearer.as_ref(), body).await
    }

    /// Perform one HTTP exchange. Never touches session state.
    pub(crate) async fn dispatch<B: Serialize + ?Sized + Sync>(
        &self,
        method: Method,
        endpoint: &str,
        bearer: Option<&SecretString>,
        body: Option<&B>,
    ) -> Result<ApiResponse, Error> {
        let url = self.endpoint_url(endpoint)?;
        debug!("{method} {url}");

        let mut builder = self.http.request(method, url).timeout(self.timeout);
        if let Some(token) = bearer {
            builder = builder.header(AUTHORIZATION, bearer_header(token)?);
        }
        if let Some(body) = body {
            builder = builder.json(body);
        }

        let resp = builder.send().await.map_err(|e| self.transport_error(e))?;
        let status = resp.status();
        let text = resp.text().await.map_err(|e| self.transport_error(e))?;
        trace!(%status, body = %preview(&text), "response received");

        let body = decode_body(status, &text)?;
        Ok(ApiResponse { status, body })
    }

    // ── Helpers ──────────────────────────────────────────────────────

    /// Join an endpoint path (e.g. `/gardens`) onto the versioned base URL.
    fn endpoint_url(&self, endpoint: &str) -> Result<Url, Error> {
        let base = self.base_url.as_str().trim_end_matches('/');
        let endpoint = endpoint.trim_start_matches('/');
        Ok(Url::parse(&format!("{base}/{endpoint}"))?)
    }

    fn transport_error(&self, err: reqwest::Error) -> Error {
        if err.is_timeout() {
            Error::Timeout {
                timeout_secs: self.timeout.as_secs(),
            }
        } else {
            Error::Transport(err)
        }
    }
}

fn bearer_header(token: &SecretString) -> Result<HeaderValue, Error> {
    let mut value = HeaderValue::from_str(&format!("Bearer {}", token.expose_secret())).map_err(
        |e| Error::SessionInvalid {
            message: format!("access token is not a valid header value: {e}"),
        },
    )?;
    value.set_sensitive(true);
    Ok(value)
}

/// Empty bodies decode to `Null`. A success status with malformed JSON is
/// a deserialization error; an error status with a non-JSON body (proxy
/// error pages and the like) keeps the text so the caller still sees the
/// status.
fn decode_body(status: StatusCode, text: &str) -> Result<Value, Error> {
    if text.trim().is_empty() {
        return Ok(Value::Null);
    }
    match serde_json::from_str(text) {
        Ok(value) => Ok(value),
        Err(_) if !status.is_success() => Ok(Value::String(text.to_owned())),
        Err(e) => Err(Error::Deserialization {
            message: format!("{e} (body preview: {:?})", preview(text)),
            body: text.to_owned(),
        }),
    }
}

fn preview(body: &str) -> String {
    body.chars().take(BODY_PREVIEW_CHARS).collect()
}
