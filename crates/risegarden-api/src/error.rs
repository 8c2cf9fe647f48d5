use thiserror::Error;

/// Top-level error type for the `risegarden-api` crate.
///
/// Keeps three failure families apart so callers can branch on them:
/// the service refused us (`Authentication`, `Rejected`), we could not
/// hold a session (`SessionInvalid`), or we never got a usable answer
/// (`Transport`, `Timeout`, `Deserialization`).
/// `risegarden-core` maps these into user-facing diagnostics.
#[derive(Debug, Error)]
pub enum Error {
    // ── Authentication ──────────────────────────────────────────────
    /// Login or refresh answered with a non-success status.
    #[error("Authentication failed: {message}")]
    Authentication { status: Option<u16>, message: String },

    /// No usable bearer token could be established for a guarded call.
    #[error("Session invalid: {message}")]
    SessionInvalid { message: String },

    // ── Transport ───────────────────────────────────────────────────
    /// HTTP transport error (connection refused, DNS failure, etc.)
    #[error("HTTP transport error: {0}")]
    Transport(#[from] reqwest::Error),

    /// URL parsing error.
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// Request timed out.
    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    /// TLS setup or certificate error.
    #[error("TLS error: {0}")]
    Tls(String),

    // ── Service ─────────────────────────────────────────────────────
    /// A domain call came back with a non-success status.
    #[error("Request rejected (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    // ── Data ────────────────────────────────────────────────────────
    /// JSON deserialization failed, with the raw body for debugging.
    #[error("Deserialization error: {message}")]
    Deserialization { message: String, body: String },

    /// Lamp level outside the accepted 0-100 range.
    #[error("Lamp level {0} is out of range (0-100)")]
    InvalidLampLevel(u8),
}

impl Error {
    /// Returns `true` if the service refused the credentials or the
    /// session could not be (re-)established.
    pub fn is_auth_failure(&self) -> bool {
        matches!(
            self,
            Self::Authentication { .. } | Self::SessionInvalid { .. }
        )
    }

    /// Returns `true` if the service could not be reached or its answer
    /// could not be understood.
    pub fn is_transport(&self) -> bool {
        matches!(
            self,
            Self::Transport(_) | Self::Timeout { .. } | Self::Deserialization { .. }
        )
    }

    /// The HTTP status the service answered with, when there was one.
    pub fn status(&self) -> Option<u16> {
        match self {
            Self::Authentication { status, .. } => *status,
            Self::Rejected { status, .. } => Some(*status),
            Self::Transport(e) => e.status().map(|s| s.as_u16()),
            _ => None,
        }
    }
}
