// ── Core error types ──
//
// User-facing errors from risegarden-core. Consumers never see raw
// reqwest or JSON failures directly; the `From<risegarden_api::Error>`
// impl translates transport-layer errors into domain variants while
// keeping "the service said no" apart from "could not reach it".

use thiserror::Error;

use risegarden_api::GardenId;

/// Unified error type for the core crate.
#[derive(Debug, Error)]
pub enum CoreError {
    // ── Session errors ───────────────────────────────────────────────
    #[error("Authentication failed: {message}")]
    AuthenticationFailed { message: String },

    #[error("No valid session: {message}")]
    SessionInvalid { message: String },

    // ── Connection errors ────────────────────────────────────────────
    #[error("Cannot reach the garden service: {reason}")]
    ConnectionFailed { reason: String },

    #[error("Request timed out after {timeout_secs}s")]
    Timeout { timeout_secs: u64 },

    // ── Service errors ───────────────────────────────────────────────
    #[error("Request rejected by the service (HTTP {status}): {message}")]
    Rejected { status: u16, message: String },

    // ── Data errors ──────────────────────────────────────────────────
    #[error("Garden not found: {id}")]
    GardenNotFound { id: GardenId },

    #[error("Validation failed: {message}")]
    ValidationFailed { message: String },

    #[error("{} of {total} garden updates failed", failed.len())]
    UpdateIncomplete { failed: Vec<GardenId>, total: usize },

    // ── Configuration errors ─────────────────────────────────────────
    #[error("Configuration error: {message}")]
    Config { message: String },

    // ── Internal errors ──────────────────────────────────────────────
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CoreError {
    /// Returns `true` if the service could not be reached or answered
    /// with something unreadable.
    pub fn is_connection_error(&self) -> bool {
        matches!(self, Self::ConnectionFailed { .. } | Self::Timeout { .. })
    }
}

// ── Conversion from transport-layer errors ───────────────────────────

impl From<risegarden_api::Error> for CoreError {
    fn from(err: risegarden_api::Error) -> Self {
        match err {
            risegarden_api::Error::Authentication { message, .. } => {
                CoreError::AuthenticationFailed { message }
            }
            risegarden_api::Error::SessionInvalid { message } => {
                CoreError::SessionInvalid { message }
            }
            risegarden_api::Error::Transport(ref e) => CoreError::ConnectionFailed {
                reason: e.to_string(),
            },
            risegarden_api::Error::Timeout { timeout_secs } => CoreError::Timeout { timeout_secs },
            risegarden_api::Error::Tls(msg) => CoreError::ConnectionFailed {
                reason: format!("TLS error: {msg}"),
            },
            risegarden_api::Error::Deserialization { message, body: _ } => {
                CoreError::ConnectionFailed {
                    reason: format!("unreadable response: {message}"),
                }
            }
            risegarden_api::Error::Rejected { status, message } => {
                CoreError::Rejected { status, message }
            }
            risegarden_api::Error::InvalidUrl(e) => CoreError::Config {
                message: format!("Invalid URL: {e}"),
            },
            risegarden_api::Error::InvalidLampLevel(level) => CoreError::ValidationFailed {
                message: format!("lamp level {level} is out of range (0-100)"),
            },
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn rejected_keeps_status() {
        let err: CoreError = risegarden_api::Error::Rejected {
            status: 503,
            message: "maintenance".into(),
        }
        .into();
        assert!(matches!(err, CoreError::Rejected { status: 503, .. }));
        assert!(!err.is_connection_error());
    }

    #[test]
    fn timeout_is_connection_error() {
        let err: CoreError = risegarden_api::Error::Timeout { timeout_secs: 20 }.into();
        assert!(err.is_connection_error());
        assert_eq!(err.to_string(), "Request timed out after 20s");
    }

    #[test]
    fn update_incomplete_message_counts_failures() {
        let err = CoreError::UpdateIncomplete {
            failed: vec![GardenId(2), GardenId(5)],
            total: 3,
        };
        assert_eq!(err.to_string(), "2 of 3 garden updates failed");
    }
}
