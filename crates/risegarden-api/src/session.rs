// Session manager
//
// Password login, refresh-token exchange, and the "ensure valid" step
// that guards every authenticated request. Credentials and token state
// share one async mutex: whoever holds it is the only one allowed to
// log in or refresh, so a token and its expiry always change together.

use chrono::{DateTime, Utc};
use reqwest::Method;
use secrecy::{ExposeSecret, SecretString};
use tracing::{debug, warn};

use crate::auth::{Credentials, TokenState};
use crate::client::{ApiResponse, LOGIN_PATH, REFRESH_PATH, RiseClient};
use crate::error::Error;
use crate::models::{LoginRequest, RefreshRequest};

/// Everything the session manager owns.
#[derive(Debug, Default)]
pub(crate) struct SessionState {
    pub credentials: Option<Credentials>,
    pub token: TokenState,
}

impl RiseClient {
    /// Log in with email and password.
    ///
    /// The credentials are stored before the attempt, even if it fails,
    /// so later silent re-logins (or a retry) reuse them. A rejected login
    /// leaves any existing token untouched. Every `Err` here means the
    /// login did not happen; none of them is fatal to the client.
    pub async fn login(&self, email: &str, password: &SecretString) -> Result<(), Error> {
        let mut state = self.session.lock().await;
        state.credentials = Some(Credentials::new(email, password.clone()));
        self.login_locked(&mut state).await
    }

    /// Exchange the refresh token for a new access token.
    pub async fn refresh(&self) -> Result<(), Error> {
        let mut state = self.session.lock().await;
        self.refresh_locked(&mut state).await
    }

    /// Make sure a usable bearer token exists, and return it.
    ///
    /// Performs at most one network call:
    /// - token still outside the safety margin: nothing;
    /// - refresh token available: one refresh;
    /// - otherwise: one password login with the stored credentials.
    ///
    /// Any failure is reported as `Error::SessionInvalid`.
    pub async fn ensure_valid(&self) -> Result<SecretString, Error> {
        let mut state = self.session.lock().await;
        if let Some(token) = state.token.usable_token(Utc::now()) {
            return Ok(token.clone());
        }

        let outcome = if state.token.has_refresh_token() {
            debug!("access token expired, refreshing");
            self.refresh_locked(&mut state).await
        } else {
            debug!("no refresh token, logging in with stored credentials");
            self.login_locked(&mut state).await
        };

        if let Err(err) = outcome {
            return Err(Error::SessionInvalid {
                message: err.to_string(),
            });
        }

        state
            .token
            .usable_token(Utc::now())
            .cloned()
            .ok_or_else(|| Error::SessionInvalid {
                message: "service issued a token inside the expiry margin".into(),
            })
    }

    /// End the session locally: forget tokens and stored credentials.
    pub async fn logout(&self) {
        let mut state = self.session.lock().await;
        state.token.clear();
        state.credentials = None;
        debug!("session cleared");
    }

    /// Store credentials for a later login without contacting the service.
    pub async fn set_credentials(&self, credentials: Credentials) {
        self.session.lock().await.credentials = Some(credentials);
    }

    // ── Queries ──────────────────────────────────────────────────────

    /// Whether the access token is inside the expiry safety margin.
    pub async fn is_expired(&self) -> bool {
        self.session.lock().await.token.is_expired()
    }

    /// Whether an access token exists and is outside the safety margin.
    pub async fn is_token_valid(&self) -> bool {
        self.session.lock().await.token.is_valid_at(Utc::now())
    }

    /// A copy of the current token state.
    pub async fn token_state(&self) -> TokenState {
        self.session.lock().await.token.clone()
    }

    pub async fn user_id(&self) -> Option<String> {
        self.session.lock().await.token.user_id().map(String::from)
    }

    /// The raw `user` record returned by the last login.
    pub async fn user(&self) -> Option<serde_json::Value> {
        self.session.lock().await.token.user().cloned()
    }

    pub async fn token_expires_at(&self) -> DateTime<Utc> {
        self.session.lock().await.token.expires_at()
    }

    /// The email of the stored credentials, if any.
    pub async fn account_email(&self) -> Option<String> {
        self.session
            .lock()
            .await
            .credentials
            .as_ref()
            .map(|c| c.email.clone())
    }

    // ── Locked flows ─────────────────────────────────────────────────

    async fn login_locked(&self, state: &mut SessionState) -> Result<(), Error> {
        let Some(credentials) = state.credentials.as_ref() else {
            return Err(Error::SessionInvalid {
                message: "no stored credentials to log in with".into(),
            });
        };

        debug!(email = %credentials.email, "logging in");
        let body = LoginRequest {
            email: &credentials.email,
            password: credentials.password.expose_secret(),
        };

        let token = self
            .dispatch(Method::POST, LOGIN_PATH, None, Some(&body))
            .await
            .and_then(ApiResponse::into_token)?;

        state.token.install(token, Utc::now());
        debug!(
            user_id = ?state.token.user_id(),
            expires_at = %state.token.expires_at(),
            "login successful"
        );
        Ok(())
    }

    async fn refresh_locked(&self, state: &mut SessionState) -> Result<(), Error> {
        let Some(refresh_token) = state.token.refresh_token().cloned() else {
            return Err(Error::SessionInvalid {
                message: "no refresh token available".into(),
            });
        };
        let bearer = state.token.access_token().cloned();
        let body = RefreshRequest {
            refresh_token: refresh_token.expose_secret(),
        };

        debug!("refreshing access token");
        let result = self
            .dispatch(Method::POST, REFRESH_PATH, bearer.as_ref(), Some(&body))
            .await
            .and_then(ApiResponse::into_token);

        match result {
            Ok(token) => {
                state.token.install(token, Utc::now());
                debug!(expires_at = %state.token.expires_at(), "token refreshed");
                Ok(())
            }
            Err(err) => {
                if matches!(err, Error::Authentication { .. }) {
                    warn!("refresh token rejected; next request will log in again");
                    state.token.discard_refresh_token();
                }
                Err(err)
            }
        }
    }
}
