// Credential store
//
// The account credentials kept for silent re-login, and the bearer /
// refresh token pair with its absolute expiry. Pure data; the session
// module decides when any of it changes.

use chrono::{DateTime, TimeDelta, Utc};
use secrecy::SecretString;

use crate::models::TokenResponse;

/// Tokens count as expired this many seconds before their nominal expiry,
/// so a request never leaves with a credential that lapses mid-flight.
pub const EXPIRY_MARGIN_SECS: i64 = 60;

/// Account credentials for the password login flow.
#[derive(Debug, Clone)]
pub struct Credentials {
    pub email: String,
    pub password: SecretString,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<SecretString>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

/// Current bearer token state for one session.
///
/// `access_token` is `Some` only after a successful login or refresh.
/// All fields are replaced together from a single token response.
#[derive(Debug, Clone, Default)]
pub struct TokenState {
    access_token: Option<SecretString>,
    refresh_token: Option<SecretString>,
    user_id: Option<String>,
    user: Option<serde_json::Value>,
    expires_in: i64,
    expires_at: DateTime<Utc>,
}

impl TokenState {
    /// Whether the access token is inside the safety margin at `now`.
    pub fn is_expired_at(&self, now: DateTime<Utc>) -> bool {
        self.expires_at - TimeDelta::seconds(EXPIRY_MARGIN_SECS) <= now
    }

    pub fn is_expired(&self) -> bool {
        self.is_expired_at(Utc::now())
    }

    /// The access token, if one exists and is outside the safety margin.
    pub fn usable_token(&self, now: DateTime<Utc>) -> Option<&SecretString> {
        if self.is_expired_at(now) {
            return None;
        }
        self.access_token.as_ref()
    }

    pub fn is_valid_at(&self, now: DateTime<Utc>) -> bool {
        self.usable_token(now).is_some()
    }

    pub fn access_token(&self) -> Option<&SecretString> {
        self.access_token.as_ref()
    }

    pub fn refresh_token(&self) -> Option<&SecretString> {
        self.refresh_token.as_ref()
    }

    pub fn has_refresh_token(&self) -> bool {
        self.refresh_token.is_some()
    }

    pub fn user_id(&self) -> Option<&str> {
        self.user_id.as_deref()
    }

    /// The raw `user` record from the most recent token response.
    pub fn user(&self) -> Option<&serde_json::Value> {
        self.user.as_ref()
    }

    /// Lifetime in seconds the service granted with the current token.
    pub fn expires_in(&self) -> i64 {
        self.expires_in
    }

    pub fn expires_at(&self) -> DateTime<Utc> {
        self.expires_at
    }

    /// Install a fresh token response received at `now`.
    ///
    /// A refresh response that omits `refresh_token` or `user` keeps the
    /// values from the previous login.
    pub(crate) fn install(&mut self, response: TokenResponse, now: DateTime<Utc>) {
        let user_id = response.user_id();
        let expires_at = TimeDelta::try_seconds(response.expires_in)
            .and_then(|lifetime| now.checked_add_signed(lifetime))
            .unwrap_or(DateTime::<Utc>::MAX_UTC);

        self.access_token = Some(SecretString::from(response.token));
        if let Some(refresh) = response.refresh_token {
            self.refresh_token = Some(SecretString::from(refresh));
        }
        if response.user.is_some() {
            self.user_id = user_id;
            self.user = response.user;
        }
        self.expires_in = response.expires_in;
        self.expires_at = expires_at;
    }

    /// Forget a refresh token the service refused, so the next validation
    /// cycle falls back to a password login.
    pub(crate) fn discard_refresh_token(&mut self) {
        self.refresh_token = None;
    }

    pub(crate) fn clear(&mut self) {
        *self = Self::default();
    }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use secrecy::ExposeSecret;
    use serde_json::json;

    use super::*;

    fn at(secs: i64) -> DateTime<Utc> {
        DateTime::from_timestamp(secs, 0).unwrap()
    }

    fn login_response() -> TokenResponse {
        serde_json::from_value(json!({
            "token": "a",
            "refresh_token": "r",
            "expires_in": 3600,
            "user": { "id": 1 }
        }))
        .unwrap()
    }

    #[test]
    fn empty_state_is_expired_and_unusable() {
        let state = TokenState::default();
        assert!(state.is_expired_at(at(0)));
        assert!(!state.is_valid_at(at(0)));
        assert!(!state.has_refresh_token());
    }

    #[test]
    fn install_computes_absolute_expiry() {
        let mut state = TokenState::default();
        state.install(login_response(), at(1000));

        assert_eq!(state.expires_at(), at(4600));
        assert_eq!(state.expires_in(), 3600);
        assert_eq!(state.access_token().unwrap().expose_secret(), "a");
        assert_eq!(state.refresh_token().unwrap().expose_secret(), "r");
        assert_eq!(state.user_id(), Some("1"));
    }

    #[test]
    fn margin_applies_before_nominal_expiry() {
        let mut state = TokenState::default();
        state.install(login_response(), at(1000));

        assert!(state.is_expired_at(at(4550)));
        assert!(!state.is_expired_at(at(4000)));
        assert!(state.usable_token(at(4550)).is_none());
        assert!(state.usable_token(at(4000)).is_some());
    }

    #[test]
    fn margin_boundary() {
        let mut state = TokenState::default();
        state.install(login_response(), at(1000));

        // exactly 60s left
        assert!(state.is_expired_at(at(4540)));
        // 61s left
        assert!(!state.is_expired_at(at(4539)));
    }

    #[test]
    fn refresh_response_without_refresh_token_keeps_old_one() {
        let mut state = TokenState::default();
        state.install(login_response(), at(1000));

        let refreshed: TokenResponse =
            serde_json::from_value(json!({ "token": "b", "expires_in": 600 })).unwrap();
        state.install(refreshed, at(2000));

        assert_eq!(state.access_token().unwrap().expose_secret(), "b");
        assert_eq!(state.refresh_token().unwrap().expose_secret(), "r");
        assert_eq!(state.user_id(), Some("1"));
        assert_eq!(state.expires_at(), at(2600));
    }

    #[test]
    fn absurd_lifetime_saturates() {
        let mut state = TokenState::default();
        let response: TokenResponse =
            serde_json::from_value(json!({ "token": "a", "expires_in": i64::MAX })).unwrap();
        state.install(response, at(1000));
        assert_eq!(state.expires_at(), DateTime::<Utc>::MAX_UTC);
        assert!(!state.is_expired_at(at(1000)));
    }

    #[test]
    fn clear_resets_everything() {
        let mut state = TokenState::default();
        state.install(login_response(), at(1000));
        state.clear();
        assert!(state.access_token().is_none());
        assert!(state.user_id().is_none());
        assert!(state.is_expired_at(at(1000)));
    }
}
