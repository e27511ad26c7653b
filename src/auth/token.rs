//! Access tokens.

use std::collections::BTreeSet;
use std::fmt;
use std::time::Duration;

use chrono::{DateTime, TimeDelta, Utc};
use serde::{Deserialize, Serialize};

use crate::config::parse_scopes;

/// An OAuth2 access token with its refresh token and expiry.
///
/// Serializes to JSON so callers can persist it between runs. `Debug`
/// output never contains the secrets.
#[derive(Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Token {
    pub access_token: String,

    #[serde(default)]
    pub refresh_token: Option<String>,

    /// Absolute expiry. A token without one is treated as expired.
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,

    #[serde(default)]
    pub scopes: BTreeSet<String>,
}

impl Token {
    pub fn new<S: Into<String>>(access_token: S) -> Self {
        Self {
            access_token: access_token.into(),
            refresh_token: None,
            expires_at: None,
            scopes: BTreeSet::new(),
        }
    }

    pub fn with_refresh_token<S: Into<String>>(mut self, refresh_token: S) -> Self {
        self.refresh_token = Some(refresh_token.into());
        self
    }

    /// Set the expiry relative to now. An expiry past the representable
    /// range never expires.
    pub fn with_expires_in(mut self, expires_in: Duration) -> Self {
        self.expires_at = Some(from_now(TimeDelta::from_std(expires_in).ok()));
        self
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes = scopes.into_iter().map(Into::into).collect();
        self
    }

    pub fn is_expired(&self) -> bool {
        self.expires_within(Duration::ZERO)
    }

    /// Whether the token expires within `margin` from now.
    ///
    /// A margin reaching past the representable range counts as never
    /// reached.
    pub fn expires_within(&self, margin: Duration) -> bool {
        let Some(at) = self.expires_at else {
            return true;
        };
        TimeDelta::from_std(margin)
            .ok()
            .and_then(|margin| Utc::now().checked_add_signed(margin))
            .is_some_and(|limit| at <= limit)
    }

    pub fn has_scope(&self, scope: &str) -> bool {
        self.scopes.contains(scope)
    }

    /// Build a token from a token endpoint response.
    ///
    /// A refresh response may omit `refresh_token`; the previous one is kept
    /// in that case.
    pub(crate) fn from_response(response: TokenResponse, previous_refresh: Option<String>) -> Self {
        let expires_at = response
            .expires_in
            .map(|secs| from_now(TimeDelta::try_seconds(secs)));
        Self {
            access_token: response.access_token,
            refresh_token: response.refresh_token.or(previous_refresh),
            expires_at,
            scopes: response
                .scope
                .as_deref()
                .map(parse_scopes)
                .unwrap_or_default(),
        }
    }
}

impl fmt::Debug for Token {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Token")
            .field("access_token", &"<redacted>")
            .field("refresh_token", &self.refresh_token.as_ref().map(|_| "<redacted>"))
            .field("expires_at", &self.expires_at)
            .field("scopes", &self.scopes)
            .finish()
    }
}

/// Now plus `delta`, saturating at the latest representable instant.
fn from_now(delta: Option<TimeDelta>) -> DateTime<Utc> {
    delta
        .and_then(|delta| Utc::now().checked_add_signed(delta))
        .unwrap_or(DateTime::<Utc>::MAX_UTC)
}

/// Body returned by the accounts token endpoint.
#[derive(Debug, Clone, Deserialize)]
pub(crate) struct TokenResponse {
    pub access_token: String,
    #[serde(default)]
    pub expires_in: Option<i64>,
    #[serde(default)]
    pub refresh_token: Option<String>,
    #[serde(default)]
    pub scope: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_expiry_margin() {
        let token = Token::new("abc").with_expires_in(Duration::from_secs(30));
        assert!(!token.is_expired());
        assert!(token.expires_within(Duration::from_secs(60)));

        let token = Token::new("abc").with_expires_in(Duration::from_secs(3600));
        assert!(!token.expires_within(Duration::from_secs(60)));
    }

    #[test]
    fn test_no_expiry_is_expired() {
        assert!(Token::new("abc").is_expired());
    }

    #[test]
    fn test_from_response_keeps_previous_refresh_token() {
        let response: TokenResponse = serde_json::from_str(
            r#"{"access_token":"new","token_type":"Bearer","expires_in":3600,"scope":"user-read-private user-top-read"}"#,
        )
        .unwrap();
        let token = Token::from_response(response, Some("old-refresh".to_string()));
        assert_eq!(token.access_token, "new");
        assert_eq!(token.refresh_token.as_deref(), Some("old-refresh"));
        assert!(token.has_scope("user-top-read"));
        assert!(!token.expires_within(Duration::from_secs(60)));
    }

    #[test]
    fn test_out_of_range_durations_do_not_panic() {
        let response: TokenResponse =
            serde_json::from_str(&format!(r#"{{"access_token":"a","expires_in":{}}}"#, i64::MAX)).unwrap();
        let token = Token::from_response(response, None);
        assert!(!token.is_expired());
        assert!(!token.expires_within(Duration::from_secs(3600)));

        let token = Token::new("b").with_expires_in(Duration::MAX);
        assert!(!token.is_expired());

        let token = Token::new("c").with_expires_in(Duration::from_secs(3600));
        assert!(!token.expires_within(Duration::MAX));
        assert!(Token::new("d").expires_within(Duration::MAX));
    }

    #[test]
    fn test_debug_redacts_secrets() {
        let token = Token::new("secret-access").with_refresh_token("secret-refresh");
        let debug = format!("{:?}", token);
        assert!(!debug.contains("secret-access"));
        assert!(!debug.contains("secret-refresh"));
    }

    #[test]
    fn test_json_round_trip() {
        let token = Token::new("abc")
            .with_refresh_token("def")
            .with_expires_in(Duration::from_secs(10))
            .with_scopes(["playlist-read-private"]);
        let json = serde_json::to_string(&token).unwrap();
        let parsed: Token = serde_json::from_str(&json).unwrap();
        assert_eq!(parsed, token);
    }
}
