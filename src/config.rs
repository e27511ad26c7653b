//! Client configuration.

use std::collections::BTreeSet;
use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpotifyError};

/// Default base URL of the Web API.
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Default base URL of the accounts service (authorize and token endpoints).
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Backoff used when a 429 response carries no `Retry-After` header.
pub const DEFAULT_RETRY_AFTER: Duration = Duration::from_secs(1);

/// Tokens expiring within this window are refreshed before use.
pub const DEFAULT_REFRESH_MARGIN: Duration = Duration::from_secs(60);

const DEFAULT_USER_AGENT: &str = concat!("rustify/", env!("CARGO_PKG_VERSION"));

/// Configuration for a [`Spotify`](crate::Spotify) client.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ClientConfig {
    /// Application client ID from the developer dashboard.
    pub client_id: String,

    /// Application client secret.
    pub client_secret: String,

    /// Redirect URI registered for the authorization-code flow.
    #[serde(default)]
    pub redirect_uri: Option<String>,

    /// OAuth scopes requested during authorization.
    #[serde(default)]
    pub scopes: BTreeSet<String>,

    /// Base URL of the Web API. Override to point at a mock server.
    #[serde(default = "default_api_base_url")]
    pub api_base_url: String,

    /// Base URL of the accounts service.
    #[serde(default = "default_accounts_base_url")]
    pub accounts_base_url: String,

    /// Backoff applied to a 429 without `Retry-After`.
    #[serde(default = "default_retry_after", with = "duration_secs")]
    pub default_retry_after: Duration,

    /// Safety margin before token expiry.
    #[serde(default = "default_refresh_margin", with = "duration_secs")]
    pub refresh_margin: Duration,

    /// User agent sent with every request.
    #[serde(default = "default_user_agent")]
    pub user_agent: String,
}

fn default_api_base_url() -> String {
    DEFAULT_API_BASE_URL.to_string()
}

fn default_accounts_base_url() -> String {
    DEFAULT_ACCOUNTS_BASE_URL.to_string()
}

const fn default_retry_after() -> Duration {
    DEFAULT_RETRY_AFTER
}

const fn default_refresh_margin() -> Duration {
    DEFAULT_REFRESH_MARGIN
}

fn default_user_agent() -> String {
    DEFAULT_USER_AGENT.to_string()
}

impl ClientConfig {
    /// Create a configuration with the given credentials and default endpoints.
    pub fn new<S1: Into<String>, S2: Into<String>>(client_id: S1, client_secret: S2) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            redirect_uri: None,
            scopes: BTreeSet::new(),
            api_base_url: default_api_base_url(),
            accounts_base_url: default_accounts_base_url(),
            default_retry_after: DEFAULT_RETRY_AFTER,
            refresh_margin: DEFAULT_REFRESH_MARGIN,
            user_agent: default_user_agent(),
        }
    }

    /// Read the configuration from `SPOTIFY_*` environment variables.
    ///
    /// `SPOTIFY_CLIENT_ID` and `SPOTIFY_CLIENT_SECRET` are required;
    /// `SPOTIFY_REDIRECT_URI`, `SPOTIFY_SCOPES` (space separated),
    /// `SPOTIFY_API_BASE_URL` and `SPOTIFY_ACCOUNTS_BASE_URL` are optional.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let required = |key: &str| {
            lookup(key)
                .filter(|v| !v.is_empty())
                .ok_or_else(|| SpotifyError::Config(format!("{} is not set", key)))
        };

        let mut config = Self::new(required("SPOTIFY_CLIENT_ID")?, required("SPOTIFY_CLIENT_SECRET")?);
        config.redirect_uri = lookup("SPOTIFY_REDIRECT_URI").filter(|v| !v.is_empty());
        if let Some(scopes) = lookup("SPOTIFY_SCOPES") {
            config.scopes = parse_scopes(&scopes);
        }
        if let Some(url) = lookup("SPOTIFY_API_BASE_URL").filter(|v| !v.is_empty()) {
            config.api_base_url = url;
        }
        if let Some(url) = lookup("SPOTIFY_ACCOUNTS_BASE_URL").filter(|v| !v.is_empty()) {
            config.accounts_base_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Set the redirect URI.
    pub fn with_redirect_uri<S: Into<String>>(mut self, redirect_uri: S) -> Self {
        self.redirect_uri = Some(redirect_uri.into());
        self
    }

    /// Add OAuth scopes.
    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Point both the API and the accounts service at another host.
    pub fn with_base_url<S: Into<String>>(mut self, base_url: S) -> Self {
        let base_url = base_url.into();
        self.accounts_base_url = base_url.trim_end_matches('/').to_string();
        self.api_base_url = format!("{}/v1", self.accounts_base_url);
        self
    }

    /// Check that required fields are present and URLs are well formed.
    pub fn validate(&self) -> Result<()> {
        if self.client_id.is_empty() {
            return Err(SpotifyError::Config("client_id is empty".to_string()));
        }
        if self.client_secret.is_empty() {
            return Err(SpotifyError::Config("client_secret is empty".to_string()));
        }
        for (field, value) in [
            ("api_base_url", &self.api_base_url),
            ("accounts_base_url", &self.accounts_base_url),
        ] {
            url::Url::parse(value)
                .map_err(|e| SpotifyError::Config(format!("{} is invalid: {}", field, e)))?;
        }
        if let Some(redirect_uri) = &self.redirect_uri {
            url::Url::parse(redirect_uri)
                .map_err(|e| SpotifyError::Config(format!("redirect_uri is invalid: {}", e)))?;
        }
        Ok(())
    }

    /// Token endpoint of the accounts service.
    pub fn token_url(&self) -> String {
        format!("{}/api/token", self.accounts_base_url.trim_end_matches('/'))
    }

    /// Authorize endpoint of the accounts service.
    pub fn authorize_url(&self) -> String {
        format!("{}/authorize", self.accounts_base_url.trim_end_matches('/'))
    }
}

/// Split a space or comma separated scope list.
pub fn parse_scopes(raw: &str) -> BTreeSet<String> {
    raw.split(|c: char| c.is_whitespace() || c == ',')
        .filter(|s| !s.is_empty())
        .map(|s| s.to_string())
        .collect()
}

mod duration_secs {
    use std::time::Duration;

    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(value: &Duration, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_u64(value.as_secs())
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Duration, D::Error> {
        u64::deserialize(deserializer).map(Duration::from_secs)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(vars: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = vars
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    #[test]
    fn test_from_env_requires_credentials() {
        let err = ClientConfig::from_lookup(lookup(&[("SPOTIFY_CLIENT_ID", "abc")])).unwrap_err();
        assert!(matches!(err, SpotifyError::Config(msg) if msg.contains("SPOTIFY_CLIENT_SECRET")));
    }

    #[test]
    fn test_from_env_reads_optional_fields() {
        let config = ClientConfig::from_lookup(lookup(&[
            ("SPOTIFY_CLIENT_ID", "abc"),
            ("SPOTIFY_CLIENT_SECRET", "def"),
            ("SPOTIFY_REDIRECT_URI", "http://127.0.0.1:8888/callback"),
            ("SPOTIFY_SCOPES", "user-read-private playlist-modify-public"),
            ("SPOTIFY_API_BASE_URL", "http://localhost:9000/v1"),
        ]))
        .unwrap();

        assert_eq!(config.redirect_uri.as_deref(), Some("http://127.0.0.1:8888/callback"));
        assert_eq!(config.scopes.len(), 2);
        assert!(config.scopes.contains("user-read-private"));
        assert_eq!(config.api_base_url, "http://localhost:9000/v1");
        assert_eq!(config.accounts_base_url, DEFAULT_ACCOUNTS_BASE_URL);
    }

    #[test]
    fn test_validate_rejects_bad_url() {
        let mut config = ClientConfig::new("id", "secret");
        config.api_base_url = "not a url".to_string();
        assert!(config.validate().is_err());
    }

    #[test]
    fn test_with_base_url() {
        let config = ClientConfig::new("id", "secret").with_base_url("http://127.0.0.1:3000/");
        assert_eq!(config.api_base_url, "http://127.0.0.1:3000/v1");
        assert_eq!(config.token_url(), "http://127.0.0.1:3000/api/token");
    }

    #[test]
    fn test_deserialize_defaults() {
        let config: ClientConfig =
            serde_json::from_str(r#"{"client_id":"a","client_secret":"b","refresh_margin":30}"#)
                .unwrap();
        assert_eq!(config.api_base_url, DEFAULT_API_BASE_URL);
        assert_eq!(config.refresh_margin, Duration::from_secs(30));
        assert_eq!(config.default_retry_after, DEFAULT_RETRY_AFTER);
    }

    #[test]
    fn test_parse_scopes() {
        let scopes = parse_scopes("a b,c  d");
        assert_eq!(scopes.into_iter().collect::<Vec<_>>(), vec!["a", "b", "c", "d"]);
    }
}
