//! Authorization-code flow helpers: authorize URL and callback parsing.

use std::collections::BTreeSet;

use url::Url;

use crate::config::ClientConfig;
use crate::error::{Result, SpotifyError};

/// Scopes accepted by the authorize endpoint.
pub const VALID_SCOPES: &[&str] = &[
    "playlist-read-collaborative",
    "playlist-modify-private",
    "playlist-modify-public",
    "playlist-read-private",
    "user-modify-playback-state",
    "user-read-currently-playing",
    "user-read-playback-state",
    "user-read-private",
    "user-read-email",
    "user-library-modify",
    "user-library-read",
    "user-follow-modify",
    "user-follow-read",
    "user-read-recently-played",
    "user-top-read",
    "streaming",
    "app-remote-control",
];

/// Builder for the URL a user visits to grant access.
///
/// ```
/// use rustify::auth::OAuth2;
///
/// let url = OAuth2::new("client-id", "http://127.0.0.1:8888/callback")
///     .with_scopes(["user-read-private"])
///     .with_state("xyz")
///     .url();
/// assert!(url.starts_with("https://accounts.spotify.com/authorize?"));
/// ```
#[derive(Debug, Clone, PartialEq)]
pub struct OAuth2 {
    client_id: String,
    redirect_uri: String,
    scopes: BTreeSet<String>,
    state: Option<String>,
    show_dialog: bool,
    authorize_url: String,
}

impl OAuth2 {
    pub fn new<S1: Into<String>, S2: Into<String>>(client_id: S1, redirect_uri: S2) -> Self {
        Self {
            client_id: client_id.into(),
            redirect_uri: redirect_uri.into(),
            scopes: BTreeSet::new(),
            state: None,
            show_dialog: false,
            authorize_url: format!("{}/authorize", crate::config::DEFAULT_ACCOUNTS_BASE_URL),
        }
    }

    /// Build from a client configuration. Requires `redirect_uri`.
    pub fn from_config(config: &ClientConfig) -> Result<Self> {
        let redirect_uri = config.redirect_uri.clone().ok_or_else(|| {
            SpotifyError::Config("redirect_uri is required for authorization".to_string())
        })?;
        let mut oauth = Self::new(config.client_id.clone(), redirect_uri);
        oauth.scopes = config.scopes.clone();
        oauth.authorize_url = config.authorize_url();
        Ok(oauth)
    }

    pub fn with_scopes<I, S>(mut self, scopes: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.scopes.extend(scopes.into_iter().map(Into::into));
        self
    }

    /// Request or drop a single scope.
    pub fn set_scope(&mut self, scope: &str, enabled: bool) {
        if enabled {
            self.scopes.insert(scope.to_string());
        } else {
            self.scopes.remove(scope);
        }
    }

    /// Opaque value echoed back on the redirect, checked by [`parse_callback`](Self::parse_callback).
    pub fn with_state<S: Into<String>>(mut self, state: S) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Force the consent dialog even when access was granted before.
    pub fn with_show_dialog(mut self, show_dialog: bool) -> Self {
        self.show_dialog = show_dialog;
        self
    }

    pub fn scopes(&self) -> &BTreeSet<String> {
        &self.scopes
    }

    /// Requested scopes that the authorize endpoint does not know.
    pub fn unknown_scopes(&self) -> Vec<&str> {
        self.scopes
            .iter()
            .map(String::as_str)
            .filter(|s| !VALID_SCOPES.contains(s))
            .collect()
    }

    pub fn redirect_uri(&self) -> &str {
        &self.redirect_uri
    }

    /// The authorize URL.
    pub fn url(&self) -> String {
        let mut url = match Url::parse(&self.authorize_url) {
            Ok(url) => url,
            Err(_) => return self.authorize_url.clone(),
        };
        {
            let mut query = url.query_pairs_mut();
            query
                .append_pair("client_id", &self.client_id)
                .append_pair("response_type", "code")
                .append_pair("redirect_uri", &self.redirect_uri);
            if !self.scopes.is_empty() {
                let scope = self.scopes.iter().cloned().collect::<Vec<_>>().join(" ");
                query.append_pair("scope", &scope);
            }
            if let Some(state) = &self.state {
                query.append_pair("state", state);
            }
            if self.show_dialog {
                query.append_pair("show_dialog", "true");
            }
        }
        url.to_string()
    }

    /// Extract the authorization code from the URL the user was redirected to.
    ///
    /// Fails when the user denied access or the `state` does not match.
    pub fn parse_callback(&self, redirected: &str) -> Result<String> {
        let url = Url::parse(redirected)
            .map_err(|e| SpotifyError::InvalidArgument(format!("invalid callback URL: {}", e)))?;

        let mut code = None;
        let mut state = None;
        for (key, value) in url.query_pairs() {
            match key.as_ref() {
                "code" => code = Some(value.into_owned()),
                "state" => state = Some(value.into_owned()),
                "error" => return Err(SpotifyError::Auth(format!("authorization denied: {}", value))),
                _ => {}
            }
        }

        if self.state.is_some() && state != self.state {
            return Err(SpotifyError::Auth("state mismatch in callback".to_string()));
        }
        code.ok_or_else(|| SpotifyError::InvalidArgument("callback URL has no code".to_string()))
    }
}

impl std::fmt::Display for OAuth2 {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.url())
    }
}
