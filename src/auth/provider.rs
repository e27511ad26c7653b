//! Token acquisition and refresh.

use std::sync::Arc;
use std::time::Duration;

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::token::{Token, TokenResponse};
use crate::api::{Request, Transport};
use crate::config::ClientConfig;
use crate::error::{Result, SpotifyError};

/// How tokens are obtained.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Grant {
    /// App-only token from the client ID and secret. No user data access.
    ClientCredentials,
    /// User token from the authorization-code flow, renewed with its refresh token.
    AuthorizationCode,
}

#[derive(Debug)]
struct State {
    grant: Grant,
    token: Option<Token>,
}

/// Holds the current token and renews it.
///
/// All renewals go through one async mutex that stays held while the token
/// endpoint is called, so concurrent callers that find the token stale wait
/// for a single refresh and then share its result. The cached token is only
/// replaced once a refresh completes; dropping a waiting caller leaves it
/// untouched.
#[derive(Debug)]
pub struct AuthProvider {
    transport: Arc<dyn Transport>,
    client_id: String,
    client_secret: String,
    token_url: String,
    redirect_uri: Option<String>,
    refresh_margin: Duration,
    state: Mutex<State>,
}

impl AuthProvider {
    /// Provider using the client-credentials grant.
    pub fn client_credentials(config: &ClientConfig, transport: Arc<dyn Transport>) -> Self {
        Self::build(config, transport, Grant::ClientCredentials, None)
    }

    /// Provider seeded with a user token, e.g. one loaded from disk.
    pub fn with_token(config: &ClientConfig, transport: Arc<dyn Transport>, token: Token) -> Self {
        Self::build(config, transport, Grant::AuthorizationCode, Some(token))
    }

    fn build(
        config: &ClientConfig,
        transport: Arc<dyn Transport>,
        grant: Grant,
        token: Option<Token>,
    ) -> Self {
        Self {
            transport,
            client_id: config.client_id.clone(),
            client_secret: config.client_secret.clone(),
            token_url: config.token_url(),
            redirect_uri: config.redirect_uri.clone(),
            refresh_margin: config.refresh_margin,
            state: Mutex::new(State { grant, token }),
        }
    }

    pub async fn grant(&self) -> Grant {
        self.state.lock().await.grant
    }

    /// Snapshot of the current token, for persisting.
    pub async fn token(&self) -> Option<Token> {
        self.state.lock().await.token.clone()
    }

    /// Replace the current token and switch to the user grant.
    pub async fn set_token(&self, token: Token) {
        let mut state = self.state.lock().await;
        state.grant = Grant::AuthorizationCode;
        state.token = Some(token);
    }

    /// Whether a rejected token can be renewed without user interaction.
    pub async fn can_refresh(&self) -> bool {
        let state = self.state.lock().await;
        match state.grant {
            Grant::ClientCredentials => true,
            Grant::AuthorizationCode => state
                .token
                .as_ref()
                .is_some_and(|t| t.refresh_token.is_some()),
        }
    }

    /// A token valid for at least the refresh margin, renewing it first if needed.
    pub async fn get_token(&self) -> Result<Token> {
        let mut state = self.state.lock().await;
        if let Some(token) = &state.token {
            if !token.expires_within(self.refresh_margin) {
                return Ok(token.clone());
            }
            debug!("Cached token expires within {:?}, renewing", self.refresh_margin);
        }
        self.renew(&mut state).await
    }

    /// Renew the token now, regardless of its expiry.
    pub async fn refresh(&self) -> Result<Token> {
        let mut state = self.state.lock().await;
        self.renew(&mut state).await
    }

    /// Renew after the API rejected `rejected_access_token`.
    ///
    /// If another caller already replaced that token, the replacement is
    /// returned without a second refresh.
    pub(crate) async fn refresh_rejected(&self, rejected_access_token: &str) -> Result<Token> {
        let mut state = self.state.lock().await;
        if let Some(token) = &state.token {
            if token.access_token != rejected_access_token
                && !token.expires_within(self.refresh_margin)
            {
                debug!("Token was already renewed by another request");
                return Ok(token.clone());
            }
        }
        self.renew(&mut state).await
    }

    /// Exchange an authorization code for a user token.
    ///
    /// `redirect_uri` overrides the configured one for this exchange. It
    /// must equal the URI the authorize URL was built with.
    pub async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> Result<Token> {
        let redirect_uri = redirect_uri
            .or(self.redirect_uri.as_deref())
            .ok_or_else(|| SpotifyError::Config("redirect_uri is required to exchange a code".to_string()))?;
        if code.is_empty() {
            return Err(SpotifyError::InvalidArgument("authorization code is empty".to_string()));
        }

        let mut state = self.state.lock().await;
        let token = self
            .request_token(
                &[
                    ("grant_type", "authorization_code"),
                    ("code", code),
                    ("redirect_uri", redirect_uri),
                ],
                None,
            )
            .await?;
        info!("Exchanged authorization code for user token");
        state.grant = Grant::AuthorizationCode;
        state.token = Some(token.clone());
        Ok(token)
    }

    async fn renew(&self, state: &mut State) -> Result<Token> {
        let result = match state.grant {
            Grant::ClientCredentials => {
                info!("Requesting client-credentials token");
                self.request_token(&[("grant_type", "client_credentials")], None)
                    .await
            }
            Grant::AuthorizationCode => {
                let refresh_token = state
                    .token
                    .as_ref()
                    .and_then(|t| t.refresh_token.clone())
                    .ok_or_else(|| {
                        SpotifyError::Auth("token expired and no refresh token is available".to_string())
                    })?;
                info!("Refreshing user token");
                self.request_token(
                    &[
                        ("grant_type", "refresh_token"),
                        ("refresh_token", refresh_token.as_str()),
                    ],
                    Some(refresh_token.clone()),
                )
                .await
            }
        };

        match result {
            Ok(token) => {
                state.token = Some(token.clone());
                Ok(token)
            }
            Err(err @ SpotifyError::Auth(_)) => {
                warn!("Token renewal rejected, discarding cached token");
                state.token = None;
                Err(err)
            }
            Err(err) => Err(err),
        }
    }

    async fn request_token(
        &self,
        form: &[(&str, &str)],
        previous_refresh: Option<String>,
    ) -> Result<Token> {
        let credentials = STANDARD.encode(format!("{}:{}", self.client_id, self.client_secret));
        let request = Request::post(self.token_url.as_str())
            .header("Authorization", format!("Basic {}", credentials))
            .form(form.iter().copied());

        let body = self.transport.send(request).await.map_err(|err| match err {
            SpotifyError::Http { status, message, .. } => {
                SpotifyError::Auth(format!("token endpoint returned {}: {}", status, message))
            }
            other => other,
        })?;
        let response: TokenResponse = serde_json::from_value(body)
            .map_err(|e| SpotifyError::Auth(format!("malformed token response: {}", e)))?;
        Ok(Token::from_response(response, previous_refresh))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{token_reply, MockTransport, Reply};
    use crate::api::Body;
    use futures_util::future::join_all;

    fn config() -> ClientConfig {
        ClientConfig::new("id", "secret").with_redirect_uri("http://localhost/cb")
    }

    fn form_field(request: &Request, key: &str) -> Option<String> {
        match request.body() {
            Some(Body::Form(form)) => form.get(key).cloned(),
            _ => None,
        }
    }

    #[tokio::test]
    async fn test_client_credentials_fetches_and_caches() {
        let mock = MockTransport::new(|_| token_reply("app-token"));
        let auth = AuthProvider::client_credentials(&config(), mock.clone());

        assert_eq!(auth.get_token().await.unwrap().access_token, "app-token");
        assert_eq!(auth.get_token().await.unwrap().access_token, "app-token");

        let requests = mock.requests();
        assert_eq!(requests.len(), 1);
        assert_eq!(form_field(&requests[0], "grant_type").as_deref(), Some("client_credentials"));
        assert_eq!(
            requests[0].headers().get("Authorization").map(String::as_str),
            Some("Basic aWQ6c2VjcmV0")
        );
    }

    #[tokio::test]
    async fn test_token_inside_margin_is_refreshed() {
        let mock = MockTransport::new(|_| token_reply("fresh"));
        let stale = Token::new("stale")
            .with_refresh_token("r1")
            .with_expires_in(Duration::from_secs(30));
        let auth = AuthProvider::with_token(&config(), mock.clone(), stale);

        let token = auth.get_token().await.unwrap();
        assert_eq!(token.access_token, "fresh");
        assert_eq!(token.refresh_token.as_deref(), Some("r1"));
        assert_eq!(form_field(&mock.requests()[0], "refresh_token").as_deref(), Some("r1"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_callers_share_one_refresh() {
        let mock = MockTransport::new(|_| {
            Reply::Delayed(Duration::from_millis(200), Box::new(token_reply("fresh")))
        });
        let stale = Token::new("stale").with_refresh_token("r1");
        let auth = Arc::new(AuthProvider::with_token(&config(), mock.clone(), stale));

        let tasks = (0..8).map(|_| {
            let auth = auth.clone();
            tokio::spawn(async move { auth.get_token().await })
        });
        for result in join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap().access_token, "fresh");
        }
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_refresh_rejected_skips_when_already_renewed() {
        let mock = MockTransport::new(|_| token_reply("fresh"));
        let auth = AuthProvider::with_token(
            &config(),
            mock.clone(),
            Token::new("current")
                .with_refresh_token("r1")
                .with_expires_in(Duration::from_secs(3600)),
        );

        let token = auth.refresh_rejected("older").await.unwrap();
        assert_eq!(token.access_token, "current");
        assert!(mock.requests().is_empty());

        let token = auth.refresh_rejected("current").await.unwrap();
        assert_eq!(token.access_token, "fresh");
        assert_eq!(mock.requests().len(), 1);
    }

    #[tokio::test]
    async fn test_rejected_refresh_discards_token() {
        let mock = MockTransport::new(|_| {
            Reply::Status(400, r#"{"error":"invalid_grant","error_description":"Refresh token revoked"}"#)
        });
        let auth = AuthProvider::with_token(&config(), mock.clone(), Token::new("old").with_refresh_token("r1"));

        let err = auth.get_token().await.unwrap_err();
        assert!(matches!(&err, SpotifyError::Auth(msg) if msg.contains("Refresh token revoked")));
        assert!(auth.token().await.is_none());
        assert!(!auth.can_refresh().await);
    }

    #[tokio::test]
    async fn test_missing_refresh_token() {
        let mock = MockTransport::new(|_| token_reply("unused"));
        let auth = AuthProvider::with_token(&config(), mock.clone(), Token::new("expired"));
        assert!(matches!(auth.get_token().await, Err(SpotifyError::Auth(_))));
        assert!(mock.requests().is_empty());
    }

    #[tokio::test]
    async fn test_exchange_code_switches_grant() {
        let mock = MockTransport::new(|_| token_reply("user-token"));
        let auth = AuthProvider::client_credentials(&config(), mock.clone());

        let token = auth.exchange_code("AQD", None).await.unwrap();
        assert_eq!(token.access_token, "user-token");
        assert_eq!(auth.grant().await, Grant::AuthorizationCode);

        let request = &mock.requests()[0];
        assert_eq!(form_field(request, "code").as_deref(), Some("AQD"));
        assert_eq!(form_field(request, "redirect_uri").as_deref(), Some("http://localhost/cb"));
    }

    #[tokio::test]
    async fn test_exchange_code_requires_redirect_uri() {
        let mock = MockTransport::new(|_| token_reply("unused"));
        let auth = AuthProvider::client_credentials(&ClientConfig::new("id", "secret"), mock);
        tokio_test::assert_err!(auth.exchange_code("AQD", None).await);
    }

    #[tokio::test]
    async fn test_exchange_code_redirect_override() {
        let mock = MockTransport::new(|_| token_reply("user-token"));
        let auth = AuthProvider::client_credentials(&ClientConfig::new("id", "secret"), mock.clone());

        auth.exchange_code("AQD", Some("http://127.0.0.1:8888/callback"))
            .await
            .unwrap();
        assert_eq!(
            form_field(&mock.requests()[0], "redirect_uri").as_deref(),
            Some("http://127.0.0.1:8888/callback")
        );

        let configured = AuthProvider::client_credentials(&config(), mock.clone());
        configured.exchange_code("AQD", Some("http://localhost/other")).await.unwrap();
        assert_eq!(
            form_field(&mock.requests()[1], "redirect_uri").as_deref(),
            Some("http://localhost/other")
        );
    }
}
