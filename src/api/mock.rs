//! Scripted transport for unit tests.

use std::sync::{Arc, Mutex};
use std::time::Duration;

use async_trait::async_trait;
use serde_json::{json, Value};

use super::request::Request;
use super::transport::Transport;
use crate::auth::{AuthProvider, Token};
use crate::client::Spotify;
use crate::config::ClientConfig;
use crate::error::{Result, SpotifyError};

/// Canned reply for one request.
#[derive(Debug, Clone)]
pub(crate) enum Reply {
    Json(Value),
    Status(u16, &'static str),
    /// 429 with an optional `Retry-After` in seconds.
    RateLimited(Option<u64>),
    Delayed(Duration, Box<Reply>),
}

type Handler = Box<dyn Fn(&Request) -> Reply + Send + Sync>;

/// Transport answering every request from a handler and recording it.
pub(crate) struct MockTransport {
    handler: Handler,
    requests: Mutex<Vec<Request>>,
}

impl std::fmt::Debug for MockTransport {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("MockTransport").finish_non_exhaustive()
    }
}

impl MockTransport {
    pub fn new<F>(handler: F) -> Arc<Self>
    where
        F: Fn(&Request) -> Reply + Send + Sync + 'static,
    {
        Arc::new(Self {
            handler: Box::new(handler),
            requests: Mutex::new(Vec::new()),
        })
    }

    /// Answer API requests with `replies` in order, repeating the last one.
    /// Token requests get a fresh token.
    pub fn sequence(replies: Vec<Reply>) -> Arc<Self> {
        let replies = Mutex::new(replies.into_iter().collect::<std::collections::VecDeque<_>>());
        Self::new(move |request| {
            if is_token_request(request) {
                return token_reply("refreshed");
            }
            let mut replies = replies.lock().unwrap();
            if replies.len() > 1 {
                replies.pop_front().unwrap()
            } else {
                replies.front().cloned().unwrap_or(Reply::Json(json!({})))
            }
        })
    }

    /// Every request seen so far.
    pub fn requests(&self) -> Vec<Request> {
        self.requests.lock().unwrap().clone()
    }

    /// Requests sent to the Web API, excluding the token endpoint.
    pub fn api_requests(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(|r| !is_token_request(r))
            .collect()
    }

    /// Requests sent to the token endpoint.
    pub fn token_requests(&self) -> Vec<Request> {
        self.requests()
            .into_iter()
            .filter(is_token_request)
            .collect()
    }
}

#[async_trait]
impl Transport for MockTransport {
    async fn send(&self, request: Request) -> Result<Value> {
        let reply = (self.handler)(&request);
        self.requests.lock().unwrap().push(request);
        resolve(reply).await
    }
}

async fn resolve(mut reply: Reply) -> Result<Value> {
    loop {
        match reply {
            Reply::Json(value) => return Ok(value),
            Reply::Status(status, body) => return Err(SpotifyError::http(status, body)),
            Reply::RateLimited(secs) => {
                return Err(SpotifyError::Http {
                    status: 429,
                    message: "API rate limit exceeded".to_string(),
                    body: String::new(),
                    retry_after: secs.map(Duration::from_secs),
                })
            }
            Reply::Delayed(delay, inner) => {
                tokio::time::sleep(delay).await;
                reply = *inner;
            }
        }
    }
}

pub(crate) fn is_token_request(request: &Request) -> bool {
    request.path().ends_with("/api/token")
}

/// Token endpoint reply carrying `access_token`.
pub(crate) fn token_reply(access_token: &str) -> Reply {
    Reply::Json(json!({
        "access_token": access_token,
        "token_type": "Bearer",
        "expires_in": 3600,
        "scope": "user-read-private"
    }))
}

/// Paging object with the given items and `next` link.
pub(crate) fn page(items: Vec<Value>, next: Option<&str>, total: usize) -> Value {
    json!({
        "href": "https://api.spotify.com/v1/mock",
        "items": items,
        "limit": 50,
        "next": next,
        "offset": 0,
        "total": total
    })
}

pub(crate) fn test_config() -> ClientConfig {
    ClientConfig::new("id", "secret").with_redirect_uri("http://localhost/cb")
}

/// User token valid for an hour with a refresh token.
pub(crate) fn user_token() -> Token {
    Token::new("user-token")
        .with_refresh_token("refresh")
        .with_expires_in(Duration::from_secs(3600))
}

/// Client over `mock`, authenticated with [`user_token`].
pub(crate) fn user_client(mock: &Arc<MockTransport>) -> Spotify {
    let config = test_config();
    let transport: Arc<dyn Transport> = mock.clone();
    let auth = AuthProvider::with_token(&config, transport.clone(), user_token());
    Spotify::with_parts(config, transport, auth)
}
