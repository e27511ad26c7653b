//! Authenticated request execution with bounded retries.

use std::sync::Arc;
use std::time::Duration;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::Request;
use super::transport::Transport;
use crate::auth::AuthProvider;
use crate::error::{Result, SpotifyError};

/// Sends requests with the current token and recovers from the two
/// transient failures the API reports.
///
/// * 429: sleep for `Retry-After` (or the configured default) and retry
///   once. A second 429 becomes [`SpotifyError::RateLimited`].
/// * 401: renew the token once and retry. A failed renewal propagates its
///   [`SpotifyError::Auth`].
///
/// Every other error is returned unchanged, so a call makes at most three
/// attempts.
#[derive(Debug, Clone)]
pub struct RetryPolicy {
    transport: Arc<dyn Transport>,
    auth: Arc<AuthProvider>,
    default_retry_after: Duration,
}

impl RetryPolicy {
    pub fn new(
        transport: Arc<dyn Transport>,
        auth: Arc<AuthProvider>,
        default_retry_after: Duration,
    ) -> Self {
        Self {
            transport,
            auth,
            default_retry_after,
        }
    }

    pub fn auth(&self) -> &Arc<AuthProvider> {
        &self.auth
    }

    /// Send `request` and return the response body.
    pub async fn execute(&self, request: &Request) -> Result<Value> {
        let mut token = self.auth.get_token().await?;
        let mut rate_limited = false;
        let mut refreshed = false;

        loop {
            let attempt = request.authorized(&token.access_token);
            match self.transport.send(attempt).await {
                Ok(body) => return Ok(body),
                Err(SpotifyError::Http {
                    status: 429,
                    retry_after,
                    ..
                }) => {
                    if rate_limited {
                        warn!("{} {} still rate limited after retry", request.method(), request.path());
                        return Err(SpotifyError::RateLimited { retry_after });
                    }
                    rate_limited = true;
                    let delay = retry_after.unwrap_or(self.default_retry_after);
                    warn!(
                        "{} {} rate limited, retrying in {:?}",
                        request.method(),
                        request.path(),
                        delay
                    );
                    tokio::time::sleep(delay).await;
                }
                Err(err @ SpotifyError::Http { status: 401, .. }) => {
                    if refreshed || !self.auth.can_refresh().await {
                        return Err(err);
                    }
                    refreshed = true;
                    debug!("{} {} unauthorized, renewing token", request.method(), request.path());
                    token = self.auth.refresh_rejected(&token.access_token).await?;
                }
                Err(err) => return Err(err),
            }
        }
    }

    /// Send `request` and deserialize the response body.
    pub async fn execute_as<T: DeserializeOwned>(&self, request: &Request) -> Result<T> {
        let body = self.execute(request).await?;
        Ok(serde_json::from_value(body)?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{is_token_request, test_config, token_reply, user_token, MockTransport, Reply};
    use crate::auth::Token;
    use futures_util::future::join_all;
    use serde_json::json;

    fn policy(mock: &Arc<MockTransport>, token: Token) -> RetryPolicy {
        let config = test_config();
        let transport: Arc<dyn Transport> = mock.clone();
        let auth = Arc::new(AuthProvider::with_token(&config, transport.clone(), token));
        RetryPolicy::new(transport, auth, config.default_retry_after)
    }

    fn bearer(request: &Request) -> Option<&str> {
        request.headers().get("Authorization").map(String::as_str)
    }

    #[tokio::test]
    async fn test_attaches_bearer_token() {
        let mock = MockTransport::sequence(vec![Reply::Json(json!({"id": "me"}))]);
        let body = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap();
        assert_eq!(body["id"], "me");
        assert_eq!(bearer(&mock.requests()[0]), Some("Bearer user-token"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_waits_retry_after_then_retries_once() {
        let mock = MockTransport::sequence(vec![
            Reply::RateLimited(Some(2)),
            Reply::Json(json!({"ok": true})),
        ]);
        let started = tokio::time::Instant::now();
        let body = policy(&mock, user_token())
            .execute(&Request::get("/tracks/x"))
            .await
            .unwrap();

        assert_eq!(body["ok"], true);
        assert!(started.elapsed() >= Duration::from_secs(2));
        assert_eq!(mock.api_requests().len(), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn test_rate_limit_without_header_uses_default() {
        let mock = MockTransport::sequence(vec![Reply::RateLimited(None), Reply::Json(json!({}))]);
        let started = tokio::time::Instant::now();
        policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap();
        assert!(started.elapsed() >= test_config().default_retry_after);
    }

    #[tokio::test(start_paused = true)]
    async fn test_second_rate_limit_is_surfaced() {
        let mock = MockTransport::sequence(vec![Reply::RateLimited(Some(1)), Reply::RateLimited(Some(5))]);
        let err = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap_err();

        assert!(matches!(
            err,
            SpotifyError::RateLimited { retry_after: Some(d) } if d == Duration::from_secs(5)
        ));
        assert_eq!(mock.api_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_unauthorized_refreshes_once_and_retries() {
        let mock = MockTransport::sequence(vec![
            Reply::Status(401, r#"{"error":{"status":401,"message":"The access token expired"}}"#),
            Reply::Json(json!({"id": "me"})),
        ]);
        let body = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap();

        assert_eq!(body["id"], "me");
        assert_eq!(mock.token_requests().len(), 1);
        let api = mock.api_requests();
        assert_eq!(api.len(), 2);
        assert_eq!(bearer(&api[0]), Some("Bearer user-token"));
        assert_eq!(bearer(&api[1]), Some("Bearer refreshed"));
    }

    #[tokio::test(start_paused = true)]
    async fn test_concurrent_unauthorized_share_one_refresh() {
        let mock = MockTransport::new(|request| {
            if is_token_request(request) {
                Reply::Delayed(Duration::from_millis(100), Box::new(token_reply("refreshed")))
            } else if bearer(request) == Some("Bearer user-token") {
                Reply::Status(401, r#"{"error":{"status":401,"message":"The access token expired"}}"#)
            } else {
                Reply::Json(json!({"id": "me"}))
            }
        });
        let policy = policy(&mock, user_token());

        let tasks = (0..8).map(|_| {
            let policy = policy.clone();
            tokio::spawn(async move { policy.execute(&Request::get("/me")).await })
        });
        for result in join_all(tasks).await {
            assert_eq!(result.unwrap().unwrap()["id"], "me");
        }

        assert_eq!(mock.token_requests().len(), 1);
        let retried: Vec<_> = mock
            .api_requests()
            .into_iter()
            .filter(|r| bearer(r) == Some("Bearer refreshed"))
            .collect();
        assert_eq!(retried.len(), 8);
    }

    #[tokio::test]
    async fn test_second_unauthorized_is_returned() {
        let mock = MockTransport::sequence(vec![Reply::Status(401, "")]);
        let err = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert_eq!(mock.token_requests().len(), 1);
        assert_eq!(mock.api_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_failed_refresh_is_auth_error_without_retry() {
        let mock = MockTransport::new(|request| {
            if is_token_request(request) {
                Reply::Status(400, r#"{"error":"invalid_grant","error_description":"Invalid refresh token"}"#)
            } else {
                Reply::Status(401, "")
            }
        });
        let err = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap_err();

        assert!(matches!(err, SpotifyError::Auth(_)));
        assert_eq!(mock.api_requests().len(), 1);
    }

    #[tokio::test]
    async fn test_unauthorized_without_refresh_token_is_returned() {
        let mock = MockTransport::sequence(vec![Reply::Status(401, "")]);
        let token = Token::new("no-refresh").with_expires_in(Duration::from_secs(3600));
        let err = policy(&mock, token)
            .execute(&Request::get("/me"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(401));
        assert!(mock.token_requests().is_empty());
    }

    #[tokio::test]
    async fn test_other_errors_are_not_retried() {
        let mock = MockTransport::sequence(vec![Reply::Status(503, "")]);
        let err = policy(&mock, user_token())
            .execute(&Request::get("/me"))
            .await
            .unwrap_err();
        assert_eq!(err.status(), Some(503));
        assert_eq!(mock.api_requests().len(), 1);
    }
}
