//! HTTP transport.
//!
//! A [`Transport`] maps one [`Request`] to one JSON response. It never
//! retries and keeps no state between calls; retries live in
//! [`RetryPolicy`](super::RetryPolicy).

use std::fmt;
use std::time::Duration;

use async_trait::async_trait;
use reqwest::header::{HeaderMap, CONTENT_TYPE, RETRY_AFTER};
use reqwest::Client;
use serde_json::Value;
use tracing::{debug, warn};

use super::request::{Body, Request};
use crate::error::{error_message, Result, SpotifyError};

/// Sends requests and returns parsed JSON bodies.
#[async_trait]
pub trait Transport: Send + Sync + fmt::Debug {
    /// Send one request.
    ///
    /// 2xx responses yield the parsed body, an empty body yields an empty
    /// object. Any other status yields [`SpotifyError::Http`].
    async fn send(&self, request: Request) -> Result<Value>;
}

/// [`Transport`] backed by a `reqwest` connection pool.
///
/// The pool is owned by this value and released when it is dropped.
#[derive(Debug, Clone)]
pub struct HttpTransport {
    client: Client,
    base_url: String,
}

impl HttpTransport {
    /// Create a transport for the given API base URL.
    pub fn new(base_url: &str, user_agent: &str) -> Result<Self> {
        let client = Client::builder().user_agent(user_agent).build()?;
        Ok(Self::with_client(client, base_url))
    }

    /// Create a transport reusing an existing `reqwest` client.
    pub fn with_client(client: Client, base_url: &str) -> Self {
        Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        }
    }

    fn url_for(&self, request: &Request) -> String {
        if request.is_absolute() {
            request.path().to_string()
        } else {
            format!("{}/{}", self.base_url, request.path().trim_start_matches('/'))
        }
    }
}

#[async_trait]
impl Transport for HttpTransport {
    async fn send(&self, request: Request) -> Result<Value> {
        let url = self.url_for(&request);
        debug!("{} {} {:?}", request.method(), url, request.query_params());

        let mut builder = self.client.request(request.method().clone(), &url);
        if !request.query_params().is_empty() {
            builder = builder.query(request.query_params());
        }
        for (name, value) in request.headers() {
            builder = builder.header(name.as_str(), value.as_str());
        }
        builder = match request.body() {
            Some(Body::Json(json)) => builder.json(json),
            Some(Body::Form(form)) => builder.form(form),
            Some(Body::Raw { content_type, data }) => builder
                .header(CONTENT_TYPE, content_type.as_str())
                .body(data.clone()),
            // Spotify rejects body-less PUT/POST without a Content-Length.
            None if request.method() != reqwest::Method::GET => builder.body(Vec::new()),
            None => builder,
        };

        let response = builder.send().await?;
        let status = response.status();
        let retry_after = parse_retry_after(response.headers());
        let text = response.text().await?;

        if status.is_success() {
            return parse_body(&text);
        }

        let status = status.as_u16();
        let message = error_message(&text).unwrap_or_else(|| format!("status {}", status));
        warn!("{} {} failed: HTTP {} {}", request.method(), url, status, message);
        Err(SpotifyError::Http {
            status,
            message,
            body: text,
            retry_after,
        })
    }
}

/// Parse a success body, treating an empty body as an empty object.
pub(crate) fn parse_body(text: &str) -> Result<Value> {
    if text.trim().is_empty() {
        return Ok(Value::Object(serde_json::Map::new()));
    }
    Ok(serde_json::from_str(text)?)
}

/// Read `Retry-After` as a number of seconds.
pub(crate) fn parse_retry_after(headers: &HeaderMap) -> Option<Duration> {
    headers
        .get(RETRY_AFTER)
        .and_then(|v| v.to_str().ok())
        .and_then(|v| v.trim().parse::<u64>().ok())
        .map(Duration::from_secs)
}

#[cfg(test)]
mod tests {
    use super::*;
    use reqwest::header::HeaderValue;

    #[test]
    fn test_parse_empty_body() {
        assert_eq!(parse_body("").unwrap(), serde_json::json!({}));
        assert_eq!(parse_body("  \n").unwrap(), serde_json::json!({}));
    }

    #[test]
    fn test_parse_json_body() {
        assert_eq!(parse_body(r#"[true,false]"#).unwrap(), serde_json::json!([true, false]));
        assert!(matches!(parse_body("{oops"), Err(SpotifyError::Parse(_))));
    }

    #[test]
    fn test_parse_retry_after() {
        let mut headers = HeaderMap::new();
        assert_eq!(parse_retry_after(&headers), None);
        headers.insert(RETRY_AFTER, HeaderValue::from_static("2"));
        assert_eq!(parse_retry_after(&headers), Some(Duration::from_secs(2)));
        headers.insert(RETRY_AFTER, HeaderValue::from_static("Wed, 21 Oct 2015 07:28:00 GMT"));
        assert_eq!(parse_retry_after(&headers), None);
    }

    #[test]
    fn test_url_for() {
        let transport = HttpTransport::with_client(Client::new(), "https://api.spotify.com/v1/");
        assert_eq!(
            transport.url_for(&Request::get("/albums/abc")),
            "https://api.spotify.com/v1/albums/abc"
        );
        assert_eq!(
            transport.url_for(&Request::post("https://accounts.spotify.com/api/token")),
            "https://accounts.spotify.com/api/token"
        );
    }
}
