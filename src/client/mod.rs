//! The [`Spotify`] client.
//!
//! Endpoints are grouped by area in submodules, each adding methods to the
//! same client:
//!
//! - `catalog`: albums, artists, tracks, audio features and analysis, search
//! - `browse`: categories, featured playlists, new releases, recommendations
//! - `podcasts`: shows, episodes, saved shows
//! - `users`: profiles, top items, history, follow
//! - `library`: saved tracks and albums
//! - `playlists`: reading and editing playlists, cover images
//! - `player`: playback state and control

mod browse;
mod catalog;
mod library;
mod player;
mod playlists;
mod podcasts;
mod users;

use std::sync::Arc;

use serde::de::DeserializeOwned;
use serde_json::Value;
use tracing::{debug, error};

use crate::api::{HttpTransport, Paginator, Request, RetryPolicy, Transport};
use crate::auth::{AuthProvider, OAuth2, Token};
use crate::config::ClientConfig;
use crate::error::{Result, SpotifyError};

pub use browse::RecommendationQuery;
pub use player::PlayOptions;
pub use playlists::PlaylistDetails;
pub use users::TimeRange;

/// Asynchronous Spotify Web API client.
///
/// Cheap to clone; clones share the connection pool and the token cache.
///
/// # Example
///
/// ```rust,no_run
/// use rustify::{ClientConfig, Spotify};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let spotify = Spotify::new(ClientConfig::from_env()?)?;
///     let track = spotify.track("spotify:track:4uLU6hMCjMI75M1A2tKUQC", None).await?;
///     println!("{} by {}", track.name, track.artists_string(", "));
///     Ok(())
/// }
/// ```
#[derive(Debug, Clone)]
pub struct Spotify {
    config: Arc<ClientConfig>,
    policy: RetryPolicy,
}

impl Spotify {
    /// Client with an app-only token from the client-credentials grant.
    ///
    /// The token is fetched on the first request. User endpoints need
    /// [`with_token`](Self::with_token) or [`exchange_code`](Self::exchange_code).
    pub fn new(config: ClientConfig) -> Result<Self> {
        config.validate()?;
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.api_base_url, &config.user_agent)?);
        let auth = AuthProvider::client_credentials(&config, transport.clone());
        Ok(Self::with_parts(config, transport, auth))
    }

    /// Client acting for a user, seeded with a previously obtained token.
    pub fn with_token(config: ClientConfig, token: Token) -> Result<Self> {
        config.validate()?;
        let transport: Arc<dyn Transport> =
            Arc::new(HttpTransport::new(&config.api_base_url, &config.user_agent)?);
        let auth = AuthProvider::with_token(&config, transport.clone(), token);
        Ok(Self::with_parts(config, transport, auth))
    }

    /// Client over a custom transport.
    pub fn with_transport(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        token: Option<Token>,
    ) -> Self {
        let auth = match token {
            Some(token) => AuthProvider::with_token(&config, transport.clone(), token),
            None => AuthProvider::client_credentials(&config, transport.clone()),
        };
        Self::with_parts(config, transport, auth)
    }

    pub(crate) fn with_parts(
        config: ClientConfig,
        transport: Arc<dyn Transport>,
        auth: AuthProvider,
    ) -> Self {
        let policy = RetryPolicy::new(transport, Arc::new(auth), config.default_retry_after);
        Self {
            config: Arc::new(config),
            policy,
        }
    }

    pub fn config(&self) -> &ClientConfig {
        &self.config
    }

    /// The token provider shared by all clones of this client.
    pub fn auth(&self) -> &AuthProvider {
        self.policy.auth()
    }

    /// Authorize URL builder preloaded with this client's id, redirect URI and scopes.
    pub fn oauth(&self) -> Result<OAuth2> {
        OAuth2::from_config(&self.config)
    }

    /// Exchange an authorization code and act for that user from now on.
    ///
    /// `redirect_uri` must match the one the authorize URL was built with;
    /// `None` uses the configured one.
    pub async fn exchange_code(&self, code: &str, redirect_uri: Option<&str>) -> Result<Token> {
        self.auth().exchange_code(code, redirect_uri).await
    }

    /// Current token, for persisting between runs.
    pub async fn token(&self) -> Option<Token> {
        self.auth().token().await
    }

    pub(crate) async fn send(&self, request: Request) -> Result<Value> {
        self.policy.execute(&request).await
    }

    pub(crate) async fn get_json<T: DeserializeOwned>(&self, request: Request) -> Result<T> {
        self.policy.execute_as(&request).await
    }

    /// Deserialize the array under `key` of the response.
    pub(crate) async fn get_list<T: DeserializeOwned>(&self, request: Request, key: &str) -> Result<Vec<T>> {
        let body = self.send(request).await?;
        list_from(body, Some(key))
    }

    pub(crate) fn paginate<T: DeserializeOwned>(
        &self,
        request: Request,
        page_size: u32,
        items_key: Option<&'static str>,
    ) -> Paginator<T> {
        Paginator::new(self.policy.clone(), request, page_size, items_key)
    }

    /// Read `ids` in chunks of at most `max`, concatenating the results.
    ///
    /// `key` names the array in each response; `None` means the body itself
    /// is the array.
    pub(crate) async fn fetch_chunked<T, F>(
        &self,
        ids: &[String],
        max: usize,
        key: Option<&str>,
        build: F,
    ) -> Result<Vec<T>>
    where
        T: DeserializeOwned,
        F: Fn(&[String]) -> Request,
    {
        require_ids(ids)?;
        let mut results = Vec::with_capacity(ids.len());
        for chunk in ids.chunks(max) {
            let body = self.send(build(chunk)).await?;
            results.extend(list_from::<T>(body, key)?);
        }
        Ok(results)
    }

    /// Send one mutation per chunk, in order.
    ///
    /// Each entry pairs a request with the number of items it applies. When
    /// the work was split and a chunk fails, the error is wrapped in
    /// [`SpotifyError::PartialBatch`] with the number of items applied by
    /// the chunks before it. Returns the body of every call.
    pub(crate) async fn send_chunked(&self, chunks: Vec<(Request, usize)>) -> Result<Vec<Value>> {
        let split = chunks.len() > 1;
        let mut completed_count = 0;
        let mut bodies = Vec::with_capacity(chunks.len());
        for (request, size) in chunks {
            match self.send(request).await {
                Ok(body) => {
                    completed_count += size;
                    bodies.push(body);
                }
                Err(err) if split => {
                    error!("Batch failed after {} items: {}", completed_count, err);
                    return Err(SpotifyError::PartialBatch {
                        completed_count,
                        source: Box::new(err),
                    });
                }
                Err(err) => return Err(err),
            }
        }
        debug!("Batch applied {} items", completed_count);
        Ok(bodies)
    }
}

/// Deserialize the array at `key` (or the body itself), skipping nulls.
fn list_from<T: DeserializeOwned>(mut body: Value, key: Option<&str>) -> Result<Vec<T>> {
    let list = match key {
        Some(key) => body.get_mut(key).map(Value::take).unwrap_or(Value::Null),
        None => body,
    };
    match list {
        Value::Array(items) => {
            let total = items.len();
            let list = items
                .into_iter()
                .filter(|item| !item.is_null())
                .map(|item| serde_json::from_value(item).map_err(SpotifyError::from))
                .collect::<Result<Vec<T>>>()?;
            if list.len() < total {
                debug!("Skipped {} null items of {}", total - list.len(), total);
            }
            Ok(list)
        }
        Value::Null => Ok(Vec::new()),
        other => Ok(vec![serde_json::from_value(other)?]),
    }
}

pub(crate) fn require_ids<S>(ids: &[S]) -> Result<()> {
    if ids.is_empty() {
        return Err(SpotifyError::InvalidArgument("at least one id is required".to_string()));
    }
    Ok(())
}

/// Comma-joined ids for the `ids` query parameter.
pub(crate) fn join_ids(ids: &[String]) -> String {
    ids.join(",")
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::mock::{user_client, MockTransport, Reply};
    use serde_json::json;

    #[tokio::test]
    async fn test_send_chunked_reports_completed_count() {
        let mock = MockTransport::new(|request| {
            if request.query_param("n") == Some("2") {
                Reply::Status(502, "")
            } else {
                Reply::Json(json!({}))
            }
        });
        let client = user_client(&mock);

        let chunks = vec![
            (Request::put("/me/tracks").query("n", 1), 50),
            (Request::put("/me/tracks").query("n", 2), 50),
            (Request::put("/me/tracks").query("n", 3), 20),
        ];
        let err = client.send_chunked(chunks).await.unwrap_err();
        match err {
            SpotifyError::PartialBatch { completed_count, source } => {
                assert_eq!(completed_count, 50);
                assert_eq!(source.status(), Some(502));
            }
            other => panic!("expected PartialBatch, got {:?}", other),
        }
        assert_eq!(mock.api_requests().len(), 2);
    }

    #[tokio::test]
    async fn test_single_chunk_error_is_not_wrapped() {
        let mock = MockTransport::sequence(vec![Reply::Status(404, "")]);
        let client = user_client(&mock);
        let err = client
            .send_chunked(vec![(Request::put("/me/tracks"), 3)])
            .await
            .unwrap_err();
        assert!(err.is_not_found());
    }

    #[test]
    fn test_list_from() {
        let tracks: Vec<String> = list_from(json!({"ids": ["a", null, "b"]}), Some("ids")).unwrap();
        assert_eq!(tracks, vec!["a", "b"]);
        let flags: Vec<bool> = list_from(json!([true, false]), None).unwrap();
        assert_eq!(flags, vec![true, false]);
        let empty: Vec<bool> = list_from(json!({}), Some("missing")).unwrap();
        assert!(empty.is_empty());
    }

    #[test]
    fn test_require_ids() {
        assert!(require_ids::<String>(&[]).is_err());
        assert!(require_ids(&["a"]).is_ok());
    }

    #[tokio::test]
    async fn test_oauth_uses_config() {
        let mock = MockTransport::sequence(vec![]);
        let client = user_client(&mock);
        let url = client.oauth().unwrap().url();
        assert!(url.contains("client_id=id"));
        assert!(url.contains("redirect_uri=http%3A%2F%2Flocalhost%2Fcb"));
    }
}
