//! Browse tab content: categories, featured playlists, new releases and
//! recommendations.

use std::collections::BTreeMap;

use super::{join_ids, Spotify};
use crate::api::{Paginator, Request};
use crate::error::{Result, SpotifyError};
use crate::ids::{to_ids, ResourceKind};
use crate::models::{Album, Category, Playlist, Recommendations};

const PAGE_SIZE: u32 = 50;
const MAX_SEEDS: usize = 5;
const MAX_RECOMMENDATIONS: u32 = 100;

/// Track attributes that accept `min_`, `max_` and `target_` bounds.
const TUNABLE_ATTRIBUTES: [&str; 14] = [
    "acousticness",
    "danceability",
    "duration_ms",
    "energy",
    "instrumentalness",
    "key",
    "liveness",
    "loudness",
    "mode",
    "popularity",
    "speechiness",
    "tempo",
    "time_signature",
    "valence",
];

/// Seeds and bounds for [`Spotify::recommendations`].
///
/// Up to five seeds in total, across artists, genres and tracks.
///
/// ```
/// use rustify::RecommendationQuery;
///
/// let query = RecommendationQuery::new()
///     .artists(["4NHQUGzhtTLFvgF5SZesLK"])
///     .genres(["classical"])
///     .min("energy", 0.4)
///     .target("tempo", 120.0)
///     .limit(10);
/// assert_eq!(query.seed_count(), 2);
/// ```
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecommendationQuery {
    artists: Vec<String>,
    genres: Vec<String>,
    tracks: Vec<String>,
    limit: Option<u32>,
    market: Option<String>,
    bounds: BTreeMap<String, f64>,
}

impl RecommendationQuery {
    pub fn new() -> Self {
        Self::default()
    }

    /// Seed artists, as ids, URIs or links.
    pub fn artists<I, S>(mut self, artists: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.artists.extend(artists.into_iter().map(Into::into));
        self
    }

    /// Seed genres, from the available genre seeds.
    pub fn genres<I, S>(mut self, genres: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.genres.extend(genres.into_iter().map(Into::into));
        self
    }

    /// Seed tracks, as ids, URIs or links.
    pub fn tracks<I, S>(mut self, tracks: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.tracks.extend(tracks.into_iter().map(Into::into));
        self
    }

    /// Number of tracks to return, 1 to 100. The API default is 20.
    pub fn limit(mut self, limit: u32) -> Self {
        self.limit = Some(limit);
        self
    }

    pub fn market<S: Into<String>>(mut self, market: S) -> Self {
        self.market = Some(market.into());
        self
    }

    /// Hard floor on a tunable attribute.
    pub fn min(self, attribute: &str, value: f64) -> Self {
        self.bound("min", attribute, value)
    }

    /// Hard ceiling on a tunable attribute.
    pub fn max(self, attribute: &str, value: f64) -> Self {
        self.bound("max", attribute, value)
    }

    /// Preferred value of a tunable attribute.
    pub fn target(self, attribute: &str, value: f64) -> Self {
        self.bound("target", attribute, value)
    }

    fn bound(mut self, prefix: &str, attribute: &str, value: f64) -> Self {
        self.bounds.insert(format!("{}_{}", prefix, attribute), value);
        self
    }

    pub fn seed_count(&self) -> usize {
        self.artists.len() + self.genres.len() + self.tracks.len()
    }

    fn to_request(&self) -> Result<Request> {
        let seeds = self.seed_count();
        if seeds == 0 || seeds > MAX_SEEDS {
            return Err(SpotifyError::InvalidArgument(format!(
                "recommendations need 1 to {} seeds, got {}",
                MAX_SEEDS, seeds
            )));
        }
        if let Some(limit) = self.limit {
            if limit == 0 || limit > MAX_RECOMMENDATIONS {
                return Err(SpotifyError::InvalidArgument(format!(
                    "recommendation limit must be between 1 and {}, got {}",
                    MAX_RECOMMENDATIONS, limit
                )));
            }
        }

        let mut request = Request::get("recommendations")
            .query_opt("limit", self.limit)
            .query_opt("market", self.market.as_deref());
        if !self.artists.is_empty() {
            request = request.query("seed_artists", join_ids(&to_ids(ResourceKind::Artist, &self.artists)?));
        }
        if !self.tracks.is_empty() {
            request = request.query("seed_tracks", join_ids(&to_ids(ResourceKind::Track, &self.tracks)?));
        }
        if !self.genres.is_empty() {
            request = request.query("seed_genres", self.genres.join(","));
        }
        for (key, value) in &self.bounds {
            let attribute = key.split_once('_').map_or("", |(_, attribute)| attribute);
            if !TUNABLE_ATTRIBUTES.contains(&attribute) {
                return Err(SpotifyError::InvalidArgument(format!(
                    "{} is not a tunable track attribute",
                    attribute
                )));
            }
            request = request.query(key.as_str(), value);
        }
        Ok(request)
    }
}

impl Spotify {
    /// A single Browse category, localized by `country` and `locale`.
    pub async fn category(&self, category: &str, country: Option<&str>, locale: Option<&str>) -> Result<Category> {
        if category.trim().is_empty() {
            return Err(SpotifyError::InvalidArgument("category id must not be empty".to_string()));
        }
        let request = Request::get(format!("browse/categories/{}", category.trim()))
            .query_opt("country", country)
            .query_opt("locale", locale);
        self.get_json(request).await
    }

    /// All Browse categories.
    pub fn categories(&self, country: Option<&str>, locale: Option<&str>) -> Paginator<Category> {
        let request = Request::get("browse/categories")
            .query_opt("country", country)
            .query_opt("locale", locale);
        self.paginate(request, PAGE_SIZE, Some("categories"))
    }

    /// Playlists tagged with a category.
    pub fn category_playlists(&self, category: &str, country: Option<&str>) -> Result<Paginator<Playlist>> {
        if category.trim().is_empty() {
            return Err(SpotifyError::InvalidArgument("category id must not be empty".to_string()));
        }
        let request = Request::get(format!("browse/categories/{}/playlists", category.trim()))
            .query_opt("country", country);
        Ok(self.paginate(request, PAGE_SIZE, Some("playlists")))
    }

    /// Featured playlists. `timestamp` is an ISO 8601 local time, used to
    /// pick the playlists relevant at that time of day.
    pub fn featured_playlists(
        &self,
        country: Option<&str>,
        locale: Option<&str>,
        timestamp: Option<&str>,
    ) -> Paginator<Playlist> {
        let request = Request::get("browse/featured-playlists")
            .query_opt("country", country)
            .query_opt("locale", locale)
            .query_opt("timestamp", timestamp);
        self.paginate(request, PAGE_SIZE, Some("playlists"))
    }

    /// Newly released albums, optionally for one country.
    pub fn new_releases(&self, country: Option<&str>) -> Paginator<Album> {
        let request = Request::get("browse/new-releases").query_opt("country", country);
        self.paginate(request, PAGE_SIZE, Some("albums"))
    }

    /// Tracks recommended for the query's seeds and bounds.
    pub async fn recommendations(&self, query: &RecommendationQuery) -> Result<Recommendations> {
        self.get_json(query.to_request()?).await
    }
}
