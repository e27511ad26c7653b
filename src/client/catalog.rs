//! Catalog endpoints: albums, artists, tracks, audio features and analysis, search.
//!
//! `market` takes an ISO 3166-1 alpha-2 code or "from_token" and applies
//! track relinking for that market.

use super::{join_ids, Spotify};
use crate::api::{Paginator, Request};
use crate::error::{Result, SpotifyError};
use crate::ids::{to_id, to_ids, ResourceKind};
use crate::models::{Album, AlbumGroup, Artist, AudioAnalysis, AudioFeatures, SearchResults, Track};

const MAX_ALBUMS: usize = 20;
const MAX_ARTISTS: usize = 50;
const MAX_TRACKS: usize = 50;
const MAX_AUDIO_FEATURES: usize = 100;
const PAGE_SIZE: u32 = 50;

impl Spotify {
    /// Get an album by id, URI or link.
    pub async fn album(&self, album: &str, market: Option<&str>) -> Result<Album> {
        let id = to_id(ResourceKind::Album, album)?;
        self.get_json(Request::get(format!("albums/{}", id)).query_opt("market", market))
            .await
    }

    /// Get several albums, 20 per request. Unknown ids are left out.
    pub async fn albums<S: AsRef<str>>(&self, albums: &[S], market: Option<&str>) -> Result<Vec<Album>> {
        let ids = to_ids(ResourceKind::Album, albums)?;
        self.fetch_chunked(&ids, MAX_ALBUMS, Some("albums"), |chunk| {
            Request::get("albums")
                .query("ids", join_ids(chunk))
                .query_opt("market", market)
        })
        .await
    }

    /// Tracks of an album in disc and track order.
    pub fn album_tracks(&self, album: &str, market: Option<&str>) -> Result<Paginator<Track>> {
        let id = to_id(ResourceKind::Album, album)?;
        let request = Request::get(format!("albums/{}/tracks", id)).query_opt("market", market);
        Ok(self.paginate(request, PAGE_SIZE, None))
    }

    pub async fn artist(&self, artist: &str) -> Result<Artist> {
        let id = to_id(ResourceKind::Artist, artist)?;
        self.get_json(Request::get(format!("artists/{}", id))).await
    }

    /// Get several artists, 50 per request.
    pub async fn artists<S: AsRef<str>>(&self, artists: &[S]) -> Result<Vec<Artist>> {
        let ids = to_ids(ResourceKind::Artist, artists)?;
        self.fetch_chunked(&ids, MAX_ARTISTS, Some("artists"), |chunk| {
            Request::get("artists").query("ids", join_ids(chunk))
        })
        .await
    }

    /// Albums of an artist, restricted to `groups` when not empty.
    pub fn artist_albums(&self, artist: &str, groups: &[AlbumGroup]) -> Result<Paginator<Album>> {
        let id = to_id(ResourceKind::Artist, artist)?;
        let mut request = Request::get(format!("artists/{}/albums", id));
        if !groups.is_empty() {
            let groups: Vec<&str> = groups.iter().map(AlbumGroup::as_str).collect();
            request = request.query("include_groups", groups.join(","));
        }
        Ok(self.paginate(request, PAGE_SIZE, None))
    }

    /// An artist's most popular tracks in a market (ISO 3166-1 alpha-2 code).
    pub async fn artist_top_tracks(&self, artist: &str, country: &str) -> Result<Vec<Track>> {
        let id = to_id(ResourceKind::Artist, artist)?;
        if country.trim().is_empty() {
            return Err(SpotifyError::InvalidArgument("country must not be empty".to_string()));
        }
        self.get_list(
            Request::get(format!("artists/{}/top-tracks", id)).query("country", country),
            "tracks",
        )
        .await
    }

    /// Artists similar to the given one.
    pub async fn artist_related_artists(&self, artist: &str) -> Result<Vec<Artist>> {
        let id = to_id(ResourceKind::Artist, artist)?;
        self.get_list(Request::get(format!("artists/{}/related-artists", id)), "artists")
            .await
    }

    pub async fn track(&self, track: &str, market: Option<&str>) -> Result<Track> {
        let id = to_id(ResourceKind::Track, track)?;
        self.get_json(Request::get(format!("tracks/{}", id)).query_opt("market", market))
            .await
    }

    /// Get several tracks, 50 per request.
    pub async fn tracks<S: AsRef<str>>(&self, tracks: &[S], market: Option<&str>) -> Result<Vec<Track>> {
        let ids = to_ids(ResourceKind::Track, tracks)?;
        self.fetch_chunked(&ids, MAX_TRACKS, Some("tracks"), |chunk| {
            Request::get("tracks")
                .query("ids", join_ids(chunk))
                .query_opt("market", market)
        })
        .await
    }

    /// Audio analysis summary of one track.
    pub async fn audio_feature(&self, track: &str) -> Result<AudioFeatures> {
        let id = to_id(ResourceKind::Track, track)?;
        self.get_json(Request::get(format!("audio-features/{}", id))).await
    }

    /// Detailed analysis of a track: bars, beats, sections and segments.
    pub async fn audio_analysis(&self, track: &str) -> Result<AudioAnalysis> {
        let id = to_id(ResourceKind::Track, track)?;
        self.get_json(Request::get(format!("audio-analysis/{}", id))).await
    }

    /// Audio features of several tracks, 100 per request.
    pub async fn audio_features<S: AsRef<str>>(&self, tracks: &[S]) -> Result<Vec<AudioFeatures>> {
        let ids = to_ids(ResourceKind::Track, tracks)?;
        self.fetch_chunked(&ids, MAX_AUDIO_FEATURES, Some("audio_features"), |chunk| {
            Request::get("audio-features").query("ids", join_ids(chunk))
        })
        .await
    }

    /// Search the catalog.
    ///
    /// `types` defaults to every searchable type when empty. `limit` is
    /// 1 to 50 per type.
    pub async fn search(
        &self,
        query: &str,
        types: &[ResourceKind],
        limit: u32,
        offset: u32,
        market: Option<&str>,
    ) -> Result<SearchResults> {
        if query.trim().is_empty() {
            return Err(SpotifyError::InvalidArgument("search query must not be empty".to_string()));
        }
        if !(1..=50).contains(&limit) {
            return Err(SpotifyError::InvalidArgument(format!(
                "search limit must be between 1 and 50, got {}",
                limit
            )));
        }
        let types = if types.is_empty() {
            &crate::models::SEARCH_TYPES[..]
        } else {
            types
        };
        if types.contains(&ResourceKind::User) {
            return Err(SpotifyError::InvalidArgument("cannot search for users".to_string()));
        }

        let types: Vec<&str> = types.iter().map(ResourceKind::as_str).collect();
        let request = Request::get("search")
            .query("q", query)
            .query("type", types.join(","))
            .query("limit", limit)
            .query("offset", offset)
            .query_opt("market", market);
        self.get_json(request).await
    }
}
