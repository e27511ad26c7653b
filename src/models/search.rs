//! Search models.

use serde::{Deserialize, Serialize};

use super::album::Album;
use super::artist::Artist;
use super::common::Paging;
use super::playlist::Playlist;
use super::podcast::{Episode, Show};
use super::track::Track;
use crate::ids::ResourceKind;

/// Results of a search, one page per requested type.
///
/// A type that was not requested stays `None`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct SearchResults {
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,

    #[serde(default)]
    pub albums: Option<Paging<Album>>,

    #[serde(default)]
    pub artists: Option<Paging<Artist>>,

    #[serde(default)]
    pub playlists: Option<Paging<Playlist>>,

    #[serde(default)]
    pub shows: Option<Paging<Show>>,

    #[serde(default)]
    pub episodes: Option<Paging<Episode>>,
}

impl SearchResults {
    /// Total number of items across all returned pages.
    pub fn len(&self) -> usize {
        self.tracks.as_ref().map_or(0, |p| p.items.len())
            + self.albums.as_ref().map_or(0, |p| p.items.len())
            + self.artists.as_ref().map_or(0, |p| p.items.len())
            + self.playlists.as_ref().map_or(0, |p| p.items.len())
            + self.shows.as_ref().map_or(0, |p| p.items.len())
            + self.episodes.as_ref().map_or(0, |p| p.items.len())
    }

    /// Whether nothing was found.
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Types searched when none are given.
pub const SEARCH_TYPES: [ResourceKind; 4] = [
    ResourceKind::Track,
    ResourceKind::Album,
    ResourceKind::Artist,
    ResourceKind::Playlist,
];

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_partial_results() {
        let results: SearchResults = serde_json::from_str(
            r#"{"tracks": {"items": [{"id": "a", "name": "x"}], "total": 1}, "playlists": {"items": [null], "total": 1}}"#,
        )
        .unwrap();
        assert_eq!(results.len(), 1);
        assert!(results.albums.is_none());
        assert!(results.playlists.unwrap().items.is_empty());
    }

    #[test]
    fn test_parse_podcast_results() {
        let results: SearchResults = serde_json::from_str(
            r#"{"shows": {"items": [{"id": "s", "name": "Show"}], "total": 1},
                "episodes": {"items": [{"id": "e", "name": "Ep"}, {"id": "f", "name": "Ep 2"}], "total": 2}}"#,
        )
        .unwrap();
        assert_eq!(results.len(), 3);
        assert!(results.tracks.is_none());
    }
}
