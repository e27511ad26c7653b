//! Track-related models.
//!
//! This module contains models for representing tracks, playlist entries,
//! listening history and audio features.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::album::Album;
use super::artist::Artist;
use super::common::{impl_resource, null_as_default, Context, ExternalUrls};
use super::user::User;
use crate::ids::ResourceKind;

/// A track record.
///
/// Tracks nested in an album payload carry no `album`; every other field
/// may be missing in simplified payloads and falls back to its default.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Track {
    /// Spotify ID. Empty for local files.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "track".
    #[serde(rename = "type", default = "default_track_type")]
    pub type_: String,

    /// Spotify URI.
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    /// Track name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Duration in milliseconds.
    #[serde(default)]
    pub duration_ms: u64,

    /// Whether the track has explicit lyrics.
    #[serde(default)]
    pub explicit: bool,

    /// Disc number (1-indexed).
    #[serde(default = "default_one")]
    pub disc_number: u32,

    /// Track number on the disc (1-indexed).
    #[serde(default = "default_one")]
    pub track_number: u32,

    /// Popularity between 0 and 100.
    #[serde(default)]
    pub popularity: Option<u32>,

    /// 30 second preview, if available.
    #[serde(default)]
    pub preview_url: Option<String>,

    /// Whether this is a local file rather than a catalog track.
    #[serde(default)]
    pub is_local: bool,

    /// Playability in the requested market, when relinking was applied.
    #[serde(default)]
    pub is_playable: Option<bool>,

    /// Album containing this track. Absent when nested inside an album.
    #[serde(default)]
    pub album: Option<Album>,

    /// Performing artists.
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<Artist>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    /// Web API link to the full track.
    #[serde(default)]
    pub href: Option<String>,
}

fn default_track_type() -> String {
    "track".to_string()
}

fn default_one() -> u32 {
    1
}

impl_resource!(Track => ResourceKind::Track);

impl Track {
    /// Get the primary artist name.
    pub fn primary_artist(&self) -> Option<&str> {
        self.artists.first().map(|a| a.name.as_str())
    }

    /// Get all artist names joined by a separator.
    pub fn artists_string(&self, separator: &str) -> String {
        self.artists
            .iter()
            .map(|a| a.name.as_str())
            .collect::<Vec<_>>()
            .join(separator)
    }

    /// Get duration formatted as MM:SS.
    pub fn duration_formatted(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

/// An entry of a playlist.
///
/// The same track may appear several times in one playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct PlaylistTrack {
    /// When the entry was added. Missing for very old playlists.
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,

    /// Who added the entry.
    #[serde(default)]
    pub added_by: Option<User>,

    /// Whether the entry is a local file.
    #[serde(default)]
    pub is_local: bool,

    /// The track itself. Null when it was removed from the catalog.
    #[serde(default)]
    pub track: Option<Track>,
}

/// A saved library entry, as returned by the saved tracks/albums endpoints.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Saved<T> {
    /// When the item was saved.
    pub added_at: DateTime<Utc>,

    /// The saved item, under the `track`, `album` or `show` key.
    #[serde(alias = "track", alias = "album", alias = "show")]
    pub item: T,
}

/// One entry of the recently played history.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct PlayHistory {
    /// The track that was played.
    pub track: Track,

    /// When playback started.
    pub played_at: DateTime<Utc>,

    /// Context the track was played from.
    #[serde(default)]
    pub context: Option<Context>,
}

/// Audio features computed for a track.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AudioFeatures {
    /// Track ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    #[serde(default)]
    pub danceability: f32,

    #[serde(default)]
    pub energy: f32,

    /// Pitch class, -1 when no key was detected.
    #[serde(default)]
    pub key: i32,

    /// Overall loudness in decibels.
    #[serde(default)]
    pub loudness: f32,

    /// 1 for major, 0 for minor.
    #[serde(default)]
    pub mode: i32,

    #[serde(default)]
    pub speechiness: f32,

    #[serde(default)]
    pub acousticness: f32,

    #[serde(default)]
    pub instrumentalness: f32,

    #[serde(default)]
    pub liveness: f32,

    #[serde(default)]
    pub valence: f32,

    /// Estimated tempo in BPM.
    #[serde(default)]
    pub tempo: f32,

    #[serde(default)]
    pub duration_ms: u64,

    #[serde(default)]
    pub time_signature: u32,
}
