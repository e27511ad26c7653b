//! Album-related models.

use serde::{Deserialize, Serialize};

use super::artist::Artist;
use super::common::{impl_resource, largest_image, null_as_default, Copyright, ExternalUrls, Image, Paging};
use super::track::Track;
use crate::api::Paginator;
use crate::error::Result;
use crate::ids::ResourceKind;
use crate::Spotify;

/// An album record.
///
/// Simplified album payloads (nested in tracks, artist albums, search
/// results) omit `tracks`, `genres`, `label` and `popularity`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Album {
    /// Spotify ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "album".
    #[serde(rename = "type", default = "default_album_type")]
    pub type_: String,

    /// Spotify URI.
    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    /// Album name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// "album", "single" or "compilation".
    #[serde(default, deserialize_with = "null_as_default")]
    pub album_type: String,

    /// Relation to the artist when listed under an artist ("appears_on", ...).
    #[serde(default)]
    pub album_group: Option<String>,

    /// Release date with the precision given by `release_date_precision`.
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,

    /// "year", "month" or "day".
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date_precision: String,

    /// Total number of tracks.
    #[serde(default)]
    pub total_tracks: u32,

    /// Album artists.
    #[serde(default, deserialize_with = "null_as_default")]
    pub artists: Vec<Artist>,

    /// Cover art in various sizes, widest first.
    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,

    /// Record label.
    #[serde(default)]
    pub label: Option<String>,

    #[serde(default)]
    pub popularity: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub copyrights: Vec<Copyright>,

    /// First page of tracks, only in full album payloads.
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_album_type() -> String {
    "album".to_string()
}

impl_resource!(Album => ResourceKind::Album);

impl Album {
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

    /// Release year, if the date carries one.
    pub fn release_year(&self) -> Option<i32> {
        self.release_date.split('-').next().and_then(|y| y.parse().ok())
    }

    /// Get the largest cover image available.
    pub fn largest_image(&self) -> Option<&Image> {
        largest_image(&self.images)
    }

    /// Lazily page through this album's tracks. Every call re-fetches.
    pub fn tracks(&self, client: &Spotify) -> Result<Paginator<Track>> {
        client.album_tracks(&self.id, None)
    }

    /// Fetch every track of this album, ordered by disc and track number.
    pub async fn all_tracks(&self, client: &Spotify) -> Result<Vec<Track>> {
        let mut tracks = self.tracks(client)?.collect_all().await?;
        tracks.sort_by_key(|t| (t.disc_number, t.track_number));
        Ok(tracks)
    }
}

/// Filter for an artist's albums.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AlbumGroup {
    Album,
    Single,
    AppearsOn,
    Compilation,
}

impl AlbumGroup {
    /// Value used in the `include_groups` parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            AlbumGroup::Album => "album",
            AlbumGroup::Single => "single",
            AlbumGroup::AppearsOn => "appears_on",
            AlbumGroup::Compilation => "compilation",
        }
    }
}
