//! Playlist model.

use serde::{Deserialize, Serialize};

use super::common::{impl_resource, largest_image, null_as_default, ExternalUrls, Followers, Image, Paging};
use super::track::PlaylistTrack;
use super::user::User;
use crate::api::Paginator;
use crate::error::Result;
use crate::ids::ResourceKind;
use crate::Spotify;

/// A playlist record.
///
/// Full playlist payloads embed the first page of entries in `tracks`;
/// simplified ones (lists, search results) only carry its `total`.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Playlist {
    /// Spotify ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "playlist".
    #[serde(rename = "type", default = "default_playlist_type")]
    pub type_: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    /// Only set for modified, verified playlists.
    #[serde(default)]
    pub description: Option<String>,

    /// Whether other users may modify the playlist.
    #[serde(default)]
    pub collaborative: bool,

    /// Public status. `None` when not relevant.
    #[serde(default)]
    pub public: Option<bool>,

    /// Owner of the playlist.
    #[serde(default)]
    pub owner: User,

    /// Version identifier, changes on every modification.
    #[serde(default, deserialize_with = "null_as_default")]
    pub snapshot_id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    #[serde(default)]
    pub followers: Option<Followers>,

    /// Entries of the playlist, possibly only the first page.
    #[serde(default)]
    pub tracks: Paging<PlaylistTrack>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_playlist_type() -> String {
    "playlist".to_string()
}

impl_resource!(Playlist => ResourceKind::Playlist);

impl Playlist {
    /// Number of entries in the playlist.
    pub fn total_tracks(&self) -> u32 {
        self.tracks.total
    }

    /// Get the largest cover image available.
    pub fn largest_image(&self) -> Option<&Image> {
        largest_image(&self.images)
    }

    /// Lazily page through this playlist's entries. Every call re-fetches.
    pub fn tracks(&self, client: &Spotify) -> Result<Paginator<PlaylistTrack>> {
        client.playlist_tracks(&self.id, None)
    }

    /// Fetch every entry of this playlist, in playlist order.
    pub async fn all_tracks(&self, client: &Spotify) -> Result<Vec<PlaylistTrack>> {
        self.tracks(client)?.collect_all().await
    }
}
