//! Artist model.

use serde::{Deserialize, Serialize};

use super::album::{Album, AlbumGroup};
use super::common::{impl_resource, largest_image, null_as_default, ExternalUrls, Followers, Image};
use super::track::Track;
use crate::api::Paginator;
use crate::error::Result;
use crate::ids::ResourceKind;
use crate::Spotify;

/// An artist record.
///
/// Simplified artist payloads (nested in tracks and albums) only carry
/// `id`, `name`, `uri` and links.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Artist {
    /// Spotify ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "artist".
    #[serde(rename = "type", default = "default_artist_type")]
    pub type_: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    /// Artist name.
    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub genres: Vec<String>,

    /// Popularity between 0 and 100.
    #[serde(default)]
    pub popularity: Option<u32>,

    #[serde(default)]
    pub followers: Option<Followers>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_artist_type() -> String {
    "artist".to_string()
}

impl_resource!(Artist => ResourceKind::Artist);

impl Artist {
    /// Create a simplified artist with name and ID.
    pub fn new<S1: Into<String>, S2: Into<String>>(name: S1, id: S2) -> Self {
        let id = id.into();
        Self {
            uri: format!("spotify:artist:{}", id),
            id,
            type_: default_artist_type(),
            name: name.into(),
            ..Default::default()
        }
    }

    /// Get the largest picture available.
    pub fn largest_image(&self) -> Option<&Image> {
        largest_image(&self.images)
    }

    /// Lazily page through this artist's albums, optionally filtered by group.
    pub fn albums(&self, client: &Spotify, groups: &[AlbumGroup]) -> Result<Paginator<Album>> {
        client.artist_albums(&self.id, groups)
    }

    /// Fetch every album of this artist.
    pub async fn all_albums(&self, client: &Spotify, groups: &[AlbumGroup]) -> Result<Vec<Album>> {
        self.albums(client, groups)?.collect_all().await
    }

    /// Top tracks of this artist in a market.
    pub async fn top_tracks(&self, client: &Spotify, country: &str) -> Result<Vec<Track>> {
        client.artist_top_tracks(&self.id, country).await
    }

    /// Artists similar to this one.
    pub async fn related_artists(&self, client: &Spotify) -> Result<Vec<Artist>> {
        client.artist_related_artists(&self.id).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_parse_full_artist() {
        let artist: Artist = serde_json::from_str(
            r#"{
                "id": "0OdUWJ0sBjDrqHygGUXeCF",
                "type": "artist",
                "uri": "spotify:artist:0OdUWJ0sBjDrqHygGUXeCF",
                "name": "Band of Horses",
                "genres": ["indie folk", "indie pop"],
                "popularity": 59,
                "followers": {"href": null, "total": 1117890},
                "images": [{"url": "https://i.scdn.co/image/x", "height": 320, "width": 320}]
            }"#,
        )
        .unwrap();
        assert_eq!(artist.followers.as_ref().map(|f| f.total), Some(1117890));
        assert_eq!(artist.genres.len(), 2);
    }

    #[test]
    fn test_artist_identity_in_sets() {
        let mut set = HashSet::new();
        set.insert(Artist::new("A", "1"));
        set.insert(Artist::new("A (renamed)", "1"));
        set.insert(Artist::new("B", "2"));
        assert_eq!(set.len(), 2);
    }
}
