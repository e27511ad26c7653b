//! Podcast models: shows and their episodes.

use serde::{Deserialize, Serialize};

use super::common::{impl_resource, largest_image, null_as_default, Copyright, ExternalUrls, Image, Paging};
use crate::api::Paginator;
use crate::error::Result;
use crate::ids::ResourceKind;
use crate::Spotify;

/// A podcast show.
///
/// Simplified show payloads (nested in episodes, saved shows) carry no
/// `episodes` page.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Show {
    /// Spotify ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "show".
    #[serde(rename = "type", default = "default_show_type")]
    pub type_: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub publisher: String,

    /// ISO 639 codes of the languages used in the show.
    #[serde(default, deserialize_with = "null_as_default")]
    pub languages: Vec<String>,

    /// "audio", "video" or "mixed".
    #[serde(default, deserialize_with = "null_as_default")]
    pub media_type: String,

    #[serde(default)]
    pub explicit: bool,

    /// Whether episodes are hosted outside Spotify's CDN.
    #[serde(default)]
    pub is_externally_hosted: Option<bool>,

    #[serde(default)]
    pub total_episodes: Option<u32>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub copyrights: Vec<Copyright>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub available_markets: Vec<String>,

    /// First page of episodes, only in full show payloads.
    #[serde(default)]
    pub episodes: Option<Paging<Episode>>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_show_type() -> String {
    "show".to_string()
}

impl_resource!(Show => ResourceKind::Show);

impl Show {
    /// Get the largest cover image available.
    pub fn largest_image(&self) -> Option<&Image> {
        largest_image(&self.images)
    }

    /// Lazily page through this show's episodes, newest first.
    pub fn episodes(&self, client: &Spotify) -> Result<Paginator<Episode>> {
        client.show_episodes(&self.id, None)
    }

    /// Fetch every episode of this show.
    pub async fn all_episodes(&self, client: &Spotify) -> Result<Vec<Episode>> {
        self.episodes(client)?.collect_all().await
    }
}

/// A podcast episode.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Episode {
    /// Spotify ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "episode".
    #[serde(rename = "type", default = "default_episode_type")]
    pub type_: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub description: String,

    #[serde(default)]
    pub duration_ms: u64,

    #[serde(default)]
    pub explicit: bool,

    /// 30 second preview, if available.
    #[serde(default)]
    pub audio_preview_url: Option<String>,

    #[serde(default)]
    pub language: Option<String>,

    #[serde(default)]
    pub is_externally_hosted: Option<bool>,

    #[serde(default)]
    pub is_playable: Option<bool>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date: String,

    /// "year", "month" or "day".
    #[serde(default, deserialize_with = "null_as_default")]
    pub release_date_precision: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    /// The show this episode belongs to. Absent when listed under its show.
    #[serde(default)]
    pub show: Option<Show>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_episode_type() -> String {
    "episode".to_string()
}

impl_resource!(Episode => ResourceKind::Episode);

impl Episode {
    /// Largest image of the episode, or of its show when it has none.
    pub fn largest_image(&self) -> Option<&Image> {
        largest_image(&self.images).or_else(|| self.show.as_ref().and_then(Show::largest_image))
    }

    /// Get duration formatted as MM:SS.
    pub fn duration_formatted(&self) -> String {
        let total_seconds = self.duration_ms / 1000;
        format!("{:02}:{:02}", total_seconds / 60, total_seconds % 60)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::Resource;

    #[test]
    fn test_parse_episode_with_show() {
        let episode: Episode = serde_json::from_str(
            r#"{
                "id": "512ojhOuo1ktJprKbVcKyQ",
                "type": "episode",
                "name": "Tredje rikets knarkande granskas",
                "description": "Historikern Magdalena Gram",
                "duration_ms": 1502795,
                "explicit": false,
                "language": "sv",
                "release_date": "2015-10-01",
                "release_date_precision": "day",
                "images": [],
                "show": {
                    "id": "38bS44xjbVVZ3No3ByF1dJ",
                    "type": "show",
                    "name": "Vetenskapsradion Historia",
                    "publisher": "Sveriges Radio",
                    "media_type": "audio",
                    "images": [{"url": "https://i.scdn.co/image/s", "height": 640, "width": 640}]
                }
            }"#,
        )
        .unwrap();
        assert_eq!(episode.duration_formatted(), "25:02");
        assert_eq!(episode.uri(), "spotify:episode:512ojhOuo1ktJprKbVcKyQ");
        assert_eq!(
            episode.largest_image().map(|i| i.url.as_str()),
            Some("https://i.scdn.co/image/s")
        );
        assert_eq!(episode.show.as_ref().map(|s| s.publisher.as_str()), Some("Sveriges Radio"));
    }

    #[test]
    fn test_parse_full_show() {
        let show: Show = serde_json::from_str(
            r#"{
                "id": "38bS44xjbVVZ3No3ByF1dJ",
                "name": "Vetenskapsradion Historia",
                "description": null,
                "languages": ["sv"],
                "total_episodes": 500,
                "episodes": {
                    "items": [{"id": "e1", "name": "One"}, null],
                    "total": 500,
                    "next": "https://api.spotify.com/v1/shows/38bS44xjbVVZ3No3ByF1dJ/episodes?offset=50&limit=50"
                }
            }"#,
        )
        .unwrap();
        assert_eq!(show.type_, "show");
        assert!(show.description.is_empty());
        let episodes = show.episodes.as_ref().unwrap();
        assert_eq!(episodes.items.len(), 1);
        assert!(episodes.has_more());
    }
}
