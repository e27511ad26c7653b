//! Playlist endpoints.

use base64::engine::general_purpose::STANDARD;
use base64::Engine;
use serde::Serialize;
use serde_json::{json, Value};
use tracing::{debug, warn};

use super::{list_from, Spotify};
use crate::api::{Paginator, Request};
use crate::error::{Result, SpotifyError};
use crate::ids::{to_id, to_uri, ResourceKind};
use crate::models::{Image, Playlist, PlaylistTrack};

const MAX_PLAYLIST_ITEMS: usize = 100;
const PAGE_SIZE: u32 = 100;
/// Largest accepted cover, after base64 encoding.
const MAX_COVER_BYTES: usize = 256 * 1024;

/// Editable playlist attributes. `None` fields are left unchanged.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct PlaylistDetails {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub public: Option<bool>,
    /// Collaborative playlists must also be private.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub collaborative: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,
}

impl PlaylistDetails {
    pub fn named<S: Into<String>>(name: S) -> Self {
        Self {
            name: Some(name.into()),
            ..Self::default()
        }
    }

    pub fn public(mut self, public: bool) -> Self {
        self.public = Some(public);
        self
    }

    pub fn collaborative(mut self, collaborative: bool) -> Self {
        self.collaborative = Some(collaborative);
        self
    }

    pub fn description<S: Into<String>>(mut self, description: S) -> Self {
        self.description = Some(description.into());
        self
    }

    fn is_empty(&self) -> bool {
        self.name.is_none()
            && self.public.is_none()
            && self.collaborative.is_none()
            && self.description.is_none()
    }

    fn to_json(&self) -> Result<Value> {
        if self.collaborative == Some(true) && self.public == Some(true) {
            return Err(SpotifyError::InvalidArgument(
                "a collaborative playlist cannot be public".to_string(),
            ));
        }
        Ok(serde_json::to_value(self)?)
    }
}

impl Spotify {
    /// Get a playlist. `market` applies track relinking.
    pub async fn playlist(&self, playlist: &str, market: Option<&str>) -> Result<Playlist> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        self.get_json(Request::get(format!("playlists/{}", id)).query_opt("market", market))
            .await
    }

    /// Entries of a playlist in playlist order.
    pub fn playlist_tracks(&self, playlist: &str, market: Option<&str>) -> Result<Paginator<PlaylistTrack>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let request = Request::get(format!("playlists/{}/tracks", id)).query_opt("market", market);
        Ok(self.paginate(request, PAGE_SIZE, None))
    }

    /// Current cover images of a playlist. Empty when it has none.
    pub async fn playlist_cover(&self, playlist: &str) -> Result<Vec<Image>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let body = self.send(Request::get(format!("playlists/{}/images", id))).await?;
        list_from(body, None)
    }

    /// Replace the cover image with a JPEG.
    ///
    /// The image is sent base64 encoded and must stay under 256 KB once
    /// encoded.
    pub async fn upload_playlist_cover(&self, playlist: &str, jpeg: &[u8]) -> Result<()> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        if jpeg.is_empty() {
            return Err(SpotifyError::InvalidArgument("cover image is empty".to_string()));
        }
        let encoded = STANDARD.encode(jpeg);
        if encoded.len() > MAX_COVER_BYTES {
            return Err(SpotifyError::InvalidArgument(format!(
                "cover image is {} bytes encoded, the limit is {}",
                encoded.len(),
                MAX_COVER_BYTES
            )));
        }
        debug!("Uploading {} byte cover for playlist {}", encoded.len(), id);
        let request = Request::put(format!("playlists/{}/images", id)).raw("image/jpeg", encoded);
        self.send(request).await.map(|_| ())
    }

    /// Create an empty playlist owned by `user`.
    pub async fn create_playlist(&self, user: &str, details: &PlaylistDetails) -> Result<Playlist> {
        let id = to_id(ResourceKind::User, user)?;
        if details.name.as_deref().map_or(true, |n| n.trim().is_empty()) {
            return Err(SpotifyError::InvalidArgument("playlist name is required".to_string()));
        }
        let request = Request::post(format!("users/{}/playlists", id)).json(details.to_json()?);
        self.get_json(request).await
    }

    pub async fn change_playlist_details(&self, playlist: &str, details: &PlaylistDetails) -> Result<()> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        if details.is_empty() {
            return Err(SpotifyError::InvalidArgument("no playlist details to change".to_string()));
        }
        let request = Request::put(format!("playlists/{}", id)).json(details.to_json()?);
        self.send(request).await.map(|_| ())
    }

    /// Add tracks, 100 per request, and return the last snapshot id.
    ///
    /// All snapshot-returning edits yield `None` when the API applied the
    /// change but sent no snapshot id.
    ///
    /// With a `position`, each chunk is inserted right after the previous
    /// one so the tracks keep their order.
    pub async fn add_tracks<S: AsRef<str>>(
        &self,
        playlist: &str,
        tracks: &[S],
        position: Option<usize>,
    ) -> Result<Option<String>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let uris = track_uris(tracks)?;
        if uris.is_empty() {
            return Err(SpotifyError::InvalidArgument("no tracks to add".to_string()));
        }

        let path = format!("playlists/{}/tracks", id);
        let chunks = uris
            .chunks(MAX_PLAYLIST_ITEMS)
            .enumerate()
            .map(|(i, chunk)| {
                let mut body = json!({ "uris": chunk });
                if let Some(position) = position {
                    body["position"] = json!(position + i * MAX_PLAYLIST_ITEMS);
                }
                (Request::post(path.as_str()).json(body), chunk.len())
            })
            .collect();
        Ok(last_snapshot(self.send_chunked(chunks).await?))
    }

    /// Remove every occurrence of the given tracks, 100 per request.
    pub async fn remove_tracks<S: AsRef<str>>(
        &self,
        playlist: &str,
        tracks: &[S],
        snapshot_id: Option<&str>,
    ) -> Result<Option<String>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let uris = track_uris(tracks)?;
        if uris.is_empty() {
            return Err(SpotifyError::InvalidArgument("no tracks to remove".to_string()));
        }

        let path = format!("playlists/{}/tracks", id);
        let chunks = uris
            .chunks(MAX_PLAYLIST_ITEMS)
            .map(|chunk| {
                let entries: Vec<Value> = chunk.iter().map(|uri| json!({ "uri": uri })).collect();
                let mut body = json!({ "tracks": entries });
                if let Some(snapshot_id) = snapshot_id {
                    body["snapshot_id"] = json!(snapshot_id);
                }
                (Request::delete(path.as_str()).json(body), chunk.len())
            })
            .collect();
        Ok(last_snapshot(self.send_chunked(chunks).await?))
    }

    /// Overwrite the playlist with `tracks`. An empty slice clears it.
    ///
    /// The first 100 tracks replace the contents, the rest are appended.
    pub async fn replace_tracks<S: AsRef<str>>(&self, playlist: &str, tracks: &[S]) -> Result<Option<String>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let uris = track_uris(tracks)?;
        let path = format!("playlists/{}/tracks", id);

        let mut chunks = uris.chunks(MAX_PLAYLIST_ITEMS);
        let head = chunks.next().unwrap_or_default();
        let mut requests = vec![(Request::put(path.as_str()).json(json!({ "uris": head })), head.len())];
        requests.extend(
            chunks.map(|chunk| (Request::post(path.as_str()).json(json!({ "uris": chunk })), chunk.len())),
        );
        Ok(last_snapshot(self.send_chunked(requests).await?))
    }

    /// Remove every track from the playlist.
    pub async fn clear_playlist(&self, playlist: &str) -> Result<Option<String>> {
        self.replace_tracks::<&str>(playlist, &[]).await
    }

    /// Move `range_length` tracks starting at `range_start` before `insert_before`.
    pub async fn reorder_tracks(
        &self,
        playlist: &str,
        range_start: usize,
        range_length: usize,
        insert_before: usize,
        snapshot_id: Option<&str>,
    ) -> Result<Option<String>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        if range_length == 0 {
            return Err(SpotifyError::InvalidArgument("range_length must be at least 1".to_string()));
        }
        let mut body = json!({
            "range_start": range_start,
            "range_length": range_length,
            "insert_before": insert_before,
        });
        if let Some(snapshot_id) = snapshot_id {
            body["snapshot_id"] = json!(snapshot_id);
        }
        let response = self
            .send(Request::put(format!("playlists/{}/tracks", id)).json(body))
            .await?;
        Ok(last_snapshot(vec![response]))
    }
}

fn track_uris<S: AsRef<str>>(tracks: &[S]) -> Result<Vec<String>> {
    tracks
        .iter()
        .map(|t| to_uri(ResourceKind::Track, t.as_ref()))
        .collect()
}

fn last_snapshot(bodies: Vec<Value>) -> Option<String> {
    let snapshot = bodies
        .last()
        .and_then(|body| body.get("snapshot_id"))
        .and_then(Value::as_str)
        .map(str::to_string);
    if snapshot.is_none() {
        warn!("Playlist change applied but no snapshot_id was returned");
    }
    snapshot
}
