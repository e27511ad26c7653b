//! Playback state and control. Control endpoints require Spotify Premium.

use std::time::Duration;

use serde_json::{json, Map, Value};

use super::Spotify;
use crate::api::Request;
use crate::error::{Result, SpotifyError};
use crate::ids::{to_uri, ResourceKind};
use crate::models::player::Devices;
use crate::models::{Device, Player, RepeatState};

/// What to start playing.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct PlayOptions {
    /// Album, artist or playlist URI to play.
    pub context_uri: Option<String>,
    /// Track URIs to play. Ignored when `context_uri` is set.
    pub uris: Vec<String>,
    /// Index within the context to start from.
    pub offset: Option<usize>,
    /// Start position within the first track.
    pub position: Option<Duration>,
}

impl PlayOptions {
    pub fn context<S: Into<String>>(uri: S) -> Self {
        Self {
            context_uri: Some(uri.into()),
            ..Self::default()
        }
    }

    /// Play the given tracks; accepts ids, URIs or links.
    pub fn tracks<S: AsRef<str>>(tracks: &[S]) -> Result<Self> {
        let uris = tracks
            .iter()
            .map(|t| to_uri(ResourceKind::Track, t.as_ref()))
            .collect::<Result<Vec<_>>>()?;
        Ok(Self {
            uris,
            ..Self::default()
        })
    }

    pub fn offset(mut self, offset: usize) -> Self {
        self.offset = Some(offset);
        self
    }

    pub fn position(mut self, position: Duration) -> Self {
        self.position = Some(position);
        self
    }

    fn to_json(&self) -> Value {
        let mut body = Map::new();
        if let Some(context_uri) = &self.context_uri {
            body.insert("context_uri".to_string(), json!(context_uri));
        } else if !self.uris.is_empty() {
            body.insert("uris".to_string(), json!(self.uris));
        }
        if let Some(offset) = self.offset {
            body.insert("offset".to_string(), json!({ "position": offset }));
        }
        if let Some(position) = self.position {
            body.insert("position_ms".to_string(), json!(position.as_millis() as u64));
        }
        Value::Object(body)
    }
}

impl Spotify {
    /// Playback state, or `None` when nothing is active.
    pub async fn current_playback(&self) -> Result<Option<Player>> {
        self.optional_player(Request::get("me/player")).await
    }

    /// The item currently playing, or `None` when nothing is.
    pub async fn currently_playing(&self) -> Result<Option<Player>> {
        self.optional_player(Request::get("me/player/currently-playing")).await
    }

    async fn optional_player(&self, request: Request) -> Result<Option<Player>> {
        match self.send(request).await? {
            Value::Object(map) if map.is_empty() => Ok(None),
            body => Ok(Some(serde_json::from_value(body)?)),
        }
    }

    /// Devices available for playback.
    pub async fn devices(&self) -> Result<Vec<Device>> {
        let devices: Devices = self.get_json(Request::get("me/player/devices")).await?;
        Ok(devices.devices)
    }

    /// Start or resume playback. Empty options resume the current context.
    pub async fn play(&self, options: &PlayOptions, device_id: Option<&str>) -> Result<()> {
        let request = Request::put("me/player/play")
            .query_opt("device_id", device_id)
            .json(options.to_json());
        self.send(request).await.map(|_| ())
    }

    pub async fn pause(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(Request::put("me/player/pause"), device_id).await
    }

    /// Skip to the next track.
    pub async fn next_track(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(Request::post("me/player/next"), device_id).await
    }

    /// Skip to the previous track.
    pub async fn previous_track(&self, device_id: Option<&str>) -> Result<()> {
        self.player_command(Request::post("me/player/previous"), device_id).await
    }

    /// Seek to a position in the current track.
    pub async fn seek(&self, position: Duration, device_id: Option<&str>) -> Result<()> {
        let request = Request::put("me/player/seek").query("position_ms", position.as_millis());
        self.player_command(request, device_id).await
    }

    pub async fn set_repeat(&self, state: RepeatState, device_id: Option<&str>) -> Result<()> {
        let request = Request::put("me/player/repeat").query("state", state.as_str());
        self.player_command(request, device_id).await
    }

    /// Set the volume in percent, 0 to 100.
    pub async fn set_volume(&self, volume_percent: u8, device_id: Option<&str>) -> Result<()> {
        if volume_percent > 100 {
            return Err(SpotifyError::InvalidArgument(format!(
                "volume must be between 0 and 100, got {}",
                volume_percent
            )));
        }
        let request = Request::put("me/player/volume").query("volume_percent", volume_percent);
        self.player_command(request, device_id).await
    }

    pub async fn set_shuffle(&self, shuffle: bool, device_id: Option<&str>) -> Result<()> {
        let request = Request::put("me/player/shuffle").query("state", shuffle);
        self.player_command(request, device_id).await
    }

    /// Move playback to another device, starting it when `play` is set.
    pub async fn transfer_playback(&self, device_id: &str, play: bool) -> Result<()> {
        if device_id.trim().is_empty() {
            return Err(SpotifyError::InvalidArgument("device id must not be empty".to_string()));
        }
        let request = Request::put("me/player").json(json!({
            "device_ids": [device_id],
            "play": play,
        }));
        self.send(request).await.map(|_| ())
    }

    async fn player_command(&self, request: Request, device_id: Option<&str>) -> Result<()> {
        self.send(request.query_opt("device_id", device_id))
            .await
            .map(|_| ())
    }
}
