//! Playback state models.

use std::time::Duration;

use serde::{Deserialize, Serialize};

use super::common::Context;
use super::track::Track;

/// Repeat mode of the player.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RepeatState {
    #[default]
    Off,
    /// Repeat the current track.
    Track,
    /// Repeat the current context.
    Context,
}

impl RepeatState {
    /// Value used in the `state` query parameter.
    pub fn as_str(&self) -> &'static str {
        match self {
            RepeatState::Off => "off",
            RepeatState::Track => "track",
            RepeatState::Context => "context",
        }
    }
}

/// A device that can play music.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Device {
    /// Device ID. May be null for restricted devices.
    #[serde(default)]
    pub id: Option<String>,

    /// Whether this is the currently active device.
    #[serde(default)]
    pub is_active: bool,

    #[serde(default)]
    pub is_private_session: bool,

    /// Restricted devices accept no Web API commands.
    #[serde(default)]
    pub is_restricted: bool,

    /// Human-readable name.
    pub name: String,

    /// Device type: "Computer", "Smartphone", "Speaker", ...
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Current volume in percent.
    #[serde(default)]
    pub volume_percent: Option<u32>,
}

/// The list returned by the devices endpoint.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub(crate) struct Devices {
    #[serde(default)]
    pub devices: Vec<Device>,
}

/// Playback state of the user's player.
///
/// Returned both for the full player state and for "currently playing";
/// the latter carries no `device`, `repeat_state` or `shuffle_state`.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Player {
    /// Device currently playing.
    #[serde(default)]
    pub device: Option<Device>,

    #[serde(default)]
    pub repeat_state: RepeatState,

    #[serde(default)]
    pub shuffle_state: bool,

    /// Context the item is played from.
    #[serde(default)]
    pub context: Option<Context>,

    /// Unix timestamp in milliseconds of when the data was fetched.
    #[serde(default)]
    pub timestamp: i64,

    /// Progress into the current item.
    #[serde(default)]
    pub progress_ms: Option<u64>,

    #[serde(default)]
    pub is_playing: bool,

    /// Currently playing track. None for ads and unknown items.
    #[serde(default)]
    pub item: Option<Track>,

    /// "track", "episode", "ad" or "unknown".
    #[serde(default)]
    pub currently_playing_type: String,
}

impl Player {
    /// Progress into the current item.
    pub fn progress(&self) -> Option<Duration> {
        self.progress_ms.map(Duration::from_millis)
    }

    /// ID of the active device, if any.
    pub fn device_id(&self) -> Option<&str> {
        self.device.as_ref().and_then(|d| d.id.as_deref())
    }
}
