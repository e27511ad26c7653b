//! Identifier normalization.
//!
//! Every method that takes an id accepts a bare id, a `spotify:<kind>:<id>`
//! URI or an `https://open.spotify.com/<kind>/<id>` link.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::{Result, SpotifyError};

/// Kind of remote resource, as used in URIs and the `type` field.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResourceKind {
    Album,
    Artist,
    Track,
    Playlist,
    User,
    Show,
    Episode,
}

impl ResourceKind {
    /// Lowercase name used in URIs and search type lists.
    pub fn as_str(&self) -> &'static str {
        match self {
            ResourceKind::Album => "album",
            ResourceKind::Artist => "artist",
            ResourceKind::Track => "track",
            ResourceKind::Playlist => "playlist",
            ResourceKind::User => "user",
            ResourceKind::Show => "show",
            ResourceKind::Episode => "episode",
        }
    }
}

impl fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ResourceKind {
    type Err = SpotifyError;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "album" => Ok(ResourceKind::Album),
            "artist" => Ok(ResourceKind::Artist),
            "track" => Ok(ResourceKind::Track),
            "playlist" => Ok(ResourceKind::Playlist),
            "user" => Ok(ResourceKind::User),
            "show" => Ok(ResourceKind::Show),
            "episode" => Ok(ResourceKind::Episode),
            other => Err(SpotifyError::InvalidArgument(format!(
                "unknown resource kind: {}",
                other
            ))),
        }
    }
}

/// Extract the bare id of a `kind` resource from an id, URI or link.
///
/// A URI or link naming another kind is rejected.
pub fn to_id(kind: ResourceKind, input: &str) -> Result<String> {
    let input = input.trim();
    if input.is_empty() {
        return Err(SpotifyError::InvalidArgument(format!("{} id must not be empty", kind)));
    }

    let (found, id) = if input.starts_with("spotify:") {
        // spotify:<kind>:<id>, or the legacy spotify:user:<user>:playlist:<id>
        let parts: Vec<&str> = input.split(':').collect();
        match parts.as_slice() {
            [_, .., found, id] => (Some(found.to_string()), id.to_string()),
            _ => return Err(SpotifyError::InvalidArgument(format!("bad URI {}", input))),
        }
    } else if input.starts_with("http://") || input.starts_with("https://") {
        let url = url::Url::parse(input)
            .map_err(|e| SpotifyError::InvalidArgument(format!("bad link {}: {}", input, e)))?;
        let segments: Vec<&str> = url
            .path_segments()
            .map(|segments| segments.filter(|s| !s.is_empty()).collect())
            .unwrap_or_default();
        match segments.as_slice() {
            [.., found, id] => (Some(found.to_string()), id.to_string()),
            [id] => (None, id.to_string()),
            [] => (None, String::new()),
        }
    } else {
        (None, input.to_string())
    };

    if let Some(found) = found {
        if found != kind.as_str() {
            return Err(SpotifyError::InvalidArgument(format!(
                "{} does not name a {}",
                input, kind
            )));
        }
    }
    if id.is_empty() {
        return Err(SpotifyError::InvalidArgument(format!("no id in {}", input)));
    }
    Ok(id)
}

/// Build a `spotify:<kind>:<id>` URI from any accepted id form.
pub fn to_uri(kind: ResourceKind, input: &str) -> Result<String> {
    Ok(format!("spotify:{}:{}", kind, to_id(kind, input)?))
}

/// Normalize a list of ids, failing on the first invalid one.
pub fn to_ids<S: AsRef<str>>(kind: ResourceKind, inputs: &[S]) -> Result<Vec<String>> {
    inputs.iter().map(|s| to_id(kind, s.as_ref())).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_to_id_forms() {
        let track = ResourceKind::Track;
        assert_eq!(to_id(track, "4uLU6hMCjMI75M1A2tKUQC").unwrap(), "4uLU6hMCjMI75M1A2tKUQC");
        assert_eq!(
            to_id(track, "spotify:track:4uLU6hMCjMI75M1A2tKUQC").unwrap(),
            "4uLU6hMCjMI75M1A2tKUQC"
        );
        assert_eq!(
            to_id(ResourceKind::Album, "https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3?si=abc").unwrap(),
            "1DFixLWuPkv3KT3TnV35m3"
        );
        assert_eq!(
            to_id(ResourceKind::Track, "https://open.spotify.com/intl-de/track/abc").unwrap(),
            "abc"
        );
        assert_eq!(
            to_id(ResourceKind::Playlist, "spotify:user:bob:playlist:37i9dQ").unwrap(),
            "37i9dQ"
        );
    }

    #[test]
    fn test_to_id_rejects_empty() {
        assert!(matches!(to_id(ResourceKind::Track, "  "), Err(SpotifyError::InvalidArgument(_))));
        assert!(to_id(ResourceKind::Track, "spotify:track:").is_err());
        assert!(to_id(ResourceKind::Track, "spotify:abc").is_err());
    }

    #[test]
    fn test_to_id_rejects_other_kind() {
        let err = to_id(ResourceKind::Album, "spotify:track:4uLU6hMCjMI75M1A2tKUQC").unwrap_err();
        assert!(matches!(err, SpotifyError::InvalidArgument(_)));
        assert!(to_id(ResourceKind::User, "spotify:playlist:37i9dQ").is_err());
        assert!(to_id(ResourceKind::Artist, "https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3").is_err());
        assert!(to_ids(ResourceKind::Track, &["abc", "spotify:episode:def"]).is_err());
    }

    #[test]
    fn test_to_uri() {
        assert_eq!(to_uri(ResourceKind::Track, "abc").unwrap(), "spotify:track:abc");
        assert_eq!(to_uri(ResourceKind::Track, "spotify:track:abc").unwrap(), "spotify:track:abc");
        assert!(to_uri(ResourceKind::Track, "spotify:album:abc").is_err());
        assert_eq!(to_uri(ResourceKind::Episode, "e1").unwrap(), "spotify:episode:e1");
    }

    #[test]
    fn test_resource_kind_parse() {
        assert_eq!("playlist".parse::<ResourceKind>().unwrap(), ResourceKind::Playlist);
        assert_eq!("show".parse::<ResourceKind>().unwrap(), ResourceKind::Show);
        assert!("podcast".parse::<ResourceKind>().is_err());
    }
}
