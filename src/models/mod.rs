//! Data models for Spotify Web API responses.
//!
//! Every model is a plain snapshot of one JSON payload, deserialized with a
//! fixed schema. Unknown fields are ignored. Models never cache related
//! data; relation helpers such as [`Album::tracks`] take the client and
//! fetch on every call.

pub mod album;
pub mod analysis;
pub mod artist;
pub mod browse;
pub mod common;
pub mod player;
pub mod playlist;
pub mod podcast;
pub mod search;
pub mod track;
pub mod user;

// Re-exports for convenience
pub use album::{Album, AlbumGroup};
pub use analysis::{AnalysisSummary, AudioAnalysis, Section, Segment, TimeInterval};
pub use artist::Artist;
pub use browse::{Category, RecommendationSeed, Recommendations};
pub use common::{Context, Copyright, ExternalUrls, Followers, Image, Paging, Resource};
pub use player::{Device, Player, RepeatState};
pub use playlist::Playlist;
pub use podcast::{Episode, Show};
pub use search::{SearchResults, SEARCH_TYPES};
pub use track::{AudioFeatures, PlayHistory, PlaylistTrack, Saved, Track};
pub use user::User;
