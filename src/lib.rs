//! # Rustify
//!
//! An asynchronous client for the Spotify Web API.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rustify::{ClientConfig, Spotify};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     // App-only access with the client-credentials grant
//!     let spotify = Spotify::new(ClientConfig::from_env()?)?;
//!
//!     let album = spotify.album("https://open.spotify.com/album/1DFixLWuPkv3KT3TnV35m3", None).await?;
//!     println!("{} ({} tracks)", album.name, album.total_tracks);
//!
//!     // Paged collections are walked lazily
//!     let mut tracks = album.tracks(&spotify)?;
//!     while let Some(track) = tracks.next().await? {
//!         println!("{:>2}. {}", track.track_number, track.name);
//!     }
//!
//!     Ok(())
//! }
//! ```
//!
//! ## Acting for a user
//!
//! Send the user to [`Spotify::oauth`]'s URL, then trade the returned code
//! with [`Spotify::exchange_code`]. The resulting [`Token`] serializes to
//! JSON and can be passed to [`Spotify::with_token`] on the next run.
//!
//! ## Behavior
//!
//! - Tokens are renewed 60 seconds before they expire; concurrent requests
//!   share a single renewal.
//! - A 429 is retried once after `Retry-After`; a 401 renews the token and
//!   retries once.
//! - Bulk operations are split to the API's per-request maximum. A failure
//!   partway through reports how many items were applied
//!   ([`SpotifyError::PartialBatch`]).

pub mod api;
pub mod auth;
mod client;
pub mod config;
pub mod error;
pub mod ids;
pub mod models;

// Main interface
pub use client::{PlayOptions, PlaylistDetails, RecommendationQuery, Spotify, TimeRange};

pub use api::Paginator;
pub use auth::{OAuth2, Token};
pub use config::ClientConfig;
pub use error::{Result, SpotifyError};
pub use ids::ResourceKind;
pub use models::{
    Album, Artist, AudioAnalysis, Category, Device, Episode, Player, Playlist, PlaylistTrack, Recommendations,
    SearchResults, Show, Track, User,
};
