//! User profiles, listening history and follow endpoints.

use reqwest::Method;
use serde_json::json;

use super::{join_ids, require_ids, Spotify};
use crate::api::{Paginator, Request};
use crate::error::{Result, SpotifyError};
use crate::ids::{to_id, to_ids, ResourceKind};
use crate::models::{Artist, PlayHistory, Playlist, Track, User};

const MAX_FOLLOW: usize = 50;
const MAX_PLAYLIST_FOLLOWERS_CHECK: usize = 5;
const PAGE_SIZE: u32 = 50;

/// Period over which top items are computed.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum TimeRange {
    /// About four weeks.
    ShortTerm,
    /// About six months.
    #[default]
    MediumTerm,
    /// Several years.
    LongTerm,
}

impl TimeRange {
    pub fn as_str(&self) -> &'static str {
        match self {
            TimeRange::ShortTerm => "short_term",
            TimeRange::MediumTerm => "medium_term",
            TimeRange::LongTerm => "long_term",
        }
    }
}

impl Spotify {
    /// Profile of the user the token belongs to.
    pub async fn current_user(&self) -> Result<User> {
        self.get_json(Request::get("me")).await
    }

    /// Public profile of any user.
    pub async fn user(&self, user: &str) -> Result<User> {
        let id = to_id(ResourceKind::User, user)?;
        self.get_json(Request::get(format!("users/{}", id))).await
    }

    /// Playlists owned or followed by the current user.
    pub fn current_user_playlists(&self) -> Paginator<Playlist> {
        self.paginate(Request::get("me/playlists"), PAGE_SIZE, None)
    }

    /// Public playlists of a user.
    pub fn user_playlists(&self, user: &str) -> Result<Paginator<Playlist>> {
        let id = to_id(ResourceKind::User, user)?;
        Ok(self.paginate(Request::get(format!("users/{}/playlists", id)), PAGE_SIZE, None))
    }

    pub fn top_artists(&self, time_range: TimeRange) -> Paginator<Artist> {
        let request = Request::get("me/top/artists").query("time_range", time_range.as_str());
        self.paginate(request, PAGE_SIZE, None)
    }

    pub fn top_tracks(&self, time_range: TimeRange) -> Paginator<Track> {
        let request = Request::get("me/top/tracks").query("time_range", time_range.as_str());
        self.paginate(request, PAGE_SIZE, None)
    }

    /// Recently played tracks, newest first.
    pub fn recently_played(&self) -> Paginator<PlayHistory> {
        self.paginate(Request::get("me/player/recently-played"), PAGE_SIZE, None)
    }

    /// Artists the current user follows.
    pub fn followed_artists(&self) -> Paginator<Artist> {
        let request = Request::get("me/following").query("type", "artist");
        self.paginate(request, PAGE_SIZE, Some("artists"))
    }

    /// Follow artists or users, 50 per request.
    pub async fn follow<S: AsRef<str>>(&self, kind: ResourceKind, ids: &[S]) -> Result<()> {
        let chunks = follow_chunks(kind, ids, Method::PUT)?;
        self.send_chunked(chunks).await.map(|_| ())
    }

    /// Unfollow artists or users, 50 per request.
    pub async fn unfollow<S: AsRef<str>>(&self, kind: ResourceKind, ids: &[S]) -> Result<()> {
        let chunks = follow_chunks(kind, ids, Method::DELETE)?;
        self.send_chunked(chunks).await.map(|_| ())
    }

    /// Whether the current user follows each of the given artists or users.
    pub async fn is_following<S: AsRef<str>>(&self, kind: ResourceKind, ids: &[S]) -> Result<Vec<bool>> {
        let type_ = follow_type(kind)?;
        let ids = to_ids(kind, ids)?;
        self.fetch_chunked(&ids, MAX_FOLLOW, None, |chunk| {
            Request::get("me/following/contains")
                .query("type", type_)
                .query("ids", join_ids(chunk))
        })
        .await
    }

    /// Follow a playlist, publicly listed on the profile when `public`.
    pub async fn follow_playlist(&self, playlist: &str, public: bool) -> Result<()> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let request = Request::put(format!("playlists/{}/followers", id)).json(json!({ "public": public }));
        self.send(request).await.map(|_| ())
    }

    pub async fn unfollow_playlist(&self, playlist: &str) -> Result<()> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        self.send(Request::delete(format!("playlists/{}/followers", id)))
            .await
            .map(|_| ())
    }

    /// Whether each of the given users follows a playlist, 5 users per request.
    pub async fn following_playlist<S: AsRef<str>>(&self, playlist: &str, users: &[S]) -> Result<Vec<bool>> {
        let id = to_id(ResourceKind::Playlist, playlist)?;
        let users = to_ids(ResourceKind::User, users)?;
        let path = format!("playlists/{}/followers/contains", id);
        self.fetch_chunked(&users, MAX_PLAYLIST_FOLLOWERS_CHECK, None, |chunk| {
            Request::get(path.as_str()).query("ids", join_ids(chunk))
        })
        .await
    }
}

fn follow_type(kind: ResourceKind) -> Result<&'static str> {
    match kind {
        ResourceKind::Artist | ResourceKind::User => Ok(kind.as_str()),
        other => Err(SpotifyError::InvalidArgument(format!(
            "only artists and users can be followed, not {}",
            other
        ))),
    }
}

fn follow_chunks<S: AsRef<str>>(
    kind: ResourceKind,
    ids: &[S],
    method: Method,
) -> Result<Vec<(Request, usize)>> {
    let type_ = follow_type(kind)?;
    require_ids(ids)?;
    let ids = to_ids(kind, ids)?;
    Ok(ids
        .chunks(MAX_FOLLOW)
        .map(|chunk| {
            let request = Request::new(method.clone(), "me/following")
                .query("type", type_)
                .json(json!({ "ids": chunk }));
            (request, chunk.len())
        })
        .collect())
}
