//! The current user's saved tracks and albums, and the collection helpers saved shows share.

use reqwest::Method;

use super::{join_ids, require_ids, Spotify};
use crate::api::{Paginator, Request};
use crate::error::Result;
use crate::ids::{to_ids, ResourceKind};
use crate::models::{Album, Saved, Track};

const PAGE_SIZE: u32 = 50;

/// One saved-item collection of the user's library.
#[derive(Debug, Clone, Copy)]
pub(super) struct Collection {
    path: &'static str,
    kind: ResourceKind,
    /// Most ids accepted per request.
    max: usize,
}

const SAVED_TRACKS: Collection = Collection {
    path: "me/tracks",
    kind: ResourceKind::Track,
    max: 50,
};

const SAVED_ALBUMS: Collection = Collection {
    path: "me/albums",
    kind: ResourceKind::Album,
    max: 20,
};

pub(super) const SAVED_SHOWS: Collection = Collection {
    path: "me/shows",
    kind: ResourceKind::Show,
    max: 50,
};

impl Spotify {
    /// Tracks in the user's library, most recently saved first.
    pub fn saved_tracks(&self) -> Paginator<Saved<Track>> {
        self.paginate(Request::get(SAVED_TRACKS.path), PAGE_SIZE, None)
    }

    /// Albums in the user's library, most recently saved first.
    pub fn saved_albums(&self) -> Paginator<Saved<Album>> {
        self.paginate(Request::get(SAVED_ALBUMS.path), PAGE_SIZE, None)
    }

    /// Save tracks, 50 per request.
    ///
    /// If a later request fails, the error is a
    /// [`PartialBatch`](crate::SpotifyError::PartialBatch) telling how many
    /// tracks were saved.
    pub async fn save_tracks<S: AsRef<str>>(&self, tracks: &[S]) -> Result<()> {
        self.change_saved(Method::PUT, SAVED_TRACKS, tracks).await
    }

    /// Remove tracks, 50 per request.
    pub async fn remove_saved_tracks<S: AsRef<str>>(&self, tracks: &[S]) -> Result<()> {
        self.change_saved(Method::DELETE, SAVED_TRACKS, tracks).await
    }

    /// Whether each track is in the library.
    pub async fn contains_saved_tracks<S: AsRef<str>>(&self, tracks: &[S]) -> Result<Vec<bool>> {
        self.contains_saved(SAVED_TRACKS, tracks).await
    }

    /// Save albums, 20 per request.
    pub async fn save_albums<S: AsRef<str>>(&self, albums: &[S]) -> Result<()> {
        self.change_saved(Method::PUT, SAVED_ALBUMS, albums).await
    }

    /// Remove albums, 20 per request.
    pub async fn remove_saved_albums<S: AsRef<str>>(&self, albums: &[S]) -> Result<()> {
        self.change_saved(Method::DELETE, SAVED_ALBUMS, albums).await
    }

    pub async fn contains_saved_albums<S: AsRef<str>>(&self, albums: &[S]) -> Result<Vec<bool>> {
        self.contains_saved(SAVED_ALBUMS, albums).await
    }

    /// Add (`PUT`) or remove (`DELETE`) items, split to the collection's maximum.
    pub(super) async fn change_saved<S: AsRef<str>>(
        &self,
        method: Method,
        collection: Collection,
        items: &[S],
    ) -> Result<()> {
        require_ids(items)?;
        let ids = to_ids(collection.kind, items)?;
        let chunks = ids
            .chunks(collection.max)
            .map(|chunk| {
                let request = Request::new(method.clone(), collection.path).query("ids", join_ids(chunk));
                (request, chunk.len())
            })
            .collect();
        self.send_chunked(chunks).await.map(|_| ())
    }

    pub(super) async fn contains_saved<S: AsRef<str>>(
        &self,
        collection: Collection,
        items: &[S],
    ) -> Result<Vec<bool>> {
        let ids = to_ids(collection.kind, items)?;
        let path = format!("{}/contains", collection.path);
        self.fetch_chunked(&ids, collection.max, None, |chunk| {
            Request::get(path.as_str()).query("ids", join_ids(chunk))
        })
        .await
    }
}
