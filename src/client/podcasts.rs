//! Podcast shows, episodes and the saved shows of the library.

use reqwest::Method;

use super::library::SAVED_SHOWS;
use super::{join_ids, Spotify};
use crate::api::{Paginator, Request};
use crate::error::Result;
use crate::ids::{to_id, to_ids, ResourceKind};
use crate::models::{Episode, Saved, Show};

const MAX_SHOWS: usize = 50;
const MAX_EPISODES: usize = 50;
const PAGE_SIZE: u32 = 50;

impl Spotify {
    /// Get a show by id, URI or link.
    pub async fn show(&self, show: &str, market: Option<&str>) -> Result<Show> {
        let id = to_id(ResourceKind::Show, show)?;
        self.get_json(Request::get(format!("shows/{}", id)).query_opt("market", market))
            .await
    }

    /// Get several shows, 50 per request. Unknown ids are left out.
    pub async fn shows<S: AsRef<str>>(&self, shows: &[S], market: Option<&str>) -> Result<Vec<Show>> {
        let ids = to_ids(ResourceKind::Show, shows)?;
        self.fetch_chunked(&ids, MAX_SHOWS, Some("shows"), |chunk| {
            Request::get("shows")
                .query("ids", join_ids(chunk))
                .query_opt("market", market)
        })
        .await
    }

    /// Episodes of a show, newest first.
    pub fn show_episodes(&self, show: &str, market: Option<&str>) -> Result<Paginator<Episode>> {
        let id = to_id(ResourceKind::Show, show)?;
        let request = Request::get(format!("shows/{}/episodes", id)).query_opt("market", market);
        Ok(self.paginate(request, PAGE_SIZE, None))
    }

    pub async fn episode(&self, episode: &str, market: Option<&str>) -> Result<Episode> {
        let id = to_id(ResourceKind::Episode, episode)?;
        self.get_json(Request::get(format!("episodes/{}", id)).query_opt("market", market))
            .await
    }

    /// Get several episodes, 50 per request.
    pub async fn episodes<S: AsRef<str>>(
        &self,
        episodes: &[S],
        market: Option<&str>,
    ) -> Result<Vec<Episode>> {
        let ids = to_ids(ResourceKind::Episode, episodes)?;
        self.fetch_chunked(&ids, MAX_EPISODES, Some("episodes"), |chunk| {
            Request::get("episodes")
                .query("ids", join_ids(chunk))
                .query_opt("market", market)
        })
        .await
    }

    /// Shows in the user's library, most recently saved first.
    pub fn saved_shows(&self) -> Paginator<Saved<Show>> {
        self.paginate(Request::get("me/shows"), PAGE_SIZE, None)
    }

    /// Save shows, 50 per request.
    pub async fn save_shows<S: AsRef<str>>(&self, shows: &[S]) -> Result<()> {
        self.change_saved(Method::PUT, SAVED_SHOWS, shows).await
    }

    pub async fn remove_saved_shows<S: AsRef<str>>(&self, shows: &[S]) -> Result<()> {
        self.change_saved(Method::DELETE, SAVED_SHOWS, shows).await
    }

    /// Whether each show is in the library.
    pub async fn contains_saved_shows<S: AsRef<str>>(&self, shows: &[S]) -> Result<Vec<bool>> {
        self.contains_saved(SAVED_SHOWS, shows).await
    }
}
