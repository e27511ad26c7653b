//! Lazy iteration over paged collections.

use std::collections::VecDeque;
use std::marker::PhantomData;

use futures_util::stream::{self, Stream};
use serde::de::{DeserializeOwned, Error as _};
use serde_json::Value;
use tracing::{debug, warn};
use url::Url;

use super::request::Request;
use super::retry::RetryPolicy;
use crate::error::{Result, SpotifyError};

/// Query parameters that move a request to another page.
const CURSOR_PARAMS: [&str; 3] = ["offset", "after", "before"];

/// Position of the next page.
///
/// Taken from the `next` link of a page, or from `cursors.after` when the
/// link carries no usable parameter. Opaque to callers.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Cursor {
    params: Vec<(String, String)>,
}

impl Cursor {
    fn from_next_url(next: &str) -> Option<Self> {
        let url = Url::parse(next).ok()?;
        let params: Vec<(String, String)> = url
            .query_pairs()
            .filter(|(k, _)| CURSOR_PARAMS.contains(&k.as_ref()))
            .map(|(k, v)| (k.into_owned(), v.into_owned()))
            .collect();
        (!params.is_empty()).then_some(Self { params })
    }

    fn after(value: &str) -> Self {
        Self {
            params: vec![("after".to_string(), value.to_string())],
        }
    }

    /// `template` moved to this cursor's page.
    fn apply(&self, template: &Request) -> Request {
        self.params
            .iter()
            .fold(template.clone(), |request, (k, v)| request.query(k.as_str(), v))
    }
}

/// One page of raw items.
#[derive(Debug, Clone, PartialEq)]
pub struct Page {
    pub items: Vec<Value>,
    pub next_cursor: Option<Cursor>,
    pub total: Option<u64>,
}

impl Page {
    /// Read a paging object, optionally nested under `items_key`
    /// (`{"artists": {"items": [...], ...}}`).
    pub fn from_value(mut value: Value, items_key: Option<&str>) -> Result<Self> {
        let mut container = match items_key {
            Some(key) => value
                .get_mut(key)
                .map(Value::take)
                .ok_or_else(|| serde_json::Error::custom(format!("response has no `{}` field", key)))?,
            None => value,
        };

        let items = match container.get_mut("items").map(Value::take) {
            Some(Value::Array(items)) => items,
            Some(Value::Null) | None => {
                return Err(serde_json::Error::custom("paging object has no `items` array").into())
            }
            Some(_) => return Err(serde_json::Error::custom("`items` is not an array").into()),
        };

        let next_cursor = match container.get("next").and_then(Value::as_str) {
            Some(next) => Cursor::from_next_url(next).or_else(|| {
                let after = container
                    .get("cursors")
                    .and_then(|c| c.get("after"))
                    .and_then(Value::as_str);
                if after.is_none() {
                    warn!("Next page link has no cursor: {}", next);
                }
                after.map(Cursor::after)
            }),
            None => None,
        };

        Ok(Self {
            items,
            next_cursor,
            total: container.get("total").and_then(Value::as_u64),
        })
    }
}

#[derive(Debug)]
enum State {
    Start,
    Next(Cursor),
    Done,
}

/// Lazily walks every page of a collection, yielding items in server order.
///
/// Pages are fetched on demand through the [`RetryPolicy`], so each page
/// request gets the same rate-limit and token handling as any other call.
/// A failed page fetch leaves the paginator where it was; calling
/// [`next`](Self::next) again retries that page. A paginator is not
/// restartable.
///
/// ```no_run
/// # async fn run(client: rustify::Spotify) -> rustify::Result<()> {
/// let mut tracks = client.album_tracks("6akEvsycLGftJxYudPjmqK", None)?;
/// while let Some(track) = tracks.next().await? {
///     println!("{}", track.name);
/// }
/// # Ok(())
/// # }
/// ```
#[derive(Debug)]
pub struct Paginator<T> {
    policy: RetryPolicy,
    template: Request,
    items_key: Option<&'static str>,
    buffer: VecDeque<Value>,
    state: State,
    total: Option<u64>,
    pages_fetched: u32,
    _item: PhantomData<fn() -> T>,
}

impl<T: DeserializeOwned> Paginator<T> {
    pub(crate) fn new(
        policy: RetryPolicy,
        template: Request,
        page_size: u32,
        items_key: Option<&'static str>,
    ) -> Self {
        Self {
            policy,
            template: template.query("limit", page_size),
            items_key,
            buffer: VecDeque::new(),
            state: State::Start,
            total: None,
            pages_fetched: 0,
            _item: PhantomData,
        }
    }

    /// Next item, fetching the next page when the current one is used up.
    pub async fn next(&mut self) -> Result<Option<T>> {
        loop {
            if let Some(raw) = self.buffer.pop_front() {
                return Ok(Some(serde_json::from_value(raw)?));
            }

            let request = match &self.state {
                State::Start => self.template.clone(),
                State::Next(cursor) => cursor.apply(&self.template),
                State::Done => return Ok(None),
            };

            let page = Page::from_value(self.policy.execute(&request).await?, self.items_key)?;
            self.pages_fetched += 1;
            debug!(
                "Fetched page {} of {} ({} items)",
                self.pages_fetched,
                request.path(),
                page.items.len()
            );

            if page.total.is_some() {
                self.total = page.total;
            }
            self.state = match page.next_cursor {
                Some(cursor) => State::Next(cursor),
                None => State::Done,
            };
            let fetched = page.items.len();
            self.buffer
                .extend(page.items.into_iter().filter(|item| !item.is_null()));
            let kept = self.buffer.len();
            if kept < fetched {
                debug!("Skipped {} null items on page {}", fetched - kept, self.pages_fetched);
            }
        }
    }

    /// Fetch every remaining item.
    ///
    /// Loads the whole collection into memory; prefer [`take`](Self::take)
    /// for large libraries.
    pub async fn collect_all(mut self) -> Result<Vec<T>> {
        let mut items = Vec::new();
        while let Some(item) = self.next().await? {
            items.push(item);
        }
        Ok(items)
    }

    /// Up to `n` further items.
    pub async fn take(&mut self, n: usize) -> Result<Vec<T>> {
        let mut items = Vec::with_capacity(n.min(100));
        while items.len() < n {
            match self.next().await? {
                Some(item) => items.push(item),
                None => break,
            }
        }
        Ok(items)
    }

    /// Collection size reported by the last fetched page.
    pub fn total(&self) -> Option<u64> {
        self.total
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    /// Turn the paginator into a `Stream` of items.
    pub fn into_stream(self) -> impl Stream<Item = Result<T>> {
        stream::try_unfold(self, |mut paginator| async move {
            let item = paginator.next().await?;
            Ok::<_, SpotifyError>(item.map(|item| (item, paginator)))
        })
    }
}
