//! Common types shared across all models.

use std::collections::HashMap;

use serde::{Deserialize, Deserializer, Serialize};

use crate::ids::ResourceKind;

/// Image with URL and optional dimensions.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Image {
    /// URL to the image. Temporary for playlist images.
    pub url: String,

    /// Height in pixels, when known.
    #[serde(default)]
    pub height: Option<u32>,

    /// Width in pixels, when known.
    #[serde(default)]
    pub width: Option<u32>,
}

impl Image {
    /// Create a new image.
    pub fn new<S: Into<String>>(url: S, height: u32, width: u32) -> Self {
        Self {
            url: url.into(),
            height: Some(height),
            width: Some(width),
        }
    }

    fn area(&self) -> u64 {
        u64::from(self.height.unwrap_or(0)) * u64::from(self.width.unwrap_or(0))
    }
}

/// Pick the largest image of a list.
pub(crate) fn largest_image(images: &[Image]) -> Option<&Image> {
    images.iter().max_by_key(|img| img.area())
}

/// Follower information.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Followers {
    /// Total number of followers.
    #[serde(default)]
    pub total: u64,
}

/// Known external URLs, keyed by service (usually just `spotify`).
pub type ExternalUrls = HashMap<String, String>;

/// Copyright statement of an album.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Copyright {
    /// Copyright text.
    pub text: String,

    /// "C" for copyright, "P" for performance copyright.
    #[serde(rename = "type")]
    pub type_: String,
}

/// Context something is played from: an album, artist or playlist.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Context {
    /// Object type, e.g. "album" or "playlist".
    #[serde(rename = "type")]
    pub type_: String,

    /// URI of the context.
    pub uri: String,

    /// Web API link to the context.
    #[serde(default)]
    pub href: Option<String>,

    #[serde(default)]
    pub external_urls: ExternalUrls,
}

/// A page of objects embedded in another payload or returned by search.
///
/// This is the snapshot form. For lazy traversal of all pages use a
/// [`Paginator`](crate::api::Paginator).
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(bound(deserialize = "T: Deserialize<'de>"))]
pub struct Paging<T> {
    /// Items of this page. Null entries sent by the API are skipped.
    #[serde(default = "Vec::new", deserialize_with = "skip_nulls")]
    pub items: Vec<T>,

    /// Total number of items in the collection.
    #[serde(default)]
    pub total: u32,

    /// Requested page size.
    #[serde(default)]
    pub limit: u32,

    /// Offset of the first item.
    #[serde(default)]
    pub offset: u32,

    /// Link to the next page, absent on the last one.
    #[serde(default)]
    pub next: Option<String>,

    /// Link to this page.
    #[serde(default)]
    pub href: Option<String>,
}

impl<T> Default for Paging<T> {
    fn default() -> Self {
        Self {
            items: Vec::new(),
            total: 0,
            limit: 0,
            offset: 0,
            next: None,
            href: None,
        }
    }
}

impl<T> Paging<T> {
    /// Whether more items exist beyond this page.
    pub fn has_more(&self) -> bool {
        self.next.is_some()
    }
}

/// Implemented by every model that mirrors a remote resource with an id.
///
/// Two values of the same model type are equal when their ids are equal,
/// even if they were fetched at different times and their fields disagree.
pub trait Resource {
    /// Kind of this resource.
    const KIND: ResourceKind;

    /// Remote id. Empty for local files, which have no id.
    fn id(&self) -> &str;

    /// `spotify:<kind>:<id>` URI.
    fn uri(&self) -> String {
        format!("spotify:{}:{}", Self::KIND, self.id())
    }
}

/// Implement [`Resource`] plus id-based `PartialEq`, `Eq` and `Hash`.
macro_rules! impl_resource {
    ($($model:ty => $kind:expr),+ $(,)?) => {
        $(
            impl $crate::models::common::Resource for $model {
                const KIND: $crate::ids::ResourceKind = $kind;

                fn id(&self) -> &str {
                    &self.id
                }
            }

            impl PartialEq for $model {
                fn eq(&self, other: &Self) -> bool {
                    self.id == other.id
                }
            }

            impl Eq for $model {}

            impl std::hash::Hash for $model {
                fn hash<H: std::hash::Hasher>(&self, state: &mut H) {
                    self.id.hash(state);
                }
            }
        )+
    };
}

pub(crate) use impl_resource;

/// Deserialize `null` as the type's default value.
pub(crate) fn null_as_default<'de, D, T>(deserializer: D) -> Result<T, D::Error>
where
    D: Deserializer<'de>,
    T: Default + Deserialize<'de>,
{
    Ok(Option::<T>::deserialize(deserializer)?.unwrap_or_default())
}

fn skip_nulls<'de, D, T>(deserializer: D) -> Result<Vec<T>, D::Error>
where
    D: Deserializer<'de>,
    T: Deserialize<'de>,
{
    let items: Option<Vec<Option<T>>> = Option::deserialize(deserializer)?;
    Ok(items.unwrap_or_default().into_iter().flatten().collect())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_largest_image() {
        let images = vec![
            Image::new("small", 64, 64),
            Image::new("big", 640, 640),
            Image {
                url: "unknown".to_string(),
                height: None,
                width: None,
            },
        ];
        assert_eq!(largest_image(&images).map(|i| i.url.as_str()), Some("big"));
        assert!(largest_image(&[]).is_none());
    }

    #[test]
    fn test_paging_skips_null_items() {
        let page: Paging<Image> = serde_json::from_str(
            r#"{"items":[{"url":"a"},null,{"url":"b"}],"total":3,"next":null}"#,
        )
        .unwrap();
        assert_eq!(page.items.len(), 2);
        assert_eq!(page.total, 3);
        assert!(!page.has_more());
    }

    #[test]
    fn test_paging_defaults_when_only_total() {
        let page: Paging<Image> =
            serde_json::from_str(r#"{"href":"https://x/tracks","total":12}"#).unwrap();
        assert!(page.items.is_empty());
        assert_eq!(page.total, 12);
    }
}
