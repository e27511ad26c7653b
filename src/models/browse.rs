//! Browse models: categories and recommendations.

use serde::{Deserialize, Serialize};

use super::common::{largest_image, null_as_default, Image};
use super::track::Track;

/// A category used to tag items on the Browse tab.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Category {
    /// Category ID, e.g. "party".
    pub id: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub name: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub icons: Vec<Image>,

    #[serde(default)]
    pub href: Option<String>,
}

impl Category {
    pub fn largest_icon(&self) -> Option<&Image> {
        largest_image(&self.icons)
    }
}

/// Tracks recommended for a set of seeds.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct Recommendations {
    /// One entry per seed, in request order.
    #[serde(default)]
    pub seeds: Vec<RecommendationSeed>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub tracks: Vec<Track>,
}

/// How a single seed contributed to the recommendations.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct RecommendationSeed {
    /// Artist or track id, or the genre name.
    pub id: String,

    /// "artist", "track" or "genre".
    #[serde(rename = "type", default)]
    pub type_: String,

    /// Candidate tracks before filters were applied.
    #[serde(rename = "initialPoolSize", default)]
    pub initial_pool_size: u32,

    #[serde(rename = "afterFilteringSize", default)]
    pub after_filtering_size: u32,

    #[serde(rename = "afterRelinkingSize", default)]
    pub after_relinking_size: u32,

    #[serde(default)]
    pub href: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_recommendations() {
        let recommendations: Recommendations = serde_json::from_str(
            r#"{
                "seeds": [
                    {"id": "4NHQUGzhtTLFvgF5SZesLK", "type": "ARTIST", "initialPoolSize": 500,
                     "afterFilteringSize": 380, "afterRelinkingSize": 365},
                    {"id": "classical", "type": "GENRE", "initialPoolSize": 250,
                     "afterFilteringSize": 172, "afterRelinkingSize": 144, "href": null}
                ],
                "tracks": [{"id": "t1", "name": "Etude"}]
            }"#,
        )
        .unwrap();
        assert_eq!(recommendations.seeds.len(), 2);
        assert_eq!(recommendations.seeds[1].after_filtering_size, 172);
        assert_eq!(recommendations.tracks[0].name, "Etude");
    }

    #[test]
    fn test_category_icons() {
        let category: Category = serde_json::from_str(
            r#"{"id": "party", "name": "Party", "icons": [
                {"url": "https://t.scdn.co/small", "height": 64, "width": 64},
                {"url": "https://t.scdn.co/big", "height": 274, "width": 274}
            ]}"#,
        )
        .unwrap();
        assert_eq!(category.largest_icon().map(|i| i.url.as_str()), Some("https://t.scdn.co/big"));
    }
}
