//! User model.

use serde::{Deserialize, Serialize};

use super::common::{impl_resource, null_as_default, ExternalUrls, Followers, Image};
use super::playlist::Playlist;
use crate::api::Paginator;
use crate::error::Result;
use crate::ids::ResourceKind;
use crate::Spotify;

/// A user profile.
///
/// `email`, `country` and `product` are only present on the current user's
/// private profile and require the matching scopes.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct User {
    /// Spotify user ID.
    #[serde(default, deserialize_with = "null_as_default")]
    pub id: String,

    /// Type marker, "user".
    #[serde(rename = "type", default = "default_user_type")]
    pub type_: String,

    #[serde(default, deserialize_with = "null_as_default")]
    pub uri: String,

    #[serde(default)]
    pub display_name: Option<String>,

    #[serde(default)]
    pub email: Option<String>,

    /// ISO 3166-1 alpha-2 country code.
    #[serde(default)]
    pub country: Option<String>,

    /// Subscription level: "premium", "free", ...
    #[serde(default)]
    pub product: Option<String>,

    #[serde(default)]
    pub followers: Option<Followers>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub images: Vec<Image>,

    #[serde(default, deserialize_with = "null_as_default")]
    pub external_urls: ExternalUrls,

    #[serde(default)]
    pub href: Option<String>,
}

fn default_user_type() -> String {
    "user".to_string()
}

impl_resource!(User => ResourceKind::User);

impl User {
    /// Display name, falling back to the user ID.
    pub fn name(&self) -> &str {
        self.display_name.as_deref().unwrap_or(&self.id)
    }

    /// Whether the account has a premium subscription.
    pub fn is_premium(&self) -> bool {
        self.product.as_deref() == Some("premium")
    }

    /// Lazily page through the public playlists of this user.
    pub fn playlists(&self, client: &Spotify) -> Result<Paginator<Playlist>> {
        client.user_playlists(&self.id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_private_user() {
        let user: User = serde_json::from_str(
            r#"{
                "id": "wizzler",
                "type": "user",
                "uri": "spotify:user:wizzler",
                "display_name": null,
                "email": "wizzler@example.com",
                "country": "SE",
                "product": "premium",
                "followers": {"total": 3}
            }"#,
        )
        .unwrap();
        assert_eq!(user.name(), "wizzler");
        assert!(user.is_premium());
    }
}
