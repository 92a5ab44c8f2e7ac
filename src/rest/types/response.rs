use bon::Builder;
use serde::Deserialize;

use crate::types::Favorite;

/// Body of `POST /api/login`, both on success and on rejection.
///
/// Rejections look like `{ "success": false, "message": "bad credentials" }`; successes carry
/// `token`. Older deployments omit `success` entirely, so every field is optional and the client
/// decides based on the HTTP status, `success`, and the presence of `token`.
#[non_exhaustive]
#[derive(Debug, Clone, Default, Deserialize, PartialEq, Eq)]
pub struct LoginResponse {
    #[serde(default)]
    pub success: Option<bool>,
    #[serde(default)]
    pub message: Option<String>,
    #[serde(default)]
    pub token: Option<String>,
}

impl LoginResponse {
    /// `true` unless the server explicitly answered `success: false`.
    #[must_use]
    pub fn is_accepted(&self) -> bool {
        self.success != Some(false)
    }
}

/// A listen.moe user.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq, Builder)]
#[builder(on(String, into))]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: u64,
    pub username: String,
    #[serde(default)]
    pub display_name: Option<String>,
    #[serde(default)]
    pub avatar_image: Option<String>,
    #[serde(default)]
    pub banner_image: Option<String>,
    #[serde(default)]
    pub bio: Option<String>,
}

/// Body of `GET /api/favorites/@me`.
#[non_exhaustive]
#[derive(Debug, Clone, Deserialize, PartialEq, Eq)]
pub struct FavoritesResponse {
    #[serde(alias = "songs")]
    pub favorites: Vec<Favorite>,
}
