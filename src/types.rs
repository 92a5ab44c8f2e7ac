//! Records shared by the REST API and the gateway, plus re-exports used in this SDK's public API.
//!
//! The listen.moe API sends the same `{ id, name, nameRomaji, image }` shape for artists,
//! albums, and sources. Every key must be present; `null` values become `None`.

use bon::Builder;
/// Secret string type that redacts the login token in debug output.
pub use secrecy::{ExposeSecret, SecretString};
use serde::{Deserialize, Serialize};

/// Identifier of a song in the listen.moe catalogue.
pub type SongId = u64;

/// A performing artist credited on a song.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Artist {
    pub id: u64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub name: Option<String>,
    /// Romanized spelling of `name`
    #[serde(rename = "nameRomaji", deserialize_with = "Option::deserialize")]
    pub romanized_name: Option<String>,
    #[serde(rename = "image", deserialize_with = "Option::deserialize")]
    pub image_url: Option<String>,
}

/// An album the song appears on.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Album {
    pub id: u64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub name: Option<String>,
    /// Romanized spelling of `name`
    #[serde(rename = "nameRomaji", deserialize_with = "Option::deserialize")]
    pub romanized_name: Option<String>,
    #[serde(rename = "image", deserialize_with = "Option::deserialize")]
    pub image_url: Option<String>,
}

/// The anime, game, or other work a song is taken from.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Source {
    pub id: u64,
    #[serde(deserialize_with = "Option::deserialize")]
    pub name: Option<String>,
    /// Romanized spelling of `name`
    #[serde(rename = "nameRomaji", deserialize_with = "Option::deserialize")]
    pub romanized_name: Option<String>,
    #[serde(rename = "image", deserialize_with = "Option::deserialize")]
    pub image_url: Option<String>,
}

/// A song the authenticated user has marked as a favorite.
#[non_exhaustive]
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize, Builder)]
#[builder(on(String, into))]
pub struct Favorite {
    pub id: SongId,
    pub title: String,
    pub artists: Vec<Artist>,
    pub albums: Vec<Album>,
    pub sources: Vec<Source>,
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use super::*;

    #[test]
    fn artist_with_null_image_should_succeed() {
        let artist: Artist = serde_json::from_value(json!({
            "id": 1,
            "name": "A",
            "nameRomaji": "A",
            "image": null
        }))
        .unwrap();

        assert_eq!(
            artist,
            Artist::builder().id(1).name("A").romanized_name("A").build()
        );
    }

    #[test]
    fn missing_key_is_an_error_not_a_null() {
        let result = serde_json::from_value::<Album>(json!({
            "id": 4,
            "name": "Crossing Field",
            "image": null
        }));

        let err = result.unwrap_err();
        assert!(err.to_string().contains("nameRomaji"), "{err}");
    }

    #[test]
    fn serialization_uses_wire_names() {
        let source = Source::builder()
            .id(9)
            .name("ソードアート・オンライン")
            .romanized_name("Sword Art Online")
            .image_url("sao.jpg")
            .build();

        assert_eq!(
            serde_json::to_value(&source).unwrap(),
            json!({
                "id": 9,
                "name": "ソードアート・オンライン",
                "nameRomaji": "Sword Art Online",
                "image": "sao.jpg"
            })
        );
    }
}
