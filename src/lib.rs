#![cfg_attr(doc, doc = include_str!("../README.md"))]

pub mod auth;
#[cfg(all(feature = "rest", feature = "ws"))]
pub mod client;
pub mod error;
#[cfg(feature = "rest")]
pub mod rest;
#[cfg(feature = "rest")]
pub(crate) mod serde_helpers;
pub mod types;
#[cfg(feature = "ws")]
pub mod ws;

#[cfg(feature = "rest")]
use reqwest::{Request, header::HeaderMap};
use serde::{Deserialize, Serialize};
#[cfg(feature = "rest")]
use serde::de::DeserializeOwned;

#[cfg(all(feature = "rest", feature = "ws"))]
pub use crate::client::{Client, Config};
use crate::error::Error;

pub type Result<T> = std::result::Result<T, Error>;

/// `User-Agent` sent with every REST request.
pub const USER_AGENT: &str = concat!("listen-moe-client/", env!("CARGO_PKG_VERSION"));

/// Which of the two listen.moe stations a client talks to.
///
/// The stations share an API shape but have separate gateways and REST roots.
#[non_exhaustive]
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize, strum_macros::Display,
)]
#[serde(rename_all = "lowercase")]
#[strum(serialize_all = "lowercase")]
pub enum Library {
    /// Japanese music, the main station
    #[default]
    Jpop,
    /// Korean music, the alternate station
    Kpop,
}

impl Library {
    /// Root URL of the REST API for this station. Paths such as `api/login` are joined onto it.
    #[must_use]
    pub const fn rest_host(self) -> &'static str {
        match self {
            Self::Jpop => "https://listen.moe/",
            Self::Kpop => "https://listen.moe/kpop/",
        }
    }

    /// WebSocket endpoint of this station's event gateway.
    #[must_use]
    pub const fn gateway_endpoint(self) -> &'static str {
        match self {
            Self::Jpop => "wss://listen.moe/gateway",
            Self::Kpop => "wss://listen.moe/kpop/gateway",
        }
    }
}

/// Execute `request` and decode its JSON body.
///
/// Non-2xx responses become [`error::Kind::Status`] errors carrying the response text; bodies that
/// are not valid JSON, or that do not match `Response`, become [`error::Kind::Decode`] errors.
#[cfg(feature = "rest")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request<Response: DeserializeOwned>(
    client: &reqwest::Client,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<Response> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if !status_code.is_success() {
        let message = response.text().await.unwrap_or_default();

        #[cfg(feature = "tracing")]
        tracing::warn!(
            status = %status_code,
            method = %method,
            path = %path,
            message = %message,
            "API request failed"
        );

        return Err(Error::status(status_code, method, path, message));
    }

    let body = response.bytes().await?;
    let json_value = serde_json::from_slice::<serde_json::Value>(&body)?;

    serde_helpers::deserialize_with_warnings(json_value)
}

/// Execute `request` for an endpoint that answers `204 No Content` on success.
#[cfg(feature = "rest")]
#[cfg_attr(
    feature = "tracing",
    tracing::instrument(
        level = "debug",
        skip(client, request, headers),
        fields(
            method = %request.method(),
            path = request.url().path(),
            status_code
        )
    )
)]
async fn request_no_content(
    client: &reqwest::Client,
    mut request: Request,
    headers: Option<HeaderMap>,
) -> Result<()> {
    let method = request.method().clone();
    let path = request.url().path().to_owned();

    if let Some(h) = headers {
        request.headers_mut().extend(h);
    }

    let response = client.execute(request).await?;
    let status_code = response.status();

    #[cfg(feature = "tracing")]
    tracing::Span::current().record("status_code", status_code.as_u16());

    if status_code == reqwest::StatusCode::NO_CONTENT {
        return Ok(());
    }

    let message = response.text().await.unwrap_or_default();

    #[cfg(feature = "tracing")]
    tracing::warn!(
        status = %status_code,
        method = %method,
        path = %path,
        message = %message,
        "API request did not return 204"
    );

    Err(Error::status(status_code, method, path, message))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn default_library_is_jpop() {
        assert_eq!(Library::default(), Library::Jpop);
    }

    #[test]
    fn kpop_uses_separate_endpoints() {
        assert_eq!(
            Library::Kpop.gateway_endpoint(),
            "wss://listen.moe/kpop/gateway"
        );
        assert_eq!(Library::Kpop.rest_host(), "https://listen.moe/kpop/");
        assert_ne!(
            Library::Jpop.gateway_endpoint(),
            Library::Kpop.gateway_endpoint()
        );
    }

    #[test]
    fn library_display_is_lowercase() {
        assert_eq!(Library::Kpop.to_string(), "kpop");
        assert_eq!(
            serde_json::to_string(&Library::Jpop).unwrap(),
            "\"jpop\""
        );
    }
}
