use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use reqwest::{Client as ReqwestClient, Method};
use url::Url;

use super::types::{FavoritesResponse, LoginRequest, LoginResponse, UserProfile};
use crate::auth::{self, SecretString, TokenStore};
use crate::error::Error;
use crate::types::{Favorite, SongId};
use crate::{Library, Result, USER_AGENT};

/// Client for the listen.moe REST API.
///
/// Token-gated calls check for a stored token before doing any I/O and fail with a
/// [`crate::error::Kind::Configuration`] error when [`Client::login`] has not succeeded yet.
///
/// # Example
///
/// ```no_run
/// use listen_moe_client::rest::Client;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = Client::default();
///
/// // Public profiles do not need a token
/// let profile = client.profile(Some("kana")).await?;
/// println!("{} ({})", profile.username, profile.id);
///
/// client.login("username", "password").await?;
/// client.set_favorite(1234, false).await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    host: Url,
    client: ReqwestClient,
    token: TokenStore,
}

impl Default for Client {
    fn default() -> Self {
        Client::new(Library::default().rest_host())
            .expect("Client with default endpoint should succeed")
    }
}

impl Client {
    /// Creates a new REST client against `host` with an empty token store.
    ///
    /// # Errors
    ///
    /// Returns an error if the host URL is invalid or the HTTP client fails to build.
    pub fn new(host: &str) -> Result<Client> {
        Self::with_token_store(host, TokenStore::new())
    }

    /// Creates a client for the REST root of `library`.
    pub fn for_library(library: Library) -> Result<Client> {
        Self::new(library.rest_host())
    }

    /// Creates a client that reads and writes its token through `token`.
    pub fn with_token_store(host: &str, token: TokenStore) -> Result<Client> {
        let mut headers = HeaderMap::new();

        headers.insert("User-Agent", HeaderValue::from_static(USER_AGENT));
        headers.insert("Accept", HeaderValue::from_static("application/json"));
        headers.insert("Content-Type", HeaderValue::from_static("application/json"));
        let client = ReqwestClient::builder().default_headers(headers).build()?;

        let mut host = Url::parse(host)?;
        if !host.path().ends_with('/') {
            let path = format!("{}/", host.path());
            host.set_path(&path);
        }

        Ok(Self {
            host,
            client,
            token,
        })
    }

    /// Returns the host URL for the client.
    #[must_use]
    pub fn host(&self) -> &Url {
        &self.host
    }

    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.token
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.token.is_set()
    }

    fn endpoint(&self, segments: &[&str]) -> Result<Url> {
        let mut url = self.host.clone();
        url.path_segments_mut()
            .map_err(|()| Error::configuration(format!("{} cannot be a base URL", self.host)))?
            .pop_if_empty()
            .extend(segments);
        Ok(url)
    }

    fn auth_headers(&self) -> Result<HeaderMap> {
        let token = self.token.require()?;
        let mut headers = HeaderMap::new();
        headers.insert(AUTHORIZATION, auth::authorization_header(&token)?);
        Ok(headers)
    }

    /// Log in and store the returned token for subsequent calls.
    ///
    /// A non-2xx status or a `success: false` body yields a
    /// [`crate::error::Kind::Authentication`] error with the server's message, and the stored
    /// token is left untouched.
    #[cfg_attr(
        feature = "tracing",
        tracing::instrument(level = "debug", skip(self, password), fields(status_code))
    )]
    pub async fn login(&self, username: &str, password: &str) -> Result<SecretString> {
        let request = self
            .client
            .request(Method::POST, self.endpoint(&["api", "login"])?)
            .json(&LoginRequest { username, password })
            .build()?;

        let response = self.client.execute(request).await?;
        let status_code = response.status();

        #[cfg(feature = "tracing")]
        tracing::Span::current().record("status_code", status_code.as_u16());

        let body = response.bytes().await?;

        if !status_code.is_success() {
            let message = serde_json::from_slice::<LoginResponse>(&body)
                .ok()
                .and_then(|r| r.message)
                .unwrap_or_else(|| status_code.to_string());

            #[cfg(feature = "tracing")]
            tracing::warn!(status = %status_code, %message, "login rejected");

            return Err(Error::authentication(message));
        }

        let login: LoginResponse = serde_json::from_slice(&body)?;
        if !login.is_accepted() {
            return Err(Error::authentication(
                login.message.unwrap_or_else(|| "login rejected".to_owned()),
            ));
        }

        let token = login.token.ok_or_else(|| {
            Error::authentication(
                login
                    .message
                    .unwrap_or_else(|| "login response did not contain a token".to_owned()),
            )
        })?;
        let token = SecretString::from(token);

        self.token.set(token.clone());

        #[cfg(feature = "tracing")]
        tracing::debug!("login succeeded, token stored");

        Ok(token)
    }

    /// Fetch a user profile. `None` fetches the logged-in user (`@me`) and requires a token;
    /// a named profile is public and works without logging in.
    pub async fn profile(&self, name: Option<&str>) -> Result<UserProfile> {
        let (target, headers) = match name {
            Some(name) => (name, self.auth_headers().ok()),
            None => ("@me", Some(self.auth_headers()?)),
        };

        let request = self
            .client
            .request(Method::GET, self.endpoint(&["api", "users", target])?)
            .build()?;

        crate::request(&self.client, request, headers).await
    }

    /// List the logged-in user's favorites.
    pub async fn favorites(&self) -> Result<Vec<Favorite>> {
        let headers = self.auth_headers()?;

        let request = self
            .client
            .request(Method::GET, self.endpoint(&["api", "favorites", "@me"])?)
            .build()?;

        let response: FavoritesResponse =
            crate::request(&self.client, request, Some(headers)).await?;
        Ok(response.favorites)
    }

    /// Favorite (`remove == false`) or unfavorite (`remove == true`) a song.
    ///
    /// Succeeds only on `204 No Content`; any other status is a [`crate::error::Kind::Status`]
    /// error.
    pub async fn set_favorite(&self, song_id: SongId, remove: bool) -> Result<()> {
        let headers = self.auth_headers()?;
        let method = if remove { Method::DELETE } else { Method::POST };
        let song_id = song_id.to_string();

        let request = self
            .client
            .request(method, self.endpoint(&["api", "favorites", &song_id])?)
            .build()?;

        crate::request_no_content(&self.client, request, Some(headers)).await
    }

    /// Request a song to be played on the stream. Succeeds only on `204 No Content`.
    pub async fn request_song(&self, song_id: SongId) -> Result<()> {
        let headers = self.auth_headers()?;
        let song_id = song_id.to_string();

        let request = self
            .client
            .request(Method::POST, self.endpoint(&["api", "requests", &song_id])?)
            .build()?;

        crate::request_no_content(&self.client, request, Some(headers)).await
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn host_gets_trailing_slash() {
        let client = Client::new("https://listen.moe/kpop").unwrap();

        assert_eq!(client.host().as_str(), "https://listen.moe/kpop/");
    }

    #[test]
    fn endpoint_joins_segments_under_host() {
        let client = Client::for_library(Library::Kpop).unwrap();

        assert_eq!(
            client.endpoint(&["api", "users", "@me"]).unwrap().as_str(),
            "https://listen.moe/kpop/api/users/@me"
        );
    }

    #[test]
    fn endpoint_escapes_user_names() {
        let client = Client::default();

        assert_eq!(
            client.endpoint(&["api", "users", "a b/c"]).unwrap().as_str(),
            "https://listen.moe/api/users/a%20b%2Fc"
        );
    }

    #[tokio::test]
    async fn gated_calls_fail_fast_without_token() {
        let client = Client::new("http://127.0.0.1:9").unwrap();

        let err = client.favorites().await.unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Configuration);

        let err = client.set_favorite(1, false).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Configuration);

        let err = client.profile(None).await.unwrap_err();
        assert_eq!(err.kind(), crate::error::Kind::Configuration);
    }
}
