//! Caller-facing client combining the REST API and the event gateway.

use std::sync::Arc;

use bon::Builder;
use tokio::sync::watch;

use crate::auth::{SecretString, TokenStore};
use crate::rest::types::UserProfile;
use crate::types::{Favorite, SongId};
use crate::ws::config::{
    BackoffStrategy, Config as WsConfig, DEFAULT_RECONNECT_DELAY, ReconnectConfig,
};
use crate::ws::{ConnectionState, Disconnect, EventHandler, Session};
use crate::{Library, Result, rest};

/// Configuration for [`Client`]
#[non_exhaustive]
#[derive(Clone, Debug, Builder)]
pub struct Config {
    /// Station to talk to. Picks both the REST root and the gateway endpoint.
    #[builder(default)]
    library: Library,
    /// Whether [`Client::run`] reconnects after the gateway socket ends. Defaults to `true`.
    #[builder(default = true)]
    reconnect: bool,
    /// Wait between reconnection attempts. Defaults to a constant sixty seconds.
    reconnect_backoff: Option<BackoffStrategy>,
    /// Override for the REST root, e.g. a mock server in tests.
    #[builder(into)]
    rest_host: Option<String>,
    /// Override for the gateway endpoint, e.g. a mock server in tests.
    #[builder(into)]
    gateway_endpoint: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl Config {
    fn ws_config(&self) -> WsConfig {
        WsConfig::with_reconnect(ReconnectConfig {
            enabled: self.reconnect,
            backoff: self
                .reconnect_backoff
                .unwrap_or(BackoffStrategy::Constant(DEFAULT_RECONNECT_DELAY)),
        })
    }
}

/// listen.moe client: log in over REST, then receive live events over the gateway.
///
/// Both halves share one token store, so a successful [`Client::login`] makes every later REST
/// call authenticated and makes the gateway identify on its next connection.
///
/// # Example
///
/// ```no_run
/// use listen_moe_client::{Client, Config, Library};
/// use listen_moe_client::ws::Event;
///
/// # async fn example() -> listen_moe_client::Result<()> {
/// let client = Client::new(Config::builder().library(Library::Kpop).build())?;
///
/// client.register_handler(|event: Event| async move {
///     if let Some(song) = event.as_song_update() {
///         println!("now playing: {}", song.title);
///     }
/// });
///
/// client.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone, Debug)]
pub struct Client {
    inner: Arc<ClientInner>,
}

#[derive(Debug)]
struct ClientInner {
    library: Library,
    rest: rest::Client,
    session: Session,
}

impl Client {
    pub fn new(config: Config) -> Result<Self> {
        let token = TokenStore::new();

        let rest_host = config
            .rest_host
            .as_deref()
            .unwrap_or_else(|| config.library.rest_host());
        let rest = rest::Client::with_token_store(rest_host, token.clone())?;

        let endpoint = config
            .gateway_endpoint
            .clone()
            .unwrap_or_else(|| config.library.gateway_endpoint().to_owned());
        let session = Session::with_token_store(endpoint, config.ws_config(), token);

        Ok(Self {
            inner: Arc::new(ClientInner {
                library: config.library,
                rest,
                session,
            }),
        })
    }

    #[must_use]
    pub fn library(&self) -> Library {
        self.inner.library
    }

    /// The REST half, for calls not mirrored on [`Client`].
    #[must_use]
    pub fn rest(&self) -> &rest::Client {
        &self.inner.rest
    }

    /// The gateway half.
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.inner.session
    }

    #[must_use]
    pub fn is_authenticated(&self) -> bool {
        self.inner.rest.is_authenticated()
    }

    /// See [`rest::Client::login`].
    pub async fn login(&self, username: &str, password: &str) -> Result<SecretString> {
        self.inner.rest.login(username, password).await
    }

    /// See [`rest::Client::profile`].
    pub async fn profile(&self, name: Option<&str>) -> Result<UserProfile> {
        self.inner.rest.profile(name).await
    }

    pub async fn favorites(&self) -> Result<Vec<Favorite>> {
        self.inner.rest.favorites().await
    }

    /// See [`rest::Client::set_favorite`].
    pub async fn set_favorite(&self, song_id: SongId, remove: bool) -> Result<()> {
        self.inner.rest.set_favorite(song_id, remove).await
    }

    pub async fn request_song(&self, song_id: SongId) -> Result<()> {
        self.inner.rest.request_song(song_id).await
    }

    /// Replace the gateway event handler.
    pub fn register_handler<H: EventHandler>(&self, handler: H) {
        self.inner.session.register_handler(handler);
    }

    #[must_use]
    pub fn connection_state(&self) -> ConnectionState {
        self.inner.session.state()
    }

    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.session.state_receiver()
    }

    /// See [`Session::run`].
    pub async fn run(&self) -> Result<Disconnect> {
        self.inner.session.run().await
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;

    #[test]
    fn default_config_reconnects_to_jpop() {
        let client = Client::new(Config::default()).unwrap();

        assert_eq!(client.library(), Library::Jpop);
        assert_eq!(client.rest().host().as_str(), "https://listen.moe/");
        assert_eq!(client.session().endpoint(), "wss://listen.moe/gateway");
        assert_eq!(client.connection_state(), ConnectionState::Disconnected);

        let ws = Config::default().ws_config();
        assert!(ws.reconnect.enabled);
        assert_eq!(
            ws.reconnect.backoff,
            BackoffStrategy::Constant(DEFAULT_RECONNECT_DELAY)
        );
    }

    #[test]
    fn kpop_selects_alternate_endpoints() {
        let client = Client::new(Config::builder().library(Library::Kpop).build()).unwrap();

        assert_eq!(client.rest().host().as_str(), "https://listen.moe/kpop/");
        assert_eq!(client.session().endpoint(), "wss://listen.moe/kpop/gateway");
    }

    #[test]
    fn overrides_win_over_library() {
        let client = Client::new(
            Config::builder()
                .library(Library::Kpop)
                .rest_host("http://127.0.0.1:8080")
                .gateway_endpoint("ws://127.0.0.1:8081")
                .build(),
        )
        .unwrap();

        assert_eq!(client.rest().host().as_str(), "http://127.0.0.1:8080/");
        assert_eq!(client.session().endpoint(), "ws://127.0.0.1:8081");
    }

    #[test]
    fn reconnect_settings_reach_session() {
        let config = Config::builder()
            .reconnect(false)
            .reconnect_backoff(BackoffStrategy::Constant(Duration::from_millis(50)))
            .build();

        let ws = config.ws_config();
        assert!(!ws.reconnect.enabled);
        assert_eq!(
            ws.reconnect.backoff,
            BackoffStrategy::Constant(Duration::from_millis(50))
        );
    }

    #[test]
    fn rest_and_session_share_token() {
        let client = Client::new(Config::default()).unwrap();

        client
            .rest()
            .token_store()
            .set(SecretString::from("token".to_owned()));

        assert!(client.is_authenticated());
        assert!(client.session().token_store().is_set());
    }
}
