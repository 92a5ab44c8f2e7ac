#![expect(
    clippy::module_name_repetitions,
    reason = "Connection types expose their domain in the name for clarity"
)]

use std::fmt;
use std::sync::Arc;
use std::time::{Duration, Instant};

use backoff::backoff::Backoff as _;
use futures::stream::SplitSink;
use futures::{SinkExt as _, StreamExt as _};
use serde::Serialize;
use tokio::net::TcpStream;
use tokio::sync::{mpsc, watch};
use tokio::time::{sleep, timeout};
use tokio_tungstenite::{MaybeTlsStream, WebSocketStream, connect_async, tungstenite::Message};

use super::config::Config;
use super::error::WsError;
use super::handler::{EventHandler, HandlerRegistry};
use super::heartbeat::{self, HeartbeatHandle};
use super::types::{InboundFrame, OpCode, OutboundFrame};
use crate::Library;
use crate::Result;
use crate::auth::TokenStore;
use crate::error::Kind;

type WsStream = WebSocketStream<MaybeTlsStream<TcpStream>>;

/// How long teardown waits for the writer task to flush and close the socket.
const WRITER_SHUTDOWN_TIMEOUT: Duration = Duration::from_secs(5);

/// Connection state tracking.
#[non_exhaustive]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConnectionState {
    /// Not connected
    Disconnected,
    /// Attempting to connect
    Connecting,
    /// Successfully connected
    Connected {
        /// When the connection was established
        since: Instant,
    },
    /// The server closed the socket, or the stream ended
    Closing,
    /// The transport failed
    Erroring,
    /// Waiting out the backoff before the next connection attempt
    Reconnecting {
        /// Reconnection attempt number, starting at 1
        attempt: u32,
    },
}

impl ConnectionState {
    /// Check if the connection is currently active.
    #[must_use]
    pub const fn is_connected(self) -> bool {
        matches!(self, Self::Connected { .. })
    }
}

/// How a socket ended, returned by [`Session::run`] when reconnection is disabled.
#[non_exhaustive]
#[derive(Debug)]
pub enum Disconnect {
    /// Close frame from the server (`code` is `None` if the stream ended without one)
    Closed { code: Option<u16>, reason: String },
    /// The transport failed or, during reconnection, could not be opened
    Failed(WsError),
}

/// Write side of one connection. Every outbound frame goes through the single writer task that
/// owns the socket's sink, so frames are never interleaved.
#[derive(Debug, Clone)]
pub struct FrameSender {
    tx: mpsc::UnboundedSender<Message>,
}

impl FrameSender {
    pub(crate) fn new(tx: mpsc::UnboundedSender<Message>) -> Self {
        Self { tx }
    }

    /// Queue `frame` as a JSON text frame. Fails with [`WsError::ConnectionClosed`] once the
    /// writer has shut down.
    pub fn send<R: Serialize>(&self, frame: &R) -> Result<()> {
        let json = serde_json::to_string(frame)?;
        self.tx
            .send(Message::Text(json.into()))
            .map_err(|_e| WsError::ConnectionClosed)?;
        Ok(())
    }

    #[must_use]
    pub fn is_closed(&self) -> bool {
        self.tx.is_closed()
    }
}

/// One logical gateway connection: connect, identify, heartbeat, dispatch, reconnect.
///
/// Cloning is cheap and every clone observes the same state and handler. Drive the session by
/// awaiting [`Session::run`]; only one `run` should be active per session.
///
/// # Example
///
/// ```no_run
/// use listen_moe_client::Library;
/// use listen_moe_client::ws::{Event, Session, config::Config};
///
/// # async fn example() -> listen_moe_client::Result<()> {
/// let session = Session::for_library(Library::Jpop, Config::default());
/// session.register_handler(|event: Event| async move {
///     if let Some(song) = event.as_song_update() {
///         println!("now playing: {}", song.title);
///     }
/// });
///
/// // With the default config this reconnects forever and never returns after connecting.
/// session.run().await?;
/// # Ok(())
/// # }
/// ```
#[derive(Clone)]
pub struct Session {
    inner: Arc<SessionInner>,
}

struct SessionInner {
    endpoint: String,
    config: Config,
    handlers: HandlerRegistry,
    token: TokenStore,
    state_tx: watch::Sender<ConnectionState>,
}

impl fmt::Debug for Session {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Session")
            .field("endpoint", &self.inner.endpoint)
            .field("config", &self.inner.config)
            .field("state", &self.state())
            .field("has_handler", &self.inner.handlers.is_registered())
            .field("token", &self.inner.token)
            .finish()
    }
}

impl Session {
    /// A session against `endpoint` without a token; no identify frame is sent.
    #[must_use]
    pub fn new(endpoint: String, config: Config) -> Self {
        Self::with_token_store(endpoint, config, TokenStore::new())
    }

    /// A session for the gateway of `library`.
    #[must_use]
    pub fn for_library(library: Library, config: Config) -> Self {
        Self::new(library.gateway_endpoint().to_owned(), config)
    }

    /// A session that identifies with whatever token `token` holds when each connection opens.
    #[must_use]
    pub fn with_token_store(endpoint: String, config: Config, token: TokenStore) -> Self {
        let (state_tx, _) = watch::channel(ConnectionState::Disconnected);

        Self {
            inner: Arc::new(SessionInner {
                endpoint,
                config,
                handlers: HandlerRegistry::default(),
                token,
                state_tx,
            }),
        }
    }

    /// Replace the event handler. Takes effect from the next dispatched frame, also while
    /// [`Session::run`] is active.
    pub fn register_handler<H: EventHandler>(&self, handler: H) {
        self.inner.handlers.register(handler);
    }

    #[must_use]
    pub fn handlers(&self) -> &HandlerRegistry {
        &self.inner.handlers
    }

    #[must_use]
    pub fn token_store(&self) -> &TokenStore {
        &self.inner.token
    }

    #[must_use]
    pub fn endpoint(&self) -> &str {
        &self.inner.endpoint
    }

    /// Get the current connection state.
    #[must_use]
    pub fn state(&self) -> ConnectionState {
        *self.inner.state_tx.borrow()
    }

    /// Subscribe to connection state changes.
    #[must_use]
    pub fn state_receiver(&self) -> watch::Receiver<ConnectionState> {
        self.inner.state_tx.subscribe()
    }

    fn set_state(&self, state: ConnectionState) {
        #[cfg(feature = "tracing")]
        tracing::trace!(?state, "gateway state changed");

        self.inner.state_tx.send_replace(state);
    }

    /// Connect and process frames until the session ends.
    ///
    /// Returns `Err` if the very first connection attempt fails, or as soon as a frame needs
    /// dispatching while no handler is registered. With reconnection disabled, returns
    /// `Ok(Disconnect)` when the socket ends; with it enabled, later connection failures are
    /// logged and retried after the backoff, indefinitely.
    pub async fn run(&self) -> Result<Disconnect> {
        let reconnect = &self.inner.config.reconnect;
        let mut backoff = reconnect.backoff();
        let mut attempt = 0_u32;
        let mut first_attempt = true;

        loop {
            self.set_state(ConnectionState::Connecting);

            let disconnect = match connect_async(self.inner.endpoint.as_str()).await {
                Ok((stream, _)) => {
                    attempt = 0;
                    backoff.reset();
                    self.set_state(ConnectionState::Connected {
                        since: Instant::now(),
                    });

                    #[cfg(feature = "tracing")]
                    tracing::debug!(endpoint = %self.inner.endpoint, "gateway connected");

                    match self.handle_connection(stream).await {
                        Ok(disconnect) => disconnect,
                        Err(e) => {
                            self.set_state(ConnectionState::Disconnected);
                            return Err(e);
                        }
                    }
                }
                Err(e) if first_attempt => {
                    #[cfg(feature = "tracing")]
                    tracing::error!(endpoint = %self.inner.endpoint, error = %e, "unable to connect to gateway");

                    self.set_state(ConnectionState::Disconnected);
                    return Err(e.into());
                }
                Err(e) => {
                    #[cfg(feature = "tracing")]
                    tracing::warn!(endpoint = %self.inner.endpoint, error = %e, "reconnect attempt failed");

                    Disconnect::Failed(WsError::Connection(e))
                }
            };
            first_attempt = false;

            self.set_state(ConnectionState::Disconnected);

            if !reconnect.enabled {
                return Ok(disconnect);
            }

            attempt = attempt.saturating_add(1);
            self.set_state(ConnectionState::Reconnecting { attempt });

            let delay = backoff.next_backoff();

            #[cfg(feature = "tracing")]
            tracing::warn!(?disconnect, attempt, ?delay, "gateway disconnected, reconnecting");
            #[cfg(not(feature = "tracing"))]
            let _ = &disconnect;

            if let Some(delay) = delay {
                sleep(delay).await;
            }
        }
    }

    /// Drive one open socket until it ends. Tears down the heartbeat and writer before
    /// returning.
    async fn handle_connection(&self, stream: WsStream) -> Result<Disconnect> {
        let (sink, mut read) = stream.split();
        let (tx, rx) = mpsc::unbounded_channel();
        let sender = FrameSender::new(tx);
        let mut writer = tokio::spawn(write_loop(sink, rx));
        let mut heartbeat: Option<HeartbeatHandle> = None;

        if let Some(token) = self.inner.token.get() {
            #[cfg(feature = "tracing")]
            tracing::debug!("sending identify frame");

            sender.send(&OutboundFrame::identify(token))?;
        }

        let outcome = loop {
            let Some(message) = read.next().await else {
                self.set_state(ConnectionState::Closing);
                break Ok(Disconnect::Closed {
                    code: None,
                    reason: String::new(),
                });
            };

            match message {
                Ok(Message::Text(text)) => {
                    #[cfg(feature = "tracing")]
                    tracing::trace!(%text, "received gateway frame");

                    if let Err(e) = self
                        .handle_frame(text.as_bytes(), &sender, &mut heartbeat)
                        .await
                    {
                        if e.kind() == Kind::Configuration {
                            break Err(e);
                        }

                        #[cfg(feature = "tracing")]
                        tracing::warn!(%text, error = %e, "dropping gateway frame");
                        #[cfg(not(feature = "tracing"))]
                        let _ = (&text, &e);
                    }
                }
                Ok(Message::Close(frame)) => {
                    self.set_state(ConnectionState::Closing);
                    let (code, reason) = frame.map_or((None, String::new()), |frame| {
                        (Some(u16::from(frame.code)), frame.reason.as_str().to_owned())
                    });

                    #[cfg(feature = "tracing")]
                    tracing::debug!(?code, %reason, "gateway closed the connection");

                    break Ok(Disconnect::Closed { code, reason });
                }
                Err(e) => {
                    self.set_state(ConnectionState::Erroring);

                    #[cfg(feature = "tracing")]
                    tracing::error!(error = %e, "gateway connection failed");

                    break Ok(Disconnect::Failed(WsError::Connection(e)));
                }
                Ok(_) => {
                    // Binary, ping, pong, and raw frames carry nothing for us.
                }
            }
        };

        // Heartbeat first, so no ping races the closing queue.
        if let Some(heartbeat) = heartbeat.take() {
            heartbeat.stop().await;
        }
        drop(sender);

        if timeout(WRITER_SHUTDOWN_TIMEOUT, &mut writer).await.is_err() {
            #[cfg(feature = "tracing")]
            tracing::debug!("writer did not shut down in time, aborting");

            writer.abort();
        }

        outcome
    }

    async fn handle_frame(
        &self,
        bytes: &[u8],
        sender: &FrameSender,
        heartbeat: &mut Option<HeartbeatHandle>,
    ) -> Result<()> {
        let frame = InboundFrame::parse(bytes)?;

        match frame.op_code() {
            Some(OpCode::Hello) => {
                let period = frame.heartbeat_interval()?;
                if let Some(previous) = heartbeat.take() {
                    previous.cancel();
                }

                #[cfg(feature = "tracing")]
                tracing::debug!(?period, "starting heartbeat");

                *heartbeat = Some(heartbeat::spawn(period, sender.clone()));
            }
            Some(OpCode::HeartbeatAck) => {
                #[cfg(feature = "tracing")]
                tracing::trace!("heartbeat acknowledged");
            }
            _ => self.inner.handlers.dispatch(frame.into_event()?).await?,
        }

        Ok(())
    }
}

/// Sole owner of the socket's write half. Exits once every [`FrameSender`] is dropped, then
/// closes the socket.
async fn write_loop(
    mut sink: SplitSink<WsStream, Message>,
    mut rx: mpsc::UnboundedReceiver<Message>,
) {
    while let Some(message) = rx.recv().await {
        if let Err(e) = sink.send(message).await {
            #[cfg(feature = "tracing")]
            tracing::debug!(error = %e, "gateway write failed, stopping writer");
            #[cfg(not(feature = "tracing"))]
            let _ = &e;
            break;
        }
    }

    _ = sink.close().await;
}
