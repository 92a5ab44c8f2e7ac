//! Single-slot event handler registration.

use std::future::Future;
use std::sync::{Arc, PoisonError, RwLock};

use async_trait::async_trait;

use super::types::Event;
use crate::Result;
use crate::error::Error;

/// Receives decoded gateway events.
///
/// The session awaits [`EventHandler::handle`] before reading the next frame, so events arrive
/// one at a time and in socket order. Any `Fn(Event) -> impl Future<Output = ()>` closure is a
/// handler:
///
/// ```
/// use listen_moe_client::ws::{Event, HandlerRegistry};
///
/// let handlers = HandlerRegistry::default();
/// handlers.register(|event: Event| async move {
///     if let Some(song) = event.as_song_update() {
///         println!("now playing: {}", song.title);
///     }
/// });
/// assert!(handlers.is_registered());
/// ```
#[async_trait]
pub trait EventHandler: Send + Sync + 'static {
    async fn handle(&self, event: Event);
}

#[async_trait]
impl<F, Fut> EventHandler for F
where
    F: Fn(Event) -> Fut + Send + Sync + 'static,
    Fut: Future<Output = ()> + Send + 'static,
{
    async fn handle(&self, event: Event) {
        self(event).await;
    }
}

/// Holds at most one [`EventHandler`]. Registering replaces the previous handler; there is no
/// unregister, register a no-op handler to silence dispatch.
#[derive(Clone, Default)]
pub struct HandlerRegistry {
    slot: Arc<RwLock<Option<Arc<dyn EventHandler>>>>,
}

impl HandlerRegistry {
    pub fn register<H: EventHandler>(&self, handler: H) {
        // The slot is replaced wholesale, so a poisoned lock holds no partial state.
        *self.slot.write().unwrap_or_else(PoisonError::into_inner) = Some(Arc::new(handler));
    }

    #[must_use]
    pub fn is_registered(&self) -> bool {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    fn current(&self) -> Option<Arc<dyn EventHandler>> {
        self.slot
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    /// Invoke the current handler and wait for it. Without a handler this is a
    /// [`crate::error::Kind::Configuration`] error and `event` is not delivered.
    pub async fn dispatch(&self, event: Event) -> Result<()> {
        let handler = self
            .current()
            .ok_or_else(|| Error::configuration("no event handler registered"))?;

        handler.handle(event).await;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use std::sync::atomic::{AtomicUsize, Ordering};

    use serde_json::json;
    use tokio::sync::mpsc;

    use super::*;
    use crate::error::Kind;

    #[tokio::test]
    async fn dispatch_without_handler_is_configuration_error() {
        let registry = HandlerRegistry::default();

        let err = registry
            .dispatch(Event::Generic(json!({ "op": 1 })))
            .await
            .unwrap_err();

        assert_eq!(err.kind(), Kind::Configuration);
    }

    #[tokio::test]
    async fn last_registration_wins() {
        let registry = HandlerRegistry::default();
        let (first_tx, mut first_rx) = mpsc::unbounded_channel();
        let (second_tx, mut second_rx) = mpsc::unbounded_channel();

        registry.register(move |event: Event| {
            let tx = first_tx.clone();
            async move {
                _ = tx.send(event);
            }
        });
        registry.dispatch(Event::Generic(json!({ "op": 1 }))).await.unwrap();

        registry.register(move |event: Event| {
            let tx = second_tx.clone();
            async move {
                _ = tx.send(event);
            }
        });
        registry.dispatch(Event::Generic(json!({ "op": 2 }))).await.unwrap();

        assert_eq!(first_rx.recv().await, Some(Event::Generic(json!({ "op": 1 }))));
        assert_eq!(second_rx.recv().await, Some(Event::Generic(json!({ "op": 2 }))));
        // The first handler was dropped on replacement, closing its channel.
        assert_eq!(first_rx.recv().await, None);
    }

    struct Counter(Arc<AtomicUsize>);

    #[async_trait]
    impl EventHandler for Counter {
        async fn handle(&self, _event: Event) {
            self.0.fetch_add(1, Ordering::SeqCst);
        }
    }

    #[tokio::test]
    async fn trait_implementations_are_handlers() {
        let count = Arc::new(AtomicUsize::new(0));
        let registry = HandlerRegistry::default();
        registry.register(Counter(Arc::clone(&count)));

        registry.dispatch(Event::Generic(json!({ "op": 5 }))).await.unwrap();
        registry.dispatch(Event::Generic(json!({ "op": 6 }))).await.unwrap();

        assert_eq!(count.load(Ordering::SeqCst), 2);
    }
}
