//! Storage for the listen.moe login token.
//!
//! The token is written by [`crate::rest::Client::login`] and read by every token-gated REST call
//! and by the gateway identify frame. One [`TokenStore`] is shared (via clones) between the REST
//! client and the gateway session of a [`crate::Client`].

use std::sync::{Arc, PoisonError, RwLock};

#[cfg(feature = "rest")]
use reqwest::header::HeaderValue;
/// Secret string types that redact values in debug output for security.
pub use secrecy::{ExposeSecret, SecretString};

use crate::Result;
use crate::error::Error;

/// Shared, last-writer-wins slot for the login token.
///
/// Re-logging in while a session is active is not synchronized with in-flight requests; a
/// request started before the new `login` completes may still use the previous token.
#[derive(Clone, Debug, Default)]
pub struct TokenStore {
    inner: Arc<RwLock<Option<SecretString>>>,
}

impl TokenStore {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a store that already holds `token`, e.g. one persisted from an earlier login.
    #[must_use]
    pub fn with_token(token: SecretString) -> Self {
        Self {
            inner: Arc::new(RwLock::new(Some(token))),
        }
    }

    pub fn set(&self, token: SecretString) {
        // Option<SecretString> has no inconsistent intermediate state, so a poisoned lock is fine.
        *self.inner.write().unwrap_or_else(PoisonError::into_inner) = Some(token);
    }

    #[must_use]
    pub fn get(&self) -> Option<SecretString> {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    #[must_use]
    pub fn is_set(&self) -> bool {
        self.inner
            .read()
            .unwrap_or_else(PoisonError::into_inner)
            .is_some()
    }

    /// Returns the stored token or a [`crate::error::Kind::Configuration`] error.
    pub fn require(&self) -> Result<SecretString> {
        self.get().ok_or_else(Error::missing_token)
    }
}

/// `Bearer <token>`, the form listen.moe expects in the `Authorization` header and in the
/// gateway identify frame.
#[must_use]
pub fn bearer(token: &SecretString) -> String {
    format!("Bearer {}", token.expose_secret())
}

#[cfg(feature = "rest")]
pub(crate) fn authorization_header(token: &SecretString) -> Result<HeaderValue> {
    let mut value = HeaderValue::from_str(&bearer(token))?;
    value.set_sensitive(true);
    Ok(value)
}
