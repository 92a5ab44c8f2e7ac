//! listen.moe REST API client and types.
//!
//! **Feature flag:** `rest` (enabled by default)
//!
//! A thin request/response client: no retries, no pagination, no caching. The only state it
//! keeps is the login token, held in a [`crate::auth::TokenStore`] that can be shared with the
//! gateway session.
//!
//! ## Available Endpoints
//!
//! | Endpoint | Method | Token | Description |
//! |----------|--------|-------|-------------|
//! | `/api/login` | POST | no | Exchange username/password for a token |
//! | `/api/users/{name}` | GET | no | Public profile of `name` |
//! | `/api/users/@me` | GET | yes | Profile of the logged-in user |
//! | `/api/favorites/@me` | GET | yes | Favorited songs |
//! | `/api/favorites/{songId}` | POST / DELETE | yes | Add / remove a favorite |
//! | `/api/requests/{songId}` | POST | yes | Request a song on the stream |
//!
//! # Example
//!
//! ```no_run
//! use listen_moe_client::rest::Client;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let client = Client::default();
//! client.login("username", "password").await?;
//!
//! for favorite in client.favorites().await? {
//!     println!("{}: {}", favorite.id, favorite.title);
//! }
//! # Ok(())
//! # }
//! ```

pub mod client;
pub mod types;

pub use client::Client;
