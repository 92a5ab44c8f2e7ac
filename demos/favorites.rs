//! List, add, and remove favorites over the REST API.
//!
//! ```sh
//! LISTEN_USERNAME=kana LISTEN_PASSWORD=... RUST_LOG=info cargo run --example favorites -- 1234
//! ```

use listen_moe_client::rest::Client;
use tracing::{error, info};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let username = std::env::var("LISTEN_USERNAME")?;
    let password = std::env::var("LISTEN_PASSWORD")?;
    let song_id = std::env::args().nth(1).map(|id| id.parse()).transpose()?;

    let client = Client::default();
    client.login(&username, &password).await?;

    match client.favorites().await {
        Ok(favorites) => {
            info!(count = favorites.len(), "favorites");
            for favorite in &favorites {
                info!(id = favorite.id, title = %favorite.title);
            }
        }
        Err(e) => error!(error = %e, "unable to list favorites"),
    }

    if let Some(song_id) = song_id {
        client.set_favorite(song_id, false).await?;
        info!(song_id, "favorited");

        client.set_favorite(song_id, true).await?;
        info!(song_id, "unfavorited");
    }

    Ok(())
}
