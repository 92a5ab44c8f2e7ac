//! Print every song the station starts playing.
//!
//! Optionally logs in first so the gateway identifies the user:
//! ```sh
//! RUST_LOG=info,listen_moe_client=debug cargo run --example now_playing
//! LISTEN_USERNAME=kana LISTEN_PASSWORD=... LISTEN_LIBRARY=kpop cargo run --example now_playing
//! ```

use listen_moe_client::ws::{Disconnect, Event};
use listen_moe_client::{Client, Config, Library};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;
use tracing_subscriber::layer::SubscriberExt as _;
use tracing_subscriber::util::SubscriberInitExt as _;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::registry()
        .with(EnvFilter::from_default_env())
        .with(tracing_subscriber::fmt::layer())
        .init();

    let library = match std::env::var("LISTEN_LIBRARY").as_deref() {
        Ok("kpop") => Library::Kpop,
        _ => Library::Jpop,
    };
    let client = Client::new(Config::builder().library(library).build())?;

    if let (Ok(username), Ok(password)) = (
        std::env::var("LISTEN_USERNAME"),
        std::env::var("LISTEN_PASSWORD"),
    ) {
        client.login(&username, &password).await?;
        let me = client.profile(None).await?;
        info!(username = %me.username, "logged in");
    }

    client.register_handler(|event: Event| async move {
        match event {
            Event::SongUpdate(song) => {
                let artists = song
                    .artists
                    .iter()
                    .filter_map(|artist| artist.name.as_deref())
                    .collect::<Vec<_>>()
                    .join(", ");
                let source = song
                    .sources
                    .first()
                    .and_then(|source| source.romanized_name.as_deref().or(source.name.as_deref()));

                info!(title = %song.title, %artists, ?source, "now playing");
            }
            other => info!(?other, "gateway event"),
        }
    });

    info!(%library, "connecting");
    match client.run().await? {
        Disconnect::Closed { code, reason } => warn!(?code, %reason, "gateway closed"),
        other => warn!(?other, "gateway disconnected"),
    }

    Ok(())
}
