//! Example: Browse the Spotify catalog with app-level access
//!
//! Run with: cargo run -p pmospotify --example catalog_browse
//! Or with a search query: cargo run -p pmospotify --example catalog_browse -- "Miles Davis"
//!
//! Requires SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET in the environment.

use pmospotify::{PageDirection, PageParams, SearchType, SpotifyClient};
use std::env;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let query = env::args().nth(1).unwrap_or_else(|| "Miles Davis".to_string());

    let client = SpotifyClient::from_env()?;

    println!("Searching albums for '{}'...\n", query);
    let results = client
        .search(
            &query,
            &[SearchType::Album],
            None,
            PageParams::with_limit(5),
        )
        .await?
        .into_result()?;

    let Some(mut albums) = results.albums else {
        println!("No album results");
        return Ok(());
    };

    // Walk the first few pages using the server's own continuation links
    for _ in 0..3 {
        for album in &albums.items {
            let artists = album
                .artists
                .iter()
                .map(|a| a.name.as_str())
                .collect::<Vec<_>>()
                .join(", ");
            println!("  {} - {}", artists, album.name);
            if let Some(date) = &album.release_date {
                println!("      released {}", date);
            }
        }

        match client
            .page(&albums, PageDirection::Next)
            .await?
            .into_result()?
        {
            Some(next) => albums = next,
            None => break,
        }
    }

    Ok(())
}
