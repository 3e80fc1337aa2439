//! Example: Authorize a user with the authorization-code + PKCE flow
//!
//! Run with: cargo run -p pmospotify --example authorization_code
//!
//! Requires SPOTIFY_CLIENT_ID and SPOTIFY_CLIENT_SECRET in the environment,
//! and http://localhost:8888/callback registered as a redirect URI for the
//! application.

use pmospotify::{PageParams, SpotifyClient, TimeRange};
use std::io::{self, BufRead, Write};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // Initialize logging
    tracing_subscriber::fmt::init();

    let client = SpotifyClient::from_env()?;

    let (url, context) = client.authorization_code_pkce_request(
        "http://localhost:8888/callback",
        &["user-library-read", "user-top-read", "user-read-private"],
        false,
    )?;

    println!("Open this URL in a browser and authorize the application:\n");
    println!("  {}\n", url);
    print!("Paste the URL you were redirected to: ");
    io::stdout().flush()?;

    let mut response_uri = String::new();
    io::stdin().lock().read_line(&mut response_uri)?;

    let token = client
        .complete_authorization_code(&context, response_uri.trim())
        .await?;
    println!("\nAuthorized (scopes: {})\n", token.scope.as_deref().unwrap_or("none"));

    let profile = client.current_user_profile().await?.into_result()?;
    println!(
        "Logged in as {} ({})",
        profile.display_name.as_deref().unwrap_or(&profile.id),
        profile.product.as_deref().unwrap_or("unknown plan")
    );

    println!("\nYour top artists over the last six months:");
    let top = client
        .current_user_top_artists(Some(TimeRange::MediumTerm), PageParams::with_limit(10))
        .await?
        .into_result()?;
    for (i, artist) in top.items.iter().enumerate() {
        println!("  {}. {}", i + 1, artist.name);
    }

    Ok(())
}
