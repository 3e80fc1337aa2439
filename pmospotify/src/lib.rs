//! # pmospotify - Spotify client for PMOMusic
//!
//! This crate provides a Rust client for the Spotify Web API: transparent
//! token management across the four OAuth flows the service supports,
//! typed access to the catalog and to the authorized user's library, and
//! navigation over the API's paged and cursor-paged collections.
//!
//! ## Overview
//!
//! - Client-credentials, authorization-code, authorization-code-with-PKCE
//!   and implicit-grant authentication, with cached tokens renewed
//!   silently when a refresh token is available
//! - Catalog lookups (albums, artists, tracks, shows, episodes,
//!   playlists, search, new releases), single or batched
//! - Authenticated user surface (profile, library, follows, play
//!   history, playback control)
//! - Forward/backward page navigation that dereferences the server's own
//!   continuation links
//!
//! ## Architecture
//!
//! ```text
//! pmospotify/
//! ├── src/
//! │   ├── lib.rs              # Crate root (this file)
//! │   ├── client.rs           # SpotifyClient handle + builder
//! │   ├── models.rs           # Data structures (Album, Track, Paging, ...)
//! │   ├── api/
//! │   │   ├── mod.rs          # Transport and error-envelope handling
//! │   │   ├── auth.rs         # Token model + authentication cache
//! │   │   ├── oauth.rs        # Authorization URLs, redirects, PKCE
//! │   │   ├── lookup.rs       # Lookup descriptors + request engine
//! │   │   ├── paging.rs       # Page navigation
//! │   │   ├── catalog.rs      # Catalog endpoints
//! │   │   └── user.rs         # Authenticated user endpoints
//! │   └── error.rs            # Error types
//! ```
//!
//! ## Usage
//!
//! ### App-level access
//!
//! ```rust,no_run
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotifyClient::from_env()?;
//!
//!     // The client-credentials token is acquired on first use
//!     let artist = client.get_artist("0OdUWJ0sBjDrqHygGUXeCF").await?.into_result()?;
//!     println!("{}", artist.name);
//!
//!     Ok(())
//! }
//! ```
//!
//! ### User authorization (authorization code with PKCE)
//!
//! ```rust,no_run
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let client = SpotifyClient::from_env()?;
//!
//!     let (url, context) = client.authorization_code_pkce_request(
//!         "http://localhost:8888/callback",
//!         &["user-library-read", "user-top-read"],
//!         false,
//!     )?;
//!     println!("Open {url} and authorize, then paste the redirect URL:");
//!
//!     let mut response_uri = String::new();
//!     std::io::stdin().read_line(&mut response_uri)?;
//!     client.complete_authorization_code(&context, response_uri.trim()).await?;
//!
//!     let saved = client
//!         .current_user_saved_albums(None, Default::default())
//!         .await?
//!         .into_result()?;
//!     println!("{} saved albums", saved.total.unwrap_or(0));
//!
//!     Ok(())
//! }
//! ```
//!
//! ### Pagination
//!
//! ```rust,no_run
//! use pmospotify::{PageDirection, SpotifyClient};
//!
//! # async fn example(client: &SpotifyClient) -> anyhow::Result<()> {
//! let mut page = client
//!     .get_album_tracks("4aawyAB9vmqN3uQ7FjRGTy", None, Default::default())
//!     .await?
//!     .into_result()?;
//!
//! loop {
//!     for track in &page.items {
//!         println!("{}", track.name);
//!     }
//!     match client.page(&page, PageDirection::Next).await?.into_result()? {
//!         Some(next) => page = next,
//!         None => break,
//!     }
//! }
//! # Ok(())
//! # }
//! ```
//!
//! ## Error handling
//!
//! The service reports request-level failures inside the response body;
//! those come back as data in [`ApiOutcome`] so that callers can tell an
//! empty result from a rejected request. Token-lifecycle problems
//! ([`Error::UserTokenRequired`], [`Error::AccessTokenRequired`]) and
//! redirect-validation problems are raised as errors; match on the
//! variants, not on messages.
//!
//! ```rust,ignore
//! match client.current_user_profile().await {
//!     Ok(outcome) => match outcome.success() {
//!         Some(profile) => println!("{}", profile.id),
//!         None => println!("request rejected by the service"),
//!     },
//!     Err(Error::UserTokenRequired) => println!("authorize first"),
//!     Err(e) => println!("error: {}", e),
//! }
//! ```

pub mod api;
pub mod client;
pub mod error;
pub mod models;

pub use api::ApiOutcome;
pub use api::auth::{Token, TokenCache, TokenKind};
pub use api::oauth::AuthorizationRequestContext;
pub use api::paging::PageDirection;
pub use client::{ClientBuilder, SpotifyClient};
pub use error::{Error, Result};
pub use models::{
    Album, AlbumGroup, Artist, CursorPaging, CursorParams, Episode, ErrorObject, PageParams,
    Paging, PlayHistory, PlayOffset, PlayableItem, Playlist, PlaylistItem, PrivateUser,
    PublicUser, SavedAlbum, SavedTrack, SearchResults, SearchType, Show, TimeRange, Track,
};
