//! Authenticated user surface (profile, library, history, playback)
//!
//! Everything here requires a user-authorized token; an app-level token
//! is never accepted, so calls fail with
//! [`Error::UserTokenRequired`](crate::Error::UserTokenRequired) before
//! any request is sent when no user has authorized the client.

use crate::api::auth::TokenKind;
use crate::api::lookup::Lookup;
use crate::api::{ApiOutcome, QueryMap};
use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::*;
use reqwest::Method;
use tracing::debug;

impl SpotifyClient {
    /// Fetch the authorized user's private profile
    pub async fn current_user_profile(&self) -> Result<ApiOutcome<PrivateUser>> {
        debug!("Fetching current user profile");
        self.lookup_single(Lookup::CurrentUserProfile, None, QueryMap::new())
            .await
    }

    /// Fetch a user's public profile
    pub async fn get_user_profile(&self, user_id: &str) -> Result<ApiOutcome<PublicUser>> {
        debug!("Fetching profile of user {}", user_id);
        self.lookup_single(Lookup::UserProfile, Some(user_id), QueryMap::new())
            .await
    }

    /// Fetch one page of the user's saved albums
    pub async fn current_user_saved_albums(
        &self,
        market: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<SavedAlbum>>> {
        debug!("Fetching saved albums");
        let mut query = QueryMap::new();
        if let Some(market) = market {
            query.insert("market", market.to_string());
        }
        self.lookup_paged(Lookup::SavedAlbums, None, query, page)
            .await
    }

    /// Fetch one page of the user's saved tracks
    pub async fn current_user_saved_tracks(
        &self,
        market: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<SavedTrack>>> {
        debug!("Fetching saved tracks");
        let mut query = QueryMap::new();
        if let Some(market) = market {
            query.insert("market", market.to_string());
        }
        self.lookup_paged(Lookup::SavedTracks, None, query, page)
            .await
    }

    /// Save up to 50 tracks to the user's library
    pub async fn save_tracks(&self, ids: &[&str]) -> Result<ApiOutcome<()>> {
        debug!("Saving {} tracks", ids.len());
        let mut query = QueryMap::new();
        query.insert("ids", ids.join(","));
        let url = self.api_url("me/tracks", &query)?;
        self.send_api_empty(Method::PUT, url, None, TokenKind::UserAuthorized)
            .await
    }

    /// Remove up to 50 tracks from the user's library
    pub async fn remove_saved_tracks(&self, ids: &[&str]) -> Result<ApiOutcome<()>> {
        debug!("Removing {} saved tracks", ids.len());
        let mut query = QueryMap::new();
        query.insert("ids", ids.join(","));
        let url = self.api_url("me/tracks", &query)?;
        self.send_api_empty(Method::DELETE, url, None, TokenKind::UserAuthorized)
            .await
    }

    /// Fetch one page of the user's top artists
    pub async fn current_user_top_artists(
        &self,
        time_range: Option<TimeRange>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<Artist>>> {
        debug!("Fetching top artists");
        let mut query = QueryMap::new();
        if let Some(range) = time_range {
            query.insert("time_range", range.api_id().to_string());
        }
        self.lookup_paged(Lookup::TopArtists, None, query, page)
            .await
    }

    /// Fetch one page of the user's top tracks
    pub async fn current_user_top_tracks(
        &self,
        time_range: Option<TimeRange>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<Track>>> {
        debug!("Fetching top tracks");
        let mut query = QueryMap::new();
        if let Some(range) = time_range {
            query.insert("time_range", range.api_id().to_string());
        }
        self.lookup_paged(Lookup::TopTracks, None, query, page).await
    }

    /// Fetch one page of the artists the user follows
    pub async fn current_user_followed_artists(
        &self,
        cursor: &CursorParams,
    ) -> Result<ApiOutcome<CursorPaging<Artist>>> {
        debug!("Fetching followed artists");
        let mut query = QueryMap::new();
        query.insert("type", "artist".to_string());
        self.lookup_cursor_paged(Lookup::FollowedArtists, query, cursor)
            .await
    }

    /// Fetch one page of the user's play history
    ///
    /// Cursor markers are millisecond timestamps here; they remain opaque
    /// to the crate and are passed through untouched.
    pub async fn current_user_recently_played(
        &self,
        cursor: &CursorParams,
    ) -> Result<ApiOutcome<CursorPaging<PlayHistory>>> {
        debug!("Fetching recently played tracks");
        self.lookup_cursor_paged(Lookup::RecentlyPlayed, QueryMap::new(), cursor)
            .await
    }

    /// Start or resume playback on the user's active device
    ///
    /// `context_uri` plays a container (album, playlist, ...); `uris`
    /// plays an explicit track list; `offset` picks the starting item
    /// inside the context by position or by URI.
    pub async fn start_playback(
        &self,
        context_uri: Option<&str>,
        uris: Option<&[&str]>,
        offset: Option<PlayOffset>,
        position_ms: Option<u64>,
    ) -> Result<ApiOutcome<()>> {
        debug!("Starting playback");
        let mut body = serde_json::Map::new();
        if let Some(context_uri) = context_uri {
            body.insert("context_uri".to_string(), context_uri.into());
        }
        if let Some(uris) = uris {
            body.insert(
                "uris".to_string(),
                serde_json::Value::Array(uris.iter().map(|&u| u.into()).collect()),
            );
        }
        if let Some(offset) = offset {
            body.insert("offset".to_string(), offset.to_body());
        }
        if let Some(position_ms) = position_ms {
            body.insert("position_ms".to_string(), position_ms.into());
        }

        let url = self.api_url("me/player/play", &QueryMap::new())?;
        let body = serde_json::Value::Object(body);
        self.send_api_empty(Method::PUT, url, Some(&body), TokenKind::UserAuthorized)
            .await
    }

    /// Add an item to the user's playback queue
    pub async fn add_to_queue(&self, uri: &str) -> Result<ApiOutcome<()>> {
        debug!("Queueing {}", uri);
        let mut query = QueryMap::new();
        query.insert("uri", uri.to_string());
        let url = self.api_url("me/player/queue", &query)?;
        self.send_api_empty(Method::POST, url, None, TokenKind::UserAuthorized)
            .await
    }
}
