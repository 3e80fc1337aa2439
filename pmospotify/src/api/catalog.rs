//! Catalog access (albums, artists, tracks, shows, playlists, search)
//!
//! Every method here is a thin wrapper: it assembles the optional query
//! parameters and hands the request to the descriptor-driven engine in
//! [`lookup`](super::lookup). All catalog endpoints work at the
//! app-token floor; no user authorization is involved.

use crate::api::lookup::Lookup;
use crate::api::{ApiOutcome, QueryMap};
use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::*;
use tracing::debug;

fn market_query(market: Option<&str>) -> QueryMap {
    let mut query = QueryMap::new();
    if let Some(market) = market {
        query.insert("market", market.to_string());
    }
    query
}

impl SpotifyClient {
    /// Fetch an album
    pub async fn get_album(&self, id: &str, market: Option<&str>) -> Result<ApiOutcome<Album>> {
        debug!("Fetching album {}", id);
        self.lookup_single(Lookup::Album, Some(id), market_query(market))
            .await
    }

    /// Fetch up to 20 albums in one request
    ///
    /// Unknown ids come back as `None` slots at their position; the
    /// result always has one slot per requested id.
    pub async fn get_albums(
        &self,
        ids: &[&str],
        market: Option<&str>,
    ) -> Result<ApiOutcome<Vec<Option<Album>>>> {
        debug!("Fetching {} albums", ids.len());
        self.lookup_batch(Lookup::Album, ids, market_query(market))
            .await
    }

    /// Fetch one page of an album's tracks
    pub async fn get_album_tracks(
        &self,
        id: &str,
        market: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<Track>>> {
        debug!("Fetching tracks for album {}", id);
        self.lookup_paged(Lookup::AlbumTracks, Some(id), market_query(market), page)
            .await
    }

    /// Fetch an artist
    pub async fn get_artist(&self, id: &str) -> Result<ApiOutcome<Artist>> {
        debug!("Fetching artist {}", id);
        self.lookup_single(Lookup::Artist, Some(id), QueryMap::new())
            .await
    }

    /// Fetch up to 50 artists in one request
    pub async fn get_artists(&self, ids: &[&str]) -> Result<ApiOutcome<Vec<Option<Artist>>>> {
        debug!("Fetching {} artists", ids.len());
        self.lookup_batch(Lookup::Artist, ids, QueryMap::new())
            .await
    }

    /// Fetch one page of an artist's discography
    ///
    /// `groups` filters by the artist's relationship to each album; an
    /// empty slice applies no filter.
    pub async fn get_artist_albums(
        &self,
        id: &str,
        groups: &[AlbumGroup],
        market: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<Album>>> {
        debug!("Fetching albums for artist {}", id);
        let mut query = market_query(market);
        if !groups.is_empty() {
            query.insert("include_groups", AlbumGroup::to_param(groups));
        }
        self.lookup_paged(Lookup::ArtistAlbums, Some(id), query, page)
            .await
    }

    /// Fetch an artist's top tracks in a market
    pub async fn get_artist_top_tracks(
        &self,
        id: &str,
        market: &str,
    ) -> Result<ApiOutcome<Vec<Track>>> {
        debug!("Fetching top tracks for artist {}", id);
        self.lookup_single(Lookup::ArtistTopTracks, Some(id), market_query(Some(market)))
            .await
    }

    /// Fetch artists related to an artist
    pub async fn get_related_artists(&self, id: &str) -> Result<ApiOutcome<Vec<Artist>>> {
        debug!("Fetching related artists for {}", id);
        self.lookup_single(Lookup::ArtistRelatedArtists, Some(id), QueryMap::new())
            .await
    }

    /// Fetch a track
    pub async fn get_track(&self, id: &str, market: Option<&str>) -> Result<ApiOutcome<Track>> {
        debug!("Fetching track {}", id);
        self.lookup_single(Lookup::Track, Some(id), market_query(market))
            .await
    }

    /// Fetch up to 50 tracks in one request
    pub async fn get_tracks(
        &self,
        ids: &[&str],
        market: Option<&str>,
    ) -> Result<ApiOutcome<Vec<Option<Track>>>> {
        debug!("Fetching {} tracks", ids.len());
        self.lookup_batch(Lookup::Track, ids, market_query(market))
            .await
    }

    /// Fetch a show
    pub async fn get_show(&self, id: &str, market: Option<&str>) -> Result<ApiOutcome<Show>> {
        debug!("Fetching show {}", id);
        self.lookup_single(Lookup::Show, Some(id), market_query(market))
            .await
    }

    /// Fetch an episode
    pub async fn get_episode(&self, id: &str, market: Option<&str>) -> Result<ApiOutcome<Episode>> {
        debug!("Fetching episode {}", id);
        self.lookup_single(Lookup::Episode, Some(id), market_query(market))
            .await
    }

    /// Fetch a playlist
    ///
    /// `fields` is the service's field-filter expression, passed through
    /// untouched.
    pub async fn get_playlist(
        &self,
        id: &str,
        market: Option<&str>,
        fields: Option<&str>,
    ) -> Result<ApiOutcome<Playlist>> {
        debug!("Fetching playlist {}", id);
        let mut query = market_query(market);
        if let Some(fields) = fields {
            query.insert("fields", fields.to_string());
        }
        self.lookup_single(Lookup::Playlist, Some(id), query).await
    }

    /// Fetch one page of a playlist's entries
    ///
    /// Entries mix tracks and episodes; see [`PlayableItem`].
    pub async fn get_playlist_items(
        &self,
        id: &str,
        market: Option<&str>,
        fields: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<PlaylistItem>>> {
        debug!("Fetching items for playlist {}", id);
        let mut query = market_query(market);
        if let Some(fields) = fields {
            query.insert("fields", fields.to_string());
        }
        self.lookup_paged(Lookup::PlaylistItems, Some(id), query, page)
            .await
    }

    /// Fetch one page of new album releases
    pub async fn get_new_releases(
        &self,
        country: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<Album>>> {
        debug!("Fetching new releases");
        let mut query = QueryMap::new();
        if let Some(country) = country {
            query.insert("country", country.to_string());
        }
        self.lookup_paged(Lookup::NewReleases, None, query, page)
            .await
    }

    /// Search the catalog
    ///
    /// Results carry one paging per requested type; navigate them with
    /// [`page`](SpotifyClient::page).
    pub async fn search(
        &self,
        query_string: &str,
        types: &[SearchType],
        market: Option<&str>,
        page: PageParams,
    ) -> Result<ApiOutcome<SearchResults>> {
        debug!("Searching for '{}'", query_string);
        let mut query = QueryMap::new();
        query.insert("q", query_string.to_string());
        query.insert("type", SearchType::to_param(types));
        if let Some(market) = market {
            query.insert("market", market.to_string());
        }
        crate::api::lookup::apply_page_params(&mut query, page);
        let outcome = self
            .lookup_single::<SearchResults>(Lookup::Search, None, query)
            .await?;

        // Continuation links of search pages answer with the same
        // per-type envelope as the search response itself
        Ok(outcome.map(|mut results| {
            if let Some(paging) = results.albums.as_mut() {
                paging.envelope = Some("albums");
            }
            if let Some(paging) = results.artists.as_mut() {
                paging.envelope = Some("artists");
            }
            if let Some(paging) = results.tracks.as_mut() {
                paging.envelope = Some("tracks");
            }
            if let Some(paging) = results.playlists.as_mut() {
                paging.envelope = Some("playlists");
            }
            if let Some(paging) = results.shows.as_mut() {
                paging.envelope = Some("shows");
            }
            if let Some(paging) = results.episodes.as_mut() {
                paging.envelope = Some("episodes");
            }
            results
        }))
    }
}
