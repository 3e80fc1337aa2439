//! Lookup descriptors and the generic request engine
//!
//! [`Lookup`] is the closed taxonomy of resource kinds the crate can
//! fetch. Each kind resolves to a [`LookupDescriptor`]: its canonical
//! dotted key (from which the REST path is derived), the request shapes it
//! supports, the token capability it needs, and the JSON envelope key the
//! service wraps its payload in, when it does. The engine methods below
//! consume descriptors; endpoint wrappers in [`catalog`](super::catalog)
//! and [`user`](super::user) never spell out paths or envelopes
//! themselves.

use crate::api::auth::TokenKind;
use crate::api::{ApiOutcome, QueryMap};
use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::{CursorPaging, CursorParams, PageParams, Paging};
use reqwest::Method;
use serde::de::DeserializeOwned;

/// Request shapes a lookup kind can be issued with
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum LookupShape {
    /// One resource by id (or a fixed singleton like the user profile)
    Single,
    /// Several resources by a comma-joined id list
    Batch,
    /// An offset-paged collection
    Paged,
    /// A cursor-paged collection
    CursorPaged,
}

/// Resolved request recipe for one lookup kind
#[derive(Debug, Clone, Copy)]
pub(crate) struct LookupDescriptor {
    /// Canonical dotted key; segments become path segments, with the id
    /// (when present) inserted after the first
    pub key: &'static str,
    /// Token capability required by the endpoint
    pub token: TokenKind,
    /// JSON key the payload is nested under, when the service wraps it
    pub envelope: Option<&'static str>,
    /// Shapes this kind supports
    pub supports: &'static [LookupShape],
}

impl LookupDescriptor {
    /// Resolve the REST path for this kind
    ///
    /// `albums` + id → `albums/{id}`; `artists.albums` + id →
    /// `artists/{id}/albums`; keys without an id keep their segments
    /// in order (`me.top.artists` → `me/top/artists`).
    pub fn resolve_path(&self, id: Option<&str>) -> String {
        let mut segments = self.key.split('.');
        let first = segments.next().unwrap_or_default();

        let mut path = String::from(first);
        if let Some(id) = id {
            path.push('/');
            path.push_str(id);
        }
        for segment in segments {
            path.push('/');
            path.push_str(segment);
        }
        path
    }
}

/// The closed taxonomy of resource kinds
///
/// This is the single source of truth for endpoint paths, required token
/// capabilities and response envelopes; call sites must not duplicate any
/// of it.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) enum Lookup {
    /// An album (single or batch)
    Album,
    /// An album's tracks (paged)
    AlbumTracks,
    /// An artist (single or batch)
    Artist,
    /// An artist's discography (paged)
    ArtistAlbums,
    /// An artist's top tracks (list)
    ArtistTopTracks,
    /// Artists related to an artist (list)
    ArtistRelatedArtists,
    /// A track (single or batch)
    Track,
    /// A show (single)
    Show,
    /// An episode (single)
    Episode,
    /// A playlist (single)
    Playlist,
    /// A playlist's entries (paged)
    PlaylistItems,
    /// New album releases (paged, enveloped)
    NewReleases,
    /// Catalog search (single result object)
    Search,
    /// The authorized user's profile
    CurrentUserProfile,
    /// A public user profile
    UserProfile,
    /// The authorized user's saved albums (paged)
    SavedAlbums,
    /// The authorized user's saved tracks (paged)
    SavedTracks,
    /// The authorized user's top artists (paged)
    TopArtists,
    /// The authorized user's top tracks (paged)
    TopTracks,
    /// Artists the authorized user follows (cursor-paged, enveloped)
    FollowedArtists,
    /// The authorized user's play history (cursor-paged)
    RecentlyPlayed,
}

impl Lookup {
    /// The descriptor for this kind
    pub(crate) fn descriptor(self) -> LookupDescriptor {
        use LookupShape::*;
        use TokenKind::*;

        match self {
            Lookup::Album => LookupDescriptor {
                key: "albums",
                token: AccessOnly,
                envelope: Some("albums"),
                supports: &[Single, Batch],
            },
            Lookup::AlbumTracks => LookupDescriptor {
                key: "albums.tracks",
                token: AccessOnly,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::Artist => LookupDescriptor {
                key: "artists",
                token: AccessOnly,
                envelope: Some("artists"),
                supports: &[Single, Batch],
            },
            Lookup::ArtistAlbums => LookupDescriptor {
                key: "artists.albums",
                token: AccessOnly,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::ArtistTopTracks => LookupDescriptor {
                key: "artists.top-tracks",
                token: AccessOnly,
                envelope: Some("tracks"),
                supports: &[Single],
            },
            Lookup::ArtistRelatedArtists => LookupDescriptor {
                key: "artists.related-artists",
                token: AccessOnly,
                envelope: Some("artists"),
                supports: &[Single],
            },
            Lookup::Track => LookupDescriptor {
                key: "tracks",
                token: AccessOnly,
                envelope: Some("tracks"),
                supports: &[Single, Batch],
            },
            Lookup::Show => LookupDescriptor {
                key: "shows",
                token: AccessOnly,
                envelope: None,
                supports: &[Single],
            },
            Lookup::Episode => LookupDescriptor {
                key: "episodes",
                token: AccessOnly,
                envelope: None,
                supports: &[Single],
            },
            Lookup::Playlist => LookupDescriptor {
                key: "playlists",
                token: AccessOnly,
                envelope: None,
                supports: &[Single],
            },
            Lookup::PlaylistItems => LookupDescriptor {
                key: "playlists.tracks",
                token: AccessOnly,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::NewReleases => LookupDescriptor {
                key: "browse.new-releases",
                token: AccessOnly,
                envelope: Some("albums"),
                supports: &[Paged],
            },
            Lookup::Search => LookupDescriptor {
                key: "search",
                token: AccessOnly,
                envelope: None,
                supports: &[Single],
            },
            Lookup::CurrentUserProfile => LookupDescriptor {
                key: "me",
                token: UserAuthorized,
                envelope: None,
                supports: &[Single],
            },
            Lookup::UserProfile => LookupDescriptor {
                key: "users",
                token: AccessOnly,
                envelope: None,
                supports: &[Single],
            },
            Lookup::SavedAlbums => LookupDescriptor {
                key: "me.albums",
                token: UserAuthorized,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::SavedTracks => LookupDescriptor {
                key: "me.tracks",
                token: UserAuthorized,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::TopArtists => LookupDescriptor {
                key: "me.top.artists",
                token: UserAuthorized,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::TopTracks => LookupDescriptor {
                key: "me.top.tracks",
                token: UserAuthorized,
                envelope: None,
                supports: &[Paged],
            },
            Lookup::FollowedArtists => LookupDescriptor {
                key: "me.following",
                token: UserAuthorized,
                envelope: Some("artists"),
                supports: &[CursorPaged],
            },
            Lookup::RecentlyPlayed => LookupDescriptor {
                key: "me.player.recently-played",
                token: UserAuthorized,
                envelope: None,
                supports: &[CursorPaged],
            },
        }
    }
}

/// Unwrap the descriptor's envelope key and decode the payload
pub(crate) fn decode_payload<T: DeserializeOwned>(
    mut value: serde_json::Value,
    envelope: Option<&str>,
) -> Result<T> {
    let payload = match envelope {
        Some(key) => value
            .get_mut(key)
            .map(serde_json::Value::take)
            .unwrap_or(serde_json::Value::Null),
        None => value,
    };
    Ok(serde_json::from_value(payload)?)
}

/// Append offset-paging parameters to a query map
pub(crate) fn apply_page_params(query: &mut QueryMap, page: PageParams) {
    if let Some(limit) = page.limit {
        query.insert("limit", limit.to_string());
    }
    if let Some(offset) = page.offset {
        query.insert("offset", offset.to_string());
    }
}

/// Append cursor-paging parameters to a query map
pub(crate) fn apply_cursor_params(query: &mut QueryMap, cursor: &CursorParams) {
    if let Some(limit) = cursor.limit {
        query.insert("limit", limit.to_string());
    }
    if let Some(after) = &cursor.after {
        query.insert("after", after.clone());
    }
    if let Some(before) = &cursor.before {
        query.insert("before", before.clone());
    }
}

impl SpotifyClient {
    /// Fetch a single resource (or singleton collection) by descriptor
    pub(crate) async fn lookup_single<T: DeserializeOwned>(
        &self,
        lookup: Lookup,
        id: Option<&str>,
        query: QueryMap,
    ) -> Result<ApiOutcome<T>> {
        let descriptor = lookup.descriptor();
        debug_assert!(
            descriptor.supports.contains(&LookupShape::Single),
            "{:?} does not support single lookups",
            lookup
        );

        let url = self.api_url(&descriptor.resolve_path(id), &query)?;
        let outcome = self
            .send_api::<serde_json::Value>(Method::GET, url, None, descriptor.token)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => Ok(ApiOutcome::Success(decode_payload(
                value,
                descriptor.envelope,
            )?)),
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }

    /// Fetch several resources in one request by a comma-joined id list
    ///
    /// The decoded list preserves the id count: ids the service does not
    /// know come back as `None` slots, never as a shorter list. Batch
    /// size limits (20, 50 or 100 depending on the resource kind) are a
    /// caller contract; the engine does not enforce them.
    pub(crate) async fn lookup_batch<T: DeserializeOwned>(
        &self,
        lookup: Lookup,
        ids: &[&str],
        mut query: QueryMap,
    ) -> Result<ApiOutcome<Vec<Option<T>>>> {
        let descriptor = lookup.descriptor();
        debug_assert!(
            descriptor.supports.contains(&LookupShape::Batch),
            "{:?} does not support batch lookups",
            lookup
        );

        query.insert("ids", ids.join(","));

        let url = self.api_url(&descriptor.resolve_path(None), &query)?;
        let outcome = self
            .send_api::<serde_json::Value>(Method::GET, url, None, descriptor.token)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => Ok(ApiOutcome::Success(decode_payload(
                value,
                descriptor.envelope,
            )?)),
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }

    /// Fetch one page of an offset-paged collection
    ///
    /// The returned [`Paging`] is stamped with the descriptor's token
    /// capability so that navigation re-authenticates at the same level.
    pub(crate) async fn lookup_paged<T: DeserializeOwned>(
        &self,
        lookup: Lookup,
        id: Option<&str>,
        mut query: QueryMap,
        page: PageParams,
    ) -> Result<ApiOutcome<Paging<T>>> {
        let descriptor = lookup.descriptor();
        debug_assert!(
            descriptor.supports.contains(&LookupShape::Paged),
            "{:?} does not support offset paging",
            lookup
        );

        apply_page_params(&mut query, page);

        let url = self.api_url(&descriptor.resolve_path(id), &query)?;
        let outcome = self
            .send_api::<serde_json::Value>(Method::GET, url, None, descriptor.token)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => {
                let mut paging: Paging<T> = decode_payload(value, descriptor.envelope)?;
                paging.token_kind = descriptor.token;
                paging.envelope = descriptor.envelope;
                Ok(ApiOutcome::Success(paging))
            }
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }

    /// Fetch one page of a cursor-paged collection
    pub(crate) async fn lookup_cursor_paged<T: DeserializeOwned>(
        &self,
        lookup: Lookup,
        mut query: QueryMap,
        cursor: &CursorParams,
    ) -> Result<ApiOutcome<CursorPaging<T>>> {
        let descriptor = lookup.descriptor();
        debug_assert!(
            descriptor.supports.contains(&LookupShape::CursorPaged),
            "{:?} does not support cursor paging",
            lookup
        );

        apply_cursor_params(&mut query, cursor);

        let url = self.api_url(&descriptor.resolve_path(None), &query)?;
        let outcome = self
            .send_api::<serde_json::Value>(Method::GET, url, None, descriptor.token)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => {
                let mut paging: CursorPaging<T> = decode_payload(value, descriptor.envelope)?;
                paging.token_kind = descriptor.token;
                paging.envelope = descriptor.envelope;
                Ok(ApiOutcome::Success(paging))
            }
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_single_segment_paths() {
        let descriptor = Lookup::Album.descriptor();
        assert_eq!(descriptor.resolve_path(Some("4aawyAB9vmqN3uQ7FjRGTy")), "albums/4aawyAB9vmqN3uQ7FjRGTy");
        assert_eq!(descriptor.resolve_path(None), "albums");
    }

    #[test]
    fn test_multi_segment_paths() {
        assert_eq!(
            Lookup::ArtistAlbums
                .descriptor()
                .resolve_path(Some("0OdUWJ0sBjDrqHygGUXeCF")),
            "artists/0OdUWJ0sBjDrqHygGUXeCF/albums"
        );
        assert_eq!(
            Lookup::TopArtists.descriptor().resolve_path(None),
            "me/top/artists"
        );
        assert_eq!(
            Lookup::RecentlyPlayed.descriptor().resolve_path(None),
            "me/player/recently-played"
        );
        assert_eq!(
            Lookup::NewReleases.descriptor().resolve_path(None),
            "browse/new-releases"
        );
    }

    #[test]
    fn test_descriptor_token_levels() {
        assert_eq!(Lookup::Album.descriptor().token, TokenKind::AccessOnly);
        assert_eq!(
            Lookup::SavedAlbums.descriptor().token,
            TokenKind::UserAuthorized
        );
        assert_eq!(
            Lookup::FollowedArtists.descriptor().token,
            TokenKind::UserAuthorized
        );
    }

    #[test]
    fn test_decode_payload_envelope() {
        let value = serde_json::json!({ "tracks": [1, 2, 3] });
        let decoded: Vec<u32> = decode_payload(value, Some("tracks")).unwrap();
        assert_eq!(decoded, vec![1, 2, 3]);

        let value = serde_json::json!([4, 5]);
        let decoded: Vec<u32> = decode_payload(value, None).unwrap();
        assert_eq!(decoded, vec![4, 5]);
    }

    #[test]
    fn test_decode_payload_null_slots() {
        let value = serde_json::json!({ "albums": [{"id": "a", "name": "A"}, null] });
        let decoded: Vec<Option<crate::models::Album>> =
            decode_payload(value, Some("albums")).unwrap();
        assert_eq!(decoded.len(), 2);
        assert!(decoded[0].is_some());
        assert!(decoded[1].is_none());
    }

    #[test]
    fn test_apply_page_params() {
        let mut query = QueryMap::new();
        apply_page_params(&mut query, PageParams::default());
        assert!(query.is_empty());

        apply_page_params(
            &mut query,
            PageParams {
                limit: Some(10),
                offset: Some(40),
            },
        );
        assert_eq!(query.get("limit").map(String::as_str), Some("10"));
        assert_eq!(query.get("offset").map(String::as_str), Some("40"));
    }
}
