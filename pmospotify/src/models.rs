//! Data structures representing Spotify Web API objects
//!
//! Models are lenient on deserialization: apart from identifiers and names,
//! fields the API may omit (or that differ between the "simplified" and
//! "full" representations of the same object) are optional with defaults.

use crate::api::auth::TokenKind;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Error object carried in the API's `error` envelope
///
/// Every non-2xx response from the service is expected to carry
/// `{"error": {"status": ..., "message": ...}}` instead of the payload.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct ErrorObject {
    /// HTTP status code reported by the service
    pub status: u16,
    /// Human-readable message
    #[serde(default)]
    pub message: String,
}

/// Cover or profile image
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Image {
    /// Image URL
    pub url: String,
    /// Width in pixels, if known
    #[serde(default)]
    pub width: Option<u32>,
    /// Height in pixels, if known
    #[serde(default)]
    pub height: Option<u32>,
}

/// An artist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Artist {
    /// Spotify ID of the artist
    pub id: String,
    /// Artist name
    pub name: String,
    /// Spotify URI (`spotify:artist:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Genres (full object only)
    #[serde(default)]
    pub genres: Vec<String>,
    /// Artist images (full object only)
    #[serde(default)]
    pub images: Vec<Image>,
    /// Popularity 0-100 (full object only)
    #[serde(default)]
    pub popularity: Option<u32>,
}

/// An album
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Album {
    /// Spotify ID of the album
    pub id: String,
    /// Album title
    pub name: String,
    /// Spotify URI (`spotify:album:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Album type: "album", "single" or "compilation"
    #[serde(default)]
    pub album_type: Option<String>,
    /// Relationship to the queried artist ("album", "appears_on", ...),
    /// only present under an artist's discography
    #[serde(default)]
    pub album_group: Option<String>,
    /// Credited artists
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Release date (precision varies: "1981", "1981-12", "1981-12-15")
    #[serde(default)]
    pub release_date: Option<String>,
    /// Number of tracks
    #[serde(default)]
    pub total_tracks: Option<u32>,
    /// Cover art
    #[serde(default)]
    pub images: Vec<Image>,
    /// Record label (full object only)
    #[serde(default)]
    pub label: Option<String>,
    /// Popularity 0-100 (full object only)
    #[serde(default)]
    pub popularity: Option<u32>,
    /// First page of tracks (full object only)
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,
}

/// A track
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Track {
    /// Spotify ID of the track
    pub id: String,
    /// Track title
    pub name: String,
    /// Spotify URI (`spotify:track:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Credited artists
    #[serde(default)]
    pub artists: Vec<Artist>,
    /// Containing album (absent in album-nested track listings)
    #[serde(default)]
    pub album: Option<Album>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Track number on its disc
    #[serde(default)]
    pub track_number: Option<u32>,
    /// Disc number (multi-disc albums)
    #[serde(default)]
    pub disc_number: Option<u32>,
    /// Explicit-lyrics flag
    #[serde(default)]
    pub explicit: bool,
    /// Popularity 0-100 (full object only)
    #[serde(default)]
    pub popularity: Option<u32>,
    /// Whether the track is playable in the requesting market
    #[serde(default)]
    pub is_playable: Option<bool>,
}

/// A podcast show
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Show {
    /// Spotify ID of the show
    pub id: String,
    /// Show name
    pub name: String,
    /// Spotify URI (`spotify:show:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Publisher name
    #[serde(default)]
    pub publisher: Option<String>,
    /// Show description
    #[serde(default)]
    pub description: Option<String>,
    /// Total number of episodes
    #[serde(default)]
    pub total_episodes: Option<u32>,
    /// Show images
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A podcast episode
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Episode {
    /// Spotify ID of the episode
    pub id: String,
    /// Episode name
    pub name: String,
    /// Spotify URI (`spotify:episode:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Episode description
    #[serde(default)]
    pub description: Option<String>,
    /// Duration in milliseconds
    #[serde(default)]
    pub duration_ms: Option<u64>,
    /// Release date
    #[serde(default)]
    pub release_date: Option<String>,
    /// Containing show (full object only)
    #[serde(default)]
    pub show: Option<Show>,
    /// Episode images
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A track or an episode, discriminated by the wire `type` field
///
/// Playlist entries and the playback queue mix tracks and episodes; the
/// API tags each object with `"type": "track"` or `"type": "episode"`.
/// The tag is inspected exactly once during deserialization to pick the
/// matching variant.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum PlayableItem {
    /// A music track
    Track(Track),
    /// A podcast episode
    Episode(Episode),
}

impl PlayableItem {
    /// Spotify ID of the underlying item
    pub fn id(&self) -> &str {
        match self {
            PlayableItem::Track(t) => &t.id,
            PlayableItem::Episode(e) => &e.id,
        }
    }

    /// Display name of the underlying item
    pub fn name(&self) -> &str {
        match self {
            PlayableItem::Track(t) => &t.name,
            PlayableItem::Episode(e) => &e.name,
        }
    }
}

/// Public user profile
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PublicUser {
    /// Spotify user ID
    pub id: String,
    /// Display name, if the user set one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Spotify URI (`spotify:user:...`)
    #[serde(default)]
    pub uri: Option<String>,
}

/// Private profile of the authorized user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PrivateUser {
    /// Spotify user ID
    pub id: String,
    /// Display name, if the user set one
    #[serde(default)]
    pub display_name: Option<String>,
    /// Email address (requires the `user-read-email` scope)
    #[serde(default)]
    pub email: Option<String>,
    /// Country code (requires the `user-read-private` scope)
    #[serde(default)]
    pub country: Option<String>,
    /// Subscription level ("premium", "free", ...)
    #[serde(default)]
    pub product: Option<String>,
    /// Profile images
    #[serde(default)]
    pub images: Vec<Image>,
}

/// A playlist
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Playlist {
    /// Spotify ID of the playlist
    pub id: String,
    /// Playlist name
    pub name: String,
    /// Spotify URI (`spotify:playlist:...`)
    #[serde(default)]
    pub uri: Option<String>,
    /// Playlist description
    #[serde(default)]
    pub description: Option<String>,
    /// Owning user
    #[serde(default)]
    pub owner: Option<PublicUser>,
    /// Public visibility, if known
    #[serde(default)]
    pub public: Option<bool>,
    /// Collaborative flag
    #[serde(default)]
    pub collaborative: bool,
    /// Version identifier for concurrent modification
    #[serde(default)]
    pub snapshot_id: Option<String>,
    /// Playlist images
    #[serde(default)]
    pub images: Vec<Image>,
    /// First page of entries (full object only)
    #[serde(default)]
    pub tracks: Option<Paging<PlaylistItem>>,
}

/// One playlist entry
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlaylistItem {
    /// When the entry was added
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// Who added the entry
    #[serde(default)]
    pub added_by: Option<PublicUser>,
    /// Whether the entry is a local file
    #[serde(default)]
    pub is_local: bool,
    /// The playable item; `null` for items no longer available
    #[serde(default)]
    pub track: Option<PlayableItem>,
}

/// A saved-album entry from the user's library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedAlbum {
    /// When the album was saved
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// The album
    pub album: Album,
}

/// A saved-track entry from the user's library
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SavedTrack {
    /// When the track was saved
    #[serde(default)]
    pub added_at: Option<DateTime<Utc>>,
    /// The track
    pub track: Track,
}

/// Playback context a track was played from
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Context {
    /// Spotify URI of the context (playlist, album, ...)
    pub uri: String,
    /// Context kind reported by the API
    #[serde(default, rename = "type")]
    pub kind: Option<String>,
}

/// One entry of the recently-played history
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PlayHistory {
    /// The track that was played
    pub track: Track,
    /// When the track was played
    pub played_at: DateTime<Utc>,
    /// Context it was played from
    #[serde(default)]
    pub context: Option<Context>,
}

/// Offset-based paging wrapper
///
/// `next`/`previous`, when present, are server-supplied absolute URLs that
/// must be dereferenced verbatim: they preserve query and filter state the
/// offset/limit fields alone do not encode. See
/// [`SpotifyClient::page`](crate::SpotifyClient::page).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Paging<T> {
    /// URL of this page
    pub href: String,
    /// Items of this page
    pub items: Vec<T>,
    /// Page size
    #[serde(default)]
    pub limit: Option<u32>,
    /// Offset of this page
    #[serde(default)]
    pub offset: Option<u32>,
    /// Total number of items in the collection
    #[serde(default)]
    pub total: Option<u32>,
    /// URL of the next page, absent on the last page
    #[serde(default)]
    pub next: Option<String>,
    /// URL of the previous page, absent on the first page
    #[serde(default)]
    pub previous: Option<String>,
    /// Token capability the page was fetched with; navigation re-uses it
    #[serde(skip)]
    pub(crate) token_kind: TokenKind,
    /// Envelope key this page arrived under; continuation responses use
    /// the same nesting
    #[serde(skip)]
    pub(crate) envelope: Option<&'static str>,
}

/// Cursor markers of a [`CursorPaging`]
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Cursor {
    /// Marker addressing the items after this page
    #[serde(default)]
    pub after: Option<String>,
    /// Marker addressing the items before this page
    #[serde(default)]
    pub before: Option<String>,
}

/// Cursor-based paging wrapper
///
/// Addressed by opaque `after`/`before` markers instead of numeric offsets.
/// There is no backward link; navigation past the last page is a normal
/// terminal state.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CursorPaging<T> {
    /// URL of this page
    pub href: String,
    /// Items of this page
    pub items: Vec<T>,
    /// Page size
    #[serde(default)]
    pub limit: Option<u32>,
    /// URL of the next page, absent on the last page
    #[serde(default)]
    pub next: Option<String>,
    /// Cursor markers for this page
    #[serde(default)]
    pub cursors: Option<Cursor>,
    /// Total number of items, when the endpoint reports it
    #[serde(default)]
    pub total: Option<u32>,
    /// Token capability the page was fetched with; navigation re-uses it
    #[serde(skip)]
    pub(crate) token_kind: TokenKind,
    /// Envelope key this page arrived under; continuation responses use
    /// the same nesting
    #[serde(skip)]
    pub(crate) envelope: Option<&'static str>,
}

/// Offset-paging request parameters
///
/// A plain parameter bag; absent fields fall back to the service's
/// defaults (limit 20, offset 0).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PageParams {
    /// Page size to request
    pub limit: Option<u32>,
    /// Offset of the first item to request
    pub offset: Option<u32>,
}

impl PageParams {
    /// Parameters requesting a page size
    pub fn with_limit(limit: u32) -> Self {
        Self {
            limit: Some(limit),
            offset: None,
        }
    }
}

/// Cursor-paging request parameters
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct CursorParams {
    /// Page size to request
    pub limit: Option<u32>,
    /// Opaque marker: return items after this one
    pub after: Option<String>,
    /// Opaque marker: return items before this one
    pub before: Option<String>,
}

/// Where playback should start inside a context
///
/// The API accepts either a zero-based position or the URI of an item in
/// the context; the two are distinct request shapes, not one field.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum PlayOffset {
    /// Zero-based position in the context
    Position(u32),
    /// URI of the item to start from
    Uri(String),
}

impl PlayOffset {
    /// JSON form expected by the player endpoints
    pub(crate) fn to_body(&self) -> serde_json::Value {
        match self {
            PlayOffset::Position(position) => serde_json::json!({ "position": position }),
            PlayOffset::Uri(uri) => serde_json::json!({ "uri": uri }),
        }
    }
}

/// Album relationship filters for an artist's discography
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AlbumGroup {
    /// Albums the artist released
    Album,
    /// Singles and EPs
    Single,
    /// Albums the artist appears on
    AppearsOn,
    /// Compilations
    Compilation,
}

impl AlbumGroup {
    /// API token for this group
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Single => "single",
            Self::AppearsOn => "appears_on",
            Self::Compilation => "compilation",
        }
    }

    /// All groups
    pub fn all() -> &'static [AlbumGroup] {
        &[Self::Album, Self::Single, Self::AppearsOn, Self::Compilation]
    }

    /// Comma-joined `include_groups` parameter value for a set of groups
    pub fn to_param(groups: &[AlbumGroup]) -> String {
        groups
            .iter()
            .map(AlbumGroup::api_id)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Resource kinds accepted by the search endpoint
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SearchType {
    /// Albums
    Album,
    /// Artists
    Artist,
    /// Playlists
    Playlist,
    /// Tracks
    Track,
    /// Shows
    Show,
    /// Episodes
    Episode,
}

impl SearchType {
    /// API token for this search type
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::Album => "album",
            Self::Artist => "artist",
            Self::Playlist => "playlist",
            Self::Track => "track",
            Self::Show => "show",
            Self::Episode => "episode",
        }
    }

    /// Comma-joined `type` parameter value for a set of search types
    pub fn to_param(types: &[SearchType]) -> String {
        types
            .iter()
            .map(SearchType::api_id)
            .collect::<Vec<_>>()
            .join(",")
    }
}

/// Search results, one paging per requested type
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct SearchResults {
    /// Matching albums
    #[serde(default)]
    pub albums: Option<Paging<Album>>,
    /// Matching artists
    #[serde(default)]
    pub artists: Option<Paging<Artist>>,
    /// Matching tracks
    #[serde(default)]
    pub tracks: Option<Paging<Track>>,
    /// Matching playlists
    #[serde(default)]
    pub playlists: Option<Paging<Playlist>>,
    /// Matching shows
    #[serde(default)]
    pub shows: Option<Paging<Show>>,
    /// Matching episodes
    #[serde(default)]
    pub episodes: Option<Paging<Episode>>,
}

/// Time window for the personalization endpoints
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimeRange {
    /// Roughly the last four weeks
    ShortTerm,
    /// Roughly the last six months
    MediumTerm,
    /// Several years
    LongTerm,
}

impl TimeRange {
    /// API token for this range
    pub fn api_id(&self) -> &'static str {
        match self {
            Self::ShortTerm => "short_term",
            Self::MediumTerm => "medium_term",
            Self::LongTerm => "long_term",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_playable_item_discriminator() {
        let track: PlayableItem = serde_json::from_value(serde_json::json!({
            "type": "track",
            "id": "11dFghVXANMlKmJXsNCbNl",
            "name": "Cut To The Feeling",
            "duration_ms": 207959
        }))
        .unwrap();
        assert!(matches!(track, PlayableItem::Track(_)));
        assert_eq!(track.name(), "Cut To The Feeling");

        let episode: PlayableItem = serde_json::from_value(serde_json::json!({
            "type": "episode",
            "id": "512ojhOuo1ktJprKbVcKyQ",
            "name": "Tenth episode",
            "release_date": "2022-03-01"
        }))
        .unwrap();
        assert!(matches!(episode, PlayableItem::Episode(_)));
        assert_eq!(episode.id(), "512ojhOuo1ktJprKbVcKyQ");
    }

    #[test]
    fn test_play_offset_bodies() {
        assert_eq!(
            PlayOffset::Position(5).to_body(),
            serde_json::json!({ "position": 5 })
        );
        assert_eq!(
            PlayOffset::Uri("spotify:track:abc".to_string()).to_body(),
            serde_json::json!({ "uri": "spotify:track:abc" })
        );
    }

    #[test]
    fn test_album_group_param() {
        assert_eq!(
            AlbumGroup::to_param(&[AlbumGroup::Album, AlbumGroup::AppearsOn]),
            "album,appears_on"
        );
        assert_eq!(AlbumGroup::to_param(&[]), "");
        assert_eq!(AlbumGroup::all().len(), 4);
    }

    #[test]
    fn test_search_type_param() {
        assert_eq!(
            SearchType::to_param(&[SearchType::Album, SearchType::Track]),
            "album,track"
        );
    }

    #[test]
    fn test_paging_deserializes_without_links() {
        let page: Paging<Track> = serde_json::from_value(serde_json::json!({
            "href": "https://api.spotify.com/v1/albums/x/tracks",
            "items": [],
            "limit": 20,
            "offset": 0,
            "total": 0
        }))
        .unwrap();
        assert!(page.next.is_none());
        assert!(page.previous.is_none());
    }
}
