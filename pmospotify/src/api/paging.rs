//! Navigation over paged and cursor-paged results
//!
//! Paging wrappers store the continuation URLs the service returned with
//! them. The navigator only ever dereferences those URLs verbatim —
//! recomputing an offset locally would silently drop the query, filter
//! and sort state the server encodes in its links. Running off either end
//! of a collection is a normal terminal state, reported as an absent
//! page, not an error.

use crate::api::lookup::decode_payload;
use crate::api::ApiOutcome;
use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::{CursorPaging, Paging};
use serde::de::DeserializeOwned;
use tracing::debug;

/// Which page to fetch relative to an existing one
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PageDirection {
    /// Re-fetch the page itself
    Current,
    /// The following page
    Next,
    /// The preceding page
    Previous,
}

impl SpotifyClient {
    /// Fetch an adjacent page of an offset-paged collection
    ///
    /// Returns `Success(None)` without issuing a request when the page
    /// has no link in the requested direction.
    pub async fn page<T: DeserializeOwned>(
        &self,
        page: &Paging<T>,
        direction: PageDirection,
    ) -> Result<ApiOutcome<Option<Paging<T>>>> {
        let link = match direction {
            PageDirection::Current => Some(page.href.as_str()),
            PageDirection::Next => page.next.as_deref(),
            PageDirection::Previous => page.previous.as_deref(),
        };

        let Some(link) = link else {
            debug!("no {:?} page, pagination exhausted", direction);
            return Ok(ApiOutcome::Success(None));
        };

        // Continuation responses nest their payload the same way the
        // original response did
        let outcome = self
            .get_absolute::<serde_json::Value>(link, page.token_kind)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => {
                let mut next: Paging<T> = decode_payload(value, page.envelope)?;
                next.token_kind = page.token_kind;
                next.envelope = page.envelope;
                Ok(ApiOutcome::Success(Some(next)))
            }
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }

    /// Fetch an adjacent page of a cursor-paged collection
    ///
    /// Cursor paging is forward-only: there is no stored backward link,
    /// so `Previous` always reports an absent page.
    pub async fn cursor_page<T: DeserializeOwned>(
        &self,
        page: &CursorPaging<T>,
        direction: PageDirection,
    ) -> Result<ApiOutcome<Option<CursorPaging<T>>>> {
        let link = match direction {
            PageDirection::Current => Some(page.href.as_str()),
            PageDirection::Next => page.next.as_deref(),
            PageDirection::Previous => None,
        };

        let Some(link) = link else {
            debug!("no {:?} page, pagination exhausted", direction);
            return Ok(ApiOutcome::Success(None));
        };

        let outcome = self
            .get_absolute::<serde_json::Value>(link, page.token_kind)
            .await?;
        match outcome {
            ApiOutcome::Success(value) => {
                let mut next: CursorPaging<T> = decode_payload(value, page.envelope)?;
                next.token_kind = page.token_kind;
                next.envelope = page.envelope;
                Ok(ApiOutcome::Success(Some(next)))
            }
            ApiOutcome::Error(err) => Ok(ApiOutcome::Error(err)),
        }
    }
}
