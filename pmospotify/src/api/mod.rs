//! Low-level access to the Spotify Web API
//!
//! This module carries the request machinery shared by every endpoint:
//! URL assembly, bearer-token attachment, dispatch, and decoding of the
//! provider's `error` envelope. Endpoint methods live in [`catalog`] and
//! [`user`]; the descriptor-driven request engine lives in [`lookup`].
//!
//! Calls are caller-driven: the crate owns no background tasks, and
//! dropping a returned future cancels the request it was driving.

pub mod auth;
pub mod catalog;
pub mod lookup;
pub mod oauth;
pub mod paging;
pub mod user;

use crate::api::auth::TokenKind;
use crate::client::SpotifyClient;
use crate::error::Result;
use crate::models::ErrorObject;
use indexmap::IndexMap;
use reqwest::Method;
use serde::de::DeserializeOwned;
use tracing::{debug, warn};
use url::Url;

/// Ordered query-parameter map assembled by the request engine
pub(crate) type QueryMap = IndexMap<&'static str, String>;

/// Outcome of a dispatched API call
///
/// The service reports request-level failures inside the response body
/// (`{"error": {"status", "message"}}`) rather than through transport
/// faults. Those verdicts come back as [`ApiOutcome::Error`] data so that
/// callers can tell "empty result" from "request rejected" without
/// catching anything; transport, token and decoding failures stay in the
/// surrounding [`Result`]. Use [`into_result`](Self::into_result) when a
/// raised error is preferred.
#[derive(Debug, Clone)]
pub enum ApiOutcome<T> {
    /// The decoded payload
    Success(T),
    /// The provider's error verdict for this request
    Error(ErrorObject),
}

impl<T> ApiOutcome<T> {
    /// Whether the call succeeded
    pub fn is_success(&self) -> bool {
        matches!(self, ApiOutcome::Success(_))
    }

    /// The payload, discarding an error verdict
    pub fn success(self) -> Option<T> {
        match self {
            ApiOutcome::Success(value) => Some(value),
            ApiOutcome::Error(_) => None,
        }
    }

    /// The error verdict, if the provider rejected the request
    pub fn error(&self) -> Option<&ErrorObject> {
        match self {
            ApiOutcome::Success(_) => None,
            ApiOutcome::Error(err) => Some(err),
        }
    }

    /// Convert into a `Result`, raising the provider verdict as
    /// [`Error::Api`](crate::Error::Api)
    pub fn into_result(self) -> Result<T> {
        match self {
            ApiOutcome::Success(value) => Ok(value),
            ApiOutcome::Error(err) => Err(crate::error::Error::Api(err)),
        }
    }

    /// Map the success payload
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> ApiOutcome<U> {
        match self {
            ApiOutcome::Success(value) => ApiOutcome::Success(f(value)),
            ApiOutcome::Error(err) => ApiOutcome::Error(err),
        }
    }
}

impl SpotifyClient {
    /// Build an API URL from a path relative to the API base
    pub(crate) fn api_url(&self, path: &str, query: &QueryMap) -> Result<Url> {
        let mut url = Url::parse(&format!(
            "{}/{}",
            self.api_base().trim_end_matches('/'),
            path
        ))?;
        if !query.is_empty() {
            let mut pairs = url.query_pairs_mut();
            for (key, value) in query {
                pairs.append_pair(key, value);
            }
        }
        Ok(url)
    }

    /// Dispatch a request and decode the JSON payload
    ///
    /// Attaches a bearer token at the required capability level, sends,
    /// and hands non-2xx responses to the error-envelope decoder. `body`,
    /// when present, is sent as JSON.
    pub(crate) async fn send_api<T: DeserializeOwned>(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        required: TokenKind,
    ) -> Result<ApiOutcome<T>> {
        let token = self.token_cache().ensure_token(required).await?;

        debug!("{} {}", method, url);

        let mut request = self
            .http_client()
            .request(method, url)
            .bearer_auth(&token.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = decode_error_envelope(status.as_u16(), &body);
            warn!("API error ({}): {}", err.status, err.message);
            return Ok(ApiOutcome::Error(err));
        }

        let text = response.text().await?;
        Ok(ApiOutcome::Success(serde_json::from_str(&text)?))
    }

    /// Dispatch a request whose success response carries no payload
    ///
    /// Used by the PUT/POST/DELETE surface (save, follow, playback), where
    /// the service answers 200/202/204 with an empty body.
    pub(crate) async fn send_api_empty(
        &self,
        method: Method,
        url: Url,
        body: Option<&serde_json::Value>,
        required: TokenKind,
    ) -> Result<ApiOutcome<()>> {
        let token = self.token_cache().ensure_token(required).await?;

        debug!("{} {}", method, url);

        let mut request = self
            .http_client()
            .request(method, url)
            .bearer_auth(&token.access_token);
        if let Some(body) = body {
            request = request.json(body);
        }

        let response = request.send().await?;
        let status = response.status();
        debug!("response status: {}", status);

        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let err = decode_error_envelope(status.as_u16(), &body);
            warn!("API error ({}): {}", err.status, err.message);
            return Ok(ApiOutcome::Error(err));
        }

        Ok(ApiOutcome::Success(()))
    }

    /// Dispatch a GET against a server-supplied absolute URL
    ///
    /// Pagination links are dereferenced verbatim through this; the URL is
    /// not rebuilt from its parts.
    pub(crate) async fn get_absolute<T: DeserializeOwned>(
        &self,
        url: &str,
        required: TokenKind,
    ) -> Result<ApiOutcome<T>> {
        let url = Url::parse(url)?;
        self.send_api(Method::GET, url, None, required).await
    }
}

/// Decode the provider's error envelope from a non-2xx response body
///
/// Falls back to the raw HTTP status and body text when the body is not
/// the expected `{"error": {...}}` shape.
fn decode_error_envelope(status: u16, body: &str) -> ErrorObject {
    #[derive(serde::Deserialize)]
    struct Envelope {
        error: ErrorObject,
    }

    match serde_json::from_str::<Envelope>(body) {
        Ok(envelope) => envelope.error,
        Err(_) => ErrorObject {
            status,
            message: if body.is_empty() {
                "no error body".to_string()
            } else {
                body.chars().take(200).collect()
            },
        },
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_error_envelope() {
        let err = decode_error_envelope(404, r#"{"error":{"status":404,"message":"Not found."}}"#);
        assert_eq!(err.status, 404);
        assert_eq!(err.message, "Not found.");
    }

    #[test]
    fn test_decode_error_envelope_fallback() {
        let err = decode_error_envelope(502, "Bad Gateway");
        assert_eq!(err.status, 502);
        assert_eq!(err.message, "Bad Gateway");

        let err = decode_error_envelope(500, "");
        assert_eq!(err.message, "no error body");
    }

    #[test]
    fn test_outcome_accessors() {
        let outcome: ApiOutcome<u32> = ApiOutcome::Success(7);
        assert!(outcome.is_success());
        assert_eq!(outcome.clone().success(), Some(7));
        assert_eq!(outcome.map(|v| v + 1).into_result().unwrap(), 8);

        let outcome: ApiOutcome<u32> = ApiOutcome::Error(ErrorObject {
            status: 429,
            message: "slow down".to_string(),
        });
        assert!(!outcome.is_success());
        assert_eq!(outcome.error().unwrap().status, 429);
        assert!(outcome.into_result().is_err());
    }
}
