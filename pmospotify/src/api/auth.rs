//! Token model and authentication cache
//!
//! The [`TokenCache`] owns the current [`Token`] for one
//! (client id, client secret) pair and decides, per call, whether the
//! cached token can be reused, must be silently renewed, or the call must
//! fail because it needs a capability the token does not have. All four
//! supported flows (client credentials, authorization code, authorization
//! code with PKCE, implicit grant) deposit their tokens here.

use crate::api::oauth;
use crate::error::{Error, Result};
use crate::models::ErrorObject;
use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64_STANDARD;
use chrono::{DateTime, Duration, Utc};
use reqwest::Client;
use serde::Deserialize;
use std::collections::HashMap;
use tokio::sync::{Mutex, RwLock};
use tracing::{debug, info, warn};

/// Default token lifetime when the provider omits `expires_in`
const DEFAULT_EXPIRES_IN_SECS: i64 = 3600;

/// Capability level of a token
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum TokenKind {
    /// App-level token from the client-credentials flow; the floor
    /// required by every request
    #[default]
    AccessOnly,
    /// Token granted by a user through one of the redirect flows;
    /// required for the authenticated surface
    UserAuthorized,
}

/// A bearer token and its lifecycle data
///
/// Tokens are immutable by replacement: the cache swaps whole values and
/// never updates fields of a stored token, so readers can never observe a
/// partially-renewed token.
#[derive(Debug, Clone)]
pub struct Token {
    /// The bearer value sent in the `Authorization` header
    pub access_token: String,
    /// Capability level of this token
    pub kind: TokenKind,
    /// Instant after which the token is no longer usable
    pub expires_at: DateTime<Utc>,
    /// Refresh value, when the granting flow issued one
    pub refresh_token: Option<String>,
    /// Space-separated scopes granted, as reported by the provider
    pub scope: Option<String>,
}

impl Token {
    /// Build a token expiring `expires_in_secs` from now
    pub fn new(
        access_token: impl Into<String>,
        kind: TokenKind,
        expires_in_secs: i64,
        refresh_token: Option<String>,
        scope: Option<String>,
    ) -> Self {
        Self {
            access_token: access_token.into(),
            kind,
            expires_at: Utc::now() + Duration::seconds(expires_in_secs),
            refresh_token,
            scope,
        }
    }

    /// Whether the token has expired
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }

    /// Whether the token carries a refresh value
    pub fn can_refresh(&self) -> bool {
        self.refresh_token.is_some()
    }

    fn from_response(response: TokenResponse, kind: TokenKind, previous: Option<&Token>) -> Self {
        Self {
            access_token: response.access_token,
            kind,
            expires_at: Utc::now()
                + Duration::seconds(response.expires_in.unwrap_or(DEFAULT_EXPIRES_IN_SECS)),
            // The provider may omit the refresh token and scopes on
            // refresh; the previous values remain valid then.
            refresh_token: response
                .refresh_token
                .or_else(|| previous.and_then(|p| p.refresh_token.clone())),
            scope: response
                .scope
                .or_else(|| previous.and_then(|p| p.scope.clone())),
        }
    }
}

/// Response of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenResponse {
    access_token: String,
    // token_type: String,
    #[serde(default)]
    expires_in: Option<i64>,
    #[serde(default)]
    refresh_token: Option<String>,
    #[serde(default)]
    scope: Option<String>,
}

/// Error response of the token endpoint
#[derive(Debug, Deserialize)]
struct TokenErrorResponse {
    #[serde(default)]
    error: Option<String>,
    #[serde(default)]
    error_description: Option<String>,
}

/// Memoized outcome of a consumed redirect response
#[derive(Debug, Clone)]
enum ExchangeOutcome {
    Exchanged(Token),
    Rejected(ErrorObject),
}

impl ExchangeOutcome {
    fn into_result(self) -> Result<Token> {
        match self {
            ExchangeOutcome::Exchanged(token) => Ok(token),
            ExchangeOutcome::Rejected(err) => Err(Error::Api(err)),
        }
    }
}

/// Authentication cache for one (client id, client secret) pair
///
/// One instance is shared by every call made through a client handle; it
/// is the only mutable state in the crate. Concurrent callers may both
/// observe an expired token and both refresh it — the duplicate exchange
/// is valid server-side and the cache keeps the last committed token.
/// Authorization-code exchanges, whose codes are single-use server-side,
/// are de-duplicated per response URI instead.
pub struct TokenCache {
    client_id: String,
    client_secret: String,
    http: Client,
    token_url: String,
    token: RwLock<Option<Token>>,
    consumed_redirects: Mutex<HashMap<String, ExchangeOutcome>>,
}

impl TokenCache {
    /// Create a cache for the given application credentials
    ///
    /// `accounts_base` is the base URL of the authorization service
    /// (`https://accounts.spotify.com/` in production); the token endpoint
    /// is `{accounts_base}api/token`.
    pub fn new(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
        http: Client,
        accounts_base: &str,
    ) -> Self {
        let token_url = format!("{}/api/token", accounts_base.trim_end_matches('/'));
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            http,
            token_url,
            token: RwLock::new(None),
            consumed_redirects: Mutex::new(HashMap::new()),
        }
    }

    /// Return a token usable at the required capability level
    ///
    /// Decides between reuse, silent renewal and failure:
    ///
    /// 1. No token cached and user authorization required → fail.
    /// 2. No token cached otherwise → client-credentials exchange.
    /// 3. Cached token expired but refreshable → refresh exchange,
    ///    keeping the cached token's own kind.
    /// 4. Cached token of insufficient kind → fail; an app-level token is
    ///    never silently escalated to a user token.
    /// 5. Whatever is held after the above must be unexpired, or the call
    ///    fails with the token-required error matching `required`.
    ///
    /// # Errors
    ///
    /// * [`Error::UserTokenRequired`] — user authorization required but
    ///   not available
    /// * [`Error::AccessTokenRequired`] — no usable app-level token
    pub async fn ensure_token(&self, required: TokenKind) -> Result<Token> {
        let cached = self.token.read().await.clone();

        let current = match cached {
            None => {
                if required == TokenKind::UserAuthorized {
                    return Err(Error::UserTokenRequired);
                }
                debug!("no token cached, performing client credentials exchange");
                let token = self.client_credentials_exchange().await?;
                self.commit(token.clone()).await;
                token
            }
            Some(token) if token.is_expired() && token.can_refresh() => {
                debug!("cached token expired, refreshing");
                let refreshed = self.refresh_exchange(&token).await?;
                self.commit(refreshed.clone()).await;
                refreshed
            }
            Some(token) => {
                if required == TokenKind::UserAuthorized && token.kind != TokenKind::UserAuthorized
                {
                    return Err(Error::UserTokenRequired);
                }
                token
            }
        };

        // Post-condition: the (possibly just-renewed) token must be usable
        if current.is_expired() {
            return Err(match required {
                TokenKind::UserAuthorized => Error::UserTokenRequired,
                TokenKind::AccessOnly => Error::AccessTokenRequired,
            });
        }

        Ok(current)
    }

    /// Perform a client-credentials exchange and cache the result
    ///
    /// [`ensure_token`](Self::ensure_token) does this automatically when
    /// no token is cached; calling it explicitly re-authenticates after an
    /// app-level token expired.
    pub async fn request_client_credentials_token(&self) -> Result<Token> {
        let token = self.client_credentials_exchange().await?;
        self.commit(token.clone()).await;
        Ok(token)
    }

    /// Exchange an authorization-code redirect response for a user token
    ///
    /// Validates, in order: that `response_uri` belongs under
    /// `expected_redirect_uri`, that its `state` matches `expected_state`
    /// exactly, and that it carries a non-empty `code`. Only then is the
    /// token endpoint contacted, with `pkce_verifier` attached when the
    /// authorization request used PKCE.
    ///
    /// The exchange is idempotent per distinct `response_uri`: the code is
    /// single-use server-side, so a second consumption of the same URI
    /// replays the first outcome without re-contacting the token endpoint.
    ///
    /// # Errors
    ///
    /// * [`Error::RedirectMismatch`] — response URI from somewhere else
    /// * [`Error::CodeStateMismatch`] — `state` does not match
    /// * [`Error::CodeValueMissing`] — no authorization code present
    /// * [`Error::Api`] — the token endpoint rejected the exchange
    pub async fn authorization_code_exchange(
        &self,
        response_uri: &str,
        expected_redirect_uri: &str,
        expected_state: &str,
        pkce_verifier: Option<&str>,
    ) -> Result<Token> {
        // Validation is deterministic and touches no network; it runs
        // before the consumed-redirect check.
        if !oauth::redirect_matches(response_uri, expected_redirect_uri)? {
            return Err(Error::RedirectMismatch(response_uri.to_string()));
        }

        let params = oauth::parse_redirect_query(response_uri)?;
        match params.get("state") {
            Some(state) if state == expected_state => {}
            _ => return Err(Error::CodeStateMismatch),
        }
        let code = match params.get("code") {
            Some(code) if !code.is_empty() => code.clone(),
            _ => return Err(Error::CodeValueMissing),
        };

        // The lock is held across the exchange so a concurrent duplicate
        // of the same redirect waits here and replays the memoized
        // outcome instead of burning the code a second time.
        let mut consumed = self.consumed_redirects.lock().await;
        if let Some(outcome) = consumed.get(response_uri) {
            debug!("redirect response already consumed, replaying outcome");
            return outcome.clone().into_result();
        }

        let mut form = vec![
            ("grant_type", "authorization_code"),
            ("code", code.as_str()),
            ("redirect_uri", expected_redirect_uri),
        ];
        if let Some(verifier) = pkce_verifier {
            form.push(("code_verifier", verifier));
        }

        match self.token_request(&form).await {
            Ok(response) => {
                let token = Token::from_response(response, TokenKind::UserAuthorized, None);
                consumed.insert(
                    response_uri.to_string(),
                    ExchangeOutcome::Exchanged(token.clone()),
                );
                drop(consumed);
                self.commit(token.clone()).await;
                info!("authorization code exchanged, user token cached");
                Ok(token)
            }
            Err(Error::Api(err)) => {
                consumed.insert(
                    response_uri.to_string(),
                    ExchangeOutcome::Rejected(err.clone()),
                );
                Err(Error::Api(err))
            }
            // Transport failures are not memoized: the code may not have
            // reached the server and the caller may retry the exchange.
            Err(err) => Err(err),
        }
    }

    /// Consume an implicit-grant redirect response
    ///
    /// Same validation order as the code exchange, but over the URL
    /// fragment and an `access_token` field; the token arrives directly in
    /// the redirect, so no network call is made.
    ///
    /// # Errors
    ///
    /// * [`Error::RedirectMismatch`] — response URI from somewhere else
    /// * [`Error::TokenStateMismatch`] — `state` does not match
    /// * [`Error::TokenValueMissing`] — no access token in the fragment
    pub async fn implicit_grant_exchange(
        &self,
        response_uri: &str,
        expected_redirect_uri: &str,
        expected_state: &str,
    ) -> Result<Token> {
        if !oauth::redirect_matches(response_uri, expected_redirect_uri)? {
            return Err(Error::RedirectMismatch(response_uri.to_string()));
        }

        let params = oauth::parse_redirect_fragment(response_uri)?;
        match params.get("state") {
            Some(state) if state == expected_state => {}
            _ => return Err(Error::TokenStateMismatch),
        }
        let access_token = match params.get("access_token") {
            Some(token) if !token.is_empty() => token.clone(),
            _ => return Err(Error::TokenValueMissing),
        };

        let expires_in = params
            .get("expires_in")
            .and_then(|v| v.parse().ok())
            .unwrap_or(DEFAULT_EXPIRES_IN_SECS);

        let token = Token::new(
            access_token,
            TokenKind::UserAuthorized,
            expires_in,
            None,
            params.get("scope").cloned(),
        );
        self.commit(token.clone()).await;
        info!("implicit grant token cached");
        Ok(token)
    }

    /// Install a token obtained elsewhere (e.g. restored from storage)
    ///
    /// Replaces whatever the cache holds. A token restored with a refresh
    /// value but an expiry in the past is renewed on the next
    /// [`ensure_token`](Self::ensure_token) call.
    pub async fn install_token(&self, token: Token) {
        self.commit(token).await;
    }

    /// The currently cached token, if any
    pub async fn current_token(&self) -> Option<Token> {
        self.token.read().await.clone()
    }

    /// Drop the cached token
    pub async fn invalidate(&self) {
        *self.token.write().await = None;
    }

    async fn client_credentials_exchange(&self) -> Result<Token> {
        let form = [("grant_type", "client_credentials")];
        let response = self.token_request(&form).await?;
        Ok(Token::from_response(response, TokenKind::AccessOnly, None))
    }

    async fn refresh_exchange(&self, previous: &Token) -> Result<Token> {
        // Guarded by the caller; a token without a refresh value never
        // reaches this point.
        let refresh_token = previous
            .refresh_token
            .as_deref()
            .ok_or(Error::AccessTokenRequired)?;
        let form = [
            ("grant_type", "refresh_token"),
            ("refresh_token", refresh_token),
        ];
        let response = self.token_request(&form).await?;
        // The renewed token keeps the kind of the token it replaces.
        Ok(Token::from_response(response, previous.kind, Some(previous)))
    }

    async fn token_request(&self, form: &[(&str, &str)]) -> Result<TokenResponse> {
        debug!("POST {} (grant_type={})", self.token_url, form[0].1);

        let response = self
            .http
            .post(&self.token_url)
            .header(reqwest::header::AUTHORIZATION, self.basic_authorization())
            .form(form)
            .send()
            .await?;

        let status = response.status();
        if !status.is_success() {
            let body = response.text().await.unwrap_or_default();
            let message = token_error_message(&body);
            warn!("token endpoint rejected the exchange ({}): {}", status, message);
            return Err(Error::Api(ErrorObject {
                status: status.as_u16(),
                message,
            }));
        }

        Ok(response.json().await?)
    }

    fn basic_authorization(&self) -> String {
        let credentials = format!("{}:{}", self.client_id, self.client_secret);
        format!("Basic {}", BASE64_STANDARD.encode(credentials))
    }

    /// Swap the cached token in one committed assignment
    async fn commit(&self, token: Token) {
        *self.token.write().await = Some(token);
    }
}

/// Extract a readable message from a token endpoint error body
fn token_error_message(body: &str) -> String {
    match serde_json::from_str::<TokenErrorResponse>(body) {
        Ok(parsed) => parsed
            .error_description
            .or(parsed.error)
            .unwrap_or_else(|| body.to_string()),
        Err(_) => body.to_string(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn new_cache() -> TokenCache {
        // The unit tests only exercise paths that never reach the network.
        TokenCache::new(
            "client_id",
            "client_secret",
            Client::new(),
            "http://127.0.0.1:1",
        )
    }

    fn expired_token(kind: TokenKind, refresh: Option<&str>) -> Token {
        Token {
            access_token: "stale".to_string(),
            kind,
            expires_at: Utc::now() - Duration::seconds(60),
            refresh_token: refresh.map(String::from),
            scope: None,
        }
    }

    #[tokio::test]
    async fn ensure_token_fails_without_user_token() {
        let cache = new_cache();
        let result = cache.ensure_token(TokenKind::UserAuthorized).await;
        assert!(matches!(result, Err(Error::UserTokenRequired)));
    }

    #[tokio::test]
    async fn ensure_token_never_escalates_app_tokens() {
        let cache = new_cache();
        cache
            .install_token(Token::new("app", TokenKind::AccessOnly, 3600, None, None))
            .await;

        let result = cache.ensure_token(TokenKind::UserAuthorized).await;
        assert!(matches!(result, Err(Error::UserTokenRequired)));

        // The app-level token itself stays usable at its own level
        let token = cache.ensure_token(TokenKind::AccessOnly).await.unwrap();
        assert_eq!(token.access_token, "app");
    }

    #[tokio::test]
    async fn ensure_token_returns_valid_token_unchanged() {
        let cache = new_cache();
        cache
            .install_token(Token::new(
                "user",
                TokenKind::UserAuthorized,
                3600,
                Some("refresh".to_string()),
                Some("user-library-read".to_string()),
            ))
            .await;

        let token = cache.ensure_token(TokenKind::UserAuthorized).await.unwrap();
        assert_eq!(token.access_token, "user");
        assert_eq!(token.scope.as_deref(), Some("user-library-read"));
    }

    #[tokio::test]
    async fn expired_token_without_refresh_fails() {
        let cache = new_cache();
        cache
            .install_token(expired_token(TokenKind::AccessOnly, None))
            .await;
        let result = cache.ensure_token(TokenKind::AccessOnly).await;
        assert!(matches!(result, Err(Error::AccessTokenRequired)));

        let cache = new_cache();
        cache
            .install_token(expired_token(TokenKind::UserAuthorized, None))
            .await;
        let result = cache.ensure_token(TokenKind::UserAuthorized).await;
        assert!(matches!(result, Err(Error::UserTokenRequired)));
    }

    #[tokio::test]
    async fn code_exchange_rejects_state_mismatch_before_any_network() {
        let cache = new_cache();
        let result = cache
            .authorization_code_exchange(
                "http://localhost:8888/callback?code=abc&state=s2",
                "http://localhost:8888/callback",
                "s1",
                None,
            )
            .await;
        assert!(matches!(result, Err(Error::CodeStateMismatch)));
    }

    #[tokio::test]
    async fn code_exchange_rejects_missing_code() {
        let cache = new_cache();
        let result = cache
            .authorization_code_exchange(
                "http://localhost:8888/callback?state=s1",
                "http://localhost:8888/callback",
                "s1",
                None,
            )
            .await;
        assert!(matches!(result, Err(Error::CodeValueMissing)));

        let result = cache
            .authorization_code_exchange(
                "http://localhost:8888/callback?code=&state=s1",
                "http://localhost:8888/callback",
                "s1",
                None,
            )
            .await;
        assert!(matches!(result, Err(Error::CodeValueMissing)));
    }

    #[tokio::test]
    async fn code_exchange_rejects_foreign_redirect() {
        let cache = new_cache();
        let result = cache
            .authorization_code_exchange(
                "http://evil.example/callback?code=abc&state=s1",
                "http://localhost:8888/callback",
                "s1",
                None,
            )
            .await;
        assert!(matches!(result, Err(Error::RedirectMismatch(_))));
    }

    #[tokio::test]
    async fn implicit_grant_consumes_fragment() {
        let cache = new_cache();
        let token = cache
            .implicit_grant_exchange(
                "http://localhost:8888/callback#access_token=tok&token_type=Bearer&expires_in=3600&state=s1",
                "http://localhost:8888/callback",
                "s1",
            )
            .await
            .unwrap();

        assert_eq!(token.access_token, "tok");
        assert_eq!(token.kind, TokenKind::UserAuthorized);
        assert!(!token.is_expired());
        assert!(token.refresh_token.is_none());

        // The token is now the cached token
        let cached = cache.current_token().await.unwrap();
        assert_eq!(cached.access_token, "tok");
    }

    #[tokio::test]
    async fn implicit_grant_rejects_state_mismatch() {
        let cache = new_cache();
        let result = cache
            .implicit_grant_exchange(
                "http://localhost:8888/callback#access_token=tok&state=s2",
                "http://localhost:8888/callback",
                "s1",
            )
            .await;
        assert!(matches!(result, Err(Error::TokenStateMismatch)));
        assert!(cache.current_token().await.is_none());
    }

    #[tokio::test]
    async fn implicit_grant_rejects_missing_token() {
        let cache = new_cache();
        let result = cache
            .implicit_grant_exchange(
                "http://localhost:8888/callback#state=s1",
                "http://localhost:8888/callback",
                "s1",
            )
            .await;
        assert!(matches!(result, Err(Error::TokenValueMissing)));
    }

    #[test]
    fn token_expiry() {
        let token = Token::new("t", TokenKind::AccessOnly, 3600, None, None);
        assert!(!token.is_expired());
        assert!(!token.can_refresh());

        let token = expired_token(TokenKind::AccessOnly, Some("r"));
        assert!(token.is_expired());
        assert!(token.can_refresh());
    }
}
