//! High-level Spotify client
//!
//! [`SpotifyClient`] is the handle callers hold: it owns the shared HTTP
//! client and the [`TokenCache`] for its application credentials, and it
//! exposes the OAuth flows plus the endpoint surface implemented in the
//! [`api`](crate::api) modules.
//!
//! # Example
//!
//! ```no_run
//! use pmospotify::SpotifyClient;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = SpotifyClient::builder("client_id", "client_secret").build()?;
//!
//!     // App-level access: the client-credentials token is acquired
//!     // transparently on first use
//!     let album = client
//!         .get_album("4aawyAB9vmqN3uQ7FjRGTy", None)
//!         .await?
//!         .into_result()?;
//!     println!("{}", album.name);
//!
//!     Ok(())
//! }
//! ```

use crate::api::auth::{Token, TokenCache};
use crate::api::oauth::{self, AuthorizationRequestContext};
use crate::error::{Error, Result};
use reqwest::Client;
use std::sync::Arc;
use std::time::Duration;

/// Default API base URL
pub const DEFAULT_API_BASE_URL: &str = "https://api.spotify.com/v1";

/// Default authorization service base URL
pub const DEFAULT_ACCOUNTS_BASE_URL: &str = "https://accounts.spotify.com";

/// Default timeout for HTTP requests (30 seconds)
pub const DEFAULT_REQUEST_TIMEOUT_SECS: u64 = 30;

/// Default User-Agent
pub const DEFAULT_USER_AGENT: &str = "PMOMusic/0.3.10 (pmospotify)";

/// Environment variable holding the application's client id
pub const ENV_CLIENT_ID: &str = "SPOTIFY_CLIENT_ID";

/// Environment variable holding the application's client secret
pub const ENV_CLIENT_SECRET: &str = "SPOTIFY_CLIENT_SECRET";

/// Spotify Web API client
///
/// Cloning is cheap and clones share the same token cache, so all calls
/// made through one handle (and its clones) authenticate as one
/// application session. Create separate clients for separate credential
/// pairs.
#[derive(Clone)]
pub struct SpotifyClient {
    http: Client,
    api_base: String,
    accounts_base: String,
    client_id: String,
    token_cache: Arc<TokenCache>,
}

impl SpotifyClient {
    /// Create a builder for the given application credentials
    pub fn builder(
        client_id: impl Into<String>,
        client_secret: impl Into<String>,
    ) -> ClientBuilder {
        ClientBuilder::new(client_id, client_secret)
    }

    /// Create a client from the `SPOTIFY_CLIENT_ID` / `SPOTIFY_CLIENT_SECRET`
    /// environment variables
    pub fn from_env() -> Result<Self> {
        let client_id = std::env::var(ENV_CLIENT_ID)
            .map_err(|_| Error::configuration(format!("{} is not set", ENV_CLIENT_ID)))?;
        let client_secret = std::env::var(ENV_CLIENT_SECRET)
            .map_err(|_| Error::configuration(format!("{} is not set", ENV_CLIENT_SECRET)))?;
        Self::builder(client_id, client_secret).build()
    }

    /// Get the internal HTTP client
    pub fn http_client(&self) -> &Client {
        &self.http
    }

    /// Get the API base URL
    pub fn api_base(&self) -> &str {
        &self.api_base
    }

    /// Get the authorization service base URL
    pub fn accounts_base(&self) -> &str {
        &self.accounts_base
    }

    /// Get the application's client id
    pub fn client_id(&self) -> &str {
        &self.client_id
    }

    /// Get the token cache shared by calls through this handle
    pub fn token_cache(&self) -> &Arc<TokenCache> {
        &self.token_cache
    }

    // ========================================================================
    // OAuth flows
    // ========================================================================

    /// Begin the authorization-code flow
    ///
    /// Returns the URL to send the user to and the context to keep for
    /// [`complete_authorization_code`](Self::complete_authorization_code).
    pub fn authorization_code_request(
        &self,
        redirect_uri: impl Into<String>,
        scopes: &[&str],
        show_dialog: bool,
    ) -> Result<(String, AuthorizationRequestContext)> {
        let context = AuthorizationRequestContext::new(redirect_uri, scopes);
        let url = oauth::authorization_code_url(
            &self.accounts_base,
            &self.client_id,
            &context,
            show_dialog,
        )?;
        Ok((url, context))
    }

    /// Begin the authorization-code flow with PKCE
    ///
    /// The returned context carries the code verifier; it must survive
    /// until the exchange.
    pub fn authorization_code_pkce_request(
        &self,
        redirect_uri: impl Into<String>,
        scopes: &[&str],
        show_dialog: bool,
    ) -> Result<(String, AuthorizationRequestContext)> {
        let context = AuthorizationRequestContext::new_with_pkce(redirect_uri, scopes);
        let url = oauth::authorization_code_pkce_url(
            &self.accounts_base,
            &self.client_id,
            &context,
            show_dialog,
        )?;
        Ok((url, context))
    }

    /// Begin the implicit-grant flow
    pub fn implicit_grant_request(
        &self,
        redirect_uri: impl Into<String>,
        scopes: &[&str],
        show_dialog: bool,
    ) -> Result<(String, AuthorizationRequestContext)> {
        let context = AuthorizationRequestContext::new(redirect_uri, scopes);
        let url =
            oauth::implicit_grant_url(&self.accounts_base, &self.client_id, &context, show_dialog)?;
        Ok((url, context))
    }

    /// Complete an authorization-code flow (with or without PKCE) from the
    /// redirect response the provider sent the user back with
    pub async fn complete_authorization_code(
        &self,
        context: &AuthorizationRequestContext,
        response_uri: &str,
    ) -> Result<Token> {
        self.token_cache
            .authorization_code_exchange(
                response_uri,
                &context.redirect_uri,
                &context.state,
                context.pkce_verifier.as_deref(),
            )
            .await
    }

    /// Complete an implicit-grant flow from the redirect response
    pub async fn complete_implicit_grant(
        &self,
        context: &AuthorizationRequestContext,
        response_uri: &str,
    ) -> Result<Token> {
        self.token_cache
            .implicit_grant_exchange(response_uri, &context.redirect_uri, &context.state)
            .await
    }

    /// Perform a client-credentials exchange now
    ///
    /// Normally unnecessary: app-level tokens are acquired transparently
    /// on first use. Explicitly useful after an app token expired.
    pub async fn request_client_credentials_token(&self) -> Result<Token> {
        self.token_cache.request_client_credentials_token().await
    }
}

/// Builder for configuring a [`SpotifyClient`]
#[derive(Debug)]
pub struct ClientBuilder {
    client_id: String,
    client_secret: String,
    client: Option<Client>,
    api_base: String,
    accounts_base: String,
    timeout: Duration,
    user_agent: String,
}

impl ClientBuilder {
    /// Create a builder with default settings
    pub fn new(client_id: impl Into<String>, client_secret: impl Into<String>) -> Self {
        Self {
            client_id: client_id.into(),
            client_secret: client_secret.into(),
            client: None,
            api_base: DEFAULT_API_BASE_URL.to_string(),
            accounts_base: DEFAULT_ACCOUNTS_BASE_URL.to_string(),
            timeout: Duration::from_secs(DEFAULT_REQUEST_TIMEOUT_SECS),
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }

    /// Set a custom HTTP client
    ///
    /// Useful for sharing connection pools or proxy settings. The timeout
    /// and user agent of an injected client are left as configured.
    pub fn client(mut self, client: Client) -> Self {
        self.client = Some(client);
        self
    }

    /// Set the API base URL
    pub fn api_base(mut self, url: impl Into<String>) -> Self {
        self.api_base = url.into();
        self
    }

    /// Set the authorization service base URL
    pub fn accounts_base(mut self, url: impl Into<String>) -> Self {
        self.accounts_base = url.into();
        self
    }

    /// Set the request timeout applied to every call
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }

    /// Set a custom User-Agent header
    pub fn user_agent(mut self, user_agent: impl Into<String>) -> Self {
        self.user_agent = user_agent.into();
        self
    }

    /// Build the client
    pub fn build(self) -> Result<SpotifyClient> {
        if self.client_id.is_empty() {
            return Err(Error::configuration("client id must not be empty"));
        }
        if self.client_secret.is_empty() {
            return Err(Error::configuration("client secret must not be empty"));
        }

        let http = match self.client {
            Some(client) => client,
            None => Client::builder()
                .timeout(self.timeout)
                .user_agent(&self.user_agent)
                .build()?,
        };

        let token_cache = Arc::new(TokenCache::new(
            self.client_id.clone(),
            self.client_secret,
            http.clone(),
            &self.accounts_base,
        ));

        Ok(SpotifyClient {
            http,
            api_base: self.api_base,
            accounts_base: self.accounts_base,
            client_id: self.client_id,
            token_cache,
        })
    }
}
