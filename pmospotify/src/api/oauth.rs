//! OAuth flow codec: authorization URLs, redirect parsing, PKCE
//!
//! Everything in this module is a pure function over its inputs. The codec
//! builds the provider's `/authorize` URLs for the redirect-based flows and
//! parses the redirect the provider sends back; it holds no state of its
//! own. In particular the PKCE verifier is returned to the caller and must
//! be presented again at exchange time — nothing here retains it.

use crate::error::{Error, Result};
use base64::Engine;
use base64::engine::general_purpose::URL_SAFE_NO_PAD;
use rand::Rng;
use rand::distr::Alphanumeric;
use sha2::{Digest, Sha256};
use std::collections::HashMap;
use url::Url;

/// Length of generated `state` strings
const STATE_LENGTH: usize = 16;

/// Length of generated PKCE verifiers
const PKCE_VERIFIER_LENGTH: usize = 128;

/// Unreserved URI characters (RFC 3986) the PKCE verifier is drawn from
const PKCE_VERIFIER_CHARSET: &[u8] =
    b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789-._~";

/// Per-attempt authorization context
///
/// Created when an authorization URL is built and handed back to the caller;
/// the same context must be supplied when the redirect response is
/// exchanged. One context corresponds to at most one consumed redirect.
#[derive(Debug, Clone)]
pub struct AuthorizationRequestContext {
    /// Redirect URI registered with the application
    pub redirect_uri: String,
    /// Anti-forgery state echoed back by the provider
    pub state: String,
    /// Space-separated scopes requested, if any
    pub scopes: Option<String>,
    /// PKCE verifier, present only for the PKCE flow
    pub pkce_verifier: Option<String>,
}

impl AuthorizationRequestContext {
    /// Create a context with a random state and no PKCE verifier
    pub fn new(redirect_uri: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            redirect_uri: redirect_uri.into(),
            state: generate_state(),
            scopes: join_scopes(scopes),
            pkce_verifier: None,
        }
    }

    /// Create a context with a random state and a fresh PKCE verifier
    pub fn new_with_pkce(redirect_uri: impl Into<String>, scopes: &[&str]) -> Self {
        Self {
            pkce_verifier: Some(generate_pkce_verifier()),
            ..Self::new(redirect_uri, scopes)
        }
    }
}

fn join_scopes(scopes: &[&str]) -> Option<String> {
    if scopes.is_empty() {
        None
    } else {
        Some(scopes.join(" "))
    }
}

/// Generate a random `state` string (16 alphanumerics)
pub fn generate_state() -> String {
    rand::rng()
        .sample_iter(Alphanumeric)
        .take(STATE_LENGTH)
        .map(char::from)
        .collect()
}

/// Generate a PKCE code verifier
///
/// 128 characters drawn uniformly from the unreserved URI character set.
/// The caller must retain the verifier until the code exchange.
pub fn generate_pkce_verifier() -> String {
    let mut rng = rand::rng();
    (0..PKCE_VERIFIER_LENGTH)
        .map(|_| {
            let idx = rng.random_range(0..PKCE_VERIFIER_CHARSET.len());
            PKCE_VERIFIER_CHARSET[idx] as char
        })
        .collect()
}

/// Derive the PKCE code challenge from a verifier
///
/// `base64url(sha256(verifier))` without padding, per the `S256` method.
pub fn pkce_challenge(verifier: &str) -> String {
    let hash = Sha256::digest(verifier.as_bytes());
    URL_SAFE_NO_PAD.encode(hash)
}

/// Build an `/authorize` URL for the authorization-code flow
pub fn authorization_code_url(
    accounts_base: &str,
    client_id: &str,
    context: &AuthorizationRequestContext,
    show_dialog: bool,
) -> Result<String> {
    authorize_url(accounts_base, "code", client_id, context, show_dialog, None)
}

/// Build an `/authorize` URL for the authorization-code flow with PKCE
///
/// The challenge is derived from the context's verifier; a context created
/// without PKCE is rejected with [`Error::CodeVerifierRequired`].
pub fn authorization_code_pkce_url(
    accounts_base: &str,
    client_id: &str,
    context: &AuthorizationRequestContext,
    show_dialog: bool,
) -> Result<String> {
    let verifier = context
        .pkce_verifier
        .as_deref()
        .ok_or(Error::CodeVerifierRequired)?;
    let challenge = pkce_challenge(verifier);
    authorize_url(
        accounts_base,
        "code",
        client_id,
        context,
        show_dialog,
        Some(&challenge),
    )
}

/// Build an `/authorize` URL for the implicit-grant flow
pub fn implicit_grant_url(
    accounts_base: &str,
    client_id: &str,
    context: &AuthorizationRequestContext,
    show_dialog: bool,
) -> Result<String> {
    authorize_url(
        accounts_base,
        "token",
        client_id,
        context,
        show_dialog,
        None,
    )
}

fn authorize_url(
    accounts_base: &str,
    response_type: &str,
    client_id: &str,
    context: &AuthorizationRequestContext,
    show_dialog: bool,
    code_challenge: Option<&str>,
) -> Result<String> {
    let mut url = Url::parse(accounts_base)?.join("authorize")?;

    {
        let mut query = url.query_pairs_mut();
        query
            .append_pair("response_type", response_type)
            .append_pair("client_id", client_id)
            .append_pair("redirect_uri", &context.redirect_uri)
            .append_pair("state", &context.state);

        if let Some(scopes) = &context.scopes {
            query.append_pair("scope", scopes);
        }
        if show_dialog {
            query.append_pair("show_dialog", "true");
        }
        if let Some(challenge) = code_challenge {
            query
                .append_pair("code_challenge", challenge)
                .append_pair("code_challenge_method", "S256");
        }
    }

    Ok(url.into())
}

/// Parse the query string of a redirect response into a flat map
pub fn parse_redirect_query(response_uri: &str) -> Result<HashMap<String, String>> {
    let url = Url::parse(response_uri)?;
    Ok(url
        .query_pairs()
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Parse the URL fragment of a redirect response into a flat map
///
/// The implicit-grant flow returns its values in the fragment rather than
/// the query string.
pub fn parse_redirect_fragment(response_uri: &str) -> Result<HashMap<String, String>> {
    let url = Url::parse(response_uri)?;
    let fragment = url.fragment().unwrap_or("");
    Ok(url::form_urlencoded::parse(fragment.as_bytes())
        .map(|(k, v)| (k.into_owned(), v.into_owned()))
        .collect())
}

/// Check that a redirect response belongs under the expected redirect URI
///
/// Scheme, host, port and path prefix must match; query and fragment are
/// where the provider puts its response values and are ignored here.
pub fn redirect_matches(response_uri: &str, expected_redirect_uri: &str) -> Result<bool> {
    let response = Url::parse(response_uri)?;
    let expected = Url::parse(expected_redirect_uri)?;

    Ok(response.scheme() == expected.scheme()
        && response.host_str() == expected.host_str()
        && response.port_or_known_default() == expected.port_or_known_default()
        && response.path().starts_with(expected.path()))
}
