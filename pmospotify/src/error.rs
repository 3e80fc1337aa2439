//! Error types for the Spotify client

use crate::models::ErrorObject;

/// Result type alias for Spotify operations
pub type Result<T> = std::result::Result<T, Error>;

/// Errors that can occur when using the Spotify client
///
/// The variants fall into three groups that callers are expected to
/// distinguish by matching, never by inspecting messages:
///
/// - Token lifecycle: [`Error::UserTokenRequired`],
///   [`Error::AccessTokenRequired`] — recover by re-authenticating.
/// - Flow validation: the state/value mismatch variants and
///   [`Error::CodeVerifierRequired`] — caller bugs (tampered redirect,
///   wrong context), not retryable.
/// - Provider verdicts: [`Error::Api`] — the service rejected the request;
///   produced only when the caller explicitly converts an
///   [`ApiOutcome`](crate::api::ApiOutcome) into a `Result`.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// The operation needs a user-authorized token and none is available
    #[error("a user-authorized token is required for this request")]
    UserTokenRequired,

    /// No usable access token is available
    #[error("a valid access token is required for this request")]
    AccessTokenRequired,

    /// The `state` returned with the authorization code does not match
    #[error("authorization code redirect carried an unexpected state value")]
    CodeStateMismatch,

    /// The redirect response carries no authorization code
    #[error("authorization code redirect carried no code value")]
    CodeValueMissing,

    /// The `state` returned with the implicit-grant token does not match
    #[error("implicit grant redirect carried an unexpected state value")]
    TokenStateMismatch,

    /// The redirect fragment carries no access token
    #[error("implicit grant redirect carried no access token")]
    TokenValueMissing,

    /// A PKCE exchange was attempted without its code verifier
    #[error("PKCE exchange requires the code verifier from the authorization request")]
    CodeVerifierRequired,

    /// The redirect response URI does not belong to the expected redirect URI
    #[error("redirect response does not match the expected redirect URI: {0}")]
    RedirectMismatch(String),

    /// HTTP request failed
    #[error("HTTP request failed: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON parsing failed
    #[error("JSON parsing failed: {0}")]
    Json(#[from] serde_json::Error),

    /// Invalid URL
    #[error("Invalid URL: {0}")]
    InvalidUrl(#[from] url::ParseError),

    /// The service reported an error for the request
    #[error("Spotify API error (status {}): {}", .0.status, .0.message)]
    Api(ErrorObject),

    /// Client construction or credentials error
    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl Error {
    /// Create a configuration error from a string
    pub fn configuration(msg: impl Into<String>) -> Self {
        Self::Configuration(msg.into())
    }

    /// Whether this error is resolved by (re-)authenticating
    pub fn is_token_required(&self) -> bool {
        matches!(self, Error::UserTokenRequired | Error::AccessTokenRequired)
    }

    /// Whether this error is a flow-validation failure (a caller bug,
    /// not a runtime condition)
    pub fn is_flow_validation(&self) -> bool {
        matches!(
            self,
            Error::CodeStateMismatch
                | Error::CodeValueMissing
                | Error::TokenStateMismatch
                | Error::TokenValueMissing
                | Error::CodeVerifierRequired
                | Error::RedirectMismatch(_)
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_groups() {
        assert!(Error::UserTokenRequired.is_token_required());
        assert!(Error::AccessTokenRequired.is_token_required());
        assert!(!Error::CodeStateMismatch.is_token_required());

        assert!(Error::CodeStateMismatch.is_flow_validation());
        assert!(Error::TokenValueMissing.is_flow_validation());
        assert!(!Error::UserTokenRequired.is_flow_validation());
    }
}
