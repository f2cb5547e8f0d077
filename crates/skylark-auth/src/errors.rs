//! Auth error types.

/// Errors that can occur during the authentication handshake.
///
/// Each step of the handshake fails with its own variant so callers can
/// tell a scraping problem from rejected credentials from a transport
/// failure.
#[derive(Debug, thiserror::Error)]
pub enum AuthError {
    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// The identity endpoint did not answer with a login redirect.
    #[error("login redirect unavailable")]
    RedirectUnavailable,

    /// The login page carried no recognizable anti-forgery form token.
    #[error("anti-forgery form token not found in login page")]
    FormTokenNotFound,

    /// A session cookie required for credential submission was absent.
    #[error("login session cookie missing: {0}")]
    CookieMissing(&'static str),

    /// The submission response carried no ticket: the credentials were
    /// rejected. Distinct from any transport failure.
    #[error("credentials rejected by the identity service")]
    CredentialsRejected,

    /// The token exchange returned an empty bearer token.
    #[error("token exchange rejected")]
    ExchangeRejected,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
