//! Live-session error types.

use skylark_auth::AuthError;

/// Errors from registration, subscription, and the client orchestrator.
#[derive(Debug, thiserror::Error)]
pub enum LiveError {
    /// A failure in the authentication handshake.
    #[error(transparent)]
    Auth(#[from] AuthError),

    /// HTTP request failed.
    #[error("HTTP error: {0}")]
    Http(#[from] reqwest::Error),

    /// JSON serialization/deserialization failed.
    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    /// Transport failure while registering the endpoint. A missing token
    /// inside a successful response is tolerated, not an error.
    #[error("endpoint registration failed: {0}")]
    Registration(#[source] reqwest::Error),

    /// A subscription call returned a non-2xx status.
    #[error("subscription request failed with status {status}")]
    Subscription {
        /// HTTP status code returned by the service.
        status: u16,
    },

    /// No registered session is available; `login` must succeed first.
    #[error("no registered session; call login first")]
    NotRegistered,

    /// The bearer credential has expired; the session must be replaced by
    /// re-authenticating.
    #[error("session expired; re-authentication required")]
    SessionExpired,
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
