//! Shared request plumbing for registered-session calls.

use reqwest::RequestBuilder;

use skylark_core::RegisteredSession;

use crate::errors::LiveError;

/// Composite authentication header carrying the bearer token.
pub(crate) const HEADER_AUTHENTICATION: &str = "Authentication";
/// Header replaying the raw registration composite.
pub(crate) const HEADER_REGISTRATION_TOKEN: &str = "RegistrationToken";
/// Header requesting explicit 404 signaling instead of silent redirects.
pub(crate) const HEADER_BEHAVIOR_OVERRIDE: &str = "BehaviorOverride";
/// The only supported behavior-override value.
pub(crate) const REDIRECT_AS_404: &str = "redirectAs404";
/// Response header carrying the registration composite.
pub(crate) const HEADER_SET_REGISTRATION_TOKEN: &str = "Set-RegistrationToken";

/// Attach the authentication, registration, and behavior-override headers
/// every registered-endpoint call carries.
pub(crate) fn with_session_headers(
    builder: RequestBuilder,
    registered: &RegisteredSession,
) -> RequestBuilder {
    builder
        .header(
            HEADER_AUTHENTICATION,
            format!("skypetoken={}", registered.session.skype_token),
        )
        .header(
            HEADER_REGISTRATION_TOKEN,
            registered.registration.raw_header.clone(),
        )
        .header(HEADER_BEHAVIOR_OVERRIDE, REDIRECT_AS_404)
}

/// Fail with [`LiveError::SessionExpired`] when the bearer credential is
/// past its expiry; dependent calls must never run on stale state.
pub(crate) fn ensure_fresh(registered: &RegisteredSession) -> Result<(), LiveError> {
    if registered.session.is_expired() {
        return Err(LiveError::SessionExpired);
    }
    Ok(())
}
