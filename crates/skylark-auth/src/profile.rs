//! Profile snapshot fetch.

use std::time::Duration;

use skylark_core::{ServiceConfig, Session, UserProfile, constants::REQUEST_TIMEOUT_SECS};

use crate::errors::AuthError;

/// Fetch the authenticated user's profile snapshot, keyed by the bearer
/// token. Read-only; has no interaction with session lifecycle.
#[tracing::instrument(skip_all)]
pub async fn fetch_profile(
    config: &ServiceConfig,
    http: &reqwest::Client,
    session: &Session,
) -> Result<UserProfile, AuthError> {
    let resp = http
        .get(format!("{}/users/self/profile", config.api_host))
        .header("x-skypetoken", &session.skype_token)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;
    Ok(resp.error_for_status()?.json().await?)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
