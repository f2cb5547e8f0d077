//! Subscription management on the registered endpoint.
//!
//! [`subscribe`] declares interest in the four fixed resource classes over
//! the long-poll channel; [`subscribe_users`] incrementally replaces the
//! interest list with per-contact resources. Failures surface to the
//! caller but are never retried here, and a failure does not stop a pump
//! that is already running.

use std::time::Duration;

use tracing::debug;

use skylark_core::RegisteredSession;
use skylark_core::constants::{
    CHANNEL_TYPE_LONG_POLL, REQUEST_TIMEOUT_SECS, SUBSCRIPTION_TEMPLATE,
};

use crate::errors::LiveError;
use crate::wire::{ensure_fresh, with_session_headers};

/// The four fixed resource classes a fresh subscription covers.
const DEFAULT_RESOURCES: [&str; 4] = [
    "/v1/threads/ALL",
    "/v1/users/ME/contacts/ALL",
    "/v1/users/ME/conversations/ALL/messages",
    "/v1/users/ME/conversations/ALL/properties",
];

/// The non-contact defaults kept when narrowing to specific contacts.
const USER_SCOPED_RESOURCES: [&str; 3] = [
    "/v1/threads/ALL",
    "/v1/users/ME/conversations/ALL/messages",
    "/v1/users/ME/conversations/ALL/properties",
];

/// Create the long-poll subscription covering the default resource
/// classes.
#[tracing::instrument(skip_all)]
pub async fn subscribe(
    http: &reqwest::Client,
    registered: &RegisteredSession,
) -> Result<(), LiveError> {
    ensure_fresh(registered)?;
    let body = serde_json::json!({
        "interestedResources": DEFAULT_RESOURCES,
        "template": SUBSCRIPTION_TEMPLATE,
        "channelType": CHANNEL_TYPE_LONG_POLL,
    });
    let resp = with_session_headers(http.post(registered.subscriptions_url()), registered)
        .json(&body)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(LiveError::Subscription {
            status: status.as_u16(),
        });
    }
    Ok(())
}

/// Replace the subscription's interest list with the non-contact defaults
/// plus one contact resource per id. An empty id set is a no-op: no
/// request is issued.
#[tracing::instrument(skip_all, fields(ids = ids.len()))]
pub async fn subscribe_users(
    http: &reqwest::Client,
    registered: &RegisteredSession,
    ids: &[String],
) -> Result<(), LiveError> {
    if ids.is_empty() {
        debug!("no contact ids; skipping interest update");
        return Ok(());
    }
    ensure_fresh(registered)?;

    let mut resources: Vec<String> = USER_SCOPED_RESOURCES.iter().map(ToString::to_string).collect();
    resources.extend(ids.iter().map(|id| format!("/v1/users/ME/contacts/{id}")));

    let url = format!("{}/0", registered.subscriptions_url());
    let resp = with_session_headers(http.put(url), registered)
        .query(&[("name", "interestedResources")])
        .json(&serde_json::json!({ "interestedResources": resources }))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;
    let status = resp.status();
    if !status.is_success() {
        return Err(LiveError::Subscription {
            status: status.as_u16(),
        });
    }
    Ok(())
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
