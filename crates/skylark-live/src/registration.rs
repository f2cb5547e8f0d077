//! Endpoint registration with one-hop host migration.
//!
//! Registration proves the client can perform the lock-and-key derivation
//! and associates the bearer session with a messenger endpoint. The
//! response carries a semicolon-delimited composite header
//! (`registrationToken=...; expires=...; endpointId=...`) plus a
//! `Location`; when the location's authority differs from the host
//! contacted, the registration is repeated exactly once against the new
//! authority and the last successful registration wins.

use std::fmt::Write as _;
use std::time::Duration;

use chrono::Utc;
use reqwest::header::{HeaderMap, LOCATION};
use tracing::{debug, warn};

use skylark_auth::lock_and_key;
use skylark_core::constants::{DEFAULT_USER, ENDPOINT_FEATURES, REQUEST_TIMEOUT_SECS};
use skylark_core::{Registration, ServiceConfig, Session};

use crate::errors::LiveError;
use crate::wire::{
    HEADER_AUTHENTICATION, HEADER_BEHAVIOR_OVERRIDE, HEADER_SET_REGISTRATION_TOKEN,
    REDIRECT_AS_404,
};

/// What one registration request yielded on the wire.
struct WireResponse {
    composite: Option<String>,
    location: Option<String>,
}

/// Register (or re-register) an endpoint for the session.
///
/// Follows at most one server-directed migration; if the migrated request
/// fails, the original registration remains in effect. A successful
/// response lacking a `registrationToken=` segment leaves the token empty
/// without failing here; downstream stages fail when they require it.
#[tracing::instrument(skip_all)]
pub async fn register_endpoint(
    config: &ServiceConfig,
    http: &reqwest::Client,
    session: &Session,
) -> Result<Registration, LiveError> {
    let secs = Utc::now().timestamp().to_string();
    let proof = lock_and_key::derive(&secs);
    let proof_header = lock_and_key::header(&secs, &proof);

    let host = config.messenger_host.trim_end_matches('/').to_string();
    let url = format!("{host}/v1/users/{DEFAULT_USER}/endpoints");
    let first = post_registration(http, &url, session, &proof_header).await?;
    let mut registration =
        parse_composite(first.composite.as_deref().unwrap_or_default(), &host, "");

    if let Some(location) = first.location.as_deref() {
        if let Some(new_host) = migrated_authority(location, &host) {
            debug!(%location, "registration migrated to a new host");
            match post_registration(http, location, session, &proof_header).await {
                Ok(second) => {
                    // Last successful registration is authoritative; an id
                    // missing from the retry composite is inherited from
                    // the first response.
                    registration = parse_composite(
                        second.composite.as_deref().unwrap_or_default(),
                        &new_host,
                        &registration.endpoint_id,
                    );
                }
                Err(err) => {
                    warn!(%err, "migration retry failed; keeping original registration");
                }
            }
        }
    }
    Ok(registration)
}

async fn post_registration(
    http: &reqwest::Client,
    url: &str,
    session: &Session,
    lock_and_key: &str,
) -> Result<WireResponse, LiveError> {
    let resp = http
        .post(url)
        .header(
            HEADER_AUTHENTICATION,
            format!("skypetoken={}", session.skype_token),
        )
        .header("LockAndKey", lock_and_key)
        .header(HEADER_BEHAVIOR_OVERRIDE, REDIRECT_AS_404)
        .json(&serde_json::json!({ "endpointFeatures": ENDPOINT_FEATURES }))
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await
        .map_err(LiveError::Registration)?;

    Ok(WireResponse {
        composite: header_string(resp.headers(), HEADER_SET_REGISTRATION_TOKEN),
        location: header_string(resp.headers(), LOCATION.as_str()),
    })
}

fn header_string(headers: &HeaderMap, name: &str) -> Option<String> {
    headers
        .get(name)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .map(ToString::to_string)
}

/// Parse the semicolon-delimited registration composite.
///
/// Each `key=value` segment is handled independently; unknown keys are
/// ignored. `known_endpoint_id` seeds the endpoint id for responses that
/// omit it, and the stored raw header always ends up carrying an
/// `endpointId=` segment so later requests replay it.
fn parse_composite(raw: &str, host: &str, known_endpoint_id: &str) -> Registration {
    let mut token = String::new();
    let mut expires = String::new();
    let mut endpoint_id = known_endpoint_id.to_string();

    for segment in raw.split(';') {
        let Some((key, value)) = segment.trim().split_once('=') else {
            continue;
        };
        match key {
            "registrationToken" => token = value.to_string(),
            "expires" => expires = value.to_string(),
            "endpointId" if !value.is_empty() => endpoint_id = value.to_string(),
            _ => {}
        }
    }

    let raw_header = if raw.contains("endpointId=") {
        raw.to_string()
    } else {
        format!("{raw}; endpointId={endpoint_id}")
    };

    Registration {
        token,
        expires,
        raw_header,
        host: host.to_string(),
        endpoint_id,
    }
}

/// When `location`'s authority differs from `current_host`, the scheme and
/// authority to re-register against; `None` when they match or the
/// location is unparsable.
fn migrated_authority(location: &str, current_host: &str) -> Option<String> {
    let loc = reqwest::Url::parse(location).ok()?;
    let cur = reqwest::Url::parse(current_host).ok()?;
    if loc.scheme() == cur.scheme() && loc.host_str() == cur.host_str() && loc.port() == cur.port()
    {
        return None;
    }
    let mut authority = format!("{}://{}", loc.scheme(), loc.host_str()?);
    if let Some(port) = loc.port() {
        let _ = write!(authority, ":{port}");
    }
    Some(authority)
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
