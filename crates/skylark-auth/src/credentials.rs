//! Credential exchange: username/password → short-lived ticket.
//!
//! The exchange is a strict sequence; every step consumes the prior step's
//! output:
//!
//! 1. Ask the identity endpoint for the login-initiation redirect.
//! 2. Fetch the redirect target and scrape the `PPFT` anti-forgery token.
//! 3. Capture the `MSPRequ`/`MSPOK` session cookies from that response.
//! 4. Submit credentials with the token and cookies attached.
//! 5. Scrape the ticket (`t`) out of the submission response; an empty or
//!    absent ticket means the credentials were rejected.

use std::time::Duration;

use chrono::Utc;
use reqwest::header::{COOKIE, HeaderMap, LOCATION, SET_COOKIE};
use tracing::debug;

use skylark_core::{ServiceConfig, constants::REQUEST_TIMEOUT_SECS};

use crate::errors::AuthError;
use crate::scrape::hidden_field;

/// State scraped from the login form, consumed by credential submission.
#[derive(Debug)]
pub struct LoginForm {
    /// Anti-forgery token from the hidden `PPFT` field.
    pub ppft: String,
    /// `MSPRequ` session cookie.
    pub msp_requ: String,
    /// `MSPOK` session cookie.
    pub msp_ok: String,
}

/// Fetch the login form and scrape the state credential submission needs.
#[tracing::instrument(skip_all)]
pub async fn fetch_login_form(
    config: &ServiceConfig,
    http: &reqwest::Client,
) -> Result<LoginForm, AuthError> {
    let resp = http
        .get(format!("{}/oauth/microsoft", config.login_host))
        .query(&[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;

    let redirect = resp
        .headers()
        .get(LOCATION)
        .and_then(|v| v.to_str().ok())
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::RedirectUnavailable)?
        .to_string();
    debug!(%redirect, "login redirect received");

    let resp = http
        .get(redirect)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;
    let msp_requ = cookie_value(resp.headers(), "MSPRequ");
    let msp_ok = cookie_value(resp.headers(), "MSPOK");
    let body = resp.text().await?;

    let ppft = hidden_field(&body, "PPFT")
        .filter(|v| !v.is_empty())
        .ok_or(AuthError::FormTokenNotFound)?;
    Ok(LoginForm {
        ppft,
        msp_requ: msp_requ.ok_or(AuthError::CookieMissing("MSPRequ"))?,
        msp_ok: msp_ok.ok_or(AuthError::CookieMissing("MSPOK"))?,
    })
}

/// Submit credentials and return the ticket (`t`) value.
///
/// An empty or missing ticket surfaces as
/// [`AuthError::CredentialsRejected`] regardless of HTTP status; rejected
/// logins come back as a re-rendered form, not an error status.
#[tracing::instrument(skip_all)]
pub async fn submit_credentials(
    config: &ServiceConfig,
    http: &reqwest::Client,
    username: &str,
    password: &str,
    form: &LoginForm,
) -> Result<String, AuthError> {
    let wreply = config.wreply();
    let cookies = format!(
        "MSPRequ={}; MSPOK={}; CkTst={}",
        form.msp_requ,
        form.msp_ok,
        Utc::now().timestamp_millis(),
    );

    let resp = http
        .post(format!("{}/ppsecure/post.srf", config.passport_host))
        .query(&[
            ("wa", "wsignin1.0"),
            ("wp", "MBI_SSL"),
            ("wreply", wreply.as_str()),
        ])
        .header(COOKIE, cookies)
        .form(&[
            ("login", username),
            ("passwd", password),
            ("PPFT", form.ppft.as_str()),
        ])
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;

    let body = resp.text().await?;
    match hidden_field(&body, "t") {
        Some(ticket) if !ticket.is_empty() => Ok(ticket),
        _ => Err(AuthError::CredentialsRejected),
    }
}

/// First `Set-Cookie` value for `name`, stripped of attributes.
fn cookie_value(headers: &HeaderMap, name: &str) -> Option<String> {
    headers.get_all(SET_COOKIE).iter().find_map(|header| {
        let raw = header.to_str().ok()?;
        let (key, rest) = raw.split_once('=')?;
        if key.trim() != name {
            return None;
        }
        Some(rest.split(';').next()?.trim().to_string())
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
