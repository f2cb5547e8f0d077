//! # skylark-auth
//!
//! The multi-stage authentication handshake for the Skylark messaging
//! client:
//!
//! 1. **Credential exchange** ([`credentials`]): scrape the anti-forgery
//!    token out of the login form, replay the captured session cookies, and
//!    submit the username/password for a short-lived ticket.
//! 2. **Token exchange** ([`token`]): trade the ticket for a bearer token
//!    with an expiry, producing a [`skylark_core::Session`].
//! 3. **Lock and key** ([`lock_and_key`]): the time-based keyed-hash proof
//!    the endpoint registration requires.
//!
//! [`authenticate`] runs stages 1 and 2 in order; each stage consumes the
//! prior stage's output and fails fast with a distinguishable [`AuthError`].
//!
//! All functions expect a `reqwest::Client` built with redirects disabled;
//! the handshake reads `Location` headers itself.

#![deny(unsafe_code)]

pub mod credentials;
pub mod errors;
pub mod lock_and_key;
pub mod profile;
pub mod scrape;
pub mod token;

pub use errors::AuthError;

use skylark_core::{ServiceConfig, Session};

/// Run the full credential + token exchange, yielding a bearer [`Session`].
#[tracing::instrument(skip_all)]
pub async fn authenticate(
    config: &ServiceConfig,
    http: &reqwest::Client,
    username: &str,
    password: &str,
) -> Result<Session, AuthError> {
    let form = credentials::fetch_login_form(config, http).await?;
    let ticket = credentials::submit_credentials(config, http, username, password, &form).await?;
    token::exchange_ticket(config, http, &ticket).await
}
