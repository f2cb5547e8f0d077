//! Token exchange: ticket → bearer session.

use std::time::Duration;

use chrono::Utc;
use serde::Deserialize;
use tracing::debug;

use skylark_core::{ServiceConfig, Session, constants::REQUEST_TIMEOUT_SECS};

use crate::errors::AuthError;

/// Bearer lifetime assumed when the service omits `expiresIn`.
const DEFAULT_EXPIRES_IN_SECS: i64 = 86_400;

#[derive(Deserialize)]
struct TokenResponse {
    #[serde(rename = "skypetoken", default)]
    skype_token: String,
    #[serde(rename = "expiresIn", default = "default_expires_in")]
    expires_in: i64,
}

fn default_expires_in() -> i64 {
    DEFAULT_EXPIRES_IN_SECS
}

/// Exchange the ticket for a bearer token, fully initializing a
/// [`Session`]. An empty returned token is a hard failure
/// ([`AuthError::ExchangeRejected`]); must not be attempted before the
/// credential exchange has produced a ticket.
#[tracing::instrument(skip_all)]
pub async fn exchange_ticket(
    config: &ServiceConfig,
    http: &reqwest::Client,
    ticket: &str,
) -> Result<Session, AuthError> {
    let body = serde_json::json!({
        "t": ticket,
        "client_id": config.client_id,
        "oauthPartner": config.oauth_partner,
        "site_name": config.site_name,
        "redirect_uri": config.redirect_uri,
    });

    let resp = http
        .post(format!("{}/microsoft", config.login_host))
        .query(&[
            ("client_id", config.client_id.as_str()),
            ("redirect_uri", config.redirect_uri.as_str()),
        ])
        .json(&body)
        .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
        .send()
        .await?;

    let data: TokenResponse = resp.json().await?;
    if data.skype_token.is_empty() {
        return Err(AuthError::ExchangeRejected);
    }
    debug!(expires_in = data.expires_in, "bearer token issued");
    Ok(Session {
        skype_token: data.skype_token,
        expires_at: Utc::now() + chrono::Duration::seconds(data.expires_in),
    })
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use wiremock::matchers::{body_partial_json, method, path, query_param};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    fn test_config(server: &MockServer) -> ServiceConfig {
        ServiceConfig {
            login_host: format!("{}/login", server.uri()),
            ..ServiceConfig::default()
        }
    }

    #[tokio::test]
    async fn exchange_produces_session_with_expiry() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/microsoft"))
            .and(query_param("client_id", "578134"))
            .and(body_partial_json(serde_json::json!({
                "t": "ticket-9",
                "oauthPartner": "999",
            })))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "skypetoken": "bearer-1",
                "expiresIn": 3600,
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let session = exchange_ticket(&test_config(&server), &client, "ticket-9")
            .await
            .unwrap();
        assert_eq!(session.skype_token, "bearer-1");
        assert!(!session.is_expired());
        assert!(session.expires_at <= Utc::now() + chrono::Duration::seconds(3601));
    }

    #[tokio::test]
    async fn empty_token_is_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/microsoft"))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "skypetoken": "",
            })))
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = exchange_ticket(&test_config(&server), &client, "ticket-9")
            .await
            .unwrap_err();
        assert_matches!(err, AuthError::ExchangeRejected);
    }

    #[tokio::test]
    async fn missing_token_field_is_exchange_rejected() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path("/login/microsoft"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(serde_json::json!({"status": "denied"})),
            )
            .mount(&server)
            .await;

        let client = reqwest::Client::new();
        let err = exchange_ticket(&test_config(&server), &client, "ticket-9")
            .await
            .unwrap_err();
        assert_matches!(err, AuthError::ExchangeRejected);
    }
}
