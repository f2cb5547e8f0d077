//! Session and registration state.
//!
//! The login pipeline populates these stage by stage: token exchange
//! produces a [`Session`], endpoint registration produces a
//! [`Registration`], and the pair forms a [`RegisteredSession`], the typed
//! evidence that subscription and poll calls require. A later stage cannot
//! be invoked without the value only its predecessor can produce.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Bearer credential for all authenticated calls.
///
/// Produced only by the token exchange. Once `expires_at` passes the
/// session is stale and dependent calls must fail rather than silently
/// reuse it; re-authentication replaces the session wholesale.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct Session {
    /// The bearer token (`skypetoken`).
    pub skype_token: String,
    /// When the bearer token expires.
    pub expires_at: DateTime<Utc>,
}

impl Session {
    /// Whether the bearer token has passed its expiry.
    pub fn is_expired(&self) -> bool {
        Utc::now() >= self.expires_at
    }
}

/// Proof that an endpoint is registered with a messenger host.
///
/// Produced only by the registration manager. `host` always reflects the
/// authority that last accepted a registration; after a migration that is
/// the migrated host, not the one originally contacted.
#[derive(Clone, Debug, Default, Serialize, Deserialize)]
pub struct Registration {
    /// Registration token parsed from the composite response header.
    pub token: String,
    /// Expiry segment of the composite, kept verbatim.
    pub expires: String,
    /// The full composite header value, replayed on subscribe and poll
    /// calls; always carries an `endpointId=` segment.
    pub raw_header: String,
    /// Authority currently serving this endpoint.
    pub host: String,
    /// Server-assigned identifier for this logical connection.
    pub endpoint_id: String,
}

/// A fully established session: bearer credential plus endpoint
/// registration. Required by the subscription manager and the event pump.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct RegisteredSession {
    /// Bearer credential.
    pub session: Session,
    /// Endpoint registration.
    pub registration: Registration,
}

impl RegisteredSession {
    /// Base URL of this endpoint's subscription collection.
    pub fn subscriptions_url(&self) -> String {
        format!(
            "{}/v1/users/{}/endpoints/{}/subscriptions",
            self.registration.host,
            crate::constants::DEFAULT_USER,
            self.registration.endpoint_id,
        )
    }

    /// URL of the long-poll path on subscription `0`.
    pub fn poll_url(&self) -> String {
        format!("{}/0/poll", self.subscriptions_url())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Duration;

    fn registered(host: &str, endpoint_id: &str) -> RegisteredSession {
        RegisteredSession {
            session: Session {
                skype_token: "tok".to_string(),
                expires_at: Utc::now() + Duration::hours(1),
            },
            registration: Registration {
                token: "reg".to_string(),
                expires: "86400".to_string(),
                raw_header: "registrationToken=reg; endpointId=ep".to_string(),
                host: host.to_string(),
                endpoint_id: endpoint_id.to_string(),
            },
        }
    }

    #[test]
    fn expiry_check() {
        let mut session = Session {
            skype_token: "tok".to_string(),
            expires_at: Utc::now() + Duration::hours(1),
        };
        assert!(!session.is_expired());
        session.expires_at = Utc::now() - Duration::seconds(1);
        assert!(session.is_expired());
    }

    #[test]
    fn url_construction() {
        let reg = registered("https://s2.example.com", "{abc}");
        assert_eq!(
            reg.subscriptions_url(),
            "https://s2.example.com/v1/users/ME/endpoints/{abc}/subscriptions"
        );
        assert_eq!(
            reg.poll_url(),
            "https://s2.example.com/v1/users/ME/endpoints/{abc}/subscriptions/0/poll"
        );
    }
}
