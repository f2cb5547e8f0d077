//! Service endpoint configuration.

use serde::{Deserialize, Serialize};

/// Hosts and OAuth parameters for the messaging service.
///
/// Defaults point at the production service. Every host is injectable so
/// tests can drive the full protocol against mock servers.
#[derive(Clone, Debug, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    /// Identity endpoint serving the login redirect and token exchange.
    pub login_host: String,
    /// Credential-submission host (the `ppsecure` form post).
    pub passport_host: String,
    /// Initial messenger host for endpoint registration; the server may
    /// migrate the session to a different authority once.
    pub messenger_host: String,
    /// REST API host for the profile snapshot.
    pub api_host: String,
    /// OAuth client id.
    pub client_id: String,
    /// OAuth site name.
    pub site_name: String,
    /// OAuth redirect URI.
    pub redirect_uri: String,
    /// OAuth partner id.
    pub oauth_partner: String,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            login_host: "https://login.skype.com/login".to_string(),
            passport_host: "https://login.live.com".to_string(),
            messenger_host: "https://client-s.gateway.messenger.live.com".to_string(),
            api_host: "https://api.skype.com".to_string(),
            client_id: "578134".to_string(),
            site_name: "lw.skype.com".to_string(),
            redirect_uri: "https://web.skype.com".to_string(),
            oauth_partner: "999".to_string(),
        }
    }
}

impl ServiceConfig {
    /// The `wreply` value for the credential-submission post: the OAuth
    /// proxy on the site host, carrying the client id and redirect URI.
    pub fn wreply(&self) -> String {
        format!(
            "https://{}/login/oauth/proxy?client_id={}&site_name={}&redirect_uri={}%2F",
            self.site_name,
            self.client_id,
            self.site_name,
            self.redirect_uri.replace(':', "%3A").replace('/', "%2F"),
        )
    }
}
