//! The top-level client tying the protocol stages together.

use std::sync::Arc;

use parking_lot::RwLock;
use tokio_util::sync::CancellationToken;
use tracing::info;

use skylark_core::{EventHandler, RegisteredSession, ServiceConfig, UserProfile};

use crate::errors::LiveError;
use crate::pump::EventPump;
use crate::registration;
use crate::subscription;

/// Client for the messaging service.
///
/// Drives the login pipeline (credential exchange → token exchange →
/// endpoint registration → profile snapshot), then exposes subscription
/// calls and the event pump against the established session. Session state
/// is written only during [`login`](Self::login); afterwards it is shared
/// read-only with the pump and subscription calls. Re-login while a pump
/// is running is unsupported.
pub struct SkylarkClient {
    config: ServiceConfig,
    http: reqwest::Client,
    handlers: RwLock<Vec<Arc<dyn EventHandler>>>,
    state: RwLock<Option<Arc<RegisteredSession>>>,
    profile: RwLock<Option<UserProfile>>,
}

impl SkylarkClient {
    /// Create a client for the given service configuration.
    ///
    /// The underlying HTTP client never follows redirects (the handshake
    /// reads `Location` headers itself) and keeps no cookie store (the
    /// handshake replays its cookies explicitly).
    pub fn new(config: ServiceConfig) -> Result<Self, LiveError> {
        let http = reqwest::Client::builder()
            .redirect(reqwest::redirect::Policy::none())
            .build()?;
        Ok(Self {
            config,
            http,
            handlers: RwLock::new(Vec::new()),
            state: RwLock::new(None),
            profile: RwLock::new(None),
        })
    }

    /// Run the full login pipeline and store the resulting session.
    ///
    /// Fail-fast: a failure at any stage aborts the sequence with the
    /// stage's distinguishable error and leaves no session stored.
    #[tracing::instrument(skip_all)]
    pub async fn login(
        &self,
        username: &str,
        password: &str,
    ) -> Result<RegisteredSession, LiveError> {
        let session =
            skylark_auth::authenticate(&self.config, &self.http, username, password).await?;
        let registration =
            registration::register_endpoint(&self.config, &self.http, &session).await?;
        let registered = RegisteredSession {
            session,
            registration,
        };

        let profile =
            skylark_auth::profile::fetch_profile(&self.config, &self.http, &registered.session)
                .await?;
        info!(
            username = %profile.username,
            host = %registered.registration.host,
            "login complete"
        );
        *self.profile.write() = Some(profile);
        *self.state.write() = Some(Arc::new(registered.clone()));
        Ok(registered)
    }

    /// Subscribe to the default resource classes on the registered
    /// endpoint.
    pub async fn subscribe(&self) -> Result<(), LiveError> {
        let registered = self.registered()?;
        subscription::subscribe(&self.http, &registered).await
    }

    /// Narrow the subscription's interest list to specific contacts; a
    /// no-op when `ids` is empty.
    pub async fn subscribe_users(&self, ids: &[String]) -> Result<(), LiveError> {
        let registered = self.registered()?;
        subscription::subscribe_users(&self.http, &registered, ids).await
    }

    /// Register an event handler. Handlers registered before
    /// [`start_pump`](Self::start_pump) receive every dispatched event, in
    /// registration order.
    pub fn register_handler(&self, handler: Arc<dyn EventHandler>) {
        self.handlers.write().push(handler);
    }

    /// Run the event pump until the token is cancelled. Blocking; wrap in
    /// `tokio::spawn` to run in the background.
    pub async fn start_pump(&self, cancel: CancellationToken) -> Result<(), LiveError> {
        let registered = self.registered()?;
        let mut pump = EventPump::new(self.http.clone(), registered);
        for handler in self.handlers.read().iter() {
            pump.register_handler(Arc::clone(handler));
        }
        pump.run(cancel).await
    }

    /// The profile snapshot fetched during login, if any.
    pub fn profile(&self) -> Option<UserProfile> {
        self.profile.read().clone()
    }

    /// The established session, if login has completed.
    pub fn session(&self) -> Option<Arc<RegisteredSession>> {
        self.state.read().clone()
    }

    fn registered(&self) -> Result<Arc<RegisteredSession>, LiveError> {
        self.state.read().clone().ok_or(LiveError::NotRegistered)
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
