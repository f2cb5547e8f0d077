//! The long-poll event pump.
//!
//! One background task repeatedly polls the registered endpoint for
//! pending events and dispatches live notifications to handlers. The loop
//! is unbounded; it terminates only through the cancellation token, which
//! is honored even while a poll request is in flight. Per-iteration
//! failures, transport errors and malformed bodies alike, are logged and
//! never tear the pump down, since a single bad poll response must not
//! destroy a long-lived connection.

use std::sync::Arc;
use std::time::Duration;

use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use skylark_core::constants::{ENDPOINT_FEATURES, POLL_TIMEOUT_SECS};
use skylark_core::{Event, EventHandler, PollBody, RegisteredSession};

use crate::errors::LiveError;
use crate::wire::{ensure_fresh, with_session_headers};

/// Backoff after a failed poll request, so a dead host does not spin the
/// loop. Successful polls need no pacing; the server holds the request
/// open until it has events or times out.
const POLL_ERROR_BACKOFF: Duration = Duration::from_secs(1);

/// The long-poll loop for one registered session.
///
/// Handlers are fixed at construction; the pump only reads session state,
/// never mutates it.
pub struct EventPump {
    http: reqwest::Client,
    session: Arc<RegisteredSession>,
    handlers: Vec<Arc<dyn EventHandler>>,
}

impl EventPump {
    /// Create a pump for a registered session with no handlers attached.
    pub fn new(http: reqwest::Client, session: Arc<RegisteredSession>) -> Self {
        Self {
            http,
            session,
            handlers: Vec::new(),
        }
    }

    /// Attach a handler; delivery follows registration order.
    pub fn register_handler(&mut self, handler: Arc<dyn EventHandler>) {
        self.handlers.push(handler);
    }

    /// Run until the token is cancelled.
    ///
    /// Fails up front with [`LiveError::SessionExpired`] on a stale bearer
    /// rather than polling with invalid state; afterwards all failures are
    /// per-iteration and non-fatal.
    #[tracing::instrument(skip_all, fields(endpoint = %self.session.registration.endpoint_id))]
    pub async fn run(&self, cancel: CancellationToken) -> Result<(), LiveError> {
        ensure_fresh(&self.session)?;
        info!("event pump started");
        loop {
            tokio::select! {
                () = cancel.cancelled() => {
                    info!("event pump cancelled");
                    return Ok(());
                }
                outcome = self.poll_once() => match outcome {
                    Ok(events) => self.dispatch(&events),
                    Err(err) => {
                        warn!(%err, "poll request failed");
                        tokio::select! {
                            () = cancel.cancelled() => {
                                info!("event pump cancelled");
                                return Ok(());
                            }
                            () = tokio::time::sleep(POLL_ERROR_BACKOFF) => {}
                        }
                    }
                }
            }
        }
    }

    /// One blocking poll request; returns the decoded envelopes. A
    /// malformed body is reported and treated as an empty batch.
    async fn poll_once(&self) -> Result<Vec<Event>, LiveError> {
        let resp = with_session_headers(self.http.post(self.session.poll_url()), &self.session)
            .json(&serde_json::json!({ "endpointFeatures": ENDPOINT_FEATURES }))
            .timeout(Duration::from_secs(POLL_TIMEOUT_SECS))
            .send()
            .await?;
        let body = resp.text().await?;
        if body.is_empty() {
            return Ok(Vec::new());
        }
        match serde_json::from_str::<PollBody>(&body) {
            Ok(parsed) => Ok(parsed.event_messages),
            Err(err) => {
                warn!(%err, "malformed poll body; skipping batch");
                Ok(Vec::new())
            }
        }
    }

    /// Deliver live notifications to every handler, in envelope order.
    /// Handler panics are isolated from the I/O loop.
    fn dispatch(&self, events: &[Event]) {
        for event in events.iter().filter(|e| e.is_notification()) {
            debug!(kind = %event.kind, "dispatching event");
            for handler in &self.handlers {
                let outcome = std::panic::catch_unwind(std::panic::AssertUnwindSafe(|| {
                    handler.on_event(event);
                }));
                if outcome.is_err() {
                    error!("event handler panicked; continuing");
                }
            }
        }
    }
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use assert_matches::assert_matches;
    use chrono::{Duration as ChronoDuration, Utc};
    use parking_lot::Mutex;
    use skylark_core::{Registration, Session};
    use wiremock::matchers::{method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const POLL_PATH: &str = "/v1/users/ME/endpoints/ep-1/subscriptions/0/poll";

    fn registered(server: &MockServer) -> Arc<RegisteredSession> {
        Arc::new(RegisteredSession {
            session: Session {
                skype_token: "bearer-1".to_string(),
                expires_at: Utc::now() + ChronoDuration::hours(1),
            },
            registration: Registration {
                token: "reg-1".to_string(),
                expires: "86400".to_string(),
                raw_header: "registrationToken=reg-1; endpointId=ep-1".to_string(),
                host: server.uri(),
                endpoint_id: "ep-1".to_string(),
            },
        })
    }

    /// Records delivery order and cancels the pump after `stop_after`
    /// notifications.
    struct Recorder {
        label: &'static str,
        log: Arc<Mutex<Vec<String>>>,
        cancel: CancellationToken,
        stop_after: usize,
    }

    impl EventHandler for Recorder {
        fn on_event(&self, event: &Event) {
            let mut log = self.log.lock();
            log.push(format!("{}:{}", self.label, event.payload["id"]));
            if log.iter().filter(|e| e.starts_with(self.label)).count() >= self.stop_after {
                self.cancel.cancel();
            }
        }
    }

    fn event_batch() -> serde_json::Value {
        serde_json::json!({ "eventMessages": [
            { "Type": "EventMessage", "id": 1 },
            { "Type": "Heartbeat", "id": 98 },
            { "Type": "EventMessage", "id": 2 },
        ]})
    }

    async fn run_to_completion(pump: &EventPump, cancel: CancellationToken) {
        tokio::time::timeout(Duration::from_secs(10), pump.run(cancel))
            .await
            .expect("pump did not stop in time")
            .expect("pump returned an error");
    }

    #[tokio::test]
    async fn dispatches_notifications_in_order() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(event_batch()))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let mut pump = EventPump::new(reqwest::Client::new(), registered(&server));
        pump.register_handler(Arc::new(Recorder {
            label: "a",
            log: Arc::clone(&log),
            cancel: cancel.clone(),
            stop_after: 2,
        }));
        pump.register_handler(Arc::new(Recorder {
            label: "b",
            log: Arc::clone(&log),
            cancel: cancel.clone(),
            stop_after: 2,
        }));

        run_to_completion(&pump, cancel).await;

        // Both handlers per envelope, handlers in registration order,
        // envelopes in delivery order; the keepalive kind is skipped.
        assert_eq!(*log.lock(), vec!["a:1", "b:1", "a:2", "b:2"]);
    }

    #[tokio::test]
    async fn malformed_body_does_not_stop_the_pump() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_string("{not json"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "eventMessages": [{ "Type": "EventMessage", "id": 7 }],
            })))
            .mount(&server)
            .await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let mut pump = EventPump::new(reqwest::Client::new(), registered(&server));
        pump.register_handler(Arc::new(Recorder {
            label: "a",
            log: Arc::clone(&log),
            cancel: cancel.clone(),
            stop_after: 1,
        }));

        run_to_completion(&pump, cancel).await;
        assert_eq!(*log.lock(), vec!["a:7"]);
    }

    #[tokio::test]
    async fn handler_panic_is_isolated() {
        struct Panicker;
        impl EventHandler for Panicker {
            fn on_event(&self, _: &Event) {
                panic!("boom");
            }
        }

        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "eventMessages": [{ "Type": "EventMessage", "id": 3 }],
            })))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200))
            .mount(&server)
            .await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let mut pump = EventPump::new(reqwest::Client::new(), registered(&server));
        pump.register_handler(Arc::new(Panicker));
        pump.register_handler(Arc::new(Recorder {
            label: "a",
            log: Arc::clone(&log),
            cancel: cancel.clone(),
            stop_after: 1,
        }));

        run_to_completion(&pump, cancel).await;
        // The handler after the panicking one still saw the event.
        assert_eq!(*log.lock(), vec!["a:3"]);
    }

    #[tokio::test]
    async fn error_status_with_junk_body_is_tolerated() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(500).set_body_string("oops"))
            .up_to_n_times(1)
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(ResponseTemplate::new(200).set_body_json(serde_json::json!({
                "eventMessages": [{ "Type": "EventMessage", "id": 9 }],
            })))
            .mount(&server)
            .await;

        let log = Arc::new(Mutex::new(Vec::new()));
        let cancel = CancellationToken::new();
        let mut pump = EventPump::new(reqwest::Client::new(), registered(&server));
        pump.register_handler(Arc::new(Recorder {
            label: "a",
            log: Arc::clone(&log),
            cancel: cancel.clone(),
            stop_after: 1,
        }));

        run_to_completion(&pump, cancel).await;
        assert_eq!(*log.lock(), vec!["a:9"]);
    }

    #[tokio::test]
    async fn transport_errors_back_off_and_continue() {
        let server = MockServer::start().await;
        let mut session = (*registered(&server)).clone();
        // Nothing listens on this host; every poll fails at the transport.
        session.registration.host = "http://127.0.0.1:1".to_string();

        let cancel = CancellationToken::new();
        let pump = EventPump::new(reqwest::Client::new(), Arc::new(session));
        let stopper = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(300)).await;
            stopper.cancel();
        });

        // Survives repeated failures and still exits cleanly on cancel.
        tokio::time::timeout(Duration::from_secs(5), pump.run(cancel))
            .await
            .expect("cancellation was not honored promptly")
            .unwrap();
        handle.await.unwrap();
    }

    #[tokio::test]
    async fn stale_session_fails_before_polling() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200))
            .expect(0)
            .mount(&server)
            .await;

        let mut session = (*registered(&server)).clone();
        session.session.expires_at = Utc::now() - ChronoDuration::seconds(1);
        let pump = EventPump::new(reqwest::Client::new(), Arc::new(session));
        let err = pump.run(CancellationToken::new()).await.unwrap_err();
        assert_matches!(err, LiveError::SessionExpired);
    }

    #[tokio::test]
    async fn cancellation_interrupts_an_inflight_poll() {
        let server = MockServer::start().await;
        Mock::given(method("POST"))
            .and(path(POLL_PATH))
            .respond_with(
                ResponseTemplate::new(200).set_delay(Duration::from_secs(30)),
            )
            .mount(&server)
            .await;

        let cancel = CancellationToken::new();
        let pump = EventPump::new(reqwest::Client::new(), registered(&server));
        let stopper = cancel.clone();
        let handle = tokio::spawn(async move {
            tokio::time::sleep(Duration::from_millis(100)).await;
            stopper.cancel();
        });

        tokio::time::timeout(Duration::from_secs(5), pump.run(cancel))
            .await
            .expect("cancellation was not honored promptly")
            .unwrap();
        handle.await.unwrap();
    }
}
