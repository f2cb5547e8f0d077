//! Long-poll event envelopes and the handler callback trait.

use serde::Deserialize;
use serde_json::{Map, Value};

use crate::constants::EVENT_MESSAGE_KIND;

/// One envelope from a long-poll response.
///
/// Carries the `Type` discriminator plus the remaining payload fields as
/// opaque JSON; handlers decode the payload with the message/conversation
/// data model of their choosing.
#[derive(Clone, Debug, Deserialize)]
pub struct Event {
    /// Discriminator; only [`EVENT_MESSAGE_KIND`] envelopes are live
    /// notifications, everything else is control/keepalive traffic.
    #[serde(rename = "Type", default)]
    pub kind: String,
    /// All remaining envelope fields, undecoded.
    #[serde(flatten)]
    pub payload: Map<String, Value>,
}

impl Event {
    /// Whether this envelope is a live notification that should reach
    /// handlers.
    pub fn is_notification(&self) -> bool {
        self.kind == EVENT_MESSAGE_KIND
    }
}

/// Body of a long-poll response.
#[derive(Debug, Default, Deserialize)]
pub struct PollBody {
    /// Pending event envelopes, in delivery order.
    #[serde(rename = "eventMessages", default)]
    pub event_messages: Vec<Event>,
}

/// Application callback invoked once per live notification, in delivery
/// order. Errors or panics inside a handler are isolated by the pump and
/// never abort event delivery.
pub trait EventHandler: Send + Sync {
    /// Handle one event.
    fn on_event(&self, event: &Event);
}

impl<F> EventHandler for F
where
    F: Fn(&Event) + Send + Sync,
{
    fn on_event(&self, event: &Event) {
        self(event);
    }
}
