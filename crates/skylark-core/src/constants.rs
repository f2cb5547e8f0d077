//! Fixed wire-protocol constants.
//!
//! These values are validated by the remote service and must match it
//! byte-for-byte; they are not configuration.

/// Application id sent in the `LockAndKey` header and mixed into the
/// proof-of-work derivation.
pub const LOCK_AND_KEY_APP_ID: &str = "msmsgs@msnmsgr.com";

/// Keyed-hash secret for the proof-of-work derivation.
pub const LOCK_AND_KEY_SECRET: &str = "Q1P7W2E4J9R8U3S5";

/// User path segment for endpoint, subscription, and poll URLs.
pub const DEFAULT_USER: &str = "ME";

/// `endpointFeatures` value sent on registration and poll requests.
pub const ENDPOINT_FEATURES: &str = "Agent";

/// Channel type marker for long-poll subscriptions.
pub const CHANNEL_TYPE_LONG_POLL: &str = "httpLongPoll";

/// Subscription template name.
pub const SUBSCRIPTION_TEMPLATE: &str = "raw";

/// Discriminator value marking a poll envelope as a live notification.
pub const EVENT_MESSAGE_KIND: &str = "EventMessage";

/// Timeout for authentication, registration, and subscription calls.
pub const REQUEST_TIMEOUT_SECS: u64 = 30;

/// Timeout for the long-poll call; materially larger than
/// [`REQUEST_TIMEOUT_SECS`] since the server holds the request open.
pub const POLL_TIMEOUT_SECS: u64 = 60;
