//! # skylark-core
//!
//! Shared vocabulary for the Skylark messaging client crates:
//!
//! - **Configuration**: [`ServiceConfig`] with the service hosts and OAuth
//!   parameters, injectable so tests can point every stage at a mock host
//! - **Session state**: [`Session`] (bearer credential), [`Registration`]
//!   (endpoint registration), and [`RegisteredSession`] as typed evidence
//!   that the full login pipeline has completed
//! - **Events**: the long-poll [`Event`] envelope and the [`EventHandler`]
//!   callback trait
//! - **Profile**: the read-only [`UserProfile`] snapshot

#![deny(unsafe_code)]

pub mod config;
pub mod constants;
pub mod events;
pub mod profile;
pub mod session;

pub use config::ServiceConfig;
pub use events::{Event, EventHandler, PollBody};
pub use profile::UserProfile;
pub use session::{Registration, RegisteredSession, Session};
