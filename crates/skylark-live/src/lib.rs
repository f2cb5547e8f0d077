//! # skylark-live
//!
//! Steady-state session management for the Skylark messaging client:
//!
//! - **Registration** ([`registration`]): associate a bearer session with a
//!   messenger endpoint, following at most one server-directed host
//!   migration
//! - **Subscriptions** ([`subscription`]): declare interest in resource
//!   classes on the registered endpoint
//! - **Event pump** ([`pump`]): the long-poll loop delivering live events
//!   to registered handlers until cancelled
//! - **Orchestration** ([`client::SkylarkClient`]): the owning
//!   application's entry point tying the stages together
//!
//! Subscription and pump operations take a
//! [`skylark_core::RegisteredSession`], the typed evidence that the login
//! pipeline completed, so they cannot be invoked out of dependency order.

#![deny(unsafe_code)]

pub mod client;
pub mod errors;
pub mod pump;
pub mod registration;
pub mod subscription;
mod wire;

pub use client::SkylarkClient;
pub use errors::LiveError;
pub use pump::EventPump;
