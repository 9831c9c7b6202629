//! Clients for the ufan broker.
//!
//! - [`Publisher`] sends one-shot publish datagrams.
//! - [`Subscriber`] keeps a subscription alive with periodic heartbeats and
//!   yields the payloads of matching publishes.

#![deny(unsafe_code)]

pub mod error;
pub mod publisher;
pub mod subscriber;

pub use error::ClientError;
pub use publisher::{MAX_PUBLISH_PAYLOAD, MAX_UDP_PAYLOAD, Publisher};
pub use subscriber::{Subscriber, SubscriberConfig, SubscriberState};
