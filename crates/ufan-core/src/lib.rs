//! Core types for ufan, a UDP topic fan-out broker.
//!
//! - [`protocol`] - topics, the 10-byte header, datagram building and parsing
//! - [`endpoint`] - IPv4 endpoint parsing and log ids
//! - [`clock`] - millisecond clock port used for heartbeats
//! - [`settings`] - layered settings and validation
//!
//! This crate does no I/O; sockets live in `ufan-broker` and `ufan-client`.

pub mod clock;
pub mod endpoint;
pub mod error;
pub mod protocol;
pub mod settings;

// Re-export commonly used types for convenience
pub use clock::{Clock, ManualClock, SystemClock, now_millis, now_nanos};
pub use endpoint::{EndpointError, as_v4, endpoint_id, parse_endpoint};
pub use error::CoreError;
pub use protocol::{
    Frame, HEADER_LEN, HEARTBEAT_REPLY_LEN, Header, HeartbeatReply, MAX_DATAGRAM, MessageBuilder,
    MessageType, ProtocolError, TOPIC_KEYS, Topic, TopicError, may_be_truncated,
};
pub use settings::{
    DEFAULT_BIND, DEFAULT_HEARTBEAT_INTERVAL_MS, DEFAULT_HEARTBEAT_TIMEOUT_MS, DEFAULT_PORT,
    Settings, SettingsError, SettingsUpdate, validate_settings,
};
