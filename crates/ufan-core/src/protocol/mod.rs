//! Wire protocol: topics, the fixed header, and datagram framing.

pub mod header;
pub mod message;
pub mod topic;

pub use header::{HEADER_LEN, Header, MessageType};
pub use message::{Frame, HEARTBEAT_REPLY_LEN, HeartbeatReply, MessageBuilder};
pub use topic::{TOPIC_KEYS, Topic, TopicError};

/// Largest datagram a peer will read.
pub const MAX_DATAGRAM: usize = 65_535;

/// Whether a read of `len` bytes into a `capacity` byte buffer may have
/// lost its tail.
///
/// The OS silently cuts a datagram to the buffer size, so a full buffer
/// smaller than [`MAX_DATAGRAM`] cannot be trusted.
#[must_use]
pub const fn may_be_truncated(len: usize, capacity: usize) -> bool {
    len >= capacity && capacity < MAX_DATAGRAM
}

/// Errors raised while decoding a datagram.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ProtocolError {
    #[error("invalid header: datagram is {len} bytes, need at least {}", HEADER_LEN)]
    InvalidHeader { len: usize },

    #[error("unknown message type 0x{0:02x}")]
    UnknownType(u8),

    #[error("invalid heartbeat: expected {} bytes, got {len}", HEARTBEAT_REPLY_LEN)]
    InvalidHeartbeat { len: usize },
}
