//! Fixed-size datagram header.
//!
//! Layout (10 bytes):
//!
//! | offset | size | field                                  |
//! |--------|------|----------------------------------------|
//! | 0      | 1    | reserved, always 0                     |
//! | 1      | 1    | message type (`H`, `S`, `P`, `E`)      |
//! | 2      | 8    | topic keys, or little-endian i64 ms    |

use std::fmt;

use bytes::BufMut;

use super::ProtocolError;
use super::topic::{TOPIC_KEYS, Topic};

/// Encoded header length in bytes.
pub const HEADER_LEN: usize = 2 + TOPIC_KEYS;

/// Kind of datagram.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[repr(u8)]
pub enum MessageType {
    Heartbeat = b'H',
    Subscribe = b'S',
    Publish = b'P',
    Error = b'E',
}

impl MessageType {
    #[must_use]
    pub const fn as_byte(self) -> u8 {
        self as u8
    }

    #[must_use]
    pub const fn as_char(self) -> char {
        self.as_byte() as char
    }

    pub const fn from_byte(byte: u8) -> Result<Self, ProtocolError> {
        match byte {
            b'H' => Ok(Self::Heartbeat),
            b'S' => Ok(Self::Subscribe),
            b'P' => Ok(Self::Publish),
            b'E' => Ok(Self::Error),
            other => Err(ProtocolError::UnknownType(other)),
        }
    }
}

impl fmt::Display for MessageType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_char())
    }
}

/// Datagram header.
///
/// The trailing eight bytes carry either a topic or a timestamp depending on
/// the message type. Both views are always available, mirroring how the
/// bytes are shared on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    kind: MessageType,
    body: [u8; TOPIC_KEYS],
}

impl Header {
    #[must_use]
    pub const fn with_topic(kind: MessageType, topic: Topic) -> Self {
        Self {
            kind,
            body: topic.keys(),
        }
    }

    #[must_use]
    pub const fn with_timestamp(kind: MessageType, timestamp: i64) -> Self {
        Self {
            kind,
            body: timestamp.to_le_bytes(),
        }
    }

    #[must_use]
    pub const fn heartbeat(timestamp: i64) -> Self {
        Self::with_timestamp(MessageType::Heartbeat, timestamp)
    }

    #[must_use]
    pub const fn subscribe(topic: Topic) -> Self {
        Self::with_topic(MessageType::Subscribe, topic)
    }

    #[must_use]
    pub const fn publish(topic: Topic) -> Self {
        Self::with_topic(MessageType::Publish, topic)
    }

    #[must_use]
    pub const fn error() -> Self {
        Self::with_timestamp(MessageType::Error, 0)
    }

    #[must_use]
    pub const fn kind(&self) -> MessageType {
        self.kind
    }

    #[must_use]
    pub const fn topic(&self) -> Topic {
        Topic::from_keys(self.body)
    }

    #[must_use]
    pub const fn timestamp(&self) -> i64 {
        i64::from_le_bytes(self.body)
    }

    /// Append the encoded header to `buf`.
    pub fn encode_into(&self, buf: &mut impl BufMut) {
        buf.put_u8(0);
        buf.put_u8(self.kind.as_byte());
        buf.put_slice(&self.body);
    }

    /// Decode a header from the start of `bytes`.
    pub fn decode(bytes: &[u8]) -> Result<Self, ProtocolError> {
        if bytes.len() < HEADER_LEN {
            return Err(ProtocolError::InvalidHeader { len: bytes.len() });
        }

        let kind = MessageType::from_byte(bytes[1])?;
        let mut body = [0u8; TOPIC_KEYS];
        body.copy_from_slice(&bytes[2..HEADER_LEN]);
        Ok(Self { kind, body })
    }
}
