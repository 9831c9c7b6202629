//! Building and parsing whole datagrams.

use bytes::{BufMut, Bytes, BytesMut};

use super::ProtocolError;
use super::header::{HEADER_LEN, Header, MessageType};
use super::topic::{TOPIC_KEYS, Topic};

/// Length of a server heartbeat reply: header plus the echoed topic.
pub const HEARTBEAT_REPLY_LEN: usize = HEADER_LEN + TOPIC_KEYS;

/// Reusable datagram builder.
///
/// Keeps one buffer around so repeated sends on a hot path do not allocate
/// once the previous datagram has been dropped.
#[derive(Debug, Default)]
pub struct MessageBuilder {
    buf: BytesMut,
}

impl MessageBuilder {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Header-only datagram.
    pub fn build(&mut self, header: Header) -> Bytes {
        self.build_with(header, &[])
    }

    /// Header followed by `payload`.
    pub fn build_with(&mut self, header: Header, payload: &[u8]) -> Bytes {
        self.buf.reserve(HEADER_LEN + payload.len());
        header.encode_into(&mut self.buf);
        self.buf.put_slice(payload);
        self.buf.split().freeze()
    }

    /// Server reply to a heartbeat: the clamped timestamp and the topic the
    /// server currently has on record for the client.
    pub fn heartbeat_reply(&mut self, timestamp: i64, topic: Topic) -> Bytes {
        self.build_with(Header::heartbeat(timestamp), &topic.keys())
    }
}

/// A parsed datagram borrowing its payload from the receive buffer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Frame<'a> {
    pub header: Header,
    pub payload: &'a [u8],
}

impl<'a> Frame<'a> {
    pub fn parse(bytes: &'a [u8]) -> Result<Self, ProtocolError> {
        let header = Header::decode(bytes)?;
        Ok(Self {
            header,
            payload: &bytes[HEADER_LEN..],
        })
    }

    #[must_use]
    pub const fn kind(&self) -> MessageType {
        self.header.kind()
    }

    /// Total encoded length.
    #[must_use]
    pub const fn encoded_len(&self) -> usize {
        HEADER_LEN + self.payload.len()
    }

    /// Interpret this frame as a server heartbeat reply.
    pub fn heartbeat_reply(&self) -> Result<HeartbeatReply, ProtocolError> {
        if self.kind() != MessageType::Heartbeat || self.encoded_len() != HEARTBEAT_REPLY_LEN {
            return Err(ProtocolError::InvalidHeartbeat { len: self.encoded_len() });
        }

        let mut keys = [0u8; TOPIC_KEYS];
        keys.copy_from_slice(self.payload);
        Ok(HeartbeatReply {
            timestamp: self.header.timestamp(),
            topic: Topic::from_keys(keys),
        })
    }
}

/// Contents of a server heartbeat reply.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct HeartbeatReply {
    pub timestamp: i64,
    pub topic: Topic,
}
