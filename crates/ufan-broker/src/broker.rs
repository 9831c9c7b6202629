//! Broker state machine.
//!
//! [`Broker`] owns the client table and turns one inbound datagram into the
//! datagrams that must go out in response. It performs no I/O, which keeps
//! the fan-out rules testable without sockets or real time.

use std::collections::BTreeMap;
use std::net::SocketAddrV4;
use std::time::Duration;

use bytes::Bytes;
use tracing::{debug, info};

use ufan_core::{
    Frame, Header, MessageBuilder, MessageType, ProtocolError, Topic, endpoint_id,
};

/// What the broker knows about one peer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClientData {
    /// Topic the client subscribed to, [`Topic::EMPTY`] until it does.
    pub topic: Topic,
    /// Last heartbeat timestamp in ms, clamped to the broker clock.
    pub last_heartbeat: i64,
}

impl Default for ClientData {
    fn default() -> Self {
        Self {
            topic: Topic::EMPTY,
            last_heartbeat: 0,
        }
    }
}

/// A datagram to send.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outgoing {
    pub to: SocketAddrV4,
    pub bytes: Bytes,
}

/// Client table plus dispatch rules.
#[derive(Debug)]
pub struct Broker {
    clients: BTreeMap<SocketAddrV4, ClientData>,
    builder: MessageBuilder,
    heartbeat_timeout_ms: i64,
}

impl Broker {
    #[must_use]
    pub fn new(heartbeat_timeout: Duration) -> Self {
        Self {
            clients: BTreeMap::new(),
            builder: MessageBuilder::new(),
            heartbeat_timeout_ms: i64::try_from(heartbeat_timeout.as_millis()).unwrap_or(i64::MAX),
        }
    }

    /// Known clients ordered by (ip, port).
    pub fn clients(&self) -> impl Iterator<Item = (&SocketAddrV4, &ClientData)> {
        self.clients.iter()
    }

    #[must_use]
    pub fn client(&self, addr: &SocketAddrV4) -> Option<&ClientData> {
        self.clients.get(addr)
    }

    #[must_use]
    pub fn client_count(&self) -> usize {
        self.clients.len()
    }

    /// Process one datagram received at `now` (ms) from `from`.
    ///
    /// Returns the datagrams to send in response, in send order.
    pub fn handle_datagram(
        &mut self,
        now: i64,
        from: SocketAddrV4,
        datagram: &[u8],
    ) -> Result<Vec<Outgoing>, ProtocolError> {
        let frame = Frame::parse(datagram)?;
        info!(
            "[{}] > ({}) {} bytes",
            endpoint_id(&from),
            frame.kind(),
            datagram.len()
        );

        let outgoing = match frame.kind() {
            MessageType::Heartbeat => vec![self.handle_heartbeat(now, from, &frame)],
            MessageType::Subscribe => {
                self.handle_subscribe(from, &frame);
                Vec::new()
            }
            MessageType::Publish => self.handle_publish(now, &frame),
            MessageType::Error => {
                debug!("[{}] ignoring error message", endpoint_id(&from));
                Vec::new()
            }
        };
        Ok(outgoing)
    }

    fn handle_heartbeat(&mut self, now: i64, from: SocketAddrV4, frame: &Frame<'_>) -> Outgoing {
        let client = self.clients.entry(from).or_default();
        // A client clock running ahead must not extend its own lease
        client.last_heartbeat = frame.header.timestamp().min(now);

        Outgoing {
            to: from,
            bytes: self
                .builder
                .heartbeat_reply(client.last_heartbeat, client.topic),
        }
    }

    fn handle_subscribe(&mut self, from: SocketAddrV4, frame: &Frame<'_>) {
        let topic = frame.header.topic();
        debug!("[{}] subscribed to {topic}", endpoint_id(&from));
        self.clients.entry(from).or_default().topic = topic;
    }

    fn handle_publish(&mut self, now: i64, frame: &Frame<'_>) -> Vec<Outgoing> {
        let topic = frame.header.topic();
        let datagram = self
            .builder
            .build_with(Header::publish(topic), frame.payload);
        let timeout = self.heartbeat_timeout_ms;

        let mut outgoing = Vec::new();
        self.clients.retain(|addr, client| {
            if now.saturating_sub(client.last_heartbeat) > timeout {
                info!("[{}] timed out", endpoint_id(addr));
                return false;
            }
            if client.topic.matches(&topic) {
                outgoing.push(Outgoing {
                    to: *addr,
                    bytes: datagram.clone(),
                });
            }
            true
        });
        outgoing
    }
}
