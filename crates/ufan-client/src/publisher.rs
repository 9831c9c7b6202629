//! Fire-and-forget publisher.

use std::net::{Ipv4Addr, SocketAddrV4};

use tokio::net::UdpSocket;
use tracing::debug;

use ufan_core::{HEADER_LEN, Header, MessageBuilder, Topic};

use crate::error::ClientError;

/// Largest UDP payload over IPv4 (65535 - 8 byte UDP header - 20 byte IP header).
pub const MAX_UDP_PAYLOAD: usize = 65_507;

/// Largest message payload a publisher can send.
pub const MAX_PUBLISH_PAYLOAD: usize = MAX_UDP_PAYLOAD - HEADER_LEN;

/// Sends publish datagrams to one broker from an ephemeral port.
#[derive(Debug)]
pub struct Publisher {
    server: SocketAddrV4,
    socket: UdpSocket,
    builder: MessageBuilder,
}

impl Publisher {
    pub async fn connect(server: SocketAddrV4) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
        debug!(local = %socket.local_addr()?, %server, "Publisher socket open");
        Ok(Self {
            server,
            socket,
            builder: MessageBuilder::new(),
        })
    }

    #[must_use]
    pub const fn server(&self) -> SocketAddrV4 {
        self.server
    }

    /// Publish `payload` under `topic`.
    ///
    /// Succeeds once the whole datagram was handed to the OS; delivery is
    /// not confirmed.
    pub async fn publish(&mut self, topic: Topic, payload: &[u8]) -> Result<(), ClientError> {
        if payload.len() > MAX_PUBLISH_PAYLOAD {
            return Err(ClientError::PayloadTooLarge {
                len: payload.len(),
                max: MAX_PUBLISH_PAYLOAD,
            });
        }

        let datagram = self.builder.build_with(Header::publish(topic), payload);
        let sent = self.socket.send_to(&datagram, self.server).await?;
        if sent != datagram.len() {
            return Err(ClientError::ShortWrite {
                sent,
                expected: datagram.len(),
            });
        }
        Ok(())
    }
}
