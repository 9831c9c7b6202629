//! Heartbeating subscriber.
//!
//! [`SubscriberState`] holds the protocol rules and does no I/O:
//!
//! - every heartbeat interval it emits a heartbeat, preceded by a subscribe
//!   request while the server has not yet echoed the wanted topic
//! - heartbeat replies refresh liveness and record the acknowledged topic
//! - publish datagrams whose topic matches are handed back as payloads
//!
//! [`Subscriber`] drives that state over a UDP socket.

use std::net::{Ipv4Addr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use bytes::Bytes;
use tokio::net::UdpSocket;
use tracing::{debug, warn};

use ufan_core::{
    Clock, Frame, HEARTBEAT_REPLY_LEN, Header, MAX_DATAGRAM, MessageBuilder, MessageType, Settings,
    SystemClock, Topic, as_v4, may_be_truncated, validate_settings,
};

use crate::error::ClientError;

/// Timing and buffer parameters of a subscriber.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SubscriberConfig {
    pub heartbeat_interval: Duration,
    pub heartbeat_timeout: Duration,
    pub recv_buffer_size: usize,
}

impl Default for SubscriberConfig {
    fn default() -> Self {
        Self::from(&Settings::with_defaults())
    }
}

impl From<&Settings> for SubscriberConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            heartbeat_interval: settings.heartbeat_interval(),
            heartbeat_timeout: settings.heartbeat_timeout(),
            recv_buffer_size: settings.effective_recv_buffer_size(),
        }
    }
}

fn millis(d: Duration) -> i64 {
    i64::try_from(d.as_millis()).unwrap_or(i64::MAX)
}

/// Subscriber protocol state.
#[derive(Debug)]
pub struct SubscriberState {
    server: SocketAddrV4,
    topic: Topic,
    acknowledged: Topic,
    now: i64,
    next_heartbeat: i64,
    last_heartbeat: Option<i64>,
    interval_ms: i64,
    timeout_ms: i64,
    builder: MessageBuilder,
}

impl SubscriberState {
    #[must_use]
    pub fn new(server: SocketAddrV4, topic: Topic, config: &SubscriberConfig, now: i64) -> Self {
        Self {
            server,
            topic,
            acknowledged: Topic::EMPTY,
            now,
            next_heartbeat: 0,
            last_heartbeat: None,
            interval_ms: millis(config.heartbeat_interval),
            timeout_ms: millis(config.heartbeat_timeout),
            builder: MessageBuilder::new(),
        }
    }

    #[must_use]
    pub const fn server(&self) -> SocketAddrV4 {
        self.server
    }

    #[must_use]
    pub const fn topic(&self) -> Topic {
        self.topic
    }

    /// Topic the server last reported for us.
    #[must_use]
    pub const fn acknowledged(&self) -> Topic {
        self.acknowledged
    }

    /// Heard from the server within the heartbeat timeout.
    #[must_use]
    pub fn connected(&self) -> bool {
        self.last_heartbeat
            .is_some_and(|last| self.now.saturating_sub(last) < self.timeout_ms)
    }

    /// Connected and the server has our topic on record.
    #[must_use]
    pub fn subscribed(&self) -> bool {
        self.connected() && self.acknowledged == self.topic
    }

    /// Advance time; returns the datagrams to send to the server.
    pub fn tick(&mut self, now: i64) -> Vec<Bytes> {
        self.now = now;
        if now <= self.next_heartbeat {
            return Vec::new();
        }
        self.next_heartbeat = now.saturating_add(self.interval_ms);

        let mut out = Vec::with_capacity(2);
        // Subscribe first so the heartbeat reply already echoes the topic
        if !self.subscribed() {
            out.push(self.builder.build(Header::subscribe(self.topic)));
        }
        out.push(self.builder.build(Header::heartbeat(now)));
        out
    }

    /// Time left until the next heartbeat is due, at least 1 ms.
    #[must_use]
    pub fn until_next_heartbeat(&self, now: i64) -> Duration {
        let ms = self.next_heartbeat.saturating_sub(now).max(1);
        Duration::from_millis(u64::try_from(ms).unwrap_or(1))
    }

    /// Handle one datagram; returns the payload of a matching publish.
    pub fn on_datagram(
        &mut self,
        now: i64,
        from: SocketAddrV4,
        datagram: &[u8],
    ) -> Result<Option<Bytes>, ClientError> {
        self.now = now;
        if from != self.server {
            warn!(%from, server = %self.server, "dropping datagram from unexpected sender");
            return Ok(None);
        }

        let frame = Frame::parse(datagram)?;
        match frame.kind() {
            MessageType::Heartbeat => {
                let reply = frame.heartbeat_reply()?;
                self.last_heartbeat = Some(reply.timestamp);
                if reply.topic != self.acknowledged {
                    debug!(topic = %reply.topic, "Server acknowledged topic");
                }
                self.acknowledged = reply.topic;
                Ok(None)
            }
            MessageType::Publish if frame.header.topic().matches(&self.topic) => {
                Ok(Some(Bytes::copy_from_slice(frame.payload)))
            }
            _ => Ok(None),
        }
    }
}

/// A subscriber bound to an ephemeral UDP port.
pub struct Subscriber {
    socket: UdpSocket,
    state: SubscriberState,
    clock: Arc<dyn Clock>,
    buf: Vec<u8>,
}

impl Subscriber {
    /// Subscribe to `topic` on `server` with timing from `settings`.
    pub async fn connect(
        server: SocketAddrV4,
        topic: Topic,
        settings: &Settings,
    ) -> Result<Self, ClientError> {
        validate_settings(settings)?;
        Self::with_clock(
            server,
            topic,
            SubscriberConfig::from(settings),
            Arc::new(SystemClock),
        )
        .await
    }

    pub async fn with_clock(
        server: SocketAddrV4,
        topic: Topic,
        config: SubscriberConfig,
        clock: Arc<dyn Clock>,
    ) -> Result<Self, ClientError> {
        let socket = UdpSocket::bind(SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, 0)).await?;
        debug!(local = %socket.local_addr()?, %server, %topic, "Subscriber socket open");

        let state = SubscriberState::new(server, topic, &config, clock.now_millis());
        Ok(Self {
            socket,
            state,
            clock,
            buf: vec![0u8; config.recv_buffer_size.clamp(HEARTBEAT_REPLY_LEN, MAX_DATAGRAM)],
        })
    }

    #[must_use]
    pub const fn state(&self) -> &SubscriberState {
        &self.state
    }

    #[must_use]
    pub fn connected(&self) -> bool {
        self.state.connected()
    }

    #[must_use]
    pub fn subscribed(&self) -> bool {
        self.state.subscribed()
    }

    /// Send a heartbeat if due, then wait for at most one datagram until the
    /// next heartbeat is due.
    ///
    /// Returns the payload of a matching publish, or `None` if nothing
    /// relevant arrived. Malformed datagrams, and datagrams that may have
    /// been cut short by the receive buffer, are logged and skipped.
    pub async fn poll(&mut self) -> Result<Option<Bytes>, ClientError> {
        let now = self.clock.now_millis();
        let server = self.state.server();
        for datagram in self.state.tick(now) {
            self.socket.send_to(&datagram, server).await?;
        }

        let wait = self.state.until_next_heartbeat(now);
        let (len, from) =
            match tokio::time::timeout(wait, self.socket.recv_from(&mut self.buf)).await {
                Err(_) => return Ok(None),
                Ok(Err(e)) if e.kind() == std::io::ErrorKind::ConnectionRefused => {
                    debug!("server unreachable: {e}");
                    return Ok(None);
                }
                Ok(Err(e)) => return Err(e.into()),
                Ok(Ok(received)) => received,
            };

        let Some(from) = as_v4(from) else {
            return Ok(None);
        };
        if may_be_truncated(len, self.buf.len()) {
            warn!(
                %from,
                "dropping datagram that fills the {} byte receive buffer",
                self.buf.len()
            );
            return Ok(None);
        }
        match self
            .state
            .on_datagram(self.clock.now_millis(), from, &self.buf[..len])
        {
            Err(ClientError::Protocol(e)) => {
                warn!("skipping malformed datagram: {e}");
                Ok(None)
            }
            other => other,
        }
    }

    /// Wait for the next matching payload.
    pub async fn next_message(&mut self) -> Result<Bytes, ClientError> {
        loop {
            if let Some(payload) = self.poll().await? {
                return Ok(payload);
            }
        }
    }

    /// Drive the protocol until the server acknowledges the subscription.
    pub async fn wait_subscribed(&mut self, limit: Duration) -> Result<(), ClientError> {
        let wait = async {
            while !self.state.subscribed() {
                self.poll().await?;
            }
            Ok::<(), ClientError>(())
        };
        tokio::time::timeout(limit, wait)
            .await
            .map_err(|_| ClientError::SubscribeTimeout(limit))?
    }
}

impl std::fmt::Debug for Subscriber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Subscriber")
            .field("state", &self.state)
            .finish_non_exhaustive()
    }
}
