//! UDP serve loop.
//!
//! This module provides the `serve()` function that runs the broker on a
//! pre-bound socket (from the supervisor) until cancelled.

use std::net::SocketAddrV4;
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;
use tokio_util::sync::CancellationToken;
use tracing::{debug, error, info, warn};

use ufan_core::{
    Clock, HEARTBEAT_REPLY_LEN, MAX_DATAGRAM, Settings, as_v4, endpoint_id, may_be_truncated,
};

use crate::broker::{Broker, Outgoing};
use crate::error::BrokerError;

/// Runtime parameters of one broker instance.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BrokerConfig {
    /// Address to bind to (port 0 for auto-assign).
    pub bind: SocketAddrV4,
    /// Silence after which a client is evicted.
    pub heartbeat_timeout: Duration,
    /// Size of the receive buffer; datagrams that fill it are dropped.
    pub recv_buffer_size: usize,
}

impl Default for BrokerConfig {
    fn default() -> Self {
        Self::from(&Settings::with_defaults())
    }
}

impl From<&Settings> for BrokerConfig {
    fn from(settings: &Settings) -> Self {
        Self {
            bind: settings.effective_bind(),
            heartbeat_timeout: settings.heartbeat_timeout(),
            recv_buffer_size: settings.effective_recv_buffer_size(),
        }
    }
}

/// Run the broker on a pre-bound socket.
///
/// Returns `Ok(())` once `cancel` fires. Malformed datagrams and transient
/// socket errors are logged and do not stop the loop.
pub async fn serve(
    socket: UdpSocket,
    config: BrokerConfig,
    clock: Arc<dyn Clock>,
    cancel: CancellationToken,
) -> Result<(), BrokerError> {
    let addr = socket.local_addr()?;
    info!(%addr, "starting server");

    let mut broker = Broker::new(config.heartbeat_timeout);
    let mut buf = vec![0u8; config.recv_buffer_size.clamp(HEARTBEAT_REPLY_LEN, MAX_DATAGRAM)];

    loop {
        let (len, from) = tokio::select! {
            _ = cancel.cancelled() => break,
            received = socket.recv_from(&mut buf) => match received {
                Ok(received) => received,
                Err(e) => {
                    // ICMP errors from earlier sends surface here on some platforms
                    warn!("recv_from failed: {e}");
                    continue;
                }
            },
        };

        if len == 0 {
            continue;
        }
        let Some(from) = as_v4(from) else {
            debug!(%from, "dropping datagram from non-IPv4 peer");
            continue;
        };
        if may_be_truncated(len, buf.len()) {
            warn!(
                "[{}] dropping datagram that fills the {} byte receive buffer",
                endpoint_id(&from),
                buf.len()
            );
            continue;
        }

        match broker.handle_datagram(clock.now_millis(), from, &buf[..len]) {
            Ok(outgoing) => {
                for msg in outgoing {
                    send(&socket, &msg).await;
                }
            }
            Err(e) => error!("parse failed with {e}"),
        }
    }

    info!(clients = broker.client_count(), "stopping server");
    Ok(())
}

async fn send(socket: &UdpSocket, msg: &Outgoing) {
    let kind = msg.bytes.get(1).map_or('?', |b| char::from(*b));
    info!(
        "[{}] < ({}) {} bytes",
        endpoint_id(&msg.to),
        kind,
        msg.bytes.len()
    );
    if let Err(e) = socket.send_to(&msg.bytes, msg.to).await {
        warn!("[{}] send failed: {e}", endpoint_id(&msg.to));
    }
}
