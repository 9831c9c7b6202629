//! `ufan latency`: publish timestamps and time their return trip.
//!
//! Every period the current wall clock in nanoseconds is published as 8
//! little-endian bytes. Any 8-byte message that comes back on the
//! subscription is decoded the same way and logged with its latency.

use std::time::Duration;

use anyhow::Result;
use tracing::{debug, info};

use ufan_client::{Publisher, Subscriber};
use ufan_core::{Settings, now_nanos};

use super::{parse_server, parse_topic};
use crate::error::CliError;

/// Arguments of the latency command.
#[derive(Debug, Clone)]
pub struct LatencyArgs {
    pub server: String,
    pub publish_topic: String,
    pub subscribe_topic: String,
    pub period_ms: u64,
}

/// Decode a probe payload; `None` unless it is exactly 8 bytes.
pub fn decode_probe(payload: &[u8]) -> Option<i64> {
    let bytes: [u8; 8] = payload.try_into().ok()?;
    Some(i64::from_le_bytes(bytes))
}

/// Microseconds between `sent_ns` and `recv_ns`.
#[allow(clippy::cast_precision_loss)]
pub fn latency_micros(sent_ns: i64, recv_ns: i64) -> f64 {
    recv_ns.saturating_sub(sent_ns) as f64 * 0.001
}

pub async fn execute(settings: &Settings, args: LatencyArgs) -> Result<()> {
    let server = parse_server(&args.server)?;
    let publish_topic = parse_topic(&args.publish_topic)?;
    let subscribe_topic = parse_topic(&args.subscribe_topic)?;
    if args.period_ms == 0 {
        return Err(CliError::Arguments("--period-ms must be greater than 0".into()).into());
    }

    let mut publisher = Publisher::connect(server).await.map_err(CliError::from)?;
    let mut subscriber = Subscriber::connect(server, subscribe_topic, settings)
        .await
        .map_err(CliError::from)?;

    info!(
        %server,
        publish = %publish_topic,
        subscribe = %subscribe_topic,
        period_ms = args.period_ms,
        "Latency probe running"
    );

    let mut ticker = tokio::time::interval(Duration::from_millis(args.period_ms));
    // Listener spans the whole loop
    let ctrl_c = tokio::signal::ctrl_c();
    tokio::pin!(ctrl_c);

    loop {
        tokio::select! {
            _ = &mut ctrl_c => break,
            _ = ticker.tick() => {
                let sent = now_nanos();
                publisher
                    .publish(publish_topic, &sent.to_le_bytes())
                    .await
                    .map_err(CliError::from)?;
            }
            message = subscriber.next_message() => {
                let payload = message.map_err(CliError::from)?;
                match decode_probe(&payload) {
                    Some(ts) => {
                        info!("recv {ts} latency={}", latency_micros(ts, now_nanos()));
                    }
                    None => debug!("ignoring {} byte message", payload.len()),
                }
            }
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_decode_probe() {
        let ts = 1_700_000_000_123_456_789_i64;
        assert_eq!(decode_probe(&ts.to_le_bytes()), Some(ts));
        assert_eq!(decode_probe(b"short"), None);
        assert_eq!(decode_probe(&[0u8; 9]), None);
    }

    #[test]
    fn test_latency_micros() {
        assert!((latency_micros(1_000, 3_500) - 2.5).abs() < f64::EPSILON);
        assert!(latency_micros(5_000, 1_000) < 0.0);
    }
}
