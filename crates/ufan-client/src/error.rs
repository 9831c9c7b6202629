use std::time::Duration;

use thiserror::Error;

use ufan_core::{ProtocolError, SettingsError};

/// Errors raised by publishers and subscribers.
#[derive(Debug, Error)]
pub enum ClientError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Protocol(#[from] ProtocolError),

    #[error(transparent)]
    Settings(#[from] SettingsError),

    /// The socket accepted fewer bytes than the datagram holds.
    #[error("short write: sent {sent} of {expected} bytes")]
    ShortWrite { sent: usize, expected: usize },

    #[error("payload of {len} bytes exceeds the {max} byte limit")]
    PayloadTooLarge { len: usize, max: usize },

    #[error("server did not acknowledge the subscription within {0:?}")]
    SubscribeTimeout(Duration),
}
