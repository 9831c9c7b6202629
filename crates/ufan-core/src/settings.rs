//! Settings domain types and validation.
//!
//! Settings are resolved in layers: built-in defaults, then `UFAN_*`
//! environment variables, then explicit updates (usually CLI flags).

use std::net::{Ipv4Addr, SocketAddrV4};
use std::path::PathBuf;
use std::time::Duration;

use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::endpoint::parse_endpoint;
use crate::protocol::{HEARTBEAT_REPLY_LEN, MAX_DATAGRAM};

/// Default UDP port of the broker.
pub const DEFAULT_PORT: u16 = 42069;

/// Default broker bind address.
pub const DEFAULT_BIND: SocketAddrV4 = SocketAddrV4::new(Ipv4Addr::UNSPECIFIED, DEFAULT_PORT);

/// How often a subscriber sends a heartbeat.
pub const DEFAULT_HEARTBEAT_INTERVAL_MS: u64 = 3_000;

/// How long a peer may stay silent before it is considered gone.
pub const DEFAULT_HEARTBEAT_TIMEOUT_MS: u64 = 10_000;

/// Environment variable names.
pub const ENV_BIND: &str = "UFAN_BIND";
pub const ENV_HEARTBEAT_INTERVAL_MS: &str = "UFAN_HEARTBEAT_INTERVAL_MS";
pub const ENV_HEARTBEAT_TIMEOUT_MS: &str = "UFAN_HEARTBEAT_TIMEOUT_MS";
pub const ENV_RECV_BUFFER_SIZE: &str = "UFAN_RECV_BUFFER_SIZE";
pub const ENV_LOG_FILE: &str = "UFAN_LOG_FILE";

/// Application settings structure.
///
/// All fields are optional to support partial updates and graceful defaults.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Address the broker binds to.
    pub bind: Option<SocketAddrV4>,

    /// Subscriber heartbeat period in milliseconds.
    pub heartbeat_interval_ms: Option<u64>,

    /// Silence after which a peer counts as disconnected, in milliseconds.
    pub heartbeat_timeout_ms: Option<u64>,

    /// Size of the datagram receive buffer.
    pub recv_buffer_size: Option<usize>,

    /// Write logs to this file instead of stderr.
    pub log_file: Option<PathBuf>,
}

impl Settings {
    /// Create settings with sensible defaults.
    #[must_use]
    pub const fn with_defaults() -> Self {
        Self {
            bind: Some(DEFAULT_BIND),
            heartbeat_interval_ms: Some(DEFAULT_HEARTBEAT_INTERVAL_MS),
            heartbeat_timeout_ms: Some(DEFAULT_HEARTBEAT_TIMEOUT_MS),
            recv_buffer_size: Some(MAX_DATAGRAM),
            log_file: None,
        }
    }

    /// Defaults overlaid with `UFAN_*` variables from the process environment.
    pub fn from_env() -> Result<Self, SettingsError> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Defaults overlaid with variables resolved through `lookup`.
    pub fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Result<Self, SettingsError> {
        let mut settings = Self::with_defaults();

        if let Some(raw) = lookup(ENV_BIND) {
            let addr = parse_endpoint(&raw).map_err(|_| SettingsError::InvalidEnv {
                key: ENV_BIND,
                value: raw.clone(),
            })?;
            debug!(key = ENV_BIND, value = %addr, "Settings override from environment");
            settings.bind = Some(addr);
        }
        if let Some(ms) = parse_env(&lookup, ENV_HEARTBEAT_INTERVAL_MS)? {
            settings.heartbeat_interval_ms = Some(ms);
        }
        if let Some(ms) = parse_env(&lookup, ENV_HEARTBEAT_TIMEOUT_MS)? {
            settings.heartbeat_timeout_ms = Some(ms);
        }
        if let Some(size) = parse_env(&lookup, ENV_RECV_BUFFER_SIZE)? {
            settings.recv_buffer_size = Some(size);
        }
        if let Some(path) = lookup(ENV_LOG_FILE).filter(|p| !p.trim().is_empty()) {
            settings.log_file = Some(PathBuf::from(path));
        }

        Ok(settings)
    }

    /// Get the effective bind address (with default fallback).
    #[must_use]
    pub fn effective_bind(&self) -> SocketAddrV4 {
        self.bind.unwrap_or(DEFAULT_BIND)
    }

    #[must_use]
    pub fn heartbeat_interval(&self) -> Duration {
        Duration::from_millis(
            self.heartbeat_interval_ms
                .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS),
        )
    }

    #[must_use]
    pub fn heartbeat_timeout(&self) -> Duration {
        Duration::from_millis(
            self.heartbeat_timeout_ms
                .unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT_MS),
        )
    }

    #[must_use]
    pub fn effective_recv_buffer_size(&self) -> usize {
        self.recv_buffer_size.unwrap_or(MAX_DATAGRAM)
    }

    /// Merge another settings into this one, only updating fields that are Some.
    pub fn merge(&mut self, other: &SettingsUpdate) {
        if let Some(ref bind) = other.bind {
            self.bind = *bind;
        }
        if let Some(ref interval) = other.heartbeat_interval_ms {
            self.heartbeat_interval_ms = *interval;
        }
        if let Some(ref timeout) = other.heartbeat_timeout_ms {
            self.heartbeat_timeout_ms = *timeout;
        }
        if let Some(ref size) = other.recv_buffer_size {
            self.recv_buffer_size = *size;
        }
        if let Some(ref path) = other.log_file {
            self.log_file.clone_from(path);
        }
    }
}

fn parse_env<T: std::str::FromStr>(
    lookup: &impl Fn(&str) -> Option<String>,
    key: &'static str,
) -> Result<Option<T>, SettingsError> {
    let Some(raw) = lookup(key) else {
        return Ok(None);
    };
    let value = raw
        .trim()
        .parse()
        .map_err(|_| SettingsError::InvalidEnv { key, value: raw.clone() })?;
    debug!(key, value = %raw, "Settings override from environment");
    Ok(Some(value))
}

/// Partial settings update.
///
/// Each field is `Option<Option<T>>`:
/// - `None` = don't change this field
/// - `Some(None)` = set field to None/null
/// - `Some(Some(value))` = set field to value
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct SettingsUpdate {
    pub bind: Option<Option<SocketAddrV4>>,
    pub heartbeat_interval_ms: Option<Option<u64>>,
    pub heartbeat_timeout_ms: Option<Option<u64>>,
    pub recv_buffer_size: Option<Option<usize>>,
    pub log_file: Option<Option<PathBuf>>,
}

/// Settings validation error.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SettingsError {
    #[error("Heartbeat interval must be greater than 0")]
    ZeroHeartbeatInterval,

    #[error("Heartbeat timeout ({timeout} ms) must be greater than the interval ({interval} ms)")]
    TimeoutNotAfterInterval { timeout: u64, interval: u64 },

    #[error(
        "Receive buffer size must be between {} and {}, got {0}",
        HEARTBEAT_REPLY_LEN,
        MAX_DATAGRAM
    )]
    InvalidRecvBuffer(usize),

    #[error("Invalid value for {key}: '{value}'")]
    InvalidEnv { key: &'static str, value: String },

    #[error("Log file path cannot be empty")]
    EmptyLogFile,
}

/// Validate settings values.
pub fn validate_settings(settings: &Settings) -> Result<(), SettingsError> {
    let interval = settings
        .heartbeat_interval_ms
        .unwrap_or(DEFAULT_HEARTBEAT_INTERVAL_MS);
    let timeout = settings
        .heartbeat_timeout_ms
        .unwrap_or(DEFAULT_HEARTBEAT_TIMEOUT_MS);

    if interval == 0 {
        return Err(SettingsError::ZeroHeartbeatInterval);
    }

    // A timeout at or below the interval would drop every subscriber
    // between two heartbeats
    if timeout <= interval {
        return Err(SettingsError::TimeoutNotAfterInterval { timeout, interval });
    }

    // Anything smaller cannot hold a heartbeat reply
    if let Some(size) = settings.recv_buffer_size {
        if !(HEARTBEAT_REPLY_LEN..=MAX_DATAGRAM).contains(&size) {
            return Err(SettingsError::InvalidRecvBuffer(size));
        }
    }

    if settings
        .log_file
        .as_ref()
        .is_some_and(|p| p.as_os_str().is_empty())
    {
        return Err(SettingsError::EmptyLogFile);
    }

    Ok(())
}
