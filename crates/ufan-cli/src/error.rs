//! CLI-specific error types and mappings.
//!
//! Handlers return `anyhow::Result`; errors that carry a specific exit code
//! are raised as [`CliError`] and recovered at the entry point with
//! [`exit_code_for`].

use thiserror::Error;

use ufan_client::ClientError;
use ufan_core::{CoreError, EndpointError, TopicError};

/// CLI-specific error type.
#[derive(Debug, Error)]
pub enum CliError {
    /// Endpoint argument is not `<ipv4>:<port>`.
    #[error(transparent)]
    InvalidEndpoint(#[from] EndpointError),

    /// Topic argument failed validation.
    #[error("Invalid topic: '{input}' - {source}")]
    InvalidTopic { input: String, source: TopicError },

    /// Argument parsing error.
    #[error("Invalid arguments: {0}")]
    Arguments(String),

    /// IO error (log file, sockets).
    #[error("IO error: {0}")]
    Io(String),

    /// Configuration error.
    #[error("Configuration error: {0}")]
    Config(String),

    /// Talking to the broker failed.
    #[error("Network error: {0}")]
    Network(String),
}

impl CliError {
    /// Map error to appropriate exit code.
    ///
    /// Exit codes follow Unix conventions:
    /// - 0: Success
    /// - 1: General error (anything that is not a `CliError`)
    /// - 2: Misuse of shell command (invalid arguments)
    /// - 64-78: Reserved for specific error categories (see sysexits.h)
    pub const fn exit_code(&self) -> i32 {
        match self {
            Self::InvalidEndpoint(_) | Self::InvalidTopic { .. } | Self::Arguments(_) => 2,
            Self::Io(_) => 74,      // EX_IOERR
            Self::Config(_) => 78,  // EX_CONFIG
            Self::Network(_) => 69, // EX_UNAVAILABLE
        }
    }

    pub fn invalid_topic(input: &str, source: TopicError) -> Self {
        Self::InvalidTopic {
            input: input.to_string(),
            source,
        }
    }
}

impl From<CoreError> for CliError {
    fn from(err: CoreError) -> Self {
        match err {
            CoreError::Endpoint(e) => Self::InvalidEndpoint(e),
            CoreError::Settings(e) => Self::Config(e.to_string()),
        }
    }
}

impl From<ClientError> for CliError {
    fn from(err: ClientError) -> Self {
        match err {
            ClientError::Io(e) => Self::Io(e.to_string()),
            ClientError::Settings(e) => Self::Config(e.to_string()),
            ClientError::PayloadTooLarge { .. } => Self::Arguments(err.to_string()),
            other => Self::Network(other.to_string()),
        }
    }
}

impl From<std::io::Error> for CliError {
    fn from(err: std::io::Error) -> Self {
        Self::Io(err.to_string())
    }
}

/// Exit code for an error that reached the entry point.
pub fn exit_code_for(err: &anyhow::Error) -> i32 {
    err.downcast_ref::<CliError>().map_or(1, CliError::exit_code)
}
