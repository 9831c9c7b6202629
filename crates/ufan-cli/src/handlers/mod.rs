//! Command handlers.
//!
//! Each handler validates its arguments, calls into the broker or client
//! crates, and formats output for the terminal. Argument errors are raised
//! as [`CliError`] so the entry point can map them to exit code 2.

use std::net::SocketAddrV4;

use ufan_core::{Topic, parse_endpoint};

use crate::error::CliError;

pub mod latency;
pub mod publish;
pub mod server;
pub mod settings;
pub mod subscribe;

/// Parse a broker endpoint argument.
pub fn parse_server(input: &str) -> Result<SocketAddrV4, CliError> {
    Ok(parse_endpoint(input)?)
}

/// Parse and validate a topic argument.
pub fn parse_topic(input: &str) -> Result<Topic, CliError> {
    Topic::parse(input).map_err(|e| CliError::invalid_topic(input, e))
}
