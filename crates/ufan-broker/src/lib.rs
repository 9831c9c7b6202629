//! UDP fan-out broker.
//!
//! - [`broker`] - client table and dispatch rules, no I/O
//! - [`server`] - the `serve()` loop over a bound UDP socket
//! - [`supervisor`] - start/stop/status of a broker task
//! - [`standalone`] - foreground run until Ctrl-C
#![deny(unsafe_code)]

pub mod broker;
pub mod error;
pub mod server;
pub mod standalone;
pub mod supervisor;

pub use broker::{Broker, ClientData, Outgoing};
pub use error::BrokerError;
pub use server::{BrokerConfig, serve};
pub use standalone::run_standalone;
pub use supervisor::{BrokerStatus, BrokerSupervisor, SupervisorError};
