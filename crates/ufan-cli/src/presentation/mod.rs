//! Terminal output helpers.
//!
//! Format-only: functions here turn bytes into text and never touch sockets.

pub mod hexdump;

pub use hexdump::{format_hex_dump, print_message};
