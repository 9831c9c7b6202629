//! Core error type for resolving configuration.

use thiserror::Error;

use crate::endpoint::EndpointError;
use crate::settings::SettingsError;

/// Failure while turning environment, flags and defaults into settings.
#[derive(Debug, Error)]
pub enum CoreError {
    /// An address did not parse as `<ipv4>:<port>`.
    #[error(transparent)]
    Endpoint(#[from] EndpointError),

    /// Settings are unreadable or fail validation.
    #[error(transparent)]
    Settings(#[from] SettingsError),
}
