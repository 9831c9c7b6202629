use thiserror::Error;

/// Fatal errors of a running broker.
#[derive(Debug, Error)]
pub enum BrokerError {
    #[error("socket error: {0}")]
    Io(#[from] std::io::Error),

    #[error("invalid configuration: {0}")]
    Config(#[from] ufan_core::SettingsError),
}
