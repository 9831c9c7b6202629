//! Run a broker in the foreground until Ctrl-C.

use anyhow::{Result, anyhow};

use ufan_core::{Settings, validate_settings};

use crate::error::BrokerError;
use crate::server::BrokerConfig;
use crate::supervisor::BrokerSupervisor;

/// Start a broker from `settings`, block until SIGINT, then stop it.
pub async fn run_standalone(settings: &Settings) -> Result<()> {
    validate_settings(settings).map_err(BrokerError::from)?;

    let supervisor = BrokerSupervisor::new();
    let addr = supervisor
        .start(BrokerConfig::from(settings))
        .await
        .map_err(|e| anyhow!("{e}"))?;
    tracing::info!("Broker started on {addr}");

    // Wait for Ctrl-C
    tokio::signal::ctrl_c().await?;

    supervisor.stop().await.map_err(|e| anyhow!("{e}"))?;

    Ok(())
}
