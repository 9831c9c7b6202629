//! `ufan server`: run the broker in the foreground.

use anyhow::Result;

use ufan_core::{CoreError, Settings, SettingsUpdate, parse_endpoint, validate_settings};

use crate::error::CliError;

/// Apply the `--bind` override to the resolved settings.
pub fn resolve(settings: &Settings, bind: Option<&str>) -> Result<Settings, CoreError> {
    let mut resolved = settings.clone();
    if let Some(bind) = bind {
        let update = SettingsUpdate {
            bind: Some(Some(parse_endpoint(bind)?)),
            ..Default::default()
        };
        resolved.merge(&update);
    }
    validate_settings(&resolved)?;
    Ok(resolved)
}

pub async fn execute(settings: &Settings, bind: Option<&str>) -> Result<()> {
    let resolved = resolve(settings, bind).map_err(CliError::from)?;
    println!(
        "ufan broker listening on {} (Ctrl-C to stop)",
        resolved.effective_bind()
    );
    ufan_broker::run_standalone(&resolved).await
}
