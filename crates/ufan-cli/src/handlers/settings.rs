//! `ufan settings`: show the resolved configuration.

use anyhow::Result;

use ufan_core::Settings;

pub fn render(settings: &Settings) -> Result<String> {
    Ok(serde_json::to_string_pretty(settings)?)
}

pub fn execute(settings: &Settings) -> Result<()> {
    println!("{}", render(settings)?);
    Ok(())
}
