//! `ufan publish`: send a single message.

use anyhow::Result;

use ufan_client::Publisher;

use super::{parse_server, parse_topic};
use crate::error::CliError;

pub async fn execute(endpoint: &str, topic: &str, data: &str) -> Result<()> {
    let server = parse_server(endpoint)?;
    let parsed = parse_topic(topic)?;

    let mut publisher = Publisher::connect(server).await.map_err(CliError::from)?;
    publisher
        .publish(parsed, data.as_bytes())
        .await
        .map_err(CliError::from)?;

    println!(
        "published {} bytes to {endpoint} topic={topic}",
        data.len()
    );
    Ok(())
}
