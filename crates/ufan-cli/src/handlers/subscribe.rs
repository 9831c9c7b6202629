//! `ufan subscribe`: print every matching message until Ctrl-C.

use std::future::Future;

use anyhow::Result;
use tracing::info;

use ufan_client::Subscriber;
use ufan_core::Settings;

use super::{parse_server, parse_topic};
use crate::error::CliError;
use crate::presentation::print_message;

/// Hand each message to `on_message` until `shutdown` resolves.
///
/// Returns how many messages were handled.
pub async fn receive_until<F>(
    subscriber: &mut Subscriber,
    shutdown: F,
    mut on_message: impl FnMut(&[u8]),
) -> Result<usize, CliError>
where
    F: Future,
{
    tokio::pin!(shutdown);
    let mut handled = 0;
    loop {
        tokio::select! {
            _ = &mut shutdown => return Ok(handled),
            message = subscriber.next_message() => {
                on_message(&message?);
                handled += 1;
            }
        }
    }
}

pub async fn execute(settings: &Settings, endpoint: &str, topic: &str) -> Result<()> {
    let server = parse_server(endpoint)?;
    let parsed = parse_topic(topic)?;

    let mut subscriber = Subscriber::connect(server, parsed, settings)
        .await
        .map_err(CliError::from)?;

    println!("subscribed to {endpoint} topic={topic} (Ctrl-C to exit)");

    let handled = receive_until(&mut subscriber, tokio::signal::ctrl_c(), print_message).await?;
    info!(messages = handled, "Interrupted, unsubscribing");
    Ok(())
}
