//! Available subcommands.

use clap::Subcommand;

/// Default broker address used by the demo client.
pub const DEFAULT_SERVER: &str = "127.0.0.1:42069";

#[derive(Debug, Subcommand)]
pub enum Commands {
    /// Run the broker until Ctrl-C
    Server {
        /// Address to bind, overriding UFAN_BIND (e.g. "0.0.0.0:42069")
        #[arg(short, long)]
        bind: Option<String>,
    },

    /// Publish one message
    Publish {
        /// Broker address as <ipv4>:<port>
        endpoint: String,
        /// Topic, e.g. "a.b.c"
        topic: String,
        /// Message payload, sent as raw UTF-8 bytes
        data: String,
    },

    /// Subscribe and hex-dump every matching message
    Subscribe {
        /// Broker address as <ipv4>:<port>
        endpoint: String,
        /// Topic pattern, e.g. "a.*.c" or "a.>"
        topic: String,
    },

    /// Publish timestamps and log the round-trip latency of the echoes
    Latency {
        /// Broker address as <ipv4>:<port>
        #[arg(short, long, default_value = DEFAULT_SERVER)]
        server: String,
        /// Topic the timestamps are published under
        #[arg(long, default_value = "a.b.f.a.c.e.g.h")]
        publish_topic: String,
        /// Topic pattern to subscribe to
        #[arg(long, default_value = "a.b.>")]
        subscribe_topic: String,
        /// Milliseconds between published timestamps
        #[arg(long, default_value_t = 5000)]
        period_ms: u64,
    },

    /// Print the resolved settings as JSON
    Settings,
}

#[cfg(test)]
mod tests {
    use crate::Cli;
    use crate::commands::Commands;
    use clap::Parser;

    #[test]
    fn test_publish_positionals() {
        let cli = Cli::parse_from(["ufan", "publish", "127.0.0.1:42069", "a.b", "hello"]);
        match cli.command {
            Some(Commands::Publish {
                endpoint,
                topic,
                data,
            }) => {
                assert_eq!(endpoint, "127.0.0.1:42069");
                assert_eq!(topic, "a.b");
                assert_eq!(data, "hello");
            }
            other => panic!("Expected Publish, got {other:?}"),
        }
    }

    #[test]
    fn test_latency_defaults() {
        let cli = Cli::parse_from(["ufan", "latency"]);
        match cli.command {
            Some(Commands::Latency {
                server,
                publish_topic,
                subscribe_topic,
                period_ms,
            }) => {
                assert_eq!(server, super::DEFAULT_SERVER);
                assert_eq!(publish_topic, "a.b.f.a.c.e.g.h");
                assert_eq!(subscribe_topic, "a.b.>");
                assert_eq!(period_ms, 5000);
            }
            other => panic!("Expected Latency, got {other:?}"),
        }
    }

    #[test]
    fn test_server_bind_is_optional() {
        let cli = Cli::parse_from(["ufan", "server"]);
        assert!(matches!(cli.command, Some(Commands::Server { bind: None })));

        let cli = Cli::parse_from(["ufan", "server", "--bind", "127.0.0.1:1"]);
        assert!(matches!(
            cli.command,
            Some(Commands::Server { bind: Some(ref b) }) if b == "127.0.0.1:1"
        ));
    }

    #[test]
    fn test_subscribe_requires_topic() {
        assert!(Cli::try_parse_from(["ufan", "subscribe", "127.0.0.1:42069"]).is_err());
    }
}
