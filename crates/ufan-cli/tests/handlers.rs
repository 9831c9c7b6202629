//! Handlers exercised against real loopback sockets.

use std::net::{Ipv4Addr, SocketAddr, SocketAddrV4};
use std::sync::Arc;
use std::time::Duration;

use tokio::net::UdpSocket;

use ufan_broker::{BrokerConfig, BrokerSupervisor};
use ufan_cli::handlers::{publish, server, subscribe};
use ufan_cli::{Cli, CliError, exit_code_for};
use ufan_client::{Publisher, Subscriber, SubscriberConfig};
use ufan_core::{Frame, MessageType, Settings, SystemClock, Topic};

#[tokio::test]
async fn test_publish_handler_sends_datagram() {
    let sink = UdpSocket::bind("127.0.0.1:0").await.unwrap();
    let SocketAddr::V4(addr) = sink.local_addr().unwrap() else {
        panic!("expected IPv4 address");
    };

    tokio_test::assert_ok!(publish::execute(&addr.to_string(), "a.b", "hello").await);

    let mut buf = [0u8; 128];
    let (len, _) = tokio::time::timeout(Duration::from_secs(5), sink.recv_from(&mut buf))
        .await
        .unwrap()
        .unwrap();
    let frame = Frame::parse(&buf[..len]).unwrap();
    assert_eq!(frame.kind(), MessageType::Publish);
    assert_eq!(frame.header.topic(), Topic::parse("a.b").unwrap());
    assert_eq!(frame.payload, b"hello");
}

#[tokio::test]
async fn test_publish_handler_rejects_bad_endpoint() {
    let err = publish::execute("not-an-endpoint", "a", "x").await.unwrap_err();
    assert_eq!(exit_code_for(&err), 2);
    assert_eq!(
        err.to_string(),
        "Invalid endpoint: 'not-an-endpoint' (expected <ipv4>:<port>)"
    );
}

#[tokio::test]
async fn test_publish_handler_rejects_bad_topic() {
    let err = publish::execute("127.0.0.1:9", "a.z", "x").await.unwrap_err();
    assert_eq!(exit_code_for(&err), 2);
    assert!(err.to_string().starts_with("Invalid topic: 'a.z' - "));
}

#[test]
fn test_server_rejects_invalid_settings() {
    let settings = Settings {
        heartbeat_interval_ms: Some(0),
        ..Settings::with_defaults()
    };
    let err = server::resolve(&settings, None).unwrap_err();
    assert_eq!(CliError::from(err).exit_code(), 78);
}

#[test]
fn test_no_command_is_accepted() {
    use clap::Parser;
    let cli = Cli::parse_from(["ufan"]);
    assert!(cli.command.is_none());
}

#[tokio::test]
async fn test_receive_until_stops_after_messages_on_shutdown() {
    let supervisor = BrokerSupervisor::new();
    let SocketAddr::V4(server) = supervisor
        .start(BrokerConfig {
            bind: SocketAddrV4::new(Ipv4Addr::LOCALHOST, 0),
            ..BrokerConfig::default()
        })
        .await
        .unwrap()
    else {
        panic!("expected IPv4 address");
    };

    let topic = Topic::parse("a.b").unwrap();
    let config = SubscriberConfig {
        heartbeat_interval: Duration::from_millis(50),
        heartbeat_timeout: Duration::from_millis(1_000),
        ..SubscriberConfig::default()
    };
    let mut sub = Subscriber::with_clock(server, topic, config, Arc::new(SystemClock))
        .await
        .unwrap();
    tokio_test::assert_ok!(sub.wait_subscribed(Duration::from_secs(5)).await);

    let mut publisher = Publisher::connect(server).await.unwrap();
    for payload in [&b"one"[..], b"two", b"three"] {
        publisher.publish(topic, payload).await.unwrap();
    }

    // Shutdown fires only after the loop has gone round several times
    let mut seen = Vec::new();
    let handled = tokio::time::timeout(
        Duration::from_secs(5),
        subscribe::receive_until(&mut sub, tokio::time::sleep(Duration::from_millis(500)), |m| {
            seen.push(m.to_vec());
        }),
    )
    .await
    .expect("shutdown future was lost")
    .unwrap();

    assert_eq!(handled, 3);
    assert_eq!(seen, vec![b"one".to_vec(), b"two".to_vec(), b"three".to_vec()]);

    supervisor.stop().await.unwrap();
}
