//! Integration tests for the on-the-wire datagram format.
//!
//! These pin the byte layout peers rely on, independent of the builder
//! internals.

use ufan_core::{Frame, HEADER_LEN, Header, MessageBuilder, MessageType, Topic};

#[test]
fn test_publish_datagram_bytes() {
    let topic = Topic::parse("a.b.>").unwrap();
    let mut builder = MessageBuilder::new();
    let bytes = builder.build_with(Header::publish(topic), b"hi");

    assert_eq!(
        bytes.as_ref(),
        &[
            0x00, b'P', 0x01, 0x02, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, b'h', b'i'
        ]
    );
}

#[test]
fn test_subscribe_datagram_is_header_only() {
    let topic = Topic::parse("c").unwrap();
    let mut builder = MessageBuilder::new();
    let bytes = builder.build(Header::subscribe(topic));

    assert_eq!(bytes.len(), HEADER_LEN);
    let frame = Frame::parse(&bytes).unwrap();
    assert_eq!(frame.kind(), MessageType::Subscribe);
    assert_eq!(frame.header.topic(), topic);
}

#[test]
fn test_parse_foreign_heartbeat_reply() {
    // Reply as a peer would send it: ts = 1000, echoed topic "a"
    let mut raw = vec![0x00, b'H'];
    raw.extend_from_slice(&1000_i64.to_le_bytes());
    raw.extend_from_slice(&[0x01, 0, 0, 0, 0, 0, 0, 0]);

    let reply = Frame::parse(&raw).unwrap().heartbeat_reply().unwrap();
    assert_eq!(reply.timestamp, 1000);
    assert_eq!(reply.topic, Topic::parse("a").unwrap());
}

#[test]
fn test_reserved_byte_is_ignored_on_parse() {
    let mut raw = vec![0x7F, b'E'];
    raw.extend_from_slice(&[0; 8]);
    let frame = Frame::parse(&raw).unwrap();
    assert_eq!(frame.kind(), MessageType::Error);
}
