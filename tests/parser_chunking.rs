//! Property-based tests for the stream parser: however the byte stream is
//! chunked, the same messages come out and no bytes are lost.

use ofconn::{hello, Message, Parser, Payload, Version};
use proptest::prelude::*;

fn arbitrary_message() -> impl Strategy<Value = Message> {
    (
        any::<u32>(),
        prop::collection::vec(any::<u8>(), 0..64),
        0..5u8,
    )
        .prop_map(|(xid, data, pick)| {
            let payload = match pick {
                0 => Payload::EchoRequest(data),
                1 => Payload::EchoReply(data),
                2 => Payload::FlowMod(data),
                3 => Payload::Hello(hello::PacketRepr::new(vec![
                    hello::ElementRepr::VersionBitmap(vec![
                        Version::OpenFlow1Dot0,
                        Version::OpenFlow1Dot3,
                    ]),
                ])),
                _ => Payload::BarrierRequest,
            };
            Message {
                version: Version::OpenFlow1Dot3,
                xid,
                payload,
            }
        })
}

#[test]
fn prop_encode_decode_roundtrip() {
    proptest!(|(message in arbitrary_message())| {
        let bytes = message.to_bytes().unwrap();

        // the emitted length field covers the whole output
        let length = u16::from_be_bytes([bytes[2], bytes[3]]) as usize;
        prop_assert_eq!(length, bytes.len());

        let (decoded, rest) = Message::decode(&bytes).unwrap();
        prop_assert_eq!(decoded, message);
        prop_assert!(rest.is_empty());
    });
}

#[test]
fn prop_chunking_preserves_the_message_sequence() {
    proptest!(|(
        messages in prop::collection::vec(arbitrary_message(), 1..8),
        chunk_sizes in prop::collection::vec(1usize..32, 1..16),
    )| {
        let mut stream = Vec::new();
        for message in &messages {
            stream.extend(message.to_bytes().unwrap());
        }

        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let mut decoded = Vec::new();
        let mut offset = 0;
        let mut turn = 0;
        while offset < stream.len() {
            let size = chunk_sizes[turn % chunk_sizes.len()].min(stream.len() - offset);
            decoded.extend(parser.feed(&stream[offset..offset + size]).unwrap());
            offset += size;
            turn += 1;
        }
        prop_assert_eq!(decoded, messages);
    });
}
