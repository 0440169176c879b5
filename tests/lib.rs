//! Wire-level fixtures for whole messages: every vector here is a complete
//! message as captured on the wire, checked in both directions.

use ofconn::features_reply::Capabilities;
use ofconn::oxm::{consts, FlowMatch, Oxm, CLASS_OPEN_FLOW_BASIC};
use ofconn::switch_config::ConfigFlags;
use ofconn::{error, features_reply, hello, packet_in, switch_config};
use ofconn::{Kind, Message, Payload, Version};
use smoltcp::wire::EthernetAddress;

fn assert_roundtrip(bytes: &[u8], message: &Message) {
    let (parsed, rest) = Message::decode(bytes).expect("decode failed");
    assert_eq!(&parsed, message);
    assert!(rest.is_empty());

    assert_eq!(message.buffer_len(), bytes.len());
    assert_eq!(message.to_bytes().expect("emit failed"), bytes);
}

#[test]
fn hello() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 16] = [
        0x04,                   // version = OpenFlow 1.3
        0x00,                   // type = hello
        0x00, 0x10,             // length = 16
        0x00, 0x00, 0x00, 0x00, // xid
        0x00, 0x01,             // element type = version bitmap
        0x00, 0x08,             // element length
        0x00, 0x00, 0x00, 0x10, // bitmap: version 4
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 0,
        payload: Payload::Hello(hello::PacketRepr::new(vec![
            hello::ElementRepr::VersionBitmap(vec![Version::OpenFlow1Dot3]),
        ])),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn echo_request() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 12] = [
        0x04,                   // version
        0x02,                   // type = echo request
        0x00, 0x0c,             // length = 12
        0x00, 0x00, 0x00, 0x2a, // xid = 42
        b'p', b'i', b'n', b'g', // data
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 42,
        payload: Payload::EchoRequest(b"ping".to_vec()),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn features_request() {
    static BYTES: [u8; 8] = [0x04, 0x05, 0x00, 0x08, 0x00, 0x00, 0x00, 0x01];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 1,
        payload: Payload::FeaturesRequest,
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn features_reply() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 32] = [
        0x04,                   // version
        0x06,                   // type = features reply
        0x00, 0x20,             // length = 32
        0x00, 0x00, 0x00, 0x01, // xid
        0x00, 0x01, 0x02, 0x03, 0x04, 0x05, // datapath mac
        0x00, 0x2a,             // datapath id = 42
        0x00, 0x00, 0x01, 0x00, // n_buffers = 256
        0xfe,                   // n_tables
        0x00, 0x00, 0x00,       // padding
        0x00, 0x00, 0x00, 0x47, // capabilities
        0x00, 0x00, 0x00, 0x00, // padding
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 1,
        payload: Payload::FeaturesReply(features_reply::PacketRepr {
            datapath_mac: EthernetAddress::from_bytes(&[0x00, 0x01, 0x02, 0x03, 0x04, 0x05]),
            datapath_id: 42,
            n_buffers: 256,
            n_tables: 254,
            capabilities: Capabilities::FLOW_STATS
                | Capabilities::TABLE_STATS
                | Capabilities::PORT_STATS
                | Capabilities::QUEUE_STATS,
            ports: vec![],
        }),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn error_msg() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 20] = [
        0x04,                   // version
        0x01,                   // type = error
        0x00, 0x14,             // length = 20
        0x12, 0x34, 0x56, 0x78, // xid
        0x00, 0x04,             // error type = bad match
        0x00, 0x06,             // code = bad field
        0x06, 0x0e, 0x00, 0x08, // data
        0x00, 0x00, 0x00, 0x00,
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 0x12345678,
        payload: Payload::Error(error::PacketRepr {
            header: error::Header::BadMatch(error::BadMatchCode::BadField),
            data: vec![0x06, 0x0e, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00],
        }),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn set_config() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 12] = [
        0x04,                   // version
        0x09,                   // type = set config
        0x00, 0x0c,             // length = 12
        0x00, 0x00, 0x00, 0x05, // xid
        0x00, 0x00,             // flags: fragments pass through normally
        0x00, 0x80,             // miss_send_len = 128
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 5,
        payload: Payload::SetConfig(switch_config::PacketRepr {
            flags: ConfigFlags::empty(),
            miss_send_len: 128,
        }),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn packet_in() {
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 38] = [
        0x04,                   // version
        0x0a,                   // type = packet in
        0x00, 0x26,             // length = 38
        0x00, 0x00, 0x00, 0x00, // xid
        0x00, 0x00, 0x00, 0xc8, // buffer_id = 200
        0x03, 0xe8,             // total_len = 1000
        0x00,                   // reason = table miss
        0x64,                   // table_id = 100
        0x00, 0x01,             // match type = oxm
        0x00, 0x0c,             // match length = 12
        0x80, 0x00, 0x00, 0x04, // oxm header: basic, in_port
        0x00, 0x00, 0xab, 0xcd, // in_port value
        0x00, 0x00, 0x00, 0x00, // match padding
        0x00, 0x00,             // padding
        0x68, 0x6f, 0x67, 0x65, // packet data
    ];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 0,
        payload: Payload::PacketIn(packet_in::PacketRepr {
            buffer_id: 200,
            total_len: 1000,
            reason: packet_in::Reason::TableMiss,
            table_id: 100,
            flow_match: FlowMatch(vec![Oxm {
                class: CLASS_OPEN_FLOW_BASIC,
                field: consts::IN_PORT,
                value: vec![0x00, 0x00, 0xab, 0xcd],
                mask: None,
            }]),
            data: vec![0x68, 0x6f, 0x67, 0x65],
        }),
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn barrier_reply() {
    static BYTES: [u8; 8] = [0x04, 0x15, 0x00, 0x08, 0x00, 0x00, 0x00, 0x09];
    let message = Message {
        version: Version::OpenFlow1Dot3,
        xid: 9,
        payload: Payload::BarrierReply,
    };
    assert_roundtrip(&BYTES, &message);
}

#[test]
fn openflow_1_0_stats_request() {
    // in OpenFlow 1.0 the stats request sits at type code 16
    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 12] = [
        0x01,                   // version = OpenFlow 1.0
        0x10,                   // type = stats request
        0x00, 0x0c,             // length = 12
        0x00, 0x00, 0x00, 0x07, // xid
        0x00, 0x01, 0x00, 0x00, // opaque stats body
    ];
    let message = Message {
        version: Version::OpenFlow1Dot0,
        xid: 7,
        payload: Payload::StatsRequest(vec![0x00, 0x01, 0x00, 0x00]),
    };
    assert_eq!(message.kind(), Kind::StatsRequest);
    assert_roundtrip(&BYTES, &message);
}
