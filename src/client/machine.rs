//! The endpoint state machine, free of any I/O.
//!
//! The [`Machine`] consumes connection events (socket opened, bytes
//! received, connection lost) and emits [`Action`]s: bytes to write on the
//! socket, upcalls to deliver to the controlling process, and connection
//! teardowns for the runtime to execute. Keeping the machine sans-IO keeps
//! the negotiation, dispatch and filtering logic testable without a
//! socket.

use core::cmp::Ordering;
use core::mem;

use log::{debug, error};

use super::{AsyncFilter, CloseReason, Role, SendError, Upcall};
use crate::packets::error::{self, BadRequestCode};
use crate::packets::hello::{ElementRepr, PacketRepr as HelloRepr};
use crate::packets::openflow::{Kind, Message, Payload, Version, HEADER_LEN};
use crate::parser::Parser;
use crate::Result;

/// What the runtime must do after handing an event to the machine.
#[derive(Debug, PartialEq, Eq)]
pub(super) enum Action {
    /// Write these bytes to the socket.
    Write(Vec<u8>),
    /// Deliver this upcall to the controlling process.
    Deliver(Upcall),
    /// Close the socket and re-arm the reconnect timer. The machine is
    /// already back in the disconnected state.
    Close(CloseReason),
}

#[derive(Debug)]
enum State {
    /// No socket. The runtime retries connecting on a timer.
    Disconnected,
    /// Socket open, own HELLO sent, waiting for the controller's HELLO.
    /// The version is not negotiated yet so there is no parser; the first
    /// message is accumulated and decoded standalone.
    Connecting { buffer: Vec<u8> },
    /// HELLO matched; inbound bytes flow through the parser.
    Open { parser: Parser },
}

/// The connection endpoint core: version negotiation, role policy, message
/// routing.
#[derive(Debug)]
pub(super) struct Machine {
    /// The supported versions, unique, ascending by wire code. Never
    /// empty.
    versions: Vec<Version>,
    role: Role,
    filter: AsyncFilter,
    generation_id: u64,
    state: State,
}

impl Machine {
    pub(super) fn new(versions: Vec<Version>) -> Machine {
        debug_assert!(!versions.is_empty());
        Machine {
            versions,
            role: Role::default(),
            filter: AsyncFilter::default(),
            generation_id: 0,
            state: State::Disconnected,
        }
    }

    pub(super) fn role(&self) -> Role {
        self.role
    }

    /// The monotonic generation id of the last role change. Advisory: role
    /// requests are reserved, so it stays at its initial value for now.
    #[allow(dead_code)]
    pub(super) fn generation_id(&self) -> u64 {
        self.generation_id
    }

    /// The version negotiated on the current connection, if HELLO has
    /// completed.
    pub(super) fn negotiated_version(&self) -> Option<Version> {
        match &self.state {
            State::Open { parser } => Some(parser.version()),
            _ => None,
        }
    }

    /// Demote master to slave. Any other role is left untouched.
    pub(super) fn make_slave(&mut self) {
        if self.role == Role::Master {
            self.role = Role::Slave;
        }
    }

    /// Replace the asynchronous-message filter.
    #[allow(dead_code)]
    pub(super) fn set_async_filter(&mut self, filter: AsyncFilter) {
        self.filter = filter;
    }

    /// The socket just connected: build our HELLO and start waiting for
    /// the controller's.
    ///
    /// The HELLO header carries our highest supported version; from
    /// version 4 on, the body carries a version bitmap of the whole set.
    pub(super) fn connection_opened(&mut self) -> Result<Vec<u8>> {
        let version = self.highest_version();
        let elements = if u8::from(version) >= 4 {
            vec![ElementRepr::VersionBitmap(self.versions.clone())]
        } else {
            vec![]
        };
        let hello = Message {
            version,
            xid: 0,
            payload: Payload::Hello(HelloRepr::new(elements)),
        };
        let bytes = hello.to_bytes()?;
        self.state = State::Connecting { buffer: Vec::new() };
        Ok(bytes)
    }

    /// The socket died underneath us.
    pub(super) fn connection_lost(&mut self, reason: CloseReason) -> Vec<Action> {
        match self.state {
            State::Disconnected => vec![],
            _ => self.reset(reason),
        }
    }

    /// A chunk of bytes arrived on the socket.
    pub(super) fn data_received(&mut self, bytes: &[u8]) -> Vec<Action> {
        match &mut self.state {
            State::Disconnected => vec![],
            State::Connecting { buffer } => {
                buffer.extend_from_slice(bytes);
                if buffer.len() < HEADER_LEN {
                    return vec![];
                }
                let length = u16::from_be_bytes([buffer[2], buffer[3]]) as usize;
                if length < HEADER_LEN {
                    return self.reset(CloseReason::BadInitialMessage);
                }
                if buffer.len() < length {
                    return vec![];
                }
                let buffer = mem::take(buffer);
                match Message::decode(&buffer) {
                    Ok((message, rest)) => self.initial_message(message, rest),
                    Err(_) => self.reset(CloseReason::BadInitialMessage),
                }
            }
            State::Open { .. } => self.stream_data(bytes),
        }
    }

    /// Queue an outbound message: returns the bytes to put on the wire, or
    /// the reason the message was refused.
    pub(super) fn send(&mut self, message: Message) -> core::result::Result<Vec<u8>, SendError> {
        let kind = message.kind();
        if !kind.is_outbound() {
            return Err(SendError::BadMessage(Box::new(message)));
        }
        let State::Open { parser } = &self.state else {
            return Err(SendError::NotConnected);
        };
        if !self.allows(kind) {
            return Err(SendError::Filtered);
        }
        parser.encode(&message).map_err(SendError::Encode)
    }

    fn highest_version(&self) -> Version {
        *self.versions.last().unwrap_or(&Version::OpenFlow1Dot3)
    }

    fn initial_message(&mut self, message: Message, rest: &[u8]) -> Vec<Action> {
        let Payload::Hello(body) = &message.payload else {
            return self.reset(CloseReason::BadInitialMessage);
        };
        match decide_on_version(&self.versions, message.version, body) {
            Ok(version) => {
                debug!(target: "ofconn", "negotiated version {:?}", version);
                self.state = State::Open {
                    parser: Parser::new(version),
                };
                let mut actions = vec![Action::Deliver(Upcall::Connected(version))];
                // bytes the controller sent right behind its HELLO now go
                // through the parser
                if !rest.is_empty() {
                    actions.extend(self.stream_data(rest));
                }
                actions
            }
            Err(reason) => self.reset(reason),
        }
    }

    fn stream_data(&mut self, bytes: &[u8]) -> Vec<Action> {
        let State::Open { parser } = &mut self.state else {
            return vec![];
        };
        match parser.feed(bytes) {
            Ok(messages) => {
                let mut actions = Vec::new();
                for message in messages {
                    actions.extend(self.dispatch(message));
                }
                actions
            }
            Err(err) => self.reset(CloseReason::BadData(err.bytes)),
        }
    }

    fn dispatch(&mut self, message: Message) -> Vec<Action> {
        let kind = message.kind();
        if self.role == Role::Slave && is_slave_blocked(kind) {
            // the controller is not allowed to modify switch state, answer
            // in the endpoint's name without involving the parent
            return match slave_denial(message.version, message.xid) {
                Ok(bytes) => vec![Action::Write(bytes)],
                Err(err) => {
                    error!(target: "ofconn", "building is-slave error failed: {}", err);
                    vec![]
                }
            };
        }
        if is_forwardable(kind) {
            vec![Action::Deliver(Upcall::MessageReceived(message))]
        } else {
            // role_request, get_async_request and set_async handling is
            // reserved; they are dropped together with everything else the
            // parent has no business seeing
            vec![]
        }
    }

    fn allows(&self, kind: Kind) -> bool {
        let mask = match self.role {
            Role::Slave => &self.filter.slave,
            Role::Master | Role::Equal => &self.filter.master_equal,
        };
        match kind {
            Kind::PacketIn => mask.packet_in,
            Kind::PortStatus => mask.port_status,
            Kind::FlowRemoved => mask.flow_removed,
            _ => true,
        }
    }

    fn reset(&mut self, reason: CloseReason) -> Vec<Action> {
        self.state = State::Disconnected;
        vec![
            Action::Deliver(Upcall::ConnectionClosed(reason.clone())),
            Action::Close(reason),
        ]
    }
}

/// Inbound request types a slave controller may not issue.
fn is_slave_blocked(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::FlowMod | Kind::GroupMod | Kind::PortMod | Kind::TableMod | Kind::MeterMod
    )
}

/// Inbound types the parent acts upon.
fn is_forwardable(kind: Kind) -> bool {
    matches!(
        kind,
        Kind::EchoRequest
            | Kind::FeaturesRequest
            | Kind::GetConfigRequest
            | Kind::SetConfig
            | Kind::PacketOut
            | Kind::FlowMod
            | Kind::GroupMod
            | Kind::PortMod
            | Kind::TableMod
            | Kind::StatsRequest
            | Kind::BarrierRequest
            | Kind::QueueGetConfigRequest
            | Kind::MeterMod
    )
}

// The error reply written on behalf of a slave-blocked request. The error
// layout is stable across the supported versions, so one builder covers
// them all.
fn slave_denial(version: Version, xid: u32) -> Result<Vec<u8>> {
    Message {
        version,
        xid,
        payload: Payload::Error(error::PacketRepr {
            header: error::Header::BadRequest(BadRequestCode::IsSlave),
            data: vec![],
        }),
    }
    .to_bytes()
}

/// Pick the version to speak with a controller whose HELLO carried header
/// version `server_version` and body `hello`.
fn decide_on_version(
    client_versions: &[Version],
    server_version: Version,
    hello: &HelloRepr,
) -> core::result::Result<Version, CloseReason> {
    let client_max = *client_versions
        .last()
        .unwrap_or(&Version::OpenFlow1Dot3);
    if u8::from(client_max) >= 4 {
        if client_max == server_version {
            return Ok(client_max);
        }
        // fall back to the bare header version only when no bitmap element
        // is present; an empty bitmap means an empty set
        let server_versions = match hello.versions() {
            Some(versions) => {
                let mut versions = versions.to_vec();
                versions.sort_by_key(|v| u8::from(*v));
                versions.dedup();
                versions
            }
            None => vec![server_version],
        };
        greatest_common_version(client_versions, &server_versions).ok_or_else(|| {
            CloseReason::NoCommonVersion {
                client: client_versions.to_vec(),
                server: server_versions,
            }
        })
    } else if client_versions.contains(&server_version) {
        Ok(server_version)
    } else {
        Err(CloseReason::UnsupportedVersion(server_version))
    }
}

// Merge over the two sets, both ascending, walked from the top.
fn greatest_common_version(client: &[Version], server: &[Version]) -> Option<Version> {
    let mut client = client.iter().rev().peekable();
    let mut server = server.iter().rev().peekable();
    loop {
        let cv = **client.peek()?;
        let sv = **server.peek()?;
        match u8::from(cv).cmp(&u8::from(sv)) {
            Ordering::Equal => return Some(cv),
            Ordering::Greater => {
                client.next();
            }
            Ordering::Less => {
                server.next();
            }
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    fn versions(set: &[u8]) -> Vec<Version> {
        set.iter().map(|v| Version::from(*v)).collect()
    }

    fn server_hello(version: u8, bitmap: Option<&[u8]>) -> Vec<u8> {
        let elements = match bitmap {
            Some(set) => vec![ElementRepr::VersionBitmap(versions(set))],
            None => vec![],
        };
        Message {
            version: Version::from(version),
            xid: 1,
            payload: Payload::Hello(HelloRepr::new(elements)),
        }
        .to_bytes()
        .unwrap()
    }

    fn open_machine(set: &[u8], server: &[u8]) -> Machine {
        let mut machine = Machine::new(versions(set));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(server);
        assert!(matches!(
            actions.first(),
            Some(Action::Deliver(Upcall::Connected(_)))
        ));
        machine
    }

    #[test]
    fn test_own_hello_carries_highest_version_and_bitmap() {
        let mut machine = Machine::new(versions(&[1, 4, 5]));
        let bytes = machine.connection_opened().unwrap();
        let (hello, _) = Message::decode(&bytes).unwrap();
        assert_eq!(hello.version, Version::OpenFlow1Dot4);
        let Payload::Hello(body) = &hello.payload else {
            panic!("not a hello");
        };
        assert_eq!(body.versions().unwrap(), &versions(&[1, 4, 5])[..]);
    }

    #[test]
    fn test_own_hello_below_version_four_has_no_elements() {
        let mut machine = Machine::new(versions(&[1, 3]));
        let bytes = machine.connection_opened().unwrap();
        assert_eq!(bytes.len(), HEADER_LEN);
        let (hello, _) = Message::decode(&bytes).unwrap();
        assert_eq!(hello.version, Version::OpenFlow1Dot2);
    }

    #[test]
    fn test_basic_negotiation() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(4, None));
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot3))]
        );
        assert_eq!(machine.negotiated_version(), Some(Version::OpenFlow1Dot3));
    }

    #[test]
    fn test_bitmap_intersection() {
        let mut machine = Machine::new(versions(&[4, 5]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(4, Some(&[3, 4])));
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot3))]
        );
    }

    #[test]
    fn test_no_common_version() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(3, Some(&[1, 2, 3])));
        let reason = CloseReason::NoCommonVersion {
            client: versions(&[4]),
            server: versions(&[1, 2, 3]),
        };
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::ConnectionClosed(reason.clone())),
                Action::Close(reason),
            ]
        );
        assert_eq!(machine.negotiated_version(), None);
    }

    #[test]
    fn test_empty_bitmap_with_mismatched_header() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(3, Some(&[])));
        assert!(matches!(
            actions.first(),
            Some(Action::Deliver(Upcall::ConnectionClosed(
                CloseReason::NoCommonVersion { .. }
            )))
        ));
    }

    #[test]
    fn test_header_fallback_when_no_bitmap() {
        // server speaks 1.3 but sent no bitmap element: its header version
        // is all we have
        let mut machine = Machine::new(versions(&[4, 5]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(4, None));
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot3))]
        );
    }

    #[test]
    fn test_pre_four_client_takes_server_version() {
        let mut machine = Machine::new(versions(&[1, 3]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(1, None));
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot0))]
        );
    }

    #[test]
    fn test_pre_four_client_rejects_unknown_version() {
        let mut machine = Machine::new(versions(&[1, 3]));
        machine.connection_opened().unwrap();
        let actions = machine.data_received(&server_hello(2, None));
        let reason = CloseReason::UnsupportedVersion(Version::OpenFlow1Dot1);
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::ConnectionClosed(reason.clone())),
                Action::Close(reason),
            ]
        );
    }

    #[test]
    fn test_non_hello_first_message() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let echo = Message {
            version: Version::OpenFlow1Dot3,
            xid: 9,
            payload: Payload::EchoRequest(vec![]),
        };
        let actions = machine.data_received(&echo.to_bytes().unwrap());
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::ConnectionClosed(CloseReason::BadInitialMessage)),
                Action::Close(CloseReason::BadInitialMessage),
            ]
        );
    }

    #[test]
    fn test_hello_accumulates_across_chunks() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let hello = server_hello(4, Some(&[4]));
        assert_eq!(machine.data_received(&hello[..3]), vec![]);
        let actions = machine.data_received(&hello[3..]);
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot3))]
        );
    }

    #[test]
    fn test_residual_bytes_after_hello_reach_the_parser() {
        let mut machine = Machine::new(versions(&[4]));
        machine.connection_opened().unwrap();
        let mut bytes = server_hello(4, None);
        let echo = Message {
            version: Version::OpenFlow1Dot3,
            xid: 3,
            payload: Payload::EchoRequest(b"tail".to_vec()),
        };
        bytes.extend(echo.to_bytes().unwrap());
        let actions = machine.data_received(&bytes);
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::Connected(Version::OpenFlow1Dot3)),
                Action::Deliver(Upcall::MessageReceived(echo)),
            ]
        );
    }

    #[test]
    fn test_forwardable_messages_reach_parent() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        let flow_mod = Message {
            version: Version::OpenFlow1Dot3,
            xid: 7,
            payload: Payload::FlowMod(vec![1, 2, 3]),
        };
        let actions = machine.data_received(&flow_mod.to_bytes().unwrap());
        assert_eq!(
            actions,
            vec![Action::Deliver(Upcall::MessageReceived(flow_mod))]
        );
    }

    #[test]
    fn test_reserved_inbound_types_are_dropped() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        for payload in [
            Payload::RoleRequest(vec![0; 8]),
            Payload::GetAsyncRequest,
            Payload::SetAsync(vec![0; 24]),
        ] {
            let message = Message {
                version: Version::OpenFlow1Dot3,
                xid: 5,
                payload,
            };
            assert_eq!(machine.data_received(&message.to_bytes().unwrap()), vec![]);
        }
    }

    #[test]
    fn test_slave_denial() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        machine.role = Role::Slave;
        let flow_mod = Message {
            version: Version::OpenFlow1Dot3,
            xid: 42,
            payload: Payload::FlowMod(vec![1, 2, 3]),
        };
        let actions = machine.data_received(&flow_mod.to_bytes().unwrap());

        // no upcall: the denial goes straight to the socket
        let [Action::Write(bytes)] = &actions[..] else {
            panic!("expected a single write, got {:?}", actions);
        };
        let (reply, _) = Message::decode(bytes).unwrap();
        assert_eq!(reply.xid, 42);
        assert_eq!(
            reply.payload,
            Payload::Error(error::PacketRepr {
                header: error::Header::BadRequest(BadRequestCode::IsSlave),
                data: vec![],
            })
        );
    }

    #[test]
    fn test_slave_still_receives_reads() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        machine.role = Role::Slave;
        let echo = Message {
            version: Version::OpenFlow1Dot3,
            xid: 1,
            payload: Payload::EchoRequest(vec![]),
        };
        let actions = machine.data_received(&echo.to_bytes().unwrap());
        assert_eq!(actions, vec![Action::Deliver(Upcall::MessageReceived(echo))]);
    }

    #[test]
    fn test_make_slave_only_demotes_master() {
        let mut machine = Machine::new(versions(&[4]));
        machine.make_slave();
        assert_eq!(machine.role(), Role::Equal);
        machine.role = Role::Master;
        machine.make_slave();
        assert_eq!(machine.role(), Role::Slave);
        machine.make_slave();
        assert_eq!(machine.role(), Role::Slave);
    }

    #[test]
    fn test_send_checks_direction_then_state() {
        let mut machine = Machine::new(versions(&[4]));
        let inbound = Message {
            version: Version::OpenFlow1Dot3,
            xid: 0,
            payload: Payload::FlowMod(vec![]),
        };
        assert!(matches!(
            machine.send(inbound),
            Err(SendError::BadMessage(_))
        ));

        let reply = Message {
            version: Version::OpenFlow1Dot3,
            xid: 0,
            payload: Payload::EchoReply(vec![]),
        };
        assert_eq!(machine.send(reply), Err(SendError::NotConnected));
    }

    #[test]
    fn test_async_filter() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        let packet_in = Message {
            version: Version::OpenFlow1Dot3,
            xid: 0,
            payload: Payload::PacketIn(crate::packets::packet_in::PacketRepr {
                buffer_id: 0xffff_ffff,
                total_len: 0,
                reason: crate::packets::packet_in::Reason::TableMiss,
                table_id: 0,
                flow_match: crate::oxm::FlowMatch(vec![]),
                data: vec![],
            }),
        };
        assert!(machine.send(packet_in.clone()).is_ok());

        let mut filter = AsyncFilter::default();
        filter.master_equal.packet_in = false;
        machine.set_async_filter(filter);
        assert_eq!(machine.send(packet_in.clone()), Err(SendError::Filtered));

        // non-async outbound types pass regardless of the filter
        let echo = Message {
            version: Version::OpenFlow1Dot3,
            xid: 0,
            payload: Payload::EchoReply(vec![]),
        };
        assert!(machine.send(echo).is_ok());
    }

    #[test]
    fn test_slave_async_defaults() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        machine.role = Role::Slave;
        let port_status = Message {
            version: Version::OpenFlow1Dot3,
            xid: 0,
            payload: Payload::PortStatus(crate::packets::port_status::PacketRepr {
                reason: crate::packets::port_status::Reason::Add,
                port: crate::port::Port {
                    port_no: crate::port::PortNumber::Regular(1),
                    hw_addr: smoltcp::wire::EthernetAddress::from_bytes(&[0; 6]),
                    name: String::new(),
                    config: crate::port::PortConfig::empty(),
                    state: crate::port::PortState::empty(),
                    curr: crate::port::PortFeatures::empty(),
                    advertised: crate::port::PortFeatures::empty(),
                    supported: crate::port::PortFeatures::empty(),
                    peer: crate::port::PortFeatures::empty(),
                    curr_speed: 0,
                    max_speed: 0,
                },
            }),
        };
        assert_eq!(machine.send(port_status), Err(SendError::Filtered));
    }

    #[test]
    fn test_encode_error_on_version_without_type() {
        // role reply does not exist on an OpenFlow 1.0 connection
        let mut machine = open_machine(&[1, 4], &server_hello(1, None));
        assert_eq!(machine.negotiated_version(), Some(Version::OpenFlow1Dot0));
        let role_reply = Message {
            version: Version::OpenFlow1Dot0,
            xid: 0,
            payload: Payload::RoleReply(vec![0; 8]),
        };
        assert_eq!(
            machine.send(role_reply),
            Err(SendError::Encode(crate::Error::BadVersion))
        );
    }

    #[test]
    fn test_connection_lost_reports_once() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        let actions = machine.connection_lost(CloseReason::TcpClosed);
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::ConnectionClosed(CloseReason::TcpClosed)),
                Action::Close(CloseReason::TcpClosed),
            ]
        );
        assert_eq!(machine.connection_lost(CloseReason::TcpClosed), vec![]);
    }

    #[test]
    fn test_bad_stream_data_resets() {
        let mut machine = open_machine(&[4], &server_hello(4, None));
        // length field below the header size
        let bad = [0x04, 0x02, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        let actions = machine.data_received(&bad);
        assert_eq!(
            actions,
            vec![
                Action::Deliver(Upcall::ConnectionClosed(CloseReason::BadData(bad.to_vec()))),
                Action::Close(CloseReason::BadData(bad.to_vec())),
            ]
        );
    }

    #[test]
    fn test_greatest_common_version() {
        let common = greatest_common_version(&versions(&[1, 3, 4]), &versions(&[3, 4, 5]));
        assert_eq!(common, Some(Version::OpenFlow1Dot3));
        let common = greatest_common_version(&versions(&[1, 4]), &versions(&[3, 5]));
        assert_eq!(common, None);
        assert_eq!(greatest_common_version(&versions(&[1]), &[]), None);
    }
}
