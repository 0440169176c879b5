//! The OpenFlow message header and the top-level message type.
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |version |  type  |     length      |
//! +--------+--------+--------+--------+
//! |                xid                |
//! +--------+--------+--------+--------+
//! |              payload              |
//! +--------+--------+--------+--------+
//! ```
//!
//! - The version field indicates the version of OpenFlow this message
//!   belongs to.
//! - The length field gives the message length, including the header
//!   itself.
//! - The xid, or transaction identifier, is a unique value used to match
//!   requests to responses.
//!
//! The length and the type code are derived from the payload when a
//! message is emitted; they are never stored in the high-level
//! representation.

use byteorder::{ByteOrder, NetworkEndian};

use crate::packets::{
    error, features_reply, flow_removed, hello, packet_in, port_status, switch_config,
};
use crate::{Error, Repr, Result};

enum_with_unknown! {
    /// OpenFlow version
    pub doc enum Version(u8) {
        /// OpenFlow 1.0
        OpenFlow1Dot0 = 1,
        /// OpenFlow 1.1
        OpenFlow1Dot1 = 2,
        /// OpenFlow 1.2
        OpenFlow1Dot2 = 3,
        /// OpenFlow 1.3
        OpenFlow1Dot3 = 4,
        /// OpenFlow 1.4
        OpenFlow1Dot4 = 5
    }
}

/// The symbolic type of a message.
///
/// The numeric type codes moved around between OpenFlow 1.0 and the later
/// versions, so the mapping between a `Kind` and its wire code goes through
/// [`Kind::from_code`] and [`Kind::code`], both keyed on the message
/// version.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Kind {
    Hello,
    Error,
    EchoRequest,
    EchoReply,
    FeaturesRequest,
    FeaturesReply,
    GetConfigRequest,
    GetConfigReply,
    SetConfig,
    PacketIn,
    FlowRemoved,
    PortStatus,
    PacketOut,
    FlowMod,
    GroupMod,
    PortMod,
    TableMod,
    /// Called multipart request from OpenFlow 1.3 on.
    StatsRequest,
    /// Called multipart reply from OpenFlow 1.3 on.
    StatsReply,
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest,
    QueueGetConfigReply,
    RoleRequest,
    RoleReply,
    GetAsyncRequest,
    GetAsyncReply,
    SetAsync,
    MeterMod,
}

impl Kind {
    /// Return the symbolic type for a wire type code, or `None` when the
    /// code is not defined for the given version.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    pub fn from_code(version: Version, code: u8) -> Option<Kind> {
        use self::Kind::*;
        let kind = match code {
            0 => Hello,
            1 => Error,
            2 => EchoRequest,
            3 => EchoReply,
            5 => FeaturesRequest,
            6 => FeaturesReply,
            7 => GetConfigRequest,
            8 => GetConfigReply,
            9 => SetConfig,
            10 => PacketIn,
            11 => FlowRemoved,
            12 => PortStatus,
            13 => PacketOut,
            14 => FlowMod,
            code if version == Version::OpenFlow1Dot0 => match code {
                15 => PortMod,
                16 => StatsRequest,
                17 => StatsReply,
                18 => BarrierRequest,
                19 => BarrierReply,
                20 => QueueGetConfigRequest,
                21 => QueueGetConfigReply,
                _ => return None,
            },
            code => match code {
                15 => GroupMod,
                16 => PortMod,
                17 => TableMod,
                18 => StatsRequest,
                19 => StatsReply,
                20 => BarrierRequest,
                21 => BarrierReply,
                22 => QueueGetConfigRequest,
                23 => QueueGetConfigReply,
                24 if at_least(version, Version::OpenFlow1Dot2) => RoleRequest,
                25 if at_least(version, Version::OpenFlow1Dot2) => RoleReply,
                26 if at_least(version, Version::OpenFlow1Dot3) => GetAsyncRequest,
                27 if at_least(version, Version::OpenFlow1Dot3) => GetAsyncReply,
                28 if at_least(version, Version::OpenFlow1Dot3) => SetAsync,
                29 if at_least(version, Version::OpenFlow1Dot3) => MeterMod,
                _ => return None,
            },
        };
        Some(kind)
    }

    /// Return the wire type code for this symbolic type, or `None` when
    /// the type does not exist in the given version.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    pub fn code(self, version: Version) -> Option<u8> {
        use self::Kind::*;
        let code = match self {
            Hello => 0,
            Error => 1,
            EchoRequest => 2,
            EchoReply => 3,
            FeaturesRequest => 5,
            FeaturesReply => 6,
            GetConfigRequest => 7,
            GetConfigReply => 8,
            SetConfig => 9,
            PacketIn => 10,
            FlowRemoved => 11,
            PortStatus => 12,
            PacketOut => 13,
            FlowMod => 14,
            kind if version == Version::OpenFlow1Dot0 => match kind {
                PortMod => 15,
                StatsRequest => 16,
                StatsReply => 17,
                BarrierRequest => 18,
                BarrierReply => 19,
                QueueGetConfigRequest => 20,
                QueueGetConfigReply => 21,
                _ => return None,
            },
            kind => match kind {
                GroupMod => 15,
                PortMod => 16,
                TableMod => 17,
                StatsRequest => 18,
                StatsReply => 19,
                BarrierRequest => 20,
                BarrierReply => 21,
                QueueGetConfigRequest => 22,
                QueueGetConfigReply => 23,
                RoleRequest if at_least(version, Version::OpenFlow1Dot2) => 24,
                RoleReply if at_least(version, Version::OpenFlow1Dot2) => 25,
                GetAsyncRequest if at_least(version, Version::OpenFlow1Dot3) => 26,
                GetAsyncReply if at_least(version, Version::OpenFlow1Dot3) => 27,
                SetAsync if at_least(version, Version::OpenFlow1Dot3) => 28,
                MeterMod if at_least(version, Version::OpenFlow1Dot3) => 29,
                _ => return None,
            },
        };
        Some(code)
    }

    /// Return `true` if this type flows from the switch to the
    /// controller.
    pub fn is_outbound(self) -> bool {
        use self::Kind::*;
        matches!(
            self,
            Hello
                | Error
                | EchoReply
                | FeaturesReply
                | GetConfigReply
                | PacketIn
                | FlowRemoved
                | PortStatus
                | StatsReply
                | BarrierReply
                | QueueGetConfigReply
                | RoleReply
                | GetAsyncReply
        )
    }
}

// Version comparison goes through the wire code; the enum carries an
// Unknown variant and has no usable order of its own.
fn at_least(version: Version, floor: Version) -> bool {
    u8::from(version) >= u8::from(floor)
}

/// A wrapper around a buffer that represents an OpenFlow message.
/// `Packet` provides getters and setters for the header fields.
#[derive(Debug)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    use crate::field::*;

    pub const VERSION: usize = 0;
    pub const KIND: usize = 1;
    pub const LENGTH: Field = 2..4;
    pub const XID: Field = 4..8;
}

/// Length of the message header.
pub const HEADER_LEN: usize = field::XID.end;

impl<T: AsRef<[u8]>> Packet<T> {
    /// Imbue a raw octet buffer with OpenFlow message structure.
    pub fn new(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    /// Shorthand for a combination of [new] and [check_len].
    ///
    /// [new]: #method.new
    /// [check_len]: #method.check_len
    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    /// Ensure that no accessor method will panic if called.
    /// Returns `Err(Error::Truncated)` if the buffer is too short.
    pub fn check_len(&self) -> Result<()> {
        if self.buffer.as_ref().len() < HEADER_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the version field.
    #[inline]
    pub fn version(&self) -> Version {
        let data = self.buffer.as_ref();
        Version::from(data[field::VERSION])
    }

    /// Return the raw type code. How it maps to a message type depends on
    /// the version, see [Kind::from_code].
    ///
    /// [Kind::from_code]: enum.Kind.html#method.from_code
    #[inline]
    pub fn kind_code(&self) -> u8 {
        self.buffer.as_ref()[field::KIND]
    }

    /// Return the length field. It covers the whole message, header
    /// included.
    #[inline]
    pub fn length(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::LENGTH])
    }

    /// Return the xid field.
    #[inline]
    pub fn xid(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::XID])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the version field.
    #[inline]
    pub fn set_version(&mut self, value: Version) {
        let data = self.buffer.as_mut();
        data[field::VERSION] = value.into()
    }

    /// Set the raw type code.
    #[inline]
    pub fn set_kind_code(&mut self, value: u8) {
        let data = self.buffer.as_mut();
        data[field::KIND] = value
    }

    /// Set the length field.
    #[inline]
    pub fn set_length(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::LENGTH], value)
    }

    /// Set the xid field.
    #[inline]
    pub fn set_xid(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::XID], value)
    }
}

impl<'a, T: AsRef<[u8]> + ?Sized> Packet<&'a T> {
    /// Return a pointer to the payload, delimited by the length field.
    #[inline]
    pub fn payload(&self) -> &'a [u8] {
        let data = self.buffer.as_ref();
        &data[HEADER_LEN..self.length() as usize]
    }
}

impl<'a, T: AsRef<[u8]> + AsMut<[u8]> + ?Sized> Packet<&'a mut T> {
    /// Return a mutable pointer to the payload.
    #[inline]
    pub fn payload_mut(&mut self) -> &mut [u8] {
        let range = HEADER_LEN..self.length() as usize;
        let data = self.buffer.as_mut();
        &mut data[range]
    }
}

/// The typed body of a message.
///
/// Types whose wire layout matters to a switch-side endpoint get a
/// dedicated representation; the others are carried as opaque bytes, which
/// still round-trip loss-free.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum Payload {
    Hello(hello::PacketRepr),
    Error(error::PacketRepr),
    EchoRequest(Vec<u8>),
    EchoReply(Vec<u8>),
    FeaturesRequest,
    FeaturesReply(features_reply::PacketRepr),
    GetConfigRequest,
    GetConfigReply(switch_config::PacketRepr),
    SetConfig(switch_config::PacketRepr),
    PacketIn(packet_in::PacketRepr),
    FlowRemoved(flow_removed::PacketRepr),
    PortStatus(port_status::PacketRepr),
    PacketOut(Vec<u8>),
    FlowMod(Vec<u8>),
    GroupMod(Vec<u8>),
    PortMod(Vec<u8>),
    TableMod(Vec<u8>),
    StatsRequest(Vec<u8>),
    StatsReply(Vec<u8>),
    BarrierRequest,
    BarrierReply,
    QueueGetConfigRequest(Vec<u8>),
    QueueGetConfigReply(Vec<u8>),
    RoleRequest(Vec<u8>),
    RoleReply(Vec<u8>),
    GetAsyncRequest,
    GetAsyncReply(Vec<u8>),
    SetAsync(Vec<u8>),
    MeterMod(Vec<u8>),
}

impl Payload {
    /// Return the symbolic message type of this payload.
    #[cfg_attr(rustfmt, rustfmt_skip)]
    pub fn kind(&self) -> Kind {
        use self::Payload::*;
        match *self {
            Hello(_)                 => Kind::Hello,
            Error(_)                 => Kind::Error,
            EchoRequest(_)           => Kind::EchoRequest,
            EchoReply(_)             => Kind::EchoReply,
            FeaturesRequest          => Kind::FeaturesRequest,
            FeaturesReply(_)         => Kind::FeaturesReply,
            GetConfigRequest         => Kind::GetConfigRequest,
            GetConfigReply(_)        => Kind::GetConfigReply,
            SetConfig(_)             => Kind::SetConfig,
            PacketIn(_)              => Kind::PacketIn,
            FlowRemoved(_)           => Kind::FlowRemoved,
            PortStatus(_)            => Kind::PortStatus,
            PacketOut(_)             => Kind::PacketOut,
            FlowMod(_)               => Kind::FlowMod,
            GroupMod(_)              => Kind::GroupMod,
            PortMod(_)               => Kind::PortMod,
            TableMod(_)              => Kind::TableMod,
            StatsRequest(_)          => Kind::StatsRequest,
            StatsReply(_)            => Kind::StatsReply,
            BarrierRequest           => Kind::BarrierRequest,
            BarrierReply             => Kind::BarrierReply,
            QueueGetConfigRequest(_) => Kind::QueueGetConfigRequest,
            QueueGetConfigReply(_)   => Kind::QueueGetConfigReply,
            RoleRequest(_)           => Kind::RoleRequest,
            RoleReply(_)             => Kind::RoleReply,
            GetAsyncRequest          => Kind::GetAsyncRequest,
            GetAsyncReply(_)         => Kind::GetAsyncReply,
            SetAsync(_)              => Kind::SetAsync,
            MeterMod(_)              => Kind::MeterMod,
        }
    }

    #[cfg_attr(rustfmt, rustfmt_skip)]
    fn parse(kind: Kind, buffer: &[u8]) -> Result<Self> {
        use self::Payload::*;
        Ok(match kind {
            Kind::Hello                 => Hello(hello::PacketRepr::parse(buffer)?),
            Kind::Error                 => Error(error::PacketRepr::parse(buffer)?),
            Kind::EchoRequest           => EchoRequest(buffer.to_vec()),
            Kind::EchoReply             => EchoReply(buffer.to_vec()),
            Kind::FeaturesRequest       => FeaturesRequest,
            Kind::FeaturesReply         => FeaturesReply(features_reply::PacketRepr::parse(buffer)?),
            Kind::GetConfigRequest      => GetConfigRequest,
            Kind::GetConfigReply        => GetConfigReply(switch_config::PacketRepr::parse(buffer)?),
            Kind::SetConfig             => SetConfig(switch_config::PacketRepr::parse(buffer)?),
            Kind::PacketIn              => PacketIn(packet_in::PacketRepr::parse(buffer)?),
            Kind::FlowRemoved           => FlowRemoved(flow_removed::PacketRepr::parse(buffer)?),
            Kind::PortStatus            => PortStatus(port_status::PacketRepr::parse(buffer)?),
            Kind::PacketOut             => PacketOut(buffer.to_vec()),
            Kind::FlowMod               => FlowMod(buffer.to_vec()),
            Kind::GroupMod              => GroupMod(buffer.to_vec()),
            Kind::PortMod               => PortMod(buffer.to_vec()),
            Kind::TableMod              => TableMod(buffer.to_vec()),
            Kind::StatsRequest          => StatsRequest(buffer.to_vec()),
            Kind::StatsReply            => StatsReply(buffer.to_vec()),
            Kind::BarrierRequest        => BarrierRequest,
            Kind::BarrierReply          => BarrierReply,
            Kind::QueueGetConfigRequest => QueueGetConfigRequest(buffer.to_vec()),
            Kind::QueueGetConfigReply   => QueueGetConfigReply(buffer.to_vec()),
            Kind::RoleRequest           => RoleRequest(buffer.to_vec()),
            Kind::RoleReply             => RoleReply(buffer.to_vec()),
            Kind::GetAsyncRequest       => GetAsyncRequest,
            Kind::GetAsyncReply         => GetAsyncReply(buffer.to_vec()),
            Kind::SetAsync              => SetAsync(buffer.to_vec()),
            Kind::MeterMod              => MeterMod(buffer.to_vec()),
        })
    }

    fn buffer_len(&self) -> usize {
        use self::Payload::*;
        match self {
            Hello(repr) => repr.buffer_len(),
            Error(repr) => repr.buffer_len(),
            FeaturesReply(repr) => repr.buffer_len(),
            GetConfigReply(repr) | SetConfig(repr) => repr.buffer_len(),
            PacketIn(repr) => repr.buffer_len(),
            FlowRemoved(repr) => repr.buffer_len(),
            PortStatus(repr) => repr.buffer_len(),
            FeaturesRequest | GetConfigRequest | BarrierRequest | BarrierReply
            | GetAsyncRequest => 0,
            EchoRequest(bytes) | EchoReply(bytes) | PacketOut(bytes) | FlowMod(bytes)
            | GroupMod(bytes) | PortMod(bytes) | TableMod(bytes) | StatsRequest(bytes)
            | StatsReply(bytes) | QueueGetConfigRequest(bytes) | QueueGetConfigReply(bytes)
            | RoleRequest(bytes) | RoleReply(bytes) | GetAsyncReply(bytes) | SetAsync(bytes)
            | MeterMod(bytes) => bytes.len(),
        }
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        use self::Payload::*;
        match self {
            Hello(repr) => repr.emit(buffer),
            Error(repr) => repr.emit(buffer),
            FeaturesReply(repr) => repr.emit(buffer),
            GetConfigReply(repr) | SetConfig(repr) => repr.emit(buffer),
            PacketIn(repr) => repr.emit(buffer),
            FlowRemoved(repr) => repr.emit(buffer),
            PortStatus(repr) => repr.emit(buffer),
            FeaturesRequest | GetConfigRequest | BarrierRequest | BarrierReply
            | GetAsyncRequest => Ok(()),
            EchoRequest(bytes) | EchoReply(bytes) | PacketOut(bytes) | FlowMod(bytes)
            | GroupMod(bytes) | PortMod(bytes) | TableMod(bytes) | StatsRequest(bytes)
            | StatsReply(bytes) | QueueGetConfigRequest(bytes) | QueueGetConfigReply(bytes)
            | RoleRequest(bytes) | RoleReply(bytes) | GetAsyncReply(bytes) | SetAsync(bytes)
            | MeterMod(bytes) => {
                if buffer.len() < bytes.len() {
                    Err(crate::Error::Exhausted)
                } else {
                    buffer.copy_from_slice(bytes.as_slice());
                    Ok(())
                }
            }
        }
    }
}

/// A high-level representation of an OpenFlow message.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Message {
    pub version: Version,
    pub xid: u32,
    pub payload: Payload,
}

impl Message {
    /// Return the symbolic message type.
    pub fn kind(&self) -> Kind {
        self.payload.kind()
    }

    /// Decode the message at the start of `buffer`, returning it together
    /// with the remaining bytes.
    ///
    /// A buffer too short to hold the whole message is `Truncated`, which
    /// is not a protocol error: the caller is expected to accumulate more
    /// bytes and retry.
    pub fn decode(buffer: &[u8]) -> Result<(Message, &[u8])> {
        let packet = Packet::new_checked(buffer)?;
        let length = packet.length() as usize;
        if length < HEADER_LEN {
            return Err(Error::Malformed);
        }
        if buffer.len() < length {
            return Err(Error::Truncated);
        }
        let version = packet.version();
        let kind = Kind::from_code(version, packet.kind_code()).ok_or(Error::Unrecognized)?;
        let message = Message {
            version,
            xid: packet.xid(),
            payload: Payload::parse(kind, packet.payload())?,
        };
        Ok((message, &buffer[length..]))
    }

    /// Return the length of the buffer that [emit] will fill.
    ///
    /// [emit]: #method.emit
    pub fn buffer_len(&self) -> usize {
        HEADER_LEN + self.payload.buffer_len()
    }

    /// Emit this message into a buffer. The header length field is
    /// computed from the payload.
    pub fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let length = self.buffer_len();
        if buffer.len() < length {
            return Err(Error::Exhausted);
        }
        let code = self.kind().code(self.version).ok_or(Error::BadVersion)?;
        let mut packet = Packet::new(buffer);
        packet.set_version(self.version);
        packet.set_kind_code(code);
        packet.set_length(length as u16);
        packet.set_xid(self.xid);
        self.payload.emit(packet.payload_mut())
    }

    /// Encode this message into a freshly allocated buffer.
    pub fn to_bytes(&self) -> Result<Vec<u8>> {
        let mut buffer = vec![0; self.buffer_len()];
        self.emit(&mut buffer)?;
        Ok(buffer)
    }
}
