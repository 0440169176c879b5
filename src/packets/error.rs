//! Types representing OpenFlow error messages.
//!
//! An error message opens with a two-level (type, code) pair: the type
//! selects one of the code tables below and the code indexes into it. The
//! experimenter type is the exception, carrying an experimenter-chosen
//! type and the experimenter id where the code would be. Whatever follows
//! the pair is opaque data, usually a prefix of the request that failed.
//!
//! The whole namespace is declared once through the `error_table!` macro
//! below, which derives the message [`Kind`], one code enum per kind, the
//! typed [`Header`] pairing them, and the conversions between the typed
//! header and the raw wire pair. Codes outside a table survive a round
//! trip through each enum's `Unknown` variant.

use byteorder::{ByteOrder, NetworkEndian};

use crate::{Error, Repr, Result};

// One declaration per error type: `Kind variant / code enum = type value`,
// followed by that type's code table. Everything else in this module is
// derived from it.
macro_rules! error_table {
    (
        $(
            $( #[$kind_doc:meta] )*
            $kind:ident / $codes:ident = $kind_value:expr => {
                $(
                    $( #[$code_doc:meta] )*
                    $code:ident = $code_value:expr
                ),+ $(,)?
            }
        )+
    ) => {
        enum_with_unknown! {
            /// The type of an error message. It decides which code table
            /// the code field is read against.
            pub doc enum Kind(u16) {
                $(
                    $( #[$kind_doc] )*
                    $kind = $kind_value,
                )+
                /// An error defined by an experimenter extension.
                Experimenter = 0xffff
            }
        }

        $(
            enum_with_unknown! {
                /// One code table of the two-level error namespace; the
                /// matching [`Kind`] variant selects it.
                pub doc enum $codes(u16) {
                    $(
                        $( #[$code_doc] )*
                        $code = $code_value
                    ),+
                }
            }
        )+

        /// The typed (type, code) pair opening an error message.
        #[derive(Debug, PartialEq, Eq, Clone)]
        pub enum Header {
            $(
                $( #[$kind_doc] )*
                $kind($codes),
            )+
            /// An error defined by an experimenter extension. The code
            /// position holds an experimenter-chosen type instead, followed
            /// by the experimenter id.
            Experimenter {
                /// Experimenter-defined error type.
                exp_type: u16,
                /// Experimenter id.
                experimenter: u32,
            },
        }

        impl Header {
            // Type a raw wire pair. `None` for the experimenter type,
            // whose extra id field the caller reads separately, and for
            // unknown types.
            fn join(kind: Kind, code: u16) -> Option<Header> {
                match kind {
                    $( Kind::$kind => Some(Header::$kind($codes::from(code))), )+
                    Kind::Experimenter | Kind::Unknown(_) => None,
                }
            }

            // The raw wire pair. For experimenter errors the code position
            // carries the exp_type.
            fn split(&self) -> (Kind, u16) {
                match self {
                    $( Header::$kind(code) => (Kind::$kind, u16::from(*code)), )+
                    Header::Experimenter { exp_type, .. } => (Kind::Experimenter, *exp_type),
                }
            }
        }
    };
}

error_table! {
    /// The hello handshake failed.
    HelloFailed / HelloFailedCode = 0 => {
        /// No overlap between the version sets of the two endpoints.
        Incompatible = 0,
        /// The peer is not permitted to connect.
        Eperm = 1,
    }

    /// The request could not be understood or is not allowed.
    BadRequest / BadRequestCode = 1 => {
        /// The header names a protocol version the switch does not speak.
        BadVersion = 0,
        /// The header names a message type the switch does not know.
        BadType = 1,
        /// The stats/multipart request type is not supported.
        BadMultipart = 2,
        /// The experimenter id is unknown.
        BadExperimenter = 3,
        /// The experimenter type is unknown for this experimenter id.
        BadExpType = 4,
        /// The controller lacks the permission for this request.
        Eperm = 5,
        /// The message length does not fit its type.
        BadLength = 6,
        /// The referenced buffer has already been consumed.
        BufferEmpty = 7,
        /// The referenced buffer does not exist.
        BufferUnknown = 8,
        /// The request names a nonexistent table.
        BadTableId = 9,
        /// Rejected because the requesting controller is a slave.
        IsSlave = 10,
        /// The request names an invalid port, or omits one.
        BadPort = 11,
        /// The packet carried in a packet-out is invalid.
        BadPacket = 12,
        /// A multipart request overflowed its reassembly buffer.
        MultipartBufferOverflow = 13,
        /// A multipart request timed out between its parts.
        MultipartRequestTimeout = 14,
        /// A multipart reply timed out between its parts.
        MultipartReplyTimeout = 15,
    }

    /// An action in the request is bad.
    BadAction / BadActionCode = 2 => {
        /// The action type is not known.
        BadType = 0,
        /// An action length disagrees with its content.
        BadLength = 1,
        /// The experimenter id in an action is unknown.
        BadExperimenter = 2,
        /// The action is unknown for this experimenter id.
        BadExpType = 3,
        /// The output port cannot be used here.
        BadOutPort = 4,
        /// An action argument is out of range.
        BadArgument = 5,
        /// The controller lacks the permission for this action.
        Eperm = 6,
        /// More actions than the switch can take.
        TooMany = 7,
        /// The output queue cannot be used here.
        BadQueue = 8,
        /// The group referenced by a group action is invalid.
        BadOutGroup = 9,
        /// The action does not fit this match, or a set-field misses its
        /// prerequisite.
        MatchInconsistent = 10,
        /// The switch cannot apply the actions in the order given.
        UnsupportedOrder = 11,
        /// The action works on a tag or encapsulation the switch does not
        /// support.
        BadTag = 12,
        /// A set-field action writes a field that cannot be set.
        BadSetType = 13,
        /// A set-field action has a length problem.
        BadSetLength = 14,
        /// A set-field action carries a bad value.
        BadSetArgument = 15,
    }

    /// An instruction in the request is bad.
    BadInstruction / BadInstructionCode = 3 => {
        /// The instruction is not known.
        UnknownInstruction = 0,
        /// The switch or this table cannot execute the instruction.
        UnsupportedInstruction = 1,
        /// A goto-table instruction names an invalid table.
        BadTableId = 2,
        /// The metadata value cannot be written by this datapath.
        UnsupportedMetadata = 3,
        /// The metadata mask cannot be applied by this datapath.
        UnsupportedMetadataMask = 4,
        /// The experimenter id in an instruction is unknown.
        BadExperimenter = 5,
        /// The instruction is unknown for this experimenter id.
        BadExpType = 6,
        /// An instruction length disagrees with its content.
        BadLength = 7,
        /// The controller lacks the permission for this instruction.
        Eperm = 8,
    }

    /// The match in the request is bad.
    BadMatch / BadMatchCode = 4 => {
        /// The match type is not supported.
        BadType = 0,
        /// The match length disagrees with its fields.
        BadLength = 1,
        /// The match works on a tag or encapsulation the switch does not
        /// support.
        BadTag = 2,
        /// Arbitrary link-layer address masks are not supported.
        BadDataLinkAddressMask = 3,
        /// Arbitrary network address masks are not supported.
        BadNetworkAddressMask = 4,
        /// This combination of present and omitted fields cannot be
        /// matched.
        BadWildcards = 5,
        /// A match field type is not supported.
        BadField = 6,
        /// A match field carries an unsupported value.
        BadValue = 7,
        /// A match field carries an unsupported mask.
        BadMask = 8,
        /// A field is present without its prerequisite.
        BadPrerequisites = 9,
        /// The same field appears twice.
        DuplicateField = 10,
        /// The controller lacks the permission for this match.
        Eperm = 11,
    }

    /// A flow mod could not be applied.
    FlowModFailed / FlowModFailedCode = 5 => {
        /// No more specific cause.
        Unspecified = 0,
        /// The table has no room for the flow.
        TableFull = 1,
        /// The targeted table does not exist.
        BadTableId = 2,
        /// The flow would overlap an existing one and check-overlap was
        /// set.
        Overlap = 3,
        /// The controller lacks the permission for this flow mod.
        Eperm = 4,
        /// The idle or hard timeout is not supported.
        BadTimeout = 5,
        /// The flow mod command is not known.
        BadCommand = 6,
        /// The flow mod flags are not supported.
        BadFlags = 7,
        /// The synchronised table could not be updated.
        CantSync = 8,
        /// The priority value is not supported.
        BadPriority = 9,
    }

    /// A group mod could not be applied.
    GroupModFailed / GroupModFailedCode = 6 => {
        /// An add would replace a group that already exists.
        GroupExists = 0,
        /// The group id is invalid.
        InvalidGroup = 1,
        /// Select groups with unequal bucket weights are not supported.
        WeightUnsupported = 2,
        /// The group table is full.
        OutOfGroups = 3,
        /// The group would exceed the bucket limit.
        OutOfBuckets = 4,
        /// Groups forwarding to groups are not supported.
        ChainingUnsupported = 5,
        /// The watch port or watch group cannot be observed.
        WatchUnsupported = 6,
        /// The group would forward back into itself.
        Loop = 7,
        /// A modify targets a group that does not exist.
        UnknownGroup = 8,
        /// Another group still forwards to the group being deleted.
        ChainedGroup = 9,
        /// The group type is not known.
        BadType = 10,
        /// The group mod command is not known.
        BadCommand = 11,
        /// A bucket is invalid.
        BadBucket = 12,
        /// A watch port or group is invalid.
        BadWatch = 13,
        /// The controller lacks the permission for this group mod.
        Eperm = 14,
    }

    /// A port mod could not be applied.
    PortModFailed / PortModFailedCode = 7 => {
        /// The port does not exist.
        BadPort = 0,
        /// The hardware address does not belong to the port.
        BadHwAddr = 1,
        /// The port configuration is invalid.
        BadConfig = 2,
        /// The advertised features are invalid.
        BadAdvertise = 3,
        /// The controller lacks the permission for this port mod.
        Eperm = 4,
    }

    /// A table mod could not be applied.
    TableModFailed / TableModFailedCode = 8 => {
        /// The table does not exist.
        BadTable = 0,
        /// The table configuration is invalid.
        BadConfig = 1,
        /// The controller lacks the permission for this table mod.
        Eperm = 2,
    }

    /// A queue operation failed.
    QueueOpFailed / QueueOpFailedCode = 9 => {
        /// The port does not exist or is invalid.
        BadPort = 0,
        /// The queue does not exist on this port.
        BadQueue = 1,
        /// The controller lacks the permission for this queue operation.
        Eperm = 2,
    }

    /// A switch configuration request failed.
    SwitchConfigFailed / SwitchConfigFailedCode = 10 => {
        /// The configuration flags are invalid.
        BadFlags = 0,
        /// The miss send length is invalid.
        BadLength = 1,
        /// The controller lacks the permission to configure the switch.
        Eperm = 2,
    }

    /// A controller role request failed.
    RoleRequestFailed / RoleRequestFailedCode = 11 => {
        /// The generation id is older than the last one seen.
        Stale = 0,
        /// Role changes are not supported.
        Unsupported = 1,
        /// The requested role does not exist.
        BadRole = 2,
    }

    /// A meter mod could not be applied.
    MeterModFailed / MeterModFailedCode = 12 => {
        /// No more specific cause.
        Unspecified = 0,
        /// An add would replace a meter that already exists.
        MeterExists = 1,
        /// The meter id is invalid.
        InvalidMeter = 2,
        /// A modify targets a meter that does not exist.
        UnknownMeter = 3,
        /// The meter mod command is not known.
        BadCommand = 4,
        /// The meter flags are not supported.
        BadFlags = 5,
        /// The band rate is not supported.
        BadRate = 6,
        /// The band burst size is not supported.
        BadBurst = 7,
        /// The band type is not supported.
        BadBand = 8,
        /// A band carries an unsupported value.
        BadBandValue = 9,
        /// The meter table is full.
        OutOfMeters = 10,
        /// The meter would exceed the band limit.
        OutOfBands = 11,
    }

    /// A table features request failed.
    TableFeaturesFailed / TableFeaturesFailedCode = 13 => {
        /// The table does not exist.
        BadTable = 0,
        /// The metadata mask is invalid.
        BadMetadata = 1,
        /// A property type is not known.
        BadType = 2,
        /// A property length disagrees with its content.
        BadLength = 3,
        /// A property carries an unsupported value.
        BadArgument = 4,
        /// The controller lacks the permission to change table features.
        Eperm = 5,
    }

    /// A property in the request is bad.
    BadProperty / BadPropertyCode = 14 => {
        /// The property type is not known.
        BadType = 0,
        /// The property length disagrees with its content.
        BadLength = 1,
        /// The property value is not supported.
        BadValue = 2,
        /// More properties than the switch can take.
        TooMany = 3,
        /// The same property type appears twice.
        DuplicateType = 4,
        /// The experimenter id in a property is unknown.
        BadExperimenter = 5,
        /// The property is unknown for this experimenter id.
        BadExpType = 6,
        /// An experimenter property carries a bad value.
        BadExpValue = 7,
        /// The controller lacks the permission for this property.
        Eperm = 8,
    }

    /// An asynchronous configuration request failed.
    AsyncConfigFailed / AsyncConfigFailedCode = 15 => {
        /// A mask is invalid.
        Invalid = 0,
        /// The requested configuration is not supported.
        Unsupported = 1,
        /// The controller lacks the permission to change the masks.
        Eperm = 2,
    }

    /// A flow monitor request failed.
    FlowMonitorFailed / FlowMonitorFailedCode = 16 => {
        /// No more specific cause.
        Unspecified = 0,
        /// An add would replace a monitor that already exists.
        MonitorExists = 1,
        /// The monitor id is invalid.
        InvalidMonitor = 2,
        /// A modify targets a monitor that does not exist.
        UnknownMonitor = 3,
        /// The monitor command is not known.
        BadCommand = 4,
        /// The monitor flags are not supported.
        BadFlags = 5,
        /// The monitored table does not exist.
        BadTableId = 6,
        /// The output port or group is invalid.
        BadOutput = 7,
    }

    /// A bundle operation failed.
    BundleFailed / BundleFailedCode = 17 => {
        /// No more specific cause.
        Unspecified = 0,
        /// The controller lacks the permission for this bundle.
        Eperm = 1,
        /// The bundle id does not exist.
        BadId = 2,
        /// The bundle id is already open.
        BundleExist = 3,
        /// The bundle id has been closed.
        BundleClosed = 4,
        /// Too many bundles are open already.
        OutOfBundles = 5,
        /// The bundle control type is not known.
        BadType = 6,
        /// The bundle flags are inconsistent.
        BadFlags = 7,
        /// An embedded message has a length problem.
        MsgBadLength = 8,
        /// An embedded message has an inconsistent or duplicate xid.
        MsgBadXid = 9,
        /// An embedded message cannot be bundled.
        MsgUnsupported = 10,
        /// Two embedded messages cannot belong to the same bundle.
        MsgConflict = 11,
        /// More embedded messages than the switch can take.
        MsgTooMany = 12,
        /// An embedded message failed.
        MsgFailed = 13,
        /// The bundle took too long to commit.
        Timeout = 14,
        /// The bundle is holding a resource another operation needs.
        BundleInProgress = 15,
    }
}

impl Header {
    // Bytes the header occupies on the wire: the (type, code) pair, plus
    // the experimenter id when there is one.
    fn buffer_len(&self) -> usize {
        match self {
            Header::Experimenter { .. } => field::EXPERIMENTER.end,
            _ => field::CODE.end,
        }
    }
}

mod field {
    use crate::field::*;

    pub const KIND: Field = 0..2;
    // holds the exp_type for experimenter errors
    pub const CODE: Field = 2..4;
    pub const EXPERIMENTER: Field = 4..8;
}

/// A high-level representation of an error message: the typed header
/// followed by opaque data.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    pub header: Header,
    pub data: Vec<u8>,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::CODE.end {
            return Err(Error::Truncated);
        }
        let kind = Kind::from(NetworkEndian::read_u16(&buffer[field::KIND]));
        let code = NetworkEndian::read_u16(&buffer[field::CODE]);
        let header = match kind {
            Kind::Experimenter => {
                if buffer.len() < field::EXPERIMENTER.end {
                    return Err(Error::Truncated);
                }
                Header::Experimenter {
                    exp_type: code,
                    experimenter: NetworkEndian::read_u32(&buffer[field::EXPERIMENTER]),
                }
            }
            kind => Header::join(kind, code).ok_or(Error::Malformed)?,
        };
        let data = buffer[header.buffer_len()..].to_vec();
        Ok(PacketRepr { header, data })
    }

    fn buffer_len(&self) -> usize {
        self.header.buffer_len() + self.data.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let (kind, code) = self.header.split();
        NetworkEndian::write_u16(&mut buffer[field::KIND], kind.into());
        NetworkEndian::write_u16(&mut buffer[field::CODE], code);
        if let Header::Experimenter { experimenter, .. } = self.header {
            NetworkEndian::write_u32(&mut buffer[field::EXPERIMENTER], experimenter);
        }
        buffer[self.header.buffer_len()..self.buffer_len()].copy_from_slice(&self.data);
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 12] = [
        0x00, 0x04,             // type = bad match
        0x00, 0x06,             // code = bad field
        0x06, 0x0e, 0x00, 0x08, // data: first bytes of the failed request
        0x00, 0x00, 0x00, 0x00,
    ];

    fn error_repr() -> PacketRepr {
        PacketRepr {
            header: Header::BadMatch(BadMatchCode::BadField),
            data: vec![0x06, 0x0e, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00],
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(PacketRepr::parse(&BYTES).unwrap(), error_repr());
    }

    #[test]
    fn test_emit() {
        let repr = error_repr();
        assert_eq!(repr.buffer_len(), 12);
        let mut bytes = vec![0; 12];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &BYTES[..]);
    }

    #[test]
    fn test_unknown_code_roundtrip() {
        let repr = PacketRepr {
            header: Header::BadRequest(BadRequestCode::Unknown(0x0777)),
            data: vec![],
        };
        let mut bytes = vec![0; repr.buffer_len()];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &[0x00, 0x01, 0x07, 0x77]);
        assert_eq!(PacketRepr::parse(&bytes).unwrap(), repr);
    }

    #[test]
    fn test_unknown_kind_is_rejected() {
        let bytes = [0x00, 0x63, 0x00, 0x00];
        assert_eq!(PacketRepr::parse(&bytes), Err(Error::Malformed));
    }

    #[test]
    fn test_every_kind_pairs_with_its_code_table() {
        // walk the generated table through a wire round trip
        for kind in 0..18u16 {
            let mut bytes = vec![0; 4];
            NetworkEndian::write_u16(&mut bytes[0..2], kind);
            NetworkEndian::write_u16(&mut bytes[2..4], 1);
            let repr = PacketRepr::parse(&bytes).unwrap();
            let mut out = vec![0xff; 4];
            repr.emit(&mut out).unwrap();
            assert_eq!(out, bytes);
        }
    }

    #[test]
    fn test_experimenter() {
        #[cfg_attr(rustfmt, rustfmt_skip)]
        static BYTES: [u8; 10] = [
            0xff, 0xff,             // type = experimenter
            0x12, 0x34,             // exp_type
            0x00, 0xca, 0xfe, 0x00, // experimenter id
            0xaa, 0xbb,             // data
        ];
        let repr = PacketRepr {
            header: Header::Experimenter {
                exp_type: 0x1234,
                experimenter: 0x00ca_fe00,
            },
            data: vec![0xaa, 0xbb],
        };
        assert_eq!(PacketRepr::parse(&BYTES).unwrap(), repr);

        let mut bytes = vec![0; repr.buffer_len()];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &BYTES[..]);
    }
}
