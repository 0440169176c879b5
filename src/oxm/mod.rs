//! Implementation of OXM (OpenFlow eXtensible Match)
//!
//! An OXM TLV is made of a 4 byte header and a variable size payload. The
//! payload is a value, optionally followed by a mask of the same width.
//!
//! For the `openflow_basic` class the width of the value is not what the
//! header's length field says: it is fixed by the field code, via the
//! [`tlv_bit_length`] table. The length field merely confirms it. For every
//! other class the length field is authoritative.

use crate::{Error, Result};

mod packet;
pub use self::packet::Packet;

mod flow_match;
pub use self::flow_match::PacketRepr as FlowMatch;
pub use self::flow_match::MatchType;

/// Backward compatibility with NXM
pub const CLASS_NXM0: u16 = 0x0000;
/// Backward compatibility with NXM
pub const CLASS_NXM1: u16 = 0x0001;
/// Basic class for OpenFlow
pub const CLASS_OPEN_FLOW_BASIC: u16 = 0x8000;
/// Experimenter class
pub const CLASS_EXPERIMENTER: u16 = 0xFFFF;

const OXM_HEADER_LEN: usize = 4;

// One row per `openflow_basic` field: its code and the canonical bit
// width of its value. The constants and the width lookup are both derived
// from this table, so a field cannot end up with a code but no width.
macro_rules! basic_fields {
    (
        $(
            $( #[$doc:meta] )*
            $name:ident = $code:expr, $bits:expr;
        )+
    ) => {
        /// Field codes of the `openflow_basic` OXM class.
        pub mod consts {
            $(
                $( #[$doc] )*
                pub const $name: u8 = $code;
            )+
        }

        /// Return the canonical bit length of an `openflow_basic` match
        /// field, or `None` for an unknown field code.
        pub fn tlv_bit_length(field: u8) -> Option<usize> {
            match field {
                $( consts::$name => Some($bits), )+
                _ => None,
            }
        }
    };
}

basic_fields! {
    // pipeline context, not taken from the packet itself
    /// Port the packet came in on.
    IN_PORT = 0, 32;
    /// Physical port underneath the (possibly logical) ingress port.
    IN_PHYSICAL_PORT = 1, 32;
    /// Scratch register handed from table to table.
    METADATA = 2, 64;
    /// Tunnel key of the logical port the packet came through.
    TUNNEL_ID = 38, 64;

    // link layer
    /// Destination MAC address.
    ETHERNET_DESTINATION = 3, 48;
    /// Source MAC address.
    ETHERNET_SOURCE = 4, 48;
    /// EtherType, read past any VLAN tags.
    ETHERNET_TYPE = 5, 16;
    /// VLAN identifier: 12 bits of tag plus the tag-present bit.
    VLAN_ID = 6, 13;
    /// VLAN priority code point.
    VLAN_PRIORITY = 7, 3;

    // network layer
    /// Differentiated services code point.
    IP_DSCP = 8, 6;
    /// Explicit congestion notification bits.
    IP_ECN = 9, 2;
    /// Protocol number shared by IPv4 and IPv6.
    IP_PROTOCOL = 10, 8;
    /// IPv4 source address.
    IPV4_SOURCE = 11, 32;
    /// IPv4 destination address.
    IPV4_DESTINATION = 12, 32;
    /// IPv6 source address.
    IPV6_SOURCE = 26, 128;
    /// IPv6 destination address.
    IPV6_DESTINATION = 27, 128;
    /// IPv6 flow label.
    IPV6_FLOW_LABEL = 28, 20;
    /// Summary of the IPv6 extension headers present.
    IPV6_EXTENSION_HEADER = 39, 9;

    // transport layer
    /// TCP source port.
    TCP_SOURCE = 13, 16;
    /// TCP destination port.
    TCP_DESTINATION = 14, 16;
    /// UDP source port.
    UDP_SOURCE = 15, 16;
    /// UDP destination port.
    UDP_DESTINATION = 16, 16;
    /// SCTP source port.
    SCTP_SOURCE = 17, 16;
    /// SCTP destination port.
    SCTP_DESTINATION = 18, 16;
    /// ICMP message type.
    ICMP_TYPE = 19, 8;
    /// ICMP message code.
    ICMP_CODE = 20, 8;
    /// ICMPv6 message type.
    ICMPV6_TYPE = 29, 8;
    /// ICMPv6 message code.
    ICMPV6_CODE = 30, 8;

    // arp
    /// ARP opcode.
    ARP_OP_CODE = 21, 16;
    /// Sender protocol address of an ARP packet.
    ARP_SPA = 22, 32;
    /// Target protocol address of an ARP packet.
    ARP_TPA = 23, 32;
    /// Sender hardware address of an ARP packet.
    ARP_SHA = 24, 48;
    /// Target hardware address of an ARP packet.
    ARP_THA = 25, 48;

    // ipv6 neighbour discovery
    /// Address being solicited or advertised.
    IPV6_ND_TARGET = 31, 128;
    /// Source link-layer address option.
    IPV6_ND_SLL = 32, 48;
    /// Target link-layer address option.
    IPV6_ND_TLL = 33, 48;

    // mpls and pbb tags
    /// Label of the outermost MPLS shim header.
    MPLS_LABEL = 34, 20;
    /// Traffic class of the outermost MPLS shim header.
    MPLS_TC = 35, 3;
    /// Bottom-of-stack bit of the outermost MPLS shim header.
    MPLS_BOS = 36, 1;
    /// Service instance identifier of a PBB I-TAG.
    PBB_ISID = 37, 24;
    /// Use-customer-address bit of a PBB I-TAG.
    PBB_UCA = 41, 1;
}

/// Represent an OXM TLV.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Oxm {
    /// The OXM class, e.g. [`CLASS_OPEN_FLOW_BASIC`].
    pub class: u16,
    /// The class-specific field code (7 bits).
    pub field: u8,
    /// The value bytes. For `openflow_basic` the width is fixed by
    /// [`tlv_bit_length`]; for other classes it is carried on the wire.
    pub value: Vec<u8>,
    /// The mask bytes, as wide as the value, when present.
    pub mask: Option<Vec<u8>>,
}

impl Oxm {
    /// Parse the OXM TLV at the start of `buffer`.
    pub fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        let class = packet.class();
        let field = packet.field();
        let length = packet.length() as usize;
        let has_mask = packet.has_mask();

        let value_len = if class == CLASS_OPEN_FLOW_BASIC {
            let bits = tlv_bit_length(field).ok_or(Error::BadOxmField)?;
            let value_len = bits.div_ceil(8);
            let expected = if has_mask { value_len * 2 } else { value_len };
            if length != expected {
                return Err(Error::Malformed);
            }
            value_len
        } else if has_mask {
            if length % 2 != 0 {
                return Err(Error::Malformed);
            }
            length / 2
        } else {
            length
        };

        let payload = packet.value();
        let value = payload[..value_len].to_vec();
        let mask = has_mask.then(|| payload[value_len..2 * value_len].to_vec());
        Ok(Oxm {
            class,
            field,
            value,
            mask,
        })
    }

    /// Return the total on-wire length of this TLV, header included.
    pub fn buffer_len(&self) -> usize {
        let mask_len = self.mask.as_ref().map_or(0, Vec::len);
        OXM_HEADER_LEN + self.value.len() + mask_len
    }

    /// Emit this TLV into `buffer`. For `openflow_basic` fields, bits above
    /// the canonical width are zeroed in the leading byte of the value and
    /// of the mask.
    pub fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if self.buffer_len() > buffer.len() {
            return Err(Error::Exhausted);
        }
        if let Some(mask) = &self.mask {
            if mask.len() != self.value.len() {
                return Err(Error::Malformed);
            }
        }
        let bits = if self.class == CLASS_OPEN_FLOW_BASIC {
            let bits = tlv_bit_length(self.field).ok_or(Error::BadOxmField)?;
            if self.value.len() != bits.div_ceil(8) {
                return Err(Error::Malformed);
            }
            Some(bits)
        } else {
            None
        };

        let payload_len = self.buffer_len() - OXM_HEADER_LEN;
        let mut packet = Packet::new(buffer);
        packet.set_class(self.class);
        packet.set_field(self.field);
        packet.set_length(payload_len as u8);
        if self.mask.is_some() {
            packet.set_mask();
        } else {
            packet.unset_mask();
        }
        let payload = packet.value_mut();
        emit_part(&self.value, bits, &mut payload[..self.value.len()]);
        if let Some(mask) = &self.mask {
            emit_part(mask, bits, &mut payload[self.value.len()..self.value.len() * 2]);
        }
        Ok(())
    }
}

// Copy `part` into `out`, zeroing the excess high bits of the leading byte
// when a canonical bit width applies.
fn emit_part(part: &[u8], bits: Option<usize>, out: &mut [u8]) {
    out.copy_from_slice(part);
    if let Some(bits) = bits {
        let excess = out.len() * 8 - bits;
        if excess > 0 && !out.is_empty() {
            out[0] &= 0xff >> excess;
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg_attr(rustfmt, rustfmt_skip)]
    static IN_PORT_BYTES: [u8; 8] = [
        0x80, 0x00,             // class = openflow basic
        0x00,                   // field = 0 (in_port), no mask
        0x04,                   // length = 4
        0x00, 0x00, 0xab, 0xcd, // value
    ];

    #[cfg_attr(rustfmt, rustfmt_skip)]
    static MASKED_METADATA_BYTES: [u8; 20] = [
        0x80, 0x00,             // class = openflow basic
        (2 << 1) | 1,           // field = 2 (metadata), has mask
        0x10,                   // length = 16
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xc3, 0x50, // value
        0xff, 0xff, 0xff, 0xff, 0x00, 0x00, 0x00, 0x00, // mask
    ];

    #[test]
    fn test_parse_basic() {
        let parsed = Oxm::parse(&IN_PORT_BYTES).unwrap();
        assert_eq!(
            parsed,
            Oxm {
                class: CLASS_OPEN_FLOW_BASIC,
                field: consts::IN_PORT,
                value: vec![0x00, 0x00, 0xab, 0xcd],
                mask: None,
            }
        );
    }

    #[test]
    fn test_parse_masked() {
        let parsed = Oxm::parse(&MASKED_METADATA_BYTES).unwrap();
        assert_eq!(parsed.field, consts::METADATA);
        assert_eq!(parsed.value, vec![0, 0, 0, 0, 0, 0, 0xc3, 0x50]);
        assert_eq!(parsed.mask, Some(vec![0xff, 0xff, 0xff, 0xff, 0, 0, 0, 0]));
    }

    #[test]
    fn test_emit_roundtrip() {
        for bytes in [&IN_PORT_BYTES[..], &MASKED_METADATA_BYTES[..]] {
            let repr = Oxm::parse(bytes).unwrap();
            assert_eq!(repr.buffer_len(), bytes.len());
            let mut out = vec![0xff; bytes.len()];
            repr.emit(&mut out).unwrap();
            assert_eq!(&out[..], bytes);
        }
    }

    #[test]
    fn test_length_field_mismatch() {
        let mut bytes = IN_PORT_BYTES;
        bytes[3] = 0x02; // in_port is 32 bits, length must be 4
        assert_eq!(Oxm::parse(&bytes), Err(Error::Malformed));
    }

    #[test]
    fn test_unknown_basic_field() {
        let mut bytes = IN_PORT_BYTES;
        bytes[2] = 77 << 1;
        assert_eq!(Oxm::parse(&bytes), Err(Error::BadOxmField));
    }

    #[test]
    fn test_experimenter_class_uses_wire_length() {
        #[cfg_attr(rustfmt, rustfmt_skip)]
        static BYTES: [u8; 10] = [
            0xff, 0xff,       // class = experimenter
            0x05 << 1,        // field = 5, no mask
            0x06,             // length = 6
            1, 2, 3, 4, 5, 6, // opaque value
        ];
        let parsed = Oxm::parse(&BYTES).unwrap();
        assert_eq!(parsed.class, CLASS_EXPERIMENTER);
        assert_eq!(parsed.value, vec![1, 2, 3, 4, 5, 6]);
        let mut out = vec![0; parsed.buffer_len()];
        parsed.emit(&mut out).unwrap();
        assert_eq!(&out[..], &BYTES[..]);
    }

    #[test]
    fn test_emit_cuts_excess_bits() {
        // vlan id is 13 bits wide; the top 3 bits of the leading byte must
        // be zeroed on emit.
        let repr = Oxm {
            class: CLASS_OPEN_FLOW_BASIC,
            field: consts::VLAN_ID,
            value: vec![0xff, 0x77],
            mask: None,
        };
        let mut out = vec![0; repr.buffer_len()];
        repr.emit(&mut out).unwrap();
        assert_eq!(&out[4..], &[0x1f, 0x77]);
    }
}
