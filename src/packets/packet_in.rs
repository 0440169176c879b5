//! # Packet in
//!
//! ```no_rust
//!  0      7        15       23       31
//! +--------+--------+--------+--------+
//! |            buffer id              |
//! +--------+--------+--------+--------+
//! |    total_len    | reason |table_id|
//! +--------+--------+--------+--------+
//! |        flow match fields          |
//! | (variable length, 8 byte aligned) |
//! +--------+--------+--------+--------+
//! |     padding     |   packet data   |
//! +--------+--------+                 +
//! |         (variable length)         |
//! +--------+--------+--------+--------+
//! ```

use byteorder::{ByteOrder, NetworkEndian};

use crate::oxm::FlowMatch;
use crate::{Error, Repr, Result};

enum_with_unknown! {
    /// Why the packet is being sent to the controller.
    pub doc enum Reason(u8) {
        /// No matching flow (table-miss flow entry).
        TableMiss = 0,
        /// Output to controller in apply-actions.
        ApplyAction = 1,
        /// Packet has invalid TTL.
        InvalidTtl = 2
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    #![allow(non_snake_case)]
    use crate::field::*;
    pub const BUFFER_ID: Field = 0..4;
    pub const TOTAL_LEN: Field = 4..6;
    pub const REASON: usize = 6;
    pub const TABLE_ID: usize = 7;

    // The flow match length is only known once the match header is parsed;
    // everything after it is addressed relative to that length.
    pub const FLOW_MATCH_AND_AFTER: Rest = 8..;

    pub fn PADDING(flow_match_len: usize) -> Field {
        let start = FLOW_MATCH_AND_AFTER.start + flow_match_len;
        start..start + 2
    }

    pub fn DATA(flow_match_len: usize) -> Rest {
        PADDING(flow_match_len).end..
    }
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub fn new(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    pub fn check_len(&self, flow_match_len: usize) -> Result<()> {
        if self.buffer.as_ref().len() < field::DATA(flow_match_len).start {
            return Err(Error::Truncated);
        }
        Ok(())
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the `buffer_id` field.
    pub fn buffer_id(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::BUFFER_ID])
    }

    /// Return the `total_len` field: the full length of the packet that
    /// triggered the message, before any truncation due to buffering.
    pub fn total_len(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::TOTAL_LEN])
    }

    /// Return the `reason` field.
    pub fn reason(&self) -> Reason {
        Reason::from(self.buffer.as_ref()[field::REASON])
    }

    /// Return the `table_id` field.
    pub fn table_id(&self) -> u8 {
        self.buffer.as_ref()[field::TABLE_ID]
    }

    /// Return the whole buffer after the fixed fields: the flow match, the
    /// padding, and the packet data.
    pub fn flow_match_and_after(&self) -> &[u8] {
        &self.buffer.as_ref()[field::FLOW_MATCH_AND_AFTER]
    }

    /// Return the packet data.
    pub fn data(&self, flow_match_len: usize) -> &[u8] {
        &self.buffer.as_ref()[field::DATA(flow_match_len)]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the `buffer_id` field.
    pub fn set_buffer_id(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::BUFFER_ID], value)
    }

    /// Set the `total_len` field.
    pub fn set_total_len(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::TOTAL_LEN], value)
    }

    /// Set the `reason` field.
    pub fn set_reason(&mut self, value: Reason) {
        self.buffer.as_mut()[field::REASON] = value.into();
    }

    /// Set the `table_id` field.
    pub fn set_table_id(&mut self, value: u8) {
        self.buffer.as_mut()[field::TABLE_ID] = value;
    }

    /// Return the mutable region holding the flow match.
    pub fn flow_match_mut(&mut self, flow_match_len: usize) -> &mut [u8] {
        let start = field::FLOW_MATCH_AND_AFTER.start;
        &mut self.buffer.as_mut()[start..start + flow_match_len]
    }

    /// Zero the two padding bytes after the flow match.
    pub fn set_padding(&mut self, flow_match_len: usize) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::PADDING(flow_match_len)], 0)
    }

    /// Set the packet data.
    pub fn set_data(&mut self, flow_match_len: usize, value: &[u8]) {
        self.buffer.as_mut()[field::DATA(flow_match_len)].copy_from_slice(value);
    }
}

/// A high-level representation of a packet-in body.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    /// Opaque id of the buffer holding the packet on the switch, or
    /// `0xffff_ffff` when the packet is not buffered.
    pub buffer_id: u32,
    /// Full length of the packet that triggered this message. The `data`
    /// field may be shorter when the packet was truncated due to
    /// buffering.
    pub total_len: u16,
    /// Which context triggered the message.
    pub reason: Reason,
    /// The table the triggering packet was in.
    pub table_id: u8,
    /// The pipeline fields associated with the packet, such as its ingress
    /// port.
    pub flow_match: FlowMatch,
    /// The (possibly truncated) packet itself.
    pub data: Vec<u8>,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        // the buffer must be big enough for a message with an empty match
        // and no packet data
        if buffer.len() < field::PADDING(0).end {
            return Err(Error::Truncated);
        }
        let packet = Packet::new(buffer);
        let flow_match = FlowMatch::parse(packet.flow_match_and_after())?;
        let flow_match_len = flow_match.buffer_len();
        packet.check_len(flow_match_len)?;
        Ok(PacketRepr {
            buffer_id: packet.buffer_id(),
            total_len: packet.total_len(),
            reason: packet.reason(),
            table_id: packet.table_id(),
            flow_match,
            data: packet.data(flow_match_len).to_vec(),
        })
    }

    fn buffer_len(&self) -> usize {
        field::FLOW_MATCH_AND_AFTER.start + self.flow_match.buffer_len() + 2 + self.data.len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let mut packet = Packet::new(buffer);
        packet.set_buffer_id(self.buffer_id);
        packet.set_total_len(self.total_len);
        packet.set_reason(self.reason);
        packet.set_table_id(self.table_id);
        let flow_match_len = self.flow_match.buffer_len();
        self.flow_match.emit(packet.flow_match_mut(flow_match_len))?;
        packet.set_padding(flow_match_len);
        packet.set_data(flow_match_len, &self.data);
        Ok(())
    }
}
