//! # Flow removed
//!
//! Sent to the controller when a flow entry is removed from a table.

use byteorder::{ByteOrder, NetworkEndian};

use crate::oxm::FlowMatch;
use crate::{Error, Repr, Result};

enum_with_unknown! {
    /// Why the flow was removed.
    pub doc enum Reason(u8) {
        /// Flow idle time exceeded idle_timeout.
        IdleTimeout = 0,
        /// Time exceeded hard_timeout.
        HardTimeout = 1,
        /// Evicted by a delete flow mod.
        Delete = 2,
        /// Group was removed.
        GroupDelete = 3,
        /// Meter was removed.
        MeterDelete = 4
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    use crate::field::*;
    pub const COOKIE: Field = 0..8;
    pub const PRIORITY: Field = 8..10;
    pub const REASON: usize = 10;
    pub const TABLE_ID: usize = 11;
    pub const DURATION_SEC: Field = 12..16;
    pub const DURATION_NSEC: Field = 16..20;
    pub const IDLE_TIMEOUT: Field = 20..22;
    pub const HARD_TIMEOUT: Field = 22..24;
    pub const PACKET_COUNT: Field = 24..32;
    pub const BYTE_COUNT: Field = 32..40;
    pub const FLOW_MATCH: Rest = 40..;
}

impl<T: AsRef<[u8]>> Packet<T> {
    pub fn new(buffer: T) -> Packet<T> {
        Packet { buffer }
    }

    pub fn new_checked(buffer: T) -> Result<Packet<T>> {
        let packet = Self::new(buffer);
        packet.check_len()?;
        Ok(packet)
    }

    pub fn check_len(&self) -> Result<()> {
        if self.buffer.as_ref().len() < field::FLOW_MATCH.start {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the `cookie` field.
    pub fn cookie(&self) -> u64 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u64(&data[field::COOKIE])
    }

    /// Return the `priority` field.
    pub fn priority(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::PRIORITY])
    }

    /// Return the `reason` field.
    pub fn reason(&self) -> Reason {
        Reason::from(self.buffer.as_ref()[field::REASON])
    }

    /// Return the `table_id` field.
    pub fn table_id(&self) -> u8 {
        self.buffer.as_ref()[field::TABLE_ID]
    }

    /// Return the `duration_sec` field.
    pub fn duration_sec(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::DURATION_SEC])
    }

    /// Return the `duration_nsec` field.
    pub fn duration_nsec(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::DURATION_NSEC])
    }

    /// Return the `idle_timeout` field.
    pub fn idle_timeout(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::IDLE_TIMEOUT])
    }

    /// Return the `hard_timeout` field.
    pub fn hard_timeout(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::HARD_TIMEOUT])
    }

    /// Return the `packet_count` field.
    pub fn packet_count(&self) -> u64 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u64(&data[field::PACKET_COUNT])
    }

    /// Return the `byte_count` field.
    pub fn byte_count(&self) -> u64 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u64(&data[field::BYTE_COUNT])
    }

    /// Return the buffer holding the flow match.
    pub fn flow_match(&self) -> &[u8] {
        &self.buffer.as_ref()[field::FLOW_MATCH]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the `cookie` field.
    pub fn set_cookie(&mut self, value: u64) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u64(&mut data[field::COOKIE], value)
    }

    /// Set the `priority` field.
    pub fn set_priority(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::PRIORITY], value)
    }

    /// Set the `reason` field.
    pub fn set_reason(&mut self, value: Reason) {
        self.buffer.as_mut()[field::REASON] = value.into();
    }

    /// Set the `table_id` field.
    pub fn set_table_id(&mut self, value: u8) {
        self.buffer.as_mut()[field::TABLE_ID] = value;
    }

    /// Set the `duration_sec` field.
    pub fn set_duration_sec(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::DURATION_SEC], value)
    }

    /// Set the `duration_nsec` field.
    pub fn set_duration_nsec(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::DURATION_NSEC], value)
    }

    /// Set the `idle_timeout` field.
    pub fn set_idle_timeout(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::IDLE_TIMEOUT], value)
    }

    /// Set the `hard_timeout` field.
    pub fn set_hard_timeout(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::HARD_TIMEOUT], value)
    }

    /// Set the `packet_count` field.
    pub fn set_packet_count(&mut self, value: u64) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u64(&mut data[field::PACKET_COUNT], value)
    }

    /// Set the `byte_count` field.
    pub fn set_byte_count(&mut self, value: u64) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u64(&mut data[field::BYTE_COUNT], value)
    }

    /// Return the mutable buffer holding the flow match.
    pub fn flow_match_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[field::FLOW_MATCH]
    }
}

/// A high-level representation of a flow removed body.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    /// Opaque controller-issued identifier of the flow.
    pub cookie: u64,
    /// Priority level of the flow entry.
    pub priority: u16,
    /// Why the flow was removed.
    pub reason: Reason,
    /// The table the flow was in.
    pub table_id: u8,
    /// Time the flow was alive, seconds part.
    pub duration_sec: u32,
    /// Time the flow was alive, nanoseconds beyond `duration_sec`.
    pub duration_nsec: u32,
    /// Idle timeout from the original flow mod.
    pub idle_timeout: u16,
    /// Hard timeout from the original flow mod.
    pub hard_timeout: u16,
    pub packet_count: u64,
    pub byte_count: u64,
    /// The match of the removed flow.
    pub flow_match: FlowMatch,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        Ok(PacketRepr {
            cookie: packet.cookie(),
            priority: packet.priority(),
            reason: packet.reason(),
            table_id: packet.table_id(),
            duration_sec: packet.duration_sec(),
            duration_nsec: packet.duration_nsec(),
            idle_timeout: packet.idle_timeout(),
            hard_timeout: packet.hard_timeout(),
            packet_count: packet.packet_count(),
            byte_count: packet.byte_count(),
            flow_match: FlowMatch::parse(packet.flow_match())?,
        })
    }

    fn buffer_len(&self) -> usize {
        field::FLOW_MATCH.start + self.flow_match.buffer_len()
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let mut packet = Packet::new(buffer);
        packet.set_cookie(self.cookie);
        packet.set_priority(self.priority);
        packet.set_reason(self.reason);
        packet.set_table_id(self.table_id);
        packet.set_duration_sec(self.duration_sec);
        packet.set_duration_nsec(self.duration_nsec);
        packet.set_idle_timeout(self.idle_timeout);
        packet.set_hard_timeout(self.hard_timeout);
        packet.set_packet_count(self.packet_count);
        packet.set_byte_count(self.byte_count);
        self.flow_match.emit(packet.flow_match_mut())?;
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 48] = [
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0xbe, 0xef, // cookie
        0x00, 0x0a,             // priority = 10
        0x01,                   // reason = hard timeout
        0x02,                   // table_id = 2
        0x00, 0x00, 0x00, 0x3c, // duration_sec = 60
        0x00, 0x00, 0x01, 0x00, // duration_nsec = 256
        0x00, 0x1e,             // idle_timeout = 30
        0x00, 0x3c,             // hard_timeout = 60
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x05, // packet_count
        0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x01, 0xf4, // byte_count
        // empty match
        0x00, 0x01, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00,
    ];

    fn flow_removed() -> PacketRepr {
        PacketRepr {
            cookie: 0xbeef,
            priority: 10,
            reason: Reason::HardTimeout,
            table_id: 2,
            duration_sec: 60,
            duration_nsec: 256,
            idle_timeout: 30,
            hard_timeout: 60,
            packet_count: 5,
            byte_count: 500,
            flow_match: FlowMatch(vec![]),
        }
    }

    #[test]
    fn test_parse() {
        assert_eq!(PacketRepr::parse(&BYTES).unwrap(), flow_removed());
    }

    #[test]
    fn test_emit() {
        let repr = flow_removed();
        assert_eq!(repr.buffer_len(), 48);
        let mut bytes = vec![0xff; 48];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &BYTES[..]);
    }
}
