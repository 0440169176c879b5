//! The shared body of get-config replies and set-config requests: the
//! fragmentation handling flags and the miss send length.

use byteorder::{ByteOrder, NetworkEndian};

use crate::{Error, Repr, Result};

bitflags::bitflags! {
    /// How the switch treats IP fragments. No bit set means fragments pass
    /// through the flow tables normally.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct ConfigFlags: u16 {
        /// Drop fragmented packets.
        const FRAG_DROP = 1 << 0;
        /// Reassemble fragmented packets.
        const FRAG_REASSEMBLE = 1 << 1;
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    use crate::field::*;
    pub const FLAGS: Field = 0..2;
    pub const MISS_SEND_LEN: Field = 2..4;
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
        if self.buffer.as_ref().len() < field::MISS_SEND_LEN.end {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the `flags` field.
    pub fn flags(&self) -> ConfigFlags {
        let data = self.buffer.as_ref();
        ConfigFlags::from_bits_retain(NetworkEndian::read_u16(&data[field::FLAGS]))
    }

    /// Return the `miss_send_len` field.
    pub fn miss_send_len(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::MISS_SEND_LEN])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the `flags` field.
    pub fn set_flags(&mut self, value: ConfigFlags) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::FLAGS], value.bits())
    }

    /// Set the `miss_send_len` field.
    pub fn set_miss_send_len(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::MISS_SEND_LEN], value)
    }
}

/// A high-level representation of a switch configuration body.
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub struct PacketRepr {
    /// Fragmentation handling flags.
    pub flags: ConfigFlags,
    /// The number of bytes of a packet to include in packet-in messages
    /// sent for table misses.
    pub miss_send_len: u16,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        Ok(PacketRepr {
            flags: packet.flags(),
            miss_send_len: packet.miss_send_len(),
        })
    }

    fn buffer_len(&self) -> usize {
        field::MISS_SEND_LEN.end
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        let mut packet = Packet::new_checked(buffer)?;
        packet.set_flags(self.flags);
        packet.set_miss_send_len(self.miss_send_len);
        Ok(())
    }
}
