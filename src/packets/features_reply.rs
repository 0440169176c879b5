//! # Features reply
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |          datapath mac             |
//! +                 +--------+--------+
//! |                 |   datapath id   |
//! +--------+--------+--------+--------+
//! |             n_buffers             |
//! +--------+--------+--------+--------+
//! |n_tables|        padding           |
//! +--------+--------+--------+--------+
//! |           capabilities            |
//! +--------+--------+--------+--------+
//! |              padding              |
//! +--------+--------+--------+--------+
//! |     ports (64 bytes each)         |
//! +--------+--------+--------+--------+
//! ```

use byteorder::{ByteOrder, NetworkEndian};
use smoltcp::wire::EthernetAddress;

use crate::port::{Port, PORT_LEN};
use crate::{Error, Repr, Result};

bitflags::bitflags! {
    /// Capabilities supported by the datapath.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Capabilities: u32 {
        /// Flow statistics.
        const FLOW_STATS = 1 << 0;
        /// Table statistics.
        const TABLE_STATS = 1 << 1;
        /// Port statistics.
        const PORT_STATS = 1 << 2;
        /// Group statistics.
        const GROUP_STATS = 1 << 3;
        /// Can reassemble IP fragments.
        const IP_REASSEMBLY = 1 << 5;
        /// Queue statistics.
        const QUEUE_STATS = 1 << 6;
        /// Switch will block looping ports.
        const PORT_BLOCKED = 1 << 8;
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    use crate::field::*;
    pub const DATAPATH_MAC: Field = 0..6;
    pub const DATAPATH_ID: Field = 6..8;
    pub const N_BUFFERS: Field = 8..12;
    pub const N_TABLES: usize = 12;
    // pub const PADDING: Field = 13..16;
    pub const CAPABILITIES: Field = 16..20;
    // pub const PADDING: Field = 20..24;
    pub const PORTS: Rest = 24..;
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
        let len = self.buffer.as_ref().len();
        if len < field::PORTS.start {
            Err(Error::Truncated)
        } else if (len - field::PORTS.start) % PORT_LEN != 0 {
            // whole port structs fill the message to its length
            Err(Error::Malformed)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the `datapath_mac` field.
    pub fn datapath_mac(&self) -> EthernetAddress {
        let data = self.buffer.as_ref();
        EthernetAddress::from_bytes(&data[field::DATAPATH_MAC])
    }

    /// Return the `datapath_id` field.
    pub fn datapath_id(&self) -> u16 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u16(&data[field::DATAPATH_ID])
    }

    /// Return the `n_buffers` field.
    pub fn n_buffers(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::N_BUFFERS])
    }

    /// Return the `n_tables` field.
    pub fn n_tables(&self) -> u8 {
        self.buffer.as_ref()[field::N_TABLES]
    }

    /// Return the `capabilities` field.
    pub fn capabilities(&self) -> Capabilities {
        let data = self.buffer.as_ref();
        Capabilities::from_bits_retain(NetworkEndian::read_u32(&data[field::CAPABILITIES]))
    }

    /// Return the buffer holding the port structs.
    pub fn ports(&self) -> &[u8] {
        &self.buffer.as_ref()[field::PORTS]
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the `datapath_mac` field.
    pub fn set_datapath_mac(&mut self, value: EthernetAddress) {
        let data = self.buffer.as_mut();
        data[field::DATAPATH_MAC].copy_from_slice(value.as_bytes())
    }

    /// Set the `datapath_id` field.
    pub fn set_datapath_id(&mut self, value: u16) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u16(&mut data[field::DATAPATH_ID], value)
    }

    /// Set the `n_buffers` field.
    pub fn set_n_buffers(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::N_BUFFERS], value)
    }

    /// Set the `n_tables` field.
    pub fn set_n_tables(&mut self, value: u8) {
        self.buffer.as_mut()[field::N_TABLES] = value;
    }

    /// Set the `capabilities` field.
    pub fn set_capabilities(&mut self, value: Capabilities) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::CAPABILITIES], value.bits())
    }

    /// Zero the two padding regions.
    pub fn set_padding(&mut self) {
        let data = self.buffer.as_mut();
        data[field::N_TABLES + 1..field::CAPABILITIES.start].fill(0);
        data[field::CAPABILITIES.end..field::PORTS.start].fill(0);
    }

    /// Return the mutable buffer holding the port structs.
    pub fn ports_mut(&mut self) -> &mut [u8] {
        &mut self.buffer.as_mut()[field::PORTS]
    }
}

/// A high-level representation of a features reply body.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    /// MAC part of the datapath unique id.
    pub datapath_mac: EthernetAddress,
    /// Implementer-defined part of the datapath unique id.
    pub datapath_id: u16,
    /// Max packets buffered at once.
    pub n_buffers: u32,
    /// Number of tables supported by the datapath.
    pub n_tables: u8,
    /// Bitmap of supported capabilities.
    pub capabilities: Capabilities,
    /// The ports attached to the datapath.
    pub ports: Vec<Port>,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        let mut ports = Vec::new();
        for chunk in packet.ports().chunks(PORT_LEN) {
            ports.push(Port::parse(chunk)?);
        }
        Ok(PacketRepr {
            datapath_mac: packet.datapath_mac(),
            datapath_id: packet.datapath_id(),
            n_buffers: packet.n_buffers(),
            n_tables: packet.n_tables(),
            capabilities: packet.capabilities(),
            ports,
        })
    }

    fn buffer_len(&self) -> usize {
        field::PORTS.start + self.ports.len() * PORT_LEN
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let mut packet = Packet::new(buffer);
        packet.set_datapath_mac(self.datapath_mac);
        packet.set_datapath_id(self.datapath_id);
        packet.set_n_buffers(self.n_buffers);
        packet.set_n_tables(self.n_tables);
        packet.set_capabilities(self.capabilities);
        packet.set_padding();
        let ports = packet.ports_mut();
        for (i, port) in self.ports.iter().enumerate() {
            port.emit(&mut ports[i * PORT_LEN..(i + 1) * PORT_LEN])?;
        }
        Ok(())
    }
}
