//! The switch port description as carried in features replies and port
//! status messages.
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |              port_no              |
//! +--------+--------+--------+--------+
//! |              padding              |
//! +--------+--------+--------+--------+
//! |              hw_addr              |
//! +                 +--------+--------+
//! |                 |     padding     |
//! +--------+--------+--------+--------+
//! |         name (16 bytes)           |
//! +--------+--------+--------+--------+
//! | config | state  |  curr  | advert |
//! |  supp  |  peer  | curr_sp| max_sp |
//! |        (one u32 each)             |
//! +--------+--------+--------+--------+
//! ```

use byteorder::{ByteOrder, NetworkEndian};
use smoltcp::wire::EthernetAddress;

use crate::{Error, Repr, Result};

/// OpenFlow port numbers
#[derive(Debug, PartialEq, Eq, Clone, Copy)]
pub enum PortNumber {
    /// maximum number of physical and logical switch ports
    Max,
    /// Send the packet out the input port.
    InPort,
    /// Submit the packet to the first flow table. This destination port can
    /// only be used in packet-out messages.
    Table,
    /// Forward using non OpenFlow pipeline.
    Normal,
    /// Flood using non OpenFlow pipeline.
    Flood,
    /// Flood through all standard ports except input port.
    All,
    /// Send to controller
    Controller,
    /// Local OpenFlow "port"
    Local,
    /// Special value used in some requests when no port is specified (i.e.
    /// wildcarded)
    Any,
    /// A regular port number
    Regular(u32),
}

impl From<u32> for PortNumber {
    fn from(value: u32) -> Self {
        match value {
            0xffff_ff00 => PortNumber::Max,
            0xffff_fff8 => PortNumber::InPort,
            0xffff_fff9 => PortNumber::Table,
            0xffff_fffa => PortNumber::Normal,
            0xffff_fffb => PortNumber::Flood,
            0xffff_fffc => PortNumber::All,
            0xffff_fffd => PortNumber::Controller,
            0xffff_fffe => PortNumber::Local,
            0xffff_ffff => PortNumber::Any,
            other => PortNumber::Regular(other),
        }
    }
}

impl From<PortNumber> for u32 {
    fn from(value: PortNumber) -> Self {
        match value {
            PortNumber::Max => 0xffff_ff00,
            PortNumber::InPort => 0xffff_fff8,
            PortNumber::Table => 0xffff_fff9,
            PortNumber::Normal => 0xffff_fffa,
            PortNumber::Flood => 0xffff_fffb,
            PortNumber::All => 0xffff_fffc,
            PortNumber::Controller => 0xffff_fffd,
            PortNumber::Local => 0xffff_fffe,
            PortNumber::Any => 0xffff_ffff,
            PortNumber::Regular(other) => other,
        }
    }
}

bitflags::bitflags! {
    /// Administrative port configuration flags.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PortConfig: u32 {
        /// Port is administratively down.
        const PORT_DOWN = 1 << 0;
        /// Drop all packets received by the port.
        const NO_RECV = 1 << 2;
        /// Drop packets forwarded to the port.
        const NO_FWD = 1 << 5;
        /// Do not send packet-in messages for the port.
        const NO_PACKET_IN = 1 << 6;
    }

    /// Current state of the physical link behind a port.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PortState: u32 {
        /// No physical link present.
        const LINK_DOWN = 1 << 0;
        /// Port is blocked by an external mechanism such as spanning tree.
        const BLOCKED = 1 << 1;
        /// Live for fast failover groups.
        const LIVE = 1 << 2;
    }

    /// Features of a port, used for the current, advertised, supported and
    /// peer feature sets.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct PortFeatures: u32 {
        /// 10 Mb half-duplex rate support.
        const RATE_10MB_HD = 1 << 0;
        /// 10 Mb full-duplex rate support.
        const RATE_10MB_FD = 1 << 1;
        /// 100 Mb half-duplex rate support.
        const RATE_100MB_HD = 1 << 2;
        /// 100 Mb full-duplex rate support.
        const RATE_100MB_FD = 1 << 3;
        /// 1 Gb half-duplex rate support.
        const RATE_1GB_HD = 1 << 4;
        /// 1 Gb full-duplex rate support.
        const RATE_1GB_FD = 1 << 5;
        /// 10 Gb full-duplex rate support.
        const RATE_10GB_FD = 1 << 6;
        /// 40 Gb full-duplex rate support.
        const RATE_40GB_FD = 1 << 7;
        /// 100 Gb full-duplex rate support.
        const RATE_100GB_FD = 1 << 8;
        /// 1 Tb full-duplex rate support.
        const RATE_1TB_FD = 1 << 9;
        /// Some other rate, not in the list.
        const OTHER = 1 << 10;
        /// Copper medium.
        const COPPER = 1 << 11;
        /// Fiber medium.
        const FIBER = 1 << 12;
        /// Auto-negotiation.
        const AUTONEG = 1 << 13;
        /// Pause.
        const PAUSE = 1 << 14;
        /// Asymmetric pause.
        const PAUSE_ASYM = 1 << 15;
    }
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Packet<T: AsRef<[u8]>> {
    buffer: T,
}

mod field {
    use crate::field::*;

    pub const PORT_NO: Field = 0..4;
    // pub const PADDING: Field = 4..8;
    pub const HW_ADDR: Field = 8..14;
    // pub const PADDING: Field = 14..16;
    pub const NAME: Field = 16..32;
    pub const CONFIG: Field = 32..36;
    pub const STATE: Field = 36..40;
    pub const CURR: Field = 40..44;
    pub const ADVERTISED: Field = 44..48;
    pub const SUPPORTED: Field = 48..52;
    pub const PEER: Field = 52..56;
    pub const CURR_SPEED: Field = 56..60;
    pub const MAX_SPEED: Field = 60..64;
}

/// Length of a port struct on the wire.
pub const PORT_LEN: usize = field::MAX_SPEED.end;

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
        if self.buffer.as_ref().len() < PORT_LEN {
            Err(Error::Truncated)
        } else {
            Ok(())
        }
    }

    /// Consume the packet, returning the underlying buffer.
    pub fn into_inner(self) -> T {
        self.buffer
    }

    /// Return the `port_no` field.
    pub fn port_no(&self) -> PortNumber {
        let data = self.buffer.as_ref();
        PortNumber::from(NetworkEndian::read_u32(&data[field::PORT_NO]))
    }

    /// Return the `hw_addr` field.
    pub fn hw_addr(&self) -> EthernetAddress {
        let data = self.buffer.as_ref();
        EthernetAddress::from_bytes(&data[field::HW_ADDR])
    }

    /// Return the `name` field, including the trailing zero padding.
    pub fn name(&self) -> &[u8] {
        &self.buffer.as_ref()[field::NAME]
    }

    /// Return the `config` field.
    pub fn config(&self) -> PortConfig {
        let data = self.buffer.as_ref();
        PortConfig::from_bits_retain(NetworkEndian::read_u32(&data[field::CONFIG]))
    }

    /// Return the `state` field.
    pub fn state(&self) -> PortState {
        let data = self.buffer.as_ref();
        PortState::from_bits_retain(NetworkEndian::read_u32(&data[field::STATE]))
    }

    /// Return the `curr` features field.
    pub fn curr(&self) -> PortFeatures {
        let data = self.buffer.as_ref();
        PortFeatures::from_bits_retain(NetworkEndian::read_u32(&data[field::CURR]))
    }

    /// Return the `advertised` features field.
    pub fn advertised(&self) -> PortFeatures {
        let data = self.buffer.as_ref();
        PortFeatures::from_bits_retain(NetworkEndian::read_u32(&data[field::ADVERTISED]))
    }

    /// Return the `supported` features field.
    pub fn supported(&self) -> PortFeatures {
        let data = self.buffer.as_ref();
        PortFeatures::from_bits_retain(NetworkEndian::read_u32(&data[field::SUPPORTED]))
    }

    /// Return the `peer` features field.
    pub fn peer(&self) -> PortFeatures {
        let data = self.buffer.as_ref();
        PortFeatures::from_bits_retain(NetworkEndian::read_u32(&data[field::PEER]))
    }

    /// Return the `curr_speed` field.
    pub fn curr_speed(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::CURR_SPEED])
    }

    /// Return the `max_speed` field.
    pub fn max_speed(&self) -> u32 {
        let data = self.buffer.as_ref();
        NetworkEndian::read_u32(&data[field::MAX_SPEED])
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Set the `port_no` field.
    pub fn set_port_no(&mut self, value: PortNumber) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::PORT_NO], value.into())
    }

    /// Set the `hw_addr` field.
    pub fn set_hw_addr(&mut self, value: EthernetAddress) {
        let data = self.buffer.as_mut();
        data[field::HW_ADDR].copy_from_slice(value.as_bytes())
    }

    /// Set the `name` field, zero-padding it to 16 bytes.
    pub fn set_name(&mut self, value: &[u8]) {
        let data = &mut self.buffer.as_mut()[field::NAME];
        data.fill(0);
        data[..value.len()].copy_from_slice(value)
    }

    /// Set the `config` field.
    pub fn set_config(&mut self, value: PortConfig) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::CONFIG], value.bits())
    }

    /// Set the `state` field.
    pub fn set_state(&mut self, value: PortState) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::STATE], value.bits())
    }

    /// Set the `curr` features field.
    pub fn set_curr(&mut self, value: PortFeatures) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::CURR], value.bits())
    }

    /// Set the `advertised` features field.
    pub fn set_advertised(&mut self, value: PortFeatures) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::ADVERTISED], value.bits())
    }

    /// Set the `supported` features field.
    pub fn set_supported(&mut self, value: PortFeatures) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::SUPPORTED], value.bits())
    }

    /// Set the `peer` features field.
    pub fn set_peer(&mut self, value: PortFeatures) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::PEER], value.bits())
    }

    /// Set the `curr_speed` field.
    pub fn set_curr_speed(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::CURR_SPEED], value)
    }

    /// Set the `max_speed` field.
    pub fn set_max_speed(&mut self, value: u32) {
        let data = self.buffer.as_mut();
        NetworkEndian::write_u32(&mut data[field::MAX_SPEED], value)
    }

    /// Zero the two padding regions.
    pub fn set_padding(&mut self) {
        let data = self.buffer.as_mut();
        data[field::PORT_NO.end..field::HW_ADDR.start].fill(0);
        data[field::HW_ADDR.end..field::NAME.start].fill(0);
    }
}

/// A high-level representation of a switch port description.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct Port {
    pub port_no: PortNumber,
    pub hw_addr: EthernetAddress,
    /// Human readable interface name. At most 16 bytes; zero-padded on the
    /// wire and right-stripped of zeros when parsed.
    pub name: String,
    pub config: PortConfig,
    pub state: PortState,
    /// Current features.
    pub curr: PortFeatures,
    /// Features being advertised by the port.
    pub advertised: PortFeatures,
    /// Features supported by the port.
    pub supported: PortFeatures,
    /// Features advertised by the peer.
    pub peer: PortFeatures,
    /// Current port bitrate in kbps.
    pub curr_speed: u32,
    /// Max port bitrate in kbps.
    pub max_speed: u32,
}

impl Repr for Port {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        let raw_name = packet.name();
        let stripped = &raw_name[..raw_name
            .iter()
            .rposition(|&b| b != 0)
            .map_or(0, |pos| pos + 1)];
        let name = core::str::from_utf8(stripped)
            .map_err(|_| Error::Malformed)?
            .to_string();
        Ok(Port {
            port_no: packet.port_no(),
            hw_addr: packet.hw_addr(),
            name,
            config: packet.config(),
            state: packet.state(),
            curr: packet.curr(),
            advertised: packet.advertised(),
            supported: packet.supported(),
            peer: packet.peer(),
            curr_speed: packet.curr_speed(),
            max_speed: packet.max_speed(),
        })
    }

    fn buffer_len(&self) -> usize {
        PORT_LEN
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if self.name.len() > field::NAME.end - field::NAME.start {
            return Err(Error::Malformed);
        }
        let mut packet = Packet::new_checked(buffer)?;
        packet.set_port_no(self.port_no);
        packet.set_hw_addr(self.hw_addr);
        packet.set_name(self.name.as_bytes());
        packet.set_config(self.config);
        packet.set_state(self.state);
        packet.set_curr(self.curr);
        packet.set_advertised(self.advertised);
        packet.set_supported(self.supported);
        packet.set_peer(self.peer);
        packet.set_curr_speed(self.curr_speed);
        packet.set_max_speed(self.max_speed);
        packet.set_padding();
        Ok(())
    }
}
