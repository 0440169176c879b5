use byteorder::{ByteOrder, NetworkEndian};

use super::Oxm;
use crate::{Error, Repr, Result};

mod field {
    #![allow(non_snake_case)]

    use crate::field::*;

    pub const MATCH_TYPE: Field = 0..2;
    pub const LENGTH: Field = 2..4;

    pub fn OXM_FIELDS(length: usize) -> Field {
        LENGTH.end..length
    }

    pub fn PADDING(length: usize) -> Field {
        length..length.div_ceil(8) * 8
    }
}

enum_with_unknown! {
    /// Type of a flow match
    pub doc enum MatchType(u16) {
        /// Deprecated
        Standard = 0,
        /// OpenFlow eXtensible Match
        Oxm = 1
    }
}

/// A wrapper to read and write a buffer representing a flow match.
#[derive(Debug, PartialEq, Eq, Clone)]
struct Packet<T> {
    inner: T,
}

impl<T: AsRef<[u8]>> Packet<T> {
    /// Return a new flow match parser/encoder for the given buffer
    fn new(buf: T) -> Self {
        Packet { inner: buf }
    }

    /// Return a new flow match parser/encoder for the given buffer, and
    /// make sure no getter or setter will panic.
    fn new_checked(buf: T) -> Result<Self> {
        let packet = Packet { inner: buf };
        packet.check_len()?;
        Ok(packet)
    }

    fn check_len(&self) -> Result<()> {
        if self.inner.as_ref().len() < field::LENGTH.end {
            return Err(Error::Truncated);
        }
        let length = self.length() as usize;
        if length < field::LENGTH.end {
            return Err(Error::Malformed);
        }
        if self.inner.as_ref().len() < field::PADDING(length).end {
            return Err(Error::Truncated);
        }
        Ok(())
    }

    /// Return the `match_type` field
    fn match_type(&self) -> MatchType {
        NetworkEndian::read_u16(&self.inner.as_ref()[field::MATCH_TYPE]).into()
    }

    /// Return the `length` field. It covers the header and the OXM fields
    /// but not the padding.
    fn length(&self) -> u16 {
        NetworkEndian::read_u16(&self.inner.as_ref()[field::LENGTH])
    }

    /// Parse and return the OXM fields
    fn oxm_fields(&self) -> Result<Vec<Oxm>> {
        let length = self.length() as usize;
        let bytes = &self.inner.as_ref()[field::OXM_FIELDS(length)];
        let mut oxm_fields = Vec::new();
        let mut offset = 0;
        while offset < bytes.len() {
            // a TLV cut short by the length field is not a stream-level
            // truncation, the match itself is broken
            let repr = Oxm::parse(&bytes[offset..]).map_err(|err| match err {
                Error::Truncated => Error::Malformed,
                other => other,
            })?;
            offset += repr.buffer_len();
            if offset > bytes.len() {
                return Err(Error::Malformed);
            }
            oxm_fields.push(repr);
        }
        Ok(oxm_fields)
    }
}

impl<T: AsRef<[u8]> + AsMut<[u8]>> Packet<T> {
    /// Setter for the `match_type` field
    fn set_match_type(&mut self, value: MatchType) {
        NetworkEndian::write_u16(&mut self.inner.as_mut()[field::MATCH_TYPE], value.into());
    }

    /// Setter for the `length` field.
    fn set_length(&mut self, value: u16) {
        NetworkEndian::write_u16(&mut self.inner.as_mut()[field::LENGTH], value);
    }

    /// Set the `oxm_fields` field. The length field must be set already,
    /// otherwise this will panic.
    fn set_oxm_fields(&mut self, value: &[Oxm]) -> Result<()> {
        let length = self.length() as usize;
        let buf = &mut self.inner.as_mut()[field::OXM_FIELDS(length)];
        let mut offset = 0;
        for oxm in value {
            oxm.emit(&mut buf[offset..offset + oxm.buffer_len()])?;
            offset += oxm.buffer_len();
        }
        Ok(())
    }

    /// Add the padding that brings the match to 8 bytes alignment. The
    /// length field must be set already.
    fn set_padding(&mut self) {
        let length = self.length() as usize;
        self.inner.as_mut()[field::PADDING(length)].fill(0);
    }
}

/// Represent a flow match: a padded collection of OXM TLVs describing a
/// packet predicate.
///
/// ```no_rust
/// +---------------+---------------+
/// |   match type  |     length    |
/// +---------------+---------------+
/// |          oxm fields           |
/// |   (variable       +-----------+
/// |     length)       |  padding  |
/// +-------------------+-----------+
/// ```
///
/// Only the OXM match type is accepted. The length covers the header and
/// the fields; the padding rounds the whole struct to a multiple of 8
/// bytes, so an empty match is exactly 8 bytes long.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PacketRepr(pub Vec<Oxm>);

impl PacketRepr {
    fn fields_len(&self) -> usize {
        self.0.iter().fold(0, |acc, oxm| acc + oxm.buffer_len())
    }
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let packet = Packet::new_checked(buffer)?;
        match packet.match_type() {
            MatchType::Oxm => Ok(PacketRepr(packet.oxm_fields()?)),
            _ => Err(Error::BadMatchType),
        }
    }

    fn buffer_len(&self) -> usize {
        field::PADDING(field::LENGTH.end + self.fields_len()).end
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let mut packet = Packet::new(buffer);
        packet.set_match_type(MatchType::Oxm);
        packet.set_length((field::LENGTH.end + self.fields_len()) as u16);
        packet.set_oxm_fields(&self.0)?;
        packet.set_padding();
        Ok(())
    }
}
