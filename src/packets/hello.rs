//! Types to parse and emit Hello messages.
//!
//! A Hello message is a sequence of elements, each aligned to 8 bytes:
//!
//! ```no_rust
//! +--------+--------+--------+--------+
//! |     type        |      length     |
//! +--------+--------+--------+--------+
//! |        payload  +-----------------+
//! |                 |     padding     |
//! +--------+--------+--------+--------+
//! |                etc.               |
//! ```
//!
//! The element length covers the header and the payload but not the
//! padding. The only element understood here is the version bitmap; other
//! element types are skipped when parsing.

use byteorder::{ByteOrder, NetworkEndian};

use crate::packets::openflow::Version;
use crate::{Error, Repr, Result};

enum_with_unknown! {
    /// The type of a Hello element.
    pub doc enum ElementKind(u16) {
        /// A set of OpenFlow versions supported by the sender. Version
        /// numbers index the bitmap: an endpoint supporting OpenFlow 1.0
        /// (`0x01`) and OpenFlow 1.3 (`0x04`) sets bits 1 and 4, giving the
        /// bitmap `0x12`. Versions 1 to 31 fit in one 32-bit word; further
        /// words extend the range.
        VersionBitmap = 1
    }
}

const ELEMENT_HEADER_LEN: usize = 4;

/// A Hello element.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum ElementRepr {
    /// The set of protocol versions the sender supports.
    VersionBitmap(Vec<Version>),
}

impl ElementRepr {
    // Element length on the wire, padding excluded.
    fn wire_len(&self) -> usize {
        match self {
            ElementRepr::VersionBitmap(versions) => {
                ELEMENT_HEADER_LEN + 4 * bitmap_words(versions)
            }
        }
    }

    fn buffer_len(&self) -> usize {
        self.wire_len().div_ceil(8) * 8
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        let wire_len = self.wire_len();
        match self {
            ElementRepr::VersionBitmap(versions) => {
                NetworkEndian::write_u16(&mut buffer[0..2], ElementKind::VersionBitmap.into());
                NetworkEndian::write_u16(&mut buffer[2..4], wire_len as u16);
                let words = &mut buffer[ELEMENT_HEADER_LEN..wire_len];
                let mut bitmaps = vec![0u32; bitmap_words(versions)];
                for version in versions {
                    let index = u8::from(*version) as usize;
                    bitmaps[index / 32] |= 1 << (index % 32);
                }
                for (word, bitmap) in bitmaps.iter().enumerate() {
                    NetworkEndian::write_u32(&mut words[word * 4..word * 4 + 4], *bitmap);
                }
            }
        }
        buffer[wire_len..self.buffer_len()].fill(0);
        Ok(())
    }
}

// Number of 32-bit words a bitmap for `versions` occupies. An empty set
// still emits one zeroed word.
fn bitmap_words(versions: &[Version]) -> usize {
    versions
        .iter()
        .map(|v| u8::from(*v) as usize)
        .max()
        .map_or(1, |max| max / 32 + 1)
}

fn parse_bitmap(payload: &[u8]) -> Result<Vec<Version>> {
    if payload.len() % 4 != 0 {
        return Err(Error::Malformed);
    }
    let mut versions = Vec::new();
    for (word, chunk) in payload.chunks(4).enumerate() {
        let bitmap = NetworkEndian::read_u32(chunk);
        for bit in 0..32 {
            let index = word * 32 + bit;
            // version 0 does not exist, and versions are u8 on the wire
            if index == 0 || index > u8::MAX as usize {
                continue;
            }
            if bitmap & (1 << bit) != 0 {
                versions.push(Version::from(index as u8));
            }
        }
    }
    Ok(versions)
}

/// A high-level representation of a Hello message body.
#[derive(Debug, PartialEq, Eq, Clone, Default)]
pub struct PacketRepr {
    pub elements: Vec<ElementRepr>,
}

impl PacketRepr {
    pub fn new(elements: Vec<ElementRepr>) -> Self {
        PacketRepr { elements }
    }

    /// Return the versions advertised by the first version bitmap element,
    /// if any.
    pub fn versions(&self) -> Option<&[Version]> {
        self.elements.iter().map(|element| match element {
            ElementRepr::VersionBitmap(versions) => versions.as_slice(),
        }).next()
    }
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        let mut elements = Vec::new();
        let mut offset = 0;
        while offset < buffer.len() {
            if buffer.len() - offset < ELEMENT_HEADER_LEN {
                return Err(Error::Malformed);
            }
            let kind = NetworkEndian::read_u16(&buffer[offset..offset + 2]);
            let length = NetworkEndian::read_u16(&buffer[offset + 2..offset + 4]) as usize;
            if length < ELEMENT_HEADER_LEN || buffer.len() - offset < length {
                return Err(Error::Malformed);
            }
            let payload = &buffer[offset + ELEMENT_HEADER_LEN..offset + length];
            match ElementKind::from(kind) {
                ElementKind::VersionBitmap => {
                    elements.push(ElementRepr::VersionBitmap(parse_bitmap(payload)?));
                }
                ElementKind::Unknown(_) => (),
            }
            offset += length.div_ceil(8) * 8;
        }
        Ok(PacketRepr { elements })
    }

    fn buffer_len(&self) -> usize {
        self.elements
            .iter()
            .fold(0, |acc, element| acc + element.buffer_len())
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if self.buffer_len() > buffer.len() {
            return Err(Error::Exhausted);
        }
        let mut offset = 0;
        for element in &self.elements {
            let length = element.buffer_len();
            element.emit(&mut buffer[offset..offset + length])?;
            offset += length;
        }
        Ok(())
    }
}

#[cfg(test)]
mod test {
    use super::*;

    #[cfg_attr(rustfmt, rustfmt_skip)]
    static BYTES: [u8; 8] = [
        0x00, 0x01,             // type = version bitmap
        0x00, 0x08,             // length = 8
        0x00, 0x00, 0x00, 0x12, // bitmap: versions 1 and 4
    ];

    fn hello_repr() -> PacketRepr {
        PacketRepr::new(vec![ElementRepr::VersionBitmap(vec![
            Version::OpenFlow1Dot0,
            Version::OpenFlow1Dot3,
        ])])
    }

    #[test]
    fn test_parse() {
        assert_eq!(PacketRepr::parse(&BYTES).unwrap(), hello_repr());
    }

    #[test]
    fn test_emit() {
        let repr = hello_repr();
        assert_eq!(repr.buffer_len(), 8);
        let mut bytes = vec![0xff; 8];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &BYTES[..]);
    }

    #[test]
    fn test_empty_body() {
        let repr = PacketRepr::parse(&[]).unwrap();
        assert_eq!(repr, PacketRepr::new(vec![]));
        assert_eq!(repr.buffer_len(), 0);
        assert_eq!(repr.versions(), None);
    }

    #[test]
    fn test_unknown_elements_are_skipped() {
        #[cfg_attr(rustfmt, rustfmt_skip)]
        static BYTES: [u8; 16] = [
            0x00, 0x7f,             // unknown element type
            0x00, 0x06,             // length = 6
            0xde, 0xad,             // opaque payload
            0x00, 0x00,             // padding to 8 bytes
            0x00, 0x01,             // type = version bitmap
            0x00, 0x08,             // length = 8
            0x00, 0x00, 0x00, 0x10, // bitmap: version 4
        ];
        let repr = PacketRepr::parse(&BYTES).unwrap();
        assert_eq!(
            repr.versions().unwrap(),
            &[Version::OpenFlow1Dot3]
        );
    }

    #[test]
    fn test_empty_bitmap() {
        #[cfg_attr(rustfmt, rustfmt_skip)]
        static BYTES: [u8; 8] = [
            0x00, 0x01,             // type = version bitmap
            0x00, 0x08,             // length = 8
            0x00, 0x00, 0x00, 0x00, // empty bitmap
        ];
        let repr = PacketRepr::parse(&BYTES).unwrap();
        assert_eq!(repr.versions().unwrap(), &[]);

        let mut bytes = vec![0xff; 8];
        repr.emit(&mut bytes).unwrap();
        assert_eq!(&bytes[..], &BYTES[..]);
    }

    #[test]
    fn test_truncated_element() {
        let bytes = [0x00, 0x01, 0x00, 0x08, 0x00, 0x00];
        assert_eq!(PacketRepr::parse(&bytes), Err(Error::Malformed));
    }
}
