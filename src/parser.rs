//! A stateful accumulator turning a TCP byte stream into a message stream.

use byteorder::{ByteOrder, NetworkEndian};

use crate::packets::openflow::{Message, Version, HEADER_LEN};
use crate::{Error, Result};

/// The error returned when the byte stream cannot be framed or decoded.
///
/// A parse error is fatal for the parser instance: the stream position can
/// no longer be trusted, so the caller must discard the parser together
/// with its connection.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("bad data on the wire: {reason}")]
pub struct ParseError {
    /// The codec error that stopped the parser.
    pub reason: Error,
    /// The bytes that could not be turned into a message.
    pub bytes: Vec<u8>,
}

/// A parser bound to a negotiated protocol version.
///
/// Bytes are fed in arbitrary chunks with [feed]; complete messages come
/// out as they become available and the unconsumed remainder is retained
/// for the next call, so no bytes are ever lost between reads.
///
/// [feed]: #method.feed
#[derive(Debug, Clone)]
pub struct Parser {
    version: Version,
    buffer: Vec<u8>,
}

impl Parser {
    /// Create a parser for a connection that negotiated `version`.
    pub fn new(version: Version) -> Parser {
        Parser {
            version,
            buffer: Vec::new(),
        }
    }

    /// The version this parser is bound to.
    pub fn version(&self) -> Version {
        self.version
    }

    /// Append a chunk of bytes and return the messages completed by it.
    pub fn feed(&mut self, bytes: &[u8]) -> core::result::Result<Vec<Message>, ParseError> {
        self.buffer.extend_from_slice(bytes);
        let mut messages = Vec::new();
        let mut offset = 0;
        while self.buffer.len() - offset >= HEADER_LEN {
            let length =
                NetworkEndian::read_u16(&self.buffer[offset + 2..offset + 4]) as usize;
            if length < HEADER_LEN {
                return Err(self.fail(Error::Malformed, offset));
            }
            if self.buffer.len() - offset < length {
                break;
            }
            match Message::decode(&self.buffer[offset..offset + length]) {
                Ok((message, _)) => messages.push(message),
                // the whole frame was available, so truncation inside it is
                // a framing error like any other
                Err(Error::Truncated) => return Err(self.fail(Error::Malformed, offset)),
                Err(err) => return Err(self.fail(err, offset)),
            }
            offset += length;
        }
        self.buffer.drain(..offset);
        Ok(messages)
    }

    /// Encode a message for the connection this parser is bound to.
    pub fn encode(&self, message: &Message) -> Result<Vec<u8>> {
        message.to_bytes()
    }

    fn fail(&mut self, reason: Error, offset: usize) -> ParseError {
        ParseError {
            reason,
            bytes: self.buffer.split_off(offset),
        }
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::packets::openflow::Payload;

    fn echo(xid: u32, data: &[u8]) -> Message {
        Message {
            version: Version::OpenFlow1Dot3,
            xid,
            payload: Payload::EchoRequest(data.to_vec()),
        }
    }

    #[test]
    fn test_single_message() {
        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let bytes = echo(1, b"ping").to_bytes().unwrap();
        assert_eq!(parser.feed(&bytes).unwrap(), vec![echo(1, b"ping")]);
    }

    #[test]
    fn test_byte_by_byte() {
        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let bytes = echo(2, b"drip").to_bytes().unwrap();
        for byte in &bytes[..bytes.len() - 1] {
            assert_eq!(parser.feed(core::slice::from_ref(byte)).unwrap(), vec![]);
        }
        let messages = parser.feed(&bytes[bytes.len() - 1..]).unwrap();
        assert_eq!(messages, vec![echo(2, b"drip")]);
    }

    #[test]
    fn test_several_messages_in_one_chunk() {
        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let mut bytes = echo(1, b"a").to_bytes().unwrap();
        bytes.extend(echo(2, b"b").to_bytes().unwrap());
        // and half of a third message
        let third = echo(3, b"c").to_bytes().unwrap();
        bytes.extend(&third[..5]);

        let messages = parser.feed(&bytes).unwrap();
        assert_eq!(messages, vec![echo(1, b"a"), echo(2, b"b")]);

        let messages = parser.feed(&third[5..]).unwrap();
        assert_eq!(messages, vec![echo(3, b"c")]);
    }

    #[test]
    fn test_length_below_header_is_fatal() {
        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let bytes = [0x04, 0x02, 0x00, 0x02, 0x00, 0x00, 0x00, 0x00];
        let err = parser.feed(&bytes).unwrap_err();
        assert_eq!(err.reason, Error::Malformed);
        assert_eq!(err.bytes, bytes.to_vec());
    }

    #[test]
    fn test_unknown_type_is_fatal_and_keeps_bytes() {
        let mut parser = Parser::new(Version::OpenFlow1Dot3);
        let good = echo(1, b"ok").to_bytes().unwrap();
        let bad = [0x04, 0x63, 0x00, 0x08, 0x00, 0x00, 0x00, 0x00];
        let mut bytes = good.clone();
        bytes.extend_from_slice(&bad);

        let err = parser.feed(&bytes).unwrap_err();
        assert_eq!(err.reason, Error::Unrecognized);
        assert_eq!(err.bytes, bad.to_vec());
    }
}
