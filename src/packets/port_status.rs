//! # Port status
//!
//! Sent to the controller when a port is added, removed or modified.

use crate::port::{Port, PORT_LEN};
use crate::{Error, Repr, Result};

enum_with_unknown! {
    /// What happened to the port.
    pub doc enum Reason(u8) {
        /// The port was added.
        Add = 0,
        /// The port was removed.
        Delete = 1,
        /// Some attribute of the port has changed.
        Modify = 2
    }
}

mod field {
    use crate::field::*;
    pub const REASON: usize = 0;
    // pub const PADDING: Field = 1..8;
    pub const PORT: Field = 8..72;
}

/// A high-level representation of a port status body.
#[derive(Debug, PartialEq, Eq, Clone)]
pub struct PacketRepr {
    pub reason: Reason,
    pub port: Port,
}

impl Repr for PacketRepr {
    fn parse(buffer: &[u8]) -> Result<Self> {
        if buffer.len() < field::PORT.end {
            return Err(Error::Truncated);
        }
        Ok(PacketRepr {
            reason: Reason::from(buffer[field::REASON]),
            port: Port::parse(&buffer[field::PORT])?,
        })
    }

    fn buffer_len(&self) -> usize {
        field::PORT.start + PORT_LEN
    }

    fn emit(&self, buffer: &mut [u8]) -> Result<()> {
        if buffer.len() < self.buffer_len() {
            return Err(Error::Exhausted);
        }
        buffer[field::REASON] = self.reason.into();
        buffer[field::REASON + 1..field::PORT.start].fill(0);
        self.port.emit(&mut buffer[field::PORT])?;
        Ok(())
    }
}
