//! OpenFlow switch-side connection endpoint.
//!
//! This crate has three layers:
//!
//! - a bit-exact codec for OpenFlow control messages ([`packets`], [`oxm`],
//!   [`port`]): every wire struct is wrapped by a `Packet` buffer view with
//!   field getters/setters, and mirrored by a high-level `*Repr` type
//!   implementing [`Repr`];
//! - a stream [`Parser`] that accumulates TCP bytes and yields complete
//!   messages;
//! - a [`client`] endpoint that owns one TCP connection to a controller,
//!   negotiates a protocol version over HELLO, reconnects on loss, and
//!   routes decoded messages upward subject to controller-role policy.

use thiserror::Error;

mod field {
    use core::ops;
    pub type Field = ops::Range<usize>;
    pub type Rest = ops::RangeFrom<usize>;
}

/// The error type for the codec layer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Error {
    /// An operation cannot proceed because a buffer is empty or full.
    #[error("buffer space exhausted")]
    Exhausted,
    /// An incoming message could not be parsed because some of its fields
    /// were out of bounds of the received data.
    #[error("truncated message")]
    Truncated,
    /// An incoming message has a type code that is not defined for its
    /// protocol version.
    #[error("unrecognized message")]
    Unrecognized,
    /// An incoming message was recognized but was self-contradictory, e.g.
    /// a length field that disagrees with the contents.
    #[error("malformed message")]
    Malformed,
    /// A message type that does not exist in the given protocol version was
    /// asked to be encoded.
    #[error("message type not defined for this version")]
    BadVersion,
    /// An OXM field of class `openflow_basic` has a field code outside the
    /// known table.
    #[error("unknown oxm field")]
    BadOxmField,
    /// The match type field in a flow match header is not OXM.
    #[error("unknown match type")]
    BadMatchType,
}

/// The result type for the codec layer.
pub type Result<T> = core::result::Result<T, Error>;

/// A high-level representation of a wire struct.
pub trait Repr
where
    Self: Sized,
{
    /// Parse a wire buffer and return a high-level representation.
    fn parse(buffer: &[u8]) -> Result<Self>;

    /// Return the length of the buffer that [emit] will fill from this
    /// high-level representation.
    ///
    /// [emit]: #tymethod.emit
    fn buffer_len(&self) -> usize;

    /// Emit a high-level representation into a buffer.
    fn emit(&self, buffer: &mut [u8]) -> Result<()>;
}

#[macro_use]
mod macros;
mod parser;
mod port;
pub mod client;
pub mod oxm;
mod packets;

pub use client::Client;
pub use packets::openflow::{Kind, Message, Payload, Version};
pub use packets::*;
pub use parser::{ParseError, Parser};
pub use port::{Port, PortConfig, PortFeatures, PortNumber, PortState};
